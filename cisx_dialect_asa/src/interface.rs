//! `interface` block handler.

use cisx_ir::{Addr, AddrFamily, Interface, InterfaceId, Vlan, addr::mask_to_prefix};

use crate::dispatch::{Exit, Rule, Session, at_top_level};
use crate::error::ParseError;
use crate::patterns::IP_ADDRESS;

/// Interface currently being filled by the block rules.
pub(crate) struct InterfaceBlock {
    id: InterfaceId,
}

const RULES: &[Rule<InterfaceBlock>] = &[
    Rule::new(&["description"], set_description),
    Rule::new(&["ip", "address", "dhcp"], ignore),
    Rule::new(&["ip", "address"], add_addr),
    Rule::new(&["nameif"], set_logical_name),
    Rule::new(&["hsrp", "version"], ignore),
    Rule::new(&["hsrp"], set_hsrp),
    Rule::new(&["vrf", "member"], set_vrf),
    Rule::new(&["vlan"], set_vlan),
];

/// Parse an `interface <name>` block positioned on its header line.
///
/// The interface is fetched by physical name or created on first mention.
/// On return the line that closed the block is withheld for the caller.
pub(crate) fn parse_interface(session: &mut Session) -> Result<(), ParseError> {
    let Some(name) = session.token_at(1) else {
        return Ok(());
    };
    let id = match session.device.interface_by_name(&name) {
        Some(id) => id,
        None => session.device.add_interface(Interface::new(name.as_str())),
    };
    tracing::debug!(interface = %name, "interface block");

    session.lines.advance()?;
    session.run(
        &mut InterfaceBlock { id },
        RULES,
        at_top_level,
        Exit::Withhold,
    )
}

fn interface<'a>(block: &InterfaceBlock, session: &'a mut Session) -> &'a mut Interface {
    &mut session.device.interfaces[block.id.0]
}

fn ignore(_: &mut InterfaceBlock, _: &mut Session) -> Result<(), ParseError> {
    Ok(())
}

fn set_description(block: &mut InterfaceBlock, session: &mut Session) -> Result<(), ParseError> {
    if let Some(text) = session.join_tokens(1) {
        interface(block, session).description = Some(text);
    }
    Ok(())
}

fn add_addr(block: &mut InterfaceBlock, session: &mut Session) -> Result<(), ParseError> {
    let line = session.lines.line().to_string();
    let Some(caps) = session.full_match(&IP_ADDRESS, &line, "ip address") else {
        return Ok(());
    };

    let prefix = match (caps.name("addr_len"), caps.name("mask")) {
        (Some(len), _) => len.as_str().parse::<u8>().ok(),
        (None, Some(mask)) => mask_to_prefix(mask.as_str()),
        (None, None) => Some(AddrFamily::V4.host_prefix()),
    };
    let Some(prefix) = prefix.filter(|p| *p <= 32) else {
        session.record("invalid-mask", "address mask is not a valid dotted quad or length");
        return Ok(());
    };

    let mut addr = Addr::with_prefix(&caps["addr"], prefix);
    addr.standby = caps.name("standby").map(|m| m.as_str().to_string());
    addr.secondary = caps.name("secondary").is_some();
    interface(block, session).add_addr(addr);
    Ok(())
}

fn set_logical_name(block: &mut InterfaceBlock, session: &mut Session) -> Result<(), ParseError> {
    if let Some(name) = session.join_tokens(1) {
        interface(block, session).logical_name = Some(name);
    }
    Ok(())
}

/// `hsrp <group>` optionally followed by an `ip <addr>` line.
fn set_hsrp(block: &mut InterfaceBlock, session: &mut Session) -> Result<(), ParseError> {
    let Some(group) = parse_number(session, 1) else {
        return Ok(());
    };
    interface(block, session).hsrp_group = Some(group);

    session.lines.advance()?;
    if session.lines.starts_with(&["ip"]) {
        if let Some(addr) = session.token_at(1) {
            interface(block, session).hsrp_addr = Some(addr);
        }
    } else {
        session.lines.putback(1)?;
    }
    Ok(())
}

fn set_vrf(block: &mut InterfaceBlock, session: &mut Session) -> Result<(), ParseError> {
    let Some(name) = session.join_tokens(2) else {
        return Ok(());
    };
    session.device.vrf_mut(&name);
    interface(block, session).vrf = Some(name);
    Ok(())
}

fn set_vlan(block: &mut InterfaceBlock, session: &mut Session) -> Result<(), ParseError> {
    if let Some(id) = parse_number(session, 1) {
        interface(block, session).vlan = Some(Vlan { id, name: None });
    }
    Ok(())
}

fn parse_number(session: &mut Session, index: usize) -> Option<u32> {
    let token = session.token_at(index)?;
    match token.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            session.record("invalid-number", format!("\"{token}\" is not a number"));
            None
        }
    }
}
