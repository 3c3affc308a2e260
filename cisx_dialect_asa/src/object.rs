//! `name`, `object` and `object-group` handlers.

use cisx_ir::{
    Addr, AddrFamily, GroupItem, NetworkValue, Object, ObjectBody, ObjectId, ObjectRef, Port,
    addr::{mask_to_prefix, parse_v4_token, parse_v6_token},
};

use crate::dispatch::{Exit, Rule, Session, at_top_level};
use crate::error::ParseError;
use crate::nat;
use crate::patterns::{NAME_OBJECT, NAME_TOKEN, RANGE, SERVICE, SUBNET};

/// Object currently being filled by the block rules.
pub(crate) struct ObjectBlock {
    id: ObjectId,
}

const KINDS: &[Rule<ObjectBlock>] = &[
    Rule::new(&["name"], parse_name_object),
    Rule::new(&["object", "network"], parse_network_object),
    Rule::new(&["object", "service"], parse_service_object),
    Rule::new(&["object-group", "network"], parse_network_object_group),
];

const NETWORK_RULES: &[Rule<ObjectBlock>] = &[
    Rule::new(&["host"], set_host),
    Rule::new(&["subnet"], set_subnet),
    Rule::new(&["range"], set_range),
    Rule::new(&["fqdn"], set_fqdn),
    Rule::new(&["nat"], nat::parse_auto_nat),
    Rule::new(&["description"], set_description),
];

const SERVICE_RULES: &[Rule<ObjectBlock>] = &[
    Rule::new(&["service"], set_service),
    Rule::new(&["description"], set_description),
];

// `range` and `any` members are not decoded and fall through to `add_subnet`
// as mismatches.
const GROUP_RULES: &[Rule<ObjectBlock>] = &[
    Rule::new(&["network-object", "host"], add_host),
    Rule::new(&["network-object", "object"], add_object),
    Rule::new(&["network-object"], add_subnet),
    Rule::new(&["group-object"], add_group_object),
    Rule::new(&["description"], set_description),
];

/// Parse a `name`, `object` or `object-group` line and its block.
///
/// The object is fetched by name (token 2) or registered unnamed on first
/// mention, then decoded by sub-type. Only the decoded sub-types name it, so
/// an unsupported sub-type stays untyped and invisible to lookups.
pub(crate) fn parse_object(session: &mut Session) -> Result<(), ParseError> {
    let Some(name) = session.token_at(2) else {
        return Ok(());
    };
    let id = match session.device.object_by_name(&name) {
        Some(id) => id,
        None => session.device.add_object(Object::default()),
    };
    session.run_once(
        &mut ObjectBlock { id },
        KINDS,
        |lines| lines.indent() > 0,
        Exit::Withhold,
    )
}

impl ObjectBlock {
    pub(crate) fn id(&self) -> ObjectId {
        self.id
    }
}

fn object<'a>(block: &ObjectBlock, session: &'a mut Session) -> &'a mut Object {
    &mut session.device.objects[block.id.0]
}

fn set_name(block: &ObjectBlock, session: &mut Session) {
    if let Some(name) = session.token_at(2) {
        object(block, session).name = Some(name);
    }
}

fn set_description(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    if let Some(text) = session.join_tokens(1) {
        object(block, session).description = Some(text);
    }
    Ok(())
}

/// `name <addr> <name> [description <text>]`
fn parse_name_object(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    object(block, session).body = ObjectBody::Name { addr: None };
    let line = session.lines.line().to_string();
    let Some(caps) = session.full_match(&NAME_OBJECT, &line, "name") else {
        return Ok(());
    };
    let target = object(block, session);
    target.body = ObjectBody::Name {
        addr: Some(Addr::host(&caps["addr"])),
    };
    target.name = Some(caps["name"].to_string());
    if let Some(description) = caps.name("description") {
        target.description = Some(description.as_str().to_string());
    }
    Ok(())
}

fn parse_network_object(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    object(block, session).network_mut();
    set_name(block, session);
    tracing::debug!(object = ?object(block, session).name, "network object block");
    session.lines.advance()?;
    session.run(block, NETWORK_RULES, at_top_level, Exit::Withhold)
}

fn set_network_value(block: &ObjectBlock, session: &mut Session, value: NetworkValue) {
    object(block, session).network_mut().value = Some(value);
}

/// `host <addr>`
fn set_host(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    let Some(token) = session.token_at(1) else {
        return Ok(());
    };
    let addr = match parse_v6_token(&token) {
        Some((addr, _)) => Addr::v6(addr, AddrFamily::V6.host_prefix()),
        None => Addr::host(token.as_str()),
    };
    set_network_value(block, session, NetworkValue::Addr(addr));
    Ok(())
}

/// `subnet <addr>[/len] [<mask>]`
fn set_subnet(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    let line = session.lines.line().to_string();
    let Some(caps) = session.full_match(&SUBNET, &line, "subnet") else {
        return Ok(());
    };
    let prefix = match (caps.name("addr_len"), caps.name("mask")) {
        (Some(len), _) => len.as_str().parse::<u8>().ok(),
        (None, Some(mask)) => mask_to_prefix(mask.as_str()),
        (None, None) => Some(AddrFamily::V4.host_prefix()),
    };
    let Some(prefix) = prefix.filter(|p| *p <= 32) else {
        session.record("invalid-mask", "subnet mask is not a valid dotted quad or length");
        return Ok(());
    };
    let addr = Addr::with_prefix(&caps["addr"], prefix);
    set_network_value(block, session, NetworkValue::Addr(addr));
    Ok(())
}

/// `range <start> <end>`
fn set_range(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    let line = session.lines.line().to_string();
    let Some(caps) = session.full_match(&RANGE, &line, "range") else {
        return Ok(());
    };
    let value = NetworkValue::Range(Addr::host(&caps["start"]), Addr::host(&caps["end"]));
    set_network_value(block, session, value);
    Ok(())
}

/// `fqdn [v4|v6] <name>`
fn set_fqdn(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    let index = match (session.lines.token(1), session.lines.token(2)) {
        (Some("v4" | "v6"), Some(_)) => 2,
        _ => 1,
    };
    if let Some(fqdn) = session.token_at(index) {
        set_network_value(block, session, NetworkValue::Fqdn(fqdn));
    }
    Ok(())
}

fn parse_service_object(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    object(block, session).service_mut();
    set_name(block, session);
    session.lines.advance()?;
    session.run(block, SERVICE_RULES, at_top_level, Exit::Withhold)
}

/// `service <tcp|udp> [source <op> <port> [<end>]] [destination <op> <port> [<end>]]`
fn set_service(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    let line = session.lines.line().to_string();
    let Some(caps) = session.full_match(&SERVICE, &line, "service") else {
        return Ok(());
    };
    let port = |op: &str, port: &str, end: Option<&str>| match (op, end) {
        ("range", Some(end)) => Port::Range(port.to_string(), end.to_string()),
        _ => Port::Single(port.to_string()),
    };

    let service = object(block, session).service_mut();
    service.protocol = Some(caps["protocol"].to_string());
    if let (Some(op), Some(start)) = (caps.name("src_op"), caps.name("src_port")) {
        service.src_op = Some(op.as_str().to_string());
        service.src_port = Some(port(
            op.as_str(),
            start.as_str(),
            caps.name("src_end").map(|m| m.as_str()),
        ));
    }
    if let (Some(op), Some(start)) = (caps.name("dest_op"), caps.name("dest_port")) {
        service.dest_op = Some(op.as_str().to_string());
        service.dest_port = Some(port(
            op.as_str(),
            start.as_str(),
            caps.name("dest_end").map(|m| m.as_str()),
        ));
    }
    Ok(())
}

fn parse_network_object_group(
    block: &mut ObjectBlock,
    session: &mut Session,
) -> Result<(), ParseError> {
    object(block, session).group_items_mut();
    set_name(block, session);
    session.lines.advance()?;
    session.run(block, GROUP_RULES, at_top_level, Exit::Withhold)
}

fn add_item(block: &ObjectBlock, session: &mut Session, item: GroupItem) {
    object(block, session).group_items_mut().push(item);
}

/// Resolve a group member name; unknown names stay unresolved.
fn lookup(session: &Session, name: &str) -> ObjectRef {
    match session.device.object_by_name(name) {
        Some(id) => ObjectRef::Declared(id),
        None => ObjectRef::Unresolved(name.to_string()),
    }
}

/// `network-object host <addr|addr6|name>`
fn add_host(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    let tokens = session.lines.tokens();
    let Some(token) = tokens.get(2).filter(|_| tokens.len() == 3).cloned() else {
        session.record("pattern-mismatch", "pattern mismatch: network-object host");
        return Ok(());
    };

    let item = if let Some((addr, _)) = parse_v4_token(&token) {
        GroupItem::Addr(Addr::host(addr))
    } else if let Some((addr, _)) = parse_v6_token(&token) {
        GroupItem::Addr(Addr::v6(addr, AddrFamily::V6.host_prefix()))
    } else if NAME_TOKEN.is_match(&token) {
        GroupItem::NamedAddr {
            target: lookup(session, &token),
            prefix: Some(AddrFamily::V4.host_prefix()),
            family: AddrFamily::V4,
        }
    } else {
        session.record("pattern-mismatch", "pattern mismatch: network-object host");
        return Ok(());
    };
    add_item(block, session, item);
    Ok(())
}

/// `network-object object <name>`
fn add_object(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    if let Some(name) = session.token_at(2) {
        let target = lookup(session, &name);
        add_item(block, session, GroupItem::Object(target));
    }
    Ok(())
}

/// `network-object <addr|name> <mask>`, `network-object <addr6>[/len]` or
/// `network-object <name>`.
fn add_subnet(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    let tokens = session.lines.tokens().to_vec();
    let item = match tokens.as_slice() {
        [_, target, mask] => {
            let Some(prefix) = parse_v4_token(mask)
                .filter(|(_, len)| len.is_none())
                .and_then(|(mask, _)| mask_to_prefix(mask))
            else {
                session.record("pattern-mismatch", "pattern mismatch: network-object");
                return Ok(());
            };
            if let Some((addr, _)) = parse_v4_token(target) {
                GroupItem::Addr(Addr::with_prefix(addr, prefix))
            } else if NAME_TOKEN.is_match(target) {
                GroupItem::NamedAddr {
                    target: lookup(session, target),
                    prefix: Some(prefix),
                    family: AddrFamily::V4,
                }
            } else {
                session.record("pattern-mismatch", "pattern mismatch: network-object");
                return Ok(());
            }
        }
        [_, token] => {
            if let Some((addr, len)) = parse_v6_token(token) {
                GroupItem::Addr(Addr::v6(addr, len.unwrap_or(AddrFamily::V6.host_prefix())))
            } else if token != "any"
                && parse_v4_token(token).is_none()
                && NAME_TOKEN.is_match(token)
            {
                GroupItem::NamedAddr {
                    target: lookup(session, token),
                    prefix: None,
                    family: AddrFamily::V6,
                }
            } else {
                session.record("pattern-mismatch", "pattern mismatch: network-object");
                return Ok(());
            }
        }
        _ => {
            session.record("pattern-mismatch", "pattern mismatch: network-object");
            return Ok(());
        }
    };
    add_item(block, session, item);
    Ok(())
}

/// `group-object <name>`
fn add_group_object(block: &mut ObjectBlock, session: &mut Session) -> Result<(), ParseError> {
    if let Some(name) = session.token_at(1) {
        let target = lookup(session, &name);
        add_item(block, session, GroupItem::Object(target));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cisx_ir::{
        Addr, AddrFamily, GroupItem, NetworkValue, ObjectBody, ObjectId, ObjectKind, ObjectRef,
        Port,
    };

    use crate::{ParseOutcome, parse_str};

    fn parse(text: &str) -> ParseOutcome {
        parse_str("t.cfg", text).expect("parse")
    }

    #[test]
    fn name_object_with_description() {
        let outcome = parse("name 10.1.1.10 WEB-SRV description primary web server\n");
        let object = &outcome.device.objects[0];
        assert_eq!(object.name.as_deref(), Some("WEB-SRV"));
        assert_eq!(object.kind(), Some(ObjectKind::Name));
        assert_eq!(object.addr(), Some(&Addr::host("10.1.1.10")));
        assert_eq!(object.description.as_deref(), Some("primary web server"));
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn name_object_rejects_prefix_suffix() {
        let outcome = parse("name 10.1.1.0/24 NET\n");
        assert_eq!(outcome.device.objects[0].kind(), Some(ObjectKind::Name));
        assert_eq!(outcome.device.objects[0].addr(), None);
        assert_eq!(outcome.findings[0].code, "pattern-mismatch");
    }

    #[test]
    fn network_object_value_forms() {
        let outcome = parse(concat!(
            "object network H\n host 192.0.2.10\n",
            "object network S\n subnet 192.0.2.0 255.255.255.0\n description lab\n",
            "object network S8\n subnet 10.0.0.0/8\n",
            "object network R\n range 192.0.2.10 192.0.2.20\n",
            "object network F\n fqdn v4 www.example.com\n",
        ));
        let objects = &outcome.device.objects;
        assert!(outcome.findings.is_empty());
        assert_eq!(objects[0].addr().map(ToString::to_string).as_deref(), Some("192.0.2.10"));
        assert_eq!(objects[1].addr().map(ToString::to_string).as_deref(), Some("192.0.2.0/24"));
        assert_eq!(objects[1].description.as_deref(), Some("lab"));
        assert_eq!(objects[2].addr().map(|a| a.prefix), Some(8));
        assert_eq!(
            objects[3].network().and_then(|n| n.value.clone()),
            Some(NetworkValue::Range(
                Addr::host("192.0.2.10"),
                Addr::host("192.0.2.20")
            ))
        );
        assert_eq!(
            objects[4].network().and_then(|n| n.value.clone()),
            Some(NetworkValue::Fqdn("www.example.com".into()))
        );
    }

    #[test]
    fn reopened_network_object_keeps_its_address() {
        let outcome = parse(
            "object network WEB\n host 192.0.2.10\nobject network WEB\n description again\n",
        );
        assert_eq!(outcome.device.objects.len(), 1);
        let web = &outcome.device.objects[0];
        assert_eq!(web.addr(), Some(&Addr::host("192.0.2.10")));
        assert_eq!(web.description.as_deref(), Some("again"));
    }

    #[test]
    fn service_object_ports() {
        let outcome = parse(concat!(
            "object service WEB-PORTS\n service tcp destination range 8080 8090\n",
            "object service SSH\n service tcp source eq 1024 destination eq ssh\n description admin\n",
        ));
        let web = outcome.device.objects[0].service().expect("service");
        assert_eq!(web.protocol.as_deref(), Some("tcp"));
        assert_eq!(web.src_port, None);
        assert_eq!(web.dest_op.as_deref(), Some("range"));
        assert_eq!(
            web.dest_port,
            Some(Port::Range("8080".into(), "8090".into()))
        );

        let ssh = &outcome.device.objects[1];
        let service = ssh.service().expect("service");
        assert_eq!(service.src_port, Some(Port::Single("1024".into())));
        assert_eq!(service.dest_port, Some(Port::Single("ssh".into())));
        assert_eq!(ssh.description.as_deref(), Some("admin"));
    }

    #[test]
    fn network_group_members() {
        let outcome = parse(concat!(
            "name 10.9.9.9 LEGACY\n",
            "object network WEB\n host 192.0.2.10\n",
            "object-group network SERVERS\n",
            " description all servers\n",
            " network-object host 192.0.2.11\n",
            " network-object host 2001:db8::11\n",
            " network-object host LEGACY\n",
            " network-object object WEB\n",
            " network-object 10.0.0.0 255.0.0.0\n",
            " network-object LEGACY 255.255.255.255\n",
            " network-object 2001:db8::/32\n",
            " group-object LATER\n",
            " network-object range 10.0.0.1 10.0.0.9\n",
            "object-group network LATER\n network-object host 10.1.1.1\n",
        ));
        let group = &outcome.device.objects[2];
        assert_eq!(group.kind(), Some(ObjectKind::NetworkGroup));
        assert_eq!(group.description.as_deref(), Some("all servers"));

        let items = group.items();
        assert_eq!(items.len(), 8);
        assert_eq!(items[0], GroupItem::Addr(Addr::host("192.0.2.11")));
        assert_eq!(items[1], GroupItem::Addr(Addr::v6("2001:db8::11", 128)));
        assert_eq!(
            items[2],
            GroupItem::NamedAddr {
                target: ObjectRef::Declared(ObjectId(0)),
                prefix: Some(32),
                family: AddrFamily::V4,
            }
        );
        assert_eq!(items[3], GroupItem::Object(ObjectRef::Declared(ObjectId(1))));
        assert_eq!(items[4], GroupItem::Addr(Addr::with_prefix("10.0.0.0", 8)));
        assert_eq!(
            items[5],
            GroupItem::NamedAddr {
                target: ObjectRef::Declared(ObjectId(0)),
                prefix: Some(32),
                family: AddrFamily::V4,
            }
        );
        assert_eq!(items[6], GroupItem::Addr(Addr::v6("2001:db8::", 32)));
        assert_eq!(
            items[7],
            GroupItem::Object(ObjectRef::Unresolved("LATER".into()))
        );

        // The range member is not decoded and is reported as a mismatch.
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].line, 14);
    }

    #[test]
    fn bare_group_member_name_is_looked_up() {
        let outcome = parse("object-group network G\n network-object MISSING\n");
        assert_eq!(
            outcome.device.objects[0].items(),
            &[GroupItem::NamedAddr {
                target: ObjectRef::Unresolved("MISSING".into()),
                prefix: None,
                family: AddrFamily::V6,
            }]
        );
    }

    #[test]
    fn fqdn_skips_family_qualifier() {
        let outcome = parse(concat!(
            "object network A\n fqdn v6 a.example.net\n",
            "object network B\n fqdn b.example.net\n",
            "object network V4\n fqdn v4\n",
        ));
        let fqdn = |i: usize| outcome.device.objects[i].network().and_then(|n| n.value.clone());
        assert_eq!(fqdn(0), Some(NetworkValue::Fqdn("a.example.net".into())));
        assert_eq!(fqdn(1), Some(NetworkValue::Fqdn("b.example.net".into())));
        // A lone qualifier is taken as the name.
        assert_eq!(fqdn(2), Some(NetworkValue::Fqdn("v4".into())));
    }

    #[test]
    fn unsupported_object_types_stay_untyped() {
        let outcome = parse(
            "object-group service WEB tcp\n port-object eq www\nobject network A\n host 1.1.1.1\n",
        );
        assert_eq!(outcome.device.objects.len(), 2);
        assert_eq!(outcome.device.objects[0].body, ObjectBody::Untyped);
        assert_eq!(outcome.device.objects[0].name, None);
        assert_eq!(outcome.device.object_by_name("WEB"), None);
        assert_eq!(outcome.device.objects[1].kind(), Some(ObjectKind::Network));
        assert!(outcome.findings.is_empty());
    }
}
