//! Automatic and manual NAT handlers with their reference resolution.
//!
//! Every reference is resolved once, against the device as parsed so far.
//! A name that is not known yet becomes a permanent placeholder and, for
//! interfaces and address objects, a recorded finding.

use cisx_ir::{
    Addr, InterfaceRef, Nat, NatType, Object, ObjectBody, ObjectRef, Port, ServiceObject,
};
use regex::Captures;

use crate::dispatch::Session;
use crate::error::ParseError;
use crate::object::ObjectBlock;
use crate::patterns::{AUTO_NAT, MANUAL_NAT};

/// Keyword standing for the outside interface address.
const INTERFACE: &str = "interface";
const ANY: &str = "any";

/// `nat (<in>,<out>) {static|dynamic} {<addr>|<name>} [interface]
/// [service {tcp|udp} <in> <out>] [dns]` inside a network object block.
pub(crate) fn parse_auto_nat(
    block: &mut ObjectBlock,
    session: &mut Session,
) -> Result<(), ParseError> {
    let line = session.lines.line().to_string();
    let Some(caps) = session.full_match(&AUTO_NAT, &line, "nat") else {
        return Ok(());
    };

    let inside_if = resolve_interface(session, &caps["inside"]);
    let outside_if = resolve_interface(session, &caps["outside"]);
    let outside_src = match caps.name("addr") {
        Some(addr) => literal_addr(addr.as_str()),
        None => resolve_source(session, &caps["object"], &outside_if),
    };

    let mut nat = Nat::new(
        inside_if,
        outside_if,
        src_type(&caps),
        ObjectRef::Declared(block.id()),
        outside_src,
    );
    nat.fallback = is_fallback(&caps);
    nat.service_protocol = caps.name("protocol").map(|m| m.as_str().to_string());
    let protocol = nat.service_protocol.clone();
    nat.inside_service = caps
        .name("inside_service")
        .map(|m| resolve_service(session, m.as_str(), protocol.as_deref()));
    nat.outside_service = caps
        .name("outside_service")
        .map(|m| resolve_service(session, m.as_str(), protocol.as_deref()));
    nat.dns = caps.name("dns").is_some();

    tracing::debug!(
        line = session.lines.line_number(),
        fallback = nat.fallback,
        "automatic nat"
    );
    session.device.objects[block.id().0].network_mut().nat = Some(Box::new(nat));
    Ok(())
}

/// Top-level `nat (<in>,<out>) [after-auto] source ...` statement.
///
/// A line that does not match the full form is recorded and dropped.
pub(crate) fn parse_manual_nat(session: &mut Session) -> Result<(), ParseError> {
    let line = session.lines.line().to_string();
    let Some(caps) = session.full_match(&MANUAL_NAT, &line, "nat") else {
        return Ok(());
    };

    let inside_if = resolve_interface(session, &caps["inside"]);
    let outside_if = resolve_interface(session, &caps["outside"]);
    let inside_src = resolve_source(session, &caps["inside_src"], &outside_if);
    let outside_src = resolve_source(session, &caps["outside_src"], &outside_if);

    let mut nat = Nat::new(inside_if, outside_if, src_type(&caps), inside_src, outside_src);
    if let Some(dest_type) = caps.name("dest_type") {
        nat.dest_type = NatType::from_keyword(dest_type.as_str());
        nat.inside_dest = Some(resolve_source(
            session,
            &caps["inside_dest"],
            &nat.outside_interface,
        ));
        nat.outside_dest = Some(resolve_source(
            session,
            &caps["outside_dest"],
            &nat.outside_interface,
        ));
    }
    nat.inside_service = caps
        .name("inside_service")
        .map(|m| resolve_service(session, m.as_str(), None));
    nat.outside_service = caps
        .name("outside_service")
        .map(|m| resolve_service(session, m.as_str(), None));

    nat.fallback = is_fallback(&caps);
    nat.after_auto = caps.name("after_auto").is_some();
    nat.unidirectional = caps.name("unidirectional").is_some();
    nat.no_proxy_arp = caps.name("no_proxy_arp").is_some();
    nat.route_lookup = caps.name("route_lookup").is_some();

    tracing::debug!(line = session.lines.line_number(), "manual nat");
    session.device.nats.push(nat);
    Ok(())
}

fn src_type(caps: &Captures<'_>) -> NatType {
    match &caps["src_type"] {
        "static" => NatType::Static,
        _ => NatType::Dynamic,
    }
}

/// The trailing `interface` keyword, or `interface` given as the outside
/// source, maps the source to the outside interface address.
fn is_fallback(caps: &Captures<'_>) -> bool {
    caps.name("fallback").is_some()
        || ["object", "outside_src"]
            .iter()
            .any(|group| caps.name(group).is_some_and(|m| m.as_str() == INTERFACE))
}

/// Resolve an interface by logical name; `any` is the shared sentinel.
pub(crate) fn resolve_interface(session: &mut Session, name: &str) -> InterfaceRef {
    if name == ANY {
        return InterfaceRef::Any;
    }
    match session.device.interface_by_logical_name(name) {
        Some(id) => InterfaceRef::Declared(id),
        None => {
            session.record(
                "unresolved-interface",
                format!("Interface \"{name}\" not found."),
            );
            InterfaceRef::Unresolved(name.to_string())
        }
    }
}

/// One-off host object wrapping a literal address. An inline `/len` on the
/// literal is not kept.
fn literal_addr(addr: &str) -> ObjectRef {
    ObjectRef::Inline(Box::new(Object::network_addr(None, Some(Addr::host(addr)))))
}

/// Resolve a NAT address operand.
///
/// `interface` stands for the outside interface address and `any` for
/// `0.0.0.0/0`; anything else is an object name.
pub(crate) fn resolve_source(
    session: &mut Session,
    token: &str,
    outside_if: &InterfaceRef,
) -> ObjectRef {
    match token {
        INTERFACE => {
            let name = session
                .device
                .interface_logical_name(outside_if)
                .map(ToString::to_string);
            let addr = session
                .device
                .interface(outside_if)
                .and_then(|i| i.primary_addr())
                .cloned();
            if addr.is_none() {
                session.record(
                    "interface-without-address",
                    format!(
                        "Interface \"{}\" used in nat without primary address.",
                        name.as_deref().unwrap_or_default()
                    ),
                );
            }
            ObjectRef::Inline(Box::new(Object::network_addr(name, addr)))
        }
        ANY => ObjectRef::Inline(Box::new(Object::network_addr(
            Some(ANY.to_string()),
            Some(Addr::any()),
        ))),
        name => match session.device.object_by_name(name) {
            Some(id) => ObjectRef::Declared(id),
            None => {
                session.record(
                    "unresolved-object",
                    format!("Network object \"{name}\" not found."),
                );
                ObjectRef::Unresolved(name.to_string())
            }
        },
    }
}

/// Resolve a NAT service operand.
///
/// With a protocol (automatic NAT) an unknown name is a literal port and
/// becomes a one-off service object. Without one it is an unknown object.
pub(crate) fn resolve_service(
    session: &mut Session,
    name: &str,
    protocol: Option<&str>,
) -> ObjectRef {
    if let Some(id) = session.device.object_by_name(name) {
        return ObjectRef::Declared(id);
    }
    match protocol {
        Some(protocol) => ObjectRef::Inline(Box::new(Object {
            name: None,
            description: None,
            body: ObjectBody::Service(ServiceObject {
                protocol: Some(protocol.to_string()),
                src_port: Some(Port::Single(name.to_string())),
                ..ServiceObject::default()
            }),
        })),
        None => {
            session.record(
                "unresolved-service",
                format!("Service object \"{name}\" not found."),
            );
            ObjectRef::Unresolved(name.to_string())
        }
    }
}
