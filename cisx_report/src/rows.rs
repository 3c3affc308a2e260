use cisx_ir::{Device, InterfaceRef, Nat, NetworkValue, ObjectBody, ObjectRef, Port};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::columns::NatColumn;

/// One report row: a text cell per [`NatColumn`]. Absent values are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatRow {
    cells: Vec<String>,
}

impl Default for NatRow {
    fn default() -> Self {
        Self {
            cells: vec![String::new(); NatColumn::ALL.len()],
        }
    }
}

impl NatRow {
    pub fn get(&self, column: NatColumn) -> &str {
        &self.cells[column.index()]
    }

    /// Cells in column order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    fn set(&mut self, column: NatColumn, value: Option<String>) {
        self.cells[column.index()] = value.unwrap_or_default();
    }
}

impl Serialize for NatRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for column in NatColumn::ALL {
            map.serialize_entry(column.title(), self.get(column))?;
        }
        map.end()
    }
}

/// Project every NAT rule of `device` into report rows.
///
/// Network objects owning an automatic NAT come first, in declaration
/// order, followed by the manual NAT statements.
pub fn nat_rows(device: &Device) -> Vec<NatRow> {
    let auto = device
        .auto_nat_objects()
        .map(|(object, nat)| project(device, object.name.as_deref(), nat));
    let manual = device.nats.iter().map(|nat| project(device, None, nat));
    auto.chain(manual).collect()
}

fn project(device: &Device, object_name: Option<&str>, nat: &Nat) -> NatRow {
    use NatColumn::*;

    let mut row = NatRow::default();
    row.set(Hostname, device.hostname.clone());
    row.set(ObjectName, object_name.map(ToString::to_string));

    row.set(InsideIntfName, interface_name(device, &nat.inside_interface));
    row.set(InsideIntfAddr, interface_addr(device, &nat.inside_interface));
    row.set(MappedIntfName, interface_name(device, &nat.outside_interface));
    row.set(MappedIntfAddr, interface_addr(device, &nat.outside_interface));

    row.set(SrcType, Some(nat.src_type.to_string()));
    row.set(InsideSrcName, object_name_of(device, Some(&nat.inside_src)));
    row.set(InsideSrcAddr, object_addr(device, Some(&nat.inside_src)));
    row.set(MappedSrcName, object_name_of(device, Some(&nat.outside_src)));
    row.set(MappedSrcAddr, object_addr(device, Some(&nat.outside_src)));
    if nat.fallback {
        row.set(FallbackAddr, interface_addr(device, &nat.outside_interface));
    }

    row.set(DestType, nat.dest_type.map(|t| t.to_string()));
    row.set(InsideDestName, object_name_of(device, nat.inside_dest.as_ref()));
    row.set(InsideDestAddr, object_addr(device, nat.inside_dest.as_ref()));
    row.set(MappedDestName, object_name_of(device, nat.outside_dest.as_ref()));
    row.set(MappedDestAddr, object_addr(device, nat.outside_dest.as_ref()));

    row.set(SrvProtocol, service_protocol(device, nat));
    let inside = nat.inside_service.as_ref();
    row.set(InsideSrvName, service_name(device, inside));
    row.set(InsideSrvSrcPort, service_port(device, inside, Direction::Source));
    row.set(InsideSrvDestPort, service_port(device, inside, Direction::Destination));
    let outside = nat.outside_service.as_ref();
    row.set(MappedSrvName, service_name(device, outside));
    row.set(MappedSrvSrcPort, service_port(device, outside, Direction::Source));
    row.set(MappedSrvDestPort, service_port(device, outside, Direction::Destination));

    row.set(AfterAuto, flag(nat.after_auto, "after-auto"));
    row.set(NoProxyArp, flag(nat.no_proxy_arp, "no-proxy-arp"));
    row.set(RouteLookup, flag(nat.route_lookup, "route-lookup"));
    row
}

fn interface_name(device: &Device, reference: &InterfaceRef) -> Option<String> {
    device
        .interface_logical_name(reference)
        .map(ToString::to_string)
}

fn interface_addr(device: &Device, reference: &InterfaceRef) -> Option<String> {
    device
        .interface(reference)?
        .primary_addr()
        .map(ToString::to_string)
}

fn object_name_of(device: &Device, reference: Option<&ObjectRef>) -> Option<String> {
    device.object_name(reference?).map(ToString::to_string)
}

fn object_addr(device: &Device, reference: Option<&ObjectRef>) -> Option<String> {
    let object = device.object(reference?)?;
    match &object.body {
        ObjectBody::Name { addr } => addr.as_ref().map(ToString::to_string),
        ObjectBody::Network(network) => match network.value.as_ref()? {
            NetworkValue::Addr(addr) => Some(addr.to_string()),
            NetworkValue::Range(start, end) => Some(format!("{start} - {end}")),
            NetworkValue::Fqdn(fqdn) => Some(fqdn.clone()),
        },
        _ => None,
    }
}

fn service_protocol(device: &Device, nat: &Nat) -> Option<String> {
    if let Some(protocol) = &nat.service_protocol {
        return Some(protocol.clone());
    }
    device
        .object(nat.inside_service.as_ref()?)?
        .service()?
        .protocol
        .clone()
}

fn service_name(device: &Device, reference: Option<&ObjectRef>) -> Option<String> {
    let object = device.object(reference?)?;
    object.service()?;
    object.name.clone()
}

#[derive(Clone, Copy)]
enum Direction {
    Source,
    Destination,
}

fn service_port(
    device: &Device,
    reference: Option<&ObjectRef>,
    direction: Direction,
) -> Option<String> {
    let reference = reference?;
    // An unknown service name is reported as a literal source port.
    if let ObjectRef::Unresolved(name) = reference {
        return match direction {
            Direction::Source => Some(name.clone()),
            Direction::Destination => None,
        };
    }
    let service = device.object(reference)?.service()?;
    let port: Option<&Port> = match direction {
        Direction::Source => service.src_port.as_ref(),
        Direction::Destination => service.dest_port.as_ref(),
    };
    port.map(ToString::to_string)
}

fn flag(set: bool, name: &str) -> Option<String> {
    set.then(|| name.to_string())
}
