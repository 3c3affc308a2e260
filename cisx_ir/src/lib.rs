//! Device model for parsed firewall configuration text.
//!
//! This crate provides:
//! - an arena-backed device model (`Device`, `Interface`, `Object`, `Nat`)
//! - resolution results for cross references (`InterfaceRef`, `ObjectRef`)
//! - address and mask helpers (`addr`)
//!
//! The model is built monotonically by a dialect parser and handed to report
//! writers as an immutable snapshot. References are resolved once, at the
//! point of use; a name that is not known yet stays an unresolved placeholder.
//!
//! # Example
//!
//! ```rust
//! use cisx_ir::{Addr, Device, Interface};
//!
//! let mut device = Device::default();
//! let id = device.add_interface(Interface::new("GigabitEthernet0/1"));
//! device.interfaces[id.0].logical_name = Some("inside".to_string());
//! device.interfaces[id.0].add_addr(Addr::with_prefix("10.0.0.1", 24));
//!
//! assert_eq!(device.interface_by_logical_name("inside"), Some(id));
//! ```

pub mod addr;

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

pub use addr::{Addr, AddrFamily, mask_to_prefix};

/// Stable arena identifier for an interface in a [`Device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterfaceId(pub usize);

/// Stable arena identifier for an object in a [`Device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub usize);

static ANY_INTERFACE: LazyLock<Interface> = LazyLock::new(|| {
    let mut interface = Interface::default();
    interface.logical_name = Some("any".to_string());
    interface.add_addr(Addr::any());
    interface
});

/// One parsed device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Device {
    pub hostname: Option<String>,
    pub interfaces: Vec<Interface>,
    pub vrfs: Vec<Vrf>,
    pub objects: Vec<Object>,
    /// Manual NAT statements. Automatic NAT lives on its network object.
    pub nats: Vec<Nat>,
}

impl Device {
    /// Append an interface and return its id.
    pub fn add_interface(&mut self, interface: Interface) -> InterfaceId {
        let id = InterfaceId(self.interfaces.len());
        self.interfaces.push(interface);
        id
    }

    /// First interface whose physical name equals `name`.
    pub fn interface_by_name(&self, name: &str) -> Option<InterfaceId> {
        self.interfaces
            .iter()
            .position(|i| i.name.as_deref() == Some(name))
            .map(InterfaceId)
    }

    /// First interface whose `nameif` name equals `name`.
    pub fn interface_by_logical_name(&self, name: &str) -> Option<InterfaceId> {
        self.interfaces
            .iter()
            .position(|i| i.logical_name.as_deref() == Some(name))
            .map(InterfaceId)
    }

    /// Borrow the interface a NAT reference points at.
    ///
    /// `Any` yields the shared sentinel; an unresolved reference yields `None`.
    pub fn interface(&self, reference: &InterfaceRef) -> Option<&Interface> {
        match reference {
            InterfaceRef::Declared(id) => self.interfaces.get(id.0),
            InterfaceRef::Any => Some(Interface::any()),
            InterfaceRef::Unresolved(_) => None,
        }
    }

    /// Logical name of a referenced interface; placeholders report the name
    /// they were created from.
    pub fn interface_logical_name<'a>(&'a self, reference: &'a InterfaceRef) -> Option<&'a str> {
        match reference {
            InterfaceRef::Unresolved(name) => Some(name),
            other => self.interface(other)?.logical_name.as_deref(),
        }
    }

    /// Append an object and return its id.
    pub fn add_object(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(object);
        id
    }

    /// First object whose name equals `name`.
    pub fn object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.name.as_deref() == Some(name))
            .map(ObjectId)
    }

    /// Borrow the object a reference points at; `None` for placeholders.
    pub fn object<'a>(&'a self, reference: &'a ObjectRef) -> Option<&'a Object> {
        match reference {
            ObjectRef::Declared(id) => self.objects.get(id.0),
            ObjectRef::Inline(object) => Some(object),
            ObjectRef::Unresolved(_) => None,
        }
    }

    /// Name of a referenced object; placeholders report the name they were
    /// created from.
    pub fn object_name<'a>(&'a self, reference: &'a ObjectRef) -> Option<&'a str> {
        match reference {
            ObjectRef::Unresolved(name) => Some(name),
            other => self.object(other)?.name.as_deref(),
        }
    }

    /// Fetch a VRF by name, creating it on first mention.
    pub fn vrf_mut(&mut self, name: &str) -> &mut Vrf {
        let idx = match self.vrfs.iter().position(|v| v.name == name) {
            Some(idx) => idx,
            None => {
                self.vrfs.push(Vrf::new(name));
                self.vrfs.len() - 1
            }
        };
        &mut self.vrfs[idx]
    }

    /// Network objects that own an automatic NAT, in declaration order.
    pub fn auto_nat_objects(&self) -> impl Iterator<Item = (&Object, &Nat)> {
        self.objects
            .iter()
            .filter_map(|object| object.auto_nat().map(|nat| (object, nat)))
    }
}

/// A physical interface block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interface {
    /// Physical name such as `GigabitEthernet0/1`.
    pub name: Option<String>,
    /// Name assigned by `nameif`.
    pub logical_name: Option<String>,
    pub description: Option<String>,
    pub addrs: Vec<Addr>,
    pub vrf: Option<String>,
    pub vlan: Option<Vlan>,
    pub hsrp_group: Option<u32>,
    pub hsrp_addr: Option<String>,
}

impl Interface {
    /// Create an interface with its physical name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The wildcard `any` interface. It is never stored in a [`Device`].
    pub fn any() -> &'static Interface {
        &ANY_INTERFACE
    }

    /// Append `addr` unless a structurally equal address is already present.
    pub fn add_addr(&mut self, addr: Addr) {
        if !self.addrs.contains(&addr) {
            self.addrs.push(addr);
        }
    }

    /// First non-secondary address in declaration order.
    pub fn primary_addr(&self) -> Option<&Addr> {
        self.addrs.iter().find(|a| !a.secondary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vlan {
    pub id: u32,
    pub name: Option<String>,
}

impl fmt::Display for Vlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "vlan {} {name}", self.id),
            None => write!(f, "vlan {}", self.id),
        }
    }
}

/// A VRF referenced by `vrf member`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vrf {
    pub name: String,
    pub routes: Vec<Route>,
}

impl Vrf {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: Vec::new(),
        }
    }
}

/// Route table entry. No dialect rule populates routes yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Route {
    pub source: Option<String>,
    pub addr: Option<Addr>,
    pub next_hop: Option<String>,
    pub time_stamp: Option<String>,
    pub interface_name: Option<String>,
    pub metric: Option<u32>,
}

/// Object variant discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Name,
    Network,
    Service,
    NetworkGroup,
    ServiceGroup,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectKind::Name => "name",
            ObjectKind::Network => "network",
            ObjectKind::Service => "service",
            ObjectKind::NetworkGroup => "network group",
            ObjectKind::ServiceGroup => "service group",
        })
    }
}

/// A named, reusable object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Object {
    pub name: Option<String>,
    pub description: Option<String>,
    pub body: ObjectBody,
}

/// Variant-specific object data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ObjectBody {
    /// Registered by name but not decoded yet.
    #[default]
    Untyped,
    Name {
        addr: Option<Addr>,
    },
    Network(NetworkObject),
    Service(ServiceObject),
    NetworkGroup {
        items: Vec<GroupItem>,
    },
    ServiceGroup {
        items: Vec<GroupItem>,
    },
}

/// Data of a `NETWORK` object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkObject {
    pub value: Option<NetworkValue>,
    /// Automatic NAT declared inside this object's block.
    pub nat: Option<Box<Nat>>,
}

/// Address payload of a network object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkValue {
    Addr(Addr),
    Range(Addr, Addr),
    Fqdn(String),
}

/// Data of a `SERVICE` object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceObject {
    pub protocol: Option<String>,
    pub src_op: Option<String>,
    pub src_port: Option<Port>,
    pub dest_op: Option<String>,
    pub dest_port: Option<Port>,
}

/// A port operand: one token or an inclusive range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Port {
    Single(String),
    Range(String, String),
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Single(port) => f.write_str(port),
            Port::Range(start, end) => write!(f, "{start} - {end}"),
        }
    }
}

/// One member of an object group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupItem {
    /// Literal host or subnet.
    Addr(Addr),
    /// Host or subnet whose address is given by a `name`/object reference.
    NamedAddr {
        target: ObjectRef,
        prefix: Option<u8>,
        family: AddrFamily,
    },
    /// Nested object or group.
    Object(ObjectRef),
}

impl Object {
    /// Create an untyped object with a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Anonymous network object wrapping one address.
    pub fn network_addr(name: Option<String>, addr: Option<Addr>) -> Self {
        Self {
            name,
            description: None,
            body: ObjectBody::Network(NetworkObject {
                value: addr.map(NetworkValue::Addr),
                nat: None,
            }),
        }
    }

    pub fn kind(&self) -> Option<ObjectKind> {
        match &self.body {
            ObjectBody::Untyped => None,
            ObjectBody::Name { .. } => Some(ObjectKind::Name),
            ObjectBody::Network(_) => Some(ObjectKind::Network),
            ObjectBody::Service(_) => Some(ObjectKind::Service),
            ObjectBody::NetworkGroup { .. } => Some(ObjectKind::NetworkGroup),
            ObjectBody::ServiceGroup { .. } => Some(ObjectKind::ServiceGroup),
        }
    }

    /// Network data, converting the body to a network object when it holds
    /// another variant. Existing network data is kept.
    pub fn network_mut(&mut self) -> &mut NetworkObject {
        if !matches!(self.body, ObjectBody::Network(_)) {
            self.body = ObjectBody::Network(NetworkObject::default());
        }
        match &mut self.body {
            ObjectBody::Network(network) => network,
            _ => unreachable!("body was just set to a network object"),
        }
    }

    /// Service data, converting the body when needed.
    pub fn service_mut(&mut self) -> &mut ServiceObject {
        if !matches!(self.body, ObjectBody::Service(_)) {
            self.body = ObjectBody::Service(ServiceObject::default());
        }
        match &mut self.body {
            ObjectBody::Service(service) => service,
            _ => unreachable!("body was just set to a service object"),
        }
    }

    /// Network group members, converting the body when needed.
    pub fn group_items_mut(&mut self) -> &mut Vec<GroupItem> {
        if !matches!(self.body, ObjectBody::NetworkGroup { .. }) {
            self.body = ObjectBody::NetworkGroup { items: Vec::new() };
        }
        match &mut self.body {
            ObjectBody::NetworkGroup { items } => items,
            _ => unreachable!("body was just set to a network group"),
        }
    }

    pub fn network(&self) -> Option<&NetworkObject> {
        match &self.body {
            ObjectBody::Network(network) => Some(network),
            _ => None,
        }
    }

    pub fn service(&self) -> Option<&ServiceObject> {
        match &self.body {
            ObjectBody::Service(service) => Some(service),
            _ => None,
        }
    }

    pub fn items(&self) -> &[GroupItem] {
        match &self.body {
            ObjectBody::NetworkGroup { items } | ObjectBody::ServiceGroup { items } => items,
            _ => &[],
        }
    }

    /// Single address of a name or network object.
    pub fn addr(&self) -> Option<&Addr> {
        match &self.body {
            ObjectBody::Name { addr } => addr.as_ref(),
            ObjectBody::Network(NetworkObject {
                value: Some(NetworkValue::Addr(addr)),
                ..
            }) => Some(addr),
            _ => None,
        }
    }

    /// Automatic NAT owned by this network object.
    pub fn auto_nat(&self) -> Option<&Nat> {
        self.network()?.nat.as_deref()
    }
}

/// NAT reference to an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterfaceRef {
    Declared(InterfaceId),
    /// The wildcard `any` interface.
    Any,
    /// Name that did not match any `nameif` at the point of use.
    Unresolved(String),
}

/// NAT or group reference to an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectRef {
    Declared(ObjectId),
    /// One-off object synthesized from a literal (address, `interface`, `any`,
    /// literal port).
    Inline(Box<Object>),
    /// Name that was not declared at the point of use.
    Unresolved(String),
}

/// Static or dynamic translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NatType {
    Static,
    Dynamic,
}

impl NatType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "static" => Some(NatType::Static),
            "dynamic" => Some(NatType::Dynamic),
            _ => None,
        }
    }
}

impl fmt::Display for NatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NatType::Static => "static",
            NatType::Dynamic => "dynamic",
        })
    }
}

/// One address translation rule, automatic or manual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nat {
    pub inside_interface: InterfaceRef,
    pub outside_interface: InterfaceRef,
    pub src_type: NatType,
    pub inside_src: ObjectRef,
    pub outside_src: ObjectRef,
    /// Outside source falls back to the outside interface address.
    pub fallback: bool,
    pub dest_type: Option<NatType>,
    pub inside_dest: Option<ObjectRef>,
    pub outside_dest: Option<ObjectRef>,
    /// Protocol named in an automatic NAT service clause.
    pub service_protocol: Option<String>,
    pub inside_service: Option<ObjectRef>,
    pub outside_service: Option<ObjectRef>,
    pub after_auto: bool,
    pub unidirectional: bool,
    pub no_proxy_arp: bool,
    pub route_lookup: bool,
    pub dns: bool,
}

/// Recoverable parser note attached to one source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFinding {
    pub code: String,
    pub message: String,
    pub source_name: String,
    /// 1-based line number.
    pub line: usize,
    /// Offending line text.
    pub raw: String,
}

impl fmt::Display for ParseFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:\n{}\n{}",
            self.source_name, self.line, self.message, self.raw
        )
    }
}

impl Nat {
    /// A rule with the mandatory fields set and every option cleared.
    pub fn new(
        inside_interface: InterfaceRef,
        outside_interface: InterfaceRef,
        src_type: NatType,
        inside_src: ObjectRef,
        outside_src: ObjectRef,
    ) -> Self {
        Self {
            inside_interface,
            outside_interface,
            src_type,
            inside_src,
            outside_src,
            fallback: false,
            dest_type: None,
            inside_dest: None,
            outside_dest: None,
            service_protocol: None,
            inside_service: None,
            outside_service: None,
            after_auto: false,
            unidirectional: false,
            no_proxy_arp: false,
            route_lookup: false,
            dns: false,
        }
    }
}
