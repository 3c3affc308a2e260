use std::fmt;

/// One column of the NAT report, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NatColumn {
    Hostname,
    ObjectName,
    InsideIntfName,
    InsideIntfAddr,
    MappedIntfName,
    MappedIntfAddr,
    SrcType,
    InsideSrcName,
    InsideSrcAddr,
    MappedSrcName,
    MappedSrcAddr,
    FallbackAddr,
    DestType,
    InsideDestName,
    InsideDestAddr,
    MappedDestName,
    MappedDestAddr,
    SrvProtocol,
    InsideSrvName,
    InsideSrvSrcPort,
    InsideSrvDestPort,
    MappedSrvName,
    MappedSrvSrcPort,
    MappedSrvDestPort,
    AfterAuto,
    NoProxyArp,
    RouteLookup,
}

impl NatColumn {
    pub const ALL: [NatColumn; 27] = [
        NatColumn::Hostname,
        NatColumn::ObjectName,
        NatColumn::InsideIntfName,
        NatColumn::InsideIntfAddr,
        NatColumn::MappedIntfName,
        NatColumn::MappedIntfAddr,
        NatColumn::SrcType,
        NatColumn::InsideSrcName,
        NatColumn::InsideSrcAddr,
        NatColumn::MappedSrcName,
        NatColumn::MappedSrcAddr,
        NatColumn::FallbackAddr,
        NatColumn::DestType,
        NatColumn::InsideDestName,
        NatColumn::InsideDestAddr,
        NatColumn::MappedDestName,
        NatColumn::MappedDestAddr,
        NatColumn::SrvProtocol,
        NatColumn::InsideSrvName,
        NatColumn::InsideSrvSrcPort,
        NatColumn::InsideSrvDestPort,
        NatColumn::MappedSrvName,
        NatColumn::MappedSrvSrcPort,
        NatColumn::MappedSrvDestPort,
        NatColumn::AfterAuto,
        NatColumn::NoProxyArp,
        NatColumn::RouteLookup,
    ];

    /// Header text for this column.
    pub fn title(self) -> &'static str {
        match self {
            NatColumn::Hostname => "Hostname",
            NatColumn::ObjectName => "Object Name",
            NatColumn::InsideIntfName => "Inside Intf Name",
            NatColumn::InsideIntfAddr => "Inside Intf Addr",
            NatColumn::MappedIntfName => "Mapped Intf Name",
            NatColumn::MappedIntfAddr => "Mapped Intf Addr",
            NatColumn::SrcType => "Src Type",
            NatColumn::InsideSrcName => "Inside Src Name",
            NatColumn::InsideSrcAddr => "Inside Src Addr",
            NatColumn::MappedSrcName => "Mapped Src Name",
            NatColumn::MappedSrcAddr => "Mapped Src Addr",
            NatColumn::FallbackAddr => "Fallback Addr",
            NatColumn::DestType => "Dest Type",
            NatColumn::InsideDestName => "Inside Dest Name",
            NatColumn::InsideDestAddr => "Inside Dest Addr",
            NatColumn::MappedDestName => "Mapped Dest Name",
            NatColumn::MappedDestAddr => "Mapped Dest Addr",
            NatColumn::SrvProtocol => "Srv Protocol",
            NatColumn::InsideSrvName => "Inside Srv Name",
            NatColumn::InsideSrvSrcPort => "Inside Srv Src Port",
            NatColumn::InsideSrvDestPort => "Inside Srv Dest Port",
            NatColumn::MappedSrvName => "Mapped Srv Name",
            NatColumn::MappedSrvSrcPort => "Mapped Srv Src Port",
            NatColumn::MappedSrvDestPort => "Mapped Srv Dest Port",
            NatColumn::AfterAuto => "After-Auto",
            NatColumn::NoProxyArp => "No-Proxy-Arp",
            NatColumn::RouteLookup => "Route-Lookup",
        }
    }

    /// Position of this column in a row.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for NatColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
