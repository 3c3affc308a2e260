//! Line patterns for the multi-field command forms.
//!
//! Every pattern is anchored on both ends and tolerates leading indentation.

use std::sync::LazyLock;

use regex::Regex;

/// Characters allowed in object, interface and port names.
const NAME: &str = r"[-A-Za-z0-9_.+()]+";

/// Dotted quad with an optional `/len` suffix, captured as `<group>` and
/// `<group>_len`.
fn addr(group: &str) -> String {
    format!(r"(?P<{group}>\d{{1,3}}\.\d{{1,3}}\.\d{{1,3}}\.\d{{1,3}})(?:/(?P<{group}_len>\d{{1,2}}))?")
}

fn name(group: &str) -> String {
    format!("(?P<{group}>{NAME})")
}

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => panic!("invalid built-in pattern {pattern}: {err}"),
    }
}

pub(crate) static NAME_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(&format!("^{NAME}$")));

/// `ip address <addr>[/len] [<mask>] [standby <addr>] [secondary]`
pub(crate) static IP_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^\s*ip\s+address\s+{}(?:\s+{})?(?:\s+standby\s+{})?(?:\s+(?P<secondary>secondary))?\s*$",
        addr("addr"),
        addr("mask"),
        addr("standby"),
    ))
});

/// `name <addr> <name> [description <text>]`
pub(crate) static NAME_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^\s*name\s+(?P<addr>\d{{1,3}}\.\d{{1,3}}\.\d{{1,3}}\.\d{{1,3}})\s+{}(?:\s+description\s+(?P<description>.+?))?\s*$",
        name("name"),
    ))
});

/// `subnet <addr>[/len] [<mask>]`
pub(crate) static SUBNET: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^\s*subnet\s+{}(?:\s+{})?\s*$",
        addr("addr"),
        addr("mask"),
    ))
});

/// `range <addr> <addr>`
pub(crate) static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^\s*range\s+{}\s+{}\s*$",
        addr("start"),
        addr("end"),
    ))
});

/// `service <tcp|udp> [source <op> <port> [<end>]] [destination <op> <port> [<end>]]`
pub(crate) static SERVICE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^\s*service\s+(?P<protocol>tcp|udp)(?:\s+source\s+(?P<src_op>[A-Za-z]+)\s+{}(?:\s+{})?)?(?:\s+destination\s+(?P<dest_op>[A-Za-z]+)\s+{}(?:\s+{})?)?\s*$",
        name("src_port"),
        name("src_end"),
        name("dest_port"),
        name("dest_end"),
    ))
});

/// Automatic NAT inside a network object block.
pub(crate) static AUTO_NAT: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^\s*nat\s+\({},\s*{}\)\s+(?P<src_type>static|dynamic)\s+(?:{}|{})(?:\s+(?P<fallback>interface))?(?:\s+service\s+(?P<protocol>tcp|udp)\s+{}\s+{})?(?:\s+(?P<dns>dns))?\s*$",
        name("inside"),
        name("outside"),
        addr("addr"),
        name("object"),
        name("inside_service"),
        name("outside_service"),
    ))
});

/// Manual (twice) NAT statement at the top level.
pub(crate) static MANUAL_NAT: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        concat!(
            r"^\s*nat\s+\({},\s*{}\)\s+",
            r"(?:(?P<after_auto>after-auto)\s+)?",
            r"source\s+(?P<src_type>static|dynamic)\s+{}\s+{}",
            r"(?:\s+(?P<fallback>interface))?",
            r"(?:\s+destination\s+(?P<dest_type>static)\s+{}\s+{})?",
            r"(?:\s+service\s+{}\s+{})?",
            r"(?:\s+(?P<unidirectional>unidirectional))?",
            r"(?:\s+(?P<no_proxy_arp>no-proxy-arp))?",
            r"(?:\s+(?P<route_lookup>route-lookup))?\s*$",
        ),
        name("inside"),
        name("outside"),
        name("inside_src"),
        name("outside_src"),
        name("inside_dest"),
        name("outside_dest"),
        name("inside_service"),
        name("outside_service"),
    ))
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_address_accepts_mask_standby_and_secondary() {
        let caps = IP_ADDRESS
            .captures(" ip address 10.0.0.1 255.255.255.0 standby 10.0.0.2")
            .expect("match");
        assert_eq!(&caps["addr"], "10.0.0.1");
        assert_eq!(&caps["mask"], "255.255.255.0");
        assert_eq!(&caps["standby"], "10.0.0.2");
        assert!(caps.name("secondary").is_none());

        let caps = IP_ADDRESS
            .captures(" ip address 10.0.1.1/24 secondary")
            .expect("match");
        assert_eq!(&caps["addr_len"], "24");
        assert!(caps.name("mask").is_none());
        assert!(caps.name("secondary").is_some());

        assert!(IP_ADDRESS.captures(" ip address dhcp setroute").is_none());
    }

    #[test]
    fn name_object_description_is_free_text() {
        let caps = NAME_OBJECT
            .captures("name 10.1.1.1 SERVER1 description main web server")
            .expect("match");
        assert_eq!(&caps["addr"], "10.1.1.1");
        assert_eq!(&caps["name"], "SERVER1");
        assert_eq!(&caps["description"], "main web server");
        assert!(NAME_OBJECT.captures("name 10.1.1.0/24 NET").is_none());
    }

    #[test]
    fn service_ports_do_not_swallow_destination_keyword() {
        let caps = SERVICE
            .captures(" service tcp source eq 1024 destination range 80 90")
            .expect("match");
        assert_eq!(&caps["src_op"], "eq");
        assert_eq!(&caps["src_port"], "1024");
        assert!(caps.name("src_end").is_none());
        assert_eq!(&caps["dest_op"], "range");
        assert_eq!(&caps["dest_port"], "80");
        assert_eq!(&caps["dest_end"], "90");
    }

    #[test]
    fn auto_nat_prefers_literal_address_over_name() {
        let caps = AUTO_NAT
            .captures(" nat (inside,outside) static 203.0.113.5")
            .expect("match");
        assert_eq!(&caps["addr"], "203.0.113.5");
        assert!(caps.name("object").is_none());

        let caps = AUTO_NAT
            .captures(" nat (inside,outside) dynamic interface")
            .expect("match");
        assert_eq!(&caps["object"], "interface");
        assert!(caps.name("fallback").is_none());

        let caps = AUTO_NAT
            .captures(" nat (any,outside) dynamic POOL interface service tcp www 8080 dns")
            .expect("match");
        assert_eq!(&caps["inside"], "any");
        assert_eq!(&caps["object"], "POOL");
        assert!(caps.name("fallback").is_some());
        assert_eq!(&caps["protocol"], "tcp");
        assert_eq!(&caps["outside_service"], "8080");
        assert!(caps.name("dns").is_some());
    }

    #[test]
    fn manual_nat_captures_every_clause() {
        let caps = MANUAL_NAT
            .captures(
                "nat (inside,outside) after-auto source dynamic LAN PUB interface destination static DST DST service S1 S2 unidirectional no-proxy-arp route-lookup",
            )
            .expect("match");
        assert!(caps.name("after_auto").is_some());
        assert_eq!(&caps["inside_src"], "LAN");
        assert_eq!(&caps["outside_src"], "PUB");
        assert!(caps.name("fallback").is_some());
        assert_eq!(&caps["dest_type"], "static");
        assert_eq!(&caps["outside_service"], "S2");
        assert!(caps.name("unidirectional").is_some());
        assert!(caps.name("no_proxy_arp").is_some());
        assert!(caps.name("route_lookup").is_some());

        assert!(
            MANUAL_NAT
                .captures("nat (inside,outside) source static A B extra-token")
                .is_none()
        );
    }
}
