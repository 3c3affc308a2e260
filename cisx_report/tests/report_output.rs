use std::path::Path;

use cisx_dialect_asa::{parse_file, parse_str};
use cisx_report::{NatColumn, NatReportWriter, nat_rows, rows_to_json};

fn parse_sample(name: &str) -> cisx_ir::Device {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("cisx_dialect_asa")
        .join("testdata")
        .join(name);
    parse_file(&path).expect("parse sample").device
}

#[test]
fn single_auto_nat_row() {
    let device = parse_sample("fw1.cfg");
    let rows = nat_rows(&device);
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.get(NatColumn::Hostname), "FW1");
    assert_eq!(row.get(NatColumn::ObjectName), "WEB1");
    assert_eq!(row.get(NatColumn::InsideIntfName), "inside");
    assert_eq!(row.get(NatColumn::InsideIntfAddr), "10.0.0.1/24");
    assert_eq!(row.get(NatColumn::MappedIntfName), "outside");
    assert_eq!(row.get(NatColumn::MappedIntfAddr), "");
    assert_eq!(row.get(NatColumn::SrcType), "static");
    assert_eq!(row.get(NatColumn::InsideSrcName), "WEB1");
    assert_eq!(row.get(NatColumn::InsideSrcAddr), "192.168.1.10");
    assert_eq!(row.get(NatColumn::MappedSrcName), "");
    assert_eq!(row.get(NatColumn::MappedSrcAddr), "203.0.113.5");
}

#[test]
fn edge_configuration_rows() {
    let device = parse_sample("edge-fw.cfg");
    let rows = nat_rows(&device);
    let objects = rows
        .iter()
        .map(|r| r.get(NatColumn::ObjectName))
        .collect::<Vec<_>>();
    assert_eq!(objects, vec!["WEB-SRV", "MAIL-SRV", "INSIDE-NET", "", "", ""]);

    let web = &rows[0];
    assert_eq!(web.get(NatColumn::SrvProtocol), "tcp");
    assert_eq!(web.get(NatColumn::InsideSrvName), "");
    assert_eq!(web.get(NatColumn::InsideSrvSrcPort), "www");
    assert_eq!(web.get(NatColumn::MappedSrvSrcPort), "www");

    let pat = &rows[2];
    assert_eq!(pat.get(NatColumn::InsideSrcAddr), "10.10.10.0/24");
    assert_eq!(pat.get(NatColumn::MappedSrcName), "outside");
    assert_eq!(pat.get(NatColumn::MappedSrcAddr), "198.51.100.2/29");
    assert_eq!(pat.get(NatColumn::FallbackAddr), "198.51.100.2/29");

    let twice = &rows[3];
    assert_eq!(twice.get(NatColumn::DestType), "static");
    assert_eq!(twice.get(NatColumn::InsideDestName), "PARTNER-NET");
    assert_eq!(twice.get(NatColumn::InsideDestAddr), "192.0.2.0/24");
    assert_eq!(twice.get(NatColumn::NoProxyArp), "no-proxy-arp");
    assert_eq!(twice.get(NatColumn::RouteLookup), "route-lookup");
    assert_eq!(twice.get(NatColumn::AfterAuto), "");

    let reverse = &rows[4];
    assert_eq!(reverse.get(NatColumn::InsideSrcName), "any");
    assert_eq!(reverse.get(NatColumn::InsideSrcAddr), "0.0.0.0/0");
    assert_eq!(reverse.get(NatColumn::SrvProtocol), "tcp");
    assert_eq!(reverse.get(NatColumn::InsideSrvName), "ALT-HTTPS");
    assert_eq!(reverse.get(NatColumn::InsideSrvDestPort), "8443");
    assert_eq!(reverse.get(NatColumn::MappedSrvName), "HTTPS");
    assert_eq!(reverse.get(NatColumn::MappedSrvDestPort), "https");

    let overload = &rows[5];
    assert_eq!(overload.get(NatColumn::AfterAuto), "after-auto");
    assert_eq!(overload.get(NatColumn::FallbackAddr), "198.51.100.2/29");
}

#[test]
fn writer_appends_devices_under_one_header() {
    let mut writer = NatReportWriter::new(Vec::new(), ',');
    assert_eq!(writer.write_device(&parse_sample("fw1.cfg")).expect("fw1"), 1);
    assert_eq!(writer.write_device(&parse_sample("edge-fw.cfg")).expect("edge"), 6);

    let text = String::from_utf8(writer.finish().expect("finish")).expect("utf8");
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines.iter().filter(|l| l.starts_with("Hostname,")).count(), 1);
    assert!(lines[1].starts_with("FW1,WEB1,inside,10.0.0.1/24,outside,,static,WEB1,192.168.1.10,,203.0.113.5,"));
    assert!(lines.iter().skip(1).all(|l| l.matches(',').count() == 26));
}

#[test]
fn json_rows_are_keyed_by_title() {
    let outcome = parse_str(
        "inline.cfg",
        "hostname j\nobject network A\n host 10.0.0.1\n nat (any,any) static 192.0.2.1\n",
    )
    .expect("parse");
    let json = rows_to_json(&nat_rows(&outcome.device)).expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    let row = &value[0];
    assert_eq!(row["Hostname"], "j");
    assert_eq!(row["Mapped Src Addr"], "192.0.2.1");
    assert_eq!(row["Inside Intf Name"], "any");
    assert_eq!(row.as_object().map(|o| o.len()), Some(27));
}

#[test]
fn partner_rows_render_host_literal_and_unknown_service_ports() {
    let device = parse_sample("partner-fw.cfg");
    let rows = nat_rows(&device);
    assert_eq!(rows.len(), 2);

    let auto = &rows[0];
    assert_eq!(auto.get(NatColumn::ObjectName), "INSIDE-NET");
    assert_eq!(auto.get(NatColumn::InsideSrcAddr), "10.0.0.0/24");
    assert_eq!(auto.get(NatColumn::MappedSrcAddr), "203.0.113.0");

    let manual = &rows[1];
    assert_eq!(manual.get(NatColumn::ObjectName), "");
    assert_eq!(manual.get(NatColumn::InsideSrvName), "");
    assert_eq!(manual.get(NatColumn::InsideSrvSrcPort), "WEB-PORTS");
    assert_eq!(manual.get(NatColumn::InsideSrvDestPort), "");
    assert_eq!(manual.get(NatColumn::MappedSrvSrcPort), "WEB-PORTS");
}
