//! ASA-style firewall configuration parser for `cisx_ir`.
//!
//! This crate provides:
//! - a line source with a bounded putback window (`LineSource`)
//! - token-prefix dispatch tables driven by indentation (`dispatch`)
//! - grammar handlers for interfaces, objects, object-groups and NAT
//!
//! Parsing is a single left-to-right pass. Grammar mismatches and unresolved
//! references are collected as [`ParseFinding`]s; only I/O failures and
//! putback violations stop a file.
//!
//! # Example
//!
//! ```rust
//! use cisx_dialect_asa::parse_str;
//!
//! let cfg = "hostname FW1\n\
//!            interface GigabitEthernet0/1\n nameif inside\n ip address 10.0.0.1 255.255.255.0\n\
//!            object network WEB1\n host 192.168.1.10\n nat (inside,outside) static 203.0.113.5\n";
//! let outcome = parse_str("fw1.cfg", cfg).unwrap();
//!
//! assert_eq!(outcome.device.hostname.as_deref(), Some("FW1"));
//! assert_eq!(outcome.device.objects[0].name.as_deref(), Some("WEB1"));
//! // `outside` has no `nameif` in this file.
//! assert_eq!(outcome.findings[0].code, "unresolved-interface");
//! ```

mod config;
pub mod dispatch;
mod error;
mod interface;
mod nat;
mod object;
mod patterns;
pub mod source;

use std::path::Path;

use cisx_ir::{Device, ParseFinding};

pub use error::ParseError;
pub use source::{HISTORY_WINDOW, LineSource};

/// Result of parsing one configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub device: Device,
    /// Recoverable findings in line order of discovery.
    pub findings: Vec<ParseFinding>,
}

/// Parse the configuration file at `path`.
pub fn parse_file(path: &Path) -> Result<ParseOutcome, ParseError> {
    tracing::info!(path = %path.display(), "parsing configuration");
    parse_lines(LineSource::open(path)?)
}

/// Parse in-memory configuration text; `source_name` labels findings.
pub fn parse_str(source_name: &str, text: &str) -> Result<ParseOutcome, ParseError> {
    parse_lines(LineSource::from_text(source_name, text))
}

/// Parse every line of `lines` into a fresh device.
pub fn parse_lines(lines: LineSource) -> Result<ParseOutcome, ParseError> {
    let mut session = dispatch::Session::new(lines);
    config::parse_config(&mut session)?;
    let (device, findings) = session.finish();
    tracing::debug!(
        interfaces = device.interfaces.len(),
        objects = device.objects.len(),
        nats = device.nats.len(),
        findings = findings.len(),
        "parsed configuration"
    );
    Ok(ParseOutcome { device, findings })
}
