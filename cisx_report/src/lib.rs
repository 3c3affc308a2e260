//! Flat NAT report for parsed `cisx_ir` devices.
//!
//! This crate provides:
//! - the report column set (`NatColumn`)
//! - projection of automatic and manual NAT rules into rows (`nat_rows`)
//! - a delimiter-separated writer (`NatReportWriter`) and JSON rendering
//!
//! # Example
//!
//! ```rust
//! use cisx_ir::Device;
//! use cisx_report::NatReportWriter;
//!
//! let mut writer = NatReportWriter::new(Vec::new(), ',');
//! writer.write_device(&Device::default()).unwrap();
//! let text = String::from_utf8(writer.finish().unwrap()).unwrap();
//! assert!(text.starts_with("Hostname,Object Name,"));
//! ```

mod columns;
mod rows;
mod writer;

pub use columns::NatColumn;
pub use rows::{NatRow, nat_rows};
pub use writer::{NatReportWriter, rows_to_json};
