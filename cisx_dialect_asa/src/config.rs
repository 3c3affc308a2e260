//! Top-level dispatch table for one configuration file.

use crate::dispatch::{Exit, Rule, Session};
use crate::error::ParseError;
use crate::interface::parse_interface;
use crate::nat::parse_manual_nat;
use crate::object::parse_object;

/// Column-0 dispatch context. Carries no state of its own.
pub(crate) struct TopLevel;

const RULES: &[Rule<TopLevel>] = &[
    Rule::new(&["interface"], on_interface),
    Rule::new(&["name"], on_object),
    Rule::new(&["object"], on_object),
    Rule::new(&["object-group"], on_object),
    Rule::new(&["nat"], on_nat),
    Rule::new(&["hostname"], on_hostname),
];

/// Dispatch every line of the session until input ends.
pub(crate) fn parse_config(session: &mut Session) -> Result<(), ParseError> {
    session.run(&mut TopLevel, RULES, |_| false, Exit::Consume)
}

// A nested run that ends mid-block can hand an indented line back here; the
// top-level rules ignore it.
fn nested(session: &Session) -> bool {
    session.lines.indent() != 0
}

fn on_interface(_: &mut TopLevel, session: &mut Session) -> Result<(), ParseError> {
    if nested(session) {
        return Ok(());
    }
    parse_interface(session)
}

fn on_object(_: &mut TopLevel, session: &mut Session) -> Result<(), ParseError> {
    if nested(session) {
        return Ok(());
    }
    parse_object(session)
}

fn on_nat(_: &mut TopLevel, session: &mut Session) -> Result<(), ParseError> {
    if nested(session) {
        return Ok(());
    }
    parse_manual_nat(session)
}

fn on_hostname(_: &mut TopLevel, session: &mut Session) -> Result<(), ParseError> {
    if nested(session) {
        return Ok(());
    }
    if let Some(hostname) = session.token_at(1) {
        session.device.hostname = Some(hostname);
    }
    Ok(())
}
