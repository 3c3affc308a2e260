//! Ordered token-prefix dispatch over a [`LineSource`].

use cisx_ir::{Device, ParseFinding};
use regex::{Captures, Regex};

use crate::error::ParseError;
use crate::source::LineSource;

/// Handler invoked when a rule's prefix matches the current line.
pub type Handler<C> = fn(&mut C, &mut Session) -> Result<(), ParseError>;

/// One `(token prefix -> handler)` entry of a dispatch table.
pub struct Rule<C> {
    pub prefix: &'static [&'static str],
    pub handler: Handler<C>,
}

impl<C> Rule<C> {
    pub const fn new(prefix: &'static [&'static str], handler: Handler<C>) -> Self {
        Self { prefix, handler }
    }
}

/// Where the cursor is left when a dispatch run returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Leave the cursor where the run stopped.
    Consume,
    /// Leave the cursor so the caller's next advance re-delivers the first
    /// line this run did not handle.
    Withhold,
}

/// Mutable state shared by every handler while one file is parsed.
pub struct Session {
    pub lines: LineSource,
    pub device: Device,
    pub findings: Vec<ParseFinding>,
}

impl Session {
    pub fn new(lines: LineSource) -> Self {
        Self {
            lines,
            device: Device::default(),
            findings: Vec::new(),
        }
    }

    /// Dispatch lines against `rules` until `stop` fires or input ends.
    ///
    /// Lines matching no rule are skipped. With [`Exit::Withhold`] the line
    /// that ended the run is put back for the caller.
    pub fn run<C>(
        &mut self,
        ctx: &mut C,
        rules: &[Rule<C>],
        stop: impl Fn(&LineSource) -> bool,
        exit: Exit,
    ) -> Result<(), ParseError> {
        if !self.lines.started() {
            self.lines.advance()?;
        }
        while !self.lines.is_eof() && !stop(&self.lines) {
            self.dispatch(ctx, rules)?;
            self.lines.advance()?;
        }
        if exit == Exit::Withhold {
            self.lines.putback(1)?;
        }
        Ok(())
    }

    /// Dispatch the current line only.
    ///
    /// The cursor advances one line unless `exit` is [`Exit::Withhold`].
    pub fn run_once<C>(
        &mut self,
        ctx: &mut C,
        rules: &[Rule<C>],
        stop: impl Fn(&LineSource) -> bool,
        exit: Exit,
    ) -> Result<(), ParseError> {
        if !self.lines.started() {
            self.lines.advance()?;
        }
        if !self.lines.is_eof() && !stop(&self.lines) {
            self.dispatch(ctx, rules)?;
        }
        if exit == Exit::Consume {
            self.lines.advance()?;
        }
        Ok(())
    }

    fn dispatch<C>(&mut self, ctx: &mut C, rules: &[Rule<C>]) -> Result<(), ParseError> {
        let Some(rule) = rules.iter().find(|rule| self.lines.starts_with(rule.prefix)) else {
            return Ok(());
        };
        tracing::debug!(
            line = self.lines.line_number(),
            rule = ?rule.prefix,
            "dispatch"
        );
        (rule.handler)(ctx, self)
    }

    /// Record a recoverable finding against the current line.
    pub fn record(&mut self, code: &str, message: impl Into<String>) {
        let finding = ParseFinding {
            code: code.to_string(),
            message: message.into(),
            source_name: self.lines.source_name().to_string(),
            line: self.lines.line_number(),
            raw: self.lines.line().to_string(),
        };
        tracing::warn!(
            source = %finding.source_name,
            line = finding.line,
            code = %finding.code,
            "{}",
            finding.message
        );
        self.findings.push(finding);
    }

    /// Token at `index`, recording a finding when the line is too short.
    pub fn token_at(&mut self, index: usize) -> Option<String> {
        match self.lines.token(index) {
            Some(token) => Some(token.to_string()),
            None => {
                self.record("missing-token", "index out of range of tokens");
                None
            }
        }
    }

    /// Tokens from `start` joined by single spaces, recording a finding when
    /// the line has no token at `start`.
    pub fn join_tokens(&mut self, start: usize) -> Option<String> {
        if start >= self.lines.tokens().len() {
            self.record("missing-token", "indices out of range of tokens");
            return None;
        }
        Some(self.lines.tokens()[start..].join(" "))
    }

    /// Match the whole current line against `pattern`.
    ///
    /// The line is passed in by the caller so the captures do not borrow the
    /// session. A mismatch records a `pattern-mismatch` finding.
    pub fn full_match<'l>(
        &mut self,
        pattern: &Regex,
        line: &'l str,
        rule: &str,
    ) -> Option<Captures<'l>> {
        let caps = pattern.captures(line);
        if caps.is_none() {
            self.record("pattern-mismatch", format!("pattern mismatch: {rule}"));
        }
        caps
    }

    /// Give up the device and findings collected so far.
    pub fn finish(self) -> (Device, Vec<ParseFinding>) {
        (self.device, self.findings)
    }
}

/// True when the current line sits at column 0.
pub fn at_top_level(lines: &LineSource) -> bool {
    lines.indent() == 0
}
