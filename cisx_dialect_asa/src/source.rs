//! Sequential line reader with a bounded putback window.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use crate::error::ParseError;

/// Number of most recent lines kept for putback.
pub const HISTORY_WINDOW: usize = 10;

/// Line reader tracking the current line's tokens and indentation.
///
/// `advance` moves to the next physical line. `putback(n)` rewinds the cursor
/// so the next `n` advances re-deliver lines from the retained window.
pub struct LineSource {
    source_name: String,
    reader: Box<dyn BufRead>,
    /// Most recent line first.
    history: VecDeque<String>,
    pending: usize,
    lines_read: usize,
    line_number: usize,
    line: Option<String>,
    tokens: Vec<String>,
    indent: usize,
    eof: bool,
}

impl LineSource {
    /// Open `path` for reading.
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let file = File::open(path).map_err(|source| ParseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_reader(
            path.display().to_string(),
            Box::new(BufReader::new(file)),
        ))
    }

    /// Read lines from an arbitrary buffered reader.
    pub fn from_reader(source_name: impl Into<String>, reader: Box<dyn BufRead>) -> Self {
        Self {
            source_name: source_name.into(),
            reader,
            history: VecDeque::with_capacity(HISTORY_WINDOW),
            pending: 0,
            lines_read: 0,
            line_number: 0,
            line: None,
            tokens: Vec::new(),
            indent: 0,
            eof: false,
        }
    }

    /// Read lines from in-memory text.
    pub fn from_text(source_name: impl Into<String>, text: &str) -> Self {
        Self::from_reader(source_name, Box::new(Cursor::new(text.as_bytes().to_vec())))
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Whether any line has been requested yet.
    pub fn started(&self) -> bool {
        self.line.is_some()
    }

    /// End of input was reached. Once set it stays set.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Current line without trailing whitespace; empty at end of input.
    pub fn line(&self) -> &str {
        self.line.as_deref().unwrap_or_default()
    }

    /// 1-based number of the current line.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Whitespace-separated tokens of the current line.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Count of leading whitespace characters; blank lines report 0.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// True when the current line's tokens begin with `prefix`.
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.tokens.len() >= prefix.len()
            && self.tokens.iter().zip(prefix).all(|(token, want)| token == want)
    }

    /// Move to the next line, re-delivering put back lines first.
    pub fn advance(&mut self) -> Result<(), ParseError> {
        if self.pending > 0 {
            self.pending -= 1;
            let line = self.history[self.pending].clone();
            self.line_number = self.lines_read - self.pending;
            tracing::trace!(line = self.line_number, "re-deliver put back line");
            self.set_line(line);
            return Ok(());
        }

        if self.eof {
            return Ok(());
        }

        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .map_err(|source| ParseError::Read {
                source_name: self.source_name.clone(),
                line: self.lines_read,
                source,
            })?;

        if read == 0 {
            self.eof = true;
            self.line_number = self.lines_read;
            self.set_line(String::new());
            return Ok(());
        }

        let line = buf.trim_end().to_string();
        self.lines_read += 1;
        self.line_number = self.lines_read;
        self.history.push_front(line.clone());
        self.history.truncate(HISTORY_WINDOW);
        self.set_line(line);
        Ok(())
    }

    /// Rewind by `nlines` so the next advances re-deliver retained lines.
    pub fn putback(&mut self, nlines: usize) -> Result<(), ParseError> {
        if self.pending + nlines > self.history.len() {
            return Err(ParseError::PutbackOutOfRange {
                source_name: self.source_name.clone(),
                line: self.line_number,
                requested: self.pending + nlines,
                available: self.history.len(),
            });
        }
        self.pending += nlines;
        tracing::trace!(pending = self.pending, "putback");
        Ok(())
    }

    fn set_line(&mut self, line: String) {
        self.tokens = line.split_whitespace().map(ToString::to_string).collect();
        self.indent = if self.tokens.is_empty() {
            0
        } else {
            line.chars().take_while(|c| c.is_whitespace()).count()
        };
        self.line = Some(line);
    }
}
