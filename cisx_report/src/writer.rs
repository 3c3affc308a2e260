use std::io::{self, Write};

use cisx_ir::Device;

use crate::columns::NatColumn;
use crate::rows::{NatRow, nat_rows};

/// Delimiter-separated NAT report over any number of devices.
///
/// The header is written once, before the first row or on [`finish`] for an
/// empty report. Cells are written verbatim; no quoting is applied.
///
/// [`finish`]: NatReportWriter::finish
pub struct NatReportWriter<W: Write> {
    out: W,
    delimiter: char,
    header_written: bool,
    rows_written: usize,
}

impl<W: Write> NatReportWriter<W> {
    pub fn new(out: W, delimiter: char) -> Self {
        Self {
            out,
            delimiter,
            header_written: false,
            rows_written: 0,
        }
    }

    /// Append the rows projected from `device`; returns how many were written.
    pub fn write_device(&mut self, device: &Device) -> io::Result<usize> {
        let rows = nat_rows(device);
        self.write_rows(&rows)?;
        Ok(rows.len())
    }

    pub fn write_rows(&mut self, rows: &[NatRow]) -> io::Result<()> {
        self.write_header()?;
        for row in rows {
            self.write_line(row.cells().iter().map(String::as_str))?;
            self.rows_written += 1;
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.write_header()?;
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_header(&mut self) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }
        self.header_written = true;
        self.write_line(NatColumn::ALL.iter().map(|c| c.title()))
    }

    fn write_line<'a>(&mut self, cells: impl Iterator<Item = &'a str>) -> io::Result<()> {
        let mut buf = [0; 4];
        let delimiter: &str = self.delimiter.encode_utf8(&mut buf);
        let line = cells.collect::<Vec<_>>().join(delimiter);
        writeln!(self.out, "{line}")
    }
}

/// Render rows as a JSON array of objects keyed by column title.
pub fn rows_to_json(rows: &[NatRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}
