use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use cisx_dialect_asa::parse_file;
use cisx_ir::ParseFinding;
use cisx_report::{NatReportWriter, nat_rows, rows_to_json};

use crate::settings::Settings;

/// Regular files in `dir` whose names do not start with `.`, sorted by path.
pub fn source_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to list source directory {}", dir.display()))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut paths = entries
        .into_iter()
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();
    paths.sort();
    Ok(paths)
}

/// Parse every source file and write one combined NAT report.
///
/// Findings are pushed to `findings` as each file completes, so they are
/// available to the caller even when a later file fails. Returns the number
/// of report rows written.
pub fn write_nat_report(
    settings: &Settings,
    json: bool,
    findings: &mut Vec<ParseFinding>,
) -> anyhow::Result<usize> {
    let paths = source_files(&settings.source_dir)?;
    let out = File::create(&settings.nat_file)
        .with_context(|| format!("failed to create report {}", settings.nat_file.display()))?;
    let out = BufWriter::new(out);

    let rows = if json {
        let mut rows = Vec::new();
        for path in &paths {
            let outcome = parse_file(path)?;
            findings.extend(outcome.findings);
            rows.extend(nat_rows(&outcome.device));
        }
        let mut out = out;
        writeln!(out, "{}", rows_to_json(&rows)?)?;
        out.flush()?;
        rows.len()
    } else {
        let mut writer = NatReportWriter::new(out, settings.delimiter);
        for path in &paths {
            let outcome = parse_file(path)?;
            findings.extend(outcome.findings);
            let written = writer.write_device(&outcome.device)?;
            tracing::debug!(path = %path.display(), rows = written, "wrote report rows");
        }
        let rows = writer.rows_written();
        writer.finish()?;
        rows
    };

    tracing::info!(
        files = paths.len(),
        rows,
        report = %settings.nat_file.display(),
        "nat report written"
    );
    Ok(rows)
}

/// Print findings to stdout and append them to the error log when one is
/// configured.
pub fn report_findings(settings: &Settings, findings: &[ParseFinding]) -> anyhow::Result<()> {
    for finding in findings {
        println!("{finding}\n");
    }

    let Some(path) = &settings.error_log else {
        return Ok(());
    };
    if findings.is_empty() {
        return Ok(());
    }
    let mut log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open error log {}", path.display()))?;
    for finding in findings {
        writeln!(log, "{finding}\n")?;
    }
    Ok(())
}
