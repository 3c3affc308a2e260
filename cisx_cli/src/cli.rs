use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "cisx", version)]
#[command(about = "Parse firewall configurations and export a NAT report")]
pub struct Cli {
    /// Parse every file in the source directory and write the NAT report,
    /// to PATH or the configured report file.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub nat: Option<Option<PathBuf>>,

    /// Directory holding the configuration files.
    #[arg(long, value_name = "DIR")]
    pub src_dir: Option<PathBuf>,

    /// TOML settings file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Append parse findings to this file as well as stdout.
    #[arg(long, value_name = "FILE")]
    pub error_log: Option<PathBuf>,

    /// Report column separator.
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Write the report as a JSON array instead of delimited text.
    #[arg(long)]
    pub json: bool,
}
