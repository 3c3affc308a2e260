use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::cli::Cli;

/// Paths and formatting used by a batch run.
///
/// Built from the defaults, then an optional settings file, then the command
/// line, each layer overriding the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub nat_file: PathBuf,
    pub source_dir: PathBuf,
    pub error_log: Option<PathBuf>,
    pub delimiter: char,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nat_file: PathBuf::from("nat.csv"),
            source_dir: PathBuf::from("configs"),
            error_log: None,
            delimiter: ',',
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        parse_settings(&raw).with_context(|| format!("invalid settings {}", path.display()))
    }

    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(Some(path)) = &cli.nat {
            settings.nat_file = path.clone();
        }
        if let Some(dir) = &cli.src_dir {
            settings.source_dir = dir.clone();
        }
        if let Some(path) = &cli.error_log {
            settings.error_log = Some(path.clone());
        }
        if let Some(delimiter) = cli.delimiter {
            settings.delimiter = delimiter;
        }
        Ok(settings)
    }
}

fn parse_settings(raw: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str::<Settings>(raw)
}
