mod batch;
mod cli;
mod settings;

use clap::Parser;

use crate::cli::Cli;
use crate::settings::Settings;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CISX_LOG"))
        .with_writer(std::io::stderr)
        .init();

    if cli.nat.is_none() {
        println!("nothing to do: pass --nat [PATH] to write the NAT report");
        return Ok(());
    }

    let settings = Settings::resolve(&cli)?;
    tracing::debug!(?settings, "resolved settings");

    let mut findings = Vec::new();
    let result = batch::write_nat_report(&settings, cli.json, &mut findings);
    let logged = batch::report_findings(&settings, &findings);
    match (result, logged) {
        (Err(err), Err(log_err)) => {
            tracing::error!(error = %log_err, "findings not logged");
            Err(err)
        }
        (result, logged) => {
            logged?;
            result.map(|_| ())
        }
    }
}
