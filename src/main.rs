mod args;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};

use args::{Args, Command};
use profile_viewer::browse;
use profile_viewer::render::RenderOptions;
use profile_viewer::session::Session;

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let options = RenderOptions {
        registry_base_url: args.registry_base_url.clone(),
    };
    let mut session = Session::open(&args.input_candidates(), options)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.cmd {
        Command::List => browse::write_list(&session, &mut out)?,
        Command::Show(show) => {
            session.select(&show.selector())?;
            let page = session
                .render_current()
                .with_context(|| format!("No records in {}", session.source().display()))?;
            writeln!(out, "{page}").context("Failed writing profile")?;
        }
        Command::Export(export) => {
            let records: Vec<_> = session.records_in_order().collect();
            let written = if export.pretty {
                serde_json::to_writer_pretty(&mut out, &records)
            } else {
                serde_json::to_writer(&mut out, &records)
            };
            written.context("Failed writing JSON export")?;
            writeln!(out)?;
        }
        Command::Browse => {
            let stdin = io::stdin();
            browse::run(&mut session, stdin.lock(), &mut out).context("browse failed")?;
        }
    }
    Ok(())
}
