use clap::{Parser, Subcommand};
use std::path::PathBuf;

use profile_viewer::constants::{DEFAULT_INPUT_CANDIDATES, DEFAULT_REGISTRY_BASE_URL};
use profile_viewer::session::Selector;

#[derive(Debug, Parser)]
#[command(name = "profile_viewer")]
#[command(about = "Browse physician enrichment exports one profile at a time", long_about = None)]
pub struct Args {
    /// Table to load. If omitted, the well-known export names are tried in --data-dir.
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,

    /// Directory searched for the well-known export names.
    #[arg(long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    /// Base URL for NPI registry links; the NPI is appended as a path segment.
    #[arg(long, global = true, default_value = DEFAULT_REGISTRY_BASE_URL)]
    pub registry_base_url: String,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every profile label in navigation order.
    List,
    /// Render one profile as markdown (the first one by default).
    Show(ShowArgs),
    /// Write all normalized records as a JSON array.
    Export(ExportArgs),
    /// Page through profiles interactively on stdin.
    Browse,
}

#[derive(Debug, clap::Args)]
pub struct ShowArgs {
    /// 1-based position in the list printed by `list`.
    #[arg(long, conflicts_with_all = ["name", "npi"], value_parser = parse_position)]
    pub index: Option<usize>,

    /// Display name (case-insensitive).
    #[arg(long, conflicts_with = "npi")]
    pub name: Option<String>,

    #[arg(long)]
    pub npi: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct ExportArgs {
    /// Indent the JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

impl Args {
    pub fn input_candidates(&self) -> Vec<PathBuf> {
        match &self.input {
            Some(path) => vec![path.clone()],
            None => DEFAULT_INPUT_CANDIDATES
                .iter()
                .map(|name| self.data_dir.join(name))
                .collect(),
        }
    }
}

fn parse_position(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("positions start at 1".to_string()),
        Ok(n) => Ok(n),
        Err(err) => Err(err.to_string()),
    }
}

impl ShowArgs {
    pub fn selector(&self) -> Selector {
        if let Some(name) = &self.name {
            Selector::Name(name.clone())
        } else if let Some(npi) = &self.npi {
            Selector::Npi(npi.clone())
        } else {
            Selector::Index(self.index.unwrap_or(1).saturating_sub(1))
        }
    }
}
