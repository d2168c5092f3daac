use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::session::Session;

const HELP: &str = "\
Commands:
  n, next        next profile
  p, prev        previous profile
  g N, goto N    jump to position N (1-based)
  /TEXT          find a label containing TEXT
  l, list        list all profiles
  r, reload      re-read the source file
  h, help        this help
  q, quit        exit
  (empty line)   show the current profile again";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Goto(usize),
    Find(String),
    List,
    Show,
    Reload,
    Help,
    Quit,
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(needle) = line.strip_prefix('/') {
            return Some(BrowseCommand::Find(needle.trim().to_string()));
        }
        let mut words = line.split_whitespace();
        let cmd = match words.next() {
            None => return Some(BrowseCommand::Show),
            Some(word) => word.to_ascii_lowercase(),
        };
        let command = match cmd.as_str() {
            "n" | "next" => BrowseCommand::Next,
            "p" | "prev" => BrowseCommand::Prev,
            "g" | "goto" => {
                let n: usize = words.next()?.parse().ok()?;
                BrowseCommand::Goto(n.saturating_sub(1))
            }
            "l" | "list" => BrowseCommand::List,
            "r" | "reload" => BrowseCommand::Reload,
            "h" | "help" | "?" => BrowseCommand::Help,
            "q" | "quit" | "exit" => BrowseCommand::Quit,
            _ => return None,
        };
        if words.next().is_some() {
            return None;
        }
        Some(command)
    }
}

pub fn write_list<W: Write>(session: &Session, out: &mut W) -> Result<()> {
    let current = session.navigator().position();
    for (i, entry) in session.navigator().entries().iter().enumerate() {
        let marker = if i == current { '>' } else { ' ' };
        writeln!(out, "{marker} {:>4}  {}", i + 1, entry.label).context("Failed writing list")?;
    }
    Ok(())
}

fn write_current<W: Write>(session: &Session, out: &mut W) -> Result<()> {
    let written = match session.render_current() {
        Some(page) => {
            let nav = session.navigator();
            writeln!(out, "[{}/{}]\n\n{page}", nav.position() + 1, nav.len())
        }
        None => writeln!(out, "No records in {}", session.source().display()),
    };
    written.context("Failed writing profile")
}

/// Line-oriented browser. The source is re-checked before every command so
/// edits to the file show up without restarting.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, mut out: W) -> Result<()> {
    write_current(session, &mut out)?;
    write!(out, "> ").context("Failed writing prompt")?;
    out.flush().context("Failed flushing output")?;

    for line in input.lines() {
        let line = line.context("Failed reading command")?;
        let Some(command) = BrowseCommand::parse(&line) else {
            writeln!(out, "Unknown command {:?}. Type h for help.", line.trim())?;
            write!(out, "> ")?;
            out.flush()?;
            continue;
        };

        if command == BrowseCommand::Quit {
            break;
        }

        if command == BrowseCommand::Reload {
            match session.reload() {
                Ok(()) => writeln!(
                    out,
                    "Reloaded {} ({} records)",
                    session.source().display(),
                    session.records().len()
                )?,
                Err(err) => {
                    tracing::warn!(error = %err, "reload failed, keeping loaded data");
                    writeln!(
                        out,
                        "Could not reload {}; keeping {} loaded records.",
                        session.source().display(),
                        session.records().len()
                    )?;
                }
            }
        } else {
            match session.refresh() {
                Ok(true) => writeln!(
                    out,
                    "Source changed; reloaded {} records",
                    session.records().len()
                )?,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "could not re-read source, keeping loaded data");
                }
            }
        }

        match command {
            BrowseCommand::Next => {
                if !session.navigator_mut().next() {
                    writeln!(out, "Already at the last profile.")?;
                }
                write_current(session, &mut out)?;
            }
            BrowseCommand::Prev => {
                if !session.navigator_mut().prev() {
                    writeln!(out, "Already at the first profile.")?;
                }
                write_current(session, &mut out)?;
            }
            BrowseCommand::Goto(index) => {
                session.navigator_mut().goto(index);
                write_current(session, &mut out)?;
            }
            BrowseCommand::Find(needle) => match session.navigator_mut().find(&needle) {
                Some(_) => write_current(session, &mut out)?,
                None => writeln!(out, "No profile matches {needle:?}.")?,
            },
            BrowseCommand::List => write_list(session, &mut out)?,
            BrowseCommand::Show | BrowseCommand::Reload => write_current(session, &mut out)?,
            BrowseCommand::Help => writeln!(out, "{HELP}")?,
            BrowseCommand::Quit => break,
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}
