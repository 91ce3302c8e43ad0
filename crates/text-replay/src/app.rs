use std::{
    fs,
    io::{BufRead, Write},
    iter,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::Rng;
use text_replay_core::{
    ChunkDisplay, Cursor, ExportError, FilterChoice, FilterSelection, Navigation, RowId, Separator,
    Session, SessionError, detect_separator, filter::ALL,
};

/// One line typed into the session.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a delimited file, replacing the current dataset and tags
    Load {
        path: PathBuf,
        /// `comma` or `tab`; guessed from the extension when omitted
        #[arg(long, short)]
        separator: Option<Separator>,
    },
    /// List the selectable columns
    Columns,
    /// Group rows by a player column and an optional level column
    Group { player: String, level: Option<String> },
    /// Choose the column shown for each row
    Text { column: String },
    /// Restrict the visible groups; an omitted axis means "All"
    Filter {
        #[arg(long)]
        player: Option<String>,
        #[arg(long)]
        level: Option<String>,
    },
    /// Print the current chunk
    Show,
    Next,
    #[command(alias = "previous")]
    Prev,
    /// Jump to a random chunk
    Random,
    /// Jump to a group and chunk, both counted from 1
    Jump {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        group: u64,
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        chunk: u64,
    },
    /// Tag the current chunk; listed row ids are marked, the rest unmarked
    Tag { name: String, ids: Vec<RowId> },
    /// Show how many rows each tag covers
    Summary,
    /// Write the tagged dataset as CSV
    Export { path: Option<PathBuf> },
    #[command(alias = "exit")]
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

/// Split a command line on whitespace, keeping double-quoted runs together.
fn split_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        tokens.push(current);
    }
    tokens
}

pub struct TextReplayApp<R> {
    session: Session,
    rng: R,
}

impl<R: Rng> TextReplayApp<R> {
    pub fn new(session: Session, rng: R) -> Self {
        Self { session, rng }
    }

    pub fn load<W: Write>(
        &mut self,
        path: &Path,
        separator: Option<Separator>,
        out: &mut W,
    ) -> anyhow::Result<()> {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        let separator = separator.unwrap_or_else(|| detect_separator(&path.to_string_lossy()));
        let summary = self.session.upload(&bytes, separator)?;
        writeln!(
            out,
            "File uploaded successfully! ({} rows, {} columns)",
            summary.rows, summary.columns
        )?;
        self.print_columns(out)
    }

    /// Read commands until end of input or `quit`.
    pub fn run<I: BufRead, W: Write>(
        &mut self,
        input: I,
        out: &mut W,
        prompt: bool,
    ) -> anyhow::Result<()> {
        if prompt {
            write!(out, "> ")?;
            out.flush()?;
        }
        for line in input.lines() {
            let line = line.context("Failed to read command")?;
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                match Line::try_parse_from(split_line(trimmed)) {
                    Ok(Line { command }) => match self.execute(command, out) {
                        Ok(Flow::Quit) => return Ok(()),
                        Ok(Flow::Continue) => {}
                        Err(e) => writeln!(out, "Error: {e:#}")?,
                    },
                    Err(e) => write!(out, "{e}")?,
                }
            }
            if prompt {
                write!(out, "> ")?;
                out.flush()?;
            }
        }
        Ok(())
    }

    fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> anyhow::Result<Flow> {
        match command {
            Command::Load { path, separator } => self.load(&path, separator, out)?,
            Command::Columns => self.print_columns(out)?,
            Command::Group { player, level } => {
                let count = self.session.select_grouping(&player, level.as_deref())?;
                writeln!(out, "Grouped into {count} groups.")?;
                self.print_filter_options(out)?;
                self.print_current(out)?;
            }
            Command::Text { column } => {
                self.session.select_text_column(&column)?;
                self.print_current(out)?;
            }
            Command::Filter { player, level } => {
                let visible = self.session.set_filters(FilterSelection {
                    player: FilterChoice::from_selection(player.as_deref()),
                    level: FilterChoice::from_selection(level.as_deref()),
                });
                writeln!(out, "{visible} groups visible.")?;
                self.print_current(out)?;
            }
            Command::Show => self.print_current(out)?,
            Command::Next => {
                let nav = self.session.next();
                self.print_navigation(nav, out)?;
            }
            Command::Prev => {
                let nav = self.session.previous();
                self.print_navigation(nav, out)?;
            }
            Command::Random => {
                let nav = self.session.random_jump(&mut self.rng);
                self.print_navigation(nav, out)?;
            }
            Command::Jump { group, chunk } => {
                let cursor = Cursor::new(group as usize - 1, chunk as usize - 1);
                let nav = self.session.jump(cursor)?;
                self.print_navigation(nav, out)?;
            }
            Command::Tag { name, ids } => {
                let summary = self.session.tag(&name, &ids)?;
                writeln!(out, "{summary}")?;
            }
            Command::Summary => {
                let summary = self.session.tag_summary();
                if summary.is_empty() {
                    writeln!(out, "No rows have been tagged yet.")?;
                }
                for tag in summary {
                    writeln!(out, "- {tag}")?;
                }
            }
            Command::Export { path } => self.export(path, out)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn export<W: Write>(&mut self, path: Option<PathBuf>, out: &mut W) -> anyhow::Result<()> {
        let payload = match self.session.export() {
            Ok(payload) => payload,
            Err(SessionError::Export(
                e @ (ExportError::NoData | ExportError::NoPositiveLabels),
            )) => {
                writeln!(out, "Warning: {e}")?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let path = path.unwrap_or_else(|| PathBuf::from(&payload.file_name));
        fs::write(&path, payload.contents)
            .with_context(|| format!("Failed to write export: {}", path.display()))?;
        writeln!(out, "Exported to {}", path.display())?;
        Ok(())
    }

    fn print_columns<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        writeln!(out, "Columns: {}", self.session.available_columns().join(", "))?;
        Ok(())
    }

    fn print_filter_options<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let choices = |values: Vec<String>| {
            iter::once(ALL.to_string()).chain(values).collect::<Vec<_>>().join(", ")
        };
        writeln!(out, "Players: {}", choices(self.session.player_values()))?;
        let levels = self.session.level_values();
        if !levels.is_empty() {
            writeln!(out, "Levels: {}", choices(levels))?;
        }
        Ok(())
    }

    fn print_navigation<W: Write>(&self, nav: Navigation, out: &mut W) -> anyhow::Result<()> {
        if let Some(notice) = nav.notice() {
            writeln!(out, "{notice}")?;
        }
        if nav.moved() {
            self.print_current(out)?;
        }
        Ok(())
    }

    fn print_current<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        match self.session.current() {
            view @ ChunkDisplay::Chunk(_) => write!(out, "{view}")?,
            other => writeln!(out, "{other}")?,
        }
        Ok(())
    }
}
