//! One labeling session.
//!
//! Every user action is a method on [`Session`]. Each method recomputes the
//! derived state it invalidates, always in the order
//! dataset -> groups -> visible groups -> cursor.

use std::{collections::HashSet, fmt};

use rand::Rng;
use tracing::{info, warn};

use crate::{
    config::{ParseFailurePolicy, SessionConfig},
    dataset::Dataset,
    error::{Result, SessionError},
    export::{ExportPayload, export_table},
    filter::{FilterSelection, filter_groups},
    grouping::{Group, Grouping},
    ledger::{TagLedger, TagSummary},
    navigator::{ChunkNavigator, Cursor, Navigation, Position},
    utils::{io_utils::Separator, row::RowId},
};

/// Returned by a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub columns: usize,
}

/// Selection still needed before a chunk can be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSelection {
    Dataset,
    Grouping,
    TextColumn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRow {
    pub id: RowId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkView {
    pub cursor: Cursor,
    pub label: String,
    pub rows: Vec<ChunkRow>,
}

/// What the chunk panel shows right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkDisplay {
    Incomplete(MissingSelection),
    NoData,
    EndOfData,
    Chunk(ChunkView),
}

impl fmt::Display for ChunkDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkDisplay::Incomplete(MissingSelection::Dataset) => {
                f.write_str("Upload a file to begin.")
            }
            ChunkDisplay::Incomplete(MissingSelection::Grouping) => {
                f.write_str("Select a player column (and optionally a level column).")
            }
            ChunkDisplay::Incomplete(MissingSelection::TextColumn) => {
                f.write_str("Select a text column.")
            }
            ChunkDisplay::NoData => f.write_str(
                "No data to display. Upload a file, select columns, or adjust filters.",
            ),
            ChunkDisplay::EndOfData => f.write_str("End of filtered groups."),
            ChunkDisplay::Chunk(view) => {
                writeln!(f, "{}", view.label)?;
                for row in &view.rows {
                    writeln!(f, "[{}] {}", row.id, row.text)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    config: SessionConfig,
    dataset: Option<Dataset>,
    grouping: Option<Grouping>,
    text_column: Option<usize>,
    filters: FilterSelection,
    visible: Vec<usize>,
    navigator: ChunkNavigator,
    ledger: TagLedger,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn grouping(&self) -> Option<&Grouping> {
        self.grouping.as_ref()
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn ledger(&self) -> &TagLedger {
        &self.ledger
    }

    pub fn cursor(&self) -> Cursor {
        self.navigator.cursor()
    }

    /// Drop everything derived from the dataset and install `dataset`.
    fn reset(&mut self, dataset: Option<Dataset>) {
        self.dataset = dataset;
        self.grouping = None;
        self.text_column = None;
        self.filters = FilterSelection::default();
        self.visible.clear();
        self.navigator = ChunkNavigator::default();
        self.ledger = TagLedger::default();
    }

    /// Parse an upload and make it the session's dataset.
    ///
    /// On failure the previous state is kept or discarded according to
    /// [`SessionConfig::parse_failure`].
    pub fn upload(&mut self, bytes: &[u8], separator: Separator) -> Result<LoadSummary> {
        match Dataset::parse(bytes, separator, &self.config.row_id_column) {
            Ok(dataset) => {
                let summary = LoadSummary {
                    rows: dataset.len(),
                    columns: dataset.columns().len(),
                };
                self.reset(Some(dataset));
                info!(
                    rows = summary.rows,
                    columns = summary.columns,
                    "File uploaded and dataset created."
                );
                Ok(summary)
            }
            Err(e) => {
                warn!("Error parsing file: {e}");
                if self.config.parse_failure == ParseFailurePolicy::Discard {
                    self.reset(None);
                }
                Err(e.into())
            }
        }
    }

    /// Columns offered in the column selectors.
    pub fn available_columns(&self) -> Vec<&str> {
        self.dataset
            .iter()
            .flat_map(|d| d.columns())
            .map(String::as_str)
            .filter(|c| *c != self.config.row_id_column)
            .collect()
    }

    /// Regroup by `player` and optional `level`; filters go back to "All".
    pub fn select_grouping(&mut self, player: &str, level: Option<&str>) -> Result<usize> {
        let dataset = self.dataset.as_ref().ok_or(SessionError::NoDataset)?;
        let grouping = Grouping::new(dataset, player, level)?;
        let count = grouping.groups().len();
        self.grouping = Some(grouping);
        self.filters = FilterSelection::default();
        self.refilter();
        Ok(count)
    }

    pub fn select_text_column(&mut self, column: &str) -> Result<()> {
        let dataset = self.dataset.as_ref().ok_or(SessionError::NoDataset)?;
        let idx = dataset
            .column_index(column)
            .ok_or_else(|| SessionError::UnknownColumn(column.to_string()))?;
        self.text_column = Some(idx);
        Ok(())
    }

    /// Apply a new filter selection. Returns the number of visible groups.
    pub fn set_filters(&mut self, filters: FilterSelection) -> usize {
        self.filters = filters;
        self.refilter();
        self.visible.len()
    }

    fn refilter(&mut self) {
        let groups = self.grouping.as_ref().map(Grouping::groups).unwrap_or_default();
        self.visible = filter_groups(groups, &self.filters);
        let sizes = self.visible.iter().map(|&i| groups[i].len()).collect();
        self.navigator = ChunkNavigator::new(sizes);
    }

    pub fn player_values(&self) -> Vec<String> {
        self.grouping
            .iter()
            .flat_map(|g| g.player_values())
            .map(|v| v.to_string())
            .collect()
    }

    pub fn level_values(&self) -> Vec<String> {
        self.grouping
            .iter()
            .flat_map(|g| g.level_values())
            .map(|v| v.to_string())
            .collect()
    }

    pub fn visible_groups(&self) -> impl Iterator<Item = &Group> {
        let groups = self.grouping.as_ref().map(Grouping::groups).unwrap_or_default();
        self.visible.iter().map(move |&i| &groups[i])
    }

    fn visible_group(&self, index: usize) -> Option<&Group> {
        let groups = self.grouping.as_ref()?.groups();
        self.visible.get(index).map(|&i| &groups[i])
    }

    /// Row ids of the chunk under the cursor.
    pub fn current_chunk_ids(&self) -> Option<&[RowId]> {
        match self.navigator.position() {
            Position::Chunk(span) => self
                .visible_group(span.cursor.group)
                .map(|g| &g.rows()[span.start..span.end]),
            Position::Empty | Position::EndOfData => None,
        }
    }

    pub fn current(&self) -> ChunkDisplay {
        let Some(dataset) = &self.dataset else {
            return ChunkDisplay::Incomplete(MissingSelection::Dataset);
        };
        if self.grouping.is_none() {
            return ChunkDisplay::Incomplete(MissingSelection::Grouping);
        }
        let Some(text_idx) = self.text_column else {
            return ChunkDisplay::Incomplete(MissingSelection::TextColumn);
        };

        let span = match self.navigator.position() {
            Position::Empty => return ChunkDisplay::NoData,
            Position::EndOfData => return ChunkDisplay::EndOfData,
            Position::Chunk(span) => span,
        };
        let Some(group) = self.visible_group(span.cursor.group) else {
            return ChunkDisplay::EndOfData;
        };

        let rows = group.rows()[span.start..span.end]
            .iter()
            .filter_map(|&id| dataset.row(id))
            .map(|row| ChunkRow {
                id: row.id(),
                text: row.get(text_idx).to_string(),
            })
            .collect();
        let label = format!(
            "Group {} (Rows {}-{}) | Group {} of {}",
            group.key(),
            span.start + 1,
            span.end,
            span.cursor.group + 1,
            self.visible.len()
        );

        ChunkDisplay::Chunk(ChunkView {
            cursor: span.cursor,
            label,
            rows,
        })
    }

    pub fn next(&mut self) -> Navigation {
        self.navigator.next()
    }

    pub fn previous(&mut self) -> Navigation {
        self.navigator.previous()
    }

    pub fn random_jump<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Navigation {
        self.navigator.random_jump(rng)
    }

    pub fn jump(&mut self, cursor: Cursor) -> Result<Navigation> {
        self.navigator.jump(cursor)
    }

    /// Tag the current chunk: rows in `selected` get `true`, the other rows of
    /// the chunk get `false`.
    pub fn tag(&mut self, name: &str, selected: &[RowId]) -> Result<TagSummary> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyTagName);
        }
        // Tag columns sit next to the original and row-id columns in the export.
        let collides = name == self.config.row_id_column
            || self.dataset.as_ref().is_some_and(|d| d.column_index(name).is_some());
        if collides {
            return Err(SessionError::ReservedTagName(name.to_string()));
        }
        let chunk = self.current_chunk_ids().ok_or(SessionError::NoChunk)?.to_vec();
        let selected: HashSet<RowId> = selected.iter().copied().collect();
        Ok(self.ledger.apply_tag(name, &chunk, &selected))
    }

    pub fn tag_summary(&self) -> Vec<TagSummary> {
        self.ledger.summarize()
    }

    pub fn export(&self) -> Result<ExportPayload> {
        let table = export_table(
            self.dataset.as_ref(),
            &self.ledger,
            &self.config.export,
            &self.config.row_id_column,
        )?;
        Ok(ExportPayload {
            file_name: self.config.export.file_name.clone(),
            contents: table.to_csv_string()?,
        })
    }
}
