use csv::ReaderBuilder;
use itertools::Itertools;

use crate::{
    error::ParseError,
    utils::{
        io_utils::Separator,
        row::{Row, RowId, add_row_ids},
    },
};

/// An uploaded table. Rows keep the ids they were given at load time for the
/// whole lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Parse delimited text with a header row.
    ///
    /// `row_id_column` is reserved for the exported row id and may not appear
    /// in the header. Ragged records and invalid UTF-8 are rejected as a whole,
    /// there is never a partially loaded dataset.
    pub fn parse(
        bytes: &[u8],
        separator: Separator,
        row_id_column: &str,
    ) -> Result<Self, ParseError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(separator.as_byte())
            .from_reader(bytes);

        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(ParseError::Empty);
        }
        if let Some(dup) = headers.iter().duplicates().next() {
            return Err(ParseError::DuplicateColumn(dup.to_string()));
        }
        if headers.iter().any(|h| h == row_id_column) {
            return Err(ParseError::ReservedColumn(row_id_column.to_string()));
        }

        let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            columns: headers.iter().map(str::to_string).collect(),
            rows: add_row_ids(records),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
