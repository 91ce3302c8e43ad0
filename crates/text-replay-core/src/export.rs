use std::io::{self, Write};

use csv::WriterBuilder;
use tracing::info;

use crate::{
    config::ExportPolicy,
    dataset::Dataset,
    error::ExportError,
    ledger::TagLedger,
};

fn bool_cell(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// The dataset with its row id column and one boolean column per tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of the first column called `name`.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    pub fn write_csv<W: Write>(&self, wtr: W) -> Result<(), ExportError> {
        let mut wtr = WriterBuilder::new().from_writer(wtr);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, ExportError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }
}

/// Build the export table.
///
/// Fails with [`ExportError::NoData`] without a dataset or without tags, and,
/// when `policy.require_positive_labels` is set, with
/// [`ExportError::NoPositiveLabels`] if no row is marked under any tag.
pub fn export_table(
    dataset: Option<&Dataset>,
    ledger: &TagLedger,
    policy: &ExportPolicy,
    row_id_column: &str,
) -> Result<ExportTable, ExportError> {
    let Some(dataset) = dataset else {
        return Err(ExportError::NoData);
    };
    if ledger.is_empty() {
        return Err(ExportError::NoData);
    }
    if policy.require_positive_labels && !ledger.has_marked_rows() {
        return Err(ExportError::NoPositiveLabels);
    }

    let headers: Vec<String> = dataset
        .columns()
        .iter()
        .cloned()
        .chain(std::iter::once(row_id_column.to_string()))
        .chain(ledger.entries().map(|t| t.name().to_string()))
        .collect();

    let rows = dataset
        .rows()
        .iter()
        .map(|row| {
            let mut out: Vec<String> = row.record().iter().map(str::to_string).collect();
            out.push(row.id().to_string());
            out.extend(
                ledger
                    .entries()
                    .map(|t| bool_cell(t.is_marked(row.id())).to_string()),
            );
            out
        })
        .collect();

    info!(
        "exporting {} rows with {} tag columns",
        dataset.len(),
        ledger.len()
    );
    Ok(ExportTable { headers, rows })
}

/// What a download hands to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub file_name: String,
    pub contents: String,
}
