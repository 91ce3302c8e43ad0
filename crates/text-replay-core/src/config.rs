use bon::Builder;
use serde::Deserialize;

/// Name of the column carrying the original row position in exports.
pub const DEFAULT_ROW_ID_COLUMN: &str = "original_index";

pub const DEFAULT_EXPORT_FILE_NAME: &str = "Codes.csv";

/// What happens to an already loaded dataset when a new upload fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailurePolicy {
    /// Keep the previous dataset and everything derived from it.
    #[default]
    Preserve,
    /// Drop the previous dataset, groups, cursor and tags.
    Discard,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[serde(default)]
pub struct ExportPolicy {
    /// Refuse to export when the ledger holds tags but not a single `true` value.
    #[builder(default = true)]
    pub require_positive_labels: bool,
    #[builder(into, default = String::from(DEFAULT_EXPORT_FILE_NAME))]
    pub file_name: String,
}

impl Default for ExportPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Per-session settings. Usually read from `config.json`, every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[serde(default)]
pub struct SessionConfig {
    #[builder(default)]
    pub parse_failure: ParseFailurePolicy,
    #[builder(default)]
    pub export: ExportPolicy,
    #[builder(into, default = String::from(DEFAULT_ROW_ID_COLUMN))]
    pub row_id_column: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
