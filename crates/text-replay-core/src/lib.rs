#![deny(unused_must_use)]
// Don't allow dbg! prints in release.
#![cfg_attr(not(debug_assertions), deny(clippy::dbg_macro))]

pub use config::{ExportPolicy, ParseFailurePolicy, SessionConfig};
pub use dataset::Dataset;
pub use error::{ExportError, ParseError, SessionError};
pub use export::{ExportPayload, ExportTable, export_table};
pub use filter::{FilterChoice, FilterSelection};
pub use grouping::{Group, GroupKey, Grouping, KeyValue};
pub use ledger::{TagEntry, TagLedger, TagSummary};
pub use navigator::{CHUNK_SIZE, ChunkNavigator, Cursor, Navigation};
pub use session::{ChunkDisplay, ChunkRow, ChunkView, LoadSummary, MissingSelection, Session};
pub use utils::{
    io_utils::{Separator, detect_separator},
    row::RowId,
};

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filter;
pub mod grouping;
pub mod ledger;
pub mod navigator;
pub mod session;
pub mod utils;
