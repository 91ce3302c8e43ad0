use std::{cmp::Ordering, collections::BTreeMap, fmt};

use itertools::Itertools;
use tracing::info;

use crate::{
    dataset::Dataset,
    error::{Result, SessionError},
    navigator::sub_chunk_count,
    utils::row::RowId,
};

/// Sentinel a column selector sends for "no level column".
pub const NO_LEVEL: &str = "None";

/// How an empty cell is shown in group labels and filter choices.
pub const BLANK: &str = "(blank)";

/// One cell value used as (part of) a group key.
///
/// Values that both read as finite numbers order numerically, numbers sort
/// before text, and text orders byte-wise. Numeric ties fall back to the raw
/// string so that ordering stays consistent with equality (`1` < `1.0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyValue(String);

impl KeyValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_number(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

impl Ord for KeyValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for KeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str(BLANK)
        } else {
            f.write_str(&self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Single(KeyValue),
    Composite(KeyValue, KeyValue),
}

impl GroupKey {
    pub fn player(&self) -> &KeyValue {
        match self {
            GroupKey::Single(player) | GroupKey::Composite(player, _) => player,
        }
    }

    pub fn level(&self) -> Option<&KeyValue> {
        match self {
            GroupKey::Single(_) => None,
            GroupKey::Composite(_, level) => Some(level),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Single(player) => write!(f, "{player}"),
            GroupKey::Composite(player, level) => write!(f, "{player} / {level}"),
        }
    }
}

/// Rows sharing a key, in dataset order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    key: GroupKey,
    rows: Vec<RowId>,
}

impl Group {
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn rows(&self) -> &[RowId] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sub_chunk_count(&self) -> usize {
        sub_chunk_count(self.rows.len())
    }
}

/// Stable partition of the dataset by `player` and optionally `level`
/// column index, in sorted key order.
pub fn group_rows(dataset: &Dataset, player: usize, level: Option<usize>) -> Vec<Group> {
    let mut partitions: BTreeMap<GroupKey, Vec<RowId>> = BTreeMap::new();
    for row in dataset.rows() {
        let player_value = KeyValue::new(row.get(player));
        let key = match level {
            Some(level) => GroupKey::Composite(player_value, KeyValue::new(row.get(level))),
            None => GroupKey::Single(player_value),
        };
        partitions.entry(key).or_default().push(row.id());
    }

    partitions
        .into_iter()
        .map(|(key, rows)| Group { key, rows })
        .collect()
}

/// The grouping currently configured for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    level_column: Option<String>,
    groups: Vec<Group>,
}

impl Grouping {
    /// Resolve the column names against `dataset` and partition it.
    /// A `level` of `None`, `""` or [`NO_LEVEL`] means single-key grouping.
    pub fn new(dataset: &Dataset, player: &str, level: Option<&str>) -> Result<Self> {
        let player_idx = dataset
            .column_index(player)
            .ok_or_else(|| SessionError::UnknownColumn(player.to_string()))?;

        let level = level.filter(|l| !l.is_empty() && *l != NO_LEVEL);
        let level_idx = level
            .map(|l| {
                dataset
                    .column_index(l)
                    .ok_or_else(|| SessionError::UnknownColumn(l.to_string()))
            })
            .transpose()?;

        let groups = group_rows(dataset, player_idx, level_idx);
        info!(
            "Data grouped by {player}{}. Found {} groups.",
            level.map(|l| format!(", {l}")).unwrap_or_default(),
            groups.len()
        );

        Ok(Self {
            level_column: level.map(str::to_string),
            groups,
        })
    }

    pub fn level_column(&self) -> Option<&str> {
        self.level_column.as_deref()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Distinct player values, ascending.
    pub fn player_values(&self) -> Vec<&KeyValue> {
        self.groups
            .iter()
            .map(|g| g.key().player())
            .sorted()
            .dedup()
            .collect()
    }

    /// Distinct level values, ascending. Empty for single-key grouping.
    pub fn level_values(&self) -> Vec<&KeyValue> {
        self.groups
            .iter()
            .filter_map(|g| g.key().level())
            .sorted()
            .dedup()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::io_utils::Separator;

    fn dataset(input: &str) -> Dataset {
        Dataset::parse(input.as_bytes(), Separator::Comma, "original_index").unwrap()
    }

    #[test]
    fn test_key_order_is_numeric_aware() {
        let mut keys: Vec<KeyValue> = ["10", "b", "2", "", "a", "1.0", "1"]
            .into_iter()
            .map(KeyValue::new)
            .collect();
        keys.sort();
        let sorted: Vec<&str> = keys.iter().map(KeyValue::as_str).collect();
        assert_eq!(sorted, ["1", "1.0", "2", "10", "", "a", "b"]);
    }

    #[test]
    fn test_single_key_groups_are_sorted_and_stable() {
        let ds = dataset("player,text\nbob,1\nalice,2\nbob,3\nalice,4\ncarol,5\n");
        let grouping = Grouping::new(&ds, "player", None).unwrap();
        let keys: Vec<String> = grouping.groups().iter().map(|g| g.key().to_string()).collect();
        assert_eq!(keys, ["alice", "bob", "carol"]);
        assert_eq!(grouping.groups()[0].rows(), [1, 3]);
        assert_eq!(grouping.groups()[1].rows(), [0, 2]);
        assert!(grouping.level_values().is_empty());
    }

    #[test]
    fn test_composite_keys() {
        let ds = dataset("player,level,text\na,2,x\na,1,y\nb,1,z\na,2,w\n");
        let grouping = Grouping::new(&ds, "player", Some("level")).unwrap();
        let keys: Vec<String> = grouping.groups().iter().map(|g| g.key().to_string()).collect();
        assert_eq!(keys, ["a / 1", "a / 2", "b / 1"]);
        assert_eq!(grouping.groups()[1].rows(), [0, 3]);
        assert_eq!(grouping.level_column(), Some("level"));

        let levels: Vec<&str> = grouping
            .level_values()
            .into_iter()
            .map(KeyValue::as_str)
            .collect();
        assert_eq!(levels, ["1", "2"]);
        let players: Vec<&str> = grouping
            .player_values()
            .into_iter()
            .map(KeyValue::as_str)
            .collect();
        assert_eq!(players, ["a", "b"]);
    }

    #[test]
    fn test_none_sentinel_means_single_key() {
        let ds = dataset("player,level\na,1\n");
        let grouping = Grouping::new(&ds, "player", Some(NO_LEVEL)).unwrap();
        assert_eq!(grouping.level_column(), None);
        assert!(matches!(grouping.groups()[0].key(), GroupKey::Single(_)));
    }

    #[test]
    fn test_every_row_in_exactly_one_group() {
        let ds = dataset("player,level\na,1\n,2\nb,\na,1\n,\nc,3\n");
        let grouping = Grouping::new(&ds, "player", Some("level")).unwrap();
        let mut seen: Vec<RowId> = grouping
            .groups()
            .iter()
            .flat_map(|g| g.rows().iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..ds.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_blank_key_label() {
        let ds = dataset("player,level\n,1\na,\n");
        let grouping = Grouping::new(&ds, "player", Some("level")).unwrap();
        let keys: Vec<String> = grouping.groups().iter().map(|g| g.key().to_string()).collect();
        assert_eq!(keys, ["(blank) / 1", "a / (blank)"]);
        assert_eq!(grouping.player_values()[0].as_str(), "");
    }

    #[test]
    fn test_unknown_column() {
        let ds = dataset("player,level\na,1\n");
        assert!(matches!(
            Grouping::new(&ds, "nope", None),
            Err(SessionError::UnknownColumn(c)) if c == "nope"
        ));
        assert!(matches!(
            Grouping::new(&ds, "player", Some("nope")),
            Err(SessionError::UnknownColumn(_))
        ));
    }
}
