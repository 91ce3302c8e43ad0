use crate::grouping::{BLANK, Group, GroupKey, KeyValue};

/// Label filter widgets use for "no constraint".
pub const ALL: &str = "All";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterChoice {
    #[default]
    All,
    Only(String),
}

impl FilterChoice {
    pub fn only(value: impl Into<String>) -> Self {
        FilterChoice::Only(value.into())
    }

    /// Read a widget selection; empty or [`ALL`] mean no constraint and
    /// [`BLANK`] picks the empty key.
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection {
            None | Some("") | Some(ALL) => FilterChoice::All,
            Some(BLANK) => FilterChoice::only(""),
            Some(value) => FilterChoice::only(value),
        }
    }

    pub fn matches(&self, value: &KeyValue) -> bool {
        match self {
            FilterChoice::All => true,
            FilterChoice::Only(expected) => value.as_str() == expected,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub player: FilterChoice,
    /// Ignored for single-key groupings.
    pub level: FilterChoice,
}

impl FilterSelection {
    pub fn matches(&self, key: &GroupKey) -> bool {
        match key {
            GroupKey::Single(player) => self.player.matches(player),
            GroupKey::Composite(player, level) => {
                self.player.matches(player) && self.level.matches(level)
            }
        }
    }
}

/// Indices into `groups` of the groups passing `selection`, in order.
pub fn filter_groups(groups: &[Group], selection: &FilterSelection) -> Vec<usize> {
    groups
        .iter()
        .enumerate()
        .filter(|(_, g)| selection.matches(g.key()))
        .map(|(i, _)| i)
        .collect()
}
