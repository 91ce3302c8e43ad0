use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Field separator of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Separator {
    #[default]
    Comma,
    Tab,
}

impl Separator {
    pub fn as_byte(self) -> u8 {
        match self {
            Separator::Comma => b',',
            Separator::Tab => b'\t',
        }
    }
}

impl FromStr for Separator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "comma" | "," | "_comma" => Ok(Separator::Comma),
            "tab" | "\t" | "\\t" | "_tab" => Ok(Separator::Tab),
            _ => Err(ParseError::UnknownSeparator(s.to_string())),
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separator::Comma => f.write_str("comma"),
            Separator::Tab => f.write_str("tab"),
        }
    }
}

/// Guess the separator from a file name. Anything that is not tab-separated by
/// extension is read as comma-separated.
pub fn detect_separator(path: &str) -> Separator {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".tsv") || lower.ends_with(".tab") {
        Separator::Tab
    } else {
        Separator::Comma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separator() {
        assert_eq!("comma".parse::<Separator>().ok(), Some(Separator::Comma));
        assert_eq!("_tab".parse::<Separator>().ok(), Some(Separator::Tab));
        assert_eq!("\t".parse::<Separator>().ok(), Some(Separator::Tab));
        assert!(matches!(
            "semicolon".parse::<Separator>(),
            Err(ParseError::UnknownSeparator(_))
        ));
    }

    #[test]
    fn test_detect_separator() {
        assert_eq!(detect_separator("chat.TSV"), Separator::Tab);
        assert_eq!(detect_separator("chat.csv"), Separator::Comma);
        assert_eq!(detect_separator("chat"), Separator::Comma);
    }
}
