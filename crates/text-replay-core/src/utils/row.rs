use csv::StringRecord;

/// Original position of a row in the uploaded file, starting at 0.
pub type RowId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: RowId,
    record: StringRecord,
}

impl Row {
    pub fn id(&self) -> RowId {
        self.id
    }

    /// Cell value for `column`, empty when the record is shorter.
    pub fn get(&self, column: usize) -> &str {
        self.record.get(column).unwrap_or("")
    }

    pub fn record(&self) -> &StringRecord {
        &self.record
    }
}

/// Number records in source order. This is the only place row ids are assigned.
pub fn add_row_ids(records: Vec<StringRecord>) -> Vec<Row> {
    records
        .into_iter()
        .enumerate()
        .map(|(id, record)| Row { id, record })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_row_ids() {
        let rows = add_row_ids(vec![
            StringRecord::from(vec!["a", "1"]),
            StringRecord::from(vec!["b", "2"]),
        ]);
        assert_eq!(rows.iter().map(Row::id).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(rows[1].get(0), "b");
        assert_eq!(rows[1].get(5), "");
    }
}
