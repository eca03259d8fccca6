use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use super::row::Record;
use crate::error::GraphMiddlewareError;

/// A fully materialized query result
///
/// Records keep the order in which the database returned them. The set is
/// built once, after the transaction has been drained, and is not a live cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    records: Vec<Record>,
    column_names: Option<Arc<Vec<String>>>,
}

impl ResultSet {
    /// Set the column names reported by the database before any record
    /// arrives; records with the same names share them.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_names = Some(column_names);
    }

    /// Column names reported by the database, or taken from the first record.
    #[must_use]
    pub fn column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a record
    ///
    /// If column names haven't been set yet, the record's field names are used.
    pub fn push(&mut self, mut record: Record) {
        match &self.column_names {
            Some(shared) => record.share_field_names(shared),
            None => self.column_names = Some(Arc::clone(record.field_names())),
        }
        self.records.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Collect one string field from every record.
    ///
    /// # Errors
    /// Fails on the first record where the field is missing or not a string.
    pub fn column_strings(&self, field: &str) -> Result<Vec<String>, GraphMiddlewareError> {
        self.records
            .iter()
            .map(|record| record.get_string(field).map(str::to_string))
            .collect()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in &self.records {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}

impl IntoIterator for ResultSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl std::ops::Index<usize> for ResultSet {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.records[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn genres() -> ResultSet {
        let mut set = ResultSet::default();
        set.set_column_names(Arc::new(vec!["genre".to_string(), "freq".to_string()]));
        set.push(Record::from_pairs([("genre", Value::from("Drama")), ("freq", Value::Int(3))]));
        set.push(Record::from_pairs([("genre", Value::from("Comedy")), ("freq", Value::Int(1))]));
        set
    }

    #[test]
    fn rows_share_column_names() {
        let set = genres();
        assert_eq!(set.len(), 2);
        assert!(Arc::ptr_eq(set[0].field_names(), set[1].field_names()));
        assert_eq!(set[1].get_string("genre").unwrap(), "Comedy");
    }

    #[test]
    fn announced_columns_survive_an_empty_result() {
        let mut set = ResultSet::default();
        set.set_column_names(Arc::new(vec!["genre".to_string()]));
        assert!(set.is_empty());
        assert_eq!(set.column_names().unwrap().as_slice(), ["genre"]);
    }

    #[test]
    fn push_adopts_first_record_columns() {
        let mut set = ResultSet::default();
        set.push(Record::from_pairs([("genre", "Drama")]));
        set.push(Record::from_pairs([("genre", "Comedy")]));
        assert_eq!(set.column_names().unwrap().as_slice(), ["genre"]);
        assert!(Arc::ptr_eq(set[0].field_names(), set[1].field_names()));
    }

    #[test]
    fn column_strings_collects_in_order() {
        let set = genres();
        assert_eq!(set.column_strings("genre").unwrap(), ["Drama", "Comedy"]);
        assert!(set.column_strings("freq").is_err());
    }

    #[test]
    fn serializes_as_list_of_objects() {
        let json = serde_json::to_string(&genres()).unwrap();
        assert_eq!(
            json,
            r#"[{"genre":"Drama","freq":3},{"genre":"Comedy","freq":1}]"#
        );
    }
}
