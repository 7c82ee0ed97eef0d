use std::fmt::Display;

use indexmap::IndexMap;

use crate::error::ValidationError;

use super::schema::Schema;
use super::value::Value;

/// One record of a table: column names mapped to values.
///
/// Rows keep the order their columns were given in, which is also the order
/// they are written to a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub IndexMap<String, Value>);

impl Row {
    pub fn new() -> Row {
        Row(IndexMap::new())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.0
            .iter()
            .map(|(column, value)| (column.clone(), value.to_json()))
            .collect()
    }

    pub fn from_json(
        schema: &Schema,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Row, ValidationError> {
        //! Decode a JSON object into a row, typing every field through
        //! `schema`. Fields the schema does not know are rejected.

        let mut row = Row::new();
        for (column, json) in object.iter() {
            row.0
                .insert(column.clone(), schema.decode_value(column, json)?);
        }
        Ok(row)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Row(iter
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect())
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Row {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let row: Vec<String> = self.0.values().map(|value| value.to_string()).collect();
        write!(f, "{}", row.join(" | "))
    }
}
