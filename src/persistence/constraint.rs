use std::collections::HashSet;

use crate::error::ValidationError;

use super::value::{KeyValue, Value};

/// Structural rules that apply to a column on top of its type.
///
/// A [Constraint::PrimaryKey] does not carry any state itself. The keys
/// already taken live in the [`KeySet`] owned by the table, so the rule only
/// needs to be handed that set when it is checked.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    NotNull(String),
    PrimaryKey(String),
}

impl Constraint {
    pub fn validate(&self, value: &Value, keys: &KeySet) -> Result<(), ValidationError> {
        match self {
            Constraint::NotNull(field) => {
                if value.is_null() {
                    return Err(ValidationError::NullValue {
                        column: field.clone(),
                    });
                }
            }
            Constraint::PrimaryKey(field) => {
                if keys.contains(value) {
                    return Err(ValidationError::DuplicateKey {
                        column: field.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The set of primary-key values assigned within one table.
///
/// Rebuilt from scratch whenever a table is created or restored from a
/// snapshot; keys are released again when their row is deleted.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashSet<KeyValue>,
}

impl KeySet {
    pub fn new() -> KeySet {
        KeySet::default()
    }

    pub fn contains(&self, value: &Value) -> bool {
        value.key().is_some_and(|key| self.keys.contains(&key))
    }

    pub fn insert(&mut self, value: &Value) -> bool {
        match value.key() {
            Some(key) => self.keys.insert(key),
            None => false,
        }
    }

    pub fn remove(&mut self, value: &Value) -> bool {
        value.key().is_some_and(|key| self.keys.remove(&key))
    }
}
