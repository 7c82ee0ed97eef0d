use std::fmt::Display;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use indexmap::IndexMap;

use crate::error::{EngineError, Result, ValidationError};

use super::constraint::Constraint;
use super::value::Value;

/// The closed set of column types a table can declare.
///
/// Declared in text as one of the keywords accepted by [`ColumnType::from_str`],
/// optionally followed by `not null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    String,
    Url,
    FloatingPoint,
    DecimalNumeric,
}

impl ColumnType {
    pub fn validate(&self, column: &str, value: &Value) -> std::result::Result<(), ValidationError> {
        //! Check that `value` has the storage shape this type expects.
        //!
        //! Nulls always pass here; whether a column may hold a null is the
        //! business of [`Constraint::NotNull`].

        match (self, value) {
            (_, Value::Null) => Ok(()),
            (ColumnType::Integer, Value::Integer(_)) => Ok(()),
            (ColumnType::String, Value::Text(_)) => Ok(()),
            (ColumnType::Url, Value::Text(text)) => {
                if text.starts_with("http") {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidUrl {
                        column: column.to_string(),
                        value: text.clone(),
                    })
                }
            }
            (ColumnType::FloatingPoint, Value::Float(x)) => {
                if x.is_finite() {
                    Ok(())
                } else {
                    Err(ValidationError::NonFiniteFloat {
                        column: column.to_string(),
                        value: *x,
                    })
                }
            }
            (ColumnType::DecimalNumeric, Value::Decimal(_)) => Ok(()),
            (expected, other) => Err(ValidationError::TypeMismatch {
                column: column.to_string(),
                expected: expected.to_string(),
                value: format!("{} ({})", other, other.type_name()),
            }),
        }
    }

    pub fn decode(
        &self,
        column: &str,
        json: &serde_json::Value,
    ) -> std::result::Result<Value, ValidationError> {
        //! Turn a JSON value into a [`Value`] of this type.
        //!
        //! The decoding is strict: an integer column will not accept `1.0`
        //! and a decimal column only accepts the exact decimal text.

        let mismatch = || ValidationError::TypeMismatch {
            column: column.to_string(),
            expected: self.to_string(),
            value: json.to_string(),
        };

        let value = match (self, json) {
            (_, serde_json::Value::Null) => Value::Null,
            (ColumnType::Integer, serde_json::Value::Number(n)) => {
                Value::Integer(n.as_i64().ok_or_else(mismatch)?)
            }
            (ColumnType::FloatingPoint, serde_json::Value::Number(n)) if n.is_f64() => {
                Value::Float(n.as_f64().ok_or_else(mismatch)?)
            }
            (ColumnType::String | ColumnType::Url, serde_json::Value::String(s)) => {
                Value::Text(s.clone())
            }
            (ColumnType::DecimalNumeric, serde_json::Value::String(s)) => {
                Value::Decimal(BigDecimal::from_str(s).map_err(|_| mismatch())?)
            }
            _ => return Err(mismatch()),
        };

        self.validate(column, &value)?;
        Ok(value)
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(keyword: &str) -> std::result::Result<Self, Self::Err> {
        match keyword.to_lowercase().as_str() {
            "int" | "integer" => Ok(ColumnType::Integer),
            "string" | "str" | "text" => Ok(ColumnType::String),
            "url" => Ok(ColumnType::Url),
            "float" | "double" | "real" => Ok(ColumnType::FloatingPoint),
            "decimal" | "numeric" => Ok(ColumnType::DecimalNumeric),
            other => Err(format!("invalid datatype {}: not supported", other)),
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let datatype = match self {
            ColumnType::Integer => "int",
            ColumnType::String => "string",
            ColumnType::Url => "url",
            ColumnType::FloatingPoint => "float",
            ColumnType::DecimalNumeric => "decimal",
        };
        write!(f, "{}", datatype)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInformation {
    pub(super) datatype: ColumnType,
    pub(super) not_null: bool,
    pub(super) constraints: Vec<Constraint>,
}

impl ColumnInformation {
    pub fn parse(column: &str, declaration: &str) -> std::result::Result<ColumnInformation, String> {
        //! Parse a declaration such as `int not null` for `column`.

        let tokens: Vec<String> = declaration
            .split_whitespace()
            .map(|token| token.to_lowercase())
            .collect();

        let (datatype, rest) = tokens
            .split_first()
            .ok_or_else(|| format!("invalid declaration for column {}: empty", column))?;
        let datatype = ColumnType::from_str(datatype)
            .map_err(|reason| format!("{}, on column {}", reason, column))?;

        let not_null = match rest {
            [] => false,
            [not, null] if not == "not" && null == "null" => true,
            _ => {
                return Err(format!(
                    "invalid declaration {}: expected `<type> [not null]`, on column {}",
                    declaration, column
                ));
            }
        };

        let mut constraints = vec![];
        if not_null {
            constraints.push(Constraint::NotNull(column.to_string()));
        }

        Ok(ColumnInformation {
            datatype,
            not_null,
            constraints,
        })
    }

    pub fn datatype(&self) -> ColumnType {
        self.datatype
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn declaration(&self) -> String {
        //! The canonical text form of the column, as it is persisted.

        if self.not_null {
            format!("{} not null", self.datatype)
        } else {
            self.datatype.to_string()
        }
    }

    fn mark_primary_key(&mut self, column: &str) {
        if !self.not_null {
            self.constraints.push(Constraint::NotNull(column.to_string()));
        }
        self.constraints
            .push(Constraint::PrimaryKey(column.to_string()));
    }
}

/// Column names in declaration order, their [`ColumnInformation`] and the
/// primary-key designation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<(String, ColumnInformation)>,
    primary_key: usize,
}

impl Schema {
    pub fn new<S: AsRef<str>>(
        table: &str,
        columns: &[(S, S)],
        primary_key: &str,
    ) -> Result<Schema> {
        //! Build a schema from `(column, declaration)` pairs.
        //!
        //! The primary-key column always ends up with a NotNull and a
        //! PrimaryKey constraint, whether or not its declaration says so.

        let invalid = |reason: String| EngineError::InvalidSchema {
            table: table.to_string(),
            reason,
        };

        if columns.is_empty() {
            return Err(invalid(String::from(
                "invalid arguments: 0 columns does not make a schema",
            )));
        }

        let mut schema: Vec<(String, ColumnInformation)> = Vec::with_capacity(columns.len());
        for (column, declaration) in columns {
            let column = column.as_ref();
            if schema.iter().any(|(name, _)| name == column) {
                return Err(invalid(format!("duplicate column {}", column)));
            }
            let info = ColumnInformation::parse(column, declaration.as_ref()).map_err(invalid)?;
            schema.push((column.to_string(), info));
        }

        let primary_key = schema
            .iter()
            .position(|(name, _)| name == primary_key)
            .ok_or_else(|| {
                invalid(format!(
                    "invalid primary key {}: not a declared column",
                    primary_key
                ))
            })?;

        let (name, info) = &mut schema[primary_key];
        info.mark_primary_key(name);

        Ok(Schema {
            columns: schema,
            primary_key,
        })
    }

    pub fn get(&self, column: &str) -> Option<&ColumnInformation> {
        self.columns
            .iter()
            .find_map(|(name, info)| if name == column { Some(info) } else { None })
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &(String, ColumnInformation)> {
        self.columns.iter()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn primary_key(&self) -> &str {
        &self.columns[self.primary_key].0
    }

    pub fn declarations(&self) -> IndexMap<String, String> {
        //! Column names mapped to their canonical declarations.

        self.columns
            .iter()
            .map(|(name, info)| (name.clone(), info.declaration()))
            .collect()
    }

    pub fn decode_value(
        &self,
        column: &str,
        json: &serde_json::Value,
    ) -> std::result::Result<Value, ValidationError> {
        let info = self.get(column).ok_or_else(|| ValidationError::UnknownColumn {
            column: column.to_string(),
        })?;
        info.datatype.decode(column, json)
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schema: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, (col, info))| {
                let pk = if index == self.primary_key { " pk" } else { "" };
                format!("{} ({}{})", col.as_str(), info.declaration(), pk)
            })
            .collect();
        write!(f, "{}", schema.join(" | "))
    }
}
