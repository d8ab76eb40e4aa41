//! Column types, descriptors, and sampled type inference.
//!
//! [`describe`] is the schema inspector: it lists each column of a
//! [`Table`] with its inferred [`ColumnType`] and position, in table order.
//! [`TypeCandidate`] accumulates evidence over the inference sample; a column
//! is numeric only when every sampled non-null value parses as a number.

use std::fmt;

use serde::Serialize;

use crate::{
    data::{parse_float, parse_integer},
    dataset::Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "float")]
    Float,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "int",
            ColumnType::Float => "float",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub inferred_type: ColumnType,
    pub index: usize,
}

pub fn describe(table: &Table) -> Vec<ColumnDescriptor> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| ColumnDescriptor {
            name: column.name().to_string(),
            inferred_type: column.column_type(),
            index,
        })
        .collect()
}

/// Evidence gathered for one column while scanning the inference sample.
#[derive(Debug, Clone, Default)]
pub(crate) struct TypeCandidate {
    non_null: usize,
    integer_matches: usize,
    float_matches: usize,
}

impl TypeCandidate {
    pub(crate) fn update(&mut self, value: &str) {
        self.non_null += 1;
        if parse_integer(value).is_some() {
            self.integer_matches += 1;
            self.float_matches += 1;
        } else if parse_float(value).is_some() {
            self.float_matches += 1;
        }
    }

    pub(crate) fn decide(&self) -> ColumnType {
        if self.non_null == 0 {
            ColumnType::String
        } else if self.integer_matches == self.non_null {
            ColumnType::Integer
        } else if self.float_matches == self.non_null {
            ColumnType::Float
        } else {
            ColumnType::String
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::Value, dataset::Column};

    fn candidate(values: &[&str]) -> ColumnType {
        let mut candidate = TypeCandidate::default();
        for value in values {
            candidate.update(value);
        }
        candidate.decide()
    }

    #[test]
    fn all_integer_sample_is_integer() {
        assert_eq!(candidate(&["1", " 22", "-3"]), ColumnType::Integer);
    }

    #[test]
    fn mixed_integer_and_float_widens_to_float() {
        assert_eq!(candidate(&["1", "2.5", "3"]), ColumnType::Float);
    }

    #[test]
    fn any_text_forces_string() {
        assert_eq!(candidate(&["1", "0 a 5 personas"]), ColumnType::String);
        assert_eq!(candidate(&[]), ColumnType::String);
    }

    #[test]
    fn describe_follows_table_order() {
        let table = Table::new(vec![
            Column::new("nombre_act", vec![Some(Value::from("panaderia"))]),
            Column::new("per_ocu", vec![Some(Value::Integer(5))]),
        ])
        .expect("table");
        let descriptors = describe(&table);
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name, "nombre_act");
        assert_eq!(descriptors[0].inferred_type, ColumnType::String);
        assert_eq!(descriptors[1].index, 1);
        assert_eq!(descriptors[1].inferred_type, ColumnType::Integer);
    }
}
