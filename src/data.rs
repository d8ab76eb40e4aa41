use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Serialize, Serializer};

use crate::schema::ColumnType;

/// A non-null cell. Missing data is modelled as `Option<Value>::None`.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::String(_) => ColumnType::String,
            Value::Integer(_) => ColumnType::Integer,
            Value::Float(_) => ColumnType::Float,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{f:.0}")
                } else {
                    f.to_string()
                }
            }
        }
    }

    /// Float bits with `-0.0` folded onto `0.0` so equal keys hash alike.
    fn float_bits(value: f64) -> u64 {
        if value == 0.0 { 0.0f64.to_bits() } else { value.to_bits() }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Integer(_) | Value::Float(_) => 0,
            Value::String(_) => 1,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => Value::float_bits(*a) == Value::float_bits(*b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::String(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Value::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                2u8.hash(state);
                Value::float_bits(*f).hash(state);
            }
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => compare_floats(*a, *b),
            (Value::Integer(a), Value::Float(b)) => {
                compare_floats(*a as f64, *b).then(Ordering::Less)
            }
            (Value::Float(a), Value::Integer(b)) => {
                compare_floats(*a, *b as f64).then(Ordering::Greater)
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn compare_floats(a: f64, b: f64) -> Ordering {
    if Value::float_bits(a) == Value::float_bits(b) {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

/// Renders a possibly-null cell for terminal output.
pub fn display_cell(value: Option<&Value>) -> String {
    value.map(Value::as_display).unwrap_or_else(|| "null".to_string())
}

pub fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Finite floats only; `NaN` and `inf` spellings are treated as text.
pub fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Parses a non-null raw cell under `ty`. `None` means the text does not fit
/// the type; string columns always accept and keep the text untouched.
pub fn parse_typed_value(raw: &str, ty: ColumnType) -> Option<Value> {
    match ty {
        ColumnType::String => Some(Value::String(raw.to_string())),
        ColumnType::Integer => parse_integer(raw).map(Value::Integer),
        ColumnType::Float => parse_float(raw).map(Value::Float),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn string_cells_keep_surrounding_whitespace() {
        let parsed = parse_typed_value("  Colima ", ColumnType::String).unwrap();
        assert_eq!(parsed, Value::String("  Colima ".to_string()));
    }

    #[test]
    fn numeric_cells_parse_trimmed_text() {
        assert_eq!(parse_typed_value(" 5 ", ColumnType::Integer), Some(Value::Integer(5)));
        assert_eq!(parse_typed_value("2.5", ColumnType::Float), Some(Value::Float(2.5)));
        assert_eq!(parse_typed_value("2.5", ColumnType::Integer), None);
        assert_eq!(parse_typed_value("NaN", ColumnType::Float), None);
    }

    #[test]
    fn float_zero_signs_share_a_group() {
        let mut keys = HashSet::new();
        keys.insert(Value::Float(0.0));
        keys.insert(Value::Float(-0.0));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn ordering_is_total_across_variants() {
        assert!(Value::Integer(2) < Value::Float(2.5));
        assert!(Value::Float(100.0) < Value::String("1".to_string()));
        assert!(Value::from("a") < Value::from("b"));
    }

    #[test]
    fn display_drops_trailing_zero_fraction() {
        assert_eq!(Value::Float(3.0).as_display(), "3");
        assert_eq!(Value::Float(3.25).as_display(), "3.25");
        assert_eq!(display_cell(None), "null");
    }
}
