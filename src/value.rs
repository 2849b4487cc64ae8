//! Dynamically typed values for keyword-style (`name=value`) updates.
//!
//! Values coming from the command line or the overrides file have no static
//! type; each property converts them into its own field type on write.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Parses a raw command-line value: JSON when it parses, plain text otherwise.
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|_| Value::Text(raw.to_string()))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(n) => Some(n as f64),
            Value::Float(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(n) => Some(n),
            Value::Float(x) if x.fract() == 0.0 && x.is_finite() => Some(x as i64),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_i64().and_then(|n| u32::try_from(n).ok())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// A list of non-negative integers; a bare integer counts as a one-element list.
    pub fn as_u32_list(&self) -> Option<Vec<u32>> {
        match self {
            Value::List(items) => items.iter().map(Value::as_u32).collect(),
            other => other.as_u32().map(|n| vec![n]),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::List(vec![a.into(), b.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_and_text() {
        assert_eq!(Value::parse("44100"), Value::Int(44100));
        assert_eq!(Value::parse("0.5"), Value::Float(0.5));
        assert_eq!(
            Value::parse("[1, 2]"),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(Value::parse("time"), Value::Text("time".to_string()));
        assert_eq!(Value::parse("\"quoted\""), Value::Text("quoted".to_string()));
    }

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(18.0).as_u32(), Some(18));
        assert_eq!(Value::Float(18.5).as_u32(), None);
        assert_eq!(Value::Int(-1).as_u32(), None);
        assert_eq!(Value::from("x").as_f64(), None);
    }

    #[test]
    fn test_u32_list_accepts_scalar() {
        assert_eq!(Value::Int(2).as_u32_list(), Some(vec![2]));
        assert_eq!(Value::from(vec![1, 2]).as_u32_list(), Some(vec![1, 2]));
        assert_eq!(Value::from(vec![1, -2]).as_u32_list(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from((2, 3)).to_string(), "[2, 3]");
        assert_eq!(Value::Float(10.0).to_string(), "10.0");
        assert_eq!(Value::from("No comments.").to_string(), "No comments.");
    }
}
