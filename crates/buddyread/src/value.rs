//! Scalar values bound to positional placeholders.
//!
//! [`SqlValue`] is what the clause builders hand back in their `values`
//! list. It is comparable (so builder output can be asserted on directly)
//! and binds through `tokio-postgres` like any other parameter.

use crate::error::{Error, Result};
use bytes::BytesMut;
use serde::Serialize;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// A scalar parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    /// Convert a JSON scalar into a bindable value.
    ///
    /// Arrays and objects have no column counterpart here and are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Int(i)),
                None => n
                    .as_f64()
                    .map(Self::Float)
                    .ok_or_else(|| Error::invalid_argument(format!("unsupported number: {n}"))),
            },
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(Error::invalid_argument(
                "only scalar values can be bound to a column",
            )),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

fn mismatch(value: &SqlValue, ty: &Type) -> BoxError {
    format!("cannot bind {} value to column of type {}", value.kind(), ty).into()
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(v) => {
                if !<bool as ToSql>::accepts(ty) {
                    return Err(mismatch(self, ty));
                }
                v.to_sql(ty, out)
            }
            Self::Int(v) => {
                // Integers narrow to the column width; overflow is an error, not a wrap.
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::INT8 {
                    v.to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*v as f64).to_sql(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
            Self::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    v.to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
            Self::Text(v) => {
                if !<String as ToSql>::accepts(ty) {
                    return Err(mismatch(self, ty));
                }
                v.to_sql(ty, out)
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The variant decides at bind time; see `to_sql`.
        true
    }

    to_sql_checked!();
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_scalars() {
        assert_eq!(SqlValue::from_json(&json!("Aliya")).unwrap(), SqlValue::from("Aliya"));
        assert_eq!(SqlValue::from_json(&json!(32)).unwrap(), SqlValue::Int(32));
        assert_eq!(SqlValue::from_json(&json!(1.5)).unwrap(), SqlValue::Float(1.5));
        assert_eq!(SqlValue::from_json(&json!(true)).unwrap(), SqlValue::Bool(true));
        assert!(SqlValue::from_json(&json!(null)).unwrap().is_null());
    }

    #[test]
    fn from_json_rejects_compound() {
        let err = SqlValue::from_json(&json!([1, 2])).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(SqlValue::from_json(&json!({"a": 1})).is_err());
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(4)), SqlValue::Int(4));
    }

    #[test]
    fn int_narrows_to_column_width() {
        let mut buf = BytesMut::new();
        SqlValue::Int(35).to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &35_i32.to_be_bytes());

        let mut buf = BytesMut::new();
        assert!(SqlValue::Int(i64::MAX).to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn text_refuses_integer_column() {
        let mut buf = BytesMut::new();
        assert!(SqlValue::from("x").to_sql(&Type::INT4, &mut buf).is_err());
        assert!(SqlValue::from("x").to_sql(&Type::VARCHAR, &mut buf).is_ok());
    }

    #[test]
    fn null_binds_to_anything() {
        let mut buf = BytesMut::new();
        let is_null = SqlValue::Null.to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
    }

    #[test]
    fn serializes_untagged() {
        let values = vec![SqlValue::from("Aliya"), SqlValue::Int(32), SqlValue::Null];
        assert_eq!(serde_json::to_value(&values).unwrap(), json!(["Aliya", 32, null]));
    }
}
