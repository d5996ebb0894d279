//! Dynamic field value type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded field value.
///
/// Every integer packer produces [`Value::Integer`], regardless of width or
/// signedness; the packer alone decides whether a given integer is in range.
/// Tuple packers produce [`Value::Tuple`] with one element per sub-packer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Signed integer wide enough for every integer packer.
    Integer(i64),
    /// Ordered elements of a tuple packer.
    Tuple(Vec<Value>),
}

impl Value {
    /// Create a tuple value from its elements.
    pub fn tuple<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Tuple(_) => None,
        }
    }

    /// Get this value's elements, if it is a tuple.
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            Value::Integer(_) => None,
        }
    }

    /// Check if this value is a tuple.
    pub fn is_tuple(&self) -> bool {
        matches!(self, Value::Tuple(_))
    }

    /// Short description of the value's shape, used in error messages.
    pub fn shape(&self) -> String {
        match self {
            Value::Integer(_) => "integer".to_string(),
            Value::Tuple(items) => format!("tuple of {}", items.len()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Integer(i64::from(n))
                }
            }
        )*
    };
}

impl_from_int!(u8, i8, u16, i16, u32, i32, i64);

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Tuple(items)
    }
}

macro_rules! impl_from_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> From<($($name,)+)> for Value {
            #[allow(non_snake_case)]
            fn from(($($name,)+): ($($name,)+)) -> Self {
                Value::Tuple(vec![$($name.into()),+])
            }
        }
    };
}

impl_from_tuple!(A, B);
impl_from_tuple!(A, B, C);
impl_from_tuple!(A, B, C, D);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_accessors() {
        let value = Value::from(42u8);
        assert_eq!(value.as_integer(), Some(42));
        assert!(value.as_tuple().is_none());
        assert!(!value.is_tuple());
    }

    #[test]
    fn tuple_from_rust_tuple() {
        let value = Value::from((255u8, 0u8, 7i32));
        assert_eq!(
            value,
            Value::Tuple(vec![
                Value::Integer(255),
                Value::Integer(0),
                Value::Integer(7)
            ])
        );
        assert_eq!(value.as_tuple().map(<[Value]>::len), Some(3));
    }

    #[test]
    fn nested_tuple_display() {
        let value = Value::tuple([Value::from(1), Value::from((2, 3))]);
        assert_eq!(value.to_string(), "(1, (2, 3))");
    }

    #[test]
    fn shape_names() {
        assert_eq!(Value::from(-1).shape(), "integer");
        assert_eq!(Value::from((1, 2)).shape(), "tuple of 2");
    }

    #[test]
    fn serde_json_roundtrip() {
        let value = Value::from((1, -2));
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
