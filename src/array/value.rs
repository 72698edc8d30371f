/*!
 * Cell Values
 * Values client code may try to store in a device array
 */

use crate::core::types::Word;

/// A value offered for storage in a device cell
///
/// Only [`Value::Int`] can be written; other kinds are rejected locally
/// with `InvalidValueType`. Integers that do not fit a [`Word`] become
/// [`Value::Wide`] and are rejected the same way.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(Word),
    Wide(i128),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    /// The integral payload, if this is an integer
    #[inline]
    pub fn as_integral(&self) -> Option<Word> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Wide(_) => "out-of-range int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
        }
    }
}

macro_rules! impl_from_integral {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                #[inline]
                fn from(v: $t) -> Self {
                    Value::Int(Word::from(v))
                }
            }
        )*
    };
}

impl_from_integral!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_integral {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    match Word::try_from(v) {
                        Ok(word) => Value::Int(word),
                        Err(_) => Value::Wide(v as i128),
                    }
                }
            }
        )*
    };
}

impl_from_wide_integral!(u64, usize, isize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
