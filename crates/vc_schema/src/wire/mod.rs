//! The intermediate wire shape.
//!
//! A [`Wire`] is what the serializer produces and the deserializer consumes.
//! It only uses the vocabulary every generic binary codec understands:
//! scalars, ordered sequences, string-keyed mappings and an absent marker.
//!
//! Records with index slots become [`Wire::Seq`], records with key slots
//! become [`Wire::Map`]. A record viewed through a union base is wrapped
//! as `[tag, inner]` or `{tag: inner}`.

// -----------------------------------------------------------------------------
// Modules

mod serde_impl;

#[cfg(feature = "msgpack")]
mod msgpack;

#[cfg(feature = "msgpack")]
pub use msgpack::{from_bytes, to_bytes};

// -----------------------------------------------------------------------------
// Wire

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A value in the intermediate wire shape.
///
/// Integers compare by numeric value, so `Int(1) == UInt(1)`: binary codecs
/// usually encode non-negative integers unsigned regardless of how they were
/// produced.
#[derive(Clone, Debug, Default)]
pub enum Wire {
    /// Absent value, also used as padding in sparse sequences.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bin(Vec<u8>),
    Seq(Vec<Wire>),
    /// String-keyed mapping, in insertion order.
    Map(Vec<(String, Wire)>),
}

impl Wire {
    /// Builds a [`Wire::Map`] from key/value pairs.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Wire)>) -> Self {
        Wire::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the variant, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Wire::Nil => "nil",
            Wire::Bool(_) => "bool",
            Wire::Int(_) | Wire::UInt(_) => "integer",
            Wire::Float(_) => "float",
            Wire::Str(_) => "string",
            Wire::Bin(_) => "binary",
            Wire::Seq(_) => "sequence",
            Wire::Map(_) => "map",
        }
    }

    #[inline]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Wire::Nil)
    }

    pub fn as_seq(&self) -> Option<&[Wire]> {
        match self {
            Wire::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Wire)]> {
        match self {
            Wire::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Wire::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value widened to `i128`, so both signed and unsigned fit.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Wire::Int(v) => Some(i128::from(*v)),
            Wire::UInt(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Looks up a key in a [`Wire::Map`].
    pub fn get(&self, key: &str) -> Option<&Wire> {
        self.as_map()?
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Looks up a position in a [`Wire::Seq`].
    pub fn at(&self, index: usize) -> Option<&Wire> {
        self.as_seq()?.get(index)
    }
}

impl PartialEq for Wire {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Wire::Nil, Wire::Nil) => true,
            (Wire::Bool(a), Wire::Bool(b)) => a == b,
            (Wire::Float(a), Wire::Float(b)) => a == b,
            (Wire::Str(a), Wire::Str(b)) => a == b,
            (Wire::Bin(a), Wire::Bin(b)) => a == b,
            (Wire::Seq(a), Wire::Seq(b)) => a == b,
            (Wire::Map(a), Wire::Map(b)) => a == b,
            (a, b) => match (a.as_integer(), b.as_integer()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wire::Nil => f.write_str("nil"),
            Wire::Bool(v) => write!(f, "{v}"),
            Wire::Int(v) => write!(f, "{v}"),
            Wire::UInt(v) => write!(f, "{v}"),
            Wire::Float(v) => write!(f, "{v}"),
            Wire::Str(v) => write!(f, "{v:?}"),
            Wire::Bin(v) => write!(f, "<{} bytes>", v.len()),
            Wire::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Wire::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Wire {
                #[inline]
                fn from(value: $ty) -> Self {
                    Wire::$variant(value $(as $cast)?)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => Int as i64,
    i64 => Int,
    u32 => UInt as u64,
    u64 => UInt,
    f64 => Float,
    String => Str,
    Vec<Wire> => Seq,
}

impl From<&str> for Wire {
    #[inline]
    fn from(value: &str) -> Self {
        Wire::Str(value.into())
    }
}
