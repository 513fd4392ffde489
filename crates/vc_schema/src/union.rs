//! Tagged union wrapping.
//!
//! A record viewed through a union base is written as `[tag, inner]` when
//! the base uses index tags, or as `{tag: inner}` when it uses key tags.

use alloc::string::ToString;
use alloc::vec;
use core::fmt;

use crate::PackError;
use crate::registry::{Ident, SchemaType, Tag};
use crate::wire::Wire;

/// A tag as found on the wire, before it is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireTag<'a> {
    Index(i128),
    Key(&'a str),
}

impl<'a> WireTag<'a> {
    /// `None` for indices no [`Tag`] can hold.
    pub(crate) fn ident(self) -> Option<Ident<'a>> {
        match self {
            WireTag::Index(index) => u32::try_from(index).ok().map(Ident::Index),
            WireTag::Key(key) => Some(Ident::Key(key)),
        }
    }
}

impl fmt::Display for WireTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireTag::Index(index) => write!(f, "{index}"),
            WireTag::Key(key) => write!(f, "{key:?}"),
        }
    }
}

/// Wraps `inner` under `tag`.
///
/// # Examples
///
/// ```
/// use vc_schema::registry::Tag;
/// use vc_schema::union::wrap;
/// use vc_schema::wire::Wire;
///
/// assert_eq!(wrap(Tag::Index(2), Wire::Nil).to_string(), "[2, nil]");
/// assert_eq!(wrap(Tag::Key("A"), Wire::from(1)).to_string(), r#"{"A": 1}"#);
/// ```
pub fn wrap(tag: Tag, inner: Wire) -> Wire {
    match tag {
        Tag::Index(index) => Wire::Seq(vec![Wire::UInt(u64::from(index)), inner]),
        Tag::Key(key) => Wire::Map(vec![(key.to_string(), inner)]),
    }
}

/// Splits a wrapped value of the union `base` into its tag and inner value.
///
/// Accepts a two element sequence starting with an integer, or a map with
/// exactly one entry.
pub fn split(base: SchemaType, wire: &Wire) -> Result<(WireTag<'_>, &Wire), PackError> {
    match wire {
        Wire::Seq(items) => match items.as_slice() {
            [tag, inner] => match tag.as_integer() {
                Some(index) => Ok((WireTag::Index(index), inner)),
                None => Err(PackError::MalformedUnion {
                    base: base.name(),
                    found: "sequence without an integer tag",
                }),
            },
            _ => Err(PackError::MalformedUnion {
                base: base.name(),
                found: "sequence of the wrong length",
            }),
        },
        Wire::Map(entries) => match entries.as_slice() {
            [(key, inner)] => Ok((WireTag::Key(key), inner)),
            _ => Err(PackError::MalformedUnion {
                base: base.name(),
                found: "map without exactly one entry",
            }),
        },
        other => Err(PackError::MalformedUnion {
            base: base.name(),
            found: other.kind(),
        }),
    }
}
