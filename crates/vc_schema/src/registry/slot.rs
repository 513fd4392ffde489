use core::fmt;

// -----------------------------------------------------------------------------
// SlotKind

/// Which wire shape a record type uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Integer slots, the record is an ordered sequence.
    Positional,
    /// String slots, the record is a string-keyed mapping.
    Keyed,
}

impl SlotKind {
    pub const fn name(self) -> &'static str {
        match self {
            SlotKind::Positional => "sequence",
            SlotKind::Keyed => "map",
        }
    }
}

// -----------------------------------------------------------------------------
// Slot

/// Largest index a positional slot may use.
///
/// A positional record is written as a sequence as long as its highest
/// present index, so indices stay small.
pub const MAX_SLOT_INDEX: u32 = u16::MAX as u32;

/// The wire identifier a field is bound to, independent of its Rust name.
///
/// # Examples
///
/// ```
/// use vc_schema::registry::{Slot, SlotKind};
///
/// assert_eq!(Slot::from(3u32).kind(), SlotKind::Positional);
/// assert_eq!(Slot::from("name").kind(), SlotKind::Keyed);
/// assert_eq!(Slot::from("name").to_string(), "\"name\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Index(u32),
    Key(&'static str),
}

impl Slot {
    #[inline]
    pub const fn kind(&self) -> SlotKind {
        match self {
            Slot::Index(_) => SlotKind::Positional,
            Slot::Key(_) => SlotKind::Keyed,
        }
    }
}

impl From<u32> for Slot {
    #[inline]
    fn from(index: u32) -> Self {
        Slot::Index(index)
    }
}

impl From<&'static str> for Slot {
    #[inline]
    fn from(key: &'static str) -> Self {
        Slot::Key(key)
    }
}

/// Values accepted as a slot identifier in declarations.
///
/// Plain integer literals work, negative values are rejected.
pub trait IntoSlot {
    /// Returns the raw value back when it is not a valid slot.
    fn into_slot(self) -> Result<Slot, i64>;
}

impl IntoSlot for Slot {
    #[inline]
    fn into_slot(self) -> Result<Slot, i64> {
        Ok(self)
    }
}

impl IntoSlot for &'static str {
    #[inline]
    fn into_slot(self) -> Result<Slot, i64> {
        Ok(Slot::Key(self))
    }
}

impl IntoSlot for u32 {
    #[inline]
    fn into_slot(self) -> Result<Slot, i64> {
        Ok(Slot::Index(self))
    }
}

impl IntoSlot for i32 {
    #[inline]
    fn into_slot(self) -> Result<Slot, i64> {
        u32::try_from(self)
            .map(Slot::Index)
            .map_err(|_| i64::from(self))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Index(index) => write!(f, "{index}"),
            Slot::Key(key) => write!(f, "{key:?}"),
        }
    }
}

// -----------------------------------------------------------------------------
// Tag

/// The discriminator a union base uses to recover a concrete variant.
///
/// An index tag wraps the inner record as `[tag, inner]`,
/// a key tag as `{tag: inner}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Index(u32),
    Key(&'static str),
}

impl Tag {
    #[inline]
    pub const fn kind(&self) -> SlotKind {
        match self {
            Tag::Index(_) => SlotKind::Positional,
            Tag::Key(_) => SlotKind::Keyed,
        }
    }
}

impl From<u32> for Tag {
    #[inline]
    fn from(index: u32) -> Self {
        Tag::Index(index)
    }
}

impl From<&'static str> for Tag {
    #[inline]
    fn from(key: &'static str) -> Self {
        Tag::Key(key)
    }
}

/// Values accepted as a union tag in declarations.
pub trait IntoTag {
    /// Returns the raw value back when it is not a valid tag.
    fn into_tag(self) -> Result<Tag, i64>;
}

impl IntoTag for Tag {
    #[inline]
    fn into_tag(self) -> Result<Tag, i64> {
        Ok(self)
    }
}

impl IntoTag for &'static str {
    #[inline]
    fn into_tag(self) -> Result<Tag, i64> {
        Ok(Tag::Key(self))
    }
}

impl IntoTag for u32 {
    #[inline]
    fn into_tag(self) -> Result<Tag, i64> {
        Ok(Tag::Index(self))
    }
}

impl IntoTag for i32 {
    #[inline]
    fn into_tag(self) -> Result<Tag, i64> {
        u32::try_from(self)
            .map(Tag::Index)
            .map_err(|_| i64::from(self))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Index(index) => write!(f, "{index}"),
            Tag::Key(key) => write!(f, "{key:?}"),
        }
    }
}
