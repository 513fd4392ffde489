use alloc::vec::Vec;

use hashbrown::Equivalent;

use crate::SchemaError;
use crate::field::FieldMeta;
use crate::hash::{HashMap, TypeIdMap};
use crate::registry::{MAX_SLOT_INDEX, SchemaType, Slot, SlotKind, Tag};

// -----------------------------------------------------------------------------
// Ident

/// A slot or tag as read from the wire, borrowing its key.
///
/// Hashes exactly like [`Slot`] and [`Tag`], so tables can be queried
/// without a `'static` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Ident<'a> {
    Index(u32),
    Key(&'a str),
}

impl Equivalent<Slot> for Ident<'_> {
    #[inline]
    fn equivalent(&self, key: &Slot) -> bool {
        match (self, key) {
            (Ident::Index(a), Slot::Index(b)) => a == b,
            (Ident::Key(a), Slot::Key(b)) => a == b,
            _ => false,
        }
    }
}

impl Equivalent<Tag> for Ident<'_> {
    #[inline]
    fn equivalent(&self, key: &Tag) -> bool {
        match (self, key) {
            (Ident::Index(a), Tag::Index(b)) => a == b,
            (Ident::Key(a), Tag::Key(b)) => a == b,
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// FieldTable

/// Fields of one type, each bound to a distinct slot.
#[derive(Clone, Default)]
pub struct FieldTable {
    kind: Option<SlotKind>,
    fields: Vec<FieldMeta>,
    slots: HashMap<Slot, usize>,
}

impl FieldTable {
    #[inline]
    pub const fn new() -> Self {
        Self {
            kind: None,
            fields: Vec::new(),
            slots: HashMap::with_hasher(crate::hash::FixedHashState),
        }
    }

    /// Slot kind shared by all fields, `None` when empty.
    #[inline]
    pub fn kind(&self) -> Option<SlotKind> {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, FieldMeta> {
        self.fields.iter()
    }

    #[inline]
    pub fn get(&self, slot: Slot) -> Option<&FieldMeta> {
        self.slots.get(&slot).map(|&at| &self.fields[at])
    }

    #[inline]
    pub(crate) fn find(&self, ident: Ident<'_>) -> Option<&FieldMeta> {
        self.slots.get(&ident).map(|&at| &self.fields[at])
    }

    /// Fails when `found` differs from the kind of earlier fields.
    fn check_kind(&mut self, ty: &'static str, found: SlotKind) -> Result<(), SchemaError> {
        match self.kind {
            Some(expected) if expected != found => Err(SchemaError::MixedSlotKinds {
                ty,
                expected,
                found,
            }),
            _ => {
                self.kind = Some(found);
                Ok(())
            }
        }
    }

    /// Appends a new field; the slot must be free and within
    /// [`MAX_SLOT_INDEX`].
    pub(crate) fn insert(&mut self, ty: &'static str, meta: FieldMeta) -> Result<(), SchemaError> {
        let slot = meta.slot();
        if let Slot::Index(index) = slot
            && index > MAX_SLOT_INDEX
        {
            return Err(SchemaError::SlotTooLarge {
                ty,
                index,
                max: MAX_SLOT_INDEX,
            });
        }
        if self.slots.contains_key(&slot) {
            return Err(SchemaError::DuplicateSlot { ty, slot });
        }
        self.check_kind(ty, slot.kind())?;
        self.slots.insert(slot, self.fields.len());
        self.fields.push(meta);
        Ok(())
    }

    /// Replaces the field on the same slot in place, or appends.
    pub(crate) fn upsert(&mut self, ty: &'static str, meta: FieldMeta) -> Result<(), SchemaError> {
        self.check_kind(ty, meta.slot().kind())?;
        match self.slots.get(&meta.slot()) {
            Some(&at) => self.fields[at] = meta,
            None => {
                self.slots.insert(meta.slot(), self.fields.len());
                self.fields.push(meta);
            }
        }
        Ok(())
    }

    /// Orders positional fields by index.
    pub(crate) fn sort_positional(&mut self) {
        if self.kind != Some(SlotKind::Positional) {
            return;
        }
        self.fields.sort_by_key(FieldMeta::slot);
        self.slots.clear();
        for (at, field) in self.fields.iter().enumerate() {
            self.slots.insert(field.slot(), at);
        }
    }
}

impl<'a> IntoIterator for &'a FieldTable {
    type Item = &'a FieldMeta;
    type IntoIter = core::slice::Iter<'a, FieldMeta>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl core::fmt::Debug for FieldTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.fields.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// UnionTable

/// The closed set of variants of one union base: a bijection between tags
/// and concrete types.
#[derive(Default)]
pub struct UnionTable {
    kind: Option<SlotKind>,
    variants: Vec<(Tag, SchemaType)>,
    by_tag: HashMap<Tag, usize>,
    by_type: TypeIdMap<usize>,
}

impl UnionTable {
    #[inline]
    pub const fn new() -> Self {
        Self {
            kind: None,
            variants: Vec::new(),
            by_tag: HashMap::with_hasher(crate::hash::FixedHashState),
            by_type: TypeIdMap::new(),
        }
    }

    /// Tag kind shared by all variants, `None` when empty.
    #[inline]
    pub fn kind(&self) -> Option<SlotKind> {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Variants in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Tag, SchemaType)> + '_ {
        self.variants.iter().copied()
    }

    /// Tag the concrete type is written with.
    pub fn tag_of(&self, variant: SchemaType) -> Option<Tag> {
        self.by_type
            .get(&variant.id())
            .map(|&at| self.variants[at].0)
    }

    /// Concrete type bound to the tag.
    pub fn variant_of(&self, tag: Tag) -> Option<SchemaType> {
        self.by_tag.get(&tag).map(|&at| self.variants[at].1)
    }

    #[inline]
    pub(crate) fn resolve(&self, ident: Ident<'_>) -> Option<SchemaType> {
        self.by_tag.get(&ident).map(|&at| self.variants[at].1)
    }

    pub(crate) fn insert(
        &mut self,
        base: &'static str,
        tag: Tag,
        variant: SchemaType,
    ) -> Result<(), SchemaError> {
        if let Some(&at) = self.by_tag.get(&tag) {
            let existing = self.variants[at].1;
            if existing == variant {
                return Ok(());
            }
            return Err(SchemaError::DuplicateTag {
                base,
                tag,
                existing: existing.name(),
                variant: variant.name(),
            });
        }
        if let Some(&at) = self.by_type.get(&variant.id()) {
            return Err(SchemaError::DuplicateVariant {
                base,
                variant: variant.name(),
                existing: self.variants[at].0,
                tag,
            });
        }
        match self.kind {
            Some(expected) if expected != tag.kind() => {
                return Err(SchemaError::MixedSlotKinds {
                    ty: base,
                    expected,
                    found: tag.kind(),
                });
            }
            _ => self.kind = Some(tag.kind()),
        }

        let at = self.variants.len();
        self.variants.push((tag, variant));
        self.by_tag.insert(tag, at);
        self.by_type.insert(variant.id(), at);
        Ok(())
    }
}

impl core::fmt::Debug for UnionTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.variants.iter().map(|(t, v)| (t, v))).finish()
    }
}

#[cfg(test)]
mod tests {
    use core::hash::{BuildHasher, Hash, Hasher};

    use super::{Ident, UnionTable};
    use crate::SchemaError;
    use crate::registry::{SchemaType, Slot, SlotKind, Tag};

    fn hash_of(value: &impl Hash) -> u64 {
        let mut hasher = crate::hash::FixedHashState.build_hasher();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn ident_hashes_like_slot_and_tag() {
        assert_eq!(hash_of(&Ident::Index(4)), hash_of(&Slot::Index(4)));
        assert_eq!(hash_of(&Ident::Key("a")), hash_of(&Slot::Key("a")));
        assert_eq!(hash_of(&Ident::Key("a")), hash_of(&Tag::Key("a")));
    }

    #[derive(Default, Clone, Debug, PartialEq)]
    struct A;
    #[derive(Default, Clone, Debug, PartialEq)]
    struct B;

    impl crate::Schema for A {
        fn declare(_: &mut crate::registry::TypeDecl<Self>) -> Result<(), SchemaError> {
            Ok(())
        }
    }

    impl crate::Schema for B {
        fn declare(_: &mut crate::registry::TypeDecl<Self>) -> Result<(), SchemaError> {
            Ok(())
        }
    }

    #[test]
    fn union_is_a_bijection() {
        let (a, b) = (SchemaType::of::<A>(), SchemaType::of::<B>());
        let mut table = UnionTable::new();
        table.insert("Base", Tag::Index(0), a).unwrap();
        table.insert("Base", Tag::Index(0), a).unwrap();
        table.insert("Base", Tag::Index(1), b).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.kind(), Some(SlotKind::Positional));
        assert_eq!(table.tag_of(b), Some(Tag::Index(1)));
        assert_eq!(table.variant_of(Tag::Index(0)), Some(a));
        assert_eq!(table.resolve(Ident::Index(1)), Some(b));
        assert_eq!(table.resolve(Ident::Key("0")), None);

        assert!(matches!(
            table.insert("Base", Tag::Index(1), a),
            Err(SchemaError::DuplicateTag { .. })
        ));
        assert!(matches!(
            table.insert("Base", Tag::Index(2), a),
            Err(SchemaError::DuplicateVariant { .. })
        ));
    }

    #[test]
    fn union_rejects_mixed_tag_kinds() {
        let mut table = UnionTable::new();
        table.insert("Base", Tag::Key("a"), SchemaType::of::<A>()).unwrap();
        assert_eq!(
            table.insert("Base", Tag::Index(1), SchemaType::of::<B>()),
            Err(SchemaError::MixedSlotKinds {
                ty: "Base",
                expected: SlotKind::Keyed,
                found: SlotKind::Positional,
            })
        );
    }
}
