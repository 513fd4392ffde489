use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use std::sync::{PoisonError, RwLock};

use crate::SchemaError;
use crate::field::{ElementType, FieldShape};
use crate::hash::TypeIdMap;
use crate::registry::{FieldTable, Schema, SchemaEntry, SchemaType, UnionTable};

/// Default bound on record nesting during serialize and deserialize.
pub const DEFAULT_MAX_DEPTH: usize = 128;

// -----------------------------------------------------------------------------
// SchemaRegistry

/// A cache of [`SchemaEntry`], keyed by type.
///
/// Entries are built lazily, the first time a type is used, and never
/// change afterwards. Building happens outside the lock; when two threads
/// race on the same type, the first inserted entry wins and both use it.
///
/// Validation of an entry (element types, tag kinds) runs once, the first
/// time the entry is requested through [`entry`](Self::entry).
///
/// [`SchemaRegistry::global`] backs the free functions of this crate;
/// separate registries can be created for isolation.
///
/// # Examples
///
/// ```
/// use vc_schema::derive::Schema;
/// use vc_schema::registry::{SchemaRegistry, SchemaType, Slot};
///
/// #[derive(Schema, Default, Clone, Debug, PartialEq)]
/// struct Header {
///     #[key("id")]
///     id: u64,
///     #[key("name")]
///     name: String,
/// }
///
/// let registry = SchemaRegistry::new();
/// let fields = registry.effective_fields(SchemaType::of::<Header>()).unwrap();
/// assert_eq!(fields.len(), 2);
/// assert_eq!(fields.get(Slot::Key("name")).map(|f| f.name()), Some("name"));
/// assert!(registry.is_schema_type(SchemaType::of::<Header>()));
/// ```
pub struct SchemaRegistry {
    entries: RwLock<TypeIdMap<Arc<SchemaEntry>>>,
    // variant -> first registered base listing it
    members: RwLock<TypeIdMap<SchemaType>>,
    max_depth: usize,
}

impl Default for SchemaRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: RwLock::new(TypeIdMap::new()),
            members: RwLock::new(TypeIdMap::new()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets how deep records may nest before
    /// [`PackError::DepthLimitExceeded`](crate::PackError::DepthLimitExceeded).
    #[inline]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline(always)]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The process-wide registry.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: SchemaRegistry = SchemaRegistry::new();
        &GLOBAL
    }

    /// Number of types registered so far.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[inline]
    pub fn contains(&self, ty: SchemaType) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&ty.id())
    }

    /// Registers and validates `T` eagerly.
    ///
    /// Calling this is optional, types are registered on first use; it
    /// surfaces schema mistakes early.
    #[inline]
    pub fn register<T: Schema>(&self) -> Result<Arc<SchemaEntry>, SchemaError> {
        self.entry(SchemaType::of::<T>())
    }

    /// Returns the validated entry of `ty`, registering it if needed.
    pub fn entry(&self, ty: SchemaType) -> Result<Arc<SchemaEntry>, SchemaError> {
        let entry = self.lookup(ty)?;
        entry
            .validated
            .get_or_init(|| self.check(&entry))
            .clone()?;
        Ok(entry)
    }

    /// Effective field table of `ty`, inheritance resolved.
    pub fn effective_fields(&self, ty: SchemaType) -> Result<Arc<FieldTable>, SchemaError> {
        Ok(self.entry(ty)?.fields_arc())
    }

    /// Whether `ty` declares any field or union variant, or is a variant of
    /// a union whose base is registered.
    ///
    /// A type whose declaration fails is not a schema type.
    pub fn is_schema_type(&self, ty: SchemaType) -> bool {
        self.lookup(ty).is_ok_and(|entry| self.has_schema(&entry))
    }

    /// The first registered union base that lists `ty` as a variant.
    pub fn union_base_of(&self, ty: SchemaType) -> Option<SchemaType> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ty.id())
            .copied()
    }

    pub(crate) fn has_schema(&self, entry: &SchemaEntry) -> bool {
        entry.is_schema_type() || self.union_base_of(entry.schema_type()).is_some()
    }

    /// The union table of `ty`, if it is a union base.
    pub fn union_of(&self, ty: SchemaType) -> Result<Option<Arc<UnionTable>>, SchemaError> {
        Ok(self.entry(ty)?.union_arc())
    }

    /// Returns the entry of `ty`, building it (and its ancestors) if needed.
    /// Does not validate.
    pub(crate) fn lookup(&self, ty: SchemaType) -> Result<Arc<SchemaEntry>, SchemaError> {
        self.lookup_in(ty, &mut Vec::new())
    }

    fn get(&self, id: TypeId) -> Option<Arc<SchemaEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    // `chain` holds the types whose parents are being built.
    fn lookup_in(
        &self,
        ty: SchemaType,
        chain: &mut Vec<TypeId>,
    ) -> Result<Arc<SchemaEntry>, SchemaError> {
        if let Some(entry) = self.get(ty.id()) {
            return Ok(entry);
        }
        if chain.contains(&ty.id()) {
            return Err(SchemaError::InheritanceCycle { ty: ty.name() });
        }

        let parts = ty.declare()?;
        let parent = match &parts.parent {
            Some(link) => {
                chain.push(ty.id());
                let parent = self.lookup_in(link.ty, chain);
                chain.pop();
                Some(parent?)
            }
            None => None,
        };
        let entry = SchemaEntry::build(parts, parent.as_deref())?;

        log::trace!(
            "registered schema `{}` with {} fields",
            ty.name(),
            entry.fields().len()
        );

        let entry = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(ty.id(), || Arc::new(entry))
            .clone();

        if let Some(union) = entry.union() {
            let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
            for (_, variant) in union.iter() {
                members.get_or_insert(variant.id(), || ty);
            }
        }

        Ok(entry)
    }

    // Only looks other types up, never validates them, so mutually
    // referencing types cannot wait on each other.
    fn check(&self, entry: &SchemaEntry) -> Result<(), SchemaError> {
        let ty = entry.schema_type().name();

        for field in entry.fields() {
            match field.element() {
                element @ (ElementType::Schema(declared) | ElementType::Poly(declared)) => {
                    let target = self.lookup(declared)?;
                    if !self.has_schema(&target) {
                        return Err(SchemaError::UnregisteredElementType {
                            ty,
                            field: field.name(),
                            element: declared.name(),
                        });
                    }
                    if matches!(element, ElementType::Schema(_)) && target.union().is_some() {
                        return Err(SchemaError::UnionElementNotPoly {
                            ty,
                            field: field.name(),
                            base: declared.name(),
                        });
                    }
                }
                ElementType::Opaque if field.shape() != FieldShape::Scalar => {
                    return Err(SchemaError::MissingCollectionElementType {
                        ty,
                        field: field.name(),
                    });
                }
                _ => {}
            }
        }

        if let Some(union) = entry.union() {
            for (tag, variant) in union.iter() {
                if let Some(expected) = entry.kind()
                    && tag.kind() != expected
                {
                    return Err(SchemaError::TagKindMismatch {
                        base: ty,
                        tag,
                        expected,
                    });
                }
                self.lookup(variant)?;
            }
        }

        Ok(())
    }
}

impl core::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("len", &self.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use std::thread;

    use super::SchemaRegistry;
    use crate::registry::{Schema, SchemaType, Slot, SlotKind, Tag, TypeDecl};
    use crate::{DynRecord, SchemaError};

    #[derive(Default, Clone, Debug, PartialEq)]
    struct Base {
        num: i32,
        text: Option<String>,
    }

    impl Schema for Base {
        fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
            decl.field(1, "text", |b| &b.text, |b| &mut b.text)?
                .field(0, "num", |b| &b.num, |b| &mut b.num)?
                .variant::<Derived>(0)?;
            Ok(())
        }
    }

    #[derive(Default, Clone, Debug, PartialEq)]
    struct Derived {
        base: Base,
        extra: bool,
        num: i32,
    }

    impl Schema for Derived {
        fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
            decl.extends::<Base, _, _>(|d| &d.base, |d| &mut d.base)?
                .field(3, "extra", |d| &d.extra, |d| &mut d.extra)?
                .field(0, "num", |d| &d.num, |d| &mut d.num)?;
            Ok(())
        }
    }

    fn names(fields: &crate::registry::FieldTable) -> Vec<(&'static str, &'static str)> {
        fields
            .iter()
            .map(|f| (f.name(), f.owner().name().rsplit("::").next().unwrap_or("")))
            .collect()
    }

    #[test]
    fn effective_fields_merge_parent_first() {
        let registry = SchemaRegistry::new();
        let fields = registry.effective_fields(SchemaType::of::<Derived>()).unwrap();

        assert_eq!(fields.kind(), Some(SlotKind::Positional));
        assert_eq!(
            names(&fields),
            [("num", "Derived"), ("text", "Base"), ("extra", "Derived")]
        );

        let own = registry.register::<Derived>().unwrap();
        assert_eq!(own.own_fields().len(), 2);
        assert_eq!(own.parent(), Some(SchemaType::of::<Base>()));
        assert!(registry.contains(SchemaType::of::<Base>()));
    }

    #[test]
    fn union_of_base() {
        let registry = SchemaRegistry::new();
        let union = registry.union_of(SchemaType::of::<Base>()).unwrap().unwrap();
        assert_eq!(union.tag_of(SchemaType::of::<Derived>()), Some(Tag::Index(0)));
        assert!(registry.union_of(SchemaType::of::<Derived>()).unwrap().is_none());
    }

    #[test]
    fn projected_fields_reach_the_parent() {
        let registry = SchemaRegistry::new();
        let fields = registry.effective_fields(SchemaType::of::<Derived>()).unwrap();
        let text = fields.get(Slot::Index(1)).unwrap();

        let mut record = DynRecord::new(Derived::default());
        text.access()
            .write(
                record.as_any_mut(),
                crate::field::FieldWrite::Primitive("hi".into()),
            )
            .unwrap();
        assert_eq!(
            record.downcast_ref::<Derived>().unwrap().base.text.as_deref(),
            Some("hi")
        );
    }

    #[test]
    fn keyed_override_keeps_parent_position() {
        #[derive(Default, Clone, Debug, PartialEq)]
        struct KBase {
            a: i32,
            b: i32,
        }

        impl Schema for KBase {
            fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
                decl.field("a", "a", |s| &s.a, |s| &mut s.a)?
                    .field("b", "b", |s| &s.b, |s| &mut s.b)?;
                Ok(())
            }
        }

        #[derive(Default, Clone, Debug, PartialEq)]
        struct KChild {
            base: KBase,
            c: i32,
            a: i64,
        }

        impl Schema for KChild {
            fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
                decl.extends::<KBase, _, _>(|s| &s.base, |s| &mut s.base)?
                    .field("c", "c", |s| &s.c, |s| &mut s.c)?
                    .field("a", "a", |s| &s.a, |s| &mut s.a)?;
                Ok(())
            }
        }

        let registry = SchemaRegistry::new();
        let fields = registry.effective_fields(SchemaType::of::<KChild>()).unwrap();
        assert_eq!(
            names(&fields),
            [("a", "KChild"), ("b", "KBase"), ("c", "KChild")]
        );
    }

    #[test]
    fn mixed_kinds_across_inheritance() {
        #[derive(Default, Clone, Debug, PartialEq)]
        struct Keyed {
            base: Base,
            k: i32,
        }

        impl Schema for Keyed {
            fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
                decl.extends::<Base, _, _>(|s| &s.base, |s| &mut s.base)?
                    .field("k", "k", |s| &s.k, |s| &mut s.k)?;
                Ok(())
            }
        }

        let err = SchemaRegistry::new()
            .register::<Keyed>()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MixedSlotKinds {
                expected: SlotKind::Positional,
                found: SlotKind::Keyed,
                ..
            }
        ));
    }

    #[test]
    fn self_inheritance_is_a_cycle() {
        #[derive(Default, Clone, Debug, PartialEq)]
        struct Ouroboros {
            n: i32,
        }

        impl Schema for Ouroboros {
            fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
                decl.extends::<Ouroboros, _, _>(|s| s, |s| s)?
                    .field(0, "n", |s| &s.n, |s| &mut s.n)?;
                Ok(())
            }
        }

        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.register::<Ouroboros>(),
            Err(SchemaError::InheritanceCycle { .. })
        ));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn element_checks() {
        #[derive(Default, Clone, Debug, PartialEq)]
        struct Bare;

        impl Schema for Bare {
            fn declare(_: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
                Ok(())
            }
        }

        #[derive(Default, Clone, Debug, PartialEq)]
        struct HoldsBare {
            bare: Option<Bare>,
        }

        impl Schema for HoldsBare {
            fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
                decl.nested(0, "bare", |s| &s.bare, |s| &mut s.bare)?;
                Ok(())
            }
        }

        #[derive(Default, Clone, Debug, PartialEq)]
        struct HoldsAny {
            items: BTreeMap<String, Option<DynRecord>>,
        }

        impl Schema for HoldsAny {
            fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
                decl.nested(0, "items", |s| &s.items, |s| &mut s.items)?;
                Ok(())
            }
        }

        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.register::<HoldsBare>(),
            Err(SchemaError::UnregisteredElementType { field: "bare", .. })
        ));
        assert!(matches!(
            registry.register::<HoldsAny>(),
            Err(SchemaError::MissingCollectionElementType { field: "items", .. })
        ));
        assert!(!registry.is_schema_type(SchemaType::of::<Bare>()));

        // Validation failures are cached, not retried.
        assert!(registry.register::<HoldsAny>().is_err());
    }

    #[test]
    fn union_members_need_poly() {
        #[derive(Default, Clone, Debug, PartialEq)]
        struct HoldsBase {
            items: Vec<Option<Base>>,
        }

        impl Schema for HoldsBase {
            fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
                decl.nested(0, "items", |s| &s.items, |s| &mut s.items)?;
                Ok(())
            }
        }

        #[derive(Default, Clone, Debug, PartialEq)]
        struct HoldsPoly {
            items: Vec<Option<crate::Poly<Base>>>,
            derived: Option<Derived>,
        }

        impl Schema for HoldsPoly {
            fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
                decl.nested(0, "items", |s| &s.items, |s| &mut s.items)?
                    .nested(1, "derived", |s| &s.derived, |s| &mut s.derived)?;
                Ok(())
            }
        }

        let registry = SchemaRegistry::new();
        assert_eq!(
            registry.register::<HoldsBase>().unwrap_err(),
            SchemaError::UnionElementNotPoly {
                ty: core::any::type_name::<HoldsBase>(),
                field: "items",
                base: core::any::type_name::<Base>(),
            }
        );
        assert!(registry.register::<HoldsPoly>().is_ok());
    }

    #[test]
    fn tag_kind_must_match_slots() {
        #[derive(Default, Clone, Debug, PartialEq)]
        struct Shape {
            id: u32,
        }

        impl Schema for Shape {
            fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
                decl.field(0, "id", |s| &s.id, |s| &mut s.id)?
                    .variant::<Base>("base")?;
                Ok(())
            }
        }

        assert!(matches!(
            SchemaRegistry::new().register::<Shape>(),
            Err(SchemaError::TagKindMismatch {
                tag: Tag::Key("base"),
                expected: SlotKind::Positional,
                ..
            })
        ));
    }

    #[test]
    fn concurrent_first_use_shares_one_entry() {
        let registry = Arc::new(SchemaRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.register::<Derived>().unwrap())
            })
            .collect();
        let entries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(entries.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len(), 2);
    }
}
