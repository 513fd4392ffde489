//! Type-erased records.
//!
//! [`Record`] is the object-safe face of every schema type. [`DynRecord`]
//! owns a record whose concrete type is only known at runtime, [`Poly`] is
//! the same thing statically tagged with the union base it is viewed as.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use crate::registry::{Schema, SchemaType};

// -----------------------------------------------------------------------------
// Record

/// Object-safe operations shared by all record values.
///
/// Implemented for every `Clone + PartialEq + Debug` type, so it never needs
/// to be implemented by hand.
pub trait Record: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;

    fn clone_record(&self) -> Box<dyn Record>;

    /// Returns `false` when `other` has a different concrete type.
    fn eq_record(&self, other: &dyn Record) -> bool;
}

impl<T> Record for T
where
    T: Any + Send + Sync + fmt::Debug + Clone + PartialEq,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    #[inline]
    fn clone_record(&self) -> Box<dyn Record> {
        Box::new(self.clone())
    }

    fn eq_record(&self, other: &dyn Record) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

// -----------------------------------------------------------------------------
// RecordRef

/// A borrowed record together with its [`SchemaType`].
#[derive(Clone, Copy)]
pub struct RecordRef<'a> {
    ty: SchemaType,
    value: &'a dyn Record,
}

impl<'a> RecordRef<'a> {
    #[inline]
    pub fn of<T: Schema>(value: &'a T) -> Self {
        Self {
            ty: SchemaType::of::<T>(),
            value,
        }
    }

    #[inline(always)]
    pub fn schema_type(&self) -> SchemaType {
        self.ty
    }

    #[inline]
    pub fn as_any(&self) -> &'a dyn Any {
        self.value.as_any()
    }

    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&'a T> {
        self.value.as_any().downcast_ref()
    }
}

impl fmt::Debug for RecordRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.value, f)
    }
}

// -----------------------------------------------------------------------------
// DynRecord

/// An owned record of a runtime-known schema type.
///
/// This is what the deserializer hands out when the concrete type is picked
/// by a union tag.
///
/// # Examples
///
/// ```
/// use vc_schema::{DynRecord, derive::Schema};
///
/// #[derive(Schema, Default, Clone, Debug, PartialEq)]
/// struct Ping {
///     #[key(0)]
///     seq: u32,
/// }
///
/// let record = DynRecord::new(Ping { seq: 7 });
/// assert!(record.is::<Ping>());
/// assert_eq!(record.downcast_ref::<Ping>().map(|p| p.seq), Some(7));
/// assert_eq!(record.downcast::<Ping>().unwrap(), Ping { seq: 7 });
/// ```
pub struct DynRecord {
    ty: SchemaType,
    value: Box<dyn Record>,
}

impl DynRecord {
    #[inline]
    pub fn new<T: Schema>(value: T) -> Self {
        Self {
            ty: SchemaType::of::<T>(),
            value: Box::new(value),
        }
    }

    /// `value` must be an instance of `ty`.
    #[inline]
    pub(crate) fn from_parts(ty: SchemaType, value: Box<dyn Record>) -> Self {
        debug_assert_eq!(ty.id(), (*value).as_any().type_id());
        Self { ty, value }
    }

    /// Concrete type of the held record.
    #[inline(always)]
    pub fn schema_type(&self) -> SchemaType {
        self.ty
    }

    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.ty.is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        (*self.value).as_any().downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        (*self.value).as_any_mut().downcast_mut()
    }

    /// Takes the record out, or returns `self` unchanged on a type mismatch.
    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.value.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            // `is` checked the type id above.
            Err(_) => unreachable!(),
        }
    }

    #[inline]
    pub fn as_record(&self) -> RecordRef<'_> {
        RecordRef {
            ty: self.ty,
            value: &*self.value,
        }
    }

    #[inline]
    pub(crate) fn as_any_mut(&mut self) -> &mut dyn Any {
        (*self.value).as_any_mut()
    }
}

impl Clone for DynRecord {
    fn clone(&self) -> Self {
        Self {
            ty: self.ty,
            value: (*self.value).clone_record(),
        }
    }
}

impl PartialEq for DynRecord {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && (*self.value).eq_record(&*other.value)
    }
}

impl fmt::Debug for DynRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.value, f)
    }
}

// -----------------------------------------------------------------------------
// Poly

/// A record viewed through the union base `B`.
///
/// The held value may be `B` itself or any variant `B` declares. Serializing
/// a `Poly<B>` writes the variant tag, deserializing reads it back and picks
/// the concrete type.
///
/// # Examples
///
/// ```
/// use vc_schema::{Poly, derive::Schema};
///
/// #[derive(Schema, Default, Clone, Debug, PartialEq)]
/// #[schema(variant(0, Circle))]
/// struct Shape {
///     #[key(0)]
///     id: u32,
/// }
///
/// #[derive(Schema, Default, Clone, Debug, PartialEq)]
/// struct Circle {
///     #[schema(extends)]
///     base: Shape,
///     #[key(1)]
///     radius: f64,
/// }
///
/// let shape: Poly<Shape> = Poly::new(Circle { base: Shape { id: 1 }, radius: 2.0 });
/// assert!(shape.is::<Circle>());
///
/// let wire = vc_schema::serialize_poly(&shape).unwrap();
/// assert_eq!(wire.to_string(), "[0, [1, 2]]");
///
/// let back = vc_schema::deserialize_poly::<Shape>(&wire).unwrap().unwrap();
/// assert_eq!(back, shape);
/// ```
pub struct Poly<B> {
    inner: DynRecord,
    _base: PhantomData<fn() -> B>,
}

impl<B: Schema> Poly<B> {
    #[inline]
    pub fn new<C: Schema>(value: C) -> Self {
        Self::from_dyn(DynRecord::new(value))
    }

    #[inline]
    pub fn from_dyn(record: DynRecord) -> Self {
        Self {
            inner: record,
            _base: PhantomData,
        }
    }

    /// The union base this value is viewed as.
    #[inline]
    pub fn base() -> SchemaType {
        SchemaType::of::<B>()
    }
}

impl<B> Poly<B> {
    /// Concrete type of the held record.
    #[inline]
    pub fn schema_type(&self) -> SchemaType {
        self.inner.schema_type()
    }

    #[inline]
    pub fn as_dyn(&self) -> &DynRecord {
        &self.inner
    }

    #[inline]
    pub fn into_dyn(self) -> DynRecord {
        self.inner
    }

    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.inner.downcast_mut()
    }

    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        self.inner.downcast().map_err(|inner| Self {
            inner,
            _base: PhantomData,
        })
    }
}

impl<B> Clone for Poly<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _base: PhantomData,
        }
    }
}

impl<B> PartialEq for Poly<B> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<B> fmt::Debug for Poly<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}
