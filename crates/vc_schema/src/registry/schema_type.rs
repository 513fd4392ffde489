use alloc::boxed::Box;
use core::any::{TypeId, type_name};
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::SchemaError;
use crate::record::Record;
use crate::registry::TypeDecl;
use crate::registry::decl::DeclParts;

// -----------------------------------------------------------------------------
// Schema

/// A record type with a declared wire schema.
///
/// Usually implemented through [`#[derive(Schema)]`](crate::derive::Schema).
/// [`declare`](Schema::declare) is called once per registry, the first time
/// the type is used, and must describe the type the same way every time.
///
/// # Examples
///
/// ```
/// use vc_schema::{Schema, SchemaError, registry::TypeDecl};
///
/// #[derive(Default, Clone, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
///     label: Option<String>,
/// }
///
/// impl Schema for Point {
///     fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError> {
///         decl.field(0, "x", |p| &p.x, |p| &mut p.x)?
///             .field(1, "y", |p| &p.y, |p| &mut p.y)?
///             .field(3, "label", |p| &p.label, |p| &mut p.label)?;
///         Ok(())
///     }
/// }
///
/// let wire = vc_schema::serialize(&Point { x: 1, y: 2, label: None }).unwrap();
/// assert_eq!(wire.to_string(), "[1, 2]");
/// ```
pub trait Schema: Record + Default {
    /// Declares the fields, parent and union variants of `Self`.
    fn declare(decl: &mut TypeDecl<Self>) -> Result<(), SchemaError>;
}

// -----------------------------------------------------------------------------
// SchemaType

/// A stable identifier for a [`Schema`] type.
///
/// Compares and hashes by [`TypeId`]; it also carries what the registry
/// needs to build the type's entry lazily and to default-construct values.
#[derive(Clone, Copy)]
pub struct SchemaType {
    id: TypeId,
    name: &'static str,
    declare: fn() -> Result<DeclParts, SchemaError>,
    construct: fn() -> Box<dyn Record>,
}

fn construct<T: Schema>() -> Box<dyn Record> {
    Box::new(T::default())
}

impl SchemaType {
    #[inline]
    pub fn of<T: Schema>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            declare: TypeDecl::<T>::collect,
            construct: construct::<T>,
        }
    }

    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name, as given by [`core::any::type_name`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    #[inline]
    pub(crate) fn declare(&self) -> Result<DeclParts, SchemaError> {
        (self.declare)()
    }

    #[inline]
    pub(crate) fn construct(&self) -> Box<dyn Record> {
        (self.construct)()
    }
}

impl PartialEq for SchemaType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SchemaType {}

impl Hash for SchemaType {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SchemaType").field(&self.name).finish()
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
