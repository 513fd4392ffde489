use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::BuildHasher;
use std::collections::HashMap;

use crate::WireTypeError;
use crate::wire::Wire;

// -----------------------------------------------------------------------------
// Primitive

/// A value that maps to the wire shape directly, without a schema.
///
/// Conversions from the wire are lenient where no information is lost:
/// integer types accept both signed and unsigned wire integers in range,
/// floats accept integers.
///
/// # Examples
///
/// ```
/// use vc_schema::{Primitive, wire::Wire};
///
/// assert_eq!(7_u8.to_wire(), Wire::UInt(7));
/// assert_eq!(u8::from_wire(Wire::Int(7)), Ok(7));
/// assert!(u8::from_wire(Wire::Int(-1)).is_err());
///
/// assert_eq!(Option::<String>::from_wire(Wire::Nil), Ok(None));
/// assert_eq!(vec![1_i32, 2].to_wire().to_string(), "[1, 2]");
/// ```
pub trait Primitive: Sized + Send + Sync + 'static {
    fn to_wire(&self) -> Wire;

    fn from_wire(wire: Wire) -> Result<Self, WireTypeError>;
}

macro_rules! impl_integer {
    ($variant:ident as $repr:ty => $($ty:ty),*) => {
        $(
            impl Primitive for $ty {
                #[inline]
                fn to_wire(&self) -> Wire {
                    Wire::$variant(<$repr>::from(*self))
                }

                fn from_wire(wire: Wire) -> Result<Self, WireTypeError> {
                    wire.as_integer()
                        .and_then(|v| <$ty>::try_from(v).ok())
                        .ok_or(WireTypeError::new(stringify!($ty), wire.kind()))
                }
            }
        )*
    };
}

impl_integer!(Int as i64 => i8, i16, i32, i64);
impl_integer!(UInt as u64 => u8, u16, u32, u64);

impl Primitive for f64 {
    #[inline]
    fn to_wire(&self) -> Wire {
        Wire::Float(*self)
    }

    fn from_wire(wire: Wire) -> Result<Self, WireTypeError> {
        match wire {
            Wire::Float(v) => Ok(v),
            Wire::Int(v) => Ok(v as f64),
            Wire::UInt(v) => Ok(v as f64),
            other => Err(WireTypeError::new("f64", other.kind())),
        }
    }
}

impl Primitive for f32 {
    #[inline]
    fn to_wire(&self) -> Wire {
        Wire::Float(f64::from(*self))
    }

    fn from_wire(wire: Wire) -> Result<Self, WireTypeError> {
        match wire {
            Wire::Float(v) => Ok(v as f32),
            Wire::Int(v) => Ok(v as f32),
            Wire::UInt(v) => Ok(v as f32),
            other => Err(WireTypeError::new("f32", other.kind())),
        }
    }
}

impl Primitive for bool {
    #[inline]
    fn to_wire(&self) -> Wire {
        Wire::Bool(*self)
    }

    fn from_wire(wire: Wire) -> Result<Self, WireTypeError> {
        match wire {
            Wire::Bool(v) => Ok(v),
            other => Err(WireTypeError::new("bool", other.kind())),
        }
    }
}

impl Primitive for String {
    #[inline]
    fn to_wire(&self) -> Wire {
        Wire::Str(self.clone())
    }

    fn from_wire(wire: Wire) -> Result<Self, WireTypeError> {
        match wire {
            Wire::Str(v) => Ok(v),
            other => Err(WireTypeError::new("string", other.kind())),
        }
    }
}

/// Raw passthrough.
impl Primitive for Wire {
    #[inline]
    fn to_wire(&self) -> Wire {
        self.clone()
    }

    #[inline]
    fn from_wire(wire: Wire) -> Result<Self, WireTypeError> {
        Ok(wire)
    }
}

impl<P: Primitive> Primitive for Option<P> {
    fn to_wire(&self) -> Wire {
        match self {
            Some(value) => value.to_wire(),
            None => Wire::Nil,
        }
    }

    fn from_wire(wire: Wire) -> Result<Self, WireTypeError> {
        match wire {
            Wire::Nil => Ok(None),
            other => P::from_wire(other).map(Some),
        }
    }
}

impl<P: Primitive> Primitive for Vec<P> {
    fn to_wire(&self) -> Wire {
        Wire::Seq(self.iter().map(P::to_wire).collect())
    }

    fn from_wire(wire: Wire) -> Result<Self, WireTypeError> {
        match wire {
            Wire::Seq(items) => items.into_iter().map(P::from_wire).collect(),
            other => Err(WireTypeError::new("sequence", other.kind())),
        }
    }
}

impl<P: Primitive> Primitive for BTreeMap<String, P> {
    fn to_wire(&self) -> Wire {
        Wire::Map(self.iter().map(|(k, v)| (k.clone(), v.to_wire())).collect())
    }

    fn from_wire(wire: Wire) -> Result<Self, WireTypeError> {
        match wire {
            Wire::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((k, P::from_wire(v)?)))
                .collect(),
            other => Err(WireTypeError::new("map", other.kind())),
        }
    }
}

impl<P, S> Primitive for HashMap<String, P, S>
where
    P: Primitive,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn to_wire(&self) -> Wire {
        Wire::Map(self.iter().map(|(k, v)| (k.clone(), v.to_wire())).collect())
    }

    fn from_wire(wire: Wire) -> Result<Self, WireTypeError> {
        match wire {
            Wire::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((k, P::from_wire(v)?)))
                .collect(),
            other => Err(WireTypeError::new("map", other.kind())),
        }
    }
}
