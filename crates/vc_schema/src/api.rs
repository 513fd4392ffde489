//! Shortcuts over [`SchemaRegistry::global`].

use alloc::vec::Vec;

use crate::record::Poly;
use crate::registry::{Schema, SchemaRegistry};
use crate::wire::Wire;
use crate::{Diagnostic, PackError};

/// Serializes `value` as its own type with the global registry.
///
/// See [`SchemaRegistry::serialize`].
#[inline]
pub fn serialize<T: Schema>(value: &T) -> Result<Wire, PackError> {
    SchemaRegistry::global().serialize(value)
}

/// Serializes `value` viewed as the union base `B`, with the global registry.
///
/// # Examples
///
/// ```
/// use vc_schema::derive::Schema;
///
/// #[derive(Schema, Default, Clone, Debug, PartialEq)]
/// #[schema(variant("A", Child))]
/// struct Parent {
///     #[key("num")]
///     num: i32,
/// }
///
/// #[derive(Schema, Default, Clone, Debug, PartialEq)]
/// struct Child {
///     #[schema(extends)]
///     base: Parent,
///     #[key("childNum")]
///     child_num: i32,
/// }
///
/// let child = Child { base: Parent { num: 1 }, child_num: 2 };
/// let wire = vc_schema::serialize_as::<Parent, _>(&child).unwrap();
/// assert_eq!(wire.to_string(), r#"{"A": {"num": 1, "childNum": 2}}"#);
/// ```
#[inline]
pub fn serialize_as<B: Schema, T: Schema>(value: &T) -> Result<Wire, PackError> {
    SchemaRegistry::global().serialize_as::<B, T>(value)
}

#[inline]
pub fn serialize_poly<B: Schema>(value: &Poly<B>) -> Result<Wire, PackError> {
    SchemaRegistry::global().serialize_poly(value)
}

/// See [`SchemaRegistry::deserialize`].
#[inline]
pub fn deserialize<T: Schema>(wire: &Wire) -> Result<Option<T>, PackError> {
    SchemaRegistry::global().deserialize(wire)
}

#[inline]
pub fn deserialize_with_report<T: Schema>(
    wire: &Wire,
) -> Result<(Option<T>, Vec<Diagnostic>), PackError> {
    SchemaRegistry::global().deserialize_with_report(wire)
}

#[inline]
pub fn deserialize_poly<B: Schema>(wire: &Wire) -> Result<Option<Poly<B>>, PackError> {
    SchemaRegistry::global().deserialize_poly(wire)
}

// -----------------------------------------------------------------------------
// MessagePack

#[cfg(feature = "msgpack")]
impl SchemaRegistry {
    /// Serializes `value` and encodes it as MessagePack.
    pub fn encode<T: Schema>(&self, value: &T) -> Result<Vec<u8>, PackError> {
        crate::wire::to_bytes(&self.serialize(value)?)
    }

    pub fn encode_as<B: Schema, T: Schema>(&self, value: &T) -> Result<Vec<u8>, PackError> {
        crate::wire::to_bytes(&self.serialize_as::<B, T>(value)?)
    }

    pub fn encode_poly<B: Schema>(&self, value: &Poly<B>) -> Result<Vec<u8>, PackError> {
        crate::wire::to_bytes(&self.serialize_poly(value)?)
    }

    /// Decodes MessagePack bytes and deserializes a `T`.
    pub fn decode<T: Schema>(&self, bytes: &[u8]) -> Result<Option<T>, PackError> {
        self.deserialize(&crate::wire::from_bytes(bytes)?)
    }

    pub fn decode_poly<B: Schema>(&self, bytes: &[u8]) -> Result<Option<Poly<B>>, PackError> {
        self.deserialize_poly(&crate::wire::from_bytes(bytes)?)
    }
}

/// Serializes `value` and encodes it as MessagePack, with the global registry.
#[cfg(feature = "msgpack")]
#[inline]
pub fn encode<T: Schema>(value: &T) -> Result<Vec<u8>, PackError> {
    SchemaRegistry::global().encode(value)
}

#[cfg(feature = "msgpack")]
#[inline]
pub fn encode_as<B: Schema, T: Schema>(value: &T) -> Result<Vec<u8>, PackError> {
    SchemaRegistry::global().encode_as::<B, T>(value)
}

#[cfg(feature = "msgpack")]
#[inline]
pub fn encode_poly<B: Schema>(value: &Poly<B>) -> Result<Vec<u8>, PackError> {
    SchemaRegistry::global().encode_poly(value)
}

#[cfg(feature = "msgpack")]
#[inline]
pub fn decode<T: Schema>(bytes: &[u8]) -> Result<Option<T>, PackError> {
    SchemaRegistry::global().decode(bytes)
}

#[cfg(feature = "msgpack")]
#[inline]
pub fn decode_poly<B: Schema>(bytes: &[u8]) -> Result<Option<Poly<B>>, PackError> {
    SchemaRegistry::global().decode_poly(bytes)
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::derive::Schema;
    use crate::registry::{SchemaRegistry, SchemaType};
    use crate::wire::Wire;
    use crate::{Diagnostic, DynRecord, PackError, Poly, SchemaError};

    // -------------------------------------------------------------------------
    // Models

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    #[schema(variant(0, Child))]
    struct Parent {
        #[key(0)]
        num: i32,
        #[key(1)]
        text: String,
    }

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    struct Child {
        #[schema(extends)]
        base: Parent,
        #[key(2)]
        child_num: i32,
    }

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    #[schema(variant("A", KeyedChild))]
    struct KeyedParent {
        #[key("num")]
        num: i32,
        #[key("str")]
        text: String,
    }

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    struct KeyedChild {
        #[schema(extends)]
        base: KeyedParent,
        #[key("childNum")]
        child_num: i32,
    }

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    struct Holder {
        #[key(0, nested)]
        one: Option<Poly<Parent>>,
        #[key(1, nested)]
        list: Vec<Option<Poly<Parent>>>,
        #[key(2, nested)]
        by_name: BTreeMap<String, Option<Poly<Parent>>>,
        #[key(3, nested)]
        children: Vec<Option<Child>>,
        #[key(4)]
        numbers: Vec<i32>,
        #[key(5)]
        labels: BTreeMap<String, String>,
    }

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    #[schema(variant(0, Ping), variant(1, Msg))]
    struct Packet;

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    struct Ping;

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    struct Msg {
        #[key(0)]
        body: String,
    }

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    struct Framed {
        #[key(0)]
        seq: i32,
        #[key(1, nested)]
        payload: Option<Poly<Parent>>,
        #[key(2)]
        trailer: String,
    }

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    struct Sparse {
        #[key(0)]
        first: Option<i32>,
        #[key(2)]
        third: i32,
        #[key(3)]
        fourth: Option<String>,
        untracked: i32,
    }

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    struct Bag {
        #[key(0, nested)]
        any: Option<DynRecord>,
    }

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    struct Empty;

    #[derive(Schema, Default, Clone, Debug, PartialEq)]
    struct Node {
        #[key(0)]
        value: i32,
        #[key(1, nested)]
        next: Option<Poly<Node>>,
    }

    fn child() -> Child {
        Child {
            base: Parent {
                num: 1,
                text: "one".to_string(),
            },
            child_num: 2,
        }
    }

    fn keyed_child() -> KeyedChild {
        KeyedChild {
            base: KeyedParent {
                num: 1,
                text: "one".to_string(),
            },
            child_num: 2,
        }
    }

    fn child_wire() -> Wire {
        Wire::Seq(vec![Wire::from(1), Wire::from("one"), Wire::from(2)])
    }

    fn tagged(tag: i32, inner: Wire) -> Wire {
        Wire::Seq(vec![Wire::from(tag), inner])
    }

    // -------------------------------------------------------------------------
    // Unions

    #[test]
    fn positional_union() {
        let wire = super::serialize_as::<Parent, _>(&child()).unwrap();
        assert_eq!(wire, tagged(0, child_wire()));
        assert_eq!(wire.to_string(), r#"[0, [1, "one", 2]]"#);

        let back = super::deserialize_poly::<Parent>(&wire).unwrap().unwrap();
        assert!(back.is::<Child>());
        assert_eq!(back.downcast::<Child>().unwrap(), child());

        let typed = super::deserialize::<Parent>(&wire);
        assert!(matches!(typed, Err(PackError::TypeMismatch { .. })));
    }

    #[test]
    fn unknown_variant_is_absent() {
        let wire = tagged(2, child_wire());
        let registry = SchemaRegistry::new();

        let (value, diagnostics) = registry.deserialize_with_report::<Parent>(&wire).unwrap();
        assert_eq!(value, None);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnknownVariant {
                base: core::any::type_name::<Parent>(),
                tag: "2".to_string(),
            }]
        );
        assert_eq!(registry.deserialize_poly::<Parent>(&wire).unwrap(), None);
    }

    #[test]
    fn keyed_union() {
        let wire = super::serialize_as::<KeyedParent, _>(&keyed_child()).unwrap();
        assert_eq!(
            wire.to_string(),
            r#"{"A": {"num": 1, "str": "one", "childNum": 2}}"#
        );

        let back = super::deserialize_poly::<KeyedParent>(&wire).unwrap().unwrap();
        assert_eq!(back.downcast_ref::<KeyedChild>(), Some(&keyed_child()));

        let unknown = Wire::map([("B", Wire::map([("num", Wire::from(1))]))]);
        assert_eq!(super::deserialize_poly::<KeyedParent>(&unknown).unwrap(), None);
    }

    #[test]
    fn base_instance_has_no_tag() {
        let parent = Parent::default();
        assert!(matches!(
            super::serialize_as::<Parent, _>(&parent),
            Err(PackError::MissingUnionKey { .. })
        ));
        // Viewed as itself, it is a plain record.
        assert_eq!(super::serialize(&parent).unwrap().to_string(), r#"[0, ""]"#);
    }

    #[test]
    fn variant_without_fields() {
        let wire = super::serialize_poly(&Poly::<Packet>::new(Ping)).unwrap();
        assert_eq!(wire.to_string(), "[0, []]");
        let back = super::deserialize_poly::<Packet>(&wire).unwrap().unwrap();
        assert!(back.is::<Ping>());

        let msg = Poly::<Packet>::new(Msg { body: "hi".to_string() });
        let wire = super::serialize_poly(&msg).unwrap();
        assert_eq!(wire.to_string(), r#"[1, ["hi"]]"#);
        assert_eq!(super::deserialize_poly::<Packet>(&wire).unwrap(), Some(msg));
    }

    #[test]
    fn membership_is_known_once_the_base_is() {
        let registry = SchemaRegistry::new();
        let ping = SchemaType::of::<Ping>();
        assert!(!registry.is_schema_type(ping));
        assert!(matches!(
            registry.serialize(&Ping),
            Err(PackError::NotSchemaType { .. })
        ));

        registry.register::<Packet>().unwrap();
        assert!(registry.is_schema_type(ping));
        assert_eq!(registry.union_base_of(ping), Some(SchemaType::of::<Packet>()));
        assert_eq!(registry.serialize(&Ping).unwrap(), Wire::Seq(vec![]));
    }

    #[test]
    fn malformed_union() {
        for wire in [
            Wire::from(0),
            Wire::Seq(vec![Wire::from(0)]),
            Wire::Seq(vec![Wire::from("zero"), child_wire()]),
        ] {
            assert!(matches!(
                super::deserialize_poly::<Parent>(&wire),
                Err(PackError::MalformedUnion { .. })
            ));
        }
    }

    // -------------------------------------------------------------------------
    // Collections

    #[test]
    fn sequence_with_missing_member() {
        let holder = Holder {
            list: vec![Some(Poly::new(child())), None, Some(Poly::new(child()))],
            ..Holder::default()
        };

        let wire = super::serialize(&holder).unwrap();
        let list = wire.at(1).unwrap();
        assert_eq!(
            list,
            &Wire::Seq(vec![tagged(0, child_wire()), Wire::Nil, tagged(0, child_wire())])
        );

        let back = super::deserialize::<Holder>(&wire).unwrap().unwrap();
        assert_eq!(back, holder);
        assert_eq!(back.list[1], None);
    }

    #[test]
    fn nested_members_of_every_shape() {
        let mut by_name = BTreeMap::new();
        by_name.insert("a".to_string(), Some(Poly::new(child())));
        by_name.insert("b".to_string(), None);

        let mut labels = BTreeMap::new();
        labels.insert("k".to_string(), "v".to_string());

        let holder = Holder {
            one: Some(Poly::new(child())),
            list: vec![],
            by_name,
            children: vec![Some(child()), None],
            numbers: vec![3, 4],
            labels,
        };

        let wire = super::serialize(&holder).unwrap();
        assert_eq!(wire.at(0), Some(&tagged(0, child_wire())));
        assert_eq!(wire.at(1), Some(&Wire::Seq(vec![])));
        assert_eq!(
            wire.at(2),
            Some(&Wire::map([("a", tagged(0, child_wire())), ("b", Wire::Nil)]))
        );
        // Concrete element types carry no tag.
        assert_eq!(wire.at(3), Some(&Wire::Seq(vec![child_wire(), Wire::Nil])));
        assert_eq!(wire.at(4), Some(&Wire::Seq(vec![Wire::from(3), Wire::from(4)])));

        assert_eq!(super::deserialize::<Holder>(&wire).unwrap(), Some(holder));
    }

    #[test]
    fn unknown_variant_inside_collection() {
        let wire = Wire::Seq(vec![
            Wire::Nil,
            Wire::Seq(vec![tagged(0, child_wire()), tagged(9, child_wire())]),
        ]);
        let (holder, diagnostics) = super::deserialize_with_report::<Holder>(&wire).unwrap();
        let holder = holder.unwrap();
        assert_eq!(holder.list, vec![Some(Poly::new(child())), None]);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn unknown_variant_keeps_siblings() {
        let wire = Wire::Seq(vec![
            Wire::from(7),
            tagged(5, child_wire()),
            Wire::from("z"),
        ]);
        let (framed, diagnostics) = super::deserialize_with_report::<Framed>(&wire).unwrap();
        assert_eq!(
            framed,
            Some(Framed {
                seq: 7,
                payload: None,
                trailer: "z".to_string(),
            })
        );
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnknownVariant {
                base: core::any::type_name::<Parent>(),
                tag: "5".to_string(),
            }]
        );
    }

    #[test]
    fn collection_shape_mismatch() {
        let wire = Wire::Seq(vec![Wire::Nil, Wire::from("not a list")]);
        assert!(matches!(
            super::deserialize::<Holder>(&wire),
            Err(PackError::FieldType { field: "list", .. })
        ));
    }

    // -------------------------------------------------------------------------
    // Records

    #[test]
    fn ignores_additional_slots() {
        let wire = tagged(
            0,
            Wire::Seq(vec![
                Wire::from(1),
                Wire::from("one"),
                Wire::from(2),
                Wire::from("new-data"),
            ]),
        );
        let (value, diagnostics) = SchemaRegistry::new()
            .deserialize_poly_with_report::<Parent>(&wire)
            .unwrap();
        assert_eq!(value.unwrap().downcast::<Child>().unwrap(), child());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnknownSlot {
                ty: core::any::type_name::<Child>(),
                slot: "3".to_string(),
            }]
        );
    }

    #[test]
    fn sparse_slots_are_padded() {
        let sparse = Sparse {
            first: None,
            third: 5,
            fourth: None,
            untracked: 9,
        };
        let wire = super::serialize(&sparse).unwrap();
        assert_eq!(wire.to_string(), "[nil, nil, 5]");

        let back = super::deserialize::<Sparse>(&wire).unwrap().unwrap();
        assert_eq!(back.third, 5);
        assert_eq!(back.untracked, 0);

        let full = Sparse {
            first: Some(1),
            fourth: Some("four".to_string()),
            ..sparse
        };
        assert_eq!(
            super::serialize(&full).unwrap().to_string(),
            r#"[1, nil, 5, "four"]"#
        );
    }

    #[test]
    fn record_shape_mismatch() {
        assert!(matches!(
            super::deserialize::<Child>(&Wire::map([("num", Wire::from(1))])),
            Err(PackError::MalformedRecord { .. })
        ));
        assert!(matches!(
            super::deserialize::<Child>(&Wire::Seq(vec![Wire::from("one")])),
            Err(PackError::FieldType { field: "num", .. })
        ));
    }

    #[test]
    fn nil_is_absent() {
        assert_eq!(super::deserialize::<Child>(&Wire::Nil).unwrap(), None);
        assert_eq!(super::deserialize_poly::<Parent>(&Wire::Nil).unwrap(), None);
        assert_eq!(
            SchemaRegistry::global().serialize_record(None, None).unwrap(),
            Wire::Nil
        );
    }

    // -------------------------------------------------------------------------
    // Failures

    #[test]
    fn unannotated_object_field() {
        let empty = Bag::default();
        assert_eq!(super::serialize(&empty).unwrap(), Wire::Seq(vec![]));

        let bag = Bag {
            any: Some(DynRecord::new(child())),
        };
        assert!(matches!(
            super::serialize(&bag),
            Err(PackError::UnannotatedObjectField { field: "any", .. })
        ));
        assert!(matches!(
            super::deserialize::<Bag>(&Wire::Seq(vec![child_wire()])),
            Err(PackError::UnannotatedObjectField { field: "any", .. })
        ));
    }

    #[test]
    fn not_a_schema_type() {
        assert!(matches!(
            super::serialize(&Empty),
            Err(PackError::NotSchemaType { .. })
        ));
        assert!(matches!(
            super::deserialize::<Empty>(&Wire::Seq(vec![])),
            Err(PackError::NotSchemaType { .. })
        ));
        assert!(!SchemaRegistry::global().is_schema_type(crate::SchemaType::of::<Empty>()));
    }

    #[test]
    fn depth_limit() {
        let mut chain = Node { value: 0, next: None };
        for value in 1..6 {
            chain = Node {
                value,
                next: Some(Poly::new(chain)),
            };
        }

        let shallow = SchemaRegistry::new().with_max_depth(3);
        assert!(matches!(
            shallow.serialize(&chain),
            Err(PackError::DepthLimitExceeded { limit: 3 })
        ));

        let deep = SchemaRegistry::new();
        let wire = deep.serialize(&chain).unwrap();
        assert!(matches!(
            shallow.deserialize::<Node>(&wire),
            Err(PackError::DepthLimitExceeded { limit: 3 })
        ));
        assert_eq!(deep.deserialize::<Node>(&wire).unwrap(), Some(chain));
    }

    #[test]
    fn schema_errors_surface_on_use() {
        #[derive(Default, Clone, Debug, PartialEq)]
        struct Broken {
            a: i32,
            b: i32,
        }

        impl crate::Schema for Broken {
            fn declare(decl: &mut crate::registry::TypeDecl<Self>) -> Result<(), SchemaError> {
                decl.field(0, "a", |t| &t.a, |t| &mut t.a)?
                    .field(0, "b", |t| &t.b, |t| &mut t.b)?;
                Ok(())
            }
        }

        assert!(matches!(
            SchemaRegistry::new().serialize(&Broken::default()),
            Err(PackError::Schema(SchemaError::DuplicateSlot { .. }))
        ));
    }

    // -------------------------------------------------------------------------
    // MessagePack

    #[cfg(feature = "msgpack")]
    #[test]
    fn msgpack_round_trip() {
        let holder = Holder {
            one: Some(Poly::new(child())),
            list: vec![Some(Poly::new(child())), None],
            ..Holder::default()
        };
        let bytes = super::encode(&holder).unwrap();
        assert_eq!(super::decode::<Holder>(&bytes).unwrap(), Some(holder));

        let bytes = super::encode_as::<KeyedParent, _>(&keyed_child()).unwrap();
        let back = super::decode_poly::<KeyedParent>(&bytes).unwrap().unwrap();
        assert_eq!(back.downcast::<KeyedChild>().unwrap(), keyed_child());

        let poly: Poly<Parent> = Poly::new(child());
        let bytes = super::encode_poly(&poly).unwrap();
        assert_eq!(super::decode_poly::<Parent>(&bytes).unwrap(), Some(poly));
    }
}
