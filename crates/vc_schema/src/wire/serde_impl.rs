use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::Wire;

// -----------------------------------------------------------------------------
// Serialize

impl Serialize for Wire {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Wire::Nil => serializer.serialize_unit(),
            Wire::Bool(v) => serializer.serialize_bool(*v),
            Wire::Int(v) => serializer.serialize_i64(*v),
            Wire::UInt(v) => serializer.serialize_u64(*v),
            Wire::Float(v) => serializer.serialize_f64(*v),
            Wire::Str(v) => serializer.serialize_str(v),
            Wire::Bin(v) => serializer.serialize_bytes(v),
            Wire::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Wire::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Deserialize

struct WireVisitor;

impl<'de> Visitor<'de> for WireVisitor {
    type Value = Wire;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a scalar, a sequence or a string-keyed map")
    }

    #[inline]
    fn visit_unit<E: de::Error>(self) -> Result<Wire, E> {
        Ok(Wire::Nil)
    }

    #[inline]
    fn visit_none<E: de::Error>(self) -> Result<Wire, E> {
        Ok(Wire::Nil)
    }

    #[inline]
    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Wire, D::Error> {
        Wire::deserialize(deserializer)
    }

    #[inline]
    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Wire, E> {
        Ok(Wire::Bool(v))
    }

    #[inline]
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Wire, E> {
        Ok(Wire::Int(v))
    }

    #[inline]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Wire, E> {
        Ok(Wire::UInt(v))
    }

    #[inline]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Wire, E> {
        Ok(Wire::Float(v))
    }

    #[inline]
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Wire, E> {
        Ok(Wire::Str(v.into()))
    }

    #[inline]
    fn visit_string<E: de::Error>(self, v: String) -> Result<Wire, E> {
        Ok(Wire::Str(v))
    }

    #[inline]
    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Wire, E> {
        Ok(Wire::Bin(v.to_vec()))
    }

    #[inline]
    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Wire, E> {
        Ok(Wire::Bin(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Wire, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element::<Wire>()? {
            items.push(item);
        }
        Ok(Wire::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Wire, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0).min(4096));
        while let Some((key, value)) = map.next_entry::<String, Wire>()? {
            entries.push((key, value));
        }
        Ok(Wire::Map(entries))
    }
}

impl<'de> Deserialize<'de> for Wire {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WireVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::Wire;

    #[test]
    fn json_bridge() {
        let wire = Wire::Seq(vec![
            Wire::UInt(0),
            Wire::Seq(vec![Wire::from(1), Wire::Nil, Wire::from("one")]),
            Wire::map([("k", Wire::Bool(true))]),
        ]);

        let text = serde_json::to_string(&wire).unwrap();
        assert_eq!(text, r#"[0,[1,null,"one"],{"k":true}]"#);

        let back: Wire = serde_json::from_str(&text).unwrap();
        assert_eq!(back, wire);
    }

    #[test]
    fn negative_and_float() {
        let back: Wire = serde_json::from_str("[-4, 2.5]").unwrap();
        assert_eq!(back, Wire::Seq(vec![Wire::Int(-4), Wire::Float(2.5)]));
    }
}
