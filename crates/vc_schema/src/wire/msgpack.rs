use alloc::vec::Vec;

use super::Wire;
use crate::PackError;

/// Encodes a wire shape into MessagePack bytes.
///
/// Maps are written with string keys, [`Wire::Nil`] as `nil`.
///
/// # Examples
///
/// ```
/// use vc_schema::wire::{Wire, from_bytes, to_bytes};
///
/// let wire = Wire::Seq(vec![Wire::from(1), Wire::Nil, Wire::from("one")]);
/// let bytes = to_bytes(&wire).unwrap();
/// assert_eq!(from_bytes(&bytes).unwrap(), wire);
/// ```
pub fn to_bytes(wire: &Wire) -> Result<Vec<u8>, PackError> {
    Ok(rmp_serde::to_vec(wire)?)
}

/// Decodes MessagePack bytes into a wire shape.
///
/// Map keys must be strings.
pub fn from_bytes(bytes: &[u8]) -> Result<Wire, PackError> {
    Ok(rmp_serde::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::{from_bytes, to_bytes};
    use crate::wire::Wire;

    #[test]
    fn sparse_sequence_keeps_padding() {
        let wire = Wire::Seq(vec![Wire::Nil, Wire::Nil, Wire::Float(0.25)]);
        let back = from_bytes(&to_bytes(&wire).unwrap()).unwrap();
        assert_eq!(back, wire);
        assert_eq!(back.as_seq().map(<[Wire]>::len), Some(3));
    }

    #[test]
    fn keyed_map_and_binary() {
        let wire = Wire::map([
            ("zero", Wire::Int(-7)),
            ("one", Wire::Bin(vec![1, 2, 3])),
            ("two", Wire::map([("A", Wire::Seq(vec![]))])),
        ]);
        let back = from_bytes(&to_bytes(&wire).unwrap()).unwrap();
        assert_eq!(back, wire);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let bytes = to_bytes(&Wire::from("hello")).unwrap();
        assert!(from_bytes(&bytes[..2]).is_err());
    }
}
