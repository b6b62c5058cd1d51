//! Pluggable byte encoding for persisted keys and values.
//!
//! `save`/`load` never special-case a type: every key and value round-trips
//! through this trait, so the tree itself has no notion of wire format.

use std::io::{self, Read, Write};

/// Encode/decode a value to/from a byte stream.
///
/// Implementations are expected to be self-delimiting: `decode` must be able
/// to tell where a value ends without an external length, unless the type's
/// own encoding embeds one (as `String`/`Vec` do below).
pub trait Codec: Sized {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()>;
    fn decode<R: Read>(r: &mut R) -> io::Result<Self>;
}

macro_rules! impl_codec_for_scalar {
    ($t:ty) => {
        impl Codec for $t {
            fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
                w.write_all(&self.to_ne_bytes())
            }

            fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                r.read_exact(&mut buf)?;
                Ok(<$t>::from_ne_bytes(buf))
            }
        }
    };
}

impl_codec_for_scalar!(u8);
impl_codec_for_scalar!(u16);
impl_codec_for_scalar!(u32);
impl_codec_for_scalar!(u64);
impl_codec_for_scalar!(u128);
impl_codec_for_scalar!(usize);
impl_codec_for_scalar!(i8);
impl_codec_for_scalar!(i16);
impl_codec_for_scalar!(i32);
impl_codec_for_scalar!(i64);
impl_codec_for_scalar!(i128);
impl_codec_for_scalar!(isize);
impl_codec_for_scalar!(f32);
impl_codec_for_scalar!(f64);

impl Codec for bool {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&[*self as u8])
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; 1];
        r.read_exact(&mut buf)?;
        Ok(buf[0] != 0)
    }
}

/// Length-prefixed UTF-8 bytes.
impl Codec for String {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let bytes = self.as_bytes();
        (bytes.len() as u64).encode(w)?;
        w.write_all(bytes)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let len = u64::decode(r)? as usize;
        let mut buf = vec![0u8; len];
        r.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Length-prefixed sequence of element encodings. Covers
/// `BPlusTreeMultiMap`'s stored per-key `Vec<V>` without any special-casing.
impl<T: Codec> Codec for Vec<T> {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        (self.len() as u64).encode(w)?;
        for item in self {
            item.encode(w)?;
        }
        Ok(())
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let len = u64::decode(r)? as usize;
        let mut items = Vec::with_capacity(len.min(1 << 20));
        for _ in 0..len {
            items.push(T::decode(r)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip<T: Codec + PartialEq + std::fmt::Debug>(value: T) {
        let mut buf = Vec::new();
        value.encode(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let decoded = T::decode(&mut cursor).unwrap();
        assert_eq!(value, decoded);
    }

    #[test]
    fn scalars_round_trip() {
        round_trip(42u32);
        round_trip(-17i64);
        round_trip(3.5f64);
        round_trip(true);
        round_trip(false);
    }

    #[test]
    fn string_round_trips() {
        round_trip("".to_string());
        round_trip("hello, b+tree".to_string());
    }

    #[test]
    fn vec_round_trips_and_preserves_order() {
        round_trip::<Vec<i32>>(vec![]);
        round_trip(vec![3, 1, 4, 1, 5, 9, 2, 6]);
        round_trip(vec!["a".to_string(), "b".to_string(), "a".to_string()]);
    }

    #[test]
    fn short_read_yields_unexpected_eof() {
        let buf = vec![0u8, 0u8]; // too short for a u32
        let mut cursor = Cursor::new(buf);
        let err = u32::decode(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
