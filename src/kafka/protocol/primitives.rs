// Primitive codec
//
// Fixed-width integers and floats are big-endian. Varints use base-128 groups,
// least-significant group first, with the high bit of each byte flagging that
// another group follows. Signed varints (varint/varlong) are zig-zag mapped
// first so small negative numbers stay short; unsigned varints (lengths, tags)
// are written as-is.
//
// Every reader checks the remaining length before touching the buffer, since
// the `bytes` getters panic on underflow. Every writer checks
// `remaining_mut()` for the same reason: a fixed-size sink reports
// BufferOverflow instead of panicking.

use bytes::{Buf, BufMut};
use uuid::Uuid;

use super::super::constants::{
    MAX_VARINT_BYTES, MAX_VARLONG_BYTES, UUID_BYTES, VARINT_CONTINUATION, VARINT_GROUP_BITS,
    VARINT_GROUP_MASK,
};
use super::super::error::{KafkaError, Result};

#[inline]
pub(crate) fn ensure_remaining<B: Buf>(buf: &B, needed: usize) -> Result<()> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(KafkaError::truncated(needed, remaining));
    }
    Ok(())
}

#[inline]
pub(crate) fn ensure_capacity<B: BufMut>(buf: &B, needed: usize) -> Result<()> {
    let remaining = buf.remaining_mut();
    if remaining < needed {
        return Err(KafkaError::BufferOverflow { needed, remaining });
    }
    Ok(())
}

/// Generates a checked writer/reader pair for a fixed-width type.
macro_rules! fixed_width {
    ($(#[$doc:meta])* $put:ident, $get:ident, $ty:ty, $width:expr, $buf_put:ident, $buf_get:ident) => {
        $(#[$doc])*
        pub fn $put<B: BufMut>(buf: &mut B, value: $ty) -> Result<()> {
            ensure_capacity(buf, $width)?;
            buf.$buf_put(value);
            Ok(())
        }

        $(#[$doc])*
        pub fn $get<B: Buf>(buf: &mut B) -> Result<$ty> {
            ensure_remaining(buf, $width)?;
            Ok(buf.$buf_get())
        }
    };
}

fixed_width!(
    /// 8-bit signed integer
    put_i8, get_i8, i8, 1, put_i8, get_i8
);
fixed_width!(
    /// 16-bit big-endian signed integer
    put_i16, get_i16, i16, 2, put_i16, get_i16
);
fixed_width!(
    /// 32-bit big-endian signed integer
    put_i32, get_i32, i32, 4, put_i32, get_i32
);
fixed_width!(
    /// 64-bit big-endian signed integer
    put_i64, get_i64, i64, 8, put_i64, get_i64
);
fixed_width!(
    /// 16-bit big-endian unsigned integer
    put_u16, get_u16, u16, 2, put_u16, get_u16
);
fixed_width!(
    /// 32-bit big-endian unsigned integer
    put_u32, get_u32, u32, 4, put_u32, get_u32
);
fixed_width!(
    /// IEEE-754 double, big-endian
    put_f64, get_f64, f64, 8, put_f64, get_f64
);

/// Boolean as a single byte; any non-zero byte decodes as `true`
pub fn put_bool<B: BufMut>(buf: &mut B, value: bool) -> Result<()> {
    put_i8(buf, i8::from(value))
}

pub fn get_bool<B: Buf>(buf: &mut B) -> Result<bool> {
    Ok(get_i8(buf)? != 0)
}

/// UUID as 16 raw bytes
pub fn put_uuid<B: BufMut>(buf: &mut B, value: &Uuid) -> Result<()> {
    ensure_capacity(buf, UUID_BYTES)?;
    buf.put_slice(value.as_bytes());
    Ok(())
}

pub fn get_uuid<B: Buf>(buf: &mut B) -> Result<Uuid> {
    ensure_remaining(buf, UUID_BYTES)?;
    let mut raw = [0u8; UUID_BYTES];
    buf.copy_to_slice(&mut raw);
    Ok(Uuid::from_bytes(raw))
}

// ===== Variable-length integers =====

fn put_unsigned<B: BufMut>(buf: &mut B, mut value: u64) -> Result<()> {
    ensure_capacity(buf, uvarlong_len(value))?;
    while value > u64::from(VARINT_GROUP_MASK) {
        buf.put_u8((value as u8 & VARINT_GROUP_MASK) | VARINT_CONTINUATION);
        value >>= VARINT_GROUP_BITS;
    }
    buf.put_u8(value as u8);
    Ok(())
}

/// Read base-128 groups into a value of at most `width` bits
///
/// The last group a `width`-bit value can occupy only has room for its
/// remaining high bits; anything above them is an overflow, not truncation.
fn get_unsigned<B: Buf>(buf: &mut B, max_bytes: usize, width: u32) -> Result<u64> {
    let mut value = 0u64;
    for group in 0..max_bytes {
        ensure_remaining(buf, 1)?;
        let byte = buf.get_u8();
        let shift = group as u32 * VARINT_GROUP_BITS;
        let payload = byte & VARINT_GROUP_MASK;
        let room = width - shift;
        if room < VARINT_GROUP_BITS && payload >> room != 0 {
            return Err(KafkaError::VarintOverflow { max_bytes });
        }
        value |= u64::from(payload) << shift;
        if byte & VARINT_CONTINUATION == 0 {
            return Ok(value);
        }
    }
    Err(KafkaError::VarintOverflow { max_bytes })
}

/// Unsigned varint, used for compact lengths and tagged-field headers
pub fn put_uvarint<B: BufMut>(buf: &mut B, value: u32) -> Result<()> {
    put_unsigned(buf, u64::from(value))
}

pub fn get_uvarint<B: Buf>(buf: &mut B) -> Result<u32> {
    let value = get_unsigned(buf, MAX_VARINT_BYTES, u32::BITS)?;
    u32::try_from(value).map_err(|_| KafkaError::VarintOverflow {
        max_bytes: MAX_VARINT_BYTES,
    })
}

/// Unsigned 64-bit varint
pub fn put_uvarlong<B: BufMut>(buf: &mut B, value: u64) -> Result<()> {
    put_unsigned(buf, value)
}

pub fn get_uvarlong<B: Buf>(buf: &mut B) -> Result<u64> {
    get_unsigned(buf, MAX_VARLONG_BYTES, u64::BITS)
}

/// Zig-zag signed 32-bit varint
pub fn put_varint<B: BufMut>(buf: &mut B, value: i32) -> Result<()> {
    put_uvarint(buf, zigzag_encode_32(value))
}

pub fn get_varint<B: Buf>(buf: &mut B) -> Result<i32> {
    Ok(zigzag_decode_32(get_uvarint(buf)?))
}

/// Zig-zag signed 64-bit varint
pub fn put_varlong<B: BufMut>(buf: &mut B, value: i64) -> Result<()> {
    put_uvarlong(buf, zigzag_encode_64(value))
}

pub fn get_varlong<B: Buf>(buf: &mut B) -> Result<i64> {
    Ok(zigzag_decode_64(get_uvarlong(buf)?))
}

#[inline]
pub fn zigzag_encode_32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

#[inline]
pub fn zigzag_decode_32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

#[inline]
pub fn zigzag_encode_64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub fn zigzag_decode_64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Encoded width of an unsigned 64-bit varint
pub fn uvarlong_len(value: u64) -> usize {
    let significant_bits = (u64::BITS - value.leading_zeros()).max(1);
    significant_bits.div_ceil(VARINT_GROUP_BITS) as usize
}

/// Encoded width of an unsigned varint
pub fn uvarint_len(value: u32) -> usize {
    uvarlong_len(u64::from(value))
}

/// Encoded width of a zig-zag varint
pub fn varint_len(value: i32) -> usize {
    uvarint_len(zigzag_encode_32(value))
}

/// Encoded width of a zig-zag varlong
pub fn varlong_len(value: i64) -> usize {
    uvarlong_len(zigzag_encode_64(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{Bytes, BytesMut};

    fn encoded<F>(write: F) -> Bytes
    where
        F: FnOnce(&mut BytesMut) -> Result<()>,
    {
        let mut buf = BytesMut::new();
        write(&mut buf).unwrap();
        buf.freeze()
    }

    #[test]
    fn test_fixed_width_big_endian() {
        assert_eq!(&encoded(|b| put_i16(b, 0x0102))[..], &[0x01, 0x02]);
        assert_eq!(&encoded(|b| put_i32(b, -2))[..], &[0xff, 0xff, 0xff, 0xfe]);
        assert_eq!(
            &encoded(|b| put_i64(b, 1))[..],
            &[0, 0, 0, 0, 0, 0, 0, 1]
        );
        assert_eq!(&encoded(|b| put_u16(b, 0xbeef))[..], &[0xbe, 0xef]);
    }

    #[test]
    fn test_fixed_width_boundaries_roundtrip() {
        for value in [i8::MIN, -1, 0, 1, i8::MAX] {
            let mut bytes = encoded(|b| put_i8(b, value));
            assert_eq!(get_i8(&mut bytes).unwrap(), value);
        }
        for value in [i16::MIN, -1, 0, 1, i16::MAX] {
            let mut bytes = encoded(|b| put_i16(b, value));
            assert_eq!(get_i16(&mut bytes).unwrap(), value);
        }
        for value in [i32::MIN, -1, 0, 1, i32::MAX] {
            let mut bytes = encoded(|b| put_i32(b, value));
            assert_eq!(get_i32(&mut bytes).unwrap(), value);
        }
        for value in [i64::MIN, -1, 0, 1, i64::MAX] {
            let mut bytes = encoded(|b| put_i64(b, value));
            assert_eq!(get_i64(&mut bytes).unwrap(), value);
        }
        for value in [0u16, 1, u16::MAX] {
            let mut bytes = encoded(|b| put_u16(b, value));
            assert_eq!(get_u16(&mut bytes).unwrap(), value);
        }
        for value in [0u32, 1, u32::MAX] {
            let mut bytes = encoded(|b| put_u32(b, value));
            assert_eq!(get_u32(&mut bytes).unwrap(), value);
        }
        for value in [f64::MIN, -1.5, 0.0, 1.25, f64::MAX] {
            let mut bytes = encoded(|b| put_f64(b, value));
            assert_eq!(get_f64(&mut bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_bool_nonzero_is_true() {
        let mut bytes = Bytes::from_static(&[0x00, 0x01, 0x7f]);
        assert!(!get_bool(&mut bytes).unwrap());
        assert!(get_bool(&mut bytes).unwrap());
        assert!(get_bool(&mut bytes).unwrap());
    }

    #[test]
    fn test_uuid_raw_bytes() {
        let uuid = Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);
        let mut bytes = encoded(|b| put_uuid(b, &uuid));
        assert_eq!(bytes.len(), UUID_BYTES);
        assert_eq!(bytes[0], 0x00);
        assert_eq!(bytes[15], 0xff);
        assert_eq!(get_uuid(&mut bytes).unwrap(), uuid);
    }

    #[test]
    fn test_truncated_fixed_width() {
        let mut bytes = Bytes::from_static(&[0x00, 0x01, 0x02]);
        let err = get_i32(&mut bytes).unwrap_err();
        assert!(matches!(
            err,
            KafkaError::Truncated {
                needed: 4,
                remaining: 3
            }
        ));
    }

    #[test]
    fn test_uvarint_known_encodings() {
        assert_eq!(&encoded(|b| put_uvarint(b, 0))[..], &[0x00]);
        assert_eq!(&encoded(|b| put_uvarint(b, 127))[..], &[0x7f]);
        assert_eq!(&encoded(|b| put_uvarint(b, 128))[..], &[0x80, 0x01]);
        assert_eq!(&encoded(|b| put_uvarint(b, 300))[..], &[0xac, 0x02]);
        assert_eq!(
            &encoded(|b| put_uvarint(b, u32::MAX))[..],
            &[0xff, 0xff, 0xff, 0xff, 0x0f]
        );
    }

    #[test]
    fn test_varint_zigzag_encodings() {
        assert_eq!(&encoded(|b| put_varint(b, 0))[..], &[0x00]);
        assert_eq!(&encoded(|b| put_varint(b, -1))[..], &[0x01]);
        assert_eq!(&encoded(|b| put_varint(b, 1))[..], &[0x02]);
        assert_eq!(&encoded(|b| put_varint(b, -64))[..], &[0x7f]);
        assert_eq!(&encoded(|b| put_varint(b, 64))[..], &[0x80, 0x01]);
    }

    #[test]
    fn test_varint_boundaries_roundtrip() {
        for value in [i32::MIN, -1, 0, 1, i32::MAX] {
            let mut bytes = encoded(|b| put_varint(b, value));
            assert_eq!(bytes.len(), varint_len(value));
            assert_eq!(get_varint(&mut bytes).unwrap(), value);
        }
        for value in [i64::MIN, -1, 0, 1, i64::MAX] {
            let mut bytes = encoded(|b| put_varlong(b, value));
            assert_eq!(bytes.len(), varlong_len(value));
            assert_eq!(get_varlong(&mut bytes).unwrap(), value);
        }
        for value in [0u32, 1, u32::MAX] {
            let mut bytes = encoded(|b| put_uvarint(b, value));
            assert_eq!(bytes.len(), uvarint_len(value));
            assert_eq!(get_uvarint(&mut bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_varlong_extremes_width() {
        assert_eq!(varlong_len(i64::MIN), MAX_VARLONG_BYTES);
        assert_eq!(varlong_len(i64::MAX), MAX_VARLONG_BYTES);
        assert_eq!(varint_len(i32::MIN), MAX_VARINT_BYTES);
    }

    #[test]
    fn test_varint_truncated_without_terminator() {
        let mut bytes = Bytes::from_static(&[0x80, 0x80]);
        let err = get_uvarint(&mut bytes).unwrap_err();
        assert!(matches!(err, KafkaError::Truncated { .. }));
    }

    #[test]
    fn test_varint_overflow() {
        let mut bytes = Bytes::from_static(&[0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);
        let err = get_uvarint(&mut bytes).unwrap_err();
        assert!(matches!(err, KafkaError::VarintOverflow { max_bytes: 5 }));

        // Fifth group carries bits beyond u32
        let mut bytes = Bytes::from_static(&[0xff, 0xff, 0xff, 0xff, 0x1f]);
        let err = get_uvarint(&mut bytes).unwrap_err();
        assert!(matches!(err, KafkaError::VarintOverflow { max_bytes: 5 }));
    }

    #[test]
    fn test_varlong_final_group_width() {
        let mut max = Bytes::from_static(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);
        assert_eq!(get_uvarlong(&mut max).unwrap(), u64::MAX);

        // Tenth group only has room for bit 63
        let mut wide = Bytes::from_static(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f]);
        let err = get_uvarlong(&mut wide).unwrap_err();
        assert!(matches!(err, KafkaError::VarintOverflow { max_bytes: 10 }));

        let mut wide = Bytes::from_static(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x02]);
        assert!(get_varlong(&mut wide).is_err());
    }

    #[test]
    fn test_fixed_sink_overflow() {
        let mut storage = [0u8; 3];
        let mut sink: &mut [u8] = &mut storage;
        let err = put_i32(&mut sink, 7).unwrap_err();
        assert!(matches!(
            err,
            KafkaError::BufferOverflow {
                needed: 4,
                remaining: 3
            }
        ));
    }

    #[test]
    fn test_zigzag_small_magnitudes_stay_small() {
        assert_eq!(zigzag_encode_32(0), 0);
        assert_eq!(zigzag_encode_32(-1), 1);
        assert_eq!(zigzag_encode_32(1), 2);
        assert_eq!(zigzag_encode_32(i32::MIN), u32::MAX);
        assert_eq!(zigzag_decode_64(zigzag_encode_64(i64::MIN)), i64::MIN);
    }
}
