//! Decoding of ZCL typed values (type id followed by little-endian payload).

use super::AttributeValue;
use crate::error::{QuirkError, Result};

pub const BOOLEAN: u8 = 0x10;
pub const UINT8: u8 = 0x20;
pub const UINT64: u8 = 0x27;
pub const INT8: u8 = 0x28;
pub const INT64: u8 = 0x2F;
pub const SINGLE: u8 = 0x39;
pub const DOUBLE: u8 = 0x3A;
pub const CHAR_STRING: u8 = 0x42;

/// Length byte marking an invalid (absent) character string
const INVALID_STRING_LEN: u8 = 0xFF;

/// Decode one value of ZCL type `type_id` from the front of `data`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode(type_id: u8, data: &[u8]) -> Result<(AttributeValue, usize)> {
    match type_id {
        BOOLEAN => {
            let b = take(data, 1, type_id)?;
            Ok((AttributeValue::Bool(b[0] != 0), 1))
        }
        UINT8..=UINT64 => {
            let len = (type_id - UINT8 + 1) as usize;
            let raw = le_unsigned(take(data, len, type_id)?);
            let value = i64::try_from(raw).map_err(|_| {
                QuirkError::MalformedPayload(format!("uint64 value {raw} out of range"))
            })?;
            Ok((AttributeValue::Int(value), len))
        }
        INT8..=INT64 => {
            let len = (type_id - INT8 + 1) as usize;
            let raw = le_unsigned(take(data, len, type_id)?);
            // Sign-extend from the encoded width
            let shift = 64 - 8 * len as u32;
            let value = ((raw << shift) as i64) >> shift;
            Ok((AttributeValue::Int(value), len))
        }
        SINGLE => {
            let b = take(data, 4, type_id)?;
            let v = f32::from_le_bytes([b[0], b[1], b[2], b[3]]);
            Ok((AttributeValue::Float(v as f64), 4))
        }
        DOUBLE => {
            let b = take(data, 8, type_id)?;
            let mut raw = [0u8; 8];
            raw.copy_from_slice(b);
            Ok((AttributeValue::Float(f64::from_le_bytes(raw)), 8))
        }
        CHAR_STRING => {
            let len = take(data, 1, type_id)?[0];
            if len == INVALID_STRING_LEN {
                return Ok((AttributeValue::Text(String::new()), 1));
            }
            let len = len as usize;
            let body = take(&data[1..], len, type_id)?;
            let text = String::from_utf8_lossy(body).into_owned();
            Ok((AttributeValue::Text(text), len + 1))
        }
        other => Err(QuirkError::MalformedPayload(format!(
            "unsupported ZCL type 0x{other:02X}"
        ))),
    }
}

fn take(data: &[u8], len: usize, type_id: u8) -> Result<&[u8]> {
    data.get(..len).ok_or_else(|| {
        QuirkError::MalformedPayload(format!(
            "truncated value of type 0x{type_id:02X}: need {len} bytes, have {}",
            data.len()
        ))
    })
}

fn le_unsigned(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_widths() {
        assert_eq!(
            decode(UINT8, &[0xFE]).unwrap(),
            (AttributeValue::Int(254), 1)
        );
        // uint16 battery voltage 3005 mV
        assert_eq!(
            decode(0x21, &[0xBD, 0x0B, 0xAA]).unwrap(),
            (AttributeValue::Int(3005), 2)
        );
        // uint40
        assert_eq!(
            decode(0x24, &[1, 0, 0, 0, 1]).unwrap(),
            (AttributeValue::Int(0x01_0000_0001), 5)
        );
    }

    #[test]
    fn test_signed_values_sign_extend() {
        assert_eq!(
            decode(INT8, &[0xE7]).unwrap(),
            (AttributeValue::Int(-25), 1)
        );
        assert_eq!(
            decode(0x29, &[0xFF, 0x7F]).unwrap(),
            (AttributeValue::Int(32767), 2)
        );
        assert_eq!(
            decode(0x29, &[0x00, 0x80]).unwrap(),
            (AttributeValue::Int(-32768), 2)
        );
    }

    #[test]
    fn test_bool_float_and_string() {
        assert_eq!(
            decode(BOOLEAN, &[1]).unwrap(),
            (AttributeValue::Bool(true), 1)
        );
        let (v, n) = decode(SINGLE, &1.5f32.to_le_bytes()).unwrap();
        assert_eq!((v, n), (AttributeValue::Float(1.5), 4));
        assert_eq!(
            decode(CHAR_STRING, &[2, b'o', b'k', 0xFF]).unwrap(),
            (AttributeValue::Text("ok".into()), 3)
        );
    }

    #[test]
    fn test_invalid_string_is_empty() {
        assert_eq!(
            decode(CHAR_STRING, &[0xFF, 0x01]).unwrap(),
            (AttributeValue::Text(String::new()), 1)
        );
    }

    #[test]
    fn test_truncated_and_unsupported() {
        assert!(matches!(
            decode(0x23, &[1, 2]),
            Err(QuirkError::MalformedPayload(_))
        ));
        assert!(matches!(
            decode(0x48, &[0]),
            Err(QuirkError::MalformedPayload(_))
        ));
    }
}
