//! Little-endian primitive reads over byte buffers.
//!
//! All readers take an explicit offset; there is no cursor state shared
//! between calls. Callers track and pass the next offset themselves,
//! which keeps record scanning a pure function of `(buffer, offset)`.

use crate::error::{DecodeError, Result};

/// Read a signed 32-bit little-endian integer at `offset`.
///
/// Not bounds-checked: callers are expected to have validated the
/// containing structure's declared size first (the record scan verifies
/// each record's block end before any field read). Reading past the
/// buffer is a caller bug and panics.
#[inline]
pub fn read_i32_le(buf: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Read an unsigned 32-bit little-endian integer at `offset`.
///
/// # Errors
///
/// Returns [`DecodeError::OutOfBounds`] when `offset + 4` exceeds the
/// buffer length.
#[inline]
pub fn read_u32_le(buf: &[u8], offset: usize) -> Result<u32> {
    if offset + 4 > buf.len() {
        return Err(DecodeError::OutOfBounds {
            offset,
            len: 4,
            buffer_len: buf.len(),
        });
    }
    Ok(u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]))
}

/// Read `len` bytes at `offset` as UTF-8 text.
///
/// # Errors
///
/// Returns [`DecodeError::OutOfBounds`] when the field extends past the
/// buffer, or [`DecodeError::InvalidText`] when the bytes are not valid
/// UTF-8.
pub fn read_fixed_str(buf: &[u8], offset: usize, len: usize) -> Result<&str> {
    let end = offset
        .checked_add(len)
        .filter(|&end| end <= buf.len())
        .ok_or(DecodeError::OutOfBounds {
            offset,
            len,
            buffer_len: buf.len(),
        })?;
    std::str::from_utf8(&buf[offset..end]).map_err(|_| DecodeError::InvalidText { offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_i32_le() {
        let data = 1_600i32.to_le_bytes();
        assert_eq!(read_i32_le(&data, 0), 1_600);

        let data = (-1i32).to_le_bytes();
        assert_eq!(read_i32_le(&data, 0), -1);
    }

    #[test]
    fn test_read_i32_le_at_offset() {
        let mut data = vec![0xAB, 0xCD];
        data.extend_from_slice(&42i32.to_le_bytes());
        assert_eq!(read_i32_le(&data, 2), 42);
    }

    #[test]
    fn test_read_u32_le() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(read_u32_le(&data, 0).unwrap(), u32::MAX);
    }

    #[test]
    fn test_read_u32_le_out_of_bounds() {
        let data = [0u8; 3];
        let err = read_u32_le(&data, 0).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::OutOfBounds {
                offset: 0,
                len: 4,
                buffer_len: 3
            }
        ));
    }

    #[test]
    fn test_read_u32_le_offset_past_end() {
        let data = [0u8; 8];
        assert!(read_u32_le(&data, 5).is_err());
        assert!(read_u32_le(&data, 4).is_ok());
    }

    #[test]
    fn test_read_fixed_str() {
        let data = b"..chr1..";
        assert_eq!(read_fixed_str(data, 2, 4).unwrap(), "chr1");
    }

    #[test]
    fn test_read_fixed_str_out_of_bounds() {
        let data = b"chr1";
        assert!(read_fixed_str(data, 2, 4).is_err());
    }

    #[test]
    fn test_read_fixed_str_invalid_utf8() {
        let data = [0xFF, 0xFE, 0xFD];
        let err = read_fixed_str(&data, 0, 3).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidText { offset: 0 }));
    }

    #[test]
    fn test_read_fixed_str_empty() {
        let data = b"x";
        assert_eq!(read_fixed_str(data, 1, 0).unwrap(), "");
    }
}
