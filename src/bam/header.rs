//! Binary header decoding.
//!
//! Two header dialects share one decoding shape. Both start with a
//! 4-byte magic signature; the alternate dialect carries an extra 4-byte
//! flags word immediately after it. Then: a 4-byte text-header length,
//! that many bytes of plain text (handed through unparsed), a 4-byte
//! reference count, and the reference dictionary.

use crate::bam::reference::{decode_reference_dictionary, AliasResolver, ReferenceDictionary};
use crate::bytes::{read_fixed_str, read_u32_le};
use crate::error::{DecodeError, Result};

/// Magic signature of the primary dialect.
pub const MAGIC: [u8; 4] = *b"BAM\x01";

/// Magic signature of the alternate dialect.
pub const ALT_MAGIC: [u8; 4] = *b"BAM\x02";

/// Decoded header: magic word, total size, text header and references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Magic signature as a little-endian word
    pub magic: u32,
    /// Total header size in bytes; records begin at this offset
    pub size: usize,
    /// Embedded text header, passed through unparsed
    pub text: String,
    /// Reference dictionary declared by the header
    pub references: ReferenceDictionary,
}

fn check_magic(buf: &[u8], expected: [u8; 4]) -> Result<u32> {
    let prefix = buf.len().min(4);
    if prefix < 4 || buf[..4] != expected {
        let mut actual = [0u8; 4];
        actual[..prefix].copy_from_slice(&buf[..prefix]);
        return Err(DecodeError::BadMagic { expected, actual });
    }
    Ok(u32::from_le_bytes(expected))
}

fn decode_body(
    buf: &[u8],
    offset: usize,
    magic: u32,
    resolver: Option<&dyn AliasResolver>,
) -> Result<Header> {
    let text_len = read_u32_le(buf, offset)? as usize;
    let text = read_fixed_str(buf, offset + 4, text_len)?.to_string();
    let n_ref = read_u32_le(buf, offset + 4 + text_len)? as usize;
    let (references, size) =
        decode_reference_dictionary(buf, offset + 8 + text_len, n_ref, resolver)?;
    Ok(Header {
        magic,
        size,
        text,
        references,
    })
}

/// Decode a primary-dialect header.
///
/// # Errors
///
/// [`DecodeError::BadMagic`] when the buffer does not start with the
/// primary signature (the input is not decodable; no partial result),
/// plus inherited bounds/UTF-8 errors for a truncated or garbled header.
pub fn decode_header(buf: &[u8], resolver: Option<&dyn AliasResolver>) -> Result<Header> {
    let magic = check_magic(buf, MAGIC)?;
    decode_body(buf, 4, magic, resolver)
}

/// Decode an alternate-dialect header.
///
/// The alternate dialect carries a 4-byte flags word after the magic.
/// The format defines no semantics for set flags, so a nonzero word is
/// fatal: decoding further would silently mis-parse.
///
/// # Errors
///
/// [`DecodeError::BadMagic`], [`DecodeError::UnsupportedHeaderFlags`],
/// plus inherited bounds/UTF-8 errors.
pub fn decode_alternate_header(
    buf: &[u8],
    resolver: Option<&dyn AliasResolver>,
) -> Result<Header> {
    let magic = check_magic(buf, ALT_MAGIC)?;
    let flags = read_u32_le(buf, 4)?;
    if flags != 0 {
        return Err(DecodeError::UnsupportedHeaderFlags { flags });
    }
    decode_body(buf, 8, magic, resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode_reference(data: &mut Vec<u8>, name: &str, length: u32) {
        data.extend_from_slice(&((name.len() + 1) as u32).to_le_bytes());
        data.extend_from_slice(name.as_bytes());
        data.push(0);
        data.extend_from_slice(&length.to_le_bytes());
    }

    fn encode_header(magic: &[u8; 4], flags: Option<u32>, text: &str, refs: &[&str]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(magic);
        if let Some(flags) = flags {
            data.extend_from_slice(&flags.to_le_bytes());
        }
        data.extend_from_slice(&(text.len() as u32).to_le_bytes());
        data.extend_from_slice(text.as_bytes());
        data.extend_from_slice(&(refs.len() as u32).to_le_bytes());
        for name in refs {
            encode_reference(&mut data, name, 1000);
        }
        data
    }

    #[test]
    fn test_decode_header() {
        let data = encode_header(&MAGIC, None, "@HD\tVN:1.6\n", &["chr1", "chr2"]);
        let header = decode_header(&data, None).unwrap();

        assert_eq!(header.magic, u32::from_le_bytes(MAGIC));
        assert_eq!(header.text, "@HD\tVN:1.6\n");
        assert_eq!(header.references.len(), 2);
        assert_eq!(header.references.name(0), Some("chr1"));
        assert_eq!(header.references.index_of("chr2"), Some(1));
        assert_eq!(header.size, data.len());
    }

    #[test]
    fn test_decode_header_bad_magic() {
        let data = encode_header(b"BAMX", None, "", &[]);
        let err = decode_header(&data, None).unwrap_err();
        assert!(matches!(err, DecodeError::BadMagic { .. }));
    }

    #[test]
    fn test_decode_header_short_buffer() {
        assert!(decode_header(b"BA", None).is_err());
    }

    #[test]
    fn test_decode_alternate_header() {
        let data = encode_header(&ALT_MAGIC, Some(0), "@HD\tVN:1.6\n", &["chr1"]);
        let header = decode_alternate_header(&data, None).unwrap();
        assert_eq!(header.references.len(), 1);
        assert_eq!(header.size, data.len());
    }

    #[test]
    fn test_decode_alternate_header_rejects_flags() {
        let data = encode_header(&ALT_MAGIC, Some(0x0000_0004), "", &[]);
        let err = decode_alternate_header(&data, None).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnsupportedHeaderFlags { flags: 4 }
        ));
    }

    #[test]
    fn test_empty_text_and_references() {
        let data = encode_header(&MAGIC, None, "", &[]);
        let header = decode_header(&data, None).unwrap();
        assert_eq!(header.text, "");
        assert!(header.references.is_empty());
        assert_eq!(header.size, 12);
    }

    proptest! {
        /// Synthetic headers with N well-formed entries decode to N
        /// names, a bijective name -> index map, and a final offset
        /// equal to the encoded byte length.
        #[test]
        fn prop_header_size_and_bijection(names in prop::collection::vec("[a-zA-Z0-9_]{1,12}", 0..8)) {
            // de-duplicate: the map is only bijective over unique names
            let mut unique = names.clone();
            unique.sort();
            unique.dedup();
            let refs: Vec<&str> = unique.iter().map(String::as_str).collect();

            let data = encode_header(&MAGIC, None, "@HD\tVN:1.6\n", &refs);
            let header = decode_header(&data, None).unwrap();

            prop_assert_eq!(header.size, data.len());
            prop_assert_eq!(header.references.len(), refs.len());
            for (index, name) in refs.iter().enumerate() {
                prop_assert_eq!(header.references.name(index), Some(*name));
                prop_assert_eq!(header.references.index_of(name), Some(index));
            }
        }
    }
}
