//! Packed CIGAR decoding and the long-CIGAR overflow path.
//!
//! The inline CIGAR field of a binary record packs each operator into a
//! 4-byte little-endian word: length in the high 28 bits, operation code
//! in the low 4, mapped through the 16-entry code table (codes 9–15
//! reserved). Because the inline operator count field is only 16 bits
//! wide, records with longer CIGARs store a single placeholder operator
//! inline and the real list in a `CG` binary-array tag.

use crate::bytes::read_i32_le;
use crate::cigar::{CigarKind, CigarOp};
use log::debug;

/// Decode `count` packed 4-byte CIGAR words at `offset`.
///
/// Callers must have validated that `offset + 4 * count` lies within the
/// record.
pub(crate) fn decode_packed_cigar(rec: &[u8], offset: usize, count: usize) -> Vec<CigarOp> {
    let mut ops = Vec::with_capacity(count);
    for i in 0..count {
        let word = read_i32_le(rec, offset + 4 * i) as u32;
        ops.push(CigarOp::new(word >> 4, CigarKind::from_code((word & 0x0F) as u8)));
    }
    ops
}

/// Payload size of the fixed-width atomic tag types; 0 for anything else.
fn type_size(type_code: u8) -> usize {
    match type_code {
        b'C' | b'c' | b'A' => 1,
        b'S' | b's' => 2,
        b'I' | b'i' | b'f' => 4,
        _ => 0,
    }
}

/// Re-read the true CIGAR from a `CG` binary-array tag.
///
/// The overflow encoding is only attempted when the inline operator
/// count is exactly 1 and the record's start coordinate is non-negative
/// (a negative start signals an already-invalid record). The tag region
/// beginning at `tag_start` is walked tag by tag; the scan ends without
/// overflow when the region is exhausted, when the `CG` tag's array
/// element type is not the 32-bit-integer code, or when the declared
/// array would read past the record end (a defensive bound, not
/// record-fatal) — in each case the caller keeps the inline CIGAR.
pub(crate) fn long_cigar_from_tag(
    rec: &[u8],
    tag_start: usize,
    start: i32,
    inline_count: usize,
) -> Option<Vec<CigarOp>> {
    if inline_count != 1 || start < 0 {
        return None;
    }

    let block_end = rec.len();
    let mut p = tag_start;
    while p + 4 < block_end {
        if &rec[p..p + 2] == b"CG" {
            break;
        }
        let type_code = rec[p + 2];
        match type_code {
            b'B' => {
                if p + 8 > block_end {
                    return None;
                }
                let subtype = rec[p + 3];
                let count = read_i32_le(rec, p + 4).max(0) as usize;
                p += 8 + type_size(subtype) * count;
            }
            b'Z' | b'H' => {
                p += 3;
                while p < block_end && rec[p] != 0 {
                    p += 1;
                }
                p += 1;
            }
            _ => p += 3 + type_size(type_code),
        }
    }

    if p + 8 > block_end {
        return None; // region exhausted before a CG tag
    }
    if rec[p + 2] != b'B' || rec[p + 3] != b'I' {
        return None; // not a 32-bit-integer array
    }

    let count = read_i32_le(rec, p + 4);
    if count < 0 {
        return None;
    }
    let count = count as usize;
    let offset = p + 8;
    if offset + count * 4 > block_end {
        debug!(
            "CG tag declares {} operators past the record end; keeping inline CIGAR",
            count
        );
        return None;
    }

    Some(decode_packed_cigar(rec, offset, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cigar::{cigar_string, reference_len};

    fn pack(len: u32, code: u32) -> [u8; 4] {
        ((len << 4) | code).to_le_bytes()
    }

    #[test]
    fn test_decode_packed_single_match() {
        let data = pack(100, 0);
        let ops = decode_packed_cigar(&data, 0, 1);
        assert_eq!(ops, vec![CigarOp::new(100, CigarKind::Match)]);
    }

    #[test]
    fn test_decode_packed_all_codes() {
        let mut data = Vec::new();
        for code in 0..9u32 {
            data.extend_from_slice(&pack(1, code));
        }
        let ops = decode_packed_cigar(&data, 0, 9);
        let rendered: String = cigar_string(&ops);
        assert_eq!(rendered, "1M1I1D1N1S1H1P1=1X");
    }

    #[test]
    fn test_decode_packed_reserved_code() {
        let data = pack(7, 11);
        let ops = decode_packed_cigar(&data, 0, 1);
        assert_eq!(ops, vec![CigarOp::new(7, CigarKind::Other('?'))]);
    }

    /// Tag region followed by a CG:B,I array holding the real CIGAR.
    fn build_tag_region(leading: &[u8], cg_ops: &[(u32, u32)]) -> Vec<u8> {
        let mut data = leading.to_vec();
        data.extend_from_slice(b"CGBI");
        data.extend_from_slice(&(cg_ops.len() as u32).to_le_bytes());
        for &(len, code) in cg_ops {
            data.extend_from_slice(&pack(len, code));
        }
        data
    }

    #[test]
    fn test_overflow_replaces_placeholder() {
        // 5 real operators: 10M 2I 5M 3D 10M
        let real = [(10, 0), (2, 1), (5, 0), (3, 2), (10, 0)];
        let rec = build_tag_region(&[], &real);

        let ops = long_cigar_from_tag(&rec, 0, 100, 1).unwrap();
        assert_eq!(ops.len(), 5);
        assert_eq!(cigar_string(&ops), "10M2I5M3D10M");
        assert_eq!(reference_len(&ops), 10 + 5 + 3 + 10);
    }

    #[test]
    fn test_overflow_skips_preceding_tags() {
        let mut leading = Vec::new();
        // NM:i:4
        leading.extend_from_slice(b"NMi");
        leading.extend_from_slice(&4i32.to_le_bytes());
        // RG:Z:lib1
        leading.extend_from_slice(b"RGZ");
        leading.extend_from_slice(b"lib1\0");
        // XA:B:c with 3 elements
        leading.extend_from_slice(b"XABc");
        leading.extend_from_slice(&3u32.to_le_bytes());
        leading.extend_from_slice(&[1, 2, 3]);

        let rec = build_tag_region(&leading, &[(8, 0), (2, 2)]);
        let ops = long_cigar_from_tag(&rec, 0, 0, 1).unwrap();
        assert_eq!(cigar_string(&ops), "8M2D");
    }

    #[test]
    fn test_overflow_requires_single_inline_op() {
        let rec = build_tag_region(&[], &[(8, 0)]);
        assert!(long_cigar_from_tag(&rec, 0, 0, 2).is_none());
        assert!(long_cigar_from_tag(&rec, 0, 0, 0).is_none());
    }

    #[test]
    fn test_overflow_requires_non_negative_start() {
        let rec = build_tag_region(&[], &[(8, 0)]);
        assert!(long_cigar_from_tag(&rec, 0, -1, 1).is_none());
    }

    #[test]
    fn test_no_cg_tag_keeps_inline() {
        let mut rec = Vec::new();
        rec.extend_from_slice(b"NMi");
        rec.extend_from_slice(&4i32.to_le_bytes());
        assert!(long_cigar_from_tag(&rec, 0, 0, 1).is_none());
    }

    #[test]
    fn test_wrong_subtype_keeps_inline() {
        // CG:B,i (signed) instead of CG:B,I
        let mut rec = Vec::new();
        rec.extend_from_slice(b"CGBi");
        rec.extend_from_slice(&1u32.to_le_bytes());
        rec.extend_from_slice(&pack(8, 0));
        assert!(long_cigar_from_tag(&rec, 0, 0, 1).is_none());
    }

    #[test]
    fn test_declared_array_past_record_end_keeps_inline() {
        let mut rec = Vec::new();
        rec.extend_from_slice(b"CGBI");
        rec.extend_from_slice(&100u32.to_le_bytes()); // claims 100 operators
        rec.extend_from_slice(&pack(8, 0)); // only one present
        assert!(long_cigar_from_tag(&rec, 0, 0, 1).is_none());
    }

    #[test]
    fn test_empty_tag_region() {
        assert!(long_cigar_from_tag(&[], 0, 0, 1).is_none());
    }
}
