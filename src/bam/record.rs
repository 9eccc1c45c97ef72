//! Record scanning over a decompressed binary buffer.
//!
//! Iterates variable-length records, applying genomic-range and
//! reference filtering as it goes. Input records must be sorted by
//! (reference index, position); the scan relies on that order to stop as
//! soon as a record lies past the query window, which is what keeps
//! range queries over large sorted inputs cheap. Dropping the ordering
//! precondition would change the scan from "read until past the window"
//! to "read everything".
//!
//! # Record layout
//!
//! ```text
//! - block_size (int32): remaining record size in bytes
//! - refID (int32): reference index (-1 = unmapped)
//! - pos (int32): 0-based leftmost position
//! - bin_mq_nl (uint32): bin<<16 | mapping_quality<<8 | name_len
//! - flag_nc (uint32): flags<<16 | cigar_op_count
//! - l_seq (int32): base count
//! - next_refID (int32), next_pos (int32): mate placement
//! - tlen (int32): template length
//! - read_name (name_len bytes, NUL-terminated)
//! - cigar (4 bytes per operator)
//! - seq ((l_seq+1)/2 bytes, packed 4-bit)
//! - qual (l_seq bytes)
//! - tags (to the end of the record)
//! ```

use crate::bam::cigar::{decode_packed_cigar, long_cigar_from_tag};
use crate::bam::sequence::decode_sequence;
use crate::blocks::make_blocks;
use crate::bytes::read_i32_le;
use crate::cigar::{cigar_string, reference_len};
use crate::record::{AlignmentFilter, AlignmentRecord, Mate, FLAG_MATE_REVERSE};
use crate::tags::Tags;

/// Fixed-width fields of a record, including the block-size word.
const FIXED_LEN: usize = 36;

/// Decode records from `buf` starting at `offset`, appending accepted
/// records to `sink`.
///
/// A record is accepted when its reference span overlaps
/// `[min_pos, max_pos]`, its reference matches `reference_index` (when
/// one is given), and the optional `filter` passes it. Accepted records
/// have their CIGAR expanded into blocks and insertions.
///
/// The scan ends at the end of the buffer, at a truncated trailing
/// record (end-of-stream semantics, not an error), or as soon as the
/// sorted input shows that every remaining record lies past the window:
/// a reference index greater than the target, or a start position past
/// `max_pos`. Unmapped records and records on references before the
/// target are skipped.
///
/// `reference_names` maps reference indices to names (the header
/// dictionary's name table).
#[allow(clippy::too_many_arguments)]
pub fn decode_records(
    buf: &[u8],
    mut offset: usize,
    sink: &mut Vec<AlignmentRecord>,
    min_pos: i32,
    max_pos: i32,
    reference_index: Option<usize>,
    reference_names: &[String],
    filter: Option<&dyn AlignmentFilter>,
) {
    while offset + 4 <= buf.len() {
        let block_size = read_i32_le(buf, offset);
        if block_size < 0 {
            return;
        }
        let block_end = offset + 4 + block_size as usize;
        if block_end > buf.len() {
            return; // truncated trailing record
        }

        let rec = &buf[offset..block_end];
        offset = block_end;

        if rec.len() < FIXED_LEN {
            return; // shorter than the fixed fields; treat as truncation
        }

        let ref_id = read_i32_le(rec, 4);
        let pos = read_i32_le(rec, 8);

        if ref_id < 0 {
            continue; // unmapped
        }
        let ref_index = ref_id as usize;
        if reference_index.is_some_and(|target| ref_index > target) || pos > max_pos {
            return; // sorted input: everything from here on is further right
        }
        if reference_index.is_some_and(|target| ref_index < target) {
            continue; // still to the left of the target reference
        }

        let bin_mq_nl = read_i32_le(rec, 12) as u32;
        let name_len = (bin_mq_nl & 0xFF) as usize;
        let mapping_quality = ((bin_mq_nl >> 8) & 0xFF) as u8;
        let flag_nc = read_i32_le(rec, 16) as u32;
        let flags = (flag_nc >> 16) as u16;
        let cigar_count = (flag_nc & 0xFFFF) as usize;
        let seq_len = read_i32_le(rec, 20).max(0) as usize;
        let mate_ref_id = read_i32_le(rec, 24);
        let mate_pos = read_i32_le(rec, 28);
        let fragment_length = read_i32_le(rec, 32);

        let name_end = FIXED_LEN + name_len;
        let cigar_end = name_end + 4 * cigar_count;
        let seq_bytes = seq_len.div_ceil(2);
        let qual_end = cigar_end + seq_bytes + seq_len;
        if qual_end > rec.len() {
            return; // record overruns its own declared block
        }

        // name_len counts the NUL terminator; it is not part of the name
        let read_name =
            String::from_utf8_lossy(&rec[FIXED_LEN..FIXED_LEN + name_len.saturating_sub(1)])
                .into_owned();

        let mut cigar = decode_packed_cigar(rec, name_end, cigar_count);
        if let Some(full) = long_cigar_from_tag(rec, qual_end, pos, cigar.len()) {
            cigar = full;
        }
        let length_on_ref = reference_len(&cigar);

        // span ends left of the window: nothing to materialize
        if pos + (length_on_ref as i32) < min_pos {
            continue;
        }

        let sequence = if seq_len == 0 {
            String::from("*")
        } else {
            decode_sequence(&rec[cigar_end..cigar_end + seq_bytes], seq_len)
        };

        let qual = &rec[cigar_end + seq_bytes..qual_end];
        let base_qualities = if seq_len == 0 || (seq_len == 1 && qual[0] as u16 + 33 == b'*' as u16)
        {
            None // quality unavailable sentinel
        } else {
            Some(qual.to_vec())
        };

        let mate = if mate_ref_id >= 0 {
            reference_names
                .get(mate_ref_id as usize)
                .map(|name| Mate {
                    reference_name: name.clone(),
                    position: mate_pos,
                    forward_strand: flags & FLAG_MATE_REVERSE == 0,
                })
        } else {
            None
        };

        let reference_name = match reference_names.get(ref_index) {
            Some(name) => name.clone(),
            None => continue, // reference index beyond the supplied table
        };

        let overlaps = pos <= max_pos && pos + length_on_ref as i32 >= min_pos;
        let on_target = reference_index.map_or(true, |target| ref_index == target);
        if !(overlaps && on_target) {
            continue;
        }

        let mut record = AlignmentRecord {
            reference_name,
            start: pos,
            flags,
            mapping_quality,
            read_name,
            cigar_string: cigar_string(&cigar),
            length_on_ref,
            fragment_length,
            sequence,
            base_qualities,
            mate,
            // trailing tag bytes stay undecoded until asked for
            tags: Tags::Binary(rec[qual_end..].to_vec()),
            cigar,
            blocks: Vec::new(),
            insertions: Vec::new(),
        };

        if filter.map_or(true, |f| f.pass(&record)) {
            let (blocks, insertions) = make_blocks(
                record.start,
                &record.sequence,
                record.base_qualities.as_deref(),
                &record.cigar,
            );
            record.blocks = blocks;
            record.insertions = insertions;
            sink.push(record);
        }
    }
}
