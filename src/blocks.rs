//! Expansion of CIGAR geometry into renderable blocks and insertions.
//!
//! A block is a maximal run of read positions aligned one-to-one against
//! the reference; an insertion is a run of read bases with no reference
//! coordinate, tracked separately so renderers can special-case it.
//! Insertions never extend a record's reference span.

use crate::cigar::{CigarKind, CigarOp};
use log::warn;

/// The kind of gap immediately preceding an aligned block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    /// Soft-clipped read bases
    SoftClip,
    /// Skipped reference region (N)
    Skip,
    /// Deletion from the reference
    Deletion,
}

/// A maximal contiguous aligned run of the read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentBlock {
    /// Genomic coordinate of the block start
    pub start: i32,
    /// Block length in bases
    pub len: u32,
    /// Read bases covered by the block, or `"*"` when unavailable
    pub sequence: String,
    /// Base qualities covered by the block, absent when not recorded
    pub qualities: Option<Vec<u8>>,
    /// Gap separating this block from the previous one
    pub leading_gap: Option<GapKind>,
}

/// Read bases inserted between two aligned blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Genomic coordinate of the insertion point
    pub start: i32,
    /// Number of inserted bases
    pub len: u32,
    /// Inserted bases, or `"*"` when unavailable
    pub sequence: String,
    /// Qualities of the inserted bases, absent when not recorded
    pub qualities: Option<Vec<u8>>,
}

/// Expand a record's CIGAR into aligned blocks and insertions.
///
/// Walks the operators in order with a read-offset cursor and a
/// reference-position cursor starting at `start`:
///
/// - hard clips and pads move neither cursor and emit nothing
/// - soft clips advance the read cursor and set the pending gap
/// - skips and deletions advance the reference cursor and set the
///   pending gap
/// - insertions slice read bases at the current offsets into an
///   [`Insertion`] anchored at the current reference position
/// - match operators slice read bases into an [`AlignmentBlock`] tagged
///   with the pending gap (cleared after use) and advance both cursors
///
/// Slices clamp to the available sequence, so a CIGAR that disagrees
/// with the sequence length yields short slices rather than a panic.
pub fn make_blocks(
    start: i32,
    sequence: &str,
    qualities: Option<&[u8]>,
    cigar: &[CigarOp],
) -> (Vec<AlignmentBlock>, Vec<Insertion>) {
    let mut blocks = Vec::new();
    let mut insertions = Vec::new();

    let mut seq_offset = 0usize;
    let mut pos = start;
    let mut pending_gap: Option<GapKind> = None;

    for op in cigar {
        let len = op.len as usize;
        match op.kind {
            CigarKind::HardClip | CigarKind::Pad => {}
            CigarKind::SoftClip => {
                seq_offset += len;
                pending_gap = Some(GapKind::SoftClip);
            }
            CigarKind::Skip => {
                pos += op.len as i32;
                pending_gap = Some(GapKind::Skip);
            }
            CigarKind::Deletion => {
                pos += op.len as i32;
                pending_gap = Some(GapKind::Deletion);
            }
            CigarKind::Insertion => {
                insertions.push(Insertion {
                    start: pos,
                    len: op.len,
                    sequence: slice_sequence(sequence, seq_offset, len),
                    qualities: slice_qualities(qualities, seq_offset, len),
                });
                seq_offset += len;
            }
            CigarKind::Match | CigarKind::SeqMatch | CigarKind::SeqMismatch => {
                blocks.push(AlignmentBlock {
                    start: pos,
                    len: op.len,
                    sequence: slice_sequence(sequence, seq_offset, len),
                    qualities: slice_qualities(qualities, seq_offset, len),
                    leading_gap: pending_gap.take(),
                });
                seq_offset += len;
                pos += op.len as i32;
            }
            CigarKind::Other(c) => {
                warn!("ignoring unrecognized CIGAR operator {}{}", op.len, c);
            }
        }
    }

    (blocks, insertions)
}

fn slice_sequence(sequence: &str, offset: usize, len: usize) -> String {
    if sequence == "*" {
        return String::from("*");
    }
    let start = offset.min(sequence.len());
    let end = (offset + len).min(sequence.len());
    sequence[start..end].to_string()
}

fn slice_qualities(qualities: Option<&[u8]>, offset: usize, len: usize) -> Option<Vec<u8>> {
    qualities.map(|quals| {
        let start = offset.min(quals.len());
        let end = (offset + len).min(quals.len());
        quals[start..end].to_vec()
    })
}
