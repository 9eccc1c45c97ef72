//! CIGAR operator model shared by the binary and text decoders.
//!
//! A CIGAR describes how a read aligns to the reference as a run-length
//! sequence of operations (match, insertion, deletion, clip, skip, pad).
//! The binary format packs each operator into a 32-bit word (high 28 bits
//! length, low 4 bits operation code); the text format spells operators
//! as `<length><letter>` runs.
//!
//! # Operations
//!
//! - M: alignment match (can include mismatches)
//! - I: insertion to the reference
//! - D: deletion from the reference
//! - N: skipped region (intron for RNA-seq)
//! - S: soft clipping (bases present in read, not aligned)
//! - H: hard clipping (bases absent from record)
//! - P: padding (silent deletion from padded reference)
//! - =: sequence match
//! - X: sequence mismatch

use std::fmt;

/// CIGAR operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarKind {
    /// Alignment match or mismatch (M)
    Match,
    /// Insertion to the reference (I)
    Insertion,
    /// Deletion from the reference (D)
    Deletion,
    /// Skipped region of the reference (N)
    Skip,
    /// Soft clipping (S)
    SoftClip,
    /// Hard clipping (H)
    HardClip,
    /// Padding (P)
    Pad,
    /// Sequence match (=)
    SeqMatch,
    /// Sequence mismatch (X)
    SeqMismatch,
    /// Reserved or unrecognized operator, carrying the character it
    /// renders as. Consumes neither reference nor read; ignored (with a
    /// diagnostic) by block expansion.
    Other(char),
}

impl CigarKind {
    /// Map a 4-bit binary operation code through the 16-entry code table.
    ///
    /// Codes 9–15 are reserved and render as `'?'`.
    pub fn from_code(code: u8) -> CigarKind {
        match code & 0x0F {
            0 => CigarKind::Match,
            1 => CigarKind::Insertion,
            2 => CigarKind::Deletion,
            3 => CigarKind::Skip,
            4 => CigarKind::SoftClip,
            5 => CigarKind::HardClip,
            6 => CigarKind::Pad,
            7 => CigarKind::SeqMatch,
            8 => CigarKind::SeqMismatch,
            _ => CigarKind::Other('?'),
        }
    }

    /// Map a text operator letter to its kind.
    ///
    /// Unrecognized letters are preserved in [`CigarKind::Other`].
    pub fn from_char(c: char) -> CigarKind {
        match c {
            'M' => CigarKind::Match,
            'I' => CigarKind::Insertion,
            'D' => CigarKind::Deletion,
            'N' => CigarKind::Skip,
            'S' => CigarKind::SoftClip,
            'H' => CigarKind::HardClip,
            'P' => CigarKind::Pad,
            '=' => CigarKind::SeqMatch,
            'X' => CigarKind::SeqMismatch,
            other => CigarKind::Other(other),
        }
    }

    /// Operator letter used in the canonical string rendering.
    pub fn as_char(&self) -> char {
        match self {
            CigarKind::Match => 'M',
            CigarKind::Insertion => 'I',
            CigarKind::Deletion => 'D',
            CigarKind::Skip => 'N',
            CigarKind::SoftClip => 'S',
            CigarKind::HardClip => 'H',
            CigarKind::Pad => 'P',
            CigarKind::SeqMatch => '=',
            CigarKind::SeqMismatch => 'X',
            CigarKind::Other(c) => *c,
        }
    }

    /// Whether this operation consumes reference positions.
    ///
    /// The sum of lengths over reference-consuming operators is a
    /// record's `length_on_ref`.
    pub fn consumes_reference(&self) -> bool {
        matches!(
            self,
            CigarKind::Match
                | CigarKind::Deletion
                | CigarKind::Skip
                | CigarKind::SeqMatch
                | CigarKind::SeqMismatch
        )
    }
}

/// One CIGAR operator: a length and an operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarOp {
    /// Operation length (number of bases or reference positions)
    pub len: u32,
    /// Operation kind
    pub kind: CigarKind,
}

impl CigarOp {
    /// Create an operator.
    pub fn new(len: u32, kind: CigarKind) -> Self {
        Self { len, kind }
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len, self.kind.as_char())
    }
}

/// Render the canonical CIGAR string for an operator sequence.
pub fn cigar_string(ops: &[CigarOp]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(ops.len() * 4);
    for op in ops {
        // writing to a String cannot fail
        let _ = write!(out, "{}", op);
    }
    out
}

/// Total reference span of an operator sequence.
///
/// Sums the lengths of reference-consuming operators (M, D, N, =, X).
pub fn reference_len(ops: &[CigarOp]) -> u32 {
    ops.iter()
        .filter(|op| op.kind.consumes_reference())
        .map(|op| op.len)
        .sum()
}

/// Parse a text-form CIGAR into operators, merging adjacent runs.
///
/// Consecutive digits accumulate a length; the following letter closes
/// the operator. An operator with the same letter as its predecessor is
/// summed into it rather than appended, so `"5M5M3I"` parses to
/// `[10M, 3I]`. The `"*"` placeholder yields an empty sequence. A letter
/// with no preceding digits is logged and skipped.
///
/// # Example
///
/// ```
/// use bamlens::cigar::{parse_text_cigar, CigarKind};
///
/// let ops = parse_text_cigar("5M5M3I");
/// assert_eq!(ops.len(), 2);
/// assert_eq!((ops[0].len, ops[0].kind), (10, CigarKind::Match));
/// assert_eq!((ops[1].len, ops[1].kind), (3, CigarKind::Insertion));
/// ```
pub fn parse_text_cigar(text: &str) -> Vec<CigarOp> {
    let mut ops: Vec<CigarOp> = Vec::new();
    if text == "*" {
        return ops;
    }

    let mut len: u32 = 0;
    let mut has_len = false;
    for c in text.chars() {
        if let Some(digit) = c.to_digit(10) {
            len = len.saturating_mul(10).saturating_add(digit);
            has_len = true;
        } else {
            if !has_len {
                log::warn!("skipping CIGAR operator '{}' with no length", c);
                continue;
            }
            let kind = CigarKind::from_char(c);
            match ops.last_mut() {
                Some(prev) if prev.kind == kind => prev.len += len,
                _ => ops.push(CigarOp::new(len, kind)),
            }
            len = 0;
            has_len = false;
        }
    }
    ops
}
