//! bamlens: alignment decoding for genomic range queries
//!
//! # Overview
//!
//! bamlens turns raw binary alignment buffers and text alignment lines
//! into structured records suitable for genomic-range queries and
//! rendering. It performs bit-exact little-endian parsing of the
//! variable-length binary record format, reconstructs CIGAR alignment
//! geometry (including the long-CIGAR overflow encoding stored in an
//! auxiliary tag), merges per-base sequence and quality data into
//! aligned blocks and insertions, and filters by genomic range while
//! exploiting record order to stop scans early.
//!
//! Fetching bytes and decompressing blocks are the caller's concern:
//! every decoder here is a synchronous, purely computational function
//! over an in-memory buffer, so independent decodes over disjoint
//! buffers can run in parallel with no coordination.
//!
//! ## Quick Start
//!
//! ```
//! use bamlens::{decode_header, decode_records};
//!
//! # fn main() -> bamlens::Result<()> {
//! # let buffer: Vec<u8> = {
//! #     let mut data = Vec::new();
//! #     data.extend_from_slice(b"BAM\x01");
//! #     data.extend_from_slice(&0u32.to_le_bytes());
//! #     data.extend_from_slice(&1u32.to_le_bytes());
//! #     data.extend_from_slice(&5u32.to_le_bytes());
//! #     data.extend_from_slice(b"chr1\0");
//! #     data.extend_from_slice(&1000u32.to_le_bytes());
//! #     data
//! # };
//! // A decompressed buffer beginning at the magic signature
//! let header = decode_header(&buffer, None)?;
//! let target = header.references.index_of("chr1");
//!
//! // Scan records overlapping chr1:1000-2000 (records start at header.size)
//! let mut records = Vec::new();
//! decode_records(
//!     &buffer,
//!     header.size,
//!     &mut records,
//!     1000,
//!     2000,
//!     target,
//!     header.references.names(),
//!     None,
//! );
//!
//! for record in &records {
//!     // blocks/insertions carry the renderable geometry
//!     let _ = (&record.blocks, &record.insertions);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`bam`]: binary header, reference dictionary and record decoding
//! - [`sam`]: text-line record decoding
//! - [`cigar`]: the CIGAR operator model shared by both decoders
//! - [`blocks`]: expansion of CIGAR geometry into blocks and insertions
//! - [`tags`]: lazy (binary) and eager (text) optional-tag access
//! - [`bytes`]: explicit-offset little-endian reads
//!
//! ## Input preconditions
//!
//! Binary buffers must be decompressed, begin at a record (or header)
//! boundary, and be little-endian throughout. Record streams must be
//! sorted by (reference index, position); the early-termination logic
//! depends on it.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bam;
pub mod blocks;
pub mod bytes;
pub mod cigar;
pub mod error;
pub mod record;
pub mod sam;
pub mod tags;

// Re-export commonly used types
pub use bam::{
    decode_alternate_header, decode_header, decode_records, decode_sequence, AliasResolver,
    Header, ReferenceDictionary,
};
pub use blocks::{make_blocks, AlignmentBlock, GapKind, Insertion};
pub use cigar::{CigarKind, CigarOp};
pub use error::{DecodeError, Result};
pub use record::{AlignmentFilter, AlignmentRecord, Mate};
pub use sam::decode_lines;
pub use tags::Tags;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
