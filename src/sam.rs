//! Text-format record decoding.
//!
//! Decodes newline-delimited, tab-separated alignment lines into the
//! same record shape the binary decoder produces. Lines must be sorted
//! by reference then position; like the binary scan, the decoder stops
//! as soon as the ordering shows that every remaining line lies past the
//! query window.
//!
//! Columns: read name, flags, reference name, 1-based position, mapping
//! quality, CIGAR, mate reference (`=` means this record's reference),
//! mate position, template length, sequence, quality string, then zero
//! or more `key:type:value` optional tags.

use std::collections::HashMap;

use crate::blocks::make_blocks;
use crate::cigar::{cigar_string, parse_text_cigar, reference_len};
use crate::record::{
    AlignmentFilter, AlignmentRecord, Mate, FLAG_MATE_REVERSE, FLAG_MATE_UNMAPPED, FLAG_PAIRED,
    FLAG_READ_UNMAPPED,
};
use crate::tags::Tags;
use log::warn;

/// Number of mandatory tab-separated columns in an alignment line.
const MANDATORY_COLUMNS: usize = 11;

/// Offset subtracted from quality characters to recover Phred scores.
const PHRED_OFFSET: u8 = 33;

/// Decode alignment lines from `text`, appending accepted records to
/// `sink`.
///
/// A record is accepted when it lies on `reference_name`, its reference
/// span overlaps `[min_pos, max_pos]`, and the optional `filter` passes
/// it. Unmapped records (`*` reference or the unmapped flag) are
/// skipped. Once at least one record on the target reference has been
/// seen, a line on a different reference ends the scan (off the right
/// edge of sorted input); before the first match, other references are
/// skipped as still-to-the-left. On the target reference, a start past
/// `max_pos` ends the scan.
///
/// Header lines (`@`), empty lines and lines with malformed mandatory
/// fields are skipped; the scan itself never fails.
pub fn decode_lines(
    text: &str,
    sink: &mut Vec<AlignmentRecord>,
    reference_name: &str,
    min_pos: i32,
    max_pos: i32,
    filter: Option<&dyn AlignmentFilter>,
) {
    let mut started = false;

    for line in text.lines() {
        if line.is_empty() || line.starts_with('@') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MANDATORY_COLUMNS {
            warn!(
                "skipping alignment line with {} of {} mandatory columns",
                fields.len(),
                MANDATORY_COLUMNS
            );
            continue;
        }

        let numeric = (|| {
            Some((
                fields[1].parse::<u16>().ok()?,
                fields[3].parse::<i32>().ok()?,
                fields[4].parse::<u8>().ok()?,
                fields[8].parse::<i32>().ok()?,
            ))
        })();
        let Some((flags, position, mapping_quality, fragment_length)) = numeric else {
            warn!("skipping alignment line '{}': malformed numeric field", fields[0]);
            continue;
        };

        let chr = fields[2];
        if chr == "*" || flags & FLAG_READ_UNMAPPED != 0 {
            continue; // unmapped
        }

        if chr != reference_name {
            if started {
                break; // off the right edge of sorted input
            }
            continue; // possibly to the left; keep scanning
        }
        started = true;

        let start = position - 1; // columns are 1-based
        if start > max_pos {
            break;
        }

        let cigar = parse_text_cigar(fields[5]);
        let length_on_ref = reference_len(&cigar);
        if start + (length_on_ref as i32) < min_pos {
            continue; // span ends left of the window
        }

        let sequence = fields[9].to_string();

        let qual_text = fields[10];
        let base_qualities = if qual_text == "*" {
            None
        } else {
            Some(
                qual_text
                    .bytes()
                    .map(|b| b.saturating_sub(PHRED_OFFSET))
                    .collect(),
            )
        };

        let tags = if fields.len() > MANDATORY_COLUMNS {
            decode_text_tags(&fields[MANDATORY_COLUMNS..])
        } else {
            HashMap::new()
        };

        let mate_mapped = flags & FLAG_PAIRED != 0 && flags & FLAG_MATE_UNMAPPED == 0;
        let mate = if mate_mapped {
            let mate_chr = if fields[6] == "=" { chr } else { fields[6] };
            if mate_chr == "*" {
                None
            } else {
                fields[7].parse::<i32>().ok().map(|mate_position| Mate {
                    reference_name: mate_chr.to_string(),
                    position: mate_position - 1,
                    forward_strand: flags & FLAG_MATE_REVERSE == 0,
                })
            }
        } else {
            None
        };

        let mut record = AlignmentRecord {
            reference_name: chr.to_string(),
            start,
            flags,
            mapping_quality,
            read_name: fields[0].to_string(),
            cigar_string: cigar_string(&cigar),
            length_on_ref,
            fragment_length,
            sequence,
            base_qualities,
            mate,
            tags: Tags::Text(tags),
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

/// Decode `key:type:value` tag tokens into a mapping, ignoring the type
/// character.
fn decode_text_tags(tokens: &[&str]) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(tokens.len());
    for token in tokens {
        let mut parts = token.splitn(3, ':');
        if let (Some(key), Some(_type_code), Some(value)) =
            (parts.next(), parts.next(), parts.next())
        {
            map.insert(key.to_string(), value.to_string());
        }
    }
    map
}
