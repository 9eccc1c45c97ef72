//! Packed 4-bit sequence decoding.
//!
//! Binary records store two bases per byte, high nibble first, each
//! nibble mapped through a 16-entry code table. When the base count is
//! odd the final byte carries one unused trailing nibble.

/// Nibble-to-base table. Codes 3, 5–7 and 9–14 are reserved and render
/// literally as `x`.
const SEQ_DECODER: &[u8; 16] = b"=ACxGxxxTxxxxxxN";

/// Decode `base_count` bases from packed 4-bit data.
///
/// `data` must hold at least `base_count.div_ceil(2)` bytes; extra bytes
/// are ignored.
///
/// # Example
///
/// ```
/// use bamlens::bam::decode_sequence;
///
/// // high nibble 1 = 'A', low nibble 4 = 'G'
/// assert_eq!(decode_sequence(&[0x14], 2), "AG");
/// // odd length: the trailing low nibble is trimmed
/// assert_eq!(decode_sequence(&[0x14, 0x80], 3), "AGT");
/// ```
pub fn decode_sequence(data: &[u8], base_count: usize) -> String {
    let mut sequence = String::with_capacity(base_count + 1);
    for &byte in data.iter().take(base_count.div_ceil(2)) {
        sequence.push(SEQ_DECODER[(byte >> 4) as usize] as char);
        sequence.push(SEQ_DECODER[(byte & 0x0F) as usize] as char);
    }
    sequence.truncate(base_count);
    sequence
}
