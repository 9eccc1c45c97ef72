//! Optional per-record tags.
//!
//! Binary records keep their trailing tag bytes as an undecoded span;
//! nothing walks the span during the record scan. Text records decode
//! their `key:type:value` tokens up front. Both shapes answer lookups
//! through the same accessors.
//!
//! # Binary layout
//!
//! Each tag is a 2-character key, a 1-character type code, and a
//! type-dependent payload:
//! - `A`, `c`, `C`: 1 byte
//! - `s`, `S`: 2 bytes
//! - `i`, `I`, `f`: 4 bytes
//! - `Z`, `H`: NUL-terminated string
//! - `B`: element type code, 4-byte element count, then the elements

use std::collections::HashMap;

/// Container for a record's optional tags.
#[derive(Debug, Clone, PartialEq)]
pub enum Tags {
    /// Raw trailing bytes of a binary record, decoded on demand.
    Binary(Vec<u8>),
    /// Eagerly decoded `key -> value` tokens from a text record.
    Text(HashMap<String, String>),
}

impl Tags {
    /// Tags for a record that carries none.
    pub fn empty() -> Self {
        Tags::Binary(Vec::new())
    }

    /// Whether the record carries no tags.
    pub fn is_empty(&self) -> bool {
        match self {
            Tags::Binary(data) => data.is_empty(),
            Tags::Text(map) => map.is_empty(),
        }
    }

    /// The undecoded byte span of a binary record's tags.
    pub fn raw(&self) -> Option<&[u8]> {
        match self {
            Tags::Binary(data) => Some(data),
            Tags::Text(_) => None,
        }
    }

    /// Look up a tag value by its 2-character key.
    ///
    /// Binary spans are walked on demand; a truncated or garbled span
    /// ends the walk silently.
    ///
    /// # Example
    ///
    /// ```
    /// use bamlens::tags::Tags;
    ///
    /// // NM:i:5
    /// let tags = Tags::Binary(vec![b'N', b'M', b'i', 5, 0, 0, 0]);
    /// assert_eq!(tags.get("NM"), Some(String::from("5")));
    /// assert_eq!(tags.get("AS"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            Tags::Binary(data) => {
                let mut found = None;
                walk(data, |tag_key, value| {
                    if tag_key == key {
                        found = Some(value);
                        false
                    } else {
                        true
                    }
                });
                found
            }
            Tags::Text(map) => map.get(key).cloned(),
        }
    }

    /// Decode every tag into a `key -> value` mapping.
    pub fn to_map(&self) -> HashMap<String, String> {
        match self {
            Tags::Binary(data) => {
                let mut map = HashMap::new();
                walk(data, |key, value| {
                    map.insert(key.to_string(), value);
                    true
                });
                map
            }
            Tags::Text(map) => map.clone(),
        }
    }
}

/// Payload size of the fixed-width atomic types; 0 for anything else.
fn atomic_size(type_code: u8) -> usize {
    match type_code {
        b'A' | b'c' | b'C' => 1,
        b's' | b'S' => 2,
        b'i' | b'I' | b'f' => 4,
        _ => 0,
    }
}

/// Render one atomic value, returning the text and bytes consumed.
fn render_atomic(data: &[u8], type_code: u8) -> Option<(String, usize)> {
    let size = atomic_size(type_code);
    if size == 0 || data.len() < size {
        return None;
    }
    let text = match type_code {
        b'A' => (data[0] as char).to_string(),
        b'c' => (data[0] as i8).to_string(),
        b'C' => data[0].to_string(),
        b's' => i16::from_le_bytes([data[0], data[1]]).to_string(),
        b'S' => u16::from_le_bytes([data[0], data[1]]).to_string(),
        b'i' => i32::from_le_bytes([data[0], data[1], data[2], data[3]]).to_string(),
        b'I' => u32::from_le_bytes([data[0], data[1], data[2], data[3]]).to_string(),
        b'f' => f32::from_le_bytes([data[0], data[1], data[2], data[3]]).to_string(),
        _ => return None,
    };
    Some((text, size))
}

/// Render one tag value of any type, returning the text and bytes consumed.
fn render_value(data: &[u8], type_code: u8) -> Option<(String, usize)> {
    match type_code {
        b'Z' | b'H' => {
            let nul = data.iter().position(|&b| b == 0)?;
            let text = std::str::from_utf8(&data[..nul]).ok()?;
            Some((text.to_string(), nul + 1))
        }
        b'B' => {
            let subtype = *data.first()?;
            if data.len() < 5 {
                return None;
            }
            let count = u32::from_le_bytes([data[1], data[2], data[3], data[4]]) as usize;
            let elem_size = atomic_size(subtype);
            if elem_size == 0 || data.len() < 5 + elem_size * count {
                return None;
            }

            let mut text = String::from(subtype as char);
            let mut offset = 5;
            for _ in 0..count {
                let (value, consumed) = render_atomic(&data[offset..], subtype)?;
                text.push(',');
                text.push_str(&value);
                offset += consumed;
            }
            Some((text, offset))
        }
        _ => render_atomic(data, type_code),
    }
}

/// Walk a binary tag span, calling `visit(key, value)` per tag until it
/// returns `false` or the span is exhausted. Truncated or unrecognized
/// payloads end the walk.
fn walk(data: &[u8], mut visit: impl FnMut(&str, String) -> bool) {
    let mut offset = 0;
    while offset + 3 <= data.len() {
        let key = match std::str::from_utf8(&data[offset..offset + 2]) {
            Ok(key) => key,
            Err(_) => return,
        };
        let type_code = data[offset + 2];
        let (value, consumed) = match render_value(&data[offset + 3..], type_code) {
            Some(rendered) => rendered,
            None => return,
        };
        if !visit(key, value) {
            return;
        }
        offset += 3 + consumed;
    }
}
