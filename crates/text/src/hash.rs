//! Text hashing shared by every interning entry point.
//!
//! The hash is the `31 * h + c` polynomial over UTF-16 code units. A text hashes
//! to the same code whether it arrives as a complete `&str`, as a span of a
//! larger parse buffer, or as a list of fragments whose concatenation equals it.
//! Lengths are measured in the same UTF-16 units, which is what the repository
//! size bound counts as "chars".

/// Hash a complete text.
pub fn text_hash(text: &str) -> i32 {
    hash_part(0, text)
}

/// Hash the concatenation of `parts` without building it.
pub fn text_hash_parts(parts: &[&str]) -> i32 {
    parts.iter().fold(0, |h, part| hash_part(h, part))
}

/// Length of `text` in UTF-16 code units.
pub fn text_len(text: &str) -> usize {
    if text.is_ascii() {
        return text.len();
    }
    text.encode_utf16().count()
}

/// Whether the concatenation of `parts` equals `candidate`.
pub(crate) fn parts_equal(parts: &[&str], candidate: &str) -> bool {
    let mut rest = candidate;
    for part in parts {
        match rest.strip_prefix(part) {
            Some(tail) => rest = tail,
            None => return false,
        }
    }
    rest.is_empty()
}

fn hash_part(h: i32, text: &str) -> i32 {
    let mut h = h;
    if text.is_ascii() {
        for b in text.bytes() {
            h = h.wrapping_mul(31).wrapping_add(i32::from(b));
        }
        return h;
    }
    for unit in text.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    h
}
