//! Content hashing for no-op edit detection.
//!
//! Every revision stores a SHA-256 digest of its reviewable content. A
//! proposal whose digest matches the current head's is rejected as a no-op
//! instead of being queued for review. Anchors are normalized and tags sorted
//! before hashing so equivalent proposals hash identically regardless of
//! submission order.

use sha2::{Digest, Sha256};

use crate::anchor::Anchor;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Digest of an annotation revision: normalized anchor, body, sorted tags.
///
/// Every variable-length field is length-prefixed, so distinct
/// `(body, tags)` tuples can never produce the same byte stream even when
/// a tag name contains arbitrary delimiter characters.
pub fn edit_content_hash(anchor: &Anchor, body: &str, tags: &[String]) -> String {
    let mut sorted: Vec<&str> = tags.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    for coord in [
        anchor.first_line,
        anchor.last_line,
        anchor.first_char,
        anchor.last_char,
    ] {
        hasher.update(coord.to_le_bytes());
    }
    update_length_prefixed(&mut hasher, body);
    for tag in sorted {
        update_length_prefixed(&mut hasher, tag);
    }
    let hash = hasher.finalize();
    format!("{hash:x}")
}

fn update_length_prefixed(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}

/// Digest of a wiki revision, which has no anchor or tags.
pub fn wiki_content_hash(body: &str) -> String {
    sha256_hex(body.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> Anchor {
        Anchor::new(3, 7, 0, 12)
    }

    #[test]
    fn empty_input_produces_known_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn edit_hash_stable_across_tag_order() {
        let a = edit_content_hash(
            &anchor(),
            "body",
            &["meter".to_string(), "irony".to_string()],
        );
        let b = edit_content_hash(
            &anchor(),
            "body",
            &["irony".to_string(), "meter".to_string()],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn edit_hash_stable_across_reversed_anchor() {
        // Normalization happens in Anchor::new, so a reversed range hashes
        // the same as the ordered one.
        let reversed = Anchor::new(7, 3, 0, 12);
        assert_eq!(
            edit_content_hash(&anchor(), "body", &[]),
            edit_content_hash(&reversed, "body", &[])
        );
    }

    #[test]
    fn edit_hash_differs_on_body_change() {
        assert_ne!(
            edit_content_hash(&anchor(), "body", &[]),
            edit_content_hash(&anchor(), "body!", &[])
        );
    }

    #[test]
    fn edit_hash_differs_on_tag_change() {
        assert_ne!(
            edit_content_hash(&anchor(), "body", &["irony".to_string()]),
            edit_content_hash(&anchor(), "body", &[])
        );
    }

    #[test]
    fn edit_hash_keeps_field_boundaries() {
        // A tag containing a separator-looking character must not collide
        // with the same bytes split differently across fields.
        assert_ne!(
            edit_content_hash(&anchor(), "body", &["a,b".to_string()]),
            edit_content_hash(&anchor(), "body", &["a".to_string(), "b".to_string()])
        );
        assert_ne!(
            edit_content_hash(&anchor(), "body|irony", &[]),
            edit_content_hash(&anchor(), "body", &["irony".to_string()])
        );
    }

    #[test]
    fn wiki_hash_is_body_only() {
        assert_eq!(wiki_content_hash("text"), sha256_hex(b"text"));
        assert_ne!(wiki_content_hash("text"), wiki_content_hash("other"));
    }
}
