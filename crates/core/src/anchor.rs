//! Annotation anchors: line-range plus character-offset targets, their
//! normalization, context windows, and tag-set diffing.
//!
//! An anchor locates an annotation inside a text edition by line numbers
//! (1-based) and character offsets into the first and last line. Line text
//! itself lives with the excluded corpus collaborator; the engine only ever
//! reasons about numbers.

use serde::{Deserialize, Serialize};

/// Number of context lines shown on either side of an anchored range.
pub const CONTEXT_RADIUS: i32 = 5;

/// A normalized anchor: `first_line <= last_line`, both >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub first_line: i32,
    pub last_line: i32,
    pub first_char: i32,
    pub last_char: i32,
}

impl Anchor {
    /// Build a normalized anchor: reversed line ranges are swapped and both
    /// ends are clamped to >= 1.
    pub fn new(first_line: i32, last_line: i32, first_char: i32, last_char: i32) -> Self {
        let (first, last) = normalize_range(first_line, last_line);
        Self {
            first_line: first,
            last_line: last,
            first_char,
            last_char,
        }
    }

    /// The inclusive line-number window of this anchor plus
    /// [`CONTEXT_RADIUS`] lines on either side, floored at line 1.
    pub fn context_window(&self) -> (i32, i32) {
        ((self.first_line - CONTEXT_RADIUS).max(1), self.last_line + CONTEXT_RADIUS)
    }
}

/// Swap a reversed line range and clamp both ends to >= 1.
pub fn normalize_range(first_line: i32, last_line: i32) -> (i32, i32) {
    let first = first_line.max(1);
    let last = last_line.max(1);
    if first > last {
        (last, first)
    } else {
        (first, last)
    }
}

/// Merge the context windows of two anchors into one de-duplicated,
/// ascending list of line numbers, starting from whichever window begins
/// earlier. Used to render side-by-side review of an edit against its
/// predecessor.
pub fn merge_context(a: &Anchor, b: &Anchor) -> Vec<i32> {
    let (a_first, a_last) = a.context_window();
    let (b_first, b_last) = b.context_window();
    let (lead, trail) = if a_first <= b_first {
        ((a_first, a_last), (b_first, b_last))
    } else {
        ((b_first, b_last), (a_first, a_last))
    };

    let mut lines: Vec<i32> = (lead.0..=lead.1).collect();
    for num in trail.0..=trail.1 {
        if !lines.contains(&num) {
            lines.push(num);
        }
    }
    lines
}

/// Union two tag lists for a "what changed" view: tags of the later edit
/// first, followed by any tags unique to the earlier edit, order preserved.
pub fn diff_tags(later: &[String], earlier: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = later.to_vec();
    for tag in earlier {
        if !merged.contains(tag) {
            merged.push(tag.clone());
        }
    }
    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- normalize_range ---------------------------------------------------

    #[test]
    fn ordered_range_unchanged() {
        assert_eq!(normalize_range(3, 7), (3, 7));
        assert_eq!(normalize_range(5, 5), (5, 5));
    }

    #[test]
    fn reversed_range_swapped() {
        assert_eq!(normalize_range(7, 3), (3, 7));
    }

    #[test]
    fn range_clamped_to_one() {
        assert_eq!(normalize_range(0, 4), (1, 4));
        assert_eq!(normalize_range(-2, -6), (1, 1));
    }

    #[test]
    fn anchor_new_normalizes() {
        let anchor = Anchor::new(9, 2, 0, 14);
        assert_eq!(anchor.first_line, 2);
        assert_eq!(anchor.last_line, 9);
    }

    // -- context_window ----------------------------------------------------

    #[test]
    fn context_extends_five_each_side() {
        let anchor = Anchor::new(10, 12, 0, 0);
        assert_eq!(anchor.context_window(), (5, 17));
    }

    #[test]
    fn context_floors_at_line_one() {
        let anchor = Anchor::new(2, 3, 0, 0);
        assert_eq!(anchor.context_window(), (1, 8));
    }

    // -- merge_context -----------------------------------------------------

    #[test]
    fn merge_overlapping_windows_dedups() {
        let a = Anchor::new(10, 10, 0, 0);
        let b = Anchor::new(12, 12, 0, 0);
        let merged = merge_context(&a, &b);
        // Windows 5..=15 and 7..=17 merge to 5..=17 with no duplicates.
        assert_eq!(merged, (5..=17).collect::<Vec<i32>>());
    }

    #[test]
    fn merge_disjoint_windows_keeps_both() {
        let a = Anchor::new(10, 10, 0, 0);
        let b = Anchor::new(100, 100, 0, 0);
        let merged = merge_context(&a, &b);
        assert_eq!(merged.len(), 11 + 11);
        assert!(merged.contains(&5) && merged.contains(&105));
    }

    #[test]
    fn merge_orders_by_earlier_start() {
        let a = Anchor::new(50, 50, 0, 0);
        let b = Anchor::new(10, 10, 0, 0);
        let merged = merge_context(&a, &b);
        assert_eq!(merged.first(), Some(&5));
    }

    // -- diff_tags ---------------------------------------------------------

    #[test]
    fn diff_tags_later_first_then_unique_earlier() {
        let later = vec!["irony".to_string(), "allusion".to_string()];
        let earlier = vec!["allusion".to_string(), "meter".to_string()];
        assert_eq!(diff_tags(&later, &earlier), vec!["irony", "allusion", "meter"]);
    }

    #[test]
    fn diff_tags_empty_sides() {
        let tags = vec!["irony".to_string()];
        assert_eq!(diff_tags(&tags, &[]), vec!["irony"]);
        assert_eq!(diff_tags(&[], &tags), vec!["irony"]);
    }
}
