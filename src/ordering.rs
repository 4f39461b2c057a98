//! Ordering of lectures by the `chapter-section` prefix of their names.
//!
//! A lecture named `3-12 Hash Tables` has the key `(3, 12)`. Only the first two
//! hyphen-separated parts of the first token count, so `1-2-3 Extra` keys as `(1, 2)`.
//! Names without two leading integers have no key and sort after every keyed lecture.

use crate::domain::Lecture;

/// Parse the `(chapter, section)` prefix of a lecture name
pub fn chapter_section_key(name: &str) -> Option<(u32, u32)> {
    let prefix = name.split_whitespace().next()?;
    let mut parts = prefix.split('-');
    let chapter = parts.next()?.trim().parse().ok()?;
    let section = parts.next()?.trim().parse().ok()?;
    Some((chapter, section))
}

/// Sort lectures by chapter then section. The sort is stable, so equal keys and
/// unkeyed names keep their incoming (insertion) order.
pub fn sort_lectures(lectures: &mut [Lecture]) {
    lectures.sort_by_key(|l| match chapter_section_key(&l.name) {
        Some((chapter, section)) => (0u8, chapter, section),
        None => (1u8, 0, 0),
    });
}
