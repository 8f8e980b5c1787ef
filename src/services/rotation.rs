use std::collections::HashSet;

/// Produces the course's circular subject ordering, starting at `start`.
///
/// If `start` is not a member of the list the natural order is used. That is
/// a defensive fallback for a misconfigured course, not a validated
/// invariant; the write path rejects such configurations up front.
pub fn rotate(subjects: &[String], start: &str) -> Vec<String> {
    let pivot = match subjects.iter().position(|s| s == start) {
        Some(idx) => idx,
        None => {
            if !subjects.is_empty() {
                tracing::warn!(
                    start_subject = start,
                    "start subject not in subject list, falling back to natural order"
                );
            }
            0
        }
    };
    subjects[pivot..]
        .iter()
        .chain(subjects[..pivot].iter())
        .cloned()
        .collect()
}

/// Returns the first subject of the rotated order the enrollment has not
/// completed, or `None` once every subject is done.
///
/// Done rows naming subjects absent from the current subject list are
/// ignored: they never match and never block advancement.
pub fn next_subject(
    subjects: &[String],
    start: &str,
    done: &HashSet<String>,
) -> Option<String> {
    rotate(subjects, start)
        .into_iter()
        .find(|subject| !done.contains(subject))
}
