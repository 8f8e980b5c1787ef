use std::collections::HashSet;

use academics::services::rotation;

fn subjects(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn done(labels: &[&str]) -> HashSet<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

#[test]
fn rotate_is_a_permutation_starting_at_the_anchor() {
    let list = subjects(&["A", "B", "C", "D"]);

    for start in ["A", "B", "C", "D"] {
        let rotated = rotation::rotate(&list, start);
        assert_eq!(rotated.len(), list.len());
        assert_eq!(rotated[0], start);

        let mut sorted = rotated.clone();
        sorted.sort();
        let mut expected = list.clone();
        expected.sort();
        assert_eq!(sorted, expected, "rotation must be a permutation");
    }
}

#[test]
fn rotate_from_c_produces_cdab() {
    let list = subjects(&["A", "B", "C", "D"]);
    assert_eq!(rotation::rotate(&list, "C"), subjects(&["C", "D", "A", "B"]));
}

#[test]
fn rotate_falls_back_to_natural_order_for_unknown_anchor() {
    let list = subjects(&["A", "B", "C", "D"]);
    assert_eq!(rotation::rotate(&list, "Z"), list);
}

#[test]
fn rotate_empty_list_is_empty() {
    let rotated = rotation::rotate(&[], "A");
    assert!(rotated.is_empty());
}

#[test]
fn next_subject_is_first_rotated_element_not_done() {
    let list = subjects(&["A", "B", "C", "D"]);

    // Rotated order from C is [C, D, A, B]; C is done, so next is D.
    assert_eq!(
        rotation::next_subject(&list, "C", &done(&["C"])),
        Some("D".to_string())
    );

    // Nothing done yet: next is the anchor itself.
    assert_eq!(
        rotation::next_subject(&list, "C", &done(&[])),
        Some("C".to_string())
    );

    // C and D done: rotation wraps around to A.
    assert_eq!(
        rotation::next_subject(&list, "C", &done(&["C", "D"])),
        Some("A".to_string())
    );
}

#[test]
fn next_subject_is_none_once_every_subject_is_done() {
    let list = subjects(&["A", "B", "C", "D"]);
    assert_eq!(
        rotation::next_subject(&list, "C", &done(&["A", "B", "C", "D"])),
        None
    );
}

#[test]
fn done_subjects_outside_the_alphabet_are_ignored() {
    let list = subjects(&["A", "B"]);

    // A stale done row for a removed subject neither blocks nor matches.
    assert_eq!(
        rotation::next_subject(&list, "A", &done(&["X"])),
        Some("A".to_string())
    );
    assert_eq!(
        rotation::next_subject(&list, "A", &done(&["A", "X"])),
        Some("B".to_string())
    );
    assert_eq!(rotation::next_subject(&list, "A", &done(&["A", "B", "X"])), None);
}

#[test]
fn next_subject_walks_natural_order_when_anchor_is_unknown() {
    let list = subjects(&["A", "B", "C", "D"]);
    assert_eq!(
        rotation::next_subject(&list, "Q", &done(&["A"])),
        Some("B".to_string())
    );
}
