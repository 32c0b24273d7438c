use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use oneof::{Absent, InvalidReason, Optional, Tree, arms};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Word(String);

#[test]
fn test_optional_matches_through_variant() {
    let present = Optional::some(Word("kept".to_string()));
    let absent = Optional::<Word>::none();

    for (value, expected) in [(&present, "kept"), (&absent, "absent")] {
        let text = value.as_variant().match_with(arms![
            |_: &Absent| "absent".to_string(),
            |word: &Word| word.0.clone(),
            |reason: InvalidReason| reason.to_string(),
        ]);
        assert_eq!(text, expected);
    }
}

#[test]
fn test_optional_clone_is_independent() {
    let mut original = Optional::some(vec![1, 2]);
    let copy = original.clone();

    if let Some(values) = original.as_mut() {
        values.push(3);
    }

    assert_eq!(copy.as_ref().map(Vec::len), Some(2));
    assert_eq!(original.into_option(), Some(vec![1, 2, 3]));
}

#[test]
fn test_optional_default_is_none() {
    let value: Optional<Word> = Optional::default();
    assert!(value.is_none());
    assert_eq!(format!("{value:?}"), "None");
}

/// Counts clones of the value it wraps.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Counted(u32, CloneCounter);

#[derive(Debug)]
struct CloneCounter(Arc<AtomicUsize>);

impl Clone for CloneCounter {
    fn clone(&self) -> Self {
        self.0.fetch_add(1, Ordering::SeqCst);
        Self(self.0.clone())
    }
}

impl PartialEq for CloneCounter {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for CloneCounter {}

impl PartialOrd for CloneCounter {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CloneCounter {
    fn cmp(&self, _other: &Self) -> std::cmp::Ordering {
        std::cmp::Ordering::Equal
    }
}

#[test]
fn test_tree_copies_only_shared_path() {
    let clones = Arc::new(AtomicUsize::new(0));
    let counted = |value| Counted(value, CloneCounter(clones.clone()));

    let mut tree = Tree::new();
    for value in [4, 2, 6, 1, 3, 5, 7] {
        tree.insert(counted(value));
    }
    // Nothing is shared yet, so inserting never copies
    assert_eq!(clones.load(Ordering::SeqCst), 0);

    let snapshot = tree.clone();
    tree.insert(counted(8));

    // Only the nodes holding 4, 6 and 7 lie on the path to 8
    assert_eq!(clones.load(Ordering::SeqCst), 3);
    assert_eq!(snapshot.len(), 7);
    assert_eq!(tree.len(), 8);
    assert!(!snapshot.contains(&counted(8)));
    assert!(tree.contains(&counted(8)));
}

#[test]
fn test_tree_of_words() {
    let mut tree = Tree::new();
    for word in ["pear", "apple", "fig", "apple"] {
        tree.insert(Word(word.to_string()));
    }

    let mut words = Vec::new();
    tree.for_each(|word| words.push(word.0.as_str().to_owned()));
    assert_eq!(words, ["apple", "apple", "fig", "pear"]);
}
