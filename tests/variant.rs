use std::{
    cell::Cell,
    rc::Rc,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use derive_more::{Display, Error};
use oneof::{
    Here, InvalidReason, State, There, Variant, Visitor, VisitorMut, arms,
    hooks::poison::{self, PoisonEvent, PoisonHook, register_poison_hook},
    types,
};
use rootcause::{Report, prelude::ResultExt};
use static_assertions::{assert_impl_all, assert_not_impl_any};

#[derive(Clone, Debug, PartialEq)]
struct Thing {
    number: i32,
    letter: char,
}

/// Counts how many times it has been dropped.
#[derive(Clone, Debug)]
struct Tracked(Arc<AtomicUsize>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct BadThing;

impl Clone for BadThing {
    fn clone(&self) -> Self {
        panic!("BadThing cannot be cloned");
    }
}

type Value = Variant<types![String, i32, Thing]>;

fn describe(value: &Value) -> String {
    value.match_with(arms![
        |s: &String| format!("string:{s}"),
        |i: &i32| format!("int:{i}"),
        |t: &Thing| format!("thing:{},{}", t.number, t.letter),
        |reason: InvalidReason| format!("invalid:{reason:?}"),
    ])
}

assert_impl_all!(Variant<types![String, i32]>: Send, Sync, Clone, core::fmt::Debug);
assert_impl_all!(Variant<types![Cell<i32>]>: Send);
assert_not_impl_any!(Variant<types![Cell<i32>]>: Sync);
assert_not_impl_any!(Variant<types![Rc<i32>, i32]>: Send, Sync);

#[test]
fn test_match_scenario() {
    let values: Vec<Value> = vec![
        Variant::new(7i32),
        Variant::convert("Hello"),
        Variant::new(5i32),
        Variant::new(Thing {
            number: 5,
            letter: 'a',
        }),
    ];

    let described: Vec<String> = values.iter().map(describe).collect();
    assert_eq!(described, ["int:7", "string:Hello", "int:5", "thing:5,a"]);
}

#[test]
fn test_construct_ignores_conversion_candidates() {
    // Both alternatives implement `From<i32>`, so only explicit construction
    // compiles
    type Number = Variant<types![i64, f64]>;

    let float = Number::construct::<f64, _>(3i32);
    let int = Number::construct::<i64, _>(3i32);

    assert_eq!(float.which(), 1);
    assert_eq!(float.get::<f64>().ok(), Some(&3.0));
    assert_eq!(int.which(), 0);
    assert_eq!(int.get::<i64>().ok(), Some(&3));
}

#[test]
fn test_clone_keeps_source() {
    let source: Value = Variant::new(Thing {
        number: 1,
        letter: 'z',
    });
    let copy = source.clone();

    assert_eq!(copy.which(), source.which());
    assert_eq!(copy.get::<Thing>().ok(), source.get::<Thing>().ok());
    assert!(source.is_valid());
    assert_eq!(describe(&source), "thing:1,z");
}

#[test]
fn test_take_moves_tag_and_value() {
    let mut source: Value = Variant::convert("payload");
    let tag = source.which();

    let moved = source.take();

    assert_eq!(moved.which(), tag);
    assert_eq!(
        moved.get::<String>().map(String::as_str).ok(),
        Some("payload")
    );
    assert!(!source.is_valid());
    assert_eq!(source.state(), State::Invalid(InvalidReason::MovedFrom));
    assert_eq!(describe(&source), "invalid:MovedFrom");
}

#[test]
fn test_poison_propagates_verbatim() {
    for reason in InvalidReason::ALL {
        let mut source = Value::poisoned(reason);

        let copy = source.clone();
        assert_eq!(copy.invalid_reason(), Some(reason));
        assert_eq!(source.invalid_reason(), Some(reason));

        let moved = source.take();
        assert_eq!(moved.invalid_reason(), Some(reason));
        assert_eq!(source.invalid_reason(), Some(InvalidReason::MovedFrom));
    }
}

#[test]
fn test_get_matches_contains() {
    let mut value: Value = Variant::new(11i32);

    assert!(value.contains::<i32>());
    assert!(!value.contains::<String>());
    assert!(!value.contains::<u64>());
    assert!(value.get::<i32>().is_ok());

    let error = value.get::<String>().unwrap_err();
    assert_eq!(error.current_context().requested, "alloc::string::String");
    assert!(error.to_string().contains("i32"));

    // A failed lookup leaves the variant alone
    assert!(value.get_mut::<Thing>().is_err());
    assert_eq!(value.get::<i32>().ok(), Some(&11));

    *value.get_mut::<i32>().unwrap() += 1;
    assert_eq!(value.get::<i32>().ok(), Some(&12));
}

#[derive(Debug, Display, Error)]
enum LookupError {
    #[display("no number stored")]
    NotANumber,
}

fn read_number(value: &Value) -> Result<i32, Report<LookupError>> {
    let number = value.get::<i32>().context(LookupError::NotANumber)?;
    Ok(*number)
}

#[test]
fn test_mismatch_chains_into_caller_context() {
    assert_eq!(read_number(&Variant::new(3i32)).ok(), Some(3));

    let report = read_number(&Variant::convert("three")).unwrap_err();
    let rendered = report.to_string();
    assert!(rendered.contains("no number stored"));
    assert!(rendered.contains("requested alternative i32"));
}

#[test]
fn test_get_on_poisoned_variant() {
    let value = Value::poisoned(InvalidReason::CopyThrew);

    assert!(!value.contains::<String>());
    let error = value.get::<String>().unwrap_err();
    assert_eq!(
        error.current_context().held,
        oneof::error::Held::Invalid(InvalidReason::CopyThrew)
    );
    assert_eq!(value.state(), State::Invalid(InvalidReason::CopyThrew));
}

#[test]
fn test_panicking_clone_poisons_destination() {
    let drops = Arc::new(AtomicUsize::new(0));
    let source: Variant<types![BadThing, Tracked]> = Variant::new(BadThing);
    let mut destination: Variant<types![BadThing, Tracked]> =
        Variant::new(Tracked(drops.clone()));

    destination.clone_from(&source);

    // The old value was destroyed before the copy was attempted
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    let result = destination.match_with(arms![
        |_: &BadThing| "bad".to_string(),
        |_: &Tracked| "tracked".to_string(),
        |reason: InvalidReason| format!("{reason:?}"),
    ]);
    assert_eq!(result, "CopyThrew");
    assert!(source.is_valid());

    drop(destination);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_moved_from_is_not_dropped_again() {
    let drops = Arc::new(AtomicUsize::new(0));
    let mut source: Variant<types![u8, Tracked]> = Variant::new(Tracked(drops.clone()));

    let moved = source.take();
    let result = source.match_with(arms![
        |_: &u8| None,
        |_: &Tracked| None,
        |reason: InvalidReason| Some(reason),
    ]);
    assert_eq!(result, Some(InvalidReason::MovedFrom));

    drop(source);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(moved);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_move_from_destroys_previous_value() {
    let drops = Arc::new(AtomicUsize::new(0));
    let mut destination: Variant<types![u8, Tracked]> = Variant::new(Tracked(drops.clone()));
    let mut source: Variant<types![u8, Tracked]> = Variant::new(4u8);

    destination.move_from(&mut source);

    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert_eq!(destination.get::<u8>().ok(), Some(&4));
    assert_eq!(source.invalid_reason(), Some(InvalidReason::MovedFrom));
}

#[test]
fn test_match_without_poison_arm_reports_error() {
    let mut value: Value = Variant::new(1i32);
    let _moved = value.take();

    let result = value.match_with(arms![|_: &String| 0, |i: &i32| *i, |t: &Thing| t.number]);
    let report = result.unwrap_err();

    assert_eq!(report.current_context().reason, InvalidReason::MovedFrom);
    assert!(report.to_string().contains("moved out"));
}

#[test]
fn test_match_with_mut() {
    let mut value: Value = Variant::convert("abc");

    let length = value.match_with_mut(arms![
        |s: &mut String| {
            s.push('d');
            s.len()
        },
        |_: &mut i32| 0,
        |_: &mut Thing| 0,
    ]);

    assert_eq!(length.ok(), Some(4));
    assert_eq!(value.get::<String>().map(String::as_str).ok(), Some("abcd"));
}

struct Size;

impl Visitor<String> for Size {
    type Output = usize;

    fn visit(self, value: &String) -> usize {
        value.len()
    }
}

impl Visitor<i32> for Size {
    type Output = usize;

    fn visit(self, _value: &i32) -> usize {
        4
    }
}

impl Visitor<Thing> for Size {
    type Output = usize;

    fn visit(self, _value: &Thing) -> usize {
        8
    }
}

impl Visitor<InvalidReason> for Size {
    type Output = usize;

    fn visit(self, _reason: &InvalidReason) -> usize {
        0
    }
}

struct Bump;

impl VisitorMut<String> for Bump {
    type Output = Option<InvalidReason>;

    fn visit_mut(self, value: &mut String) -> Option<InvalidReason> {
        value.push('!');
        None
    }
}

impl VisitorMut<i32> for Bump {
    type Output = Option<InvalidReason>;

    fn visit_mut(self, value: &mut i32) -> Option<InvalidReason> {
        *value += 1;
        None
    }
}

impl VisitorMut<Thing> for Bump {
    type Output = Option<InvalidReason>;

    fn visit_mut(self, value: &mut Thing) -> Option<InvalidReason> {
        value.number += 1;
        None
    }
}

impl VisitorMut<InvalidReason> for Bump {
    type Output = Option<InvalidReason>;

    fn visit_mut(self, reason: &mut InvalidReason) -> Option<InvalidReason> {
        Some(*reason)
    }
}

#[test]
fn test_apply() {
    let mut value: Value = Variant::convert("four");
    assert_eq!(value.apply(Size).ok(), Some(4));
    assert_eq!(value.apply_or_recover(Size), 4);

    assert_eq!(value.apply_mut(Bump).ok(), Some(None));
    assert_eq!(
        value.get::<String>().map(String::as_str).ok(),
        Some("four!")
    );

    let _moved = value.take();
    let error = value.apply(Size).unwrap_err();
    assert_eq!(error.current_context().reason, InvalidReason::MovedFrom);
    assert!(value.apply_mut(Bump).is_err());
    assert_eq!(value.apply_or_recover(Size), 0);
}

#[test]
fn test_apply_mut_or_recover() {
    let mut value: Value = Variant::new(Thing {
        number: 1,
        letter: 'x',
    });
    assert_eq!(value.apply_mut_or_recover(Bump), None);
    assert_eq!(value.get::<Thing>().map(|t| t.number).ok(), Some(2));

    let _moved = value.take();
    assert_eq!(
        value.apply_mut_or_recover(Bump),
        Some(InvalidReason::MovedFrom)
    );
    // The handler sees a copy of the reason, the variant keeps its own
    assert_eq!(value.invalid_reason(), Some(InvalidReason::MovedFrom));
}

#[test]
fn test_unchecked_access() {
    let mut value: Value = Variant::new(7i32);
    // SAFETY: the variant was just built from an `i32`
    assert_eq!(unsafe { *value.get_unchecked::<i32>() }, 7);
    // SAFETY: the live alternative is still the `i32`
    unsafe { *value.get_unchecked_mut::<i32>() += 1 };
    assert_eq!(value.get::<i32>().ok(), Some(&8));

    let mut text: Value = Variant::convert("ab");
    // SAFETY: `convert` from a `&str` builds the `String` alternative
    unsafe { text.get_unchecked_mut::<String>() }.push('c');
    assert_eq!(unsafe { text.get_unchecked::<String>() }, "abc");
    assert_eq!(text.which(), 0);
}

#[test]
fn test_duplicate_alternatives() {
    type Range = Variant<types![u32, u32]>;

    let end = Range::at::<There<Here>>(9);
    assert_eq!(end.which(), 1);
    assert!(!end.contains::<u32>());
    assert!(end.get::<u32>().is_err());
    assert_eq!(end.get_at::<There<Here>>().ok(), Some(&9));

    let start = Range::at::<Here>(1);
    assert_eq!(start.which(), 0);
    assert!(start.contains::<u32>());
}

#[test]
fn test_into_inner() {
    let value: Value = Variant::new(Thing {
        number: 2,
        letter: 'q',
    });
    let value = value.into_inner::<String>().unwrap_err();
    assert_eq!(
        value.into_inner::<Thing>().ok(),
        Some(Thing {
            number: 2,
            letter: 'q'
        })
    );
}

#[test]
fn test_debug_and_type_name() {
    let value: Value = Variant::new(3i32);
    assert_eq!(format!("{value:?}"), "Variant(3)");
    assert_eq!(value.type_name(), Some("i32"));

    let poisoned = Value::poisoned(InvalidReason::MoveThrew);
    assert_eq!(format!("{poisoned:?}"), "Variant(<invalid: MoveThrew>)");
    assert_eq!(poisoned.type_name(), None);
}

#[derive(Clone)]
struct HookProbe;

static PROBE_EVENTS: Mutex<Vec<PoisonEvent>> = Mutex::new(Vec::new());

struct ProbeRecorder;

impl PoisonHook for ProbeRecorder {
    fn on_poison(&self, event: &PoisonEvent) {
        if event.variant.contains("HookProbe") {
            PROBE_EVENTS.lock().unwrap().push(*event);
        }
    }
}

#[test]
fn test_poison_hooks_observe_transitions() {
    register_poison_hook(ProbeRecorder);

    let mut hooks = 0;
    poison::debug_poison_hooks(|_| hooks += 1);
    assert!(hooks >= 1);

    let mut value: Variant<types![HookProbe, u8]> = Variant::new(HookProbe);
    let _first = value.take();
    let _second = value.take();
    let _copy = value.clone();

    let events = PROBE_EVENTS.lock().unwrap().clone();
    let summary: Vec<_> = events
        .iter()
        .map(|event| (event.reason, event.alternative.is_some(), event.propagated))
        .collect();
    assert_eq!(
        summary,
        [
            (InvalidReason::MovedFrom, true, false),
            (InvalidReason::MovedFrom, false, false),
            (InvalidReason::MovedFrom, false, true),
            (InvalidReason::MovedFrom, false, true),
        ]
    );
    assert!(events[0].alternative.unwrap().ends_with("HookProbe"));
}
