//! Basic introduction to oneof variants.
//!
//! This example demonstrates the fundamental concepts:
//! 1. Declaring alternatives with `types![]` and matching with `arms![]`
//! 2. Choosing the alternative from the constructor argument
//! 3. A clone that panics poisons the copy instead of aborting
//! 4. Taking the value out poisons the source

use oneof::{
    hooks::poison::{PoisonEvent, PoisonHook, register_poison_hook},
    prelude::*,
};

#[derive(Clone, Debug)]
struct Thing {
    number: i32,
    letter: char,
}

/// A value whose clone always fails.
#[derive(Debug)]
struct BadThing;

impl Clone for BadThing {
    fn clone(&self) -> Self {
        panic!("BadThing cannot be cloned");
    }
}

type Value = Variant<types![String, i32, Thing]>;

fn describe(value: &Value) -> String {
    // One arm per alternative, plus one for the poisoned state
    value.match_with(arms![
        |s: &String| format!("string:{s}"),
        |i: &i32| format!("int:{i}"),
        |t: &Thing| format!("thing:{},{}", t.number, t.letter),
        |reason: InvalidReason| format!("invalid: {reason}"),
    ])
}

/// Prints every poisoning as it happens.
struct PrintHook;

impl PoisonHook for PrintHook {
    fn on_poison(&self, event: &PoisonEvent) {
        println!("  [hook] {event}");
    }
}

fn main() {
    register_poison_hook(PrintHook);

    println!("=== Construction and matching ===\n");

    // `new` takes a value of one of the alternatives, `convert` anything
    // exactly one alternative can be built from
    let values: Vec<Value> = vec![
        Variant::new(7i32),
        Variant::convert("Hello"),
        Variant::new(5i32),
        Variant::new(Thing {
            number: 5,
            letter: 'a',
        }),
    ];
    for value in &values {
        println!("{}", describe(value));
    }
    println!();

    println!("=== A clone that panics ===\n");

    // The panic is caught and the destination is poisoned instead
    std::panic::set_hook(Box::new(|_| {}));
    let source: Variant<types![BadThing, i32]> = Variant::new(BadThing);
    let mut destination: Variant<types![BadThing, i32]> = Variant::new(3i32);
    destination.clone_from(&source);
    let _ = std::panic::take_hook();

    let result = destination.match_with(arms![
        |_: &BadThing| "bad thing".to_string(),
        |i: &i32| format!("int:{i}"),
        |reason: InvalidReason| format!("invalid: {reason:?}"),
    ]);
    println!("{result}\n");

    println!("=== Moving out ===\n");

    let mut original: Value = Variant::convert("moved");
    let moved = original.take();
    println!("moved:    {}", describe(&moved));
    println!("original: {}", describe(&original));

    // Without an arm for the poisoned state, matching returns an error report
    let checked = original.match_with(arms![|s: &String| s.len(), |_: &i32| 0, |_: &Thing| 0]);
    if let Err(report) = checked {
        println!("\n{report}");
    }
}
