#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A closed-set tagged union over a compile-time list of alternatives.
//!
//! ## Overview
//!
//! A [`Variant`] stores exactly one value out of a fixed list of alternative
//! types, declared with the [`types!`] macro. The value lives inline in
//! storage sized for the largest alternative, and a small integer tag
//! records which alternative is live.
//!
//! Unlike a plain Rust `enum`, the alternatives need no wrapping variant
//! names, the list can be assembled generically, and a variant carries a
//! *poisoned* state: when copying a value into it fails, or after its value
//! has been moved out, it holds no value and instead records why.
//!
//! ## Quick Example
//!
//! ```
//! use oneof::prelude::*;
//!
//! let values: [Variant<types![String, i32]>; 2] =
//!     [Variant::new(7i32), Variant::convert("Hello")];
//!
//! for value in &values {
//!     let description = value.match_with(arms![
//!         |s: &String| format!("string:{s}"),
//!         |i: &i32| format!("int:{i}"),
//!     ]);
//!     println!("{}", description.unwrap());
//! }
//! ```
//!
//! ## Core Concepts
//!
//! **Construction** picks the alternative from the argument:
//!
//! - [`Variant::new`] when the argument's type is one of the alternatives
//! - [`Variant::convert`] when exactly one alternative implements
//!   [`From`] for the argument's type
//! - [`Variant::construct`] and [`Variant::at`] to name the alternative
//!   explicitly, by type or by position
//!
//! If the choice would be ambiguous, the code does not compile.
//!
//! **Dispatch** reads the live value without naming its type:
//!
//! - [`Variant::match_with`] takes one closure per alternative in declaration
//!   order, built with [`arms!`]. Add one more closure taking an
//!   [`InvalidReason`] to handle the poisoned state instead of getting an
//!   error.
//! - [`Variant::apply`] takes a single [`Visitor`] implemented for every
//!   alternative.
//!
//! **Poisoning** replaces failures that cannot be reported at the point where
//! they happen:
//!
//! - cloning a variant whose live value panics in [`Clone::clone`] produces a
//!   variant poisoned with [`InvalidReason::CopyThrew`]
//! - [`Variant::take`] moves the contents out and leaves the source poisoned
//!   with [`InvalidReason::MovedFrom`]
//! - cloning or taking a poisoned variant passes the reason on unchanged
//!
//! A poisoned variant can still be inspected with [`Variant::state`] and is
//! dropped without running any destructor. Reading its value fails with a
//! [`Report<InvalidVariant>`](rootcause::Report). Poisoning can be observed
//! as it happens through [`hooks`].
//!
//! For implementation details, see the [`oneof-internals`] crate.
//!
//! [`oneof-internals`]: oneof_internals
//!
//! ## Consumers
//!
//! - [`Optional`]: an option-like type over the alternatives `[Absent, T]`
//! - [`Tree`]: a persistent binary search tree whose child links are
//!   [`Optional`]s
//!
//! ## Ecosystem
//!
//! - **[`oneof-tracing`]** - Emits a `tracing` event every time a variant
//!   becomes poisoned.
//!
//! [`oneof-tracing`]: https://docs.rs/oneof-tracing
//!
//! ## Features
//!
//! - `std` (default): absorbs panics from [`Clone`] into the
//!   [`InvalidReason::CopyThrew`] state and guards hooks with
//!   `std::sync::RwLock`. Without it the crate is `no_std` with `alloc`, a
//!   panicking clone unwinds through the caller, and hooks use a spin lock.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub mod error;
pub mod hooks;
pub mod optional;
pub mod prelude;
pub mod resolve;
pub mod tree;
pub mod visit;

mod variant;

pub use oneof_internals::{
    Append, At, CloneList, Extend, HCons, HNil, Here, Index, InvalidReason, Nth, State, There,
    TypeList,
};

pub use self::{
    error::{InvalidVariant, TypeMismatch},
    optional::{Absent, Optional},
    tree::Tree,
    variant::Variant,
    visit::{Visitor, VisitorMut},
};
