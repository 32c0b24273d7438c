//! Commonly used items for convenient importing.
//!
//! The prelude module re-exports the most frequently used types, traits, and
//! macros from the oneof library. This allows you to import everything you
//! need with a single use statement.
//!
//! # Usage
//!
//! ```rust
//! use oneof::prelude::*;
//!
//! fn describe(value: &Variant<types![String, u8]>) -> Result<String, Report<InvalidVariant>> {
//!     value.match_with(arms![
//!         |s: &String| format!("text {s}"),
//!         |b: &u8| format!("byte {b}"),
//!     ])
//! }
//!
//! let value = Variant::new(3u8);
//! assert_eq!(describe(&value).unwrap(), "byte 3");
//! ```
//!
//! # What's Included
//!
//! This prelude includes:
//!
//! - **[`Variant`]**: The tagged union itself
//! - **[`types!`]** and **[`arms!`]**: Macros for declaring alternatives and
//!   match arms
//! - **[`State`]** and **[`InvalidReason`]**: The decoded tag and the poison
//!   reasons
//! - **[`Visitor`]** and **[`VisitorMut`]**: Traits for [`Variant::apply`]
//! - **[`InvalidVariant`]** and **[`TypeMismatch`]**: Error contexts
//! - **[`Report`]**: Re-exported from `rootcause`, the type every error is
//!   wrapped in
//! - **[`Optional`]**, **[`Absent`]** and **[`Tree`]**: The consumer types

pub use rootcause::Report;

pub use crate::{
    Absent, InvalidReason, InvalidVariant, Optional, State, Tree, TypeMismatch, Variant, Visitor,
    VisitorMut, arms, types,
};
