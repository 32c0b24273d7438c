//! Error contexts reported by [`Variant`].
//!
//! Fallible operations return a [`rootcause::Report`] whose context is one of
//! the types below, so they can be inspected through
//! [`Report::current_context`] or propagated with `?` into any other report.
//!
//! - [`InvalidVariant`]: the value was read from a poisoned variant
//! - [`TypeMismatch`]: a typed accessor asked for an alternative that is not
//!   the live one
//!
//! [`Variant`]: crate::Variant
//! [`Report::current_context`]: rootcause::Report::current_context

use core::fmt;

use crate::InvalidReason;

/// The variant holds no value.
///
/// Returned when dispatching on a poisoned variant without a handler for the
/// poisoned state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InvalidVariant {
    /// Why the variant holds no value
    pub reason: InvalidReason,
}

impl fmt::Display for InvalidVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.reason, f)
    }
}

impl core::error::Error for InvalidVariant {}

/// What a variant held when a typed accessor failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Held {
    /// The alternative at `index`, whose type is `name`.
    Alternative {
        /// Position of the live alternative
        index: usize,
        /// [`core::any::type_name`] of the live alternative
        name: &'static str,
    },
    /// Nothing, because the variant is poisoned.
    Invalid(InvalidReason),
}

/// The requested alternative is not the live one.
///
/// Typed accessors such as [`Variant::get`] return this error instead of
/// poisoning the variant, which is left untouched.
///
/// [`Variant::get`]: crate::Variant::get
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeMismatch {
    /// [`core::any::type_name`] of the requested alternative
    pub requested: &'static str,
    /// What the variant held instead
    pub held: Held,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.held {
            Held::Alternative { index, name } => write!(
                f,
                "requested alternative {} but the variant holds {} at position {}",
                self.requested, name, index
            ),
            Held::Invalid(reason) => write!(
                f,
                "requested alternative {} but the {}",
                self.requested, reason
            ),
        }
    }
}

impl core::error::Error for TypeMismatch {}

/// Attachment naming the variant type an error came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariantType(pub &'static str);

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variant type: {}", self.0)
    }
}
