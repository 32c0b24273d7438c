//! Choosing the alternative a constructor argument belongs to.
//!
//! Both traits in this module are implemented recursively over a list of
//! alternatives and take an [`Index`] witness as their last parameter. The
//! witness is never spelled out by callers: the compiler infers it by finding
//! the one position at which the trait holds.
//!
//! - [`Member<T, I>`]: the alternative at position `I` is exactly `T`. Used
//!   by [`Variant::new`] and [`Variant::construct`].
//! - [`Convert<A, I>`]: the alternative at position `I` implements
//!   `From<A>`. Used by [`Variant::convert`].
//!
//! When no position qualifies, compilation fails because the bound is not
//! satisfied. When several positions qualify, compilation fails because the
//! witness cannot be inferred; name the alternative with
//! [`Variant::construct`] or [`Variant::at`] instead.
//!
//! ```compile_fail
//! use oneof::{Variant, types};
//!
//! // Both `i64` and `f64` implement `From<i32>`
//! let variant: Variant<types![i64, f64]> = Variant::convert(1i32);
//! ```
//!
//! ```
//! use oneof::{Variant, types};
//!
//! let variant: Variant<types![i64, f64]> = Variant::construct::<f64, _>(1i32);
//! assert_eq!(variant.which(), 1);
//! ```
//!
//! [`Variant::new`]: crate::Variant::new
//! [`Variant::construct`]: crate::Variant::construct
//! [`Variant::convert`]: crate::Variant::convert
//! [`Variant::at`]: crate::Variant::at

use crate::{At, HCons, Here, Index, There, TypeList};

/// The list declares `T` at position `I`.
pub trait Member<T: 'static, I: Index>: At<I, Output = T> {}

impl<T: 'static, Tail: TypeList> Member<T, Here> for HCons<T, Tail> {}

impl<H, T, Tail, I> Member<T, There<I>> for HCons<H, Tail>
where
    H: 'static,
    T: 'static,
    Tail: Member<T, I>,
    I: Index,
{
}

/// The alternative at position `I` can be built from an `A`.
pub trait Convert<A, I: Index>: At<I> {
    /// Builds the alternative at position `I` from `arg`.
    fn convert(arg: A) -> Self::Output;
}

impl<A, H, Tail> Convert<A, Here> for HCons<H, Tail>
where
    H: 'static + From<A>,
    Tail: TypeList,
{
    #[inline]
    fn convert(arg: A) -> H {
        H::from(arg)
    }
}

impl<A, H, Tail, I> Convert<A, There<I>> for HCons<H, Tail>
where
    H: 'static,
    Tail: Convert<A, I>,
    I: Index,
{
    #[inline]
    fn convert(arg: A) -> Tail::Output {
        Tail::convert(arg)
    }
}
