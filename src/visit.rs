//! Dispatch on the live alternative.
//!
//! There are two ways to read the value of a [`Variant`] without naming its
//! type:
//!
//! - A **visitor** is a single value implementing [`Visitor<T>`] (or
//!   [`VisitorMut<T>`]) for every alternative `T`, all with the same output
//!   type. It is passed to [`Variant::apply`].
//! - A list of **arms** holds one closure per alternative in declaration
//!   order, built with the [`arms!`] macro. It is passed to
//!   [`Variant::match_with`].
//!
//! In both cases the tag is compared against each position in turn, and the
//! handler at the matching position receives the value.
//!
//! # Handling the poisoned state
//!
//! A visitor that also implements [`Visitor<InvalidReason>`] can be passed to
//! [`Variant::apply_or_recover`], which hands it the reason instead of
//! failing.
//!
//! A list of arms with one arm more than there are alternatives treats its
//! last arm as the handler for the poisoned state. The arm receives the
//! [`InvalidReason`] and the match returns the arms' output directly rather
//! than a [`Result`]. Which mode applies is decided by counting the arms.
//!
//! [`Variant`]: crate::Variant
//! [`Variant::apply`]: crate::Variant::apply
//! [`Variant::apply_or_recover`]: crate::Variant::apply_or_recover
//! [`Variant::match_with`]: crate::Variant::match_with

use core::fmt;

use oneof_internals::{ErasedMut, ErasedRef};
use rootcause::Report;

use crate::{HCons, HNil, InvalidReason, State, TypeList, error::InvalidVariant};

/// Handles a shared reference to an alternative of type `T`.
///
/// # Examples
///
/// ```
/// use oneof::{Variant, Visitor, types};
///
/// struct Size;
///
/// impl Visitor<String> for Size {
///     type Output = usize;
///
///     fn visit(self, value: &String) -> usize {
///         value.len()
///     }
/// }
///
/// impl Visitor<u64> for Size {
///     type Output = usize;
///
///     fn visit(self, _value: &u64) -> usize {
///         8
///     }
/// }
///
/// let variant: Variant<types![String, u64]> = Variant::convert("four");
/// assert_eq!(variant.apply(Size).unwrap(), 4);
/// ```
pub trait Visitor<T: ?Sized> {
    /// The result of the visit.
    type Output;

    /// Handles `value`.
    fn visit(self, value: &T) -> Self::Output;
}

/// Handles a mutable reference to an alternative of type `T`.
pub trait VisitorMut<T: ?Sized> {
    /// The result of the visit.
    type Output;

    /// Handles `value`.
    fn visit_mut(self, value: &mut T) -> Self::Output;
}

/// A visitor that can handle every alternative of `L`, producing `R`.
///
/// Implemented automatically for any `V` that implements [`Visitor<T>`] with
/// `Output = R` for every alternative `T` of `L`.
pub trait VisitAll<L: TypeList, R>: Sized {
    /// Visits the alternative at `index` stored behind `value`.
    ///
    /// Gives the visitor back if `index` is past the end of `L`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If `index < L::LEN`, `value` points to an initialized value of the
    ///    alternative of `L` at position `index`.
    #[doc(hidden)]
    unsafe fn visit_at(self, index: usize, value: ErasedRef<'_>) -> Result<R, Self>;
}

impl<V, R> VisitAll<HNil, R> for V {
    #[inline]
    unsafe fn visit_at(self, _index: usize, _value: ErasedRef<'_>) -> Result<R, Self> {
        Err(self)
    }
}

impl<V, R, H, T> VisitAll<HCons<H, T>, R> for V
where
    V: Visitor<H, Output = R> + VisitAll<T, R>,
    H: 'static,
    T: TypeList,
{
    #[inline]
    unsafe fn visit_at(self, index: usize, value: ErasedRef<'_>) -> Result<R, Self> {
        if index == 0 {
            // SAFETY:
            // 1. `index` is 0, so `value` points to the head alternative `H`, guaranteed
            //    by the caller
            let value = unsafe { value.cast::<H>() };
            Ok(self.visit(value))
        } else {
            // SAFETY:
            // 1. Position `index - 1` of `T` is position `index` of `HCons<H, T>`, so the
            //    caller's guarantee carries over
            unsafe { <V as VisitAll<T, R>>::visit_at(self, index - 1, value) }
        }
    }
}

/// A visitor that can mutably handle every alternative of `L`, producing
/// `R`.
///
/// Implemented automatically for any `V` that implements [`VisitorMut<T>`]
/// with `Output = R` for every alternative `T` of `L`.
pub trait VisitAllMut<L: TypeList, R>: Sized {
    /// Visits the alternative at `index` stored behind `value`.
    ///
    /// Gives the visitor back if `index` is past the end of `L`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If `index < L::LEN`, `value` points to an initialized value of the
    ///    alternative of `L` at position `index`.
    #[doc(hidden)]
    unsafe fn visit_at_mut(self, index: usize, value: ErasedMut<'_>) -> Result<R, Self>;
}

impl<V, R> VisitAllMut<HNil, R> for V {
    #[inline]
    unsafe fn visit_at_mut(self, _index: usize, _value: ErasedMut<'_>) -> Result<R, Self> {
        Err(self)
    }
}

impl<V, R, H, T> VisitAllMut<HCons<H, T>, R> for V
where
    V: VisitorMut<H, Output = R> + VisitAllMut<T, R>,
    H: 'static,
    T: TypeList,
{
    #[inline]
    unsafe fn visit_at_mut(self, index: usize, value: ErasedMut<'_>) -> Result<R, Self> {
        if index == 0 {
            // SAFETY:
            // 1. `index` is 0, so `value` points to the head alternative `H`, guaranteed
            //    by the caller
            let value = unsafe { value.cast::<H>() };
            Ok(self.visit_mut(value))
        } else {
            // SAFETY:
            // 1. Position `index - 1` of `T` is position `index` of `HCons<H, T>`, so the
            //    caller's guarantee carries over
            unsafe { <V as VisitAllMut<T, R>>::visit_at_mut(self, index - 1, value) }
        }
    }
}

/// A list of match arms for the alternatives `L`, each producing `R`.
///
/// Implemented for lists built with [`arms!`] holding either:
///
/// - one `FnOnce(&T) -> R` per alternative `T` of `L`, in which case
///   [`Arms::Output`] is `Result<R, Report<InvalidVariant>>`, or
/// - the same followed by one `FnOnce(InvalidReason) -> R`, in which case
///   [`Arms::Output`] is `R`.
pub trait Arms<L: TypeList, R> {
    /// The result of the match.
    type Output;

    /// Wraps the output of an alternative's arm.
    #[doc(hidden)]
    fn found(value: R) -> Self::Output;

    /// Runs the arm for `state`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If `state` is [`State::Valid(index)`](State::Valid) with
    ///    `index < L::LEN`, `value` points to an initialized value of the
    ///    alternative of `L` at position `index`.
    #[doc(hidden)]
    unsafe fn dispatch(self, state: State, value: ErasedRef<'_>) -> Self::Output;
}

impl<R> Arms<HNil, R> for HNil {
    type Output = Result<R, Report<InvalidVariant>>;

    #[inline]
    fn found(value: R) -> Self::Output {
        Ok(value)
    }

    #[inline]
    #[track_caller]
    unsafe fn dispatch(self, state: State, _value: ErasedRef<'_>) -> Self::Output {
        Err(invalid_report(state))
    }
}

impl<R, E> Arms<HNil, R> for HCons<E, HNil>
where
    E: FnOnce(InvalidReason) -> R,
{
    type Output = R;

    #[inline]
    fn found(value: R) -> R {
        value
    }

    #[inline]
    unsafe fn dispatch(self, state: State, _value: ErasedRef<'_>) -> R {
        (self.head)(state.invalid_reason().unwrap_or(InvalidReason::Unknown))
    }
}

impl<R, F, Rest, H, T> Arms<HCons<H, T>, R> for HCons<F, Rest>
where
    F: FnOnce(&H) -> R,
    Rest: Arms<T, R>,
    H: 'static,
    T: TypeList,
{
    type Output = Rest::Output;

    #[inline]
    fn found(value: R) -> Self::Output {
        Rest::found(value)
    }

    #[inline]
    #[track_caller]
    unsafe fn dispatch(self, state: State, value: ErasedRef<'_>) -> Self::Output {
        match state {
            State::Valid(0) => {
                // SAFETY:
                // 1. The state names position 0, so `value` points to the head alternative
                //    `H`, guaranteed by the caller
                let value = unsafe { value.cast::<H>() };
                Rest::found((self.head)(value))
            }
            // SAFETY:
            // 1. Position `index - 1` of `T` is position `index` of `HCons<H, T>`, so the
            //    caller's guarantee carries over
            State::Valid(index) => unsafe { self.tail.dispatch(State::Valid(index - 1), value) },
            // SAFETY:
            // 1. The state is not valid, so there is nothing to guarantee
            State::Invalid(reason) => unsafe { self.tail.dispatch(State::Invalid(reason), value) },
        }
    }
}

/// A list of match arms taking mutable references to the alternatives `L`,
/// each producing `R`.
///
/// The mutable counterpart of [`Arms`]: each arm is an `FnOnce(&mut T) -> R`,
/// optionally followed by one `FnOnce(InvalidReason) -> R`.
pub trait ArmsMut<L: TypeList, R> {
    /// The result of the match.
    type Output;

    /// Wraps the output of an alternative's arm.
    #[doc(hidden)]
    fn found(value: R) -> Self::Output;

    /// Runs the arm for `state`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If `state` is [`State::Valid(index)`](State::Valid) with
    ///    `index < L::LEN`, `value` points to an initialized value of the
    ///    alternative of `L` at position `index`.
    #[doc(hidden)]
    unsafe fn dispatch_mut(self, state: State, value: ErasedMut<'_>) -> Self::Output;
}

impl<R> ArmsMut<HNil, R> for HNil {
    type Output = Result<R, Report<InvalidVariant>>;

    #[inline]
    fn found(value: R) -> Self::Output {
        Ok(value)
    }

    #[inline]
    #[track_caller]
    unsafe fn dispatch_mut(self, state: State, _value: ErasedMut<'_>) -> Self::Output {
        Err(invalid_report(state))
    }
}

impl<R, E> ArmsMut<HNil, R> for HCons<E, HNil>
where
    E: FnOnce(InvalidReason) -> R,
{
    type Output = R;

    #[inline]
    fn found(value: R) -> R {
        value
    }

    #[inline]
    unsafe fn dispatch_mut(self, state: State, _value: ErasedMut<'_>) -> R {
        (self.head)(state.invalid_reason().unwrap_or(InvalidReason::Unknown))
    }
}

impl<R, F, Rest, H, T> ArmsMut<HCons<H, T>, R> for HCons<F, Rest>
where
    F: FnOnce(&mut H) -> R,
    Rest: ArmsMut<T, R>,
    H: 'static,
    T: TypeList,
{
    type Output = Rest::Output;

    #[inline]
    fn found(value: R) -> Self::Output {
        Rest::found(value)
    }

    #[inline]
    #[track_caller]
    unsafe fn dispatch_mut(self, state: State, value: ErasedMut<'_>) -> Self::Output {
        match state {
            State::Valid(0) => {
                // SAFETY:
                // 1. The state names position 0, so `value` points to the head alternative
                //    `H`, guaranteed by the caller
                let value = unsafe { value.cast::<H>() };
                Rest::found((self.head)(value))
            }
            // SAFETY:
            // 1. Position `index - 1` of `T` is position `index` of `HCons<H, T>`, so the
            //    caller's guarantee carries over
            State::Valid(index) => unsafe {
                self.tail.dispatch_mut(State::Valid(index - 1), value)
            },
            // SAFETY:
            // 1. The state is not valid, so there is nothing to guarantee
            State::Invalid(reason) => unsafe {
                self.tail.dispatch_mut(State::Invalid(reason), value)
            },
        }
    }
}

/// Formats every alternative of a list with [`fmt::Debug`].
///
/// Implemented for every list whose alternatives all implement
/// [`fmt::Debug`].
pub trait DebugList: TypeList {
    /// Formats the alternative at `index` stored behind `value`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If `index < Self::LEN`, `value` points to an initialized value of
    ///    the alternative at position `index`.
    #[doc(hidden)]
    unsafe fn debug_at(
        index: usize,
        value: ErasedRef<'_>,
        formatter: &mut fmt::Formatter<'_>,
    ) -> fmt::Result;
}

impl DebugList for HNil {
    #[inline]
    unsafe fn debug_at(
        _index: usize,
        _value: ErasedRef<'_>,
        formatter: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        formatter.write_str("<out of range>")
    }
}

impl<H, T> DebugList for HCons<H, T>
where
    H: 'static + fmt::Debug,
    T: DebugList,
{
    unsafe fn debug_at(
        index: usize,
        value: ErasedRef<'_>,
        formatter: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if index == 0 {
            // SAFETY:
            // 1. `index` is 0, so `value` points to the head alternative `H`, guaranteed
            //    by the caller
            let value = unsafe { value.cast::<H>() };
            fmt::Debug::fmt(value, formatter)
        } else {
            // SAFETY:
            // 1. Position `index - 1` of `T` is position `index` of `HCons<H, T>`, so the
            //    caller's guarantee carries over
            unsafe { T::debug_at(index - 1, value, formatter) }
        }
    }
}

/// Builds the error returned when no arm handles `state`.
#[track_caller]
#[cold]
fn invalid_report(state: State) -> Report<InvalidVariant> {
    Report::new(InvalidVariant {
        reason: state.invalid_reason().unwrap_or(InvalidReason::Unknown),
    })
}
