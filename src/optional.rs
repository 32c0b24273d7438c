//! An option-like type built on [`Variant`].
//!
//! [`Optional<T>`] is a `Variant<types![Absent, T]>` with an API shaped like
//! [`Option`]. It exists mostly to show how a consumer type can be layered on
//! top of a variant; the poisoned state is folded into "absent".

use core::{fmt, mem};

use rootcause::Report;

use crate::{Here, Index, There, TypeMismatch, Variant};

/// Marker alternative for an [`Optional`] that holds nothing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Absent;

/// Either [`Absent`] or a value of type `T`.
///
/// # Examples
///
/// ```
/// use oneof::Optional;
///
/// let mut name = Optional::some(String::from("ferris"));
/// assert_eq!(name.get().unwrap(), "ferris");
///
/// let taken = name.take();
/// assert!(name.is_none());
/// assert_eq!(taken.into_option().as_deref(), Some("ferris"));
/// ```
pub struct Optional<T: 'static> {
    inner: Variant<types![Absent, T]>,
}

type Present = There<Here>;

impl<T: 'static> Optional<T> {
    /// Creates an `Optional` holding `value`.
    #[inline]
    #[must_use]
    pub fn some(value: T) -> Self {
        Self {
            inner: Variant::at::<Present>(value),
        }
    }

    /// Creates an empty `Optional`.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self {
            inner: Variant::at::<Here>(Absent),
        }
    }

    /// Returns `true` if a value is present.
    #[inline]
    pub fn is_some(&self) -> bool {
        self.inner.which() == Present::VALUE
    }

    /// Returns `true` if no value is present.
    ///
    /// A poisoned inner variant counts as absent.
    #[inline]
    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    /// Returns a reference to the value.
    ///
    /// Fails with a [`TypeMismatch`] naming what the variant holds instead
    /// if no value is present.
    #[track_caller]
    pub fn get(&self) -> Result<&T, Report<TypeMismatch>> {
        self.inner.get_at::<Present>()
    }

    /// Returns a mutable reference to the value.
    #[track_caller]
    pub fn get_mut(&mut self) -> Result<&mut T, Report<TypeMismatch>> {
        self.inner.get_at_mut::<Present>()
    }

    /// Converts from `&Optional<T>` to `Option<&T>`.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        if self.is_some() {
            self.get().ok()
        } else {
            None
        }
    }

    /// Converts from `&mut Optional<T>` to `Option<&mut T>`.
    #[inline]
    pub fn as_mut(&mut self) -> Option<&mut T> {
        if self.is_some() {
            self.get_mut().ok()
        } else {
            None
        }
    }

    /// Takes the value out, leaving an empty `Optional` in its place.
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Replaces the value, returning the old one.
    #[inline]
    pub fn replace(&mut self, value: T) -> Self {
        mem::replace(self, Self::some(value))
    }

    /// Maps the value with `f`, if present.
    pub fn map<U: 'static>(self, f: impl FnOnce(T) -> U) -> Optional<U> {
        match self.into_option() {
            Some(value) => Optional::some(f(value)),
            None => Optional::none(),
        }
    }

    /// Converts into an [`Option`], moving the value out.
    pub fn into_option(self) -> Option<T> {
        self.inner.into_at::<Present>().ok()
    }

    /// Returns the underlying variant.
    #[inline]
    pub fn as_variant(&self) -> &Variant<types![Absent, T]> {
        &self.inner
    }
}

impl<T: 'static> Default for Optional<T> {
    #[inline]
    fn default() -> Self {
        Self::none()
    }
}

impl<T: 'static> From<Option<T>> for Optional<T> {
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::some(value),
            None => Self::none(),
        }
    }
}

impl<T: 'static> From<Optional<T>> for Option<T> {
    #[inline]
    fn from(value: Optional<T>) -> Self {
        value.into_option()
    }
}

impl<T: 'static + Clone> Clone for Optional<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static + fmt::Debug> fmt::Debug for Optional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_ref() {
            Some(value) => f.debug_tuple("Some").field(value).finish(),
            None => f.write_str("None"),
        }
    }
}

impl<T: 'static + PartialEq> PartialEq for Optional<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::String};

    use super::*;
    use crate::InvalidReason;

    #[test]
    fn test_some_and_none() {
        let some = Optional::some(3u8);
        let none = Optional::<u8>::none();

        assert!(some.is_some());
        assert!(none.is_none());
        assert_eq!(some.get().ok(), Some(&3));
        assert_eq!(none.as_ref(), None);

        let error = none.get().unwrap_err();
        assert_eq!(
            error.current_context().held,
            crate::error::Held::Alternative {
                index: 0,
                name: core::any::type_name::<Absent>(),
            }
        );
        assert_eq!(none.as_variant().which(), 0);
        assert_eq!(some.as_variant().which(), 1);
    }

    #[test]
    fn test_map_and_conversions() {
        let value: Optional<u8> = Some(4).into();
        let doubled = value.map(|v| u16::from(v) * 2);
        let plain: Option<u16> = doubled.into();
        assert_eq!(plain, Some(8));

        let empty: Optional<u8> = None.into();
        assert_eq!(empty.map(|v| v + 1).into_option(), None);
    }

    #[test]
    fn test_take_and_replace() {
        let mut value = Optional::some(String::from("a"));
        let old = value.replace(String::from("b"));
        assert_eq!(old.as_ref().map(String::as_str), Some("a"));

        if let Some(inner) = value.as_mut() {
            inner.push('c');
        }
        let taken = value.take();
        assert!(value.is_none());
        // Taking leaves a valid empty value, not a moved-from one
        assert!(value.as_variant().is_valid());
        assert_eq!(taken, Optional::some(String::from("bc")));
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", Optional::some(1u8)), "Some(1)");
        assert_eq!(format!("{:?}", Optional::<u8>::none()), "None");
    }

    #[test]
    fn test_poisoned_inner_reads_as_absent() {
        let value = Optional::<u8> {
            inner: Variant::poisoned(InvalidReason::Unknown),
        };
        assert!(value.is_none());
        assert_eq!(value.as_ref(), None);
        assert!(value.get().is_err());
    }
}
