//! The lock guarding the global hook registry.
//!
//! Uses [`std::sync::RwLock`] when the `std` feature is enabled and
//! [`spin::RwLock`] otherwise.

use core::ops::{Deref, DerefMut};

#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

/// A read-mostly lock around a global value.
#[repr(transparent)]
pub(crate) struct HookLock<T: 'static + Send + Sync>(impl_::RwLock<T>);

/// Shared access to the value inside a [`HookLock`].
#[repr(transparent)]
pub(crate) struct HookLockReadGuard<T: 'static + Send + Sync>(
    impl_::RwLockReadGuard<'static, T>,
);

/// Exclusive access to the value inside a [`HookLock`].
#[repr(transparent)]
pub(crate) struct HookLockWriteGuard<T: 'static + Send + Sync>(
    impl_::RwLockWriteGuard<'static, T>,
);

impl<T: 'static + Send + Sync> HookLock<T> {
    #[must_use]
    pub(crate) const fn new(value: T) -> Self {
        Self(impl_::RwLock::new(value))
    }

    #[inline]
    pub(crate) fn read(&'static self) -> HookLockReadGuard<T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        // Hooks never run while the lock is held, so it can only be poisoned
        // by a panic inside this crate
        #[cfg(feature = "std")]
        let guard = self.0.read().expect("Unable to acquire poison hook lock");

        HookLockReadGuard(guard)
    }

    #[inline]
    pub(crate) fn write(&'static self) -> HookLockWriteGuard<T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.write();

        #[cfg(feature = "std")]
        let guard = self.0.write().expect("Unable to acquire poison hook lock");

        HookLockWriteGuard(guard)
    }
}

impl<T: 'static + Send + Sync> Deref for HookLockReadGuard<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: 'static + Send + Sync> Deref for HookLockWriteGuard<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: 'static + Send + Sync> DerefMut for HookLockWriteGuard<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
