//! Vtables for type-erased lifecycle operations on the live alternative.
//!
//! This module contains the [`AlternativeVtable`] and [`CloneVtable`] which
//! allow destroying and cloning the value held by a storage cell when its
//! concrete type is only known through the tag. A [`TypeList`] maps each tag
//! in `0..N` to the vtables of the alternative at that position.
//!
//! This module encapsulates the fields of both vtables so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the function pointers always belong to the type the vtable
//! was created for**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`AlternativeVtable::new`] and [`CloneVtable::new`], which
//! pair the function pointers with a specific type `T` at compile time.
//!
//! [`TypeList`]: crate::TypeList

use core::{any::TypeId, ptr::NonNull};

use crate::util::Erased;

/// Vtable for the operations every alternative supports.
///
/// # Safety Invariant
///
/// The fields `type_id`, `type_name` and `drop` are guaranteed to point to the
/// functions defined below instantiated with the alternative type `T` that
/// was used to create this [`AlternativeVtable`].
#[derive(Copy, Clone)]
pub struct AlternativeVtable {
    /// Gets the [`TypeId`] of the alternative.
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the alternative.
    type_name: fn() -> &'static str,
    /// Drops the alternative stored at the pointer in place.
    drop: unsafe fn(NonNull<Erased>),
}

impl AlternativeVtable {
    /// Creates a new [`AlternativeVtable`] for the alternative type `T`.
    pub(crate) const fn new<T: 'static>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                drop: drop::<T>,
            }
        }
    }

    /// Gets the [`TypeId`] of the alternative that was used to create this
    /// [`AlternativeVtable`].
    #[inline]
    pub(crate) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the alternative that was used to
    /// create this [`AlternativeVtable`].
    #[inline]
    pub(crate) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Drops the alternative stored at `ptr` in place.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized value of the alternative type this
    ///    [`AlternativeVtable`] was created for.
    /// 2. The value is not used again after this call, and is not dropped
    ///    again by anyone else.
    #[inline]
    pub(crate) unsafe fn drop(&self, ptr: NonNull<Erased>) {
        // SAFETY: We know that `self.drop` points to the function `drop::<T>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe {
            (self.drop)(ptr);
        }
    }
}

/// Vtable for cloning an alternative.
///
/// Only alternatives implementing [`Clone`] have one, which is why it is kept
/// apart from [`AlternativeVtable`].
///
/// # Safety Invariant
///
/// The field `clone` is guaranteed to point to [`clone::<T>`] for the type `T`
/// that was used to create this [`CloneVtable`].
#[derive(Copy, Clone)]
pub struct CloneVtable {
    /// Clones the alternative at the first pointer into the memory at the
    /// second pointer.
    clone: unsafe fn(NonNull<Erased>, NonNull<Erased>),
}

impl CloneVtable {
    /// Creates a new [`CloneVtable`] for the alternative type `T`.
    pub(crate) const fn new<T: 'static + Clone>() -> &'static Self {
        const { &Self { clone: clone::<T> } }
    }

    /// Clones the alternative at `source` and writes the copy to `target`.
    ///
    /// If the alternative's [`Clone`] implementation panics, nothing is
    /// written to `target`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `source` points to an initialized value of the alternative type this
    ///    [`CloneVtable`] was created for.
    /// 2. `target` is valid for writes of that type and does not hold a live
    ///    value that would be overwritten without being dropped.
    #[inline]
    pub(crate) unsafe fn clone_into(&self, source: NonNull<Erased>, target: NonNull<Erased>) {
        // SAFETY: We know that `self.clone` points to the function `clone::<T>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe {
            (self.clone)(source, target);
        }
    }
}

/// Drops the `T` stored at `ptr` in place.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `T`
/// 2. The `T` is not used or dropped again afterwards
unsafe fn drop<T: 'static>(ptr: NonNull<Erased>) {
    let ptr: NonNull<T> = ptr.cast::<T>();
    // SAFETY: The pointer points to an initialized `T` which is never used
    // again, as guaranteed by the caller.
    unsafe {
        ptr.drop_in_place();
    }
}

/// Clones the `T` at `source` into `target`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `source` points to an initialized `T`
/// 2. `target` is valid for writes of a `T` and holds no live value
unsafe fn clone<T: 'static + Clone>(source: NonNull<Erased>, target: NonNull<Erased>) {
    // SAFETY: `source` points to an initialized `T`, guaranteed by the caller.
    let source: &T = unsafe { source.cast::<T>().as_ref() };
    let copy = source.clone();
    // SAFETY: `target` is valid for writes of a `T`, guaranteed by the caller.
    unsafe {
        target.cast::<T>().write(copy);
    }
}
