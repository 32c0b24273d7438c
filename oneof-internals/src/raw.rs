//! The tag-and-storage pair behind every variant.
//!
//! This module encapsulates the `tag` and `storage` fields of [`RawVariant`],
//! ensuring they are only visible within this module. This visibility
//! restriction guarantees the safety invariant: **if the tag names an
//! alternative, the storage holds exactly one initialized value of that
//! alternative; otherwise the storage holds nothing**.
//!
//! # Safety Invariant
//!
//! The tag is only ever set in this module:
//!
//! - [`RawVariant::new`] writes a value and sets the tag to the position that
//!   the [`At`] bound proves to hold the value's type
//! - [`RawVariant::poisoned`] leaves the storage empty and sets a poison tag
//! - every operation that moves or destroys the value sets a poison tag
//!   *before* the storage stops holding it, so a panic in between can never
//!   lead to a double drop
//!
//! # Type Erasure
//!
//! The concrete type of the live value is only known through the tag. The
//! [`TypeList`] maps the tag to the vtables needed to drop or clone it, and
//! [`ErasedRef`]/[`ErasedMut`] hand out untyped access to the storage for
//! dispatch code that already knows the type.

use core::{any::TypeId, marker::PhantomData, ptr::NonNull};

use crate::{
    storage::StorageCell,
    tag::{InvalidReason, State},
    type_list::{At, CloneList, Index, TypeList},
    util::Erased,
};

/// A tag together with storage for any one alternative of `L`.
///
/// Dropping a valid [`RawVariant`] drops the live value; dropping an invalid
/// one does nothing.
pub struct RawVariant<L: TypeList> {
    /// Which alternative is live, or why none is
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. If `tag < L::LEN`, `storage` holds an initialized value of the
    ///    alternative at position `tag`.
    /// 2. If `tag >= L::LEN`, `storage` holds no value that needs dropping.
    tag: usize,

    /// Room for the live alternative
    storage: StorageCell<L::Storage>,

    /// Marker to tell the compiler that we own values of the alternatives
    _marker: PhantomData<L>,
}

impl<L: TypeList> RawVariant<L> {
    /// Creates a valid [`RawVariant`] holding `value` as the alternative at
    /// position `I`.
    #[inline]
    pub fn new<I, T>(value: T) -> Self
    where
        I: Index,
        T: 'static,
        L: At<I, Output = T>,
    {
        debug_assert_eq!(L::type_id_at(I::VALUE), Some(TypeId::of::<T>()));

        Self {
            tag: I::VALUE,
            storage: StorageCell::with_value(value),
            _marker: PhantomData,
        }
    }

    /// Creates an invalid [`RawVariant`] poisoned with `reason`.
    #[inline]
    pub fn poisoned(reason: InvalidReason) -> Self {
        Self {
            tag: State::Invalid(reason).to_tag(L::LEN),
            storage: StorageCell::uninit(),
            _marker: PhantomData,
        }
    }

    /// Returns the raw tag.
    #[inline]
    pub fn tag(&self) -> usize {
        self.tag
    }

    /// Returns the decoded tag.
    #[inline]
    pub fn state(&self) -> State {
        State::from_tag(self.tag, L::LEN)
    }

    /// Returns `true` if a value is live.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.tag < L::LEN
    }

    /// Returns the [`TypeId`] of the live alternative.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        L::type_id_at(self.tag)
    }

    /// Returns the [`core::any::type_name`] of the live alternative.
    #[inline]
    pub fn type_name(&self) -> Option<&'static str> {
        L::type_name_at(self.tag)
    }

    /// Returns a reference to the live value if its type is `T`.
    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.type_id() == Some(TypeId::of::<T>()) {
            // SAFETY:
            // 1. The live value is a `T`, as checked above
            let value = unsafe { self.downcast_unchecked::<T>() };
            Some(value)
        } else {
            None
        }
    }

    /// Returns a mutable reference to the live value if its type is `T`.
    #[inline]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        if self.type_id() == Some(TypeId::of::<T>()) {
            // SAFETY:
            // 1. The live value is a `T`, as checked above
            let value = unsafe { self.downcast_unchecked_mut::<T>() };
            Some(value)
        } else {
            None
        }
    }

    /// Returns a reference to the live value as a `T` without checking the
    /// tag.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The variant is valid and its live value is a `T`.
    #[inline]
    pub unsafe fn downcast_unchecked<T: 'static>(&self) -> &T {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.type_id(), Some(TypeId::of::<T>()));

        // SAFETY:
        // 1. The storage holds an initialized `T`, guaranteed by the caller
        unsafe { self.as_erased().cast::<T>() }
    }

    /// Returns a mutable reference to the live value as a `T` without
    /// checking the tag.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The variant is valid and its live value is a `T`.
    #[inline]
    pub unsafe fn downcast_unchecked_mut<T: 'static>(&mut self) -> &mut T {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.type_id(), Some(TypeId::of::<T>()));

        // SAFETY:
        // 1. The storage holds an initialized `T`, guaranteed by the caller
        unsafe { self.as_erased_mut().cast::<T>() }
    }

    /// Returns untyped shared access to the storage.
    #[inline]
    pub fn as_erased(&self) -> ErasedRef<'_> {
        ErasedRef {
            ptr: self.storage.as_ptr(),
            _marker: PhantomData,
        }
    }

    /// Returns untyped exclusive access to the storage.
    #[inline]
    pub fn as_erased_mut(&mut self) -> ErasedMut<'_> {
        ErasedMut {
            ptr: self.storage.as_mut_ptr(),
            _marker: PhantomData,
        }
    }

    /// Moves the contents into a new [`RawVariant`].
    ///
    /// The returned variant receives this variant's tag verbatim, so a poison
    /// reason is carried over unchanged. This variant is left poisoned with
    /// [`InvalidReason::MovedFrom`], whatever its previous state.
    #[inline]
    pub fn take(&mut self) -> Self {
        let tag = self.tag;
        let storage = self.storage.relocate();
        self.tag = State::Invalid(InvalidReason::MovedFrom).to_tag(L::LEN);

        // The tag moved together with the storage, so the invariant holds for
        // the new variant exactly when it held for `self`.
        Self {
            tag,
            storage,
            _marker: PhantomData,
        }
    }

    /// Moves the live value out if its type is `T`, leaving this variant
    /// poisoned with [`InvalidReason::MovedFrom`].
    ///
    /// If the live value is not a `T`, nothing changes and `None` is
    /// returned.
    #[inline]
    pub fn take_value<T: 'static>(&mut self) -> Option<T> {
        if self.type_id() != Some(TypeId::of::<T>()) {
            return None;
        }

        self.tag = State::Invalid(InvalidReason::MovedFrom).to_tag(L::LEN);
        let ptr: NonNull<T> = self.storage.as_mut_ptr().cast::<T>();
        // SAFETY: The storage held an initialized `T`, as checked above. The
        // tag no longer names it, so it will not be read or dropped again.
        let value = unsafe { ptr.read() };
        Some(value)
    }

    /// Drops the live value, if any.
    ///
    /// Afterwards the variant is poisoned with [`InvalidReason::Unknown`]. If
    /// the destructor panics, the variant stays in that state.
    #[inline]
    pub fn destroy(&mut self) {
        let tag = self.tag;
        self.tag = State::Invalid(InvalidReason::Unknown).to_tag(L::LEN);

        if let Some(vtable) = L::vtable_at(tag) {
            // SAFETY:
            // 1. `tag` was a valid tag, so the storage holds an initialized value of
            //    the alternative at `tag`, which is the type `vtable` was created for.
            // 2. The tag no longer names the value, so it will not be used or dropped
            //    again.
            unsafe {
                vtable.drop(self.storage.as_mut_ptr());
            }
        }
    }
}

impl<L: CloneList> Clone for RawVariant<L> {
    /// Clones the live value into a new [`RawVariant`].
    ///
    /// An invalid variant is cloned by copying its tag, so the poison reason
    /// is preserved. If the live value's [`Clone`] implementation panics, the
    /// panic propagates and no value is leaked or dropped twice.
    fn clone(&self) -> Self {
        let Some(vtable) = L::clone_vtable_at(self.tag) else {
            return Self {
                tag: self.tag,
                storage: StorageCell::uninit(),
                _marker: PhantomData,
            };
        };

        // Stays invalid until the clone has been written, so unwinding out of
        // `clone_into` drops nothing
        let mut target = Self::poisoned(InvalidReason::Unknown);

        // SAFETY:
        // 1. The storage of `self` holds an initialized value of the alternative at
        //    `self.tag`, which is the type `vtable` was created for.
        // 2. `target` is empty storage for the same list of alternatives.
        unsafe {
            vtable.clone_into(self.storage.as_ptr(), target.storage.as_mut_ptr());
        }
        target.tag = self.tag;
        target
    }
}

impl<L: TypeList> Drop for RawVariant<L> {
    #[inline]
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Shared, untyped access to the storage of a [`RawVariant`].
///
/// Obtained from [`RawVariant::as_erased`]. Dispatch code that has already
/// matched the tag against a position uses [`ErasedRef::cast`] to recover
/// the typed reference.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct ErasedRef<'a> {
    /// Pointer to the start of the storage
    ptr: NonNull<Erased>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a Erased`
    _marker: PhantomData<&'a Erased>,
}

impl<'a> ErasedRef<'a> {
    /// Casts to a reference to the live value.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The storage holds an initialized `T`, that is, the variant this
    ///    reference was taken from is valid and its tag names an alternative of
    ///    type `T`.
    #[inline]
    pub unsafe fn cast<T: 'static>(self) -> &'a T {
        let ptr: NonNull<T> = self.ptr.cast::<T>();
        // SAFETY: Converting the pointer to a reference is sound because:
        // - The pointer is non-null and aligned for every alternative, since all of
        //   them live at offset zero of the storage union
        // - The pointee is an initialized `T` (guaranteed by the caller)
        // - Shared access is allowed for `'a`, as this type borrows the variant
        unsafe { ptr.as_ref() }
    }
}

/// Exclusive, untyped access to the storage of a [`RawVariant`].
///
/// Obtained from [`RawVariant::as_erased_mut`].
#[repr(transparent)]
pub struct ErasedMut<'a> {
    /// Pointer to the start of the storage
    ptr: NonNull<Erased>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a mut Erased`
    _marker: PhantomData<&'a mut Erased>,
}

impl<'a> ErasedMut<'a> {
    /// Reborrows for a shorter lifetime.
    #[inline]
    pub fn reborrow(&mut self) -> ErasedMut<'_> {
        ErasedMut {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }

    /// Casts to a mutable reference to the live value.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The storage holds an initialized `T`, that is, the variant this
    ///    reference was taken from is valid and its tag names an alternative of
    ///    type `T`.
    #[inline]
    pub unsafe fn cast<T: 'static>(self) -> &'a mut T {
        let mut ptr: NonNull<T> = self.ptr.cast::<T>();
        // SAFETY: Converting the pointer to a reference is sound because:
        // - The pointer is non-null and aligned for every alternative, since all of
        //   them live at offset zero of the storage union
        // - The pointee is an initialized `T` (guaranteed by the caller)
        // - Exclusive access is allowed for `'a`, as this type mutably borrows the
        //   variant and is consumed here
        unsafe { ptr.as_mut() }
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::type_list::{HCons, HNil, Here, There};

    type Numbers = HCons<u8, HCons<u64, HCons<[u32; 3], HNil>>>;

    #[test]
    fn test_new_sets_tag() {
        let variant = RawVariant::<Numbers>::new::<There<Here>, u64>(42);
        assert_eq!(variant.tag(), 1);
        assert_eq!(variant.state(), State::Valid(1));
        assert!(variant.is_valid());
        assert_eq!(variant.type_id(), Some(TypeId::of::<u64>()));
        assert_eq!(variant.type_name(), Some("u64"));
        assert_eq!(variant.downcast_ref::<u64>(), Some(&42));
        assert_eq!(variant.downcast_ref::<u8>(), None);
    }

    #[test]
    fn test_poisoned() {
        let variant = RawVariant::<Numbers>::poisoned(InvalidReason::CopyThrew);
        assert_eq!(variant.tag(), 3);
        assert_eq!(variant.state(), State::Invalid(InvalidReason::CopyThrew));
        assert!(!variant.is_valid());
        assert_eq!(variant.type_id(), None);
        assert_eq!(variant.type_name(), None);
        assert_eq!(variant.downcast_ref::<u8>(), None);
    }

    #[test]
    fn test_downcast_mut() {
        let mut variant = RawVariant::<Numbers>::new::<There<There<Here>>, [u32; 3]>([1, 2, 3]);
        if let Some(value) = variant.downcast_mut::<[u32; 3]>() {
            value[1] = 20;
        }
        assert_eq!(variant.downcast_ref::<[u32; 3]>(), Some(&[1, 20, 3]));
        assert!(variant.downcast_mut::<u64>().is_none());
    }

    #[test]
    fn test_take_poisons_source() {
        let mut source = RawVariant::<Numbers>::new::<Here, u8>(7);
        let target = source.take();

        assert_eq!(target.tag(), 0);
        assert_eq!(target.downcast_ref::<u8>(), Some(&7));
        assert_eq!(source.state(), State::Invalid(InvalidReason::MovedFrom));
    }

    #[test]
    fn test_take_propagates_poison() {
        let mut source = RawVariant::<Numbers>::poisoned(InvalidReason::MoveThrew);
        let target = source.take();

        assert_eq!(target.state(), State::Invalid(InvalidReason::MoveThrew));
        assert_eq!(source.state(), State::Invalid(InvalidReason::MovedFrom));
    }

    #[test]
    fn test_take_value() {
        let mut variant = RawVariant::<Numbers>::new::<There<Here>, u64>(9);
        assert_eq!(variant.take_value::<u8>(), None);
        assert!(variant.is_valid());

        assert_eq!(variant.take_value::<u64>(), Some(9));
        assert_eq!(variant.state(), State::Invalid(InvalidReason::MovedFrom));
        assert_eq!(variant.take_value::<u64>(), None);
    }

    #[test]
    fn test_clone_copies_value_and_poison() {
        let valid = RawVariant::<Numbers>::new::<There<Here>, u64>(5);
        let copy = valid.clone();
        assert_eq!(copy.tag(), valid.tag());
        assert_eq!(copy.downcast_ref::<u64>(), Some(&5));
        assert_eq!(valid.downcast_ref::<u64>(), Some(&5));

        let invalid = RawVariant::<Numbers>::poisoned(InvalidReason::MovedFrom);
        assert_eq!(invalid.clone().tag(), invalid.tag());
    }

    #[test]
    fn test_destroy_runs_destructor_once() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Counted;
        impl Drop for Counted {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::Relaxed);
            }
        }

        type List = HCons<u8, HCons<Counted, HNil>>;

        let mut variant = RawVariant::<List>::new::<There<Here>, Counted>(Counted);
        variant.destroy();
        assert_eq!(DROPS.load(Ordering::Relaxed), 1);
        assert_eq!(variant.state(), State::Invalid(InvalidReason::Unknown));

        drop(variant);
        assert_eq!(DROPS.load(Ordering::Relaxed), 1);

        let mut source = RawVariant::<List>::new::<There<Here>, Counted>(Counted);
        let target = source.take();
        drop(source);
        assert_eq!(DROPS.load(Ordering::Relaxed), 1);
        drop(target);
        assert_eq!(DROPS.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_erased_access() {
        let mut variant = RawVariant::<Numbers>::new::<Here, u8>(3);
        {
            let mut erased = variant.as_erased_mut();
            // SAFETY: The variant holds a `u8`.
            let value = unsafe { erased.reborrow().cast::<u8>() };
            *value += 1;
        }
        // SAFETY: The variant holds a `u8`.
        let value = unsafe { variant.as_erased().cast::<u8>() };
        assert_eq!(*value, 4);
    }
}
