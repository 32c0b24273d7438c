//! The storage cell that holds the live alternative.
//!
//! [`TypeList::Storage`] is a nest of [`Slot`] unions, one level per
//! alternative. Because every [`Slot`] is `#[repr(C)]`, all of its fields
//! start at offset zero, so the nest has the size of the largest alternative
//! (rounded up to the largest alignment) and a pointer to it is a valid
//! pointer to whichever alternative was written there.
//!
//! [`StorageCell`] wraps the nest in [`MaybeUninit`], since the cell is
//! uninitialized whenever the variant is invalid.
//!
//! [`TypeList::Storage`]: crate::TypeList::Storage

use core::{
    mem::{ManuallyDrop, MaybeUninit},
    ptr::NonNull,
};

use crate::util::Erased;

/// One level of the storage union: room for either `H` or the remaining
/// alternatives `T`.
///
/// The fields are never accessed by name; the union only exists to give the
/// storage the right layout.
#[repr(C)]
#[allow(dead_code, reason = "only used for its layout")]
pub union Slot<H, T> {
    /// Room for the alternative at this position
    head: ManuallyDrop<H>,
    /// Room for the alternatives at later positions
    tail: ManuallyDrop<T>,
}

/// Memory region sized and aligned for the union `S`, holding at most one
/// value.
///
/// The cell never drops its contents; the owner decides from its tag whether
/// a value is live and which vtable to use for it.
#[repr(transparent)]
pub(crate) struct StorageCell<S> {
    /// The possibly-uninitialized union
    bytes: MaybeUninit<S>,
}

impl<S> StorageCell<S> {
    /// Creates an empty cell.
    #[inline]
    pub(crate) const fn uninit() -> Self {
        Self {
            bytes: MaybeUninit::uninit(),
        }
    }

    /// Creates a cell holding `value`.
    ///
    /// Fails to compile if `T` does not fit in `S`, which cannot happen when
    /// `T` is one of the alternatives `S` was built from.
    #[inline]
    pub(crate) fn with_value<T>(value: T) -> Self {
        const {
            assert!(size_of::<T>() <= size_of::<S>());
            assert!(align_of::<T>() <= align_of::<S>());
        }

        let mut cell = Self::uninit();
        let ptr: *mut T = cell.bytes.as_mut_ptr().cast::<T>();
        // SAFETY: `ptr` points to the start of `bytes`, which is valid for
        // writes of `size_of::<S>()` bytes with alignment `align_of::<S>()`.
        // The const assertions above guarantee that this is enough room and
        // alignment for a `T`.
        unsafe {
            ptr.write(value);
        }
        cell
    }

    /// Returns an erased pointer to the start of the cell.
    #[inline]
    pub(crate) fn as_ptr(&self) -> NonNull<Erased> {
        NonNull::from(&self.bytes).cast::<Erased>()
    }

    /// Returns an erased pointer to the start of the cell that may be used for
    /// writes.
    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> NonNull<Erased> {
        NonNull::from(&mut self.bytes).cast::<Erased>()
    }

    /// Moves the contents out of this cell into a new one, bit for bit.
    ///
    /// Afterwards `self` must be treated as empty by its owner; the returned
    /// cell holds whatever `self` held.
    #[inline]
    pub(crate) fn relocate(&mut self) -> Self {
        // SAFETY: Reading a `MaybeUninit<S>` is always valid, even when it is
        // uninitialized. Ownership of a live value moves to the returned cell;
        // the caller stops treating `self` as holding one.
        let bytes = unsafe { core::ptr::read(&self.bytes) };
        Self { bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_list::{HCons, HNil, TypeList};

    #[repr(align(32))]
    struct LargeAlignment {
        _value: u8,
    }

    type Mixed = HCons<u8, HCons<[u16; 5], HCons<LargeAlignment, HNil>>>;
    type Cell = StorageCell<<Mixed as TypeList>::Storage>;

    #[test]
    fn test_storage_layout() {
        assert_eq!(align_of::<Cell>(), 32);
        assert_eq!(size_of::<Cell>(), 32);
        assert_eq!(
            size_of::<StorageCell<<HCons<u64, HNil> as TypeList>::Storage>>(),
            8
        );
        assert_eq!(size_of::<StorageCell<<HNil as TypeList>::Storage>>(), 0);
    }

    #[test]
    fn test_cell_is_aligned_for_every_alternative() {
        let cell = Cell::with_value(LargeAlignment { _value: 1 });
        assert_eq!(cell.as_ptr().as_ptr() as usize % 32, 0);
        assert_eq!(cell.as_ptr(), NonNull::from(&cell).cast::<Erased>());
    }

    #[test]
    fn test_with_value_and_relocate() {
        let mut cell = Cell::with_value([7u16, 8, 9, 10, 11]);
        let moved = cell.relocate();
        // SAFETY: `moved` holds the `[u16; 5]` written above.
        let value = unsafe { moved.as_ptr().cast::<[u16; 5]>().read() };
        assert_eq!(value, [7, 8, 9, 10, 11]);
    }
}
