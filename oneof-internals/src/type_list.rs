//! Compile-time catalogue of the alternatives of a variant.
//!
//! A list of alternatives is a cons-list of types, `HCons<A, HCons<B,
//! HNil>>`, usually spelled with the `types!` macro of the `oneof` crate. The
//! list is never instantiated; it only carries type information:
//!
//! - [`TypeList::LEN`]: the number of alternatives `N`
//! - [`TypeList::Storage`]: a union large and aligned enough for every
//!   alternative
//! - [`TypeList::index_of`]: the position of a type, first occurrence wins
//! - [`At`]/[`Nth`]: the type at a position given as an [`Index`] witness
//!
//! The same [`HCons`]/[`HNil`] pair is used at the value level for lists of
//! match arms, which is why [`HCons`] has public fields.

use core::{any::TypeId, marker::PhantomData};

use crate::{
    storage::Slot,
    vtable::{AlternativeVtable, CloneVtable},
};

/// The empty list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HNil;

/// A non-empty list with head `H` and tail `T`.
///
/// As a type list, `HCons<H, T>` declares `H` as the alternative at the
/// current position. As a value, it holds one element per position, for
/// example one match arm per alternative.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HCons<H, T> {
    /// The element at the current position
    pub head: H,
    /// The remaining elements
    pub tail: T,
}

/// A type-level position inside a [`TypeList`].
///
/// Positions are Peano numbers: [`Here`] is zero and [`There<I>`] is one more
/// than `I`. They are inferred by the compiler when resolving which
/// alternative a value belongs to.
pub trait Index: 'static {
    /// The numeric value of this position.
    const VALUE: usize;
}

/// The first position of a list.
#[derive(Copy, Clone, Debug)]
pub enum Here {}

/// The position after `I`.
pub struct There<I>(PhantomData<I>);

impl Index for Here {
    const VALUE: usize = 0;
}

impl<I: Index> Index for There<I> {
    const VALUE: usize = 1 + I::VALUE;
}

/// Compile-time list of alternative types.
///
/// Implemented for [`HNil`] and for [`HCons<H, T>`] when `H: 'static` and `T`
/// is itself a list. The trait cannot be implemented outside of this crate,
/// since [`TypeList::vtable_at`] returns a type that cannot be named.
pub trait TypeList: 'static + Sized {
    /// The number of alternatives.
    const LEN: usize;

    /// Storage with the maximum size and alignment of all alternatives.
    ///
    /// Every alternative lives at offset zero of this type.
    type Storage;

    /// Returns the vtable of the alternative at `index`, or `None` if
    /// `index >= LEN`.
    #[doc(hidden)]
    fn vtable_at(index: usize) -> Option<&'static AlternativeVtable>;

    /// Returns the [`TypeId`] of the alternative at `index`.
    #[inline]
    fn type_id_at(index: usize) -> Option<TypeId> {
        Some(Self::vtable_at(index)?.type_id())
    }

    /// Returns the [`core::any::type_name`] of the alternative at `index`.
    #[inline]
    fn type_name_at(index: usize) -> Option<&'static str> {
        Some(Self::vtable_at(index)?.type_name())
    }

    /// Returns the position of `T` in the list.
    ///
    /// If `T` is declared more than once, the first position is returned.
    #[inline]
    fn index_of<T: 'static>() -> Option<usize> {
        let wanted = TypeId::of::<T>();
        (0..Self::LEN).find(|&index| Self::type_id_at(index) == Some(wanted))
    }
}

impl TypeList for HNil {
    const LEN: usize = 0;

    type Storage = ();

    #[inline]
    fn vtable_at(_index: usize) -> Option<&'static AlternativeVtable> {
        None
    }
}

impl<H: 'static, T: TypeList> TypeList for HCons<H, T> {
    const LEN: usize = 1 + T::LEN;

    type Storage = Slot<H, T::Storage>;

    #[inline]
    fn vtable_at(index: usize) -> Option<&'static AlternativeVtable> {
        match index {
            0 => Some(AlternativeVtable::new::<H>()),
            _ => T::vtable_at(index - 1),
        }
    }
}

/// A [`TypeList`] whose alternatives all implement [`Clone`].
pub trait CloneList: TypeList {
    /// Returns the clone vtable of the alternative at `index`.
    #[doc(hidden)]
    fn clone_vtable_at(index: usize) -> Option<&'static CloneVtable>;
}

impl CloneList for HNil {
    #[inline]
    fn clone_vtable_at(_index: usize) -> Option<&'static CloneVtable> {
        None
    }
}

impl<H: 'static + Clone, T: CloneList> CloneList for HCons<H, T> {
    #[inline]
    fn clone_vtable_at(index: usize) -> Option<&'static CloneVtable> {
        match index {
            0 => Some(CloneVtable::new::<H>()),
            _ => T::clone_vtable_at(index - 1),
        }
    }
}

/// Looks up the type at position `I`.
pub trait At<I: Index>: TypeList {
    /// The alternative at position `I`.
    type Output: 'static;
}

impl<H: 'static, T: TypeList> At<Here> for HCons<H, T> {
    type Output = H;
}

impl<H: 'static, T: At<I>, I: Index> At<There<I>> for HCons<H, T> {
    type Output = T::Output;
}

/// The alternative of `L` at position `I`.
pub type Nth<L, I> = <L as At<I>>::Output;

/// Appends an alternative at the end of a list.
pub trait Append<U>: TypeList {
    /// The list with `U` appended.
    type Output: TypeList;
}

impl<U: 'static> Append<U> for HNil {
    type Output = HCons<U, HNil>;
}

impl<H: 'static, T: Append<U>, U> Append<U> for HCons<H, T> {
    type Output = HCons<H, T::Output>;
}

/// The list `L` with `U` appended as its last alternative.
pub type Extend<L, U> = <L as Append<U>>::Output;
