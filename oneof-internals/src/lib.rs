#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`oneof`].
//!
//! # Overview
//!
//! This crate contains the low-level storage, tag encoding and unsafe
//! lifecycle operations that power the [`oneof`] tagged-union library.
//!
//! **This crate is an implementation detail.** No semantic versioning guarantees
//! are provided. Users should depend on the [`oneof`] crate, not this one.
//!
//! # Architecture
//!
//! - **[`type_list`]**: The compile-time catalogue of alternatives
//!   - [`HCons`]/[`HNil`]: Cons-list of alternative types (also used for
//!     value-level lists of match arms)
//!   - [`TypeList`]: Length, storage layout and per-position type information
//!   - [`Here`]/[`There`]: Index witnesses naming a position in the list
//!
//! - **[`storage`]**: The aligned union that can hold any one alternative
//!
//! - **[`vtable`]**: Per-alternative function pointers for destruction and
//!   cloning, selected by the tag at runtime
//!
//! - **[`tag`]**: The discriminant encoding
//!   - [`InvalidReason`]: The poison reasons occupying tags `N..N+4`
//!   - [`State`]: The interpreted form of a raw tag
//!
//! - **[`raw`]**: [`RawVariant`], which ties a tag to a storage cell and
//!   implements the lifecycle transitions
//!
//! # Safety Strategy
//!
//! A [`RawVariant`] stores a value of one of its alternatives in a storage
//! cell whose static type is a union of all of them. Every operation that
//! touches the value must use the vtable or cast that belongs to the
//! alternative named by the tag.
//!
//! This crate maintains safety through:
//!
//! - **Module-based encapsulation**: The tag and storage fields are private to
//!   the [`raw`] module, so the "tag names the live value" invariant can be
//!   checked within a single file
//! - **`#[repr(C)]` unions**: Every alternative lives at offset zero of the
//!   storage, so a pointer to the storage is a valid pointer to the live value
//! - **Documented vtable contracts**: Each vtable method specifies exactly when
//!   it can be safely called
//!
//! [`oneof`]: https://docs.rs/oneof/latest/oneof/
//! [`TypeList`]: type_list::TypeList
//! [`HCons`]: type_list::HCons
//! [`HNil`]: type_list::HNil
//! [`Here`]: type_list::Here
//! [`There`]: type_list::There
//! [`InvalidReason`]: tag::InvalidReason
//! [`State`]: tag::State

mod raw;
mod storage;
pub mod tag;
pub mod type_list;
mod util;
mod vtable;

pub use self::{
    raw::{ErasedMut, ErasedRef, RawVariant},
    storage::Slot,
    tag::{InvalidReason, State},
    type_list::{Append, At, CloneList, Extend, HCons, HNil, Here, Index, Nth, There, TypeList},
};
