//! Hooks for observing variants as they become poisoned.
//!
//! # Quick Start
//!
//! ```rust
//! use oneof::hooks::poison::{PoisonEvent, PoisonHook, register_poison_hook};
//!
//! struct PrintHook;
//!
//! impl PoisonHook for PrintHook {
//!     fn on_poison(&self, event: &PoisonEvent) {
//!         eprintln!("poisoned: {event}");
//!     }
//! }
//!
//! register_poison_hook(PrintHook);
//! ```
//!
//! # When to Use Hooks
//!
//! A variant is poisoned without any error being returned at that point. The
//! poison only surfaces the next time the value is read. Use hooks to learn
//! about it earlier, typically to log it. The [`oneof-tracing`] crate
//! provides a ready-made hook emitting `tracing` events.
//!
//! To check a single variant, use [`Variant::state`] instead.
//!
//! [`oneof-tracing`]: https://docs.rs/oneof-tracing
//! [`Variant::state`]: crate::Variant::state
//!
//! # Hook Types
//!
//! - **[`poison`]**: Called on every transition into a poisoned state
//!
//! Hooks are global. They are stored behind a read-mostly lock, which is
//! `std::sync::RwLock` with the `std` feature and a spin lock without it.

pub mod poison;

mod hook_lock;

pub use self::poison::{PoisonEvent, PoisonHook, register_poison_hook};
