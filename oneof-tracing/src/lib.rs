#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Tracing events for poisoned `oneof` variants.
//!
//! A variant is poisoned silently: the failure only surfaces the next time
//! its value is read. This crate registers a [poison hook] that emits a
//! [`tracing`] event at the moment of the transition instead, so the event
//! lands inside whatever span was active when the copy or move happened.
//!
//! [poison hook]: oneof::hooks::poison
//!
//! # Quick Start
//!
//! ```
//! use oneof::{Variant, types};
//!
//! oneof_tracing::install();
//!
//! let mut variant: Variant<types![String, u32]> = Variant::new(1u32);
//! let _moved = variant.take(); // emits a DEBUG event on target `oneof::poison`
//! ```
//!
//! # Levels
//!
//! | transition                                   | level   |
//! |----------------------------------------------|---------|
//! | a clone panicked (`CopyThrew`)               | `WARN`  |
//! | `MoveThrew` or `Unknown`                     | `WARN`  |
//! | the value was moved out (`MovedFrom`)        | `DEBUG` |
//! | an existing poison was copied or moved along | `DEBUG` |
//!
//! # Environment Variables
//!
//! - `ONEOF_TRACING` - Comma-separated options:
//!   - `no-moves` - Do not emit events for values being moved out

use std::sync::{Once, OnceLock};

use oneof::{
    InvalidReason,
    hooks::poison::{PoisonEvent, PoisonHook, register_poison_hook},
};

/// The target of every event emitted by [`TracingHook`].
pub const TARGET: &str = "oneof::poison";

/// Poison hook emitting a [`tracing`] event for every poisoned variant.
///
/// # Examples
///
/// Default settings, read from the environment:
///
/// ```
/// use oneof::hooks::register_poison_hook;
/// use oneof_tracing::TracingHook;
///
/// register_poison_hook(TracingHook::new());
/// ```
///
/// Custom configuration:
///
/// ```
/// use oneof::hooks::register_poison_hook;
/// use oneof_tracing::TracingHook;
///
/// register_poison_hook(TracingHook {
///     trace_moves: false,
/// });
/// ```
#[derive(Copy, Clone, Debug)]
pub struct TracingHook {
    /// Whether to emit events when a value is moved out of a variant.
    ///
    /// Moving out is routine, so these events are logged at `DEBUG`. When
    /// `false` they are skipped entirely.
    pub trace_moves: bool,
}

#[derive(Debug)]
struct OneofTracingEnvOptions {
    no_moves: bool,
}

impl OneofTracingEnvOptions {
    fn get() -> &'static Self {
        static ONEOF_TRACING_FLAGS: OnceLock<OneofTracingEnvOptions> = OnceLock::new();

        ONEOF_TRACING_FLAGS.get_or_init(|| {
            let mut no_moves = false;

            if let Some(var) = std::env::var_os("ONEOF_TRACING") {
                for v in var.to_string_lossy().split(',') {
                    if v.trim().eq_ignore_ascii_case("no-moves") {
                        no_moves = true;
                    }
                }
            }

            OneofTracingEnvOptions { no_moves }
        })
    }
}

impl TracingHook {
    /// Creates a new [`TracingHook`] with default settings.
    ///
    /// Configuration is controlled by the `ONEOF_TRACING` environment
    /// variable, see the [crate documentation](crate).
    pub fn new() -> Self {
        let env_options = OneofTracingEnvOptions::get();

        Self {
            trace_moves: !env_options.no_moves,
        }
    }
}

impl Default for TracingHook {
    fn default() -> Self {
        Self::new()
    }
}

impl PoisonHook for TracingHook {
    fn on_poison(&self, event: &PoisonEvent) {
        let alternative = event.alternative.unwrap_or("<none>");

        if event.propagated {
            tracing::debug!(
                target: TARGET,
                variant = event.variant,
                reason = ?event.reason,
                propagated = true,
                "poisoned variant copied or moved: {}",
                event.reason
            );
            return;
        }

        match event.reason {
            InvalidReason::MovedFrom => {
                if self.trace_moves {
                    tracing::debug!(
                        target: TARGET,
                        variant = event.variant,
                        alternative,
                        reason = ?event.reason,
                        propagated = false,
                        "{}",
                        event.reason
                    );
                }
            }
            InvalidReason::CopyThrew | InvalidReason::MoveThrew | InvalidReason::Unknown => {
                tracing::warn!(
                    target: TARGET,
                    variant = event.variant,
                    alternative,
                    reason = ?event.reason,
                    propagated = false,
                    "{}",
                    event.reason
                );
            }
        }
    }
}

/// Registers a [`TracingHook`] with default settings.
///
/// Only the first call registers the hook. Returns `true` if this call did.
pub fn install() -> bool {
    static INSTALL: Once = Once::new();

    let mut installed = false;
    INSTALL.call_once(|| {
        register_poison_hook(TracingHook::new());
        installed = true;
    });
    installed
}
