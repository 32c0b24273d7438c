//! Hooks called whenever a variant becomes poisoned.
//!
//! Poisoning is silent at the point where it happens: cloning a variant whose
//! value panics, or taking the value out of a variant, does not return an
//! error. Poison hooks make those transitions observable, for instance to log
//! them.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use oneof::{
//!     Variant,
//!     hooks::poison::{PoisonEvent, PoisonHook, register_poison_hook},
//!     types,
//! };
//!
//! struct CountingHook {
//!     count: AtomicUsize,
//! }
//!
//! impl PoisonHook for CountingHook {
//!     fn on_poison(&self, event: &PoisonEvent) {
//!         self.count.fetch_add(1, Ordering::Relaxed);
//!         println!("{event}");
//!     }
//! }
//!
//! register_poison_hook(CountingHook {
//!     count: AtomicUsize::new(0),
//! });
//!
//! let mut variant: Variant<types![String, u32]> = Variant::new(1u32);
//! let _moved = variant.take();
//! ```

use alloc::vec::Vec;
use core::{fmt, panic::Location};

use triomphe::Arc;
use unsize::CoerceUnsize;

use crate::{InvalidReason, hooks::hook_lock::HookLock};

type HookSet = Vec<Arc<dyn UntypedPoisonHook>>;

static HOOKS: HookLock<HookSet> = HookLock::new(Vec::new());

/// A transition of a variant into a poisoned state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoisonEvent {
    /// The reason the variant now holds
    pub reason: InvalidReason,
    /// [`core::any::type_name`] of the poisoned variant
    pub variant: &'static str,
    /// [`core::any::type_name`] of the alternative that was live when the
    /// transition happened, if any
    pub alternative: Option<&'static str>,
    /// `true` if the reason was copied from another poisoned variant rather
    /// than caused by a new failure
    pub propagated: bool,
}

impl fmt::Display for PoisonEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.propagated {
            write!(f, "{} (propagated): {}", self.variant, self.reason)
        } else if let Some(alternative) = self.alternative {
            write!(
                f,
                "{} holding {}: {}",
                self.variant, alternative, self.reason
            )
        } else {
            write!(f, "{}: {}", self.variant, self.reason)
        }
    }
}

/// A hook that is called whenever a variant becomes poisoned.
///
/// Hooks run synchronously on the thread that poisoned the variant, so they
/// should be fast. They run in registration order.
pub trait PoisonHook: 'static + Send + Sync {
    /// Called after a variant has been poisoned.
    fn on_poison(&self, event: &PoisonEvent);
}

trait UntypedPoisonHook: 'static + Send + Sync + fmt::Display {
    fn on_poison(&self, event: &PoisonEvent);
}

struct Hook<H> {
    hook: H,
    added_at: &'static Location<'static>,
}

impl<H> fmt::Display for Hook<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Poison hook {} registered at {}:{}",
            core::any::type_name::<H>(),
            self.added_at.file(),
            self.added_at.line()
        )
    }
}

impl<H: PoisonHook> UntypedPoisonHook for Hook<H> {
    #[inline]
    fn on_poison(&self, event: &PoisonEvent) {
        self.hook.on_poison(event);
    }
}

/// Registers a hook that will be called whenever a variant is poisoned.
///
/// Hooks cannot be unregistered. Registering the same hook type twice calls
/// it twice.
#[track_caller]
pub fn register_poison_hook<H>(hook: H)
where
    H: PoisonHook,
{
    let hook: Hook<H> = Hook {
        hook,
        added_at: Location::caller(),
    };
    let hook: Arc<Hook<H>> = Arc::new(hook);
    let hook = hook.unsize(unsize::Coercion!(to dyn UntypedPoisonHook));

    HOOKS.write().push(hook);
}

/// Calls `f` with a description of every registered poison hook.
pub fn debug_poison_hooks(mut f: impl FnMut(&dyn fmt::Display)) {
    for hook in HOOKS.read().iter() {
        f(hook);
    }
}

/// Runs every registered hook for `event`.
///
/// The hooks are called outside the lock, so a hook may register further
/// hooks or poison other variants.
pub(crate) fn notify(event: PoisonEvent) {
    let hooks: HookSet = {
        let guard = HOOKS.read();
        if guard.is_empty() {
            return;
        }
        guard.clone()
    };

    for hook in &hooks {
        hook.on_poison(&event);
    }
}
