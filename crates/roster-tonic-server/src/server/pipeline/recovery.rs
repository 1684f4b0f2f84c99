//! Panic containment for the whole chain.

use super::{Call, CallResult, Next, Stage};
use futures::{FutureExt, future::BoxFuture};
use roster_tonic_core::roster::INTERNAL_MESSAGE;
use std::{
    any::Any,
    backtrace::Backtrace,
    cell::RefCell,
    panic::{self, AssertUnwindSafe},
    sync::Once,
};
use tonic::Status;

thread_local! {
    // Backtrace of the most recent panic on this thread, taken by the hook.
    static LAST_PANIC: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Proof that the backtrace hook is in place.
#[derive(Clone, Copy, Debug)]
struct HookInstalled;

/// Chains a hook in front of the current one that remembers where the panic
/// happened. By the time the unwind reaches [`Recovery`] the panicking
/// frames are gone, so the backtrace has to be taken here.
fn install_backtrace_hook() -> HookInstalled {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(Backtrace::force_capture()));
            previous(info);
        }));
    });
    HookInstalled
}

fn take_backtrace() -> Option<Backtrace> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Outermost stage: a panic anywhere below becomes `Internal` with the
/// generic message, and is logged with method, payload and backtrace.
#[derive(Debug)]
pub struct Recovery {
    _hook: HookInstalled,
}

impl Recovery {
    /// Installs the process-wide backtrace hook on first use.
    pub fn new() -> Self {
        Self {
            _hook: install_backtrace_hook(),
        }
    }
}

impl Default for Recovery {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Recovery {
    fn handle<'a, R: Send + 'a>(
        &'a self,
        call: Call,
        next: Next<'a, R>,
    ) -> BoxFuture<'a, CallResult<R>> {
        let method = call.method();
        // `next.run` is inside the guarded future so that a panic while
        // building the inner futures is caught too.
        let guarded = AssertUnwindSafe(async move { next.run(call).await }).catch_unwind();

        Box::pin(async move {
            match guarded.await {
                Ok(result) => result,
                Err(payload) => {
                    let backtrace = take_backtrace()
                        .map_or_else(|| "<unavailable>".to_owned(), |bt| bt.to_string());
                    tracing::error!(
                        method,
                        panic = %panic_message(payload.as_ref()),
                        %backtrace,
                        "panic recovered"
                    );
                    Err(Status::internal(INTERNAL_MESSAGE))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_captures_backtrace_at_panic_site() {
        let _recovery = Recovery::new();
        let _ = take_backtrace();

        let payload = panic::catch_unwind(|| panic!("boom")).unwrap_err();

        assert_eq!(panic_message(payload.as_ref()), "boom");
        assert!(take_backtrace().is_some());
        assert!(take_backtrace().is_none());
    }

    #[test]
    fn non_string_payload() {
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
