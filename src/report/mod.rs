//! Unhandled-rejection reporting.
//!
//! Purely observational: when a promise settles to failure and, after one
//! scheduling turn, still has no observer, the current hook is invoked
//! with the rejection reason. The default hook writes one diagnostic line
//! to stderr. Like the scheduler, the hook is per-thread configuration,
//! overridable at runtime.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::Value;

thread_local! {
    static HOOK: RefCell<Option<Rc<dyn Fn(&Value)>>> = RefCell::new(None);
}

/// Invoke the current hook with an unobserved rejection reason.
pub(crate) fn report_unhandled(reason: &Value) {
    let hook = HOOK.with(|hook| hook.borrow().clone());
    match hook {
        Some(hook) => hook(reason),
        None => eprintln!("possible unhandled promise rejection: {reason:?}"),
    }
}

/// Replace the diagnostic hook for this thread.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use eventual::{run_microtasks, set_unhandled_rejection_hook, Promise, Value};
///
/// let reports = Rc::new(Cell::new(0));
/// let counter = reports.clone();
/// set_unhandled_rejection_hook(move |_reason| counter.set(counter.get() + 1));
///
/// Promise::reject(Value::from("nobody listens"));
/// run_microtasks();
/// assert_eq!(reports.get(), 1);
/// ```
pub fn set_unhandled_rejection_hook<F>(hook: F)
where
    F: Fn(&Value) + 'static,
{
    HOOK.with(|slot| {
        *slot.borrow_mut() = Some(Rc::new(hook));
    });
}

/// Restore the default stderr hook.
pub fn reset_unhandled_rejection_hook() {
    HOOK.with(|slot| {
        *slot.borrow_mut() = None;
    });
}
