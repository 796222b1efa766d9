//! The promise handle, the settlement core, and the chaining API.
//!
//! A [`Promise`] is a cheap cloneable handle onto one shared settlement
//! cell. The resolution algorithm lives here: distinguishing plain values,
//! same-type promises, and foreign thenables, and transitioning state
//! exactly once. Chaining (`then`, `catch`, `finally`) registers observer
//! records that the dispatch module replays after settlement.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::{report, scheduler};

use super::error::PromiseError;
use super::handler::{dispatch, Handler};
use super::state::PromiseState;
use super::value::{callback, Callback, Completion, SettleFn, Value};

/// An eventual value: a computation that will settle exactly once, with
/// observers attached before or after the outcome is known.
///
/// Handles are reference-counted; cloning shares the settlement cell.
/// Execution is single-threaded and cooperative — every observer callback
/// runs in a later scheduling turn, never synchronously inside `then`,
/// `resolve`, or `reject`.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use eventual::{run_microtasks, Promise, Value};
///
/// let promise = Promise::new(|resolve, _reject| {
///     resolve(Value::from("done"));
///     Ok(())
/// });
///
/// let seen = Rc::new(RefCell::new(None));
/// let slot = seen.clone();
/// promise.then_fulfilled(move |value| {
///     *slot.borrow_mut() = Some(value);
///     Ok(Value::Undefined)
/// });
///
/// // Nothing runs until the host drains the queue.
/// assert!(seen.borrow().is_none());
/// run_microtasks();
/// assert_eq!(*seen.borrow(), Some(Value::from("done")));
/// ```
pub struct Promise {
    inner: Rc<RefCell<Inner>>,
}

pub(crate) struct Inner {
    pub(crate) state: PromiseState,
    /// Fulfillment value, rejection reason, or the adopted promise.
    pub(crate) value: Option<Value>,
    /// True once at least one observer has looked at the outcome.
    pub(crate) handled: bool,
    /// Observer records; `Some` while pending, `None` once drained.
    pub(crate) deferreds: Option<Vec<Handler>>,
}

impl Clone for Promise {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Promise({})", self.state_name())
    }
}

impl Promise {
    /// Create a promise and run `executor` synchronously.
    ///
    /// The executor receives the latched settle functions; only the first
    /// call to either has effect, later calls are silently ignored. An
    /// executor that fails (`Err`) before settling rejects the promise
    /// with the failure value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eventual::{Promise, Value};
    ///
    /// let promise = Promise::new(|resolve, reject| {
    ///     resolve(Value::from(1));
    ///     reject(Value::from("ignored")); // latch already taken
    ///     Ok(())
    /// });
    /// ```
    pub fn new<F>(executor: F) -> Promise
    where
        F: FnOnce(SettleFn, SettleFn) -> Result<(), Value>,
    {
        let promise = Promise::pending();
        run_executor(&promise, executor);
        promise
    }

    pub(crate) fn pending() -> Promise {
        Promise {
            inner: Rc::new(RefCell::new(Inner {
                state: PromiseState::Pending,
                value: None,
                handled: false,
                deferreds: Some(Vec::new()),
            })),
        }
    }

    pub(crate) fn cell(&self) -> &RefCell<Inner> {
        &self.inner
    }

    /// Pointer identity of the settlement cell.
    pub(crate) fn is_same(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn state_name(&self) -> &'static str {
        self.inner.borrow().state.name()
    }

    /// Register observers and return the downstream promise.
    ///
    /// Registration is synchronous, the callbacks never are: both run in a
    /// later scheduling turn. An absent callback propagates the matching
    /// outcome to the downstream promise unchanged.
    pub fn then(&self, on_fulfilled: Option<Callback>, on_rejected: Option<Callback>) -> Promise {
        let downstream = Promise::pending();
        dispatch(
            self,
            Handler::new(on_fulfilled, on_rejected, downstream.clone()),
        );
        downstream
    }

    /// `then` with only a fulfillment callback.
    pub fn then_fulfilled<F>(&self, on_fulfilled: F) -> Promise
    where
        F: FnOnce(Value) -> Completion + 'static,
    {
        self.then(callback(on_fulfilled), None)
    }

    /// `then` with only a rejection callback.
    pub fn then_rejected<F>(&self, on_rejected: F) -> Promise
    where
        F: FnOnce(Value) -> Completion + 'static,
    {
        self.then(None, callback(on_rejected))
    }

    /// Observe the rejection path; fulfillments pass through unchanged.
    pub fn catch(&self, on_rejected: Option<Callback>) -> Promise {
        self.then(None, on_rejected)
    }

    /// Run `on_settle` on both outcomes, then re-produce the original one.
    ///
    /// `on_settle` takes no arguments; its return value is only used for
    /// sequencing (via [`Promise::resolve`]) and is otherwise discarded. A
    /// failing (`Err`) `on_settle` overrides the original outcome with its
    /// failure value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eventual::{Promise, Value};
    ///
    /// let settled = Promise::resolve(Value::from(3)).finally(|| {
    ///     // release resources here
    ///     Ok(Value::Undefined)
    /// });
    /// ```
    pub fn finally<F>(&self, on_settle: F) -> Promise
    where
        F: FnOnce() -> Completion + 'static,
    {
        // Only one of the two paths ever runs; the slot lets both borrow
        // the same FnOnce.
        let slot = Rc::new(RefCell::new(Some(on_settle)));

        let on_value = {
            let slot = slot.clone();
            callback(move |value| {
                let sequence = Promise::resolve(take_and_run(&slot)?);
                Ok(Value::Promise(
                    sequence.then_fulfilled(move |_| Ok(value)),
                ))
            })
        };
        let on_reason = callback(move |reason| {
            let sequence = Promise::resolve(take_and_run(&slot)?);
            Ok(Value::Promise(sequence.then_fulfilled(move |_| {
                Ok(Value::Promise(Promise::reject(reason)))
            })))
        });

        self.then(on_value, on_reason)
    }
}

fn take_and_run<F>(slot: &Rc<RefCell<Option<F>>>) -> Completion
where
    F: FnOnce() -> Completion,
{
    match slot.borrow_mut().take() {
        Some(on_settle) => on_settle(),
        None => Ok(Value::Undefined),
    }
}

/// Run a potentially misbehaving executor under a first-call-wins latch.
///
/// Also used for thenable assimilation: a foreign `then` is treated
/// exactly like a user executor, with a fresh latch per assimilation.
pub(crate) fn run_executor<F>(promise: &Promise, executor: F)
where
    F: FnOnce(SettleFn, SettleFn) -> Result<(), Value>,
{
    let done = Rc::new(Cell::new(false));

    let resolve: SettleFn = {
        let done = done.clone();
        let promise = promise.clone();
        Rc::new(move |value| {
            if done.replace(true) {
                return;
            }
            resolve_value(&promise, value);
        })
    };
    let reject: SettleFn = {
        let done = done.clone();
        let promise = promise.clone();
        Rc::new(move |reason| {
            if done.replace(true) {
                return;
            }
            reject_reason(&promise, reason);
        })
    };

    if let Err(reason) = executor(resolve, reject) {
        if !done.replace(true) {
            reject_reason(promise, reason);
        }
    }
}

/// The resolution algorithm.
///
/// Dispatches once on the shape of `value`: self-resolution rejects,
/// a same-type promise is adopted, a foreign thenable is assimilated
/// through a fresh latched executor run, anything else fulfills.
pub(crate) fn resolve_value(promise: &Promise, value: Value) {
    if let Value::Promise(other) = &value {
        if promise.is_same(other) {
            reject_reason(promise, Value::type_error(PromiseError::SelfResolution));
            return;
        }
    }

    match value {
        Value::Promise(adopted) => {
            {
                let mut inner = promise.cell().borrow_mut();
                inner.state = PromiseState::Adopting;
                inner.value = Some(Value::Promise(adopted));
            }
            finalize(promise);
        }
        Value::Thenable(thenable) => {
            run_executor(promise, move |resolve, reject| {
                thenable.then(resolve, reject)
            });
        }
        value => {
            {
                let mut inner = promise.cell().borrow_mut();
                inner.state = PromiseState::Fulfilled;
                inner.value = Some(value);
            }
            finalize(promise);
        }
    }
}

/// Reject without inspecting `reason`.
pub(crate) fn reject_reason(promise: &Promise, reason: Value) {
    {
        let mut inner = promise.cell().borrow_mut();
        inner.state = PromiseState::Rejected;
        inner.value = Some(reason);
    }
    finalize(promise);
}

/// Post-settlement bookkeeping: arm the unobserved-rejection probe when
/// applicable, then drain the observer list FIFO, exactly once.
fn finalize(promise: &Promise) {
    let unobserved_rejection = {
        let inner = promise.cell().borrow();
        inner.state == PromiseState::Rejected
            && inner.deferreds.as_ref().map_or(true, Vec::is_empty)
    };
    if unobserved_rejection {
        let watched = promise.clone();
        scheduler::run_later(Box::new(move || {
            let reason = {
                let inner = watched.cell().borrow();
                if inner.handled {
                    None
                } else {
                    inner.value.clone()
                }
            };
            if let Some(reason) = reason {
                report::report_unhandled(&reason);
            }
        }));
    }

    let drained = promise.cell().borrow_mut().deferreds.take();
    if let Some(handlers) = drained {
        for handler in handlers {
            dispatch(promise, handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::run_microtasks;

    fn capture(promise: &Promise) -> Rc<RefCell<Option<Completion>>> {
        let slot = Rc::new(RefCell::new(None));
        let on_value = slot.clone();
        let on_reason = slot.clone();
        promise.then(
            callback(move |value| {
                *on_value.borrow_mut() = Some(Ok(value));
                Ok(Value::Undefined)
            }),
            callback(move |reason| {
                *on_reason.borrow_mut() = Some(Err(reason));
                Ok(Value::Undefined)
            }),
        );
        slot
    }

    #[test]
    fn executor_runs_synchronously() {
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let _promise = Promise::new(move |_resolve, _reject| {
            flag.set(true);
            Ok(())
        });
        assert!(ran.get());
    }

    #[test]
    fn first_settle_call_wins() {
        let promise = Promise::new(|resolve, reject| {
            resolve(Value::from(1));
            reject(Value::from("late"));
            resolve(Value::from(2));
            Ok(())
        });
        let seen = capture(&promise);
        run_microtasks();
        assert_eq!(*seen.borrow(), Some(Ok(Value::from(1))));
    }

    #[test]
    fn failing_executor_rejects() {
        let promise = Promise::new(|_resolve, _reject| Err(Value::from("boom")));
        let seen = capture(&promise);
        run_microtasks();
        assert_eq!(*seen.borrow(), Some(Err(Value::from("boom"))));
    }

    #[test]
    fn executor_failure_after_settlement_is_absorbed() {
        let promise = Promise::new(|resolve, _reject| {
            resolve(Value::from(1));
            Err(Value::from("too late"))
        });
        let seen = capture(&promise);
        run_microtasks();
        assert_eq!(*seen.borrow(), Some(Ok(Value::from(1))));
    }

    #[test]
    fn observers_never_run_synchronously() {
        let promise = Promise::resolve(Value::from(9));
        let seen = capture(&promise);
        assert!(seen.borrow().is_none());
        run_microtasks();
        assert_eq!(*seen.borrow(), Some(Ok(Value::from(9))));
    }

    #[test]
    fn self_resolution_rejects_with_type_error() {
        let handle = Rc::new(RefCell::new(None::<SettleFn>));
        let stash = handle.clone();
        let promise = Promise::new(move |resolve, _reject| {
            *stash.borrow_mut() = Some(resolve);
            Ok(())
        });
        let resolve = handle.borrow_mut().take();
        if let Some(resolve) = resolve {
            resolve(Value::Promise(promise.clone()));
        }

        let seen = capture(&promise);
        run_microtasks();
        assert_eq!(
            *seen.borrow(),
            Some(Err(Value::type_error(PromiseError::SelfResolution)))
        );
    }

    #[test]
    fn adoption_is_transparent() {
        let upstream = Promise::resolve(Value::from("inner"));
        let adopting = Promise::new(move |resolve, _reject| {
            resolve(Value::Promise(upstream));
            Ok(())
        });
        let seen = capture(&adopting);
        run_microtasks();
        assert_eq!(*seen.borrow(), Some(Ok(Value::from("inner"))));
    }

    #[test]
    fn observers_drain_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let promise = Promise::resolve(Value::Undefined);
        for label in 0..4i64 {
            let order = order.clone();
            promise.then_fulfilled(move |_| {
                order.borrow_mut().push(label);
                Ok(Value::Undefined)
            });
        }
        run_microtasks();
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn finally_preserves_fulfillment_value() {
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let promise = Promise::resolve(Value::from(5)).finally(move || {
            flag.set(true);
            Ok(Value::from("discarded"))
        });
        let seen = capture(&promise);
        run_microtasks();
        assert!(ran.get());
        assert_eq!(*seen.borrow(), Some(Ok(Value::from(5))));
    }

    #[test]
    fn finally_failure_overrides_outcome() {
        let promise =
            Promise::resolve(Value::from(5)).finally(|| Err(Value::from("cleanup failed")));
        let seen = capture(&promise);
        run_microtasks();
        assert_eq!(*seen.borrow(), Some(Err(Value::from("cleanup failed"))));
    }
}
