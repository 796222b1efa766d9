//! Observer records and their dispatch.
//!
//! One [`Handler`] exists per chaining call. Dispatch either parks it on a
//! still-pending promise or schedules one turn that runs the matching
//! callback and settles the handler's downstream promise with the result.

use crate::scheduler;

use super::promise::{reject_reason, resolve_value, Promise};
use super::state::PromiseState;
use super::value::{Callback, Value};

/// The record pairing one chaining call's optional callbacks with the
/// downstream promise that represents their composed result.
pub(crate) struct Handler {
    pub(crate) on_fulfilled: Option<Callback>,
    pub(crate) on_rejected: Option<Callback>,
    pub(crate) downstream: Promise,
}

impl Handler {
    pub(crate) fn new(
        on_fulfilled: Option<Callback>,
        on_rejected: Option<Callback>,
        downstream: Promise,
    ) -> Self {
        Self {
            on_fulfilled,
            on_rejected,
            downstream,
        }
    }
}

/// Route one observer record against a promise.
///
/// Adoption links are followed first. A still-pending target parks the
/// record in its observer list; a settled target marks itself handled and
/// schedules the callback turn. Callbacks never run synchronously here.
pub(crate) fn dispatch(promise: &Promise, handler: Handler) {
    let target = follow_adoptions(promise);

    let (fulfilled, value) = {
        let mut inner = target.cell().borrow_mut();
        match inner.state {
            PromiseState::Pending => {
                if let Some(deferreds) = inner.deferreds.as_mut() {
                    deferreds.push(handler);
                }
                return;
            }
            state => {
                inner.handled = true;
                (
                    state == PromiseState::Fulfilled,
                    inner.value.clone().unwrap_or(Value::Undefined),
                )
            }
        }
    };

    scheduler::run_later(Box::new(move || run_handler(fulfilled, value, handler)));
}

/// Follow `Adopting` links to the promise that owns the real outcome.
///
/// Cycles cannot form: a promise is rejected at resolution time if it
/// would adopt itself.
fn follow_adoptions(promise: &Promise) -> Promise {
    let mut target = promise.clone();
    loop {
        let adopted = {
            let inner = target.cell().borrow();
            match (&inner.state, &inner.value) {
                (PromiseState::Adopting, Some(Value::Promise(adopted))) => Some(adopted.clone()),
                _ => None,
            }
        };
        match adopted {
            Some(next) => target = next,
            None => return target,
        }
    }
}

/// Run inside one scheduling turn: invoke the matching callback, or
/// propagate the outcome untouched when it is absent.
fn run_handler(fulfilled: bool, value: Value, handler: Handler) {
    let Handler {
        on_fulfilled,
        on_rejected,
        downstream,
    } = handler;

    let callback = if fulfilled { on_fulfilled } else { on_rejected };
    match callback {
        None => {
            // No matching callback: the outcome passes through the chain
            // unchanged. This is how rejections cross `then(f)` links.
            if fulfilled {
                resolve_value(&downstream, value);
            } else {
                reject_reason(&downstream, value);
            }
        }
        Some(callback) => match callback(value) {
            Ok(returned) => resolve_value(&downstream, returned),
            Err(thrown) => reject_reason(&downstream, thrown),
        },
    }
}
