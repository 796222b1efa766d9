//! Aggregate combinators over the chaining API.
//!
//! `resolve`, `reject`, `all`, and `race` are built entirely on the
//! settlement core and `then`; they add no new state-machine logic. The
//! once-only latch of the aggregate's own settle functions is what makes
//! "first settlement wins, the rest are inert" fall out for free.
//!
//! Input validation is deliberately asymmetric, matching the reference
//! behavior: `all` fails fast on a non-list input, `race` does not
//! validate at all (a non-list input yields a forever-pending promise).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::{callback, Promise, PromiseError, SettleFn, Value};

impl Promise {
    /// Wrap `value` in a fulfilled promise; an already-promise value is
    /// returned unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eventual::{Promise, Value};
    ///
    /// let p = Promise::resolve(Value::from(7));
    /// let same = Promise::resolve(Value::Promise(p.clone()));
    /// assert_eq!(Value::Promise(p), Value::Promise(same));
    /// ```
    pub fn resolve(value: Value) -> Promise {
        match value {
            Value::Promise(promise) => promise,
            value => Promise::new(move |resolve, _reject| {
                resolve(value);
                Ok(())
            }),
        }
    }

    /// Wrap `reason` in a rejected promise. The reason is never inspected.
    pub fn reject(reason: Value) -> Promise {
        Promise::new(move |_resolve, reject| {
            reject(reason);
            Ok(())
        })
    }

    /// Settle with all of `items`, index-ordered.
    ///
    /// Fails fast with `PromiseError::NotAList` — a synchronous usage
    /// error, not a rejection — unless `items` is a `Value::List`. An
    /// empty list fulfills next turn with an empty list. Thenable-shaped
    /// items are flattened eagerly, nested thenables included; the first
    /// rejection settles the aggregate and later settlements are inert.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eventual::{Promise, Value};
    ///
    /// let _aggregate = Promise::all(Value::List(vec![
    ///     Value::from(1),
    ///     Value::Promise(Promise::resolve(Value::from(2))),
    /// ]))
    /// .unwrap();
    ///
    /// assert!(Promise::all(Value::from("not a list")).is_err());
    /// ```
    pub fn all(items: Value) -> Result<Promise, PromiseError> {
        let items = match items {
            Value::List(items) => items,
            _ => return Err(PromiseError::NotAList),
        };

        Ok(Promise::new(move |resolve, reject| {
            if items.is_empty() {
                resolve(Value::List(Vec::new()));
                return Ok(());
            }

            let results = Rc::new(RefCell::new(vec![Value::Undefined; items.len()]));
            let remaining = Rc::new(Cell::new(items.len()));
            for (index, item) in items.into_iter().enumerate() {
                settle_slot(index, item, &results, &remaining, &resolve, &reject);
            }
            Ok(())
        }))
    }

    /// Settle with the first of `items` to settle.
    ///
    /// The aggregate's own latched settle functions are attached as the
    /// `then` handlers of every item, unconditionally. Later settlements
    /// are inert. A non-thenable item rejects the aggregate with a type
    /// error, and a non-list input is never iterated at all, leaving the
    /// aggregate forever pending — both quirks of the reference behavior,
    /// preserved.
    pub fn race(items: Value) -> Promise {
        Promise::new(move |resolve, reject| {
            let items = match items {
                Value::List(items) => items,
                _ => return Ok(()),
            };
            for item in items {
                match item {
                    Value::Promise(promise) => {
                        let resolve = resolve.clone();
                        let reject = reject.clone();
                        promise.then(
                            callback(move |value| {
                                resolve(value);
                                Ok(Value::Undefined)
                            }),
                            callback(move |reason| {
                                reject(reason);
                                Ok(Value::Undefined)
                            }),
                        );
                    }
                    Value::Thenable(thenable) => {
                        thenable.then(resolve.clone(), reject.clone())?;
                    }
                    other => {
                        return Err(Value::type_error(PromiseError::NotAThenable(format!(
                            "{other:?}"
                        ))));
                    }
                }
            }
            Ok(())
        })
    }
}

/// Per-index flattening step of `all`.
///
/// Thenable-shaped values get `(val) => settle_slot(i, val)` and the
/// shared latched reject attached as outcome handlers, so a chain of
/// thenables collapses eagerly into slot `i`. Plain values are stored;
/// the last stored slot fulfills the aggregate with the ordered results.
fn settle_slot(
    index: usize,
    item: Value,
    results: &Rc<RefCell<Vec<Value>>>,
    remaining: &Rc<Cell<usize>>,
    resolve: &SettleFn,
    reject: &SettleFn,
) {
    match item {
        Value::Promise(promise) => {
            let results = results.clone();
            let remaining = remaining.clone();
            let resolve = resolve.clone();
            let reject = reject.clone();
            let reject_out = reject.clone();
            promise.then(
                callback(move |value| {
                    settle_slot(index, value, &results, &remaining, &resolve, &reject);
                    Ok(Value::Undefined)
                }),
                callback(move |reason| {
                    reject_out(reason);
                    Ok(Value::Undefined)
                }),
            );
        }
        Value::Thenable(thenable) => {
            let on_fulfilled: SettleFn = {
                let results = results.clone();
                let remaining = remaining.clone();
                let resolve = resolve.clone();
                let reject = reject.clone();
                Rc::new(move |value| {
                    settle_slot(index, value, &results, &remaining, &resolve, &reject);
                })
            };
            if let Err(reason) = thenable.then(on_fulfilled, reject.clone()) {
                reject(reason);
            }
        }
        item => {
            results.borrow_mut()[index] = item;
            remaining.set(remaining.get() - 1);
            if remaining.get() == 0 {
                let values = results.borrow().clone();
                resolve(Value::List(values));
            }
        }
    }
}
