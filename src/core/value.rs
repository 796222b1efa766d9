//! The dynamic value domain promises carry.
//!
//! The reference model is dynamically typed; here the dynamic domain is an
//! explicit tagged union dispatched once per resolution:
//!
//! - plain structured data (`Undefined`, `Data`, `List`, `Error`)
//! - a same-type [`Promise`], eligible for adoption
//! - a foreign [`Thenable`], assimilated through its `then`
//!
//! Rejection reasons are `Value`s too and are never inspected by the
//! machinery.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::error::PromiseError;
use super::promise::Promise;

/// A settle function handed to executors and foreign thenables.
///
/// Calling it settles the promise under construction, subject to a
/// first-call-wins latch shared with its counterpart. Repeat calls are
/// silently ignored.
pub type SettleFn = Rc<dyn Fn(Value)>;

/// The result of running an observer callback or a `finally` handler.
///
/// `Ok` is the returned value; `Err` is the Rust expression of a thrown
/// one. A thrown value rejects the downstream promise.
pub type Completion = Result<Value, Value>;

/// A boxed observer callback, run at most once in a later scheduling turn.
pub type Callback = Box<dyn FnOnce(Value) -> Completion>;

/// Box a closure as an observer callback for [`Promise::then`].
///
/// # Example
///
/// ```rust
/// use eventual::{callback, Promise, Value};
///
/// let _chained = Promise::resolve(Value::from("ready"))
///     .then(callback(|value| Ok(value)), None);
/// ```
pub fn callback<F>(f: F) -> Option<Callback>
where
    F: FnOnce(Value) -> Completion + 'static,
{
    Some(Box::new(f))
}

/// The interoperability contract: anything exposing this shape is treated
/// as promise-compatible, regardless of concrete type.
///
/// `then` receives the latched settle functions of the promise assimilating
/// this value. Returning `Err` is the thenable "throwing"; the reason
/// rejects the assimilating promise unless it already settled.
pub trait Thenable {
    fn then(&self, on_fulfilled: SettleFn, on_rejected: SettleFn) -> Result<(), Value>;
}

/// A value flowing through a promise chain.
///
/// `Data` holds arbitrary structured host data as [`serde_json::Value`];
/// any serializable type enters via [`Value::from_serializable`]. `List`
/// is kept separate from `Data` arrays so sequence items can themselves be
/// promises or thenables, which is what the aggregate combinators consume.
#[derive(Clone)]
pub enum Value {
    /// Absent or meaningless payload.
    Undefined,
    /// Plain structured data.
    Data(serde_json::Value),
    /// Ordered sequence; items may be promises or thenables.
    List(Vec<Value>),
    /// A promise of this same type (adoption candidate).
    Promise(Promise),
    /// A foreign object exposing a callable `then`.
    Thenable(Rc<dyn Thenable>),
    /// An error produced by the promise machinery itself.
    Error(Rc<PromiseError>),
}

impl Value {
    /// Convert any serializable host value into `Value::Data`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eventual::Value;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Job {
    ///     id: u32,
    /// }
    ///
    /// let value = Value::from_serializable(&Job { id: 7 }).unwrap();
    /// assert_eq!(value, Value::Data(serde_json::json!({ "id": 7 })));
    /// ```
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Value::Data(serde_json::to_value(value)?))
    }

    /// Wrap a machinery error as a rejection reason.
    pub fn type_error(error: PromiseError) -> Self {
        Value::Error(Rc::new(error))
    }

    /// Check whether this value exposes a `then` to attach observers to.
    pub fn is_thenable_shaped(&self) -> bool {
        matches!(self, Value::Promise(_) | Value::Thenable(_))
    }

    /// Borrow the inner JSON data, if this is a `Data` value.
    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Data(data) => Some(data),
            _ => None,
        }
    }

    /// Borrow the inner sequence, if this is a `List` value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Data(data) => write!(f, "{data}"),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Promise(promise) => write!(f, "Promise({})", promise.state_name()),
            Value::Thenable(_) => write!(f, "<thenable>"),
            Value::Error(error) => write!(f, "{error}"),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality for data, pointer identity for promises and
    /// thenables.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Promise(a), Value::Promise(b)) => a.is_same(b),
            (Value::Thenable(a), Value::Thenable(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(data: serde_json::Value) -> Self {
        Value::Data(data)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Data(serde_json::Value::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Data(serde_json::Value::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Data(serde_json::Value::from(b))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Data(serde_json::Value::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Data(serde_json::Value::from(s))
    }
}

impl From<Promise> for Value {
    fn from(promise: Promise) -> Self {
        Value::Promise(promise)
    }
}
