//! The scheduling primitive: "run later, after the current synchronous
//! work, before further I/O".
//!
//! Every observer callback and propagation step goes through
//! [`run_later`]. The default route is a thread-local FIFO microtask
//! queue that the embedding host drains explicitly; hosts with a real
//! execution loop inject their own primitive via [`set_scheduler`].
//! Execution is single-threaded and cooperative throughout, so the
//! configuration is per-thread state, overridable at runtime.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A queued zero-argument job, run once in a later scheduling turn.
pub type Job = Box<dyn FnOnce()>;

enum Route {
    /// Default: the crate's own drainable FIFO queue.
    Queue(VecDeque<Job>),
    /// Injected host primitive; every job is handed straight to it.
    Host(Rc<dyn Fn(Job)>),
}

thread_local! {
    static SCHEDULER: RefCell<Route> = RefCell::new(Route::Queue(VecDeque::new()));
}

/// Queue `job` for a later, discrete scheduling turn.
///
/// Never runs `job` synchronously.
pub fn run_later(job: Job) {
    let handed_off = SCHEDULER.with(|route| {
        let mut route = route.borrow_mut();
        match &mut *route {
            Route::Queue(queue) => {
                queue.push_back(job);
                None
            }
            // The hook runs outside the borrow: it may call run_later.
            Route::Host(hook) => Some((Rc::clone(hook), job)),
        }
    });
    if let Some((hook, job)) = handed_off {
        hook(job);
    }
}

/// Run queued jobs, including jobs they enqueue, until the queue is idle.
///
/// No-op when the queue is empty or a host scheduler is installed.
///
/// # Example
///
/// ```rust
/// use eventual::{run_microtasks, Promise, Value};
///
/// let promise = Promise::resolve(Value::from(1)).then_fulfilled(|v| Ok(v));
/// run_microtasks(); // drives the chain to completion
/// ```
pub fn run_microtasks() {
    while let Some(job) = pop_front() {
        job();
    }
}

/// Run exactly one scheduling turn: the jobs queued at entry, and nothing
/// queued by those jobs. Returns how many jobs ran.
pub fn run_one_turn() -> usize {
    let batch: Vec<Job> = SCHEDULER.with(|route| match &mut *route.borrow_mut() {
        Route::Queue(queue) => queue.drain(..).collect(),
        Route::Host(_) => Vec::new(),
    });
    let count = batch.len();
    for job in batch {
        job();
    }
    count
}

/// Number of jobs currently waiting in the default queue.
pub fn pending_jobs() -> usize {
    SCHEDULER.with(|route| match &*route.borrow() {
        Route::Queue(queue) => queue.len(),
        Route::Host(_) => 0,
    })
}

/// Route all subsequent jobs to the host's own scheduling primitive.
///
/// Jobs already waiting in the default queue are forwarded to `hook` in
/// order, so no scheduled work is lost across the switch.
pub fn set_scheduler<F>(hook: F)
where
    F: Fn(Job) + 'static,
{
    let pending = SCHEDULER.with(|route| {
        let mut route = route.borrow_mut();
        let pending: Vec<Job> = match &mut *route {
            Route::Queue(queue) => queue.drain(..).collect(),
            Route::Host(_) => Vec::new(),
        };
        *route = Route::Host(Rc::new(hook));
        pending
    });
    for job in pending {
        run_later(job);
    }
}

/// Restore the default drainable queue, discarding any installed host
/// primitive.
pub fn reset_scheduler() {
    SCHEDULER.with(|route| {
        *route.borrow_mut() = Route::Queue(VecDeque::new());
    });
}

fn pop_front() -> Option<Job> {
    SCHEDULER.with(|route| match &mut *route.borrow_mut() {
        Route::Queue(queue) => queue.pop_front(),
        Route::Host(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn jobs_run_in_fifo_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in 0..3i64 {
            let order = order.clone();
            run_later(Box::new(move || order.borrow_mut().push(label)));
        }
        run_microtasks();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn jobs_enqueued_by_jobs_run_in_the_same_drain() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let outer = order.clone();
        run_later(Box::new(move || {
            outer.borrow_mut().push("first");
            let inner = outer.clone();
            run_later(Box::new(move || inner.borrow_mut().push("second")));
        }));
        run_microtasks();
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn one_turn_excludes_jobs_queued_during_it() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let outer = order.clone();
        run_later(Box::new(move || {
            outer.borrow_mut().push("turn one");
            let inner = outer.clone();
            run_later(Box::new(move || inner.borrow_mut().push("turn two")));
        }));

        assert_eq!(run_one_turn(), 1);
        assert_eq!(*order.borrow(), vec!["turn one"]);
        assert_eq!(pending_jobs(), 1);

        assert_eq!(run_one_turn(), 1);
        assert_eq!(*order.borrow(), vec!["turn one", "turn two"]);
    }

    #[test]
    fn draining_an_empty_queue_is_a_noop() {
        run_microtasks();
        assert_eq!(pending_jobs(), 0);
        assert_eq!(run_one_turn(), 0);
    }

    #[test]
    fn host_scheduler_receives_jobs_and_reset_restores_queue() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();

        // A job queued before the switch is forwarded, not dropped.
        run_later(Box::new(|| {}));
        set_scheduler(move |job| {
            sink.borrow_mut().push(job);
        });
        assert_eq!(received.borrow().len(), 1);

        run_later(Box::new(|| {}));
        assert_eq!(received.borrow().len(), 2);
        assert_eq!(pending_jobs(), 0);

        reset_scheduler();
        run_later(Box::new(|| {}));
        assert_eq!(received.borrow().len(), 2);
        assert_eq!(pending_jobs(), 1);
        run_microtasks();
    }
}
