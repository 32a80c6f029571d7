//! Execution tracking for queries.
//!
//! A [`TrackedQuery`] sits between a caller and one of the query traits. It
//! publishes whether a query is running and whether it has ever completed
//! through a `watch` channel, so that background tasks can react to execution
//! state the same way they react to any other status value.

use std::{fmt::Display, future::Future, sync::Arc};

use tokio::sync::watch;
use tracing::*;

/// Observable execution state of a [`TrackedQuery`].
#[derive(Debug, Clone)]
pub struct QueryState<R> {
    /// Number of executions that ran to completion, successful or not.
    completed: u64,
    /// Number of executions currently in flight.
    in_flight: usize,
    /// Outcome of the most recently completed execution.
    result: Option<R>,
}

impl<R> Default for QueryState<R> {
    fn default() -> Self {
        Self {
            completed: 0,
            in_flight: 0,
            result: None,
        }
    }
}

impl<R> QueryState<R> {
    pub fn has_been_executed_at_least_once(&self) -> bool {
        self.completed > 0
    }

    pub fn is_executing(&self) -> bool {
        self.in_flight > 0
    }

    pub fn is_executing_the_first_time(&self) -> bool {
        self.is_executing() && !self.has_been_executed_at_least_once()
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }
}

/// Wraps query executions and tracks their state.
///
/// Failures are logged and collapsed into `None`; callers only learn that
/// there is no result.
#[derive(Debug)]
pub struct TrackedQuery<R> {
    name: &'static str,
    state: Arc<watch::Sender<QueryState<R>>>,
}

impl<R> Clone for TrackedQuery<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            state: self.state.clone(),
        }
    }
}

impl<R> TrackedQuery<R>
where
    R: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            name,
            state: Arc::new(state),
        }
    }

    /// Subscribes to changes of the execution state.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<R>> {
        self.state.subscribe()
    }

    pub fn has_been_executed_at_least_once(&self) -> bool {
        self.state.borrow().has_been_executed_at_least_once()
    }

    pub fn is_executing(&self) -> bool {
        self.state.borrow().is_executing()
    }

    pub fn is_executing_the_first_time(&self) -> bool {
        self.state.borrow().is_executing_the_first_time()
    }

    /// Clone of the most recent result.
    pub fn result(&self) -> Option<R> {
        self.state.borrow().result.clone()
    }

    /// Starts tracking `request` and returns a future resolving to its
    /// outcome.
    ///
    /// The execution counts as in flight from the moment this is called, not
    /// from the first poll of the returned future. Dropping the future before
    /// it completes releases the in-flight slot without recording a result.
    pub fn execute<F, E>(&self, request: F) -> impl Future<Output = Option<R>> + Send + 'static
    where
        F: Future<Output = Result<R, E>> + Send + 'static,
        E: Display + Send,
    {
        self.state.send_modify(|st| st.in_flight += 1);
        let guard = InFlightGuard {
            state: self.state.clone(),
            finished: false,
        };
        let name = self.name;

        async move {
            let mut guard = guard;
            let outcome = match request.await {
                Ok(res) => Some(res),
                Err(err) => {
                    warn!(query = %name, %err, "query failed");
                    None
                }
            };
            guard.finish(outcome.clone());
            outcome
        }
    }
}

struct InFlightGuard<R> {
    state: Arc<watch::Sender<QueryState<R>>>,
    finished: bool,
}

impl<R> InFlightGuard<R> {
    fn finish(&mut self, outcome: Option<R>) {
        self.finished = true;
        self.state.send_modify(|st| {
            st.in_flight = st.in_flight.saturating_sub(1);
            st.completed += 1;
            st.result = outcome;
        });
    }
}

impl<R> Drop for InFlightGuard<R> {
    fn drop(&mut self) {
        if !self.finished {
            self.state.send_modify(|st| {
                st.in_flight = st.in_flight.saturating_sub(1);
            });
        }
    }
}
