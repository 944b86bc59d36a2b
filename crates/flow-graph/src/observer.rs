//! Step observers: read-only hooks called after every step

/// Called by the driver after each node has run
///
/// Observers see the state between steps but cannot modify it.
pub trait StepObserver<S>: Send + Sync {
    /// `step` is 1-based; `node_id` is the node that just ran
    fn on_step(&self, step: usize, node_id: &str, state: &S);
}

impl<S, F> StepObserver<S> for F
where
    F: Fn(usize, &str, &S) + Send + Sync,
{
    fn on_step(&self, step: usize, node_id: &str, state: &S) {
        self(step, node_id, state);
    }
}
