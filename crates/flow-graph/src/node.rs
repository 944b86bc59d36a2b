//! Graph node trait: one step of a workflow

use async_trait::async_trait;
use flow_core::Result;

/// One step in a graph: state in, state out
///
/// The driver moves the state into `run` and takes it back from the return
/// value, so a node has exclusive access for the duration of the call.
/// Returning `Err` aborts the whole run.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Send + 'static,
{
    /// Node id, unique within a graph
    fn id(&self) -> &str;

    /// Execute the step
    async fn run(&self, state: S) -> Result<S>;
}

/// Adapter turning a synchronous closure into a [`Node`]
///
/// Handy for pure steps that need no I/O.
pub struct FnNode<F> {
    id: String,
    f: F,
}

impl<F> FnNode<F> {
    pub fn new(id: impl Into<String>, f: F) -> Self {
        Self { id: id.into(), f }
    }
}

#[async_trait]
impl<S, F> Node<S> for FnNode<F>
where
    S: Send + 'static,
    F: Fn(S) -> Result<S> + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, state: S) -> Result<S> {
        (self.f)(state)
    }
}
