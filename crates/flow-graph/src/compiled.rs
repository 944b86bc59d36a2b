//! Compiled graph and its sequential driver

use std::collections::HashMap;
use std::sync::Arc;

use flow_core::{Error, Result};
use tracing::{debug, error, info};

use crate::conditional::ConditionalEdges;
use crate::graph::END;
use crate::node::Node;
use crate::observer::StepObserver;
use crate::visualization::Topology;

/// Maximum number of node executions per run unless overridden
pub const DEFAULT_STEP_LIMIT: usize = 25;

/// Outgoing transition of a node
pub(crate) enum Transition<S> {
    Fixed(String),
    Conditional(ConditionalEdges<S>),
}

/// Validated, immutable graph ready to run
///
/// The driver runs one node at a time, moving the state into the node and
/// taking the updated state back, until a transition reaches [`END`].
pub struct CompiledGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    transitions: HashMap<String, Transition<S>>,
    entry: String,
    step_limit: usize,
    observers: Vec<Arc<dyn StepObserver<S>>>,
    topology: Topology,
}

impl<S> CompiledGraph<S>
where
    S: Send + 'static,
{
    pub(crate) fn new(
        nodes: HashMap<String, Arc<dyn Node<S>>>,
        transitions: HashMap<String, Transition<S>>,
        entry: String,
        topology: Topology,
    ) -> Self {
        Self {
            nodes,
            transitions,
            entry,
            step_limit: DEFAULT_STEP_LIMIT,
            observers: Vec::new(),
            topology,
        }
    }

    /// Override the maximum number of node executions
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    /// Attach an observer called after every step
    pub fn with_observer(mut self, observer: Arc<dyn StepObserver<S>>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn step_limit(&self) -> usize {
        self.step_limit
    }

    /// Nodes and edges for display
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Run from the entry node until END, returning the terminal state
    pub async fn invoke(&self, state: S) -> Result<S> {
        self.invoke_traced(state).await.map(|(state, _)| state)
    }

    /// Like [`invoke`](Self::invoke), also returning the ids of the visited
    /// nodes in execution order
    pub async fn invoke_traced(&self, mut state: S) -> Result<(S, Vec<String>)> {
        let mut visited: Vec<String> = Vec::new();
        let mut current = self.entry.clone();

        loop {
            if visited.len() >= self.step_limit {
                error!(limit = self.step_limit, node = %current, "Step limit reached");
                return Err(Error::StepLimitExceeded {
                    limit: self.step_limit,
                });
            }

            let node = self.nodes.get(&current).ok_or_else(|| {
                error!(node = %current, "Node missing from graph");
                Error::NodeNotFound(current.clone())
            })?;

            let step = visited.len() + 1;
            info!("step {}: {}", step, current);

            state = node.run(state).await.map_err(|e| {
                error!(node = %current, error = %e, "Step failed");
                match e {
                    Error::StepFailed { .. } => e,
                    other => Error::StepFailed {
                        step: current.clone(),
                        reason: other.to_string(),
                    },
                }
            })?;

            for observer in &self.observers {
                observer.on_step(step, &current, &state);
            }
            visited.push(current.clone());

            let next = match self.transitions.get(&current) {
                Some(Transition::Fixed(to)) => to.clone(),
                Some(Transition::Conditional(edges)) => {
                    edges.resolve(&current, &state).inspect_err(|e| {
                        error!(node = %current, error = %e, "Routing failed");
                    })?
                }
                None => {
                    error!(node = %current, "No transition out of node");
                    return Err(Error::NodeNotFound(format!("no transition from '{current}'")));
                }
            };
            debug!(from = %current, to = %next, "Transition");

            if next == END {
                info!(steps = visited.len(), "Graph reached END");
                return Ok((state, visited));
            }
            current = next;
        }
    }
}
