//! Graph builder
//!
//! Nodes are registered with [`StateGraph::add_node`] and wired with fixed
//! edges ([`StateGraph::add_edge`], using [`START`] and [`END`] as the
//! sentinels) or with conditional edges whose target is chosen from the state
//! after the source node has run. Every node must have exactly one outgoing
//! transition: a single fixed edge or one set of conditional edges.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::compiled::{CompiledGraph, Transition};
use crate::conditional::ConditionalEdges;
use crate::error::CompilationError;
use crate::node::Node;
use crate::visualization::{Edge, Topology};

/// Sentinel for graph entry: `add_edge(START, first_node)`
pub const START: &str = "__start__";

/// Sentinel for graph exit: `add_edge(last_node, END)`
pub const END: &str = "__end__";

/// Mutable description of a workflow, turned into a [`CompiledGraph`] by
/// [`StateGraph::compile`]
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Insertion order, kept for stable visualization output
    order: Vec<String>,
    edges: Vec<(String, String)>,
    conditional: Vec<(String, ConditionalEdges<S>)>,
}

impl<S> Default for StateGraph<S>
where
    S: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            edges: Vec::new(),
            conditional: Vec::new(),
        }
    }

    /// Register a node under `id`; a second node with the same id replaces
    /// the first
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        let id = id.into();
        if self.nodes.insert(id.clone(), node).is_none() {
            self.order.push(id);
        }
        self
    }

    /// Add a fixed edge
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Shorthand for `add_edge(START, id)`
    pub fn set_entry_point(&mut self, id: impl Into<String>) -> &mut Self {
        self.add_edge(START, id)
    }

    /// Add conditional edges from `source`
    ///
    /// After `source` runs, `router` is called with the updated state. The
    /// returned tag is looked up in `routes` to find the next node id (or
    /// [`END`]). A tag missing from `routes` fails the run.
    pub fn add_conditional_edges<F, R, K, T>(
        &mut self,
        source: impl Into<String>,
        router: F,
        routes: impl IntoIterator<Item = (K, T)>,
    ) -> &mut Self
    where
        F: Fn(&S) -> R + Send + Sync + 'static,
        R: AsRef<str>,
        K: Into<String>,
        T: Into<String>,
    {
        let routes: BTreeMap<String, String> = routes
            .into_iter()
            .map(|(tag, target)| (tag.into(), target.into()))
            .collect();
        let router = Arc::new(move |state: &S| router(state).as_ref().to_string());
        self.conditional
            .push((source.into(), ConditionalEdges::new(router, routes)));
        self
    }

    /// Validate the topology and freeze it
    pub fn compile(self) -> Result<CompiledGraph<S>, CompilationError> {
        let known = |id: &str| self.nodes.contains_key(id);

        for (from, to) in &self.edges {
            if from != START && !known(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !known(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }

        let mut conditional_sources = HashSet::new();
        for (source, edges) in &self.conditional {
            if !known(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if !conditional_sources.insert(source.clone()) {
                return Err(CompilationError::DuplicateEdge(source.clone()));
            }
            if edges.routes().is_empty() {
                return Err(CompilationError::EmptyRouteTable(source.clone()));
            }
            for target in edges.routes().values() {
                if target != END && !known(target) {
                    return Err(CompilationError::NodeNotFound(target.clone()));
                }
            }
        }

        let entries: Vec<&String> = self
            .edges
            .iter()
            .filter(|(from, _)| from == START)
            .map(|(_, to)| to)
            .collect();
        let entry = match entries.as_slice() {
            [only] => (*only).clone(),
            _ => return Err(CompilationError::MissingEntry),
        };

        let mut transitions: HashMap<String, Transition<S>> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(from, _)| from != START) {
            if conditional_sources.contains(from) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(from.clone()));
            }
            if transitions
                .insert(from.clone(), Transition::Fixed(to.clone()))
                .is_some()
            {
                return Err(CompilationError::DuplicateEdge(from.clone()));
            }
        }
        for (source, edges) in &self.conditional {
            transitions.insert(source.clone(), Transition::Conditional(edges.clone()));
        }

        for id in &self.order {
            if !transitions.contains_key(id) {
                return Err(CompilationError::DeadEnd(id.clone()));
            }
        }

        let reaches_end = transitions.values().any(|t| match t {
            Transition::Fixed(to) => to == END,
            Transition::Conditional(edges) => edges.routes().values().any(|to| to == END),
        });
        if !reaches_end {
            return Err(CompilationError::MissingEnd);
        }

        let topology = self.topology(&entry);
        Ok(CompiledGraph::new(self.nodes, transitions, entry, topology))
    }

    fn topology(&self, entry: &str) -> Topology {
        let mut edges = vec![Edge::new(START, entry, None)];
        for (from, to) in self.edges.iter().filter(|(from, _)| from != START) {
            edges.push(Edge::new(from, to, None));
        }
        for (source, conditional) in &self.conditional {
            for (tag, target) in conditional.routes() {
                edges.push(Edge::new(source, target, Some(tag.clone())));
            }
        }
        Topology::new(self.order.clone(), edges)
    }
}
