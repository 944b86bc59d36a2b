//! Conditional edges: pick the next node from the current state

use flow_core::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Router function returning a routing tag
pub type RouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// A router plus the table mapping each tag it may return to a node id
/// (or END)
pub struct ConditionalEdges<S> {
    router: RouterFn<S>,
    routes: BTreeMap<String, String>,
}

impl<S> Clone for ConditionalEdges<S> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            routes: self.routes.clone(),
        }
    }
}

impl<S> ConditionalEdges<S> {
    pub fn new(router: RouterFn<S>, routes: BTreeMap<String, String>) -> Self {
        Self { router, routes }
    }

    /// Declared tag -> target table
    pub fn routes(&self) -> &BTreeMap<String, String> {
        &self.routes
    }

    /// Resolve the target node for `state`
    ///
    /// A tag missing from the route table is a hard failure.
    pub fn resolve(&self, source: &str, state: &S) -> Result<String> {
        let tag = (self.router)(state);
        self.routes.get(&tag).cloned().ok_or_else(|| {
            Error::NodeNotFound(format!("route '{tag}' is not declared for '{source}'"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges() -> ConditionalEdges<i32> {
        let routes = [
            ("even".to_string(), "a".to_string()),
            ("odd".to_string(), "b".to_string()),
        ]
        .into_iter()
        .collect();
        ConditionalEdges::new(
            Arc::new(|n: &i32| if n % 2 == 0 { "even" } else { "odd" }.to_string()),
            routes,
        )
    }

    #[test]
    fn test_resolve_uses_route_table() {
        let edges = edges();
        assert_eq!(edges.resolve("src", &2).unwrap(), "a");
        assert_eq!(edges.resolve("src", &3).unwrap(), "b");
    }

    #[test]
    fn test_undeclared_tag_is_an_error() {
        let edges = ConditionalEdges::new(
            Arc::new(|_: &i32| "nowhere".to_string()),
            BTreeMap::new(),
        );
        let err = edges.resolve("src", &1).unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }
}
