//! Topology export as Mermaid or Graphviz DOT text

use crate::graph::{END, START};

/// One edge of the exported topology; conditional edges carry their route tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: Option<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label,
        }
    }
}

/// Nodes in registration order plus all edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub nodes: Vec<String>,
    pub edges: Vec<Edge>,
}

impl Topology {
    pub fn new(nodes: Vec<String>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Mermaid flowchart; conditional edges are dashed
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD;\n");
        out.push_str(&format!("    {START}([start]);\n"));
        for node in &self.nodes {
            out.push_str(&format!("    {node}({node});\n"));
        }
        out.push_str(&format!("    {END}([end]);\n"));
        for edge in &self.edges {
            let (from, to) = (&edge.from, &edge.to);
            match &edge.label {
                Some(label) => out.push_str(&format!("    {from} -.->|{label}| {to};\n")),
                None => out.push_str(&format!("    {from} --> {to};\n")),
            }
        }
        out
    }

    /// Graphviz digraph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph {\n    rankdir=TB;\n");
        out.push_str(&format!("    \"{START}\" [shape=circle, label=\"start\"];\n"));
        for node in &self.nodes {
            out.push_str(&format!("    \"{node}\" [shape=box];\n"));
        }
        out.push_str(&format!("    \"{END}\" [shape=doublecircle, label=\"end\"];\n"));
        for edge in &self.edges {
            match &edge.label {
                Some(label) => out.push_str(&format!(
                    "    \"{}\" -> \"{}\" [label=\"{}\", style=dashed];\n",
                    edge.from, edge.to, label
                )),
                None => out.push_str(&format!("    \"{}\" -> \"{}\";\n", edge.from, edge.to)),
            }
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> Topology {
        Topology::new(
            vec!["a".to_string(), "b".to_string()],
            vec![
                Edge::new(START, "a", None),
                Edge::new("a", "b", None),
                Edge::new("b", END, Some("done".to_string())),
                Edge::new("b", "a", Some("again".to_string())),
            ],
        )
    }

    #[test]
    fn test_mermaid_output() {
        let text = topology().to_mermaid();
        assert!(text.starts_with("graph TD;"));
        assert!(text.contains("__start__ --> a;"));
        assert!(text.contains("b -.->|done| __end__;"));
        assert!(text.contains("b -.->|again| a;"));
    }

    #[test]
    fn test_dot_output() {
        let text = topology().to_dot();
        assert!(text.starts_with("digraph {"));
        assert!(text.contains("\"a\" -> \"b\";"));
        assert!(text.contains("\"b\" -> \"__end__\" [label=\"done\", style=dashed];"));
        assert!(text.trim_end().ends_with('}'));
    }
}
