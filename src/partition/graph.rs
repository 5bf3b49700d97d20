//! Stream dependency graph
//!
//! Each stream has at most one parent, so the graph is a forest. It is
//! validated once at construction; lookups afterwards cannot fail.

use crate::error::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Validated parent/child DAG over stream names
#[derive(Debug, Clone, Default)]
pub struct StreamGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl StreamGraph {
    /// Build the graph from `(stream, parent)` pairs.
    ///
    /// Rejects duplicate names, parents that are not themselves listed,
    /// and cycles. Children keep the order in which they were listed.
    pub fn new<'a, I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let edges: Vec<(&str, Option<&str>)> = edges.into_iter().collect();
        let mut graph = Self::default();

        for (name, _) in &edges {
            if graph.index.contains_key(*name) {
                return Err(Error::partition(*name, "stream is defined more than once"));
            }
            graph.index.insert(name.to_string(), graph.nodes.len());
            graph.nodes.push(Node {
                name: name.to_string(),
                parent: None,
                children: Vec::new(),
            });
        }

        for (position, (name, parent)) in edges.iter().enumerate() {
            let Some(parent) = parent else { continue };
            let parent_index = *graph.index.get(*parent).ok_or_else(|| {
                Error::partition(*name, format!("parent stream '{parent}' is not defined"))
            })?;
            graph.nodes[position].parent = Some(parent_index);
            graph.nodes[parent_index].children.push(position);
        }

        graph.check_acyclic()?;
        Ok(graph)
    }

    fn check_acyclic(&self) -> Result<()> {
        for (start, node) in self.nodes.iter().enumerate() {
            let mut current = node.parent;
            let mut steps = 0;
            while let Some(index) = current {
                if index == start || steps > self.nodes.len() {
                    return Err(Error::partition(
                        &node.name,
                        "stream is its own ancestor",
                    ));
                }
                current = self.nodes[index].parent;
                steps += 1;
            }
        }
        Ok(())
    }

    /// Streams without a parent, in definition order
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|node| node.parent.is_none())
            .map(|node| node.name.as_str())
    }

    /// Direct children of a stream; empty for unknown names
    pub fn children(&self, name: &str) -> impl Iterator<Item = &str> {
        self.index
            .get(name)
            .map(|&index| self.nodes[index].children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&child| self.nodes[child].name.as_str())
    }

    /// Every stream below `name`, depth first
    pub fn descendants(&self, name: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack: Vec<&str> = self.children(name).collect();
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut children: Vec<&str> = self.children(next).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }
}
