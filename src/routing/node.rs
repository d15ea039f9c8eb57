//! Segment trie used by the route table.
//!
//! # Responsibilities
//! - Store one node per segment position of every registered pattern
//! - Insert patterns segment by segment
//! - Resolve request segments with backtracking
//!
//! # Design Decisions
//! - Static children live in a map keyed by their exact label
//! - At most one parameter child and one catch-all child per node
//! - Lookup order is static, then parameter, then catch-all, whatever the
//!   registration order was
//! - A catch-all node matches the rest of the path as soon as it is reached

use std::collections::HashMap;

use crate::routing::pattern::{Pattern, Segment};

/// One segment position in a per-method trie.
#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    /// Segment text this node was created for. Empty for the root.
    label: String,
    statics: HashMap<String, Node>,
    param: Option<Box<Node>>,
    catch_all: Option<Box<Node>>,
    /// Pattern registered to end exactly here.
    terminal: Option<Pattern>,
}

impl Node {
    fn with_label(label: String) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    fn is_catch_all(&self) -> bool {
        self.label.starts_with('*')
    }

    /// Insert `pattern` below this node, starting at `depth`.
    ///
    /// Re-inserting an identical pattern walks the existing path and replaces the
    /// terminal entry.
    pub(crate) fn insert(&mut self, pattern: &Pattern, depth: usize) {
        let Some(segment) = pattern.segments().get(depth) else {
            self.terminal = Some(pattern.clone());
            return;
        };

        let label = segment.to_string();
        let child = match segment {
            Segment::Static(text) => self
                .statics
                .entry(text.clone())
                .or_insert_with(|| Node::with_label(label)),
            Segment::Param(_) => &mut **self
                .param
                .get_or_insert_with(|| Box::new(Node::with_label(label))),
            Segment::CatchAll(_) => &mut **self
                .catch_all
                .get_or_insert_with(|| Box::new(Node::with_label(label))),
        };
        child.insert(pattern, depth + 1);
    }

    /// Pattern already terminating where `pattern` would, if any.
    ///
    /// Walks the same children `insert` would pick without creating any.
    pub(crate) fn terminal_for(&self, pattern: &Pattern) -> Option<&Pattern> {
        let mut node = self;
        for segment in pattern.segments() {
            node = match segment {
                Segment::Static(text) => node.statics.get(text)?,
                Segment::Param(_) => node.param.as_deref()?,
                Segment::CatchAll(_) => node.catch_all.as_deref()?,
            };
        }
        node.terminal.as_ref()
    }

    /// Find the pattern matching `segments[depth..]` below this node.
    pub(crate) fn search(&self, segments: &[&str], depth: usize) -> Option<&Pattern> {
        if depth == segments.len() || self.is_catch_all() {
            return self.terminal.as_ref();
        }

        let segment = segments[depth];
        if let Some(found) = self
            .statics
            .get(segment)
            .and_then(|child| child.search(segments, depth + 1))
        {
            return Some(found);
        }
        [&self.param, &self.catch_all]
            .into_iter()
            .flatten()
            .find_map(|child| child.search(segments, depth + 1))
    }

    /// Number of nodes in this subtree, this one included.
    pub(crate) fn count(&self) -> usize {
        1 + self.statics.values().map(Node::count).sum::<usize>()
            + self.param.as_ref().map_or(0, |n| n.count())
            + self.catch_all.as_ref().map_or(0, |n| n.count())
    }
}
