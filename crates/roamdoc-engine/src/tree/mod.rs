//! # Document Tree
//!
//! Arena-backed tree produced by the parser and consumed by the renderers.
//!
//! ## Ownership
//!
//! - [`Root`] owns every node in one `Vec`; a [`NodeId`] is the node's index.
//!   Ids are assigned at insertion, never reused and never changed, so they are
//!   dense and increase across all branches of one composed document.
//! - Each parsed source unit is a Branch owned directly by the root. The first
//!   one is the trunk.
//! - Every other node has exactly one parent. Re-parenting edits two child
//!   lists and never aliases.
//! - A Section's heading is referenced from the Section kind and is not part of
//!   the ordinary child list.
//!
//! ## Link targets
//!
//! The root also owns the [`LinkTargets`] registry. Internal links resolve
//! lazily through [`Root::resolve_link`] and memoize their answer, so resolve
//! only after every branch has been parsed.

pub mod kinds;
pub mod span;
pub mod targets;

use std::collections::{HashMap, VecDeque};
use std::fmt;

use xi_rope::Rope;

use crate::parsing::diagnostics::{Diagnostic, DiagnosticKind};

pub use kinds::{BranchMeta, Checkbox, ListStyle, MarkupStyle, NodeKind};
pub use span::{SourceSpan, Span};
pub use targets::{LinkTarget, LinkTargets};

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// `None` only for branches.
    pub parent: Option<NodeId>,
    pub span: SourceSpan,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    /// Names this node is registered under, if any.
    pub link_targets: Vec<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("obj-{0} is a branch and cannot be moved")]
    BranchMove(NodeId),
    #[error("moving obj-{node} under obj-{parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },
}

/// Source buffers kept per branch for provenance lookups.
#[derive(Default)]
struct SourceStore(HashMap<NodeId, Rope>);

impl fmt::Debug for SourceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceStore({} buffers)", self.0.len())
    }
}

#[derive(Debug, Default)]
pub struct Root {
    nodes: Vec<Node>,
    branches: Vec<NodeId>,
    targets: LinkTargets,
    sources: SourceStore,
}

impl Root {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a branch for one source unit. The first branch added is the trunk.
    pub fn add_branch(&mut self, meta: BranchMeta, span: SourceSpan, text: Rope) -> NodeId {
        let id = self.insert(None, span, NodeKind::Branch(meta));
        self.branches.push(id);
        self.sources.0.insert(id, text);
        id
    }

    /// Creates a node and appends it to `parent`'s children.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind, span: SourceSpan) -> NodeId {
        let id = self.insert(Some(parent), span, kind);
        self.nodes[parent].children.push(id);
        id
    }

    /// Creates the heading of `section`. The heading's parent is the section,
    /// but it is stored in the Section kind instead of its child list.
    pub fn attach_heading(&mut self, section: NodeId, kind: NodeKind, span: SourceSpan) -> NodeId {
        let id = self.insert(Some(section), span, kind);
        if let NodeKind::Section { heading, .. } = &mut self.nodes[section].kind {
            *heading = Some(id);
        }
        id
    }

    fn insert(&mut self, parent: Option<NodeId>, span: SourceSpan, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            parent,
            span,
            kind,
            children: vec![],
            link_targets: vec![],
        });
        id
    }

    pub fn trunk(&self) -> Option<NodeId> {
        self.branches.first().copied()
    }

    pub fn branches(&self) -> &[NodeId] {
        &self.branches
    }

    /// Node by id. Ids handed out by this root are always valid.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn heading_of(&self, section: NodeId) -> Option<NodeId> {
        match &self.nodes[section].kind {
            NodeKind::Section { heading, .. } => *heading,
            _ => None,
        }
    }

    /// First number of an ordered list that does not count from 1.
    pub fn list_start(&self, list: NodeId) -> Option<u64> {
        if !matches!(&self.nodes[list].kind, NodeKind::List { style: ListStyle::Ordered, .. }) {
            return None;
        }
        let first = *self.nodes[list].children.first()?;
        match &self.nodes[first].kind {
            NodeKind::ListItem { ordinal: Some(n), .. } if *n != 1 => Some(*n),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Highest id handed out so far.
    pub fn max_id(&self) -> Option<NodeId> {
        self.nodes.len().checked_sub(1)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Moves `node` under `new_parent`, detaching it from its old parent
    /// first.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), TreeError> {
        let Some(old_parent) = self.nodes[node].parent else {
            return Err(TreeError::BranchMove(node));
        };
        if self.ancestors(new_parent).any(|a| a == node) || new_parent == node {
            return Err(TreeError::Cycle {
                node,
                parent: new_parent,
            });
        }

        self.nodes[old_parent].children.retain(|&c| c != node);
        if let NodeKind::Section { heading, .. } = &mut self.nodes[old_parent].kind
            && *heading == Some(node)
        {
            *heading = None;
        }

        self.nodes[node].parent = Some(new_parent);
        self.nodes[new_parent].children.push(node);
        Ok(())
    }

    /// Parent chain from `id` upward, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id].parent, move |&p| self.nodes[p].parent)
    }

    /// The branch a node belongs to.
    pub fn branch_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Number of Sections enclosing `id`, counting `id` itself.
    pub fn section_depth(&self, id: NodeId) -> usize {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|&n| matches!(self.nodes[n].kind, NodeKind::Section { .. }))
            .count()
    }

    /// Pre-order walk from `start`. A Section's heading is visited right after
    /// the Section, before its body.
    pub fn walk(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = vec![];
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &child in self.nodes[id].children.iter().rev() {
                stack.push(child);
            }
            if let Some(h) = self.heading_of(id) {
                stack.push(h);
            }
        }
        out
    }

    /// Walk of every branch in composition order.
    pub fn walk_all(&self) -> Vec<NodeId> {
        self.branches.iter().flat_map(|&b| self.walk(b)).collect()
    }

    /// The node's text when it has no nested children.
    pub fn simple_text(&self, id: NodeId) -> Option<&str> {
        let node = &self.nodes[id];
        if node.children.is_empty() {
            node.kind.text()
        } else {
            None
        }
    }

    pub fn register_target(&mut self, node: NodeId, name: impl Into<String>) {
        let name = name.into();
        log::debug!("registering link target '{name}' for obj-{node}");
        self.nodes[node].link_targets.push(name.clone());
        self.targets.register(node, name);
    }

    pub fn targets(&self) -> &LinkTargets {
        &self.targets
    }

    /// Exact registry match, then the name with an `id:` prefix stripped,
    /// then a breadth-first search for a heading with the same text.
    pub fn resolve(&self, name: &str) -> Option<NodeId> {
        if let Some(node) = self.targets.get(name) {
            return Some(node);
        }
        if let Some(bare) = name.strip_prefix("id:")
            && let Some(node) = self.targets.get(bare.trim())
        {
            return Some(node);
        }
        self.find_heading(name)
    }

    pub fn find_heading(&self, text: &str) -> Option<NodeId> {
        let mut queue: VecDeque<NodeId> = self.branches.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if let Some(h) = self.heading_of(id)
                && matches!(&self.nodes[h].kind, NodeKind::Heading { text: t, .. } if t == text)
            {
                return Some(h);
            }
            queue.extend(self.nodes[id].children.iter().copied());
        }
        None
    }

    /// Resolves an internal link, computing the answer at most once.
    pub fn resolve_link(&self, link: NodeId) -> Option<NodeId> {
        match &self.nodes[link].kind {
            NodeKind::InternalLink {
                target, resolved, ..
            } => *resolved.get_or_init(|| self.resolve(target)),
            _ => None,
        }
    }

    pub fn internal_links(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::InternalLink { .. }))
            .map(|n| n.id)
    }

    /// One diagnostic per internal link whose target cannot be found.
    pub fn link_diagnostics(&self) -> Vec<Diagnostic> {
        self.internal_links()
            .filter(|&id| self.resolve_link(id).is_none())
            .map(|id| {
                let node = &self.nodes[id];
                let target = match &node.kind {
                    NodeKind::InternalLink { target, .. } => target.as_str(),
                    _ => "",
                };
                Diagnostic::new(
                    DiagnosticKind::UnresolvedLink,
                    self.source_name(id),
                    node.span.start_line,
                    format!("link target '{target}' not found"),
                )
            })
            .collect()
    }

    /// Source name of the branch holding `id`.
    pub fn source_name(&self, id: NodeId) -> &str {
        match &self.nodes[self.branch_of(id)].kind {
            NodeKind::Branch(meta) => &meta.source,
            _ => "",
        }
    }

    /// The original text a node was parsed from.
    pub fn source_text(&self, id: NodeId) -> Option<String> {
        let node = self.get(id)?;
        let rope = self.sources.0.get(&self.branch_of(id))?;
        let sp = node.span;
        let start = line_start(rope, sp.start_line) + sp.start_col.unwrap_or(0);
        let end = match sp.end_col {
            Some(col) => line_start(rope, sp.end_line) + col,
            None => line_start(rope, sp.end_line + 1),
        }
        .min(rope.len());
        if start >= end {
            return Some(String::new());
        }
        let text = rope.slice_to_cow(start..end);
        Some(text.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Byte offset where `line` starts, clamped to the end of the rope.
fn line_start(rope: &Rope, line: usize) -> usize {
    let line_count = rope.line_of_offset(rope.len()) + 1;
    if line >= line_count {
        rope.len()
    } else {
        rope.offset_of_line(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn branch(root: &mut Root, name: &str) -> NodeId {
        root.add_branch(
            BranchMeta {
                source: name.into(),
                ..Default::default()
            },
            SourceSpan::line(0),
            Rope::from(""),
        )
    }

    fn section(root: &mut Root, parent: NodeId, text: &str) -> (NodeId, NodeId) {
        let s = root.push(
            parent,
            NodeKind::Section {
                level: 1,
                heading: None,
                title: text.into(),
                properties: vec![],
            },
            SourceSpan::line(0),
        );
        let h = root.attach_heading(
            s,
            NodeKind::Heading {
                level: 1,
                text: text.into(),
                tags: vec![],
            },
            SourceSpan::line(0),
        );
        (s, h)
    }

    #[test]
    fn ids_are_dense_and_increasing() {
        let mut root = Root::new();
        let b = branch(&mut root, "a");
        let p = root.push(b, NodeKind::Paragraph, SourceSpan::line(0));
        let t = root.push(p, NodeKind::Text { text: "x".into() }, SourceSpan::line(0));
        assert_eq!((b, p, t), (0, 1, 2));
        assert_eq!(root.max_id(), Some(2));
        assert_eq!(root.trunk(), Some(0));
    }

    #[test]
    fn heading_is_not_a_child() {
        let mut root = Root::new();
        let b = branch(&mut root, "a");
        let (s, h) = section(&mut root, b, "Intro");
        assert!(root.children(s).is_empty());
        assert_eq!(root.heading_of(s), Some(h));
        assert_eq!(root.parent(h), Some(s));
        assert_eq!(root.walk(b), vec![b, s, h]);
    }

    #[test]
    fn reparent_moves_between_child_lists() {
        let mut root = Root::new();
        let b = branch(&mut root, "a");
        let p1 = root.push(b, NodeKind::Paragraph, SourceSpan::line(0));
        let p2 = root.push(b, NodeKind::Paragraph, SourceSpan::line(1));
        let t = root.push(p1, NodeKind::Text { text: "x".into() }, SourceSpan::line(0));

        root.reparent(t, p2).unwrap();

        assert!(root.children(p1).is_empty());
        assert_eq!(root.children(p2), &[t]);
        assert_eq!(root.parent(t), Some(p2));
    }

    #[test]
    fn reparent_rejects_cycles_and_branches() {
        let mut root = Root::new();
        let b = branch(&mut root, "a");
        let p = root.push(b, NodeKind::Paragraph, SourceSpan::line(0));
        let t = root.push(p, NodeKind::Text { text: "x".into() }, SourceSpan::line(0));

        assert_eq!(
            root.reparent(p, t),
            Err(TreeError::Cycle { node: p, parent: t })
        );
        assert_eq!(root.reparent(b, p), Err(TreeError::BranchMove(b)));
    }

    #[test]
    fn resolve_prefers_registry_then_id_prefix_then_heading() {
        let mut root = Root::new();
        let b = branch(&mut root, "a");
        let (s, h) = section(&mut root, b, "Overview");
        let p = root.push(s, NodeKind::Paragraph, SourceSpan::line(1));
        root.register_target(p, "anchor");

        assert_eq!(root.resolve("anchor"), Some(p));
        assert_eq!(root.resolve("id:anchor"), Some(p));
        assert_eq!(root.resolve("Overview"), Some(h));
        assert_eq!(root.resolve("nothing"), None);
        assert_eq!(root.node(p).link_targets, vec!["anchor".to_string()]);
    }

    #[test]
    fn heading_search_is_breadth_first() {
        let mut root = Root::new();
        let b = branch(&mut root, "a");
        let (outer, _) = section(&mut root, b, "Parent");
        let (_, deep) = section(&mut root, outer, "Same");
        let (_, shallow) = section(&mut root, b, "Same");
        assert_ne!(deep, shallow);
        assert_eq!(root.find_heading("Same"), Some(shallow));
    }

    #[test]
    fn link_resolution_is_memoized() {
        let mut root = Root::new();
        let b = branch(&mut root, "doc.org");
        let p = root.push(b, NodeKind::Paragraph, SourceSpan::line(0));
        let link = root.push(
            p,
            NodeKind::internal_link("later", None),
            SourceSpan::line(0),
        );

        assert_eq!(root.resolve_link(link), None);
        root.register_target(p, "later");
        // first answer is cached
        assert_eq!(root.resolve_link(link), None);
        assert_eq!(root.link_diagnostics().len(), 1);
        assert_eq!(root.link_diagnostics()[0].source, "doc.org");
    }

    #[test]
    fn source_text_slices_spans() {
        let mut root = Root::new();
        let b = root.add_branch(
            BranchMeta::default(),
            SourceSpan::lines(0, 1),
            Rope::from("first line\nsay *bold* here\n"),
        );
        let p = root.push(b, NodeKind::Paragraph, SourceSpan::line(1));
        let m = root.push(
            p,
            NodeKind::Markup {
                style: MarkupStyle::Bold,
                text: "bold".into(),
            },
            SourceSpan::within(1, Span::new(4, 10)),
        );
        assert_eq!(root.source_text(m).as_deref(), Some("*bold*"));
        assert_eq!(root.source_text(p).as_deref(), Some("say *bold* here"));
        assert_eq!(root.source_text(b).as_deref(), Some("first line\nsay *bold* here"));
    }

    #[test]
    fn section_depth_counts_enclosing_sections() {
        let mut root = Root::new();
        let b = branch(&mut root, "a");
        let (s1, _) = section(&mut root, b, "one");
        let (s2, _) = section(&mut root, s1, "two");
        let p = root.push(s2, NodeKind::Paragraph, SourceSpan::line(0));
        assert_eq!(root.section_depth(s1), 1);
        assert_eq!(root.section_depth(s2), 2);
        assert_eq!(root.section_depth(p), 2);
        assert_eq!(root.section_depth(b), 0);
    }
}
