use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::RenderError;
use crate::tree::{NodeId, NodeKind, Root};

/// One node of the structural dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonNode {
    pub cls: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    /// A Section's heading, kept apart from the children as in the tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<Box<JsonNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonNode>,
}

impl JsonNode {
    /// Nodes in this subtree, heading included.
    pub fn count(&self) -> usize {
        1 + self.heading.as_ref().map_or(0, |h| h.count())
            + self.children.iter().map(JsonNode::count).sum::<usize>()
    }

    /// Class names in the same pre-order as [`Root::walk`].
    pub fn classes<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.cls);
        if let Some(h) = &self.heading {
            h.classes(out);
        }
        for child in &self.children {
            child.classes(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDocument {
    pub branches: Vec<JsonNode>,
}

impl JsonDocument {
    pub fn node_count(&self) -> usize {
        self.branches.iter().map(JsonNode::count).sum()
    }

    pub fn class_sequence(&self) -> Vec<&str> {
        let mut out = vec![];
        for branch in &self.branches {
            branch.classes(&mut out);
        }
        out
    }
}

fn props_of(root: &Root, id: NodeId) -> Map<String, Value> {
    let node = root.node(id);
    let mut props = json!({
        "node_id": id,
        "parent": node.parent,
        "start_line": node.span.start_line,
        "end_line": node.span.end_line,
    });
    let extra = match &node.kind {
        NodeKind::Branch(meta) => json!({
            "source": meta.source,
            "title": meta.title,
            "properties": meta.properties,
            "keywords": meta.keywords,
        }),
        NodeKind::Section {
            level,
            title,
            properties,
            ..
        } => json!({ "level": level, "title": title, "properties": properties }),
        NodeKind::Heading { level, text, tags } => {
            json!({ "level": level, "text": text, "tags": tags })
        }
        NodeKind::Text { text }
        | NodeKind::Markup { text, .. }
        | NodeKind::DefinitionTitle { text }
        | NodeKind::CommentBlock { text } => json!({ "text": text }),
        NodeKind::Target { name } => json!({ "name": name }),
        NodeKind::List { style, margin } => json!({ "style": style, "margin": margin }),
        NodeKind::ListItem {
            depth,
            bullet,
            ordinal,
            counter,
            checkbox,
            ..
        } => json!({
            "depth": depth,
            "bullet": bullet,
            "ordinal": ordinal,
            "counter": counter,
            "checkbox": checkbox,
        }),
        NodeKind::TableRow { header } => json!({ "header": header }),
        NodeKind::Quote { args } | NodeKind::Center { args } => json!({ "args": args }),
        NodeKind::CodeBlock {
            language,
            args,
            text,
        } => json!({ "language": language, "args": args, "text": text }),
        NodeKind::ExampleBlock { args, text } => json!({ "args": args, "text": text }),
        NodeKind::ExportBlock { backend, text } => json!({ "backend": backend, "text": text }),
        NodeKind::Link {
            target,
            description,
        } => json!({ "target_text": target, "display_text": description }),
        NodeKind::InternalLink {
            target,
            description,
            ..
        } => json!({
            "target_text": target,
            "display_text": description,
            "target_node": root.resolve_link(id),
        }),
        NodeKind::Image { path, alt } => json!({ "src_text": path, "alt_text": alt }),
        NodeKind::Paragraph
        | NodeKind::DefinitionDescription
        | NodeKind::Table
        | NodeKind::TableCell
        | NodeKind::BlankLine => Value::Null,
    };
    if !node.link_targets.is_empty() {
        props["link_targets"] = json!(node.link_targets);
    }
    if let (Value::Object(base), Value::Object(extra)) = (&mut props, extra) {
        base.extend(extra);
    }
    match props {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn node_of(root: &Root, id: NodeId) -> JsonNode {
    JsonNode {
        cls: root.kind(id).class_name().to_string(),
        props: props_of(root, id),
        heading: root.heading_of(id).map(|h| Box::new(node_of(root, h))),
        children: root
            .children(id)
            .iter()
            .map(|&c| node_of(root, c))
            .collect(),
    }
}

/// The structural dump of every branch.
pub fn to_tree(root: &Root) -> JsonDocument {
    JsonDocument {
        branches: root.branches().iter().map(|&b| node_of(root, b)).collect(),
    }
}

pub fn to_json(root: &Root) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(&to_tree(root))?)
}

/// Reads a dump produced by [`to_json`] back into its structure.
pub fn reload(text: &str) -> Result<JsonDocument, RenderError> {
    Ok(serde_json::from_str(text)?)
}
