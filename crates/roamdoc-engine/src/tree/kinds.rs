use std::cell::OnceCell;

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Inline emphasis flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkupStyle {
    Bold,
    Italic,
    Underlined,
    Linethrough,
    Code,
    Verbatim,
}

impl MarkupStyle {
    /// Code and verbatim spans are raw zones: nothing inside them is parsed.
    pub fn is_raw(self) -> bool {
        matches!(self, MarkupStyle::Code | MarkupStyle::Verbatim)
    }
}

/// The three list families. A list's family is fixed by its first item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListStyle {
    Ordered,
    Unordered,
    Definition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Checkbox {
    Unchecked,
    Checked,
    Partial,
}

impl Checkbox {
    pub fn from_mark(mark: char) -> Option<Self> {
        match mark {
            ' ' => Some(Checkbox::Unchecked),
            'X' | 'x' => Some(Checkbox::Checked),
            '-' | '+' => Some(Checkbox::Partial),
            _ => None,
        }
    }

    pub fn mark(self) -> char {
        match self {
            Checkbox::Unchecked => ' ',
            Checkbox::Checked => 'X',
            Checkbox::Partial => '-',
        }
    }
}

/// File-level facts found before the first section of a source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchMeta {
    pub source: String,
    pub title: Option<String>,
    pub properties: Vec<(String, String)>,
    pub keywords: Vec<(String, String)>,
}

/// Every node class the parser produces.
///
/// Leaf text is held inline; containers own their children through
/// [`super::Node::children`]. A Section's heading is kept in `heading`
/// and never appears in the ordinary child list.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Branch(BranchMeta),
    Section {
        level: usize,
        heading: Option<NodeId>,
        title: String,
        properties: Vec<(String, String)>,
    },
    Heading {
        level: usize,
        text: String,
        tags: Vec<String>,
    },
    Paragraph,
    Text {
        text: String,
    },
    /// Emphasis. `text` is always the raw inner text; children exist only
    /// when that text itself contained markup.
    Markup {
        style: MarkupStyle,
        text: String,
    },
    Target {
        name: String,
    },
    List {
        style: ListStyle,
        margin: usize,
    },
    ListItem {
        style: ListStyle,
        depth: usize,
        bullet: String,
        /// Number written in the bullet of an ordered item.
        ordinal: Option<u64>,
        counter: Option<String>,
        checkbox: Option<Checkbox>,
    },
    DefinitionTitle {
        text: String,
    },
    DefinitionDescription,
    Table,
    TableRow {
        header: bool,
    },
    TableCell,
    Quote {
        args: Option<String>,
    },
    Center {
        args: Option<String>,
    },
    CodeBlock {
        language: Option<String>,
        args: Option<String>,
        text: String,
    },
    ExampleBlock {
        args: Option<String>,
        text: String,
    },
    CommentBlock {
        text: String,
    },
    ExportBlock {
        backend: Option<String>,
        text: String,
    },
    Link {
        target: String,
        description: Option<String>,
    },
    /// Resolved on first request through [`super::Root::resolve_link`].
    InternalLink {
        target: String,
        description: Option<String>,
        resolved: OnceCell<Option<NodeId>>,
    },
    Image {
        path: String,
        alt: Option<String>,
    },
    BlankLine,
}

impl NodeKind {
    pub fn internal_link(target: impl Into<String>, description: Option<String>) -> Self {
        NodeKind::InternalLink {
            target: target.into(),
            description,
            resolved: OnceCell::new(),
        }
    }

    /// Stable class name shared by every renderer.
    pub fn class_name(&self) -> &'static str {
        match self {
            NodeKind::Branch(_) => "Branch",
            NodeKind::Section { .. } => "Section",
            NodeKind::Heading { .. } => "Heading",
            NodeKind::Paragraph => "Paragraph",
            NodeKind::Text { .. } => "Text",
            NodeKind::Markup { style, .. } => match style {
                MarkupStyle::Bold => "BoldText",
                MarkupStyle::Italic => "ItalicText",
                MarkupStyle::Underlined => "UnderlinedText",
                MarkupStyle::Linethrough => "LinethroughText",
                MarkupStyle::Code => "InlineCodeText",
                MarkupStyle::Verbatim => "VerbatimText",
            },
            NodeKind::Target { .. } => "TargetText",
            NodeKind::List { style, .. } => match style {
                ListStyle::Ordered => "OrderedList",
                ListStyle::Unordered => "UnorderedList",
                ListStyle::Definition => "DefinitionList",
            },
            NodeKind::ListItem { style, .. } => match style {
                ListStyle::Ordered => "OrderedListItem",
                ListStyle::Unordered => "UnorderedListItem",
                ListStyle::Definition => "DefinitionListItem",
            },
            NodeKind::DefinitionTitle { .. } => "DefinitionListItemTitle",
            NodeKind::DefinitionDescription => "DefinitionListItemDescription",
            NodeKind::Table => "Table",
            NodeKind::TableRow { .. } => "TableRow",
            NodeKind::TableCell => "TableCell",
            NodeKind::Quote { .. } => "Blockquote",
            NodeKind::Center { .. } => "CenterBlock",
            NodeKind::CodeBlock { .. } => "CodeBlock",
            NodeKind::ExampleBlock { .. } => "ExampleBlock",
            NodeKind::CommentBlock { .. } => "CommentBlock",
            NodeKind::ExportBlock { .. } => "ExportBlock",
            NodeKind::Link { .. } => "Link",
            NodeKind::InternalLink { .. } => "InternalLink",
            NodeKind::Image { .. } => "Image",
            NodeKind::BlankLine => "BlankLine",
        }
    }

    /// The plain text a leaf-ish node carries, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            NodeKind::Text { text }
            | NodeKind::Markup { text, .. }
            | NodeKind::DefinitionTitle { text }
            | NodeKind::CodeBlock { text, .. }
            | NodeKind::ExampleBlock { text, .. }
            | NodeKind::CommentBlock { text }
            | NodeKind::ExportBlock { text, .. } => Some(text),
            NodeKind::Heading { text, .. } => Some(text),
            NodeKind::Target { name } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NodeKind::Markup { style: MarkupStyle::Bold, text: "x".into() }, "BoldText")]
    #[case(NodeKind::Markup { style: MarkupStyle::Code, text: "x".into() }, "InlineCodeText")]
    #[case(NodeKind::Target { name: "t".into() }, "TargetText")]
    #[case(NodeKind::List { style: ListStyle::Definition, margin: 0 }, "DefinitionList")]
    #[case(NodeKind::Quote { args: None }, "Blockquote")]
    #[case(NodeKind::internal_link("x", None), "InternalLink")]
    fn class_names(#[case] kind: NodeKind, #[case] expected: &str) {
        assert_eq!(kind.class_name(), expected);
    }

    #[test]
    fn checkbox_marks() {
        assert_eq!(Checkbox::from_mark(' '), Some(Checkbox::Unchecked));
        assert_eq!(Checkbox::from_mark('x'), Some(Checkbox::Checked));
        assert_eq!(Checkbox::from_mark('-'), Some(Checkbox::Partial));
        assert_eq!(Checkbox::from_mark('?'), None);
        assert_eq!(Checkbox::Checked.mark(), 'X');
    }

    #[test]
    fn raw_styles() {
        assert!(MarkupStyle::Code.is_raw());
        assert!(MarkupStyle::Verbatim.is_raw());
        assert!(!MarkupStyle::Bold.is_raw());
    }
}
