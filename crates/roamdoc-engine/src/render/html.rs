use std::collections::BTreeMap;
use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::RenderError;
use super::json::to_json;
use crate::tree::{ListStyle, MarkupStyle, NodeId, NodeKind, Root};

pub const DEFAULT_STYLESHEET: &str = "https://gongzhitaao.org/orgcss/org.css";

const NOT_FOUND_STYLE: &str = "color: red; font-style: italic; font-weight: bold;";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Emit a full document with head, styles and body.
    pub wrap: bool,
    /// Stylesheet linked from the head.
    pub stylesheet: Option<String>,
    /// Embed the JSON dump as `var obj_tree` in a script tag.
    pub include_json: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            wrap: true,
            stylesheet: Some(DEFAULT_STYLESHEET.to_string()),
            include_json: false,
        }
    }
}

type Styles = &'static [(&'static str, &'static str)];

/// Extra CSS for a node class, collected into the head's style block.
fn class_styles(kind: &NodeKind) -> Styles {
    match kind {
        NodeKind::Markup { style, .. } => match style {
            MarkupStyle::Bold => &[("font-weight", "bold")],
            MarkupStyle::Italic => &[("font-style", "italic")],
            MarkupStyle::Underlined => &[("text-decoration", "underline")],
            MarkupStyle::Linethrough => &[("text-decoration", "line-through")],
            MarkupStyle::Code | MarkupStyle::Verbatim => &[("font-family", "monospace")],
        },
        NodeKind::CodeBlock { .. } | NodeKind::ExampleBlock { .. } => {
            &[("white-space", "pre-wrap"), ("font-family", "monospace")]
        }
        NodeKind::Center { .. } => &[("text-align", "center")],
        NodeKind::CommentBlock { .. } => &[("display", "none")],
        NodeKind::Table => &[
            ("table-layout", "fixed"),
            ("margin-left", "10em"),
            ("border", "1px solid black"),
        ],
        NodeKind::TableRow { .. } | NodeKind::TableCell => &[("border", "1px solid black")],
        _ => &[],
    }
}

fn tag_for(root: &Root, id: NodeId) -> &'static str {
    match root.kind(id) {
        NodeKind::Branch(_) | NodeKind::Section { .. } | NodeKind::Center { .. } => "div",
        NodeKind::Heading { level, .. } => match level {
            1 => "h1",
            2 => "h2",
            3 => "h3",
            4 => "h4",
            5 => "h5",
            _ => "h6",
        },
        NodeKind::Paragraph => "p",
        NodeKind::Text { .. } | NodeKind::Target { .. } => "span",
        NodeKind::Markup { style, .. } => match style {
            MarkupStyle::Bold => "b",
            MarkupStyle::Italic => "i",
            MarkupStyle::Underlined => "u",
            MarkupStyle::Linethrough => "s",
            MarkupStyle::Code | MarkupStyle::Verbatim => "code",
        },
        NodeKind::List { style, .. } => match style {
            ListStyle::Ordered => "ol",
            ListStyle::Unordered => "ul",
            ListStyle::Definition => "dl",
        },
        NodeKind::ListItem { style, .. } => match style {
            ListStyle::Definition => "div",
            _ => "li",
        },
        NodeKind::DefinitionTitle { .. } => "dt",
        NodeKind::DefinitionDescription => "dd",
        NodeKind::Table => "table",
        NodeKind::TableRow { .. } => "tr",
        NodeKind::TableCell => {
            let header = root
                .parent(id)
                .is_some_and(|row| matches!(root.kind(row), NodeKind::TableRow { header: true }));
            if header { "th" } else { "td" }
        }
        NodeKind::Quote { .. } => "blockquote",
        NodeKind::CodeBlock { .. } | NodeKind::ExampleBlock { .. } => "pre",
        NodeKind::CommentBlock { .. } | NodeKind::ExportBlock { .. } => "div",
        NodeKind::Link { .. } | NodeKind::InternalLink { .. } => "a",
        NodeKind::Image { .. } => "img",
        NodeKind::BlankLine => "br",
    }
}

struct HtmlWriter<'r> {
    root: &'r Root,
    out: String,
    css: BTreeMap<String, Styles>,
}

impl<'r> HtmlWriter<'r> {
    fn new(root: &'r Root) -> Self {
        Self {
            root,
            out: String::new(),
            css: BTreeMap::new(),
        }
    }

    /// `<tag id="obj-N" class="org-auto-Class"` without the closing `>`.
    fn open(&mut self, id: NodeId, tag: &str, depth: usize) -> Result<(), RenderError> {
        let kind = self.root.kind(id);
        let class = format!("org-auto-{}", kind.class_name());
        let styles = class_styles(kind);
        if !styles.is_empty() {
            self.css.insert(class.clone(), styles);
        }
        write!(
            self.out,
            "{:pad$}<{tag} id=\"obj-{id}\" class=\"{class}\"",
            "",
            pad = depth * 4
        )?;
        Ok(())
    }

    fn node(&mut self, id: NodeId, depth: usize) -> Result<(), RenderError> {
        let root = self.root;
        let tag = tag_for(root, id);
        match root.kind(id) {
            NodeKind::Text { text } => {
                self.open(id, tag, depth)?;
                writeln!(self.out, ">{}</{tag}>", encode_text(text))?;
            }
            NodeKind::Markup { text, .. } | NodeKind::Target { name: text }
                if root.children(id).is_empty() =>
            {
                self.open(id, tag, depth)?;
                writeln!(self.out, ">{}</{tag}>", encode_text(text))?;
            }
            NodeKind::CodeBlock { text, language, .. } => {
                self.open(id, tag, depth)?;
                if let Some(lang) = language {
                    write!(self.out, " data-language=\"{}\"", encode_double_quoted_attribute(lang))?;
                }
                writeln!(self.out, ">{}</{tag}>", encode_text(text))?;
            }
            NodeKind::ExampleBlock { text, .. } | NodeKind::CommentBlock { text } => {
                self.open(id, tag, depth)?;
                writeln!(self.out, ">{}</{tag}>", encode_text(text))?;
            }
            NodeKind::ExportBlock { backend, text } => {
                self.open(id, tag, depth)?;
                if backend.as_deref().is_some_and(|b| b.eq_ignore_ascii_case("html")) {
                    writeln!(self.out, ">{text}</{tag}>")?;
                } else {
                    writeln!(self.out, " hidden></{tag}>")?;
                }
            }
            NodeKind::Link {
                target,
                description,
            } => {
                self.open(id, tag, depth)?;
                let shown = description.as_deref().unwrap_or(target);
                writeln!(
                    self.out,
                    " href=\"{}\">{}</{tag}>",
                    encode_double_quoted_attribute(target),
                    encode_text(shown)
                )?;
            }
            NodeKind::InternalLink {
                target,
                description,
                ..
            } => {
                let shown = encode_text(description.as_deref().unwrap_or(target)).into_owned();
                match root.resolve_link(id) {
                    Some(found) => {
                        self.open(id, tag, depth)?;
                        writeln!(self.out, " href=\"#obj-{found}\">{shown}</{tag}>")?;
                    }
                    None => {
                        self.open(id, "span", depth)?;
                        writeln!(
                            self.out,
                            ">{shown}</span><span style=\"{NOT_FOUND_STYLE}\"> !!! link target not found !!!</span>"
                        )?;
                    }
                }
            }
            NodeKind::Image { path, alt } => {
                self.open(id, tag, depth)?;
                write!(self.out, " src=\"{}\"", encode_double_quoted_attribute(path))?;
                if let Some(alt) = alt {
                    write!(self.out, " alt=\"{}\"", encode_double_quoted_attribute(alt))?;
                }
                writeln!(self.out, "/>")?;
            }
            NodeKind::BlankLine => {
                self.open(id, tag, depth)?;
                writeln!(self.out, "/>")?;
            }
            NodeKind::ListItem { counter, checkbox, .. } => {
                self.open(id, tag, depth)?;
                if let Some(n) = counter.as_deref().and_then(|c| c.parse::<u64>().ok()) {
                    write!(self.out, " value=\"{n}\"")?;
                }
                writeln!(self.out, ">")?;
                if let Some(cb) = checkbox {
                    writeln!(self.out, "{:pad$}[{}]", "", cb.mark(), pad = (depth + 1) * 4)?;
                }
                self.children(id, depth)?;
                writeln!(self.out, "{:pad$}</{tag}>", "", pad = depth * 4)?;
            }
            NodeKind::List { .. } => {
                self.open(id, tag, depth)?;
                if let Some(n) = root.list_start(id) {
                    write!(self.out, " start=\"{n}\"")?;
                }
                writeln!(self.out, ">")?;
                self.children(id, depth)?;
                writeln!(self.out, "{:pad$}</{tag}>", "", pad = depth * 4)?;
            }
            NodeKind::Quote { args: Some(cite) } => {
                self.open(id, tag, depth)?;
                writeln!(self.out, " cite=\"{}\">", encode_double_quoted_attribute(cite))?;
                self.children(id, depth)?;
                writeln!(self.out, "{:pad$}</{tag}>", "", pad = depth * 4)?;
            }
            _ => {
                self.open(id, tag, depth)?;
                writeln!(self.out, ">")?;
                if let Some(h) = root.heading_of(id) {
                    self.node(h, depth + 1)?;
                } else if let NodeKind::Section { title, .. } = root.kind(id) {
                    writeln!(
                        self.out,
                        "{:pad$}<h1 class=\"org-auto-SectionTitle\">{}</h1>",
                        "",
                        encode_text(title),
                        pad = (depth + 1) * 4
                    )?;
                }
                self.children(id, depth)?;
                writeln!(self.out, "{:pad$}</{tag}>", "", pad = depth * 4)?;
            }
        }
        Ok(())
    }

    fn children(&mut self, id: NodeId, depth: usize) -> Result<(), RenderError> {
        for &child in self.root.children(id) {
            self.node(child, depth + 1)?;
        }
        Ok(())
    }

    fn style_block(&self) -> Result<String, RenderError> {
        let mut s = String::new();
        for (class, styles) in &self.css {
            writeln!(s, ".{class} {{")?;
            for (name, value) in styles.iter() {
                writeln!(s, "   {name}: {value} !important;")?;
            }
            writeln!(s, "}}")?;
        }
        Ok(s)
    }
}

/// Renders every branch of `root` as HTML.
pub fn to_html(root: &Root, options: &HtmlOptions) -> Result<String, RenderError> {
    let mut writer = HtmlWriter::new(root);
    for &branch in root.branches() {
        writer.node(branch, 0)?;
    }
    if !options.wrap {
        return Ok(writer.out);
    }

    let mut doc = String::new();
    writeln!(doc, "<!DOCTYPE html>")?;
    writeln!(doc, "<html>")?;
    writeln!(doc, " <head>")?;
    writeln!(doc, "  <meta charset=\"utf-8\"/>")?;
    let title = root.trunk().and_then(|t| match root.kind(t) {
        NodeKind::Branch(meta) => meta.title.clone(),
        _ => None,
    });
    if let Some(title) = title {
        writeln!(doc, "  <title>{}</title>", encode_text(&title))?;
    }
    if let Some(sheet) = &options.stylesheet {
        writeln!(
            doc,
            "  <link rel=\"stylesheet\" type=\"text/css\" href=\"{}\"/>",
            encode_double_quoted_attribute(sheet)
        )?;
    }
    writeln!(doc, "  <style>")?;
    doc.push_str(&writer.style_block()?);
    writeln!(doc, "  </style>")?;
    if options.include_json {
        let json = to_json(root)?.replace("</", "<\\/");
        writeln!(doc, "  <script>")?;
        writeln!(doc, "      var obj_tree = {json};")?;
        writeln!(doc, "  </script>")?;
    }
    writeln!(doc, " </head>")?;
    writeln!(doc, "<body>")?;
    doc.push_str(&writer.out);
    writeln!(doc, "</body>")?;
    writeln!(doc, "</html>")?;
    Ok(doc)
}
