use std::fmt::Write;

use super::RenderError;
use crate::tree::{ListStyle, MarkupStyle, NodeId, NodeKind, Root};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatexOptions {
    /// Document title; falls back to the trunk's `#+title`.
    pub title: Option<String>,
}

/// Escapes LaTeX special characters in running text.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes the characters `\href` does not accept raw in a URL.
fn escape_url(url: &str) -> String {
    url.replace('%', "\\%").replace('#', "\\#")
}

fn sectioning(level: usize) -> &'static str {
    match level {
        1 => "section",
        2 => "subsection",
        3 => "subsubsection",
        4 => "paragraph",
        _ => "subparagraph",
    }
}

fn markup_command(style: MarkupStyle) -> &'static str {
    match style {
        MarkupStyle::Bold => "textbf",
        MarkupStyle::Italic => "emph",
        MarkupStyle::Underlined => "uline",
        MarkupStyle::Linethrough => "sout",
        MarkupStyle::Code | MarkupStyle::Verbatim => "texttt",
    }
}

fn environment(style: ListStyle) -> &'static str {
    match style {
        ListStyle::Ordered => "enumerate",
        ListStyle::Unordered => "itemize",
        ListStyle::Definition => "description",
    }
}

/// Nesting level of `list` among enumerate environments, counting itself.
fn enumerate_depth(root: &Root, list: NodeId) -> usize {
    std::iter::once(list)
        .chain(root.ancestors(list))
        .filter(|&a| {
            matches!(
                root.kind(a),
                NodeKind::List {
                    style: ListStyle::Ordered,
                    ..
                }
            )
        })
        .count()
}

fn enum_counter(depth: usize) -> &'static str {
    match depth {
        0 | 1 => "enumi",
        2 => "enumii",
        3 => "enumiii",
        _ => "enumiv",
    }
}

struct LatexWriter<'r> {
    root: &'r Root,
    out: String,
}

impl LatexWriter<'_> {
    fn label(&mut self, id: NodeId) -> Result<(), RenderError> {
        write!(self.out, "\\label{{obj-{id}}}")?;
        Ok(())
    }

    /// Inline content of `id`: its children, or its own text when it has none.
    fn inline(&self, id: NodeId) -> String {
        let root = self.root;
        let children = root.children(id);
        if children.is_empty() {
            return root.kind(id).text().map(escape).unwrap_or_default();
        }
        children.iter().map(|&c| self.inline_node(c)).collect()
    }

    fn inline_node(&self, id: NodeId) -> String {
        let root = self.root;
        match root.kind(id) {
            NodeKind::Text { text } => escape(text),
            NodeKind::Markup { style, .. } => {
                format!("\\{}{{{}}}", markup_command(*style), self.inline(id))
            }
            NodeKind::Target { .. } => format!("\\label{{obj-{id}}}{}", self.inline(id)),
            NodeKind::Link {
                target,
                description,
            } => format!(
                "\\href{{{}}}{{{}}}",
                escape_url(target),
                escape(description.as_deref().unwrap_or(target))
            ),
            NodeKind::InternalLink {
                target,
                description,
                ..
            } => {
                let shown = escape(description.as_deref().unwrap_or(target));
                match root.resolve_link(id) {
                    Some(found) => format!("\\hyperref[obj-{found}]{{{shown}}}"),
                    None => format!(
                        "{shown} \\textcolor{{red}}{{\\textit{{(link target not found)}}}}"
                    ),
                }
            }
            NodeKind::Image { path, .. } => {
                format!("\\includegraphics[width=\\linewidth]{{{path}}}")
            }
            _ => self.inline(id),
        }
    }

    fn block(&mut self, id: NodeId) -> Result<(), RenderError> {
        let root = self.root;
        match root.kind(id) {
            NodeKind::Branch(_) => self.blocks(id)?,
            NodeKind::Section { level, title, .. } => {
                let cmd = sectioning(*level);
                match root.heading_of(id) {
                    Some(h) => {
                        let text = self.inline(h);
                        write!(self.out, "\\{cmd}{{{text}}}")?;
                        self.label(h)?;
                    }
                    None => write!(self.out, "\\{cmd}*{{{}}}", escape(title))?,
                }
                self.label(id)?;
                self.out.push_str("\n\n");
                self.blocks(id)?;
            }
            NodeKind::Paragraph => {
                for &c in root.children(id) {
                    match root.kind(c) {
                        NodeKind::BlankLine => self.out.push_str("\n\\medskip\n"),
                        _ => {
                            let text = self.inline_node(c);
                            self.out.push_str(&text);
                            if matches!(root.kind(c), NodeKind::Text { .. }) {
                                self.out.push(' ');
                            }
                        }
                    }
                }
                self.out.push_str("\n\n");
            }
            NodeKind::BlankLine => self.out.push_str("\\medskip\n\n"),
            NodeKind::List { style, .. } => {
                let env = environment(*style);
                writeln!(self.out, "\\begin{{{env}}}")?;
                if let Some(n) = root.list_start(id) {
                    let counter = enum_counter(enumerate_depth(root, id));
                    writeln!(self.out, "\\setcounter{{{counter}}}{{{}}}", i128::from(n) - 1)?;
                }
                if !root.node(id).link_targets.is_empty() {
                    self.label(id)?;
                    self.out.push('\n');
                }
                self.blocks(id)?;
                writeln!(self.out, "\\end{{{env}}}")?;
            }
            NodeKind::ListItem { checkbox, .. } => {
                let children = root.children(id);
                let title = children
                    .iter()
                    .find(|&&c| matches!(root.kind(c), NodeKind::DefinitionTitle { .. }));
                match title {
                    Some(&t) => {
                        let term = self.inline(t);
                        write!(self.out, "\\item[{term}] ")?;
                    }
                    None => self.out.push_str("\\item "),
                }
                if let Some(cb) = checkbox {
                    write!(self.out, "[{}] ", escape(&cb.mark().to_string()))?;
                }
                self.label(id)?;
                for &c in children {
                    if is_inline(root.kind(c)) {
                        let text = self.inline_node(c);
                        self.out.push_str(&text);
                    } else if !matches!(root.kind(c), NodeKind::DefinitionTitle { .. }) {
                        self.out.push('\n');
                        self.block(c)?;
                    }
                }
                self.out.push('\n');
            }
            NodeKind::DefinitionDescription => {
                for &c in root.children(id) {
                    if is_inline(root.kind(c)) {
                        let text = self.inline_node(c);
                        self.out.push_str(&text);
                    } else {
                        self.out.push('\n');
                        self.block(c)?;
                    }
                }
            }
            NodeKind::Table => {
                let columns = root
                    .children(id)
                    .iter()
                    .map(|&r| root.children(r).len())
                    .max()
                    .unwrap_or(1)
                    .max(1);
                let layout = "|l".repeat(columns) + "|";
                writeln!(self.out, "\\begin{{tabular}}{{{layout}}}")?;
                writeln!(self.out, "\\hline")?;
                for &row in root.children(id) {
                    let cells: Vec<String> = root
                        .children(row)
                        .iter()
                        .map(|&c| self.inline(c))
                        .collect();
                    writeln!(self.out, "{} \\\\", cells.join(" & "))?;
                    writeln!(self.out, "\\hline")?;
                }
                writeln!(self.out, "\\end{{tabular}}")?;
                if !root.node(id).link_targets.is_empty() {
                    self.label(id)?;
                }
                self.out.push_str("\n\n");
            }
            NodeKind::Quote { .. } => {
                writeln!(self.out, "\\begin{{quote}}")?;
                self.blocks(id)?;
                writeln!(self.out, "\\end{{quote}}")?;
            }
            NodeKind::Center { .. } => {
                writeln!(self.out, "\\begin{{center}}")?;
                self.blocks(id)?;
                writeln!(self.out, "\\end{{center}}")?;
            }
            NodeKind::CodeBlock { text, .. } | NodeKind::ExampleBlock { text, .. } => {
                writeln!(self.out, "\\begin{{verbatim}}")?;
                writeln!(self.out, "{text}")?;
                writeln!(self.out, "\\end{{verbatim}}")?;
            }
            NodeKind::CommentBlock { text } => {
                for line in text.lines() {
                    writeln!(self.out, "% {line}")?;
                }
            }
            NodeKind::ExportBlock { backend, text } => {
                if backend.as_deref().is_some_and(|b| b.eq_ignore_ascii_case("latex")) {
                    writeln!(self.out, "{text}")?;
                }
            }
            _ => {
                let text = self.inline_node(id);
                self.out.push_str(&text);
            }
        }
        Ok(())
    }

    fn blocks(&mut self, id: NodeId) -> Result<(), RenderError> {
        for &c in self.root.children(id) {
            self.block(c)?;
        }
        Ok(())
    }
}

fn is_inline(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Text { .. }
            | NodeKind::Markup { .. }
            | NodeKind::Target { .. }
            | NodeKind::Link { .. }
            | NodeKind::InternalLink { .. }
            | NodeKind::Image { .. }
    )
}

/// Renders every branch of `root` as one LaTeX article.
pub fn to_latex(root: &Root, options: &LatexOptions) -> Result<String, RenderError> {
    let title = options.title.clone().or_else(|| {
        root.trunk().and_then(|t| match root.kind(t) {
            NodeKind::Branch(meta) => meta.title.clone(),
            _ => None,
        })
    });

    let mut writer = LatexWriter {
        root,
        out: String::new(),
    };
    writeln!(writer.out, "\\documentclass{{article}}")?;
    writeln!(writer.out, "\\usepackage[utf8]{{inputenc}}")?;
    writeln!(writer.out, "\\usepackage{{graphicx}}")?;
    writeln!(writer.out, "\\usepackage[normalem]{{ulem}}")?;
    writeln!(writer.out, "\\usepackage{{xcolor}}")?;
    writeln!(writer.out, "\\usepackage{{hyperref}}")?;
    if let Some(title) = &title {
        writeln!(writer.out, "\\title{{{}}}", escape(title))?;
    }
    writeln!(writer.out, "\\begin{{document}}")?;
    if title.is_some() {
        writeln!(writer.out, "\\maketitle")?;
    }
    writer.out.push('\n');
    for &branch in root.branches() {
        writer.block(branch)?;
    }
    writeln!(writer.out, "\\end{{document}}")?;
    Ok(writer.out)
}
