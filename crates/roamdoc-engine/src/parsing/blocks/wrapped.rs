use crate::parsing::ParseSession;
use crate::parsing::classify::{BlockBegin, TAB_WIDTH, WrappedKind};
use crate::parsing::context::ParseContext;
use crate::tree::{NodeId, NodeKind, SourceSpan};

/// Prefixes a single leading comma protects inside verbatim blocks.
const COMMA_ESCAPED: [&str; 3] = [",*", ",#+", ",,"];

/// Removes up to `width` columns of leading indentation.
fn strip_indent(line: &str, width: usize) -> &str {
    let mut cols = 0;
    for (i, c) in line.char_indices() {
        if cols >= width {
            return &line[i..];
        }
        match c {
            ' ' => cols += 1,
            '\t' => cols += TAB_WIDTH,
            _ => return &line[i..],
        }
    }
    ""
}

/// Drops one protecting comma from the start of a verbatim line.
pub fn unescape_line(line: &str) -> &str {
    if COMMA_ESCAPED.iter().any(|p| line.starts_with(p)) {
        &line[1..]
    } else {
        line
    }
}

/// First word of the block arguments, and the rest if any.
fn split_args(args: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(args) = args.map(str::trim).filter(|a| !a.is_empty()) else {
        return (None, None);
    };
    match args.split_once(char::is_whitespace) {
        Some((first, rest)) => {
            let rest = rest.trim();
            (
                Some(first.to_string()),
                (!rest.is_empty()).then(|| rest.to_string()),
            )
        }
        None => (Some(args.to_string()), None),
    }
}

impl ParseSession<'_> {
    /// Builds the block opened at `at` and closed at `close`.
    pub(crate) fn build_wrapped(
        &mut self,
        ctx: ParseContext,
        at: usize,
        close: usize,
        begin: &BlockBegin,
    ) -> NodeId {
        log::debug!(
            "{} block lines {}-{}",
            begin.kind.name(),
            at + 1,
            close + 1
        );
        let span = SourceSpan::lines(at, close);
        let args = begin.args.clone();
        if !begin.kind.is_verbatim() {
            let kind = match begin.kind {
                WrappedKind::Center => NodeKind::Center { args },
                _ => NodeKind::Quote { args },
            };
            let node = self.root.push(ctx.container, kind, span);
            self.parse_range(ctx.enter(node), at + 1, close);
            return node;
        }

        let text = self.verbatim_text(at, close);
        let kind = match begin.kind {
            WrappedKind::Src => {
                let (language, args) = split_args(args.as_deref());
                NodeKind::CodeBlock {
                    language,
                    args,
                    text,
                }
            }
            WrappedKind::Export => {
                let (backend, _) = split_args(args.as_deref());
                NodeKind::ExportBlock { backend, text }
            }
            WrappedKind::Comment => NodeKind::CommentBlock { text },
            _ => NodeKind::ExampleBlock { args, text },
        };
        self.root.push(ctx.container, kind, span)
    }

    /// Interior lines joined with `\n`, dedented to the begin line and
    /// comma-unescaped.
    fn verbatim_text(&self, at: usize, close: usize) -> String {
        let indent = self.class(at).indent;
        ((at + 1)..close)
            .map(|i| unescape_line(strip_indent(self.line(i), indent)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{DiagnosticKind, parse_document};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn first_block(text: &str) -> NodeKind {
        let doc = parse_document(text, "w.org");
        let section = doc.root.children(doc.branch)[0];
        doc.root.kind(doc.root.children(section)[0]).clone()
    }

    #[rstest]
    #[case(",* not a heading", "* not a heading")]
    #[case(",#+keyword", "#+keyword")]
    #[case(",,twice", ",twice")]
    #[case(",plain", ",plain")]
    fn comma_escapes(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(unescape_line(line), expected);
    }

    #[rstest]
    #[case("    code", 2, "  code")]
    #[case("\tcode", 8, "code")]
    #[case("code", 4, "code")]
    #[case("  ", 4, "")]
    fn dedent(#[case] line: &str, #[case] width: usize, #[case] expected: &str) {
        assert_eq!(strip_indent(line, width), expected);
    }

    #[test]
    fn src_block_is_verbatim() {
        // Given a source block whose body looks like markup
        let text = "#+BEGIN_SRC rust :tangle no\nlet x = *y*;\n,* escaped\n#+END_SRC\n";

        // Then the body is kept as opaque text
        let kind = first_block(text);
        let NodeKind::CodeBlock {
            language,
            args,
            text,
        } = &kind
        else {
            panic!("expected code block, got {kind:?}");
        };
        assert_eq!(language.as_deref(), Some("rust"));
        assert_eq!(args.as_deref(), Some(":tangle no"));
        assert_eq!(text, "let x = *y*;\n* escaped");
    }

    #[test]
    fn indented_example_is_dedented() {
        let kind = first_block("  #+begin_example\n    a\n  b\n  #+end_example\n");
        assert!(matches!(kind, NodeKind::ExampleBlock { text, .. } if text == "  a\nb"));
    }

    #[test]
    fn quote_body_is_parsed() {
        let doc = parse_document("#+BEGIN_QUOTE\n- item\n\n/said/\n#+END_QUOTE\n", "w.org");
        let section = doc.root.children(doc.branch)[0];
        let quote = doc.root.children(section)[0];
        assert_eq!(doc.root.kind(quote).class_name(), "Blockquote");
        let inner: Vec<&str> = doc
            .root
            .children(quote)
            .iter()
            .map(|&c| doc.root.kind(c).class_name())
            .collect();
        assert_eq!(inner, vec!["UnorderedList", "BlankLine", "Paragraph"]);
    }

    #[test]
    fn export_backend_and_comment() {
        assert!(matches!(
            first_block("#+BEGIN_EXPORT html\n<b>x</b>\n#+END_EXPORT\n"),
            NodeKind::ExportBlock { backend: Some(b), text } if b == "html" && text == "<b>x</b>"
        ));
        assert!(matches!(
            first_block("#+BEGIN_COMMENT\nhidden\n#+END_COMMENT\n"),
            NodeKind::CommentBlock { text } if text == "hidden"
        ));
    }

    #[test]
    fn unterminated_block_falls_back_to_text() {
        let doc = parse_document("#+BEGIN_SRC sh\necho hi\n", "w.org");
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].kind, DiagnosticKind::UnterminatedBlock);
        let section = doc.root.children(doc.branch)[0];
        let para = doc.root.children(section)[0];
        assert_eq!(doc.root.kind(para).class_name(), "Paragraph");
        assert_eq!(doc.root.simple_text(doc.root.children(para)[0]), Some("echo hi"));
    }

    #[test]
    fn empty_block_has_empty_text() {
        assert!(matches!(
            first_block("#+BEGIN_EXAMPLE\n#+END_EXAMPLE\n"),
            NodeKind::ExampleBlock { text, .. } if text.is_empty()
        ));
    }
}
