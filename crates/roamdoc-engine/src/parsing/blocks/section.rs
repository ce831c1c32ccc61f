use crate::parsing::ParseSession;
use crate::parsing::classify::{DrawerLine, HeadingMatch};
use crate::parsing::context::ParseContext;
use crate::tree::{BranchMeta, NodeId, NodeKind, SourceSpan, Span};

/// What the file preamble held, and where the body starts.
#[derive(Debug, Default)]
struct Preamble {
    properties: Vec<(String, String)>,
    title: Option<String>,
    keywords: Vec<(String, String)>,
    body: usize,
}

impl ParseSession<'_> {
    /// Parses the whole buffer into a new branch.
    pub(crate) fn parse_branch(&mut self) -> NodeId {
        let n = self.line_count();
        let preamble = self.read_preamble();
        if let Some(title) = &preamble.title {
            log::info!("{}: title '{title}'", self.source);
        }
        if !preamble.properties.is_empty() {
            log::info!(
                "{}: {} file properties",
                self.source,
                preamble.properties.len()
            );
        }

        let meta = BranchMeta {
            source: self.source.to_string(),
            title: preamble.title.clone(),
            properties: preamble.properties.clone(),
            keywords: preamble.keywords,
        };
        let span = SourceSpan::lines(0, n.saturating_sub(1));
        let branch = self.root.add_branch(meta, span, self.buffer.rope().clone());
        self.register_properties(branch, &preamble.properties);
        let ctx = ParseContext::branch(branch);

        let tops: Vec<usize> = (preamble.body..n)
            .filter(|&i| self.class(i).heading.as_ref().is_some_and(|h| h.level == 1))
            .collect();
        let first = tops.first().copied().unwrap_or(n);
        if (preamble.body..first).any(|i| !self.class(i).is_blank) {
            let title = preamble
                .title
                .unwrap_or_else(|| format!("Start of {}", self.source));
            self.build_section_zero(ctx, preamble.body, first, title);
        }
        for (k, &at) in tops.iter().enumerate() {
            let end = tops.get(k + 1).copied().unwrap_or(n);
            if let Some(hm) = &self.class(at).heading {
                self.build_section(ctx, at, end, hm);
            }
        }
        branch
    }

    /// Leading blank lines, an optional file drawer, then file keywords up to
    /// the first line that is neither blank nor a keyword. `#+NAME` belongs to
    /// the element after it and ends the preamble.
    fn read_preamble(&mut self) -> Preamble {
        let n = self.line_count();
        let mut pre = Preamble::default();
        let mut pos = 0;
        while pos < n && self.class(pos).is_blank {
            pos += 1;
        }
        if pos < n && self.class(pos).drawer == Some(DrawerLine::Start) {
            let first_heading = (pos..n)
                .find(|&i| self.class(i).heading.is_some())
                .unwrap_or(n);
            if let Some(drawer) = self.read_drawer(pos, first_heading) {
                pre.properties = drawer.properties;
                pos = drawer.end + 1;
            }
        }
        while pos < n {
            let class = self.class(pos);
            if class.is_blank {
                pos += 1;
                continue;
            }
            match &class.keyword {
                Some(kw) if !kw.is("NAME") => {
                    if kw.is("TITLE") {
                        pre.title = Some(kw.value.clone());
                    }
                    pre.keywords.push((kw.key.clone(), kw.value.clone()));
                    pos += 1;
                }
                _ => break,
            }
        }
        pre.body = pos;
        pre
    }

    /// The synthetic section holding content before the first top heading.
    fn build_section_zero(&mut self, ctx: ParseContext, start: usize, end: usize, title: String) -> NodeId {
        log::info!(
            "{}: section zero '{title}' lines {}-{}",
            self.source,
            start + 1,
            end
        );
        let kind = NodeKind::Section {
            level: 1,
            heading: None,
            title,
            properties: vec![],
        };
        let section = self
            .root
            .push(ctx.container, kind, SourceSpan::lines(start, end - 1));
        self.parse_range(ctx.enter_section(section, 1), start, end);
        section
    }

    /// A section from its heading at `at` up to `end`.
    pub(crate) fn build_section(
        &mut self,
        ctx: ParseContext,
        at: usize,
        end: usize,
        hm: &HeadingMatch,
    ) -> NodeId {
        log::debug!(
            "section '{}' level {} lines {}-{}",
            hm.text,
            hm.level,
            at + 1,
            end
        );
        let kind = NodeKind::Section {
            level: hm.level,
            heading: None,
            title: hm.text.clone(),
            properties: vec![],
        };
        let section = self
            .root
            .push(ctx.container, kind, SourceSpan::lines(at, end - 1));

        let heading = NodeKind::Heading {
            level: hm.level,
            text: hm.text.clone(),
            tags: hm.tags.clone(),
        };
        let cols = Span::new(hm.text_col, hm.text_col + hm.text.len());
        let heading = self
            .root
            .attach_heading(section, heading, SourceSpan::within(at, cols));
        self.resolve_inline(heading, at, &hm.text, hm.text_col);

        let mut body = at + 1;
        if body < end && self.class(body).drawer == Some(DrawerLine::Start) {
            if let Some(drawer) = self.read_drawer(body, end) {
                self.register_properties(section, &drawer.properties);
                if let NodeKind::Section { properties, .. } = self.root.kind_mut(section) {
                    *properties = drawer.properties;
                }
                body = drawer.end + 1;
            }
        }
        self.parse_range(ctx.enter_section(section, hm.level), body, end);
        section
    }
}

#[cfg(test)]
mod tests {
    use crate::parsing::parse_document;
    use crate::tree::NodeKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn titles(text: &str) -> Vec<(usize, String)> {
        let doc = parse_document(text, "t.org");
        doc.root
            .walk(doc.branch)
            .into_iter()
            .filter_map(|id| match doc.root.kind(id) {
                NodeKind::Section { level, title, .. } => Some((*level, title.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn heading_scenario() {
        // Given a single heading with a blank line and a paragraph
        let doc = parse_document("* S\n\nfoo bar\n", "t.org");

        // Then there is one level 1 section
        let root = &doc.root;
        let sections = root.children(doc.branch);
        assert_eq!(sections.len(), 1);
        let section = sections[0];
        let heading = root.heading_of(section).expect("heading");
        assert!(matches!(root.kind(heading), NodeKind::Heading { level: 1, text, .. } if text == "S"));

        // and its body is a blank line then the paragraph
        let body = root.children(section);
        assert_eq!(body.len(), 2);
        assert!(matches!(root.kind(body[0]), NodeKind::BlankLine));
        assert!(matches!(root.kind(body[1]), NodeKind::Paragraph));
        let text = root.children(body[1])[0];
        assert_eq!(root.simple_text(text), Some("foo bar"));
    }

    #[test]
    fn section_zero_uses_title() {
        let got = titles("#+title: Notes\nintro\n* A\n");
        assert_eq!(got, vec![(1, "Notes".to_string()), (1, "A".to_string())]);
    }

    #[test]
    fn section_zero_falls_back_to_source_name() {
        let got = titles("intro\n* A\n");
        assert_eq!(got[0], (1, "Start of t.org".to_string()));
    }

    #[test]
    fn no_section_zero_for_preamble_only() {
        let got = titles("#+title: Notes\n\n* A\n");
        assert_eq!(got, vec![(1, "A".to_string())]);
    }

    #[rstest]
    #[case("* a\n** b\n*** c\n", vec![1, 2, 3])]
    #[case("* a\n** b\n* c\n** d\n", vec![1, 2, 1, 2])]
    #[case("* a\n*** deep\n** mid\n", vec![1, 2, 2])]
    fn nesting_depth(#[case] text: &str, #[case] depths: Vec<usize>) {
        let doc = parse_document(text, "t.org");
        let got: Vec<usize> = doc
            .root
            .walk(doc.branch)
            .into_iter()
            .filter(|&id| matches!(doc.root.kind(id), NodeKind::Section { .. }))
            .map(|id| doc.root.section_depth(id))
            .collect();
        assert_eq!(got, depths);
    }

    #[test]
    fn sibling_sections_close_at_same_level() {
        let doc = parse_document("* a\n** b\ntext\n** c\n* d\n", "t.org");
        let root = &doc.root;
        let tops = root.children(doc.branch);
        assert_eq!(tops.len(), 2);
        assert_eq!(root.children(tops[0]).len(), 2);
        assert_eq!(root.node(tops[0]).span.end_line, 3);
    }

    #[test]
    fn heading_tags_and_markup() {
        let doc = parse_document("* Read *this* :work:\n", "t.org");
        let section = doc.root.children(doc.branch)[0];
        let heading = doc.root.heading_of(section).expect("heading");
        let NodeKind::Heading { tags, .. } = doc.root.kind(heading) else {
            panic!("expected heading");
        };
        assert_eq!(tags, &vec!["work".to_string()]);
        assert_eq!(doc.root.children(heading).len(), 2);
    }

    #[test]
    fn file_drawer_registers_branch() {
        let doc = parse_document(":PROPERTIES:\n:ID: file-1\n:END:\n* A\n", "t.org");
        assert_eq!(doc.root.resolve("id:file-1"), Some(doc.branch));
    }

    #[test]
    fn name_keyword_ends_preamble() {
        let doc = parse_document("#+NAME: tbl\n| a |\n", "t.org");
        let section = doc.root.children(doc.branch)[0];
        let table = doc.root.children(section)[0];
        assert!(matches!(doc.root.kind(table), NodeKind::Table));
        assert_eq!(doc.root.resolve("tbl"), Some(table));
    }
}
