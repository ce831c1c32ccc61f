use crate::parsing::ParseSession;
use crate::parsing::classify::TableLine;
use crate::parsing::context::ParseContext;
use crate::tree::{NodeId, NodeKind, SourceSpan, Span};

/// Column spans of the cells of a `|`-row, excluding the pipes.
///
/// A trailing segment after the last pipe counts only when it holds text.
pub fn cell_spans(line: &str) -> Vec<Span> {
    let pipes: Vec<usize> = line.match_indices('|').map(|(i, _)| i).collect();
    let mut cells: Vec<Span> = pipes
        .windows(2)
        .map(|w| Span::new(w[0] + 1, w[1]))
        .collect();
    if let Some(&last) = pipes.last()
        && !line[last + 1..].trim().is_empty()
    {
        cells.push(Span::new(last + 1, line.len()));
    }
    cells
}

impl ParseSession<'_> {
    /// Builds the table starting at `at` and returns the line after it.
    pub(crate) fn build_table(&mut self, ctx: ParseContext, at: usize, end: usize) -> usize {
        let mut last = at;
        while last + 1 < end && self.class(last + 1).table.is_some() {
            last += 1;
        }
        log::debug!("table lines {}-{}", at + 1, last + 1);
        let table = self
            .root
            .push(ctx.container, NodeKind::Table, SourceSpan::lines(at, last));
        self.register_name(table, at);

        let first_rule = (at..=last).find(|&i| self.class(i).table == Some(TableLine::Separator));
        let header_end = first_rule.filter(|&r| ((r + 1)..=last).any(|i| self.class(i).is_table_row()));

        for i in at..=last {
            if !self.class(i).is_table_row() {
                continue;
            }
            let header = header_end.is_some_and(|r| i < r);
            let row = self
                .root
                .push(table, NodeKind::TableRow { header }, SourceSpan::line(i));
            self.build_cells(row, i);
        }
        last + 1
    }

    fn build_cells(&mut self, row: NodeId, i: usize) {
        let line = self.line(i);
        for sp in cell_spans(line) {
            let raw = &line[sp.start..sp.end];
            let text = raw.trim();
            let col = sp.start + (raw.len() - raw.trim_start().len());
            let cell = self
                .root
                .push(row, NodeKind::TableCell, SourceSpan::within(i, sp));
            if !text.is_empty() {
                self.resolve_inline(cell, i, text, col);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_document;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("| a | b |", vec![(1, 4), (5, 8)])]
    #[case("  |x|", vec![(3, 4)])]
    #[case("| a | b", vec![(1, 4), (5, 7)])]
    #[case("||", vec![(1, 1)])]
    fn splits_cells(#[case] line: &str, #[case] expected: Vec<(usize, usize)>) {
        let got: Vec<(usize, usize)> = cell_spans(line).iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn header_rows_and_separators() {
        // Given a table with a rule under its first row
        let doc = parse_document("| h1 | h2 |\n|----+----|\n| a | *b* |\n", "t.org");
        let root = &doc.root;
        let section = root.children(doc.branch)[0];
        let table = root.children(section)[0];

        // Then the rule is dropped and the first row is a header
        let rows = root.children(table);
        assert_eq!(rows.len(), 2);
        assert!(matches!(root.kind(rows[0]), NodeKind::TableRow { header: true }));
        assert!(matches!(root.kind(rows[1]), NodeKind::TableRow { header: false }));

        // and cells hold inline content
        let cells = root.children(rows[1]);
        assert_eq!(cells.len(), 2);
        let bold = root.children(cells[1])[0];
        assert_eq!(root.kind(bold).class_name(), "BoldText");
        assert_eq!(root.simple_text(root.children(cells[0])[0]), Some("a"));
    }

    #[test]
    fn trailing_rule_makes_no_header() {
        let doc = parse_document("| a |\n|---|\n", "t.org");
        let section = doc.root.children(doc.branch)[0];
        let table = doc.root.children(section)[0];
        let row = doc.root.children(table)[0];
        assert!(matches!(doc.root.kind(row), NodeKind::TableRow { header: false }));
    }

    #[test]
    fn table_ends_at_next_element() {
        let doc = parse_document("| a |\n- item\n", "t.org");
        let section = doc.root.children(doc.branch)[0];
        let kinds: Vec<&str> = doc
            .root
            .children(section)
            .iter()
            .map(|&c| doc.root.kind(c).class_name())
            .collect();
        assert_eq!(kinds, vec!["Table", "UnorderedList"]);
    }
}
