//! List building in three passes: find the outer list's extent, compute each
//! item's depth and parent, then emit items with their nested lists.

use crate::parsing::classify::ListItemMatch;
use crate::parsing::context::ParseContext;
use crate::parsing::{DiagnosticKind, ParseSession};
use crate::tree::{ListStyle, NodeId, NodeKind, SourceSpan, Span};

/// Where the outer list stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Extent {
    /// Last line with list content.
    last: usize,
    /// Two terminating blank lines, kept on the list.
    blanks: Option<(usize, usize)>,
}

/// One item line with its computed placement.
#[derive(Debug, Clone)]
struct Entry<'a> {
    line: usize,
    item: &'a ListItemMatch,
    depth: usize,
    parent: Option<usize>,
    /// Line after the item's own continuation lines.
    extras_end: usize,
    /// Last line of the item and all its descendants.
    subtree_end: usize,
}

impl<'a> ParseSession<'a> {
    /// Builds the list whose first item is at `at` and returns the line
    /// after it.
    pub(crate) fn build_list(&mut self, ctx: ParseContext, at: usize, end: usize) -> usize {
        let Some(first) = &self.class(at).item else {
            return at + 1;
        };
        let margin = first.indent;
        let (extent, item_lines) = self.list_extent(at, end, first);
        log::debug!(
            "{:?} list at line {} margin {margin}, {} items",
            first.style,
            at + 1,
            item_lines.len()
        );

        let entries = self.place_items(&item_lines, margin, extent.last);
        let last_line = extent.blanks.map_or(extent.last, |(_, b)| b);
        let list = self.root.push(
            ctx.container,
            NodeKind::List {
                style: first.style,
                margin,
            },
            SourceSpan::lines(at, last_line),
        );
        self.register_name(list, at);

        let tops: Vec<usize> = (0..entries.len())
            .filter(|&k| entries[k].parent.is_none())
            .collect();
        for k in tops {
            self.emit_item(ctx, list, &entries, k);
        }
        if let Some((a, b)) = extent.blanks {
            self.root.push(list, NodeKind::BlankLine, SourceSpan::line(a));
            self.root.push(list, NodeKind::BlankLine, SourceSpan::line(b));
            return b + 1;
        }
        extent.last + 1
    }

    /// Scans forward from the first item. Returns the extent and the lines
    /// that hold items; lines inside wrapped blocks are never items.
    fn list_extent(&mut self, at: usize, end: usize, first: &ListItemMatch) -> (Extent, Vec<usize>) {
        let margin = first.indent;
        let mut items = vec![at];
        let mut last = at;
        let mut blank_run = 0;
        let mut i = at + 1;
        while i < end {
            let class = self.class(i);
            if class.is_blank {
                blank_run += 1;
                if blank_run == 2 {
                    let blanks = Some((i - 1, i));
                    return (Extent { last, blanks }, items);
                }
                i += 1;
                continue;
            }
            blank_run = 0;
            if class.heading.is_some() {
                break;
            }
            if let Some(item) = &class.item {
                if item.indent < margin {
                    break;
                }
                if item.indent == margin && item.style != first.style {
                    self.diag(
                        DiagnosticKind::InconsistentListItem,
                        i,
                        format!(
                            "{:?} item ends a {:?} list; starting a new list",
                            item.style, first.style
                        ),
                    );
                    break;
                }
                items.push(i);
                last = i;
                i += 1;
                continue;
            }
            if class.indent <= margin {
                break;
            }
            if let Some(begin) = &class.begin
                && let Some(close) = self.find_block_end(begin.kind, i + 1, end)
            {
                last = close;
                i = close + 1;
                continue;
            }
            last = i;
            i += 1;
        }
        (Extent { last, blanks: None }, items)
    }

    /// Depth from indentation, parent from depth.
    ///
    /// The indent-per-level ratio comes from the first item indented past the
    /// margin. An item deeper than one below its predecessor's level is
    /// shifted left to the deepest level that exists.
    fn place_items(&mut self, item_lines: &[usize], margin: usize, last: usize) -> Vec<Entry<'a>> {
        let items: Vec<(usize, &'a ListItemMatch)> = item_lines
            .iter()
            .filter_map(|&l| self.class(l).item.as_ref().map(|m| (l, m)))
            .collect();
        let ratio = items
            .iter()
            .find(|(_, m)| m.indent > margin)
            .map_or(1, |(_, m)| m.indent - margin);

        let mut entries: Vec<Entry<'a>> = Vec::with_capacity(items.len());
        let mut stack: Vec<usize> = vec![];
        for (k, &(line, item)) in items.iter().enumerate() {
            let offset = item.indent - margin;
            if offset % ratio != 0 {
                self.diag(
                    DiagnosticKind::UnalignedIndent,
                    line,
                    format!("indent {} is not a multiple of {ratio}", item.indent),
                );
            }
            let mut depth = offset / ratio + 1;
            if depth > stack.len() + 1 {
                self.diag(
                    DiagnosticKind::SkippedListLevel,
                    line,
                    format!("item at depth {depth} follows depth {}", stack.len()),
                );
                depth = stack.len() + 1;
            }
            stack.truncate(depth - 1);
            let parent = stack.last().copied();
            stack.push(k);
            entries.push(Entry {
                line,
                item,
                depth,
                parent,
                extras_end: last + 1,
                subtree_end: last,
            });
        }

        for k in 0..entries.len() {
            if let Some(next) = entries.get(k + 1).map(|e| e.line) {
                entries[k].extras_end = next;
            }
            let depth = entries[k].depth;
            if let Some(closer) = entries[k + 1..]
                .iter()
                .find(|e| e.depth <= depth)
                .map(|e| e.line)
            {
                entries[k].subtree_end = closer - 1;
            }
        }
        entries
    }

    fn emit_item(&mut self, ctx: ParseContext, list: NodeId, entries: &[Entry<'a>], k: usize) {
        let e = &entries[k];
        let m = e.item;
        let kind = NodeKind::ListItem {
            style: m.style,
            depth: e.depth,
            bullet: m.bullet.clone(),
            ordinal: m.ordinal(),
            counter: m.counter.clone(),
            checkbox: m.checkbox,
        };
        let item = self
            .root
            .push(list, kind, SourceSpan::lines(e.line, e.subtree_end));
        let item_ctx = ctx.enter(item);

        let body = match (&m.style, &m.tag) {
            (ListStyle::Definition, Some(tag)) => {
                let line = self.line(e.line);
                let tag_col = tag_column(line, &m.bullet, tag);
                let title = self.root.push(
                    item,
                    NodeKind::DefinitionTitle { text: tag.clone() },
                    SourceSpan::within(e.line, Span::new(tag_col, tag_col + tag.len())),
                );
                self.resolve_inline(title, e.line, tag, tag_col);
                let desc = self.root.push(
                    item,
                    NodeKind::DefinitionDescription,
                    SourceSpan::lines(e.line, e.subtree_end),
                );
                if !m.content.is_empty() {
                    self.resolve_inline(desc, e.line, &m.content, m.content_col);
                }
                desc
            }
            _ => {
                if !m.content.is_empty() {
                    self.resolve_inline(item, e.line, &m.content, m.content_col);
                }
                item
            }
        };

        let body_ctx = item_ctx.enter(body);
        if e.extras_end > e.line + 1 {
            self.parse_range(body_ctx, e.line + 1, e.extras_end);
        }

        let children: Vec<usize> = (k + 1..entries.len())
            .filter(|&c| entries[c].parent == Some(k))
            .collect();
        let mut runs: Vec<Vec<usize>> = vec![];
        for c in children {
            let style = entries[c].item.style;
            match runs.last().map(|run| entries[run[0]].item.style) {
                Some(prev) if prev == style => {
                    if let Some(run) = runs.last_mut() {
                        run.push(c);
                    }
                }
                Some(prev) => {
                    self.diag(
                        DiagnosticKind::InconsistentListItem,
                        entries[c].line,
                        format!("{style:?} item among {prev:?} siblings; starting a new list"),
                    );
                    runs.push(vec![c]);
                }
                None => runs.push(vec![c]),
            }
        }
        for run in runs {
            let (Some(&a), Some(&b)) = (run.first(), run.last()) else {
                continue;
            };
            let nested = self.root.push(
                body,
                NodeKind::List {
                    style: entries[a].item.style,
                    margin: entries[a].item.indent,
                },
                SourceSpan::lines(entries[a].line, entries[b].subtree_end),
            );
            for c in run {
                self.emit_item(body_ctx, nested, entries, c);
            }
        }
    }
}

/// Byte column of a definition term: the first occurrence after the bullet.
fn tag_column(line: &str, bullet: &str, tag: &str) -> usize {
    let lead = line.len() - line.trim_start().len();
    let from = (lead + bullet.len()).min(line.len());
    line[from..].find(tag).map_or(from, |p| from + p)
}
