use crate::parsing::ParseSession;
use crate::parsing::context::ParseContext;
use crate::tree::{NodeKind, SourceSpan};

/// Consecutive prose lines, plus the blank lines kept after them.
#[derive(Debug, Default)]
struct Run {
    lines: Vec<usize>,
    /// Blank lines after the first separating one.
    extra_blanks: Vec<usize>,
}

impl ParseSession<'_> {
    /// Splits a range with no elements into paragraphs.
    ///
    /// Leading blank lines become BlankLines on the container. One blank line
    /// between runs only separates them; any more are appended to the
    /// preceding paragraph. Keyword and drawer lines are dropped without
    /// breaking a run.
    pub(crate) fn build_paragraphs(&mut self, ctx: ParseContext, start: usize, end: usize) {
        let mut leading = vec![];
        let mut runs: Vec<Run> = vec![];
        let mut blanks: Vec<usize> = vec![];

        for i in start..end {
            let class = self.class(i);
            if class.is_blank {
                if runs.is_empty() {
                    leading.push(i);
                } else {
                    blanks.push(i);
                }
                continue;
            }
            if class.is_debris() {
                continue;
            }
            if let Some(run) = runs.last_mut() {
                if blanks.is_empty() {
                    run.lines.push(i);
                    continue;
                }
                run.extra_blanks = blanks.drain(..).skip(1).collect();
            }
            runs.push(Run {
                lines: vec![i],
                extra_blanks: vec![],
            });
        }
        if let Some(run) = runs.last_mut() {
            run.extra_blanks = blanks.drain(..).skip(1).collect();
        }

        for i in leading {
            self.root
                .push(ctx.container, NodeKind::BlankLine, SourceSpan::line(i));
        }
        for run in runs {
            let (Some(&first), Some(&last)) = (run.lines.first(), run.lines.last()) else {
                continue;
            };
            log::debug!("paragraph lines {}-{}", first + 1, last + 1);
            let para = self.root.push(
                ctx.container,
                NodeKind::Paragraph,
                SourceSpan::lines(first, last),
            );
            for &i in &run.lines {
                let line = self.line(i);
                let text = line.trim();
                let col = line.len() - line.trim_start().len();
                self.resolve_inline(para, i, text, col);
            }
            for i in run.extra_blanks {
                self.root.push(para, NodeKind::BlankLine, SourceSpan::line(i));
            }
        }
    }
}
