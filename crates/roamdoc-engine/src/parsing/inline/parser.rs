use super::matchers::collect_candidates;
use super::types::{Candidate, CandidateKind, Inline};
use crate::tree::Span;

/// Resolves the inline objects of `s`, whose first byte sits at column `base`.
///
/// Every byte of `s` is covered by exactly one top-level item, in order.
pub fn parse_inline(s: &str, base: usize) -> Vec<Inline> {
    let mut out = vec![];
    let mut text_start = base;
    for candidate in select(collect_candidates(s, base)) {
        push_text(&mut out, text_start, candidate.full.start);
        text_start = candidate.full.end;
        out.push(build(s, base, candidate));
    }
    push_text(&mut out, text_start, base + s.len());
    out
}

/// Picks the non-overlapping candidates for one nesting level.
///
/// Candidates are taken leftmost first, widest first at the same start. One
/// that starts inside an accepted span is either nested in it (handled when
/// the inner text is parsed) or crossing it, and is dropped either way.
pub fn select(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        a.full
            .start
            .cmp(&b.full.start)
            .then(b.full.end.cmp(&a.full.end))
    });
    let mut accepted: Vec<Candidate> = vec![];
    for candidate in candidates {
        if let Some(last) = accepted.last()
            && candidate.full.start < last.full.end
        {
            if !last.full.contains(candidate.full) {
                log::trace!(
                    "dropping {:?} at {}..{}: crosses {}..{}",
                    candidate.kind,
                    candidate.full.start,
                    candidate.full.end,
                    last.full.start,
                    last.full.end
                );
            }
            continue;
        }
        accepted.push(candidate);
    }
    accepted
}

fn push_text(out: &mut Vec<Inline>, start: usize, end: usize) {
    if end > start {
        out.push(Inline::Text(Span::new(start, end)));
    }
}

fn build(s: &str, base: usize, c: Candidate) -> Inline {
    match c.kind {
        CandidateKind::Emphasis(style) => Inline::Markup {
            style,
            full: c.full,
            inner: c.inner,
            children: if style.is_raw() {
                vec![]
            } else {
                nested(s, base, c.inner)
            },
        },
        CandidateKind::Target => Inline::Target {
            full: c.full,
            inner: c.inner,
            children: nested(s, base, c.inner),
        },
        CandidateKind::Link => Inline::Link {
            full: c.full,
            target: c.inner,
            description: c.description,
        },
    }
}

/// Objects inside `inner`, or nothing when it is a single run of text.
fn nested(s: &str, base: usize, inner: Span) -> Vec<Inline> {
    let text = &s[inner.start - base..inner.end - base];
    let items = parse_inline(text, inner.start);
    match items.as_slice() {
        [Inline::Text(_)] | [] => vec![],
        _ => items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MarkupStyle;
    use pretty_assertions::assert_eq;

    fn sp(start: usize, end: usize) -> Span {
        Span::new(start, end)
    }

    #[test]
    fn plain_text_is_one_item() {
        assert_eq!(parse_inline("hello", 0), vec![Inline::Text(sp(0, 5))]);
    }

    #[test]
    fn empty_text_has_no_items() {
        assert!(parse_inline("", 3).is_empty());
    }

    #[test]
    fn text_around_markup() {
        assert_eq!(
            parse_inline("a *b* c", 0),
            vec![
                Inline::Text(sp(0, 2)),
                Inline::Markup {
                    style: MarkupStyle::Bold,
                    full: sp(2, 5),
                    inner: sp(3, 4),
                    children: vec![],
                },
                Inline::Text(sp(5, 7)),
            ]
        );
    }

    #[test]
    fn bold_inside_target_nests() {
        // Given a target whose name is bold
        let items = parse_inline("<<*bold*>>", 0);

        // Then the target owns the markup as its child
        assert_eq!(
            items,
            vec![Inline::Target {
                full: sp(0, 10),
                inner: sp(2, 8),
                children: vec![Inline::Markup {
                    style: MarkupStyle::Bold,
                    full: sp(2, 8),
                    inner: sp(3, 7),
                    children: vec![],
                }],
            }]
        );
    }

    #[test]
    fn code_contents_are_not_parsed() {
        let items = parse_inline("~x *y*~", 0);
        assert_eq!(items.len(), 1);
        assert!(matches!(
            &items[0],
            Inline::Markup { style: MarkupStyle::Code, children, .. } if children.is_empty()
        ));
    }

    #[test]
    fn nested_emphasis() {
        let items = parse_inline("*_x_*", 0);
        let Inline::Markup { children, .. } = &items[0] else {
            panic!("expected markup, got {items:?}");
        };
        assert!(matches!(
            children.as_slice(),
            [Inline::Markup { style: MarkupStyle::Underlined, .. }]
        ));
    }

    #[test]
    fn crossing_candidate_is_dropped() {
        // Given bold and underline spans that cross
        let items = parse_inline("*a _b* c_", 0);

        // Then the leftmost wins and the rest is text
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].full(), sp(0, 6));
        assert_eq!(items[1], Inline::Text(sp(6, 9)));
    }

    #[test]
    fn link_keeps_description_span() {
        let items = parse_inline("see [[a][b]]", 0);
        assert_eq!(
            items[1],
            Inline::Link {
                full: sp(4, 12),
                target: sp(6, 7),
                description: Some(sp(9, 10)),
            }
        );
    }

    #[test]
    fn link_wins_over_emphasis_inside_it() {
        let items = parse_inline("[[*x*]]", 0);
        assert!(matches!(items.as_slice(), [Inline::Link { .. }]));
    }

    #[test]
    fn columns_follow_base() {
        let items = parse_inline("*b*", 4);
        assert_eq!(items[0].full(), sp(4, 7));
    }

    #[test]
    fn items_cover_whole_line() {
        let line = "x /y/ [[z]] <<w>> =v= tail";
        let items = parse_inline(line, 0);
        let mut pos = 0;
        for item in &items {
            assert_eq!(item.full().start, pos);
            pos = item.full().end;
        }
        assert_eq!(pos, line.len());
    }
}
