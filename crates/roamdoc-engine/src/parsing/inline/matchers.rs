use super::cursor::Cursor;
use super::kinds::{BracketLink, Emphasis, TargetSpan};
use super::types::{Candidate, CandidateKind};
use crate::tree::Span;

/// Scans every start position of `s` and returns at most one candidate per
/// position. Candidates may overlap; [`super::parser::select`] sorts that out.
pub fn collect_candidates(s: &str, base: usize) -> Vec<Candidate> {
    let mut out = vec![];
    let mut cur = Cursor::new(s, base);
    while !cur.eof() {
        let found = try_parse_link(&mut cur.clone())
            .or_else(|| try_parse_target(&mut cur.clone()))
            .or_else(|| try_parse_emphasis(&mut cur.clone()));
        if let Some(candidate) = found {
            out.push(candidate);
        }
        cur.bump();
    }
    out
}

/// `[[target]]` or `[[target][description]]`.
pub fn try_parse_link(cur: &mut Cursor<'_>) -> Option<Candidate> {
    if !cur.starts_with(BracketLink::OPEN) {
        return None;
    }
    let saved = cur.clone();
    let start = cur.pos();
    cur.bump_n(BracketLink::OPEN.len());
    let inner_start = cur.pos();
    if !cur.seek(BracketLink::CLOSE) {
        *cur = saved;
        return None;
    }
    let inner_end = cur.pos();
    cur.bump_n(BracketLink::CLOSE.len());

    let local = &saved.s[inner_start - saved.base..inner_end - saved.base];
    let split = local
        .as_bytes()
        .windows(BracketLink::SPLIT.len())
        .position(|w| w == BracketLink::SPLIT);
    let (target, description) = match split {
        Some(k) => {
            let desc = Span::new(inner_start + k + BracketLink::SPLIT.len(), inner_end);
            (
                Span::new(inner_start, inner_start + k),
                (!desc.is_empty()).then_some(desc),
            )
        }
        None => (Span::new(inner_start, inner_end), None),
    };
    if target.is_empty() {
        *cur = saved;
        return None;
    }
    Some(Candidate {
        kind: CandidateKind::Link,
        full: Span::new(start, cur.pos()),
        inner: target,
        description,
    })
}

/// `<<name>>`, where the name is not space-bordered and holds no angle brackets.
pub fn try_parse_target(cur: &mut Cursor<'_>) -> Option<Candidate> {
    if !cur.starts_with(TargetSpan::OPEN) {
        return None;
    }
    let saved = cur.clone();
    let start = cur.pos();
    cur.bump_n(TargetSpan::OPEN.len());
    let inner_start = cur.pos();
    if matches!(cur.peek(), None | Some(b' ' | b'\t' | b'<' | b'>')) {
        *cur = saved;
        return None;
    }
    if !cur.seek(TargetSpan::CLOSE) {
        *cur = saved;
        return None;
    }
    let inner_end = cur.pos();
    let inner = &saved.s[inner_start - saved.base..inner_end - saved.base];
    let ends_with_space = cur.prev().is_some_and(|b| b.is_ascii_whitespace());
    if ends_with_space || inner.contains(['<', '>']) {
        *cur = saved;
        return None;
    }
    cur.bump_n(TargetSpan::CLOSE.len());
    Some(Candidate {
        kind: CandidateKind::Target,
        full: Span::new(start, cur.pos()),
        inner: Span::new(inner_start, inner_end),
        description: None,
    })
}

/// One of the six emphasis styles. The opener must start the text or follow a
/// pre byte and be followed by a non-space. The closer must follow a non-space
/// (code and verbatim excepted) and be followed by a post byte or the end.
pub fn try_parse_emphasis(cur: &mut Cursor<'_>) -> Option<Candidate> {
    let marker = cur.peek()?;
    let style = Emphasis::style_for(marker)?;
    if cur.prev().is_some_and(|p| !Emphasis::PRE.contains(&p)) {
        return None;
    }
    match cur.peek_at(1) {
        Some(b) if !b.is_ascii_whitespace() && b != marker => {}
        _ => return None,
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump();
    let inner_start = cur.pos();
    cur.bump();
    while !cur.eof() {
        if cur.peek() == Some(marker) {
            let before_ok = style.is_raw() || cur.prev().is_some_and(|b| !b.is_ascii_whitespace());
            let after_ok = cur
                .peek_at(1)
                .is_none_or(|a| Emphasis::POST.contains(&a));
            if before_ok && after_ok {
                let inner_end = cur.pos();
                cur.bump();
                return Some(Candidate {
                    kind: CandidateKind::Emphasis(style),
                    full: Span::new(start, cur.pos()),
                    inner: Span::new(inner_start, inner_end),
                    description: None,
                });
            }
        }
        cur.bump();
    }
    *cur = saved;
    None
}
