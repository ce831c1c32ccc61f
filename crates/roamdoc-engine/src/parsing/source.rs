use xi_rope::Rope;

use crate::tree::Span;

/// A reference to a single line in the rope.
#[derive(Debug, Clone)]
pub struct LineRef {
    /// Byte span of this line in the rope, terminator included.
    pub span: Span,
    /// The line text with its `\n` / `\r\n` terminator removed.
    pub text: String,
}

/// Returns an iterator over lines with their byte spans.
///
/// Built on `lines_raw` so spans account for the terminators; a trailing
/// newline does not produce an extra empty line.
pub fn lines_with_spans(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    rope.lines_raw(..).map(move |line| {
        let start = offset;
        offset += line.len();
        LineRef {
            span: Span { start, end: offset },
            text: line.trim_end_matches(['\r', '\n']).to_string(),
        }
    })
}

/// The in-memory buffer one parser works over.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    rope: Rope,
    lines: Vec<LineRef>,
}

impl SourceBuffer {
    pub fn new(text: &str) -> Self {
        let rope = Rope::from(text);
        let lines = lines_with_spans(&rope).collect();
        Self { rope, lines }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn lines(&self) -> &[LineRef] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> &str {
        self.lines.get(index).map_or("", |l| l.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_newline_adds_no_line() {
        let buf = SourceBuffer::new("a\nb\n");
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.line(0), "a");
        assert_eq!(buf.line(1), "b");
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let buf = SourceBuffer::new("one\r\ntwo");
        assert_eq!(buf.line(0), "one");
        assert_eq!(buf.line(1), "two");
        assert_eq!(buf.lines()[0].span, Span { start: 0, end: 5 });
        assert_eq!(buf.lines()[1].span, Span { start: 5, end: 8 });
    }

    #[test]
    fn blank_lines_are_kept() {
        let buf = SourceBuffer::new("a\n\n\nb");
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.line(1), "");
        assert_eq!(buf.line(2), "");
    }

    #[test]
    fn empty_text_has_no_lines() {
        let buf = SourceBuffer::new("");
        assert!(buf.is_empty());
        assert_eq!(buf.line(0), "");
    }
}
