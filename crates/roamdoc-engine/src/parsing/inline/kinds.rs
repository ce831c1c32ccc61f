//! Inline object kinds with the delimiters they own. Matchers read these
//! constants and never spell markers out themselves.

use crate::tree::MarkupStyle;

/// `*bold*`, `/italic/`, `_underline_`, `+strike+`, `=verbatim=`, `~code~`.
pub struct Emphasis;

impl Emphasis {
    pub const MARKERS: [(u8, MarkupStyle); 6] = [
        (b'*', MarkupStyle::Bold),
        (b'/', MarkupStyle::Italic),
        (b'_', MarkupStyle::Underlined),
        (b'+', MarkupStyle::Linethrough),
        (b'=', MarkupStyle::Verbatim),
        (b'~', MarkupStyle::Code),
    ];

    /// Bytes allowed right before an opening marker.
    pub const PRE: &'static [u8] = b" \t-({'\"";

    /// Bytes allowed right after a closing marker, besides end of text.
    pub const POST: &'static [u8] = b" \t-.,;:!?'\")}[\\";

    pub fn style_for(marker: u8) -> Option<MarkupStyle> {
        Self::MARKERS
            .iter()
            .find(|(m, _)| *m == marker)
            .map(|(_, style)| *style)
    }
}

/// `<<name>>` link targets.
pub struct TargetSpan;

impl TargetSpan {
    pub const OPEN: &'static [u8; 2] = b"<<";
    pub const CLOSE: &'static [u8; 2] = b">>";
}

/// `[[target]]` and `[[target][description]]`.
pub struct BracketLink;

impl BracketLink {
    pub const OPEN: &'static [u8; 2] = b"[[";
    pub const CLOSE: &'static [u8; 2] = b"]]";
    pub const SPLIT: &'static [u8; 2] = b"][";
    /// A target containing this is an external URL.
    pub const EXTERNAL: &'static str = "//";
    pub const FILE_PREFIX: &'static str = "file:";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_lookup() {
        assert_eq!(Emphasis::style_for(b'~'), Some(MarkupStyle::Code));
        assert_eq!(Emphasis::style_for(b'='), Some(MarkupStyle::Verbatim));
        assert_eq!(Emphasis::style_for(b'#'), None);
    }
}
