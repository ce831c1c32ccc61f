//! # Line Classifiers
//!
//! Stateless pattern matchers, one per construct family. Each looks at a
//! single line and reports what it could open. [`OrgLineClassifier`] runs all
//! of them once per line up front, so builders consult a precomputed
//! [`LineClass`] instead of re-running patterns.
//!
//! Priority when several could apply is decided by the dispatcher: heading,
//! table, list, quote, center, then the verbatim blocks.

use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{Checkbox, ListStyle};

use super::source::LineRef;

/// Columns a tab counts for when measuring indentation.
pub const TAB_WIDTH: usize = 8;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*+)[ \t]+(.*?)[ \t]*$").expect("valid heading pattern"));

static HEADING_TAGS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)(?:[ \t]+(:(?:[A-Za-z0-9_@#%]+:)+))?$").expect("valid heading tags pattern")
});

static TABLE_ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*\|").expect("valid table row pattern"));

static TABLE_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?:\|-|\+-)").expect("valid table separator pattern"));

static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([ \t]*)([-+*]|\d+[.)])(?:[ \t]+|$)(?:\[@([A-Za-z0-9]+)\](?:[ \t]+|$))?(?:\[([ xX+-])\](?:[ \t]+|$))?(.*)$",
    )
    .expect("valid list item pattern")
});

static DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?\S)[ \t]+::(?:[ \t]+(.*))?$").expect("valid definition pattern")
});

static BLOCK_BEGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[ \t]*#\+begin_(quote|center|example|src|comment|export)(?:[ \t]+(.*?))?[ \t]*$")
        .expect("valid block begin pattern")
});

static BLOCK_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[ \t]*#\+end_(quote|center|example|src|comment|export)[ \t]*$")
        .expect("valid block end pattern")
});

static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*#\+([A-Za-z][A-Za-z0-9_-]*):[ \t]*(.*?)[ \t]*$").expect("valid keyword pattern")
});

static DRAWER_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[ \t]*:PROPERTIES:[ \t]*$").expect("valid drawer pattern"));

static DRAWER_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[ \t]*:END:[ \t]*$").expect("valid drawer end pattern"));

static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*:([A-Za-z0-9_+-]+):(?:[ \t]+(.*?))?[ \t]*$").expect("valid property pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch {
    pub level: usize,
    pub text: String,
    /// Column where `text` starts.
    pub text_col: usize,
    pub tags: Vec<String>,
}

/// A heading is a run of stars at column 0 followed by whitespace. Stars
/// followed directly by text (`*bold* word`) are emphasis, not a heading.
pub fn heading(line: &str) -> Option<HeadingMatch> {
    let caps = HEADING_RE.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let rest = caps.get(2)?;

    let (text, tags) = match HEADING_TAGS_RE.captures(rest.as_str()) {
        Some(tc) => {
            let title = tc.get(1).map_or("", |m| m.as_str());
            let tags = tc.get(2).map_or_else(Vec::new, |m| {
                m.as_str()
                    .split(':')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            });
            (title.to_string(), tags)
        }
        None => (rest.as_str().to_string(), vec![]),
    };

    Some(HeadingMatch {
        level,
        text,
        text_col: rest.start(),
        tags,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLine {
    Row,
    Separator,
}

/// `|`-leading rows, plus `|-` / `+-` separator rules.
pub fn table_line(line: &str) -> Option<TableLine> {
    if TABLE_SEPARATOR_RE.is_match(line) {
        Some(TableLine::Separator)
    } else if TABLE_ROW_RE.is_match(line) {
        Some(TableLine::Row)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemMatch {
    /// Indent width in columns, tabs expanded.
    pub indent: usize,
    pub style: ListStyle,
    pub bullet: String,
    pub counter: Option<String>,
    pub checkbox: Option<Checkbox>,
    /// Term of a definition item.
    pub tag: Option<String>,
    pub content: String,
    /// Byte column where `content` starts.
    pub content_col: usize,
}

impl ListItemMatch {
    /// The number of an ordered bullet such as `3.` or `12)`.
    pub fn ordinal(&self) -> Option<u64> {
        self.bullet
            .trim_end_matches(['.', ')'])
            .parse()
            .ok()
    }
}

pub fn list_item(line: &str) -> Option<ListItemMatch> {
    let caps = LIST_ITEM_RE.captures(line)?;
    let lindent = caps.get(1)?.as_str();
    let bullet = caps.get(2)?.as_str();
    if bullet == "*" && lindent.is_empty() {
        return None;
    }

    let counter = caps.get(3).map(|m| m.as_str().to_string());
    let checkbox = caps
        .get(4)
        .and_then(|m| m.as_str().chars().next())
        .and_then(Checkbox::from_mark);
    let rest = caps.get(5)?;

    let ordered = bullet.starts_with(|c: char| c.is_ascii_digit());
    let mut style = if ordered {
        ListStyle::Ordered
    } else {
        ListStyle::Unordered
    };
    let mut tag = None;
    let mut content = rest.as_str().trim_end().to_string();
    let mut content_col = rest.start();

    if !ordered && let Some(dc) = DEFINITION_RE.captures(rest.as_str()) {
        style = ListStyle::Definition;
        tag = dc.get(1).map(|m| m.as_str().to_string());
        match dc.get(2) {
            Some(desc) => {
                content = desc.as_str().trim_end().to_string();
                content_col = rest.start() + desc.start();
            }
            None => {
                content = String::new();
                content_col = rest.end();
            }
        }
    }

    Some(ListItemMatch {
        indent: indent_width(line),
        style,
        bullet: bullet.to_string(),
        counter,
        checkbox,
        tag,
        content,
        content_col,
    })
}

/// Wrapped block kinds. Quote and center bodies are parsed again; the
/// others are verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrappedKind {
    Quote,
    Center,
    Example,
    Src,
    Comment,
    Export,
}

impl WrappedKind {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "quote" => Some(WrappedKind::Quote),
            "center" => Some(WrappedKind::Center),
            "example" => Some(WrappedKind::Example),
            "src" => Some(WrappedKind::Src),
            "comment" => Some(WrappedKind::Comment),
            "export" => Some(WrappedKind::Export),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WrappedKind::Quote => "QUOTE",
            WrappedKind::Center => "CENTER",
            WrappedKind::Example => "EXAMPLE",
            WrappedKind::Src => "SRC",
            WrappedKind::Comment => "COMMENT",
            WrappedKind::Export => "EXPORT",
        }
    }

    pub fn is_verbatim(self) -> bool {
        !matches!(self, WrappedKind::Quote | WrappedKind::Center)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBegin {
    pub kind: WrappedKind,
    pub args: Option<String>,
}

pub fn block_begin(line: &str) -> Option<BlockBegin> {
    let caps = BLOCK_BEGIN_RE.captures(line)?;
    let kind = WrappedKind::from_name(caps.get(1)?.as_str())?;
    let args = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .filter(|a| !a.is_empty());
    Some(BlockBegin { kind, args })
}

pub fn block_end(line: &str) -> Option<WrappedKind> {
    let caps = BLOCK_END_RE.captures(line)?;
    WrappedKind::from_name(caps.get(1)?.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub key: String,
    pub value: String,
}

impl Keyword {
    pub fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

/// `#+KEY: value` lines such as `#+title:` and `#+NAME:`.
pub fn keyword(line: &str) -> Option<Keyword> {
    let caps = KEYWORD_RE.captures(line)?;
    Some(Keyword {
        key: caps.get(1)?.as_str().to_string(),
        value: caps.get(2).map_or("", |m| m.as_str()).to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawerLine {
    Start,
    End,
    Property { key: String, value: String },
}

pub fn drawer_line(line: &str) -> Option<DrawerLine> {
    if DRAWER_START_RE.is_match(line) {
        return Some(DrawerLine::Start);
    }
    if DRAWER_END_RE.is_match(line) {
        return Some(DrawerLine::End);
    }
    let caps = PROPERTY_RE.captures(line)?;
    Some(DrawerLine::Property {
        key: caps.get(1)?.as_str().to_string(),
        value: caps.get(2).map_or("", |m| m.as_str()).to_string(),
    })
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Indent width in columns, tabs expanded to [`TAB_WIDTH`].
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Facts about one line, computed once before any building starts.
#[derive(Debug, Clone, Default)]
pub struct LineClass {
    pub is_blank: bool,
    pub indent: usize,
    pub heading: Option<HeadingMatch>,
    pub table: Option<TableLine>,
    pub item: Option<ListItemMatch>,
    pub begin: Option<BlockBegin>,
    pub end: Option<WrappedKind>,
    pub keyword: Option<Keyword>,
    pub drawer: Option<DrawerLine>,
    /// Starts with `#+` after indentation.
    pub hash_plus: bool,
}

impl LineClass {
    /// Keyword lines and orphaned drawer lines never render as text.
    pub fn is_debris(&self) -> bool {
        self.hash_plus || self.drawer.is_some()
    }

    pub fn is_table_row(&self) -> bool {
        self.table == Some(TableLine::Row)
    }
}

pub struct OrgLineClassifier;

impl OrgLineClassifier {
    pub fn classify(&self, lr: &LineRef) -> LineClass {
        let text = lr.text.as_str();
        if is_blank(text) {
            return LineClass {
                is_blank: true,
                ..Default::default()
            };
        }
        let hash_plus = text.trim_start().starts_with("#+");
        LineClass {
            is_blank: false,
            indent: indent_width(text),
            heading: heading(text),
            table: table_line(text),
            item: list_item(text),
            begin: if hash_plus { block_begin(text) } else { None },
            end: if hash_plus { block_end(text) } else { None },
            keyword: if hash_plus { keyword(text) } else { None },
            drawer: drawer_line(text),
            hash_plus,
        }
    }
}
