use crate::parsing::classify::DrawerLine;
use crate::parsing::{DiagnosticKind, ParseSession};
use crate::tree::NodeId;

/// A `:PROPERTIES:` ... `:END:` drawer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Drawer {
    pub properties: Vec<(String, String)>,
    /// Line of the `:END:` marker.
    pub end: usize,
}

/// Property keys that make their owner a link target.
const TARGET_KEYS: [&str; 2] = ["ID", "CUSTOM_ID"];

impl ParseSession<'_> {
    /// Reads the drawer opened at `start`. A drawer cut off by a heading or
    /// by `end` is malformed and yields `None`.
    pub(crate) fn read_drawer(&mut self, start: usize, end: usize) -> Option<Drawer> {
        let mut properties = vec![];
        for i in (start + 1)..end {
            let class = self.class(i);
            if class.heading.is_some() {
                break;
            }
            match &class.drawer {
                Some(DrawerLine::End) => {
                    return Some(Drawer { properties, end: i });
                }
                Some(DrawerLine::Property { key, value }) => {
                    properties.push((key.clone(), value.clone()));
                }
                Some(DrawerLine::Start) | None => {
                    if !class.is_blank {
                        self.diag(
                            DiagnosticKind::MalformedDrawer,
                            i,
                            "line inside a properties drawer is not a property",
                        );
                    }
                }
            }
        }
        self.diag(
            DiagnosticKind::MalformedDrawer,
            start,
            "properties drawer has no :END:",
        );
        None
    }

    /// Registers `node` under its `ID` and `CUSTOM_ID` values.
    pub(crate) fn register_properties(&mut self, node: NodeId, properties: &[(String, String)]) {
        for (key, value) in properties {
            if TARGET_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key)) && !value.is_empty() {
                self.root.register_target(node, value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parsing::{DiagnosticKind, parse_document};
    use crate::tree::NodeKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn section_drawer_is_read_and_registered() {
        // Given a heading followed by a drawer with an ID
        let text = "* Topic\n:PROPERTIES:\n:ID: t-1\n:CUSTOM_ID: topic\n:END:\nbody\n";

        // When parsed
        let doc = parse_document(text, "a.org");

        // Then the section holds the properties and answers to both names
        let section = doc.root.children(doc.branch)[0];
        let NodeKind::Section { properties, .. } = doc.root.kind(section) else {
            panic!("expected section");
        };
        assert_eq!(
            properties,
            &vec![
                ("ID".to_string(), "t-1".to_string()),
                ("CUSTOM_ID".to_string(), "topic".to_string())
            ]
        );
        assert_eq!(doc.root.resolve("t-1"), Some(section));
        assert_eq!(doc.root.resolve("id:t-1"), Some(section));
        assert_eq!(doc.root.resolve("topic"), Some(section));
        // and the drawer is not body text
        assert_eq!(doc.root.children(section).len(), 1);
    }

    #[test]
    fn drawer_without_end_is_diagnosed() {
        let doc = parse_document("* T\n:PROPERTIES:\n:ID: x\n* U\n", "a.org");
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].kind, DiagnosticKind::MalformedDrawer);
        assert_eq!(doc.diagnostics[0].line, 1);
        assert_eq!(doc.root.resolve("x"), None);
    }

    #[test]
    fn stray_line_in_drawer_is_diagnosed() {
        let doc = parse_document("* T\n:PROPERTIES:\nnot a property\n:END:\n", "a.org");
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].line, 2);
    }
}
