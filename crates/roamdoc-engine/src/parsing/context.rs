use crate::tree::NodeId;

/// Where the builders are attaching nodes.
///
/// Passed by value into every recursive build call, so leaving a construct
/// is just returning from the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    /// Node new elements are appended to.
    pub container: NodeId,
    /// Heading level of the innermost section; 0 at branch level.
    pub section_level: usize,
}

impl ParseContext {
    pub fn branch(branch: NodeId) -> Self {
        Self {
            container: branch,
            section_level: 0,
        }
    }

    /// Context for the body of a section.
    pub fn enter_section(self, section: NodeId, level: usize) -> Self {
        Self {
            container: section,
            section_level: level,
        }
    }

    /// Context for any other container, such as a list item or quote block.
    pub fn enter(self, container: NodeId) -> Self {
        Self { container, ..self }
    }
}
