use std::collections::HashMap;

use serde::Serialize;

use super::NodeId;

/// A name that an internal link can point at, paired with the node it labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTarget {
    pub name: String,
    pub node: NodeId,
}

/// Registry of explicit link targets for one composed document.
///
/// Sources are `<<name>>` targets, `ID`/`CUSTOM_ID` properties and `#+NAME:`
/// keywords. A later registration of the same name replaces the earlier one.
#[derive(Debug, Default)]
pub struct LinkTargets {
    entries: HashMap<String, LinkTarget>,
}

impl LinkTargets {
    pub fn register(&mut self, node: NodeId, name: impl Into<String>) {
        let name = name.into();
        if let Some(previous) = self.entries.get(&name)
            && previous.node != node
        {
            log::debug!(
                "link target '{name}' moved from obj-{} to obj-{node}",
                previous.node
            );
        }
        self.entries
            .insert(name.clone(), LinkTarget { name, node });
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.entries.get(name).map(|t| t.node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
