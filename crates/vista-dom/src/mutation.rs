//! Presentation mutations and the journal that records them.
//!
//! Serde uses an internal tag `type` in snake_case so journals can be dumped
//! as JSON and diffed between runs.

use serde::{Deserialize, Serialize};

use crate::document::NodeId;

/// A single effective change to the document or the page around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    AddClass { node: NodeId, class: String },
    RemoveClass { node: NodeId, class: String },
    /// Set an inline style declaration.
    SetStyle {
        node: NodeId,
        property: String,
        value: String,
    },
    /// Remove an inline style declaration (`element.style.x = null`).
    ClearStyle { node: NodeId, property: String },
    SetText { node: NodeId, text: String },
    SetAttribute {
        node: NodeId,
        name: String,
        value: String,
    },
    /// Boolean form properties such as `checked` and `disabled`.
    SetFlag { node: NodeId, name: String, value: bool },
    SetValue { node: NodeId, value: String },
    AppendElement {
        parent: NodeId,
        node: NodeId,
        tag: String,
    },
    /// Viewport scroll position changed.
    Scroll { y: f64 },
    /// A real page navigation was requested.
    Navigate { href: String },
    /// Structured console output from a page behavior.
    Log { message: String },
}

impl Mutation {
    /// The element this mutation touched, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::AddClass { node, .. }
            | Self::RemoveClass { node, .. }
            | Self::SetStyle { node, .. }
            | Self::ClearStyle { node, .. }
            | Self::SetText { node, .. }
            | Self::SetAttribute { node, .. }
            | Self::SetFlag { node, .. }
            | Self::SetValue { node, .. }
            | Self::AppendElement { node, .. } => Some(*node),
            Self::Scroll { .. } | Self::Navigate { .. } | Self::Log { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Virtual clock time the mutation happened at.
    pub at_ms: u64,
    /// Short element description such as `div#notification.show`.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(flatten)]
    pub mutation: Mutation,
}

/// Append-only record of mutations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries recorded at or after `at_ms`.
    pub fn since(&self, at_ms: u64) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |entry| entry.at_ms >= at_ms)
    }

    /// Entries that touched `node`.
    pub fn for_node(&self, node: NodeId) -> impl Iterator<Item = &JournalEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.mutation.node() == Some(node))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
