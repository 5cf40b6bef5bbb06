//! Open control directives.

use rtl_tree::NodeId;

use crate::registry::ControlHandle;

/// Metadata for one directive invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMeta {
    pub name: String,
    /// Text after `NAME:`, empty when absent.
    pub argument: String,
    /// The form opens the directive (`rtl:NAME` or `rtl:begin:NAME`).
    pub begin: bool,
    /// The form closes the directive (`rtl:NAME` or `rtl:end:NAME`).
    pub end: bool,
    pub blacklisted: bool,
    /// The source comment survives `clean`.
    pub preserve: bool,
    /// Comment that carried the directive.
    pub source: NodeId,
}

impl DirectiveMeta {
    /// Whether the form both opens and closes the directive.
    #[must_use]
    pub fn is_one_shot(&self) -> bool {
        self.begin && self.end
    }
}

/// Open directive. Blacklisted markers have no handle.
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) meta: DirectiveMeta,
    pub(crate) directive: Option<ControlHandle>,
}

/// Open directives, outermost first.
#[derive(Debug, Default)]
pub(crate) struct DirectiveStack {
    entries: Vec<Entry>,
}

impl DirectiveStack {
    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub(crate) fn remove(&mut self, index: usize) -> Entry {
        self.entries.remove(index)
    }

    /// Position of the innermost open directive named `name`.
    pub(crate) fn innermost(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|entry| entry.meta.name == name)
    }

    /// Whether any open directive was introduced by `source`.
    pub(crate) fn references(&self, source: NodeId) -> bool {
        self.entries.iter().any(|entry| entry.meta.source == source)
    }

    pub(crate) fn drain(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.entries)
    }
}
