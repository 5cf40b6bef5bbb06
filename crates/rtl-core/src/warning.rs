//! Non-fatal diagnostics attached to stylesheet nodes.

use std::fmt;

use rtl_tree::NodeId;

/// Warning category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A blacklisted control directive was opened.
    Blacklisted,
    /// No plugin provides the directive.
    Unsupported,
    /// An end form with no open directive of the same name.
    UnmatchedEnd,
    /// A directive still open at the end of the document.
    Unclosed,
    /// Strict auto-rename found no mirrored counterpart for a rule.
    RenameSkipped,
    /// A directive could not interpret its argument.
    InvalidDirective,
}

/// Warning produced during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    /// Offending node.
    pub node: NodeId,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
