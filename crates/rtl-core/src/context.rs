//! Per-run state shared with plugin callbacks.

use std::collections::HashSet;

use rtl_config::Options;
use rtl_tree::{NodeId, Stylesheet};

use crate::mirror::{MirrorTarget, StringMirror};
use crate::{Error, Warning, WarningKind};

/// State owned by a single run and visible to plugins through [`Context`].
pub(crate) struct RunState {
    pub(crate) options: Options,
    pub(crate) mirror: StringMirror,
    pub(crate) visited: HashSet<NodeId>,
    pub(crate) warnings: Vec<Warning>,
}

impl RunState {
    pub(crate) fn new(options: Options, mirror: StringMirror) -> Self {
        Self {
            options,
            mirror,
            visited: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn warn(&mut self, kind: WarningKind, node: NodeId, message: String) {
        tracing::warn!(kind = ?kind, node = node.index(), "{message}");
        self.warnings.push(Warning {
            kind,
            node,
            message,
        });
    }
}

/// Access to the tree and run state for directive and processor callbacks.
pub struct Context<'a> {
    sheet: &'a mut Stylesheet,
    state: &'a mut RunState,
}

impl<'a> Context<'a> {
    pub(crate) fn new(sheet: &'a mut Stylesheet, state: &'a mut RunState) -> Self {
        Self { sheet, state }
    }

    #[must_use]
    pub fn sheet(&self) -> &Stylesheet {
        self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut Stylesheet {
        self.sheet
    }

    /// Options active at this point of the document.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.state.options
    }

    /// Mirror `text` with the active string map.
    #[must_use]
    pub fn mirror(&self, text: &str, target: MirrorTarget) -> String {
        self.state.mirror.apply(text, target)
    }

    /// Mark a node as already handled so the engine skips it.
    pub fn mark_processed(&mut self, node: NodeId) {
        self.state.visited.insert(node);
    }

    /// Report a problem with a directive argument.
    pub fn warn(&mut self, node: NodeId, message: impl Into<String>) {
        self.state
            .warn(WarningKind::InvalidDirective, node, message.into());
    }

    /// Swap in new options for the rest of the run, returning the old ones.
    ///
    /// # Errors
    ///
    /// Returns an error (and keeps the current options) if the new string
    /// map fails to compile.
    pub fn replace_options(&mut self, options: Options) -> Result<Options, Error> {
        options.validate()?;
        self.state.mirror = StringMirror::from_options(&options)?;
        Ok(std::mem::replace(&mut self.state.options, options))
    }
}
