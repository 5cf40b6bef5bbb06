//! Mirroring engine and per-run traversal.

use rtl_config::Options;
use rtl_tree::{NodeId, NodeKind, Stylesheet};

use crate::context::RunState;
use crate::mirror::{MirrorTarget, StringMirror};
use crate::plugin::{Hooks, NoHooks, Plugin};
use crate::registry::Registry;
use crate::stack::DirectiveStack;
use crate::{Error, Warning, WarningKind};

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Warnings in the order they were raised.
    pub warnings: Vec<Warning>,
    /// Declarations changed by a value directive or a processor.
    pub flips: usize,
}

impl Report {
    /// Warnings of one kind.
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |warning| warning.kind == kind)
    }
}

/// Mirrored stylesheet text with its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub css: String,
    pub report: Report,
}

/// Directive-driven stylesheet mirroring engine.
///
/// # Example
///
/// ```
/// use rtl_config::Options;
/// use rtl_core::Mirror;
///
/// let mut mirror = Mirror::new(Options::default()).unwrap();
/// let output = mirror.process_str("/*rtl:raw:.x{}*/").unwrap();
/// // No plugin provides `raw`, so the directive is reported and kept.
/// assert_eq!(output.report.warnings.len(), 1);
/// ```
pub struct Mirror {
    registry: Registry,
    options: Options,
    mirror: StringMirror,
    hooks: Box<dyn Hooks>,
}

impl Mirror {
    /// Create an engine without plugins.
    ///
    /// # Errors
    ///
    /// Returns an error if the options fail validation or the string map
    /// does not compile.
    pub fn new(options: Options) -> Result<Self, Error> {
        options.validate()?;
        let mirror = StringMirror::from_options(&options)?;
        Ok(Self {
            registry: Registry::default(),
            options,
            mirror,
            hooks: Box::new(NoHooks),
        })
    }

    /// Register a plugin after the ones already registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if one of the plugin's patterns
    /// does not compile.
    pub fn with_plugin(mut self, plugin: Plugin) -> Result<Self, Error> {
        self.registry.register(plugin)?;
        Ok(self)
    }

    /// Set hooks invoked before and after each run.
    #[must_use]
    pub fn with_hooks<H: Hooks + 'static>(mut self, hooks: H) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Mirror a stylesheet in place.
    pub fn process(&mut self, sheet: &mut Stylesheet) -> Report {
        self.registry.reset();
        self.hooks.pre(sheet);

        let state = RunState::new(self.options.clone(), self.mirror.clone());
        let mut run = Run::new(&mut self.registry, sheet, state);
        run.start();
        let report = run.finish();

        self.hooks.post(sheet);
        tracing::debug!(
            flips = report.flips,
            warnings = report.warnings.len(),
            "Mirroring completed"
        );
        report
    }

    /// Parse, mirror and serialize stylesheet text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is not a well-formed stylesheet.
    pub fn process_str(&mut self, css: &str) -> Result<Output, Error> {
        let mut sheet = rtl_tree::parse(css)?;
        let report = self.process(&mut sheet);
        Ok(Output {
            css: sheet.to_css(),
            report,
        })
    }
}

/// State of one traversal.
pub(crate) struct Run<'r> {
    pub(crate) registry: &'r mut Registry,
    pub(crate) sheet: &'r mut Stylesheet,
    pub(crate) state: RunState,
    pub(crate) stack: DirectiveStack,
    /// Rules waiting for a mirrored counterpart, in discovery order.
    pub(crate) pending: Vec<(String, NodeId)>,
    /// Flips in the current rule.
    pub(crate) flipped: usize,
    /// Flips in the whole run.
    pub(crate) flips: usize,
}

impl<'r> Run<'r> {
    pub(crate) fn new(registry: &'r mut Registry, sheet: &'r mut Stylesheet, state: RunState) -> Self {
        Self {
            registry,
            sheet,
            state,
            stack: DirectiveStack::default(),
            pending: Vec::new(),
            flipped: 0,
            flips: 0,
        }
    }

    pub(crate) fn start(&mut self) {
        let root = self.sheet.root();
        self.visit(root);
        self.walk(root);
    }

    /// Visit the children of `parent` in document order.
    ///
    /// Children are snapshotted on entry; nodes detached before they are
    /// reached are skipped and nodes inserted meanwhile are not visited.
    fn walk(&mut self, parent: NodeId) {
        let children = self.sheet.children(parent).to_vec();
        for child in children {
            if self.sheet.parent(child) != Some(parent) {
                continue;
            }
            self.visit(child);
            if self.sheet.parent(child) == Some(parent) {
                self.walk(child);
            }
        }
    }

    fn visit(&mut self, node: NodeId) {
        if !self.should_process(node) {
            return;
        }
        match self.sheet.kind(node) {
            NodeKind::Comment => self.process_comment(node),
            NodeKind::Rule => self.flipped = 0,
            NodeKind::AtRule => self.mirror_params(node),
            NodeKind::Declaration => self.process_declaration(node),
            NodeKind::Root => {}
        }
    }

    fn mirror_params(&mut self, node: NodeId) {
        if !self.state.options.process_urls.at_rules() {
            return;
        }
        let Some(at_rule) = self.sheet.at_rule(node) else {
            return;
        };
        let params = self.state.mirror.apply(&at_rule.params, MirrorTarget::Url);
        if params != at_rule.params
            && let Some(at_rule) = self.sheet.at_rule_mut(node)
        {
            tracing::debug!(name = %at_rule.name, params = %params, "Mirrored at-rule params");
            at_rule.params = params;
        }
    }

    pub(crate) fn finish(mut self) -> Report {
        for entry in self.stack.drain() {
            self.state.warn(
                WarningKind::Unclosed,
                entry.meta.source,
                format!("unclosed directive \"{}\".", entry.meta.name),
            );
        }
        for (_, rule) in std::mem::take(&mut self.pending) {
            self.state.warn(
                WarningKind::RenameSkipped,
                rule,
                "renaming skipped due to lack of a matching pair.".to_owned(),
            );
        }
        Report {
            warnings: self.state.warnings,
            flips: self.flips,
        }
    }
}
