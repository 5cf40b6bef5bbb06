//! Plugin traits and the [`Plugin`] builder.
//!
//! A plugin bundles three kinds of extension, all matched in registration
//! order with the first match winning:
//!
//! - **Control directives** ([`ControlDirective`]): named by structured
//!   comments such as `/*rtl:begin:ignore*/`, they gate which nodes get
//!   transformed while they are open.
//! - **Value directives** ([`ValueDirective`]): inline `/*rtl:NAME:ARG*/`
//!   markers inside a declaration that take over from processors.
//! - **Processors** ([`Processor`]): property/value flip rules selected by a
//!   pattern over property names.

use regex::Regex;
use rtl_tree::{NodeId, NodeKind, Stylesheet};

use crate::{Context, DirectiveMeta};

/// Node kinds a control directive inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expect {
    kinds: &'static [NodeKind],
    self_closing: bool,
}

impl Expect {
    /// Directive consulted for every node of the given kinds while open.
    #[must_use]
    pub const fn nodes(kinds: &'static [NodeKind]) -> Self {
        Self {
            kinds,
            self_closing: false,
        }
    }

    /// Directive that completes inside the comment that invokes it.
    #[must_use]
    pub const fn self_closing() -> Self {
        Self {
            kinds: &[],
            self_closing: true,
        }
    }

    #[must_use]
    pub fn accepts(&self, kind: NodeKind) -> bool {
        self.kinds.contains(&kind)
    }

    #[must_use]
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }
}

/// Handler for a named control directive.
///
/// Handlers are shared by every invocation of their name within a run and
/// may keep state between calls.
pub trait ControlDirective: Send {
    /// Node kinds this directive inspects while open, or
    /// [`Expect::self_closing`] for directives that complete inside the
    /// comment that invokes them.
    fn expect(&self) -> Expect;

    /// Called for every node of an expected kind while the directive is
    /// open, and once with the invoking comment when it is self-closing.
    ///
    /// Returns `true` when the directive handled the node, so the engine
    /// must not transform it.
    fn begin(&mut self, node: NodeId, meta: &DirectiveMeta, ctx: &mut Context<'_>) -> bool;

    /// Called after `begin` for forms that carry an end (`rtl:NAME` or
    /// `rtl:end:NAME`). Returning `true` closes the directive.
    fn end(&mut self, _node: NodeId, _meta: &DirectiveMeta, _ctx: &mut Context<'_>) -> bool {
        true
    }

    /// Clear state left over from a previous run. Runs before each run.
    fn reset(&mut self) {}
}

/// Handler for an inline value directive: `/*rtl:NAME:ARG*/`.
pub trait ValueDirective: Send {
    /// Directive name matched after `rtl:`. An empty name matches any
    /// `rtl:` comment inside the value.
    fn name(&self) -> &str;

    /// Act on the declaration. `pattern` is the compiled matcher for this
    /// directive; capture group 1 holds the argument.
    ///
    /// Returns `true` when the declaration was handled.
    fn action(&self, decl: NodeId, pattern: &Regex, ctx: &mut Context<'_>) -> bool;
}

/// Result of a processor action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flip {
    pub property: String,
    pub value: String,
}

impl Flip {
    #[must_use]
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Property/value flip rule.
pub trait Processor: Send {
    /// Regular expression matched against (possibly aliased) property names.
    fn pattern(&self) -> &str;

    /// Compute the mirrored property and value.
    ///
    /// Comments in `value` are replaced by opaque placeholders that must be
    /// kept in the output.
    fn action(&self, property: &str, value: &str, ctx: &Context<'_>) -> Flip;
}

/// Lifecycle hooks invoked once around each run.
pub trait Hooks: Send {
    /// Called before the tree is walked.
    fn pre(&mut self, _sheet: &mut Stylesheet) {}

    /// Called after end-of-document warnings are collected.
    fn post(&mut self, _sheet: &mut Stylesheet) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default)]
pub struct NoHooks;

impl Hooks for NoHooks {}

/// A named bundle of directives and processors.
///
/// # Example
///
/// ```
/// use rtl_core::{Context, Flip, Plugin, Processor};
///
/// struct Direction;
///
/// impl Processor for Direction {
///     fn pattern(&self) -> &str { "^direction$" }
///
///     fn action(&self, property: &str, value: &str, _ctx: &Context<'_>) -> Flip {
///         let value = if value == "ltr" { "rtl" } else { "ltr" };
///         Flip::new(property, value)
///     }
/// }
///
/// let plugin = Plugin::new("direction").with_processor(Direction);
/// assert_eq!(plugin.name(), "direction");
/// ```
pub struct Plugin {
    pub(crate) name: String,
    pub(crate) control: Vec<(String, Box<dyn ControlDirective>)>,
    pub(crate) values: Vec<Box<dyn ValueDirective>>,
    pub(crate) processors: Vec<Box<dyn Processor>>,
}

impl Plugin {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control: Vec::new(),
            values: Vec::new(),
            processors: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a control directive under `name`.
    #[must_use]
    pub fn with_control<D: ControlDirective + 'static>(
        mut self,
        name: impl Into<String>,
        directive: D,
    ) -> Self {
        self.control.push((name.into(), Box::new(directive)));
        self
    }

    /// Register a value directive. Order matters: earlier directives are
    /// tried first.
    #[must_use]
    pub fn with_value<D: ValueDirective + 'static>(mut self, directive: D) -> Self {
        self.values.push(Box::new(directive));
        self
    }

    /// Register a processor. Order matters: the first matching processor wins.
    #[must_use]
    pub fn with_processor<P: Processor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }
}
