//! Directive-driven stylesheet mirroring.
//!
//! [`Mirror`] walks a [`Stylesheet`](rtl_tree::Stylesheet) depth-first and
//! turns a left-to-right stylesheet into its right-to-left counterpart. What
//! "flipping" means for a given property is supplied by [`Plugin`]s; the
//! engine decides whether and how each flip runs:
//!
//! 1. Structured comments (`/*rtl:begin:ignore*/`, `/*rtl:end:ignore*/`,
//!    `/*rtl:remove*/`, ...) open and close control directives. Every node
//!    is checked against the open directives before it is transformed.
//! 2. Declarations first try inline value directives (`/*rtl:ignore*/`,
//!    `/*rtl:append:X*/`, ...) and otherwise the first processor whose
//!    pattern matches the property.
//! 3. Rules none of whose declarations flipped can have their selectors
//!    mirrored (`auto_rename`), optionally only in pairs.
//!
//! Problems found while processing never abort a run; they are collected as
//! [`Warning`]s in the returned [`Report`].
//!
//! # Example
//!
//! ```
//! use rtl_config::Options;
//! use rtl_core::{Context, Flip, Mirror, Plugin, Processor};
//!
//! struct Float;
//!
//! impl Processor for Float {
//!     fn pattern(&self) -> &str { "^float$" }
//!
//!     fn action(&self, property: &str, value: &str, _ctx: &Context<'_>) -> Flip {
//!         let value = match value {
//!             "left" => "right",
//!             "right" => "left",
//!             other => other,
//!         };
//!         Flip::new(property, value)
//!     }
//! }
//!
//! let mut mirror = Mirror::new(Options::default())
//!     .unwrap()
//!     .with_plugin(Plugin::new("float").with_processor(Float))
//!     .unwrap();
//!
//! let output = mirror.process_str(".a { float: left; }").unwrap();
//! assert_eq!(output.css, ".a { float: right; }");
//! assert_eq!(output.report.flips, 1);
//! ```

mod comments;
mod context;
mod declaration;
mod directive;
mod engine;
mod error;
mod gate;
mod mirror;
mod plugin;
mod registry;
mod stack;
mod syntax;
mod warning;

pub use context::Context;
pub use declaration::directive_source;
pub use engine::{Mirror, Output, Report};
pub use error::Error;
pub use mirror::{MirrorTarget, StringMirror, Swap, SwapOptions};
pub use plugin::{
    ControlDirective, Expect, Flip, Hooks, NoHooks, Plugin, Processor, ValueDirective,
};
pub use stack::DirectiveMeta;
pub use warning::{Warning, WarningKind};
