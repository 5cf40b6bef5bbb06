//! Value directives written inside a declaration value.

use regex::{Captures, Regex};
use rtl_core::{Context, ValueDirective, directive_source};
use rtl_tree::{Declaration, NodeId};

/// Argument of the first directive `pattern` finds in `decl`.
fn argument(decl: &Declaration, pattern: &Regex) -> Option<String> {
    let source = directive_source(decl);
    let caps = pattern.captures(&source)?;
    Some(caps.get(1).map_or("", |m| m.as_str()).to_owned())
}

/// `/*rtl:ignore*/`: keep the declaration as written.
#[derive(Debug, Default)]
pub struct IgnoreValue;

impl ValueDirective for IgnoreValue {
    fn name(&self) -> &str {
        "ignore"
    }

    fn action(&self, _decl: NodeId, _pattern: &Regex, _ctx: &mut Context<'_>) -> bool {
        true
    }
}

/// `/*rtl:prepend:X*/`: put X in front of the value.
#[derive(Debug, Default)]
pub struct Prepend;

impl ValueDirective for Prepend {
    fn name(&self) -> &str {
        "prepend"
    }

    fn action(&self, decl: NodeId, pattern: &Regex, ctx: &mut Context<'_>) -> bool {
        let Some(decl) = ctx.sheet_mut().declaration_mut(decl) else {
            return false;
        };
        let Some(prefix) = argument(decl, pattern) else {
            return false;
        };
        let value = format!("{prefix}{}", decl.value_text());
        decl.set_raw_value(value);
        true
    }
}

/// `/*rtl:append:X*/`: put X after the value.
#[derive(Debug, Default)]
pub struct Append;

impl ValueDirective for Append {
    fn name(&self) -> &str {
        "append"
    }

    fn action(&self, decl: NodeId, pattern: &Regex, ctx: &mut Context<'_>) -> bool {
        let Some(decl) = ctx.sheet_mut().declaration_mut(decl) else {
            return false;
        };
        let Some(suffix) = argument(decl, pattern) else {
            return false;
        };
        let value = format!("{}{suffix}", decl.value_text());
        decl.set_raw_value(value);
        true
    }
}

/// `/*rtl:insert:X*/`: replace the comment itself with X.
#[derive(Debug, Default)]
pub struct Insert;

impl ValueDirective for Insert {
    fn name(&self) -> &str {
        "insert"
    }

    fn action(&self, decl: NodeId, pattern: &Regex, ctx: &mut Context<'_>) -> bool {
        let Some(decl) = ctx.sheet_mut().declaration_mut(decl) else {
            return false;
        };
        let value = pattern
            .replace(decl.value_text(), |caps: &Captures<'_>| {
                caps.get(1).map_or("", |m| m.as_str()).to_owned()
            })
            .into_owned();
        decl.set_raw_value(value);
        true
    }
}

/// `/*rtl:X*/`: replace the whole value with X.
///
/// Matches any directive comment, so it has to be registered last.
#[derive(Debug, Default)]
pub struct Replace;

impl ValueDirective for Replace {
    fn name(&self) -> &str {
        ""
    }

    fn action(&self, decl: NodeId, pattern: &Regex, ctx: &mut Context<'_>) -> bool {
        let Some(decl) = ctx.sheet_mut().declaration_mut(decl) else {
            return false;
        };
        let Some(replacement) = argument(decl, pattern) else {
            return false;
        };

        // The directive stays in the raw value until cleaning strips it
        let token = pattern
            .find(decl.value_text())
            .map(|m| m.as_str().to_owned());
        match token {
            Some(token) => decl.set_raw_value(format!("{replacement}{token}")),
            None => decl.set_value(replacement),
        }
        true
    }
}
