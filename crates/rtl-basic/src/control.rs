//! Control directives: `ignore`, `rename`, `remove`, `raw` and `options`.

use std::sync::LazyLock;

use regex::Regex;
use rtl_config::Options;
use rtl_core::{Context, ControlDirective, DirectiveMeta, Expect, MirrorTarget};
use rtl_tree::{NodeId, NodeKind};

static END_IGNORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*!?\s*rtl:end:ignore").expect("invalid end ignore regex"));

/// `ignore`: leave nodes untouched.
///
/// The one-shot form covers the next node and all of its descendants; the
/// block form covers everything up to `rtl:end:ignore`.
#[derive(Debug, Default)]
pub struct Ignore {
    end_node: Option<NodeId>,
}

impl ControlDirective for Ignore {
    fn expect(&self) -> Expect {
        Expect::nodes(&[
            NodeKind::AtRule,
            NodeKind::Comment,
            NodeKind::Declaration,
            NodeKind::Rule,
        ])
    }

    fn begin(&mut self, node: NodeId, meta: &DirectiveMeta, ctx: &mut Context<'_>) -> bool {
        if self.end_node.is_none() && meta.is_one_shot() {
            self.end_node = Some(ctx.sheet().last_descendant(node));
        }
        // The closing comment must get through to close the block
        !ctx
            .sheet()
            .comment(node)
            .is_some_and(|comment| END_IGNORE.is_match(&comment.text))
    }

    fn end(&mut self, node: NodeId, meta: &DirectiveMeta, ctx: &mut Context<'_>) -> bool {
        let block_closed = meta.begin != meta.end && ctx.sheet().kind(node) == NodeKind::Comment;
        let one_shot_done = meta.is_one_shot() && self.end_node == Some(node);
        if block_closed || one_shot_done {
            self.end_node = None;
            return true;
        }
        false
    }

    fn reset(&mut self) {
        self.end_node = None;
    }
}

/// `rename`: mirror the selector of every rule it sees.
#[derive(Debug, Default)]
pub struct Rename;

impl ControlDirective for Rename {
    fn expect(&self) -> Expect {
        Expect::nodes(&[NodeKind::Rule])
    }

    fn begin(&mut self, node: NodeId, _meta: &DirectiveMeta, ctx: &mut Context<'_>) -> bool {
        let Some(rule) = ctx.sheet().rule(node) else {
            return false;
        };
        let selector = ctx.mirror(&rule.selector, MirrorTarget::Selector);
        if let Some(rule) = ctx.sheet_mut().rule_mut(node) {
            tracing::debug!(from = %rule.selector, to = %selector, "Renamed rule");
            rule.selector = selector;
        }
        false
    }
}

/// `remove`: drop nodes from the output.
#[derive(Debug, Default)]
pub struct Remove;

impl ControlDirective for Remove {
    fn expect(&self) -> Expect {
        Expect::nodes(&[NodeKind::AtRule, NodeKind::Rule, NodeKind::Declaration])
    }

    fn begin(&mut self, node: NodeId, _meta: &DirectiveMeta, ctx: &mut Context<'_>) -> bool {
        ctx.sheet_mut().remove(node);
        true
    }
}

/// `raw:CSS`: insert stylesheet text in place of the comment.
///
/// Inserted nodes are not mirrored.
#[derive(Debug, Default)]
pub struct Raw;

impl ControlDirective for Raw {
    fn expect(&self) -> Expect {
        Expect::self_closing()
    }

    fn begin(&mut self, node: NodeId, meta: &DirectiveMeta, ctx: &mut Context<'_>) -> bool {
        match rtl_tree::parse(&meta.argument) {
            Ok(fragment) => {
                for inserted in ctx.sheet_mut().graft_before(node, &fragment) {
                    ctx.mark_processed(inserted);
                }
            }
            Err(e) => ctx.warn(node, format!("invalid raw stylesheet: {e}")),
        }
        true
    }
}

/// `options:JSON`: replace the active options.
///
/// The one-shot form applies to the rest of the document; the block form
/// restores the previous options at `rtl:end:options`.
#[derive(Debug, Default)]
pub struct Configure {
    saved: Vec<Options>,
}

impl ControlDirective for Configure {
    fn expect(&self) -> Expect {
        Expect::self_closing()
    }

    fn begin(&mut self, node: NodeId, meta: &DirectiveMeta, ctx: &mut Context<'_>) -> bool {
        self.saved.push(ctx.options().clone());
        let applied = Options::from_json_str(&meta.argument)
            .map_err(rtl_core::Error::from)
            .and_then(|options| ctx.replace_options(options));
        if let Err(e) = applied {
            ctx.warn(node, format!("invalid options: {e}"));
        }
        true
    }

    fn end(&mut self, node: NodeId, meta: &DirectiveMeta, ctx: &mut Context<'_>) -> bool {
        let saved = self.saved.pop();
        if !meta.begin
            && let Some(saved) = saved
            && let Err(e) = ctx.replace_options(saved)
        {
            ctx.warn(node, format!("invalid options: {e}"));
        }
        true
    }

    fn reset(&mut self) {
        self.saved.clear();
    }
}
