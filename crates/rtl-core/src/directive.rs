//! Directive comment processing.

use rtl_tree::NodeId;

use crate::context::Context;
use crate::engine::Run;
use crate::registry::Resolution;
use crate::stack::{DirectiveMeta, Entry};
use crate::syntax::{DirectiveForm, parse_comment};
use crate::WarningKind;

/// Result of dispatching one form of a directive comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan {
    /// The form was handled; continue with the next form.
    Matched,
    /// The form was not recognized; continue with the next form.
    NotMatched,
    /// The form consumed the rest of the comment.
    StopScanning,
}

impl Run<'_> {
    /// Apply the directive forms carried by a comment node.
    pub(crate) fn process_comment(&mut self, node: NodeId) {
        let Some(comment) = self.sheet.comment(node) else {
            return;
        };
        let Some(parsed) = parse_comment(&comment.text) else {
            return;
        };
        let preserve = parsed.preserve || !self.state.options.clean;

        let mut consumed = false;
        for form in parsed.forms {
            let meta = meta_for(form, node, preserve);
            match self.dispatch(meta) {
                Scan::Matched => consumed = true,
                Scan::NotMatched => {}
                Scan::StopScanning => {
                    consumed = true;
                    break;
                }
            }
        }

        if consumed {
            self.discard_source(node, preserve);
        }
    }

    fn dispatch(&mut self, mut meta: DirectiveMeta) -> Scan {
        match self.registry.resolve(&meta.name, &self.state.options) {
            Resolution::Blacklisted { plugin } => {
                meta.blacklisted = true;
                self.dispatch_blacklisted(meta, &plugin)
            }
            Resolution::Unsupported => {
                self.state.warn(
                    WarningKind::Unsupported,
                    meta.source,
                    format!("unsupported directive \"{}\".", meta.name),
                );
                Scan::NotMatched
            }
            Resolution::Directive(handle) => {
                if !meta.begin {
                    return self.close(&meta);
                }

                let directive = self.registry.control_mut(handle);
                if directive.expect().is_self_closing() {
                    let mut ctx = Context::new(self.sheet, &mut self.state);
                    let done = directive.begin(meta.source, &meta, &mut ctx)
                        && meta.end
                        && directive.end(meta.source, &meta, &mut ctx);
                    if done {
                        tracing::debug!(directive = %meta.name, "Applied directive");
                        return Scan::StopScanning;
                    }
                }

                tracing::debug!(
                    directive = %meta.name,
                    one_shot = meta.is_one_shot(),
                    "Opened directive"
                );
                self.stack.push(Entry {
                    meta,
                    directive: Some(handle),
                });
                Scan::Matched
            }
        }
    }

    /// Blacklisted forms never reach their handler. A begin-only form
    /// leaves a marker so the matching end form has something to close.
    fn dispatch_blacklisted(&mut self, meta: DirectiveMeta, plugin: &str) -> Scan {
        if meta.begin {
            self.state.warn(
                WarningKind::Blacklisted,
                meta.source,
                format!("directive \"{plugin}.{}\" is blacklisted.", meta.name),
            );
        }

        match (meta.begin, meta.end) {
            (true, false) => self.stack.push(Entry {
                meta,
                directive: None,
            }),
            (false, true) => {
                if let Some(index) = self.stack.innermost(&meta.name) {
                    self.pop(index);
                }
            }
            _ => {}
        }
        Scan::Matched
    }

    /// Handle an end-only form for a supported directive.
    fn close(&mut self, meta: &DirectiveMeta) -> Scan {
        let Some(index) = self.stack.innermost(&meta.name) else {
            self.state.warn(
                WarningKind::UnmatchedEnd,
                meta.source,
                format!("found end \"{}\" without a matching begin.", meta.name),
            );
            return Scan::StopScanning;
        };

        let closed = match self.stack.get(index).and_then(|entry| entry.directive) {
            Some(handle) => {
                let mut ctx = Context::new(self.sheet, &mut self.state);
                self.registry.control_mut(handle).end(meta.source, meta, &mut ctx)
            }
            None => true,
        };
        if closed {
            self.pop(index);
        }
        Scan::StopScanning
    }
}

fn meta_for(form: DirectiveForm, source: NodeId, preserve: bool) -> DirectiveMeta {
    DirectiveMeta {
        name: form.name,
        argument: form.argument,
        begin: form.begin,
        end: form.end,
        blacklisted: false,
        preserve,
        source,
    }
}
