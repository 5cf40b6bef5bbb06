//! Per-node eligibility check against the open directives.

use rtl_tree::NodeId;

use crate::context::Context;
use crate::engine::Run;
use crate::stack::DirectiveMeta;

impl Run<'_> {
    /// Decide whether `node` may be transformed.
    ///
    /// The node is marked processed on the first call, so later calls return
    /// `false` without consulting the stack again. Every open directive that
    /// expects the node's kind sees it, outermost first, even after an
    /// earlier one has claimed it.
    pub(crate) fn should_process(&mut self, node: NodeId) -> bool {
        if !self.state.visited.insert(node) {
            return false;
        }

        let kind = self.sheet.kind(node);
        let mut prevented = false;
        let mut index = 0;

        while let Some(entry) = self.stack.get(index) {
            let Some(handle) = entry.directive else {
                index += 1;
                continue;
            };
            let directive = self.registry.control_mut(handle);
            if !directive.expect().accepts(kind) {
                index += 1;
                continue;
            }

            let mut ctx = Context::new(self.sheet, &mut self.state);
            if directive.begin(node, &entry.meta, &mut ctx) {
                prevented = true;
            }
            if entry.meta.end && directive.end(node, &entry.meta, &mut ctx) {
                self.pop(index);
            } else {
                index += 1;
            }
        }

        !prevented
    }

    /// Close the directive at `index` and clean up its source comment.
    pub(crate) fn pop(&mut self, index: usize) {
        let entry = self.stack.remove(index);
        tracing::debug!(
            directive = %entry.meta.name,
            blacklisted = entry.meta.blacklisted,
            "Closed directive"
        );
        self.discard_source(entry.meta.source, entry.meta.preserve);
    }

    /// Detach a consumed directive comment when cleaning is enabled.
    ///
    /// The comment stays while another open directive still refers to it.
    pub(crate) fn discard_source(&mut self, source: NodeId, preserve: bool) {
        if preserve || self.stack.references(source) {
            return;
        }
        if self.sheet.parent(source).is_some() {
            self.sheet.remove(source);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rtl_config::Options;
    use rtl_tree::{NodeKind, parse};

    use crate::context::RunState;
    use crate::mirror::StringMirror;
    use crate::plugin::{ControlDirective, Expect, Plugin};
    use crate::registry::{ControlHandle, Registry, Resolution};
    use crate::stack::Entry;

    use super::*;

    /// Counts begin calls and claims every node.
    struct Counting(Arc<Mutex<usize>>);

    impl ControlDirective for Counting {
        fn expect(&self) -> Expect {
            Expect::nodes(&[NodeKind::Rule])
        }

        fn begin(&mut self, _node: NodeId, _meta: &DirectiveMeta, _ctx: &mut Context<'_>) -> bool {
            *self.0.lock().unwrap() += 1;
            true
        }

        fn end(&mut self, _node: NodeId, _meta: &DirectiveMeta, _ctx: &mut Context<'_>) -> bool {
            false
        }
    }

    /// Records `begin` calls; `claim` and `close` fix its answers.
    struct Recording {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        claim: bool,
        close: bool,
    }

    impl ControlDirective for Recording {
        fn expect(&self) -> Expect {
            Expect::nodes(&[NodeKind::Rule])
        }

        fn begin(&mut self, _node: NodeId, _meta: &DirectiveMeta, _ctx: &mut Context<'_>) -> bool {
            self.log.lock().unwrap().push(self.label);
            self.claim
        }

        fn end(&mut self, _node: NodeId, _meta: &DirectiveMeta, _ctx: &mut Context<'_>) -> bool {
            self.close
        }
    }

    fn resolved(registry: &Registry, name: &str) -> ControlHandle {
        match registry.resolve(name, &Options::default()) {
            Resolution::Directive(handle) => handle,
            other => panic!("unexpected resolution {other:?}"),
        }
    }

    fn open(name: &str, end: bool, source: NodeId, directive: ControlHandle) -> Entry {
        Entry {
            meta: DirectiveMeta {
                name: name.to_owned(),
                argument: String::new(),
                begin: true,
                end,
                blacklisted: false,
                preserve: true,
                source,
            },
            directive: Some(directive),
        }
    }

    #[test]
    fn test_gate_consults_entries_outermost_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recording = |label, claim, close| Recording {
            label,
            log: log.clone(),
            claim,
            close,
        };
        let mut registry = Registry::default();
        registry
            .register(
                Plugin::new("test")
                    .with_control("outer", recording("outer", true, false))
                    .with_control("middle", recording("middle", false, true))
                    .with_control("inner", recording("inner", false, false)),
            )
            .unwrap();
        let outer = resolved(&registry, "outer");
        let middle = resolved(&registry, "middle");
        let inner = resolved(&registry, "inner");

        let mut sheet = parse("/*x*/ .a {}").unwrap();
        let comment = sheet.children(sheet.root())[0];
        let rule = sheet.children(sheet.root())[1];
        let options = Options::default();
        let mirror = StringMirror::from_options(&options).unwrap();
        let mut run = Run::new(&mut registry, &mut sheet, RunState::new(options, mirror));
        run.stack.push(open("outer", false, comment, outer));
        run.stack.push(open("middle", true, comment, middle));
        run.stack.push(open("inner", true, comment, inner));

        // The outer entry claims the node, the later ones still see it
        assert!(!run.should_process(rule));
        assert_eq!(*log.lock().unwrap(), vec!["outer", "middle", "inner"]);

        // The middle entry closed without the inner one being skipped
        assert_eq!(run.stack.len(), 2);
        assert_eq!(run.stack.get(0).unwrap().meta.name, "outer");
        assert_eq!(run.stack.get(1).unwrap().meta.name, "inner");
    }

    #[test]
    fn test_gate_is_idempotent() {
        let calls = Arc::new(Mutex::new(0));
        let mut registry = Registry::default();
        registry
            .register(Plugin::new("test").with_control("count", Counting(calls.clone())))
            .unwrap();
        let handle = resolved(&registry, "count");

        let mut sheet = parse("/*x*/ .a {}").unwrap();
        let comment = sheet.children(sheet.root())[0];
        let rule = sheet.children(sheet.root())[1];
        let options = Options::default();
        let mirror = StringMirror::from_options(&options).unwrap();
        let mut run = Run::new(&mut registry, &mut sheet, RunState::new(options, mirror));
        run.stack.push(Entry {
            meta: DirectiveMeta {
                name: "count".to_owned(),
                argument: String::new(),
                begin: true,
                end: false,
                blacklisted: false,
                preserve: false,
                source: comment,
            },
            directive: Some(handle),
        });

        assert!(!run.should_process(rule));
        assert!(!run.should_process(rule));
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(run.stack.len(), 1);

        // Comments are not expected by the directive
        assert!(run.should_process(comment));
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
