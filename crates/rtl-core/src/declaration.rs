//! Declaration pipeline: value directives, processors and auto-rename.

use std::sync::LazyLock;

use regex::Regex;
use rtl_tree::{Declaration, NodeId};

use crate::comments::SavedComments;
use crate::context::Context;
use crate::engine::Run;
use crate::mirror::{MirrorTarget, Swap, SwapOptions};

static DIRECTIVE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\s*/\*!?\s*rtl:.*?\*/").expect("invalid directive token regex")
});

static ENV_INSETS: LazyLock<Swap> = LazyLock::new(|| {
    Swap::new(
        "safe-area-inset-left",
        "safe-area-inset-right",
        SwapOptions::default(),
    )
    .expect("invalid safe area swap")
});

/// Text that value directives are matched against.
///
/// Joins the spacing after the colon, the value as written and the
/// importance marker, so a directive comment is found wherever it sits.
#[must_use]
pub fn directive_source(decl: &Declaration) -> String {
    let between = decl
        .between
        .split_once(':')
        .map_or("", |(_, rest)| rest.trim());
    let important = decl.important.as_deref().unwrap_or("");
    format!("{between}{}{important}", decl.value_text())
}

/// Remove directive comments from every raw part of a declaration.
fn strip_directives(decl: &mut Declaration) {
    if DIRECTIVE_TOKEN.is_match(&decl.between) {
        decl.between = DIRECTIVE_TOKEN.replace_all(&decl.between, "").into_owned();
    }
    if DIRECTIVE_TOKEN.is_match(decl.value_text()) {
        let value = DIRECTIVE_TOKEN
            .replace_all(decl.value_text(), "")
            .trim()
            .to_owned();
        decl.set_raw_value(value);
    }
    if let Some(important) = &decl.important
        && DIRECTIVE_TOKEN.is_match(important)
    {
        decl.important = Some(DIRECTIVE_TOKEN.replace_all(important, "").into_owned());
    }
}

impl Run<'_> {
    pub(crate) fn process_declaration(&mut self, node: NodeId) {
        if !self.apply_value_directives(node) {
            self.apply_processors(node);
        }
        self.auto_rename(node);
    }

    /// Try each value directive in registration order.
    ///
    /// Returns `true` when one handled the declaration.
    fn apply_value_directives(&mut self, node: NodeId) -> bool {
        let Some(decl) = self.sheet.declaration(node) else {
            return false;
        };
        let source = directive_source(decl);
        if !source.contains("/*") {
            return false;
        }

        for entry in self.registry.values() {
            if !entry.pattern.is_match(&source) {
                continue;
            }
            let mut ctx = Context::new(self.sheet, &mut self.state);
            if !entry.directive.action(node, &entry.pattern, &mut ctx) {
                continue;
            }

            tracing::debug!(directive = %entry.directive.name(), "Applied value directive");
            if self.state.options.clean
                && let Some(decl) = self.sheet.declaration_mut(node)
            {
                strip_directives(decl);
            }
            self.flipped += 1;
            self.flips += 1;
            return true;
        }
        false
    }

    /// Run the first processor whose pattern matches the property.
    fn apply_processors(&mut self, node: NodeId) {
        let Some(decl) = self.sheet.declaration(node) else {
            return;
        };
        let key = self
            .state
            .options
            .alias(&decl.property)
            .unwrap_or(&decl.property)
            .to_owned();
        let Some(entry) = self.registry.processor_for(&key) else {
            return;
        };

        let original_property = decl.property.clone();
        let original_value = decl.value_text().to_owned();
        let (mut working, saved) = SavedComments::save(&original_value);
        if self.state.options.process_env {
            working = ENV_INSETS.apply(&working);
        }

        let ctx = Context::new(self.sheet, &mut self.state);
        let flip = entry.processor.action(&key, &working, &ctx);
        let value = saved.restore(&flip.value);

        // An aliased property is renamed only when the processor renames its alias
        let property_changed = flip.property != key;
        if !property_changed && value == original_value {
            return;
        }

        tracing::debug!(
            plugin = %self.registry.plugin_name(entry.plugin),
            property = %original_property,
            flipped = %flip.property,
            "Flipped declaration"
        );
        if let Some(decl) = self.sheet.declaration_mut(node) {
            if property_changed {
                decl.property = flip.property;
            }
            decl.set_raw_value(value);
        }
        self.flipped += 1;
        self.flips += 1;
    }

    /// Mirror the selector of a rule none of whose declarations flipped.
    ///
    /// Runs on the rule's last declaration. In strict mode a rule is only
    /// renamed together with the rule carrying its mirrored selector.
    fn auto_rename(&mut self, node: NodeId) {
        if !self.state.options.auto_rename || self.flipped > 0 {
            return;
        }
        let Some(parent) = self.sheet.parent(node) else {
            return;
        };
        let Some(rule) = self.sheet.rule(parent) else {
            return;
        };
        if !self.sheet.is_last_of_kind(node) {
            return;
        }

        let selector = rule.selector.clone();
        let mirrored = self.state.mirror.apply(&selector, MirrorTarget::Selector);

        if !self.state.options.auto_rename_strict {
            if mirrored == selector {
                return;
            }
            tracing::debug!(from = %selector, to = %mirrored, "Renamed rule");
            self.set_selector(parent, mirrored);
            return;
        }

        match self.pending.iter().position(|(pending, _)| *pending == mirrored) {
            Some(position) => {
                let (_, pair) = self.pending.remove(position);
                tracing::debug!(from = %selector, to = %mirrored, "Renamed rule pair");
                self.set_selector(pair, selector);
                self.set_selector(parent, mirrored);
            }
            None => self.pending.push((selector, parent)),
        }
    }

    fn set_selector(&mut self, rule: NodeId, selector: String) {
        if let Some(rule) = self.sheet.rule_mut(rule) {
            rule.selector = selector;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_directive_source_joins_raw_parts() {
        let mut decl = Declaration::new("left", "1px /*rtl:2px*/");
        decl.important = Some(" !important/*rtl:ignore*/".to_owned());
        assert_eq!(
            directive_source(&decl),
            "1px /*rtl:2px*/ !important/*rtl:ignore*/"
        );
    }

    #[test]
    fn test_strip_directives() {
        let mut decl = Declaration::new("left", "1px /*rtl:2px*/ /* note */");
        decl.important = Some(" !important /*!rtl:ignore*/".to_owned());
        strip_directives(&mut decl);

        assert_eq!(decl.value_text(), "1px /* note */");
        assert_eq!(decl.value, "1px");
        assert_eq!(decl.important.as_deref(), Some(" !important"));
    }

    #[test]
    fn test_env_insets_swap() {
        assert_eq!(
            ENV_INSETS.apply("env(safe-area-inset-left) env(safe-area-inset-right)"),
            "env(safe-area-inset-right) env(safe-area-inset-left)"
        );
    }
}
