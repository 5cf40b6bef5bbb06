//! Registered plugins with eagerly compiled patterns.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use rtl_config::Options;

use crate::plugin::{ControlDirective, Plugin, Processor, ValueDirective};
use crate::Error;

/// Position of a control directive inside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ControlHandle {
    plugin: usize,
    index: usize,
}

/// Outcome of looking up a control directive name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    Directive(ControlHandle),
    Blacklisted { plugin: String },
    Unsupported,
}

struct PluginEntry {
    name: String,
    names: HashMap<String, usize>,
    control: Vec<Box<dyn ControlDirective>>,
}

pub(crate) struct ValueEntry {
    pub(crate) pattern: Regex,
    pub(crate) directive: Box<dyn ValueDirective>,
}

pub(crate) struct ProcessorEntry {
    pub(crate) plugin: usize,
    pub(crate) pattern: Regex,
    pub(crate) processor: Box<dyn Processor>,
}

/// Plugins in registration order.
#[derive(Default)]
pub(crate) struct Registry {
    plugins: Vec<PluginEntry>,
    values: Vec<ValueEntry>,
    processors: Vec<ProcessorEntry>,
}

impl Registry {
    /// Add a plugin after the ones already registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if a processor pattern or a value
    /// directive name does not compile.
    pub(crate) fn register(&mut self, plugin: Plugin) -> Result<(), Error> {
        let Plugin {
            name,
            control,
            values,
            processors,
        } = plugin;
        let plugin_index = self.plugins.len();

        let invalid = |pattern: String, source: regex::Error| Error::InvalidPattern {
            plugin: name.clone(),
            pattern,
            source,
        };

        let mut compiled_values = Vec::with_capacity(values.len());
        for directive in values {
            let source = value_pattern(directive.name());
            let pattern = RegexBuilder::new(&source)
                .case_insensitive(true)
                .dot_matches_new_line(true)
                .build()
                .map_err(|e| invalid(source, e))?;
            compiled_values.push(ValueEntry { pattern, directive });
        }

        let mut compiled_processors = Vec::with_capacity(processors.len());
        for processor in processors {
            let pattern = Regex::new(processor.pattern())
                .map_err(|e| invalid(processor.pattern().to_owned(), e))?;
            compiled_processors.push(ProcessorEntry {
                plugin: plugin_index,
                pattern,
                processor,
            });
        }

        let mut names = HashMap::with_capacity(control.len());
        let mut handlers = Vec::with_capacity(control.len());
        for (directive_name, directive) in control {
            names.entry(directive_name).or_insert(handlers.len());
            handlers.push(directive);
        }

        tracing::debug!(
            plugin = %name,
            control = handlers.len(),
            values = compiled_values.len(),
            processors = compiled_processors.len(),
            "Registered plugin"
        );

        self.values.extend(compiled_values);
        self.processors.extend(compiled_processors);
        self.plugins.push(PluginEntry {
            name,
            names,
            control: handlers,
        });
        Ok(())
    }

    /// Look up a control directive, honoring the blacklist.
    ///
    /// Plugins are consulted in registration order; the first plugin that
    /// blacklists or provides `name` decides.
    pub(crate) fn resolve(&self, name: &str, options: &Options) -> Resolution {
        for (plugin_index, plugin) in self.plugins.iter().enumerate() {
            if options.is_blacklisted(&plugin.name, name) {
                return Resolution::Blacklisted {
                    plugin: plugin.name.clone(),
                };
            }
            if let Some(&index) = plugin.names.get(name) {
                return Resolution::Directive(ControlHandle {
                    plugin: plugin_index,
                    index,
                });
            }
        }
        Resolution::Unsupported
    }

    pub(crate) fn control_mut(&mut self, handle: ControlHandle) -> &mut dyn ControlDirective {
        self.plugins[handle.plugin].control[handle.index].as_mut()
    }

    /// Value directives across all plugins, in registration order.
    pub(crate) fn values(&self) -> &[ValueEntry] {
        &self.values
    }

    /// First processor whose pattern matches `property`.
    pub(crate) fn processor_for(&self, property: &str) -> Option<&ProcessorEntry> {
        self.processors
            .iter()
            .find(|entry| entry.pattern.is_match(property))
    }

    pub(crate) fn plugin_name(&self, index: usize) -> &str {
        &self.plugins[index].name
    }

    /// Clear per-run directive state.
    pub(crate) fn reset(&mut self) {
        for plugin in &mut self.plugins {
            for directive in &mut plugin.control {
                directive.reset();
            }
        }
    }
}

/// Matcher for `/*rtl:NAME:ARG*/`; group 1 captures the argument.
fn value_pattern(name: &str) -> String {
    if name.is_empty() {
        r"/\*!?\s*rtl:(.*?)\*/".to_owned()
    } else {
        format!(r"/\*!?\s*rtl:{}(?::(.*?)|\s*)\*/", regex::escape(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Context, DirectiveMeta, Expect, Flip};
    use rtl_tree::NodeId;

    struct Noop;

    impl ControlDirective for Noop {
        fn expect(&self) -> Expect {
            Expect::self_closing()
        }

        fn begin(&mut self, _node: NodeId, _meta: &DirectiveMeta, _ctx: &mut Context<'_>) -> bool {
            true
        }
    }

    struct Upper(&'static str);

    impl Processor for Upper {
        fn pattern(&self) -> &str {
            self.0
        }

        fn action(&self, property: &str, value: &str, _ctx: &Context<'_>) -> Flip {
            Flip::new(property, value.to_uppercase())
        }
    }

    #[test]
    fn test_resolve_first_plugin_wins() {
        let mut registry = Registry::default();
        registry
            .register(Plugin::new("first").with_control("raw", Noop))
            .unwrap();
        registry
            .register(Plugin::new("second").with_control("raw", Noop).with_control("x", Noop))
            .unwrap();
        let options = Options::default();

        assert_eq!(
            registry.resolve("raw", &options),
            Resolution::Directive(ControlHandle {
                plugin: 0,
                index: 0
            })
        );
        assert_eq!(
            registry.resolve("x", &options),
            Resolution::Directive(ControlHandle {
                plugin: 1,
                index: 1
            })
        );
        assert_eq!(registry.resolve("nope", &options), Resolution::Unsupported);
    }

    #[test]
    fn test_resolve_blacklist_checked_in_plugin_order() {
        let mut registry = Registry::default();
        registry
            .register(Plugin::new("first").with_control("raw", Noop))
            .unwrap();
        registry
            .register(Plugin::new("second").with_control("x", Noop))
            .unwrap();

        let mut options = Options::default();
        options
            .blacklist
            .entry("second".to_owned())
            .or_default()
            .insert("raw".to_owned(), true);
        // "first" provides raw before "second" blacklists it
        assert!(matches!(
            registry.resolve("raw", &options),
            Resolution::Directive(_)
        ));

        options
            .blacklist
            .entry("first".to_owned())
            .or_default()
            .insert("x".to_owned(), true);
        assert_eq!(
            registry.resolve("x", &options),
            Resolution::Blacklisted {
                plugin: "first".to_owned()
            }
        );
    }

    #[test]
    fn test_processor_for_first_match() {
        let mut registry = Registry::default();
        registry
            .register(Plugin::new("a").with_processor(Upper("^margin")))
            .unwrap();
        registry
            .register(Plugin::new("b").with_processor(Upper("^margin-left$")))
            .unwrap();

        let entry = registry.processor_for("margin-left").unwrap();
        assert_eq!(registry.plugin_name(entry.plugin), "a");
        assert!(registry.processor_for("padding").is_none());
    }

    #[test]
    fn test_invalid_processor_pattern() {
        let mut registry = Registry::default();
        let err = registry
            .register(Plugin::new("broken").with_processor(Upper("(")))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref plugin, .. } if plugin == "broken"));
    }

    #[test]
    fn test_value_pattern() {
        let named = Regex::new(&format!("(?is){}", value_pattern("append"))).unwrap();
        let caps = named.captures("1px /*rtl:append: 2px*/").unwrap();
        assert_eq!(caps.get(1).map(|m| m.as_str()), Some(" 2px"));
        assert!(named.is_match("/*!RTL:Append */"));
        assert_eq!(named.captures("/*rtl:append*/").unwrap().get(1), None);
        assert!(!named.is_match("/*rtl:appendix*/"));

        let any = Regex::new(&format!("(?is){}", value_pattern(""))).unwrap();
        let caps = any.captures("1px /*rtl:2px*/").unwrap();
        assert_eq!(&caps[1], "2px");
    }
}
