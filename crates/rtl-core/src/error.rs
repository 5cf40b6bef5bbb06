//! Error types for engine configuration.

use rtl_config::ConfigError;
use rtl_tree::ParseError;

/// Error raised while configuring the engine or parsing its input.
///
/// A run itself never fails; problems found while transforming a document
/// are reported as [`Warning`](crate::Warning)s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A processor or value directive pattern failed to compile.
    #[error("invalid pattern {pattern:?} in plugin \"{plugin}\"")]
    InvalidPattern {
        /// Plugin that supplied the pattern.
        plugin: String,
        /// Pattern source.
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The string map could not be compiled.
    #[error("invalid string map")]
    StringMap(#[from] regex::Error),

    /// Options failed validation.
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// Input stylesheet could not be parsed.
    #[error("stylesheet parse error")]
    Parse(#[from] ParseError),
}
