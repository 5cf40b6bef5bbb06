//! Standard directives and processors for stylesheet mirroring.
//!
//! [`plugin`] bundles everything under the plugin name `rtlcss` (the name
//! used by `blacklist` tables):
//!
//! | kind    | names |
//! |---------|-------|
//! | control | `ignore`, `rename`, `remove`, `raw`, `options` |
//! | value   | `ignore`, `prepend`, `append`, `insert`, and `/*rtl:X*/` to replace the value |
//! | processors | `direction`, `float`/`clear`/`text-align`, four-value shorthands, `border-radius`, `cursor`, `*-left`/`*-right` properties |
//!
//! # Example
//!
//! ```
//! use rtl_config::Options;
//!
//! let css = ".nav { float: left; margin: 0 1px 0 2px; }\n\
//!            .logo { /*rtl:ignore*/ padding-left: 4px; }";
//! let output = rtl_basic::process(css, Options::default()).unwrap();
//!
//! assert_eq!(
//!     output.css,
//!     ".nav { float: right; margin: 0 2px 0 1px; }\n.logo { padding-left: 4px; }"
//! );
//! ```

mod control;
mod processors;
mod values;

use rtl_config::Options;
use rtl_core::{Error, Mirror, Output, Plugin};

pub use control::{Configure, Ignore, Raw, Remove, Rename};
pub use processors::{BorderRadius, Cursor, Direction, FourValue, Keyword, Sided};
pub use values::{Append, IgnoreValue, Insert, Prepend, Replace};

/// Plugin name used in `blacklist` tables.
pub const PLUGIN_NAME: &str = "rtlcss";

/// The standard plugin.
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::new(PLUGIN_NAME)
        .with_control("ignore", Ignore::default())
        .with_control("rename", Rename)
        .with_control("remove", Remove)
        .with_control("raw", Raw)
        .with_control("options", Configure::default())
        .with_value(IgnoreValue)
        .with_value(Prepend)
        .with_value(Append)
        .with_value(Insert)
        .with_value(Replace)
        .with_processor(Direction)
        .with_processor(Keyword)
        .with_processor(FourValue)
        .with_processor(BorderRadius)
        .with_processor(Cursor)
        .with_processor(Sided)
}

/// Create an engine with the standard plugin registered.
///
/// # Errors
///
/// Returns an error if the options are invalid.
pub fn mirror(options: Options) -> Result<Mirror, Error> {
    Mirror::new(options)?.with_plugin(plugin())
}

/// Mirror stylesheet text with the standard plugin.
///
/// # Errors
///
/// Returns an error if the options are invalid or the text does not parse.
pub fn process(css: &str, options: Options) -> Result<Output, Error> {
    mirror(options)?.process_str(css)
}
