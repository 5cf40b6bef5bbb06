//! Lossless stylesheet tree.
//!
//! This crate provides the [`Stylesheet`] arena that the mirroring engine
//! transforms in place. Nodes are addressed by copyable [`NodeId`] handles and
//! carry the raw formatting fragments (whitespace, semicolons, comments inside
//! values) needed to re-emit the original text byte for byte.
//!
//! # Example
//!
//! ```
//! use rtl_tree::{NodeKind, parse};
//!
//! let css = ".a { float: left; }\n";
//! let mut sheet = parse(css).unwrap();
//!
//! let rule = sheet.children(sheet.root())[0];
//! assert_eq!(sheet.kind(rule), NodeKind::Rule);
//!
//! let decl = sheet.children(rule)[0];
//! sheet.declaration_mut(decl).unwrap().set_value("right");
//! assert_eq!(sheet.to_css(), ".a { float: right; }\n");
//! ```

mod node;
mod parser;
mod serializer;

pub use node::{
    AtRule, Comment, Declaration, Node, NodeData, NodeId, NodeKind, Raws, Rule, Stylesheet,
};
pub use parser::{ParseError, parse};
