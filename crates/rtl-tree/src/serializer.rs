//! Stylesheet serialization.

use std::fmt;

use crate::node::{NodeData, NodeId, Stylesheet};

impl Stylesheet {
    /// Serialize the tree back to stylesheet text.
    ///
    /// Detached nodes are skipped. Statements that were parsed without a
    /// trailing `;` get one only when another sibling follows them.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root(), true, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, is_last: bool, out: &mut String) {
        let node = self.node(id);
        let raws = &node.raws;

        match &node.data {
            NodeData::Root => {
                self.write_children(id, out);
                out.push_str(&raws.after);
            }
            NodeData::Rule(rule) => {
                out.push_str(&raws.before);
                out.push_str(&rule.selector);
                out.push_str(&raws.between);
                self.write_block(id, out);
            }
            NodeData::AtRule(at_rule) => {
                out.push_str(&raws.before);
                out.push('@');
                out.push_str(&at_rule.name);
                out.push_str(&raws.after_name);
                out.push_str(&at_rule.params);
                out.push_str(&raws.between);
                if at_rule.has_block {
                    self.write_block(id, out);
                } else if raws.semicolon || !is_last {
                    out.push(';');
                }
            }
            NodeData::Declaration(decl) => {
                out.push_str(&raws.before);
                out.push_str(&decl.property);
                out.push_str(&decl.between);
                out.push_str(decl.value_text());
                if let Some(important) = &decl.important {
                    out.push_str(important);
                }
                out.push_str(&raws.after);
                if raws.semicolon || !is_last {
                    out.push(';');
                }
            }
            NodeData::Comment(comment) => {
                out.push_str(&raws.before);
                out.push_str("/*");
                out.push_str(&comment.text);
                out.push_str("*/");
            }
        }
    }

    fn write_block(&self, id: NodeId, out: &mut String) {
        out.push('{');
        self.write_children(id, out);
        out.push_str(&self.node(id).raws.after);
        out.push('}');
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        let children = self.children(id);
        for (index, &child) in children.iter().enumerate() {
            self.write_node(child, index + 1 == children.len(), out);
        }
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Declaration, NodeData, Raws, Rule, Stylesheet, parse};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_built_tree() {
        let mut sheet = Stylesheet::new();
        let root = sheet.root();
        let rule = sheet.append(
            root,
            NodeData::Rule(Rule {
                selector: ".a".to_owned(),
            }),
            Raws {
                between: " ".to_owned(),
                ..Raws::default()
            },
        );
        for (property, value) in [("left", "0"), ("color", "red")] {
            sheet.append(
                rule,
                NodeData::Declaration(Declaration::new(property, value)),
                Raws {
                    before: " ".to_owned(),
                    ..Raws::default()
                },
            );
        }

        assert_eq!(sheet.to_css(), ".a { left: 0; color: red}");
    }

    #[test]
    fn test_removed_nodes_are_skipped() {
        let mut sheet = parse("/* drop */ .a { left: 0; }").unwrap();
        let comment = sheet.children(sheet.root())[0];
        sheet.remove(comment);

        assert_eq!(sheet.to_css(), " .a { left: 0; }");
    }

    #[test]
    fn test_semicolon_added_before_new_sibling() {
        let mut sheet = parse(".a { left: 0 }").unwrap();
        let rule = sheet.children(sheet.root())[0];
        let last = sheet.children(rule)[0];
        sheet.node_mut(last).raws.after.clear();
        sheet.append(
            rule,
            NodeData::Declaration(Declaration::new("right", "auto")),
            Raws {
                before: " ".to_owned(),
                ..Raws::default()
            },
        );

        assert_eq!(sheet.to_css(), ".a { left: 0; right: auto}");
    }

    #[test]
    fn test_display_matches_to_css() {
        let sheet = parse("@import 'x.css';").unwrap();
        assert_eq!(sheet.to_string(), "@import 'x.css';");
    }
}
