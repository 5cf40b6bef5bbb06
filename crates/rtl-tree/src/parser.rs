//! Stylesheet parsing.
//!
//! A small hand-written parser that keeps every raw formatting fragment so the
//! tree serializes back to the original text. It does not validate CSS; it
//! only needs to find statements, blocks, comments and declarations.

use crate::node::{AtRule, Comment, Declaration, NodeData, NodeId, Raws, Rule, Stylesheet};

/// Error returned when the input cannot be split into statements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Comment opened with `/*` but never closed.
    #[error("unterminated comment at byte {0}")]
    UnterminatedComment(usize),
    /// Quoted string never closed.
    #[error("unterminated string at byte {0}")]
    UnterminatedString(usize),
    /// Block opened with `{` but never closed.
    #[error("unclosed block at byte {0}")]
    UnclosedBlock(usize),
    /// Closing `}` at the top level.
    #[error("unexpected `}}` at byte {0}")]
    UnexpectedClose(usize),
    /// Statement that is neither a rule, an at-rule nor a declaration.
    #[error("missing `:` in declaration at byte {0}")]
    MissingColon(usize),
}

/// Parse a stylesheet.
///
/// # Example
///
/// ```
/// use rtl_tree::parse;
///
/// let css = "@media print {\n  .a { margin: 0 1px 0 2px !important }\n}\n";
/// let sheet = parse(css).unwrap();
/// assert_eq!(sheet.to_css(), css);
/// ```
pub fn parse(css: &str) -> Result<Stylesheet, ParseError> {
    let mut parser = Parser {
        src: css,
        pos: 0,
        sheet: Stylesheet::new(),
    };
    let root = parser.sheet.root();
    parser.block(root, None)?;
    Ok(parser.sheet)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    sheet: Stylesheet,
}

impl Parser<'_> {
    /// Parse statements until the closing `}` (or end of input for the root).
    fn block(&mut self, parent: NodeId, opened_at: Option<usize>) -> Result<(), ParseError> {
        loop {
            let before = self.take_spacing();

            if self.pos >= self.src.len() {
                if let Some(open) = opened_at {
                    return Err(ParseError::UnclosedBlock(open));
                }
                self.sheet.node_mut(parent).raws.after = before;
                return Ok(());
            }

            let rest = &self.src[self.pos..];
            if rest.starts_with('}') {
                if opened_at.is_none() {
                    return Err(ParseError::UnexpectedClose(self.pos));
                }
                self.pos += 1;
                self.sheet.node_mut(parent).raws.after = before;
                return Ok(());
            }

            if rest.starts_with("/*") {
                self.comment(parent, before)?;
            } else {
                self.statement(parent, before)?;
            }
        }
    }

    /// Consume whitespace and stray semicolons.
    fn take_spacing(&mut self) -> String {
        let rest = &self.src[self.pos..];
        let len = rest
            .find(|c: char| !c.is_whitespace() && c != ';')
            .unwrap_or(rest.len());
        self.pos += len;
        rest[..len].to_owned()
    }

    fn comment(&mut self, parent: NodeId, before: String) -> Result<(), ParseError> {
        let start = self.pos;
        let end = self.src[start + 2..]
            .find("*/")
            .ok_or(ParseError::UnterminatedComment(start))?;
        let text = self.src[start + 2..start + 2 + end].to_owned();
        self.pos = start + 2 + end + 2;

        self.sheet.append(
            parent,
            NodeData::Comment(Comment { text }),
            Raws {
                before,
                ..Raws::default()
            },
        );
        Ok(())
    }

    fn statement(&mut self, parent: NodeId, before: String) -> Result<(), ParseError> {
        let src = self.src;
        let start = self.pos;
        let stop = self.statement_end(start)?;
        let header = &src[start..stop];
        let terminator = src.as_bytes().get(stop).copied();
        self.pos = stop;

        if header.starts_with('@') {
            self.at_rule(parent, before, header, terminator)
        } else if terminator == Some(b'{') {
            self.rule(parent, before, header)
        } else {
            self.declaration(parent, before, header, start, terminator)
        }
    }

    /// Find the byte offset of the `{`, `;` or `}` that ends the statement
    /// starting at `from`, skipping strings, comments and parentheses.
    fn statement_end(&self, from: usize) -> Result<usize, ParseError> {
        let bytes = self.src.as_bytes();
        let mut depth = 0usize;
        let mut i = from;

        while i < bytes.len() {
            match bytes[i] {
                quote @ (b'"' | b'\'') => {
                    let open = i;
                    i += 1;
                    loop {
                        match bytes.get(i) {
                            None => return Err(ParseError::UnterminatedString(open)),
                            Some(b'\\') => i += 2,
                            Some(&c) if c == quote => break,
                            Some(_) => i += 1,
                        }
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let end = self.src[i + 2..]
                        .find("*/")
                        .ok_or(ParseError::UnterminatedComment(i))?;
                    i += 2 + end + 1;
                }
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b'{' | b';' | b'}' if depth == 0 => return Ok(i),
                _ => {}
            }
            i += 1;
        }

        Ok(bytes.len())
    }

    fn rule(&mut self, parent: NodeId, before: String, header: &str) -> Result<(), ParseError> {
        let selector = header.trim_end();
        let between = &header[selector.len()..];
        let open = self.pos;
        self.pos += 1;

        let id = self.sheet.append(
            parent,
            NodeData::Rule(Rule {
                selector: selector.to_owned(),
            }),
            Raws {
                before,
                between: between.to_owned(),
                ..Raws::default()
            },
        );
        self.block(id, Some(open))
    }

    fn at_rule(
        &mut self,
        parent: NodeId,
        before: String,
        header: &str,
        terminator: Option<u8>,
    ) -> Result<(), ParseError> {
        let body = &header[1..];
        let name_len = body
            .find(|c: char| c.is_whitespace() || c == '(' || c == '"' || c == '\'')
            .unwrap_or(body.len());
        let name = &body[..name_len];
        let rest = &body[name_len..];
        let params_with_between = rest.trim_start();
        let after_name = &rest[..rest.len() - params_with_between.len()];
        let params = params_with_between.trim_end();
        let between = &params_with_between[params.len()..];

        let mut raws = Raws {
            before,
            between: between.to_owned(),
            after_name: after_name.to_owned(),
            ..Raws::default()
        };
        let has_block = terminator == Some(b'{');
        if terminator == Some(b';') {
            raws.semicolon = true;
            self.pos += 1;
        }

        let open = self.pos;
        let id = self.sheet.append(
            parent,
            NodeData::AtRule(AtRule {
                name: name.to_owned(),
                params: params.to_owned(),
                has_block,
            }),
            raws,
        );

        if has_block {
            self.pos += 1;
            self.block(id, Some(open))?;
        }
        Ok(())
    }

    fn declaration(
        &mut self,
        parent: NodeId,
        before: String,
        header: &str,
        start: usize,
        terminator: Option<u8>,
    ) -> Result<(), ParseError> {
        let colon = header.find(':').ok_or(ParseError::MissingColon(start))?;
        let property = header[..colon].trim_end();

        let after_colon = &header[colon + 1..];
        let body = after_colon.trim_start();
        let between = &header[property.len()..header.len() - body.len()];

        let trimmed = body.trim_end();
        let after = &body[trimmed.len()..];
        let (value, important) = split_important(trimmed);

        let mut decl = Declaration {
            property: property.to_owned(),
            between: between.to_owned(),
            value: String::new(),
            raw_value: None,
            important: important.map(str::to_owned),
        };
        decl.set_raw_value(value);

        let mut raws = Raws {
            before,
            after: after.to_owned(),
            ..Raws::default()
        };
        if terminator == Some(b';') {
            raws.semicolon = true;
            self.pos += 1;
        }

        self.sheet.append(parent, NodeData::Declaration(decl), raws);
        Ok(())
    }
}

/// Split a trimmed declaration body into value and importance marker.
///
/// The marker keeps its leading whitespace so it can be re-emitted verbatim.
fn split_important(body: &str) -> (&str, Option<&str>) {
    let Some(bang) = last_bang(body) else {
        return (body, None);
    };
    let marker = body[bang + 1..].trim_start();
    let is_important = marker
        .get(.."important".len())
        .is_some_and(|word| word.eq_ignore_ascii_case("important"));
    if !is_important {
        return (body, None);
    }
    let value = body[..bang].trim_end();
    (value, Some(&body[value.len()..]))
}

/// Byte offset of the last `!` outside comments.
fn last_bang(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut last = None;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => match text[i + 2..].find("*/") {
                Some(end) => i += 2 + end + 2,
                None => break,
            },
            b'!' => {
                last = Some(i);
                i += 1;
            }
            _ => i += 1,
        }
    }

    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;
    use pretty_assertions::assert_eq;

    fn round_trip(css: &str) {
        let sheet = parse(css).unwrap();
        assert_eq!(sheet.to_css(), css);
    }

    #[test]
    fn test_round_trip_simple_rule() {
        round_trip(".a { float: left; }\n");
    }

    #[test]
    fn test_round_trip_without_trailing_semicolon() {
        round_trip(".a{color:red;left:0}");
    }

    #[test]
    fn test_round_trip_comments_and_at_rules() {
        round_trip(
            "@charset \"utf-8\";\n/* header */\n@media (min-width: 10px) {\n  .a { margin: 1px 2px 3px 4px !important; }\n}\n@font-face {\n  font-family: x;\n}\n",
        );
    }

    #[test]
    fn test_round_trip_value_with_comment() {
        round_trip(".a {\n  left: 10px /*rtl:20px*/ ;\n  content: \"a;b{c}\";\n}\n");
    }

    #[test]
    fn test_round_trip_stray_semicolons() {
        round_trip(".a { color: red;; };\n");
    }

    #[test]
    fn test_declaration_fields() {
        let sheet = parse(".a { left : 10px /* x */ !important; }").unwrap();
        let rule = sheet.children(sheet.root())[0];
        let decl = sheet.declaration(sheet.children(rule)[0]).unwrap();

        assert_eq!(decl.property, "left");
        assert_eq!(decl.between, " : ");
        assert_eq!(decl.value, "10px");
        assert_eq!(decl.raw_value.as_deref(), Some("10px /* x */"));
        assert_eq!(decl.important.as_deref(), Some(" !important"));
    }

    #[test]
    fn test_important_before_preserved_comment() {
        let css = ".a { left: 1px !important /*!rtl:ignore*/; }";
        let sheet = parse(css).unwrap();
        let rule = sheet.children(sheet.root())[0];
        let decl = sheet.declaration(sheet.children(rule)[0]).unwrap();

        assert_eq!(decl.value_text(), "1px");
        assert_eq!(decl.important.as_deref(), Some(" !important /*!rtl:ignore*/"));
        assert_eq!(sheet.to_css(), css);
    }

    #[test]
    fn test_at_rule_fields() {
        let sheet = parse("@import url(left.css) ;").unwrap();
        let node = sheet.children(sheet.root())[0];
        let at_rule = sheet.at_rule(node).unwrap();

        assert_eq!(at_rule.name, "import");
        assert_eq!(at_rule.params, "url(left.css)");
        assert!(!at_rule.has_block);
        assert_eq!(sheet.node(node).raws.between, " ");
        assert!(sheet.node(node).raws.semicolon);
    }

    #[test]
    fn test_nested_rules() {
        let sheet = parse(".a { .b { left: 0 } }").unwrap();
        let a = sheet.children(sheet.root())[0];
        let b = sheet.children(a)[0];

        assert_eq!(sheet.kind(b), NodeKind::Rule);
        assert_eq!(sheet.kind(sheet.children(b)[0]), NodeKind::Declaration);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse(".a { left: 0").unwrap_err(),
            ParseError::UnclosedBlock(3)
        );
        assert_eq!(parse("/* open").unwrap_err(), ParseError::UnterminatedComment(0));
        assert_eq!(parse("}").unwrap_err(), ParseError::UnexpectedClose(0));
        assert_eq!(parse("oops;").unwrap_err(), ParseError::MissingColon(0));
        assert_eq!(
            parse(".a { content: \"x }").unwrap_err(),
            ParseError::UnterminatedString(14)
        );
    }

    #[test]
    fn test_split_important() {
        assert_eq!(split_important("red"), ("red", None));
        assert_eq!(split_important("red !IMPORTANT"), ("red", Some(" !IMPORTANT")));
        assert_eq!(split_important("a!b"), ("a!b", None));
        assert_eq!(
            split_important("1px !important /*!rtl:ignore*/"),
            ("1px", Some(" !important /*!rtl:ignore*/"))
        );
        assert_eq!(split_important("1px /*!note*/"), ("1px /*!note*/", None));
    }
}
