//! Directive comment syntax.
//!
//! A directive comment starts (after optional whitespace and an optional
//! `!`) with `rtl:` and holds one or more forms separated by whitespace:
//!
//! - `rtl:NAME[:ARG]`: one-shot, begins and ends
//! - `rtl:begin:NAME[:ARG]`: opens a block
//! - `rtl:end:NAME`: closes a block

use std::sync::LazyLock;

use regex::Regex;

const PREFIX: &str = "rtl:";

static FORM_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+rtl:").expect("invalid form separator regex"));

/// One `rtl:` form inside a directive comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirectiveForm {
    pub(crate) name: String,
    pub(crate) argument: String,
    pub(crate) begin: bool,
    pub(crate) end: bool,
}

/// Parsed directive comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirectiveComment {
    /// Written as `/*!rtl:...*/`.
    pub(crate) preserve: bool,
    pub(crate) forms: Vec<DirectiveForm>,
}

/// Parse comment text (without `/*` and `*/`).
///
/// Returns `None` if the comment is not a directive comment.
pub(crate) fn parse_comment(text: &str) -> Option<DirectiveComment> {
    let trimmed = text.trim_start();
    let (preserve, rest) = match trimmed.strip_prefix('!') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let body = rest.strip_prefix(PREFIX)?;

    let forms = FORM_SEPARATOR
        .split(body)
        .filter_map(parse_form)
        .collect();

    Some(DirectiveComment { preserve, forms })
}

fn parse_form(form: &str) -> Option<DirectiveForm> {
    let (begin, end, rest) = if let Some(rest) = form.strip_prefix("begin:") {
        (true, false, rest)
    } else if let Some(rest) = form.strip_prefix("end:") {
        (false, true, rest)
    } else {
        (true, true, form)
    };

    let (name, argument) = match rest.split_once(':') {
        Some((name, argument)) => (name, argument.trim_end()),
        None => (rest.trim_end(), ""),
    };
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(DirectiveForm {
        name: name.to_owned(),
        argument: argument.to_owned(),
        begin,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form(name: &str, argument: &str, begin: bool, end: bool) -> DirectiveForm {
        DirectiveForm {
            name: name.to_owned(),
            argument: argument.to_owned(),
            begin,
            end,
        }
    }

    #[test]
    fn test_not_a_directive() {
        assert_eq!(parse_comment(" plain comment "), None);
        assert_eq!(parse_comment("see rtl:ignore"), None);
    }

    #[test]
    fn test_form_shapes() {
        let parsed = parse_comment("rtl:ignore").unwrap();
        assert!(!parsed.preserve);
        assert_eq!(parsed.forms, vec![form("ignore", "", true, true)]);

        let parsed = parse_comment(" rtl:begin:ignore ").unwrap();
        assert_eq!(parsed.forms, vec![form("ignore", "", true, false)]);

        let parsed = parse_comment("rtl:end:ignore").unwrap();
        assert_eq!(parsed.forms, vec![form("ignore", "", false, true)]);
    }

    #[test]
    fn test_argument_keeps_inner_colons() {
        let parsed = parse_comment(r#"rtl:options:{"autoRename":true}"#).unwrap();
        assert_eq!(
            parsed.forms,
            vec![form("options", r#"{"autoRename":true}"#, true, true)]
        );

        let parsed = parse_comment("rtl:raw:\n.x { left: 0 }\n").unwrap();
        assert_eq!(parsed.forms, vec![form("raw", "\n.x { left: 0 }", true, true)]);
    }

    #[test]
    fn test_preserve_marker() {
        let parsed = parse_comment("! rtl:begin:rename").unwrap();
        assert!(parsed.preserve);
        assert_eq!(parsed.forms, vec![form("rename", "", true, false)]);
    }

    #[test]
    fn test_chained_forms() {
        let parsed = parse_comment("rtl:end:ignore rtl:begin:rename\n  rtl:remove").unwrap();
        assert_eq!(
            parsed.forms,
            vec![
                form("ignore", "", false, true),
                form("rename", "", true, false),
                form("remove", "", true, true),
            ]
        );
    }

    #[test]
    fn test_empty_form_is_skipped() {
        let parsed = parse_comment("rtl:").unwrap();
        assert!(parsed.forms.is_empty());
    }
}
