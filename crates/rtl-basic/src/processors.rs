//! Property/value flip rules.

use std::sync::LazyLock;

use rtl_core::{Context, Flip, Processor, Swap, SwapOptions};

fn swap(first: &str, second: &str) -> Swap {
    Swap::new(first, second, SwapOptions::default()).expect("invalid keyword swap")
}

static LEFT_RIGHT: LazyLock<Swap> = LazyLock::new(|| swap("left", "right"));

static LTR_RTL: LazyLock<Swap> = LazyLock::new(|| swap("ltr", "rtl"));

static CURSORS: LazyLock<[Swap; 4]> = LazyLock::new(|| {
    [
        swap("nesw-resize", "nwse-resize"),
        swap("ne-resize", "nw-resize"),
        swap("se-resize", "sw-resize"),
        swap("e-resize", "w-resize"),
    ]
});

/// Whether `token` is a comment placeholder rather than a value.
fn is_placeholder(token: &str) -> bool {
    token.starts_with('\u{E000}') && token.ends_with('\u{E001}')
}

/// Byte ranges of the whitespace-separated values in `text`, ignoring
/// whitespace inside parentheses and comment placeholders.
fn value_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (index, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if ch.is_whitespace() && depth == 0 {
            if let Some(begin) = start.take() {
                spans.push((begin, index));
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        spans.push((begin, text.len()));
    }

    spans.retain(|&(begin, end)| !is_placeholder(&text[begin..end]));
    spans
}

/// Rebuild `text` with the values at `spans` replaced by `values`.
///
/// Text between the first and the last span is taken from the original
/// only when the number of values is unchanged.
fn replace_spans(text: &str, spans: &[(usize, usize)], values: &[&str]) -> String {
    let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
        return text.to_owned();
    };

    if values.len() != spans.len() {
        return format!("{}{}{}", &text[..first.0], values.join(" "), &text[last.1..]);
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (&(begin, end), value) in spans.iter().zip(values) {
        out.push_str(&text[cursor..begin]);
        out.push_str(value);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// `direction: ltr` ↔ `direction: rtl`.
#[derive(Debug, Default)]
pub struct Direction;

impl Processor for Direction {
    fn pattern(&self) -> &str {
        "^direction$"
    }

    fn action(&self, property: &str, value: &str, _ctx: &Context<'_>) -> Flip {
        Flip::new(property, LTR_RTL.apply(value))
    }
}

/// Keyword values: `float`, `clear`, `text-align` and `text-align-last`.
#[derive(Debug, Default)]
pub struct Keyword;

impl Processor for Keyword {
    fn pattern(&self) -> &str {
        "^(?:float|clear|text-align|text-align-last)$"
    }

    fn action(&self, property: &str, value: &str, _ctx: &Context<'_>) -> Flip {
        Flip::new(property, LEFT_RIGHT.apply(value))
    }
}

/// Four-value shorthands written top, right, bottom, left.
#[derive(Debug, Default)]
pub struct FourValue;

impl Processor for FourValue {
    fn pattern(&self) -> &str {
        "^(?:margin|padding|border-width|border-style|border-color|inset|scroll-margin|scroll-padding)$"
    }

    fn action(&self, property: &str, value: &str, _ctx: &Context<'_>) -> Flip {
        let spans = value_spans(value);
        if spans.len() != 4 {
            return Flip::new(property, value);
        }
        let values: Vec<&str> = spans.iter().map(|&(b, e)| &value[b..e]).collect();
        let flipped = [values[0], values[3], values[2], values[1]];
        Flip::new(property, replace_spans(value, &spans, &flipped))
    }
}

/// `border-radius`: reorder corners, separately on each side of `/`.
#[derive(Debug, Default)]
pub struct BorderRadius;

impl BorderRadius {
    fn flip_side(side: &str) -> String {
        let spans = value_spans(side);
        let values: Vec<&str> = spans.iter().map(|&(b, e)| &side[b..e]).collect();
        let flipped: Vec<&str> = match values.as_slice() {
            &[a, b, c, d] => vec![b, a, d, c],
            &[a, b, c] => vec![b, a, b, c],
            &[a, b] => vec![b, a],
            _ => return side.to_owned(),
        };
        replace_spans(side, &spans, &flipped)
    }
}

impl Processor for BorderRadius {
    fn pattern(&self) -> &str {
        "^border-radius$"
    }

    fn action(&self, property: &str, value: &str, _ctx: &Context<'_>) -> Flip {
        let value = value
            .split('/')
            .map(Self::flip_side)
            .collect::<Vec<_>>()
            .join("/");
        Flip::new(property, value)
    }
}

/// `cursor`: east/west resize cursors.
#[derive(Debug, Default)]
pub struct Cursor;

impl Processor for Cursor {
    fn pattern(&self) -> &str {
        "^cursor$"
    }

    fn action(&self, property: &str, value: &str, _ctx: &Context<'_>) -> Flip {
        let value = CURSORS
            .iter()
            .fold(value.to_owned(), |value, swap| swap.apply(&value));
        Flip::new(property, value)
    }
}

/// Properties with a `left` or `right` segment, such as `margin-left` or
/// `border-top-right-radius`, are renamed.
#[derive(Debug, Default)]
pub struct Sided;

impl Processor for Sided {
    fn pattern(&self) -> &str {
        "(?:^|-)(?:left|right)(?:-|$)"
    }

    fn action(&self, property: &str, value: &str, _ctx: &Context<'_>) -> Flip {
        Flip::new(LEFT_RIGHT.apply(property), value)
    }
}
