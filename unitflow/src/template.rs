//! Template scanning and variable substitution.
//!
//! A template is split once into literal text and `$identifier` runs. Substitution is a
//! single left-to-right pass over those segments: a run whose token is bound is replaced,
//! any other run is copied verbatim. Replaced text is never rescanned, so the pass is
//! deterministic and `$input_1` can never match inside `$input_10`.

use std::collections::HashMap;

use crate::graph::is_token_char;

/// How a bound value is written into the template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quoting {
    /// Raw text (ai prompts).
    Literal,
    /// JSON string literal, safe to embed as a string constant in code (custom units).
    StringLiteral,
}

impl Quoting {
    pub fn apply(self, value: &str) -> String {
        match self {
            Quoting::Literal => value.to_string(),
            Quoting::StringLiteral => quote(value),
        }
    }
}

/// Double-quoted, escaped string literal for `value`.
pub fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Piece of a scanned template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// `$` plus a maximal identifier run, e.g. `$input_1`.
    Token(&'a str),
}

/// A template split into segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> Template<'a> {
    pub fn parse(text: &'a str) -> Self {
        let mut segments = Vec::new();
        let mut text_start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if c != '$' {
                continue;
            }
            let mut end = i + 1;
            while let Some(&(j, n)) = chars.peek() {
                if !is_token_char(n) {
                    break;
                }
                end = j + n.len_utf8();
                chars.next();
            }
            if end == i + 1 {
                continue;
            }
            if text_start < i {
                segments.push(Segment::Text(&text[text_start..i]));
            }
            segments.push(Segment::Token(&text[i..end]));
            text_start = end;
        }
        if text_start < text.len() {
            segments.push(Segment::Text(&text[text_start..]));
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Renders the template, asking `lookup` for each token; `None` keeps the token.
    pub fn render<F>(&self, mut lookup: F) -> String
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Token(tok) => match lookup(tok) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(tok),
                },
            }
        }
        out
    }
}

/// Replaces every bound token (`$name` → value) in `template`.
pub fn substitute(template: &str, bindings: &HashMap<&str, &str>, quoting: Quoting) -> String {
    Template::parse(template).render(|tok| bindings.get(tok).map(|v| quoting.apply(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn literal_substitution_replaces_all_occurrences() {
        let b = bind(&[("$input_X", "hello")]);
        let out = substitute("Say $input_X loudly, $input_X!", &b, Quoting::Literal);
        assert_eq!(out, "Say hello loudly, hello!");
    }

    /// **Scenario**: Unmatched tokens and lone `$` are left verbatim.
    #[test]
    fn unmatched_tokens_are_untouched() {
        let b = bind(&[("$input_1", "v")]);
        let out = substitute("$input_2 costs $ 5 and $input_1", &b, Quoting::Literal);
        assert_eq!(out, "$input_2 costs $ 5 and v");
    }

    /// **Scenario**: A shorter token never matches a prefix of a longer one.
    #[test]
    fn token_boundaries_are_respected() {
        let b = bind(&[("$input_1", "one")]);
        let out = substitute("$input_10 $input_1.", &b, Quoting::Literal);
        assert_eq!(out, "$input_10 one.");
    }

    #[test]
    fn string_literal_quoting_escapes_value() {
        let b = bind(&[("$input_1", "say \"hi\"\n")]);
        let out = substitute("return $input_1;", &b, Quoting::StringLiteral);
        assert_eq!(out, r#"return "say \"hi\"\n";"#);
    }

    /// **Scenario**: Substituting an already substituted template is a no-op.
    #[test]
    fn substitution_is_idempotent() {
        let b = bind(&[("$ai_1", "answer"), ("$input_1", "q")]);
        let once = substitute("Q: $input_1 A: $ai_1 $other", &b, Quoting::Literal);
        let twice = substitute(&once, &b, Quoting::Literal);
        assert_eq!(once, twice);
    }

    /// **Scenario**: Values containing tokens are not rescanned.
    #[test]
    fn replaced_text_is_not_rescanned() {
        let b = bind(&[("$input_1", "$input_2"), ("$input_2", "boom")]);
        let out = substitute("$input_1", &b, Quoting::Literal);
        assert_eq!(out, "$input_2");
    }

    #[test]
    fn parse_splits_text_and_tokens() {
        let t = Template::parse("a $x_1b-c $");
        assert_eq!(
            t.segments(),
            &[
                Segment::Text("a "),
                Segment::Token("$x_1b"),
                Segment::Text("-c $"),
            ]
        );
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let b = bind(&[("$input_1", "ü")]);
        assert_eq!(substitute("é$input_1ö", &b, Quoting::Literal), "éüö");
        assert_eq!(substitute("é $input_1 ö", &b, Quoting::Literal), "é ü ö");
    }
}
