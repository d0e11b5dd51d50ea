//! Built-in expression evaluator for custom units.
//!
//! Grammar (all values are strings):
//!
//! ```text
//! program := ["return"] expr [";"]
//! expr    := term ("+" term)*
//! term    := string | integer | lookup | call | "(" expr ")"
//! lookup  := ("inputs" | "inputData") ("[" string "]" | "." ident)
//! call    := ident "(" [expr ("," expr)*] ")"
//! ```
//!
//! Strings are JSON double-quoted literals (what substitution produces) or single-quoted
//! with `\\` and `\'` escapes. Functions: `upper`, `lower`, `trim`, `len`, `concat`.

use std::collections::BTreeMap;

use super::{CodeEvaluator, UserCodeError};

/// Deepest allowed nesting of parentheses and call arguments.
const MAX_DEPTH: usize = 128;

/// Evaluator for the small expression language above.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExprEvaluator;

impl CodeEvaluator for ExprEvaluator {
    fn evaluate(
        &self,
        code: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<String, UserCodeError> {
        let tokens = lex(code)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
            inputs,
        };
        parser.program()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Str(String),
    Int(i64),
    Ident(String),
    Plus,
    Comma,
    Dot,
    Semi,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

#[derive(Clone, Debug)]
struct Lexed {
    tok: Tok,
    offset: usize,
}

fn syntax(offset: usize, message: impl Into<String>) -> UserCodeError {
    UserCodeError::Syntax {
        offset,
        message: message.into(),
    }
}

fn lex(code: &str) -> Result<Vec<Lexed>, UserCodeError> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < code.len() {
        let rest = &code[pos..];
        let Some(c) = rest.chars().next() else { break };
        let single = move |tok: Tok| Lexed { tok, offset: pos };
        match c {
            c if c.is_whitespace() => {
                pos += c.len_utf8();
                continue;
            }
            '+' => out.push(single(Tok::Plus)),
            ',' => out.push(single(Tok::Comma)),
            '.' => out.push(single(Tok::Dot)),
            ';' => out.push(single(Tok::Semi)),
            '(' => out.push(single(Tok::LParen)),
            ')' => out.push(single(Tok::RParen)),
            '[' => out.push(single(Tok::LBracket)),
            ']' => out.push(single(Tok::RBracket)),
            '"' => {
                let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<String>();
                let value = match stream.next() {
                    Some(Ok(s)) => s,
                    _ => return Err(syntax(pos, "unterminated string")),
                };
                out.push(Lexed {
                    tok: Tok::Str(value),
                    offset: pos,
                });
                pos += stream.byte_offset();
                continue;
            }
            '\'' => {
                let (value, len) =
                    single_quoted(rest).ok_or_else(|| syntax(pos, "unterminated string"))?;
                out.push(Lexed {
                    tok: Tok::Str(value),
                    offset: pos,
                });
                pos += len;
                continue;
            }
            c if c.is_ascii_digit() => {
                let len = rest.find(|ch: char| !ch.is_ascii_digit()).unwrap_or(rest.len());
                let n = rest[..len]
                    .parse::<i64>()
                    .map_err(|e| syntax(pos, e.to_string()))?;
                out.push(Lexed {
                    tok: Tok::Int(n),
                    offset: pos,
                });
                pos += len;
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                let len = rest
                    .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                    .unwrap_or(rest.len());
                out.push(Lexed {
                    tok: Tok::Ident(rest[..len].to_string()),
                    offset: pos,
                });
                pos += len;
                continue;
            }
            other => return Err(syntax(pos, format!("unexpected character {:?}", other))),
        }
        pos += c.len_utf8();
    }
    Ok(out)
}

/// Parses `'...'` at the start of `s`; returns the value and the consumed byte length.
fn single_quoted(s: &str) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = s.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '\'' => return Some((value, i + 1)),
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
            }
            other => value.push(other),
        }
    }
    None
}

struct Parser<'a> {
    tokens: &'a [Lexed],
    pos: usize,
    depth: usize,
    inputs: &'a BTreeMap<String, String>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Tok> {
        self.tokens.get(self.pos).map(|l| &l.tok)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|l| l.offset).unwrap_or(usize::MAX)
    }

    fn bump(&mut self) -> Option<&'a Tok> {
        let tok = self.tokens.get(self.pos).map(|l| &l.tok);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, want: Tok) -> Result<(), UserCodeError> {
        let offset = self.offset();
        match self.bump() {
            Some(t) if *t == want => Ok(()),
            Some(t) => Err(syntax(offset, format!("expected {:?}, found {:?}", want, t))),
            None => Err(syntax(offset, format!("expected {:?}, found end of input", want))),
        }
    }

    /// Runs `f` one nesting level deeper, failing once past [`MAX_DEPTH`].
    fn nested<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut Self) -> Result<T, UserCodeError>,
    ) -> Result<T, UserCodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(syntax(offset, "nesting too deep"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn program(&mut self) -> Result<String, UserCodeError> {
        if matches!(self.peek(), Some(Tok::Ident(k)) if k == "return") {
            self.pos += 1;
        }
        let value = self.expr()?;
        if self.peek() == Some(&Tok::Semi) {
            self.pos += 1;
        }
        if self.pos < self.tokens.len() {
            return Err(syntax(self.offset(), "unexpected trailing input"));
        }
        Ok(value)
    }

    fn expr(&mut self) -> Result<String, UserCodeError> {
        let mut value = self.term()?;
        while self.peek() == Some(&Tok::Plus) {
            self.pos += 1;
            value.push_str(&self.term()?);
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<String, UserCodeError> {
        let offset = self.offset();
        match self.bump() {
            Some(Tok::Str(s)) => Ok(s.clone()),
            Some(Tok::Int(n)) => Ok(n.to_string()),
            Some(Tok::LParen) => self.nested(offset, |p| {
                let v = p.expr()?;
                p.expect(Tok::RParen)?;
                Ok(v)
            }),
            Some(Tok::Ident(name)) if name == "inputs" || name == "inputData" => self.lookup(),
            Some(Tok::Ident(name)) => self.call(name),
            Some(t) => Err(syntax(offset, format!("unexpected {:?}", t))),
            None => Err(syntax(offset, "unexpected end of input")),
        }
    }

    fn lookup(&mut self) -> Result<String, UserCodeError> {
        let offset = self.offset();
        let key = match self.bump() {
            Some(Tok::LBracket) => {
                let key = match self.bump() {
                    Some(Tok::Str(s)) => s.clone(),
                    _ => return Err(syntax(offset, "expected string key")),
                };
                self.expect(Tok::RBracket)?;
                key
            }
            Some(Tok::Dot) => match self.bump() {
                Some(Tok::Ident(s)) => s.clone(),
                _ => return Err(syntax(offset, "expected input name")),
            },
            _ => return Err(syntax(offset, "expected [ or . after inputs")),
        };
        self.inputs
            .get(&key)
            .cloned()
            .ok_or(UserCodeError::UnknownInput(key))
    }

    fn call(&mut self, name: &str) -> Result<String, UserCodeError> {
        let offset = self.offset();
        self.expect(Tok::LParen)?;
        let args = self.nested(offset, |p| {
            let mut args = Vec::new();
            if p.peek() != Some(&Tok::RParen) {
                args.push(p.expr()?);
                while p.peek() == Some(&Tok::Comma) {
                    p.pos += 1;
                    args.push(p.expr()?);
                }
            }
            Ok(args)
        })?;
        self.expect(Tok::RParen)?;

        let one = |args: &[String]| -> Result<String, UserCodeError> {
            match args {
                [a] => Ok(a.clone()),
                _ => Err(UserCodeError::Runtime(format!(
                    "{} expects 1 argument, got {}",
                    name,
                    args.len()
                ))),
            }
        };
        match name {
            "upper" => Ok(one(&args)?.to_uppercase()),
            "lower" => Ok(one(&args)?.to_lowercase()),
            "trim" => Ok(one(&args)?.trim().to_string()),
            "len" => Ok(one(&args)?.chars().count().to_string()),
            "concat" => Ok(args.concat()),
            other => Err(UserCodeError::UnknownFunction(other.to_string())),
        }
    }
}
