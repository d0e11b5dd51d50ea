//! Reads the text form of a pipeline program back into a [`Program`].

use std::collections::HashSet;
use std::str::FromStr;

use thiserror::Error;

use crate::graph::NodeId;

use super::program::{Part, Program, Statement};

/// Malformed program text; `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ProgramParseError {
    pub line: usize,
    pub message: String,
}

impl ProgramParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Word(String),
    Str(String),
    Arrow,
    Eq,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
}

fn lex(line: &str) -> Result<Vec<Tok>, String> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < line.len() {
        let rest = &line[pos..];
        let Some(c) = rest.chars().next() else { break };
        let (tok, len) = match c {
            c if c.is_whitespace() => {
                pos += c.len_utf8();
                continue;
            }
            '"' => {
                let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<String>();
                match stream.next() {
                    Some(Ok(s)) => (Tok::Str(s), stream.byte_offset()),
                    Some(Err(e)) => return Err(format!("bad string literal: {}", e)),
                    None => return Err("unterminated string literal".into()),
                }
            }
            '<' if rest.starts_with("<-") => (Tok::Arrow, 2),
            '=' => (Tok::Eq, 1),
            ',' => (Tok::Comma, 1),
            '(' => (Tok::LParen, 1),
            ')' => (Tok::RParen, 1),
            '{' => (Tok::LBrace, 1),
            '}' => (Tok::RBrace, 1),
            c if c.is_ascii_alphabetic() => {
                let len = rest
                    .find(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
                    .unwrap_or(rest.len());
                (Tok::Word(rest[..len].to_string()), len)
            }
            other => return Err(format!("unexpected character {:?}", other)),
        };
        out.push(tok);
        pos += len;
    }
    Ok(out)
}

struct Cursor {
    tokens: Vec<Tok>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn eat(&mut self, want: &Tok) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: Tok) -> Result<(), String> {
        match self.next() {
            Some(t) if t == want => Ok(()),
            Some(t) => Err(format!("expected {:?}, found {:?}", want, t)),
            None => Err(format!("expected {:?} at end of line", want)),
        }
    }

    fn string(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Tok::Str(s)) => Ok(s),
            Some(t) => Err(format!("expected string, found {:?}", t)),
            None => Err("expected string at end of line".into()),
        }
    }

    fn id(&mut self) -> Result<NodeId, String> {
        self.string().map(NodeId::from)
    }

    fn finish(&self) -> Result<(), String> {
        match self.peek() {
            None => Ok(()),
            Some(t) => Err(format!("unexpected {:?}", t)),
        }
    }

    /// `"a", "b", ...` up to the end of the line; may be empty.
    fn id_list(&mut self) -> Result<Vec<NodeId>, String> {
        let mut ids = Vec::new();
        if self.peek().is_none() {
            return Ok(ids);
        }
        ids.push(self.id()?);
        while self.eat(&Tok::Comma) {
            ids.push(self.id()?);
        }
        Ok(ids)
    }

    fn parts(&mut self) -> Result<Vec<Part>, String> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                Some(Tok::Str(_)) => {
                    let text = self.string()?;
                    if !text.is_empty() {
                        parts.push(Part::Text(text));
                    }
                }
                Some(Tok::Word(w)) if w == "ref" || w == "quote" => {
                    let quoted = w == "quote";
                    self.pos += 1;
                    self.expect(Tok::LParen)?;
                    let source = self.id()?;
                    self.expect(Tok::Comma)?;
                    let token = self.string()?;
                    self.expect(Tok::RParen)?;
                    parts.push(if quoted {
                        Part::Quote { source, token }
                    } else {
                        Part::Ref { source, token }
                    });
                }
                _ => return Ok(parts),
            }
        }
    }

    fn bindings(&mut self) -> Result<Vec<(String, NodeId)>, String> {
        let mut inputs = Vec::new();
        if !self.eat(&Tok::Word("with".into())) {
            return Ok(inputs);
        }
        loop {
            let name = self.string()?;
            self.expect(Tok::Eq)?;
            inputs.push((name, self.id()?));
            if !self.eat(&Tok::Comma) {
                return Ok(inputs);
            }
        }
    }
}

fn statement(keyword: &str, c: &mut Cursor) -> Result<Statement, String> {
    let statement = match keyword {
        "input" => {
            let id = c.id()?;
            c.expect(Tok::Word("default".into()))?;
            Statement::Input {
                id,
                default: c.string()?,
            }
        }
        "text" => {
            let id = c.id()?;
            c.expect(Tok::Eq)?;
            Statement::Text {
                id,
                value: c.string()?,
            }
        }
        "join" => {
            let id = c.id()?;
            c.expect(Tok::Arrow)?;
            Statement::Join {
                id,
                sources: c.id_list()?,
            }
        }
        "complete" => {
            let id = c.id()?;
            c.expect(Tok::Arrow)?;
            Statement::Complete {
                id,
                parts: c.parts()?,
            }
        }
        "evaluate" => {
            let id = c.id()?;
            c.expect(Tok::Arrow)?;
            let parts = c.parts()?;
            Statement::Evaluate {
                id,
                parts,
                inputs: c.bindings()?,
            }
        }
        other => return Err(format!("unknown statement: {}", other)),
    };
    c.finish()?;
    Ok(statement)
}

#[derive(PartialEq)]
enum Section {
    Header,
    Body,
    Returned,
    Closed,
}

impl Program {
    /// Parses the text produced by `Program`'s `Display`.
    pub fn parse(text: &str) -> Result<Program, ProgramParseError> {
        let mut program = Program::default();
        let mut defined = HashSet::new();
        let mut section = Section::Header;
        let mut last_line = 0;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            last_line = line_no;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let err = |m: String| ProgramParseError::new(line_no, m);
            let mut c = Cursor {
                tokens: lex(line).map_err(err)?,
                pos: 0,
            };

            match section {
                Section::Header => {
                    c.expect(Tok::Word("pipeline".into())).map_err(err)?;
                    c.expect(Tok::LBrace).map_err(err)?;
                    c.finish().map_err(err)?;
                    section = Section::Body;
                }
                Section::Body | Section::Returned if c.eat(&Tok::RBrace) => {
                    c.finish().map_err(err)?;
                    if section == Section::Body {
                        return Err(err("missing return statement".into()));
                    }
                    section = Section::Closed;
                }
                Section::Body => {
                    let keyword = match c.next() {
                        Some(Tok::Word(w)) => w,
                        other => return Err(err(format!("expected statement, found {:?}", other))),
                    };
                    if keyword == "return" {
                        program.outputs = c.id_list().map_err(err)?;
                        c.finish().map_err(err)?;
                        section = Section::Returned;
                        continue;
                    }
                    let statement = statement(&keyword, &mut c).map_err(err)?;
                    if !defined.insert(statement.id().clone()) {
                        return Err(err(format!("unit {} defined twice", statement.id())));
                    }
                    program.statements.push(statement);
                }
                Section::Returned => return Err(err("statement after return".into())),
                Section::Closed => return Err(err("text after closing brace".into())),
            }
        }

        if section != Section::Closed {
            return Err(ProgramParseError::new(last_line, "unexpected end of program"));
        }
        Ok(program)
    }
}

impl FromStr for Program {
    type Err = ProgramParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::parse(s)
    }
}
