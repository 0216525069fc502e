//! Tokenizer for the script dialect.

use crate::error::{Error, Result};
use crate::values::Duration;
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Assign,
    Pipe,
    /// Statement separator: a newline or `;` outside any brackets.
    Newline,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier {}", name),
            TokenKind::Str(s) => write!(f, "string {:?}", s),
            TokenKind::Int(n) => write!(f, "integer {}", n),
            TokenKind::Float(x) => write!(f, "float {}", x),
            TokenKind::Bool(b) => write!(f, "{}", b),
            TokenKind::Duration(_) => f.write_str("duration"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBracket => f.write_str("'['"),
            TokenKind::RBracket => f.write_str("']'"),
            TokenKind::LBrace => f.write_str("'{'"),
            TokenKind::RBrace => f.write_str("'}'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Assign => f.write_str("'='"),
            TokenKind::Pipe => f.write_str("'|>'"),
            TokenKind::Newline => f.write_str("end of statement"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
}

// One alternative per token class, tried in order. Durations come before
// numbers so `5m` is not read as `5` followed by `m`.
const TOKEN_RE: &str = r#"\A(?:(?P<ws>[ \t\r]+)|(?P<comment>//[^\n]*)|(?P<newline>[\n;])|(?P<duration>-?(?:[0-9]+(?:ns|us|µs|ms|s|m|h|d|w))+)\b|(?P<float>-?[0-9]+\.[0-9]+)|(?P<int>-?[0-9]+)|(?P<string>"(?:[^"\\]|\\.)*")|(?P<ident>[A-Za-z_][A-Za-z0-9_]*)|(?P<pipe>\|>)|(?P<punct>[()\[\]{}:,=]))"#;

const DURATION_PART_RE: &str = r#"([0-9]+)(ns|us|µs|ms|s|m|h|d|w)"#;

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let re = Regex::new(TOKEN_RE)?;
    let duration_re = Regex::new(DURATION_PART_RE)?;

    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut pos = Position { line: 1, column: 1 };
    let mut depth = 0usize;

    while offset < source.len() {
        let rest = &source[offset..];
        let Some(caps) = re.captures(rest) else {
            let c = rest.chars().next().unwrap_or_default();
            return Err(Error::parse(
                pos.line,
                pos.column,
                format!("unexpected character {:?}", c),
            ));
        };
        let Some(whole) = caps.get(0) else { break };
        let text = whole.as_str();
        let start = pos;

        let kind = if caps.name("ws").is_some() || caps.name("comment").is_some() {
            None
        } else if caps.name("newline").is_some() {
            (depth == 0).then_some(TokenKind::Newline)
        } else if caps.name("duration").is_some() {
            Some(TokenKind::Duration(parse_duration(text, &duration_re).ok_or_else(
                || Error::parse(start.line, start.column, format!("duration {} overflows", text)),
            )?))
        } else if caps.name("float").is_some() {
            let x = text.parse::<f64>().map_err(|e| {
                Error::parse(start.line, start.column, format!("bad float {}: {}", text, e))
            })?;
            Some(TokenKind::Float(x))
        } else if caps.name("int").is_some() {
            let n = text.parse::<i64>().map_err(|e| {
                Error::parse(start.line, start.column, format!("bad integer {}: {}", text, e))
            })?;
            Some(TokenKind::Int(n))
        } else if caps.name("string").is_some() {
            Some(TokenKind::Str(unescape(&text[1..text.len() - 1], start)?))
        } else if caps.name("ident").is_some() {
            Some(match text {
                "true" => TokenKind::Bool(true),
                "false" => TokenKind::Bool(false),
                _ => TokenKind::Ident(text.to_string()),
            })
        } else if caps.name("pipe").is_some() {
            Some(TokenKind::Pipe)
        } else {
            let kind = match text {
                "(" => TokenKind::LParen,
                ")" => TokenKind::RParen,
                "[" => TokenKind::LBracket,
                "]" => TokenKind::RBracket,
                "{" => TokenKind::LBrace,
                "}" => TokenKind::RBrace,
                ":" => TokenKind::Colon,
                "," => TokenKind::Comma,
                _ => TokenKind::Assign,
            };
            match kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            Some(kind)
        };

        if let Some(kind) = kind {
            tokens.push(Token { kind, pos: start });
        }

        for c in text.chars() {
            if c == '\n' {
                pos.line += 1;
                pos.column = 1;
            } else {
                pos.column += 1;
            }
        }
        offset += text.len();
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        pos,
    });
    Ok(tokens)
}

fn parse_duration(text: &str, part_re: &Regex) -> Option<Duration> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(body) => (true, body),
        None => (false, text),
    };
    let mut total: i64 = 0;
    for caps in part_re.captures_iter(body) {
        let magnitude: i64 = caps.get(1)?.as_str().parse().ok()?;
        let unit: i64 = match caps.get(2)?.as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "d" => 86_400 * 1_000_000_000,
            _ => 7 * 86_400 * 1_000_000_000,
        };
        total = total.checked_add(magnitude.checked_mul(unit)?)?;
    }
    Some(Duration::from_nanos(if negative { -total } else { total }))
}

fn unescape(raw: &str, pos: Position) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            other => {
                return Err(Error::parse(
                    pos.line,
                    pos.column,
                    format!("invalid escape sequence \\{}", other.unwrap_or(' ')),
                ));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn call_with_pipe() {
        assert_eq!(
            kinds("a |> range(start: -1h30m, n: 3, x: 1.5)"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Pipe,
                TokenKind::Ident("range".into()),
                TokenKind::LParen,
                TokenKind::Ident("start".into()),
                TokenKind::Colon,
                TokenKind::Duration(Duration::from_nanos(-5_400_000_000_000)),
                TokenKind::Comma,
                TokenKind::Ident("n".into()),
                TokenKind::Colon,
                TokenKind::Int(3),
                TokenKind::Comma,
                TokenKind::Ident("x".into()),
                TokenKind::Colon,
                TokenKind::Float(1.5),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newlines_inside_brackets_are_ignored() {
        assert_eq!(
            kinds("f(\n  a: [1,\n 2]\n) // done\nb = true; c"),
            vec![
                TokenKind::Ident("f".into()),
                TokenKind::LParen,
                TokenKind::Ident("a".into()),
                TokenKind::Colon,
                TokenKind::LBracket,
                TokenKind::Int(1),
                TokenKind::Comma,
                TokenKind::Int(2),
                TokenKind::RBracket,
                TokenKind::RParen,
                TokenKind::Newline,
                TokenKind::Ident("b".into()),
                TokenKind::Assign,
                TokenKind::Bool(true),
                TokenKind::Newline,
                TokenKind::Ident("c".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_and_positions() {
        let tokens = tokenize("x = \"a\\\"b\"\n  y").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Str("a\"b".into()));
        assert_eq!(tokens[4].kind, TokenKind::Ident("y".into()));
        assert_eq!(tokens[4].pos, Position { line: 2, column: 3 });
    }

    #[test]
    fn unexpected_character() {
        let err = tokenize("x = 1\ny = $").unwrap_err();
        assert_eq!(err.position(), Some((2, 5)));
    }
}
