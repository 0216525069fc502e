//! Recursive-descent parser for the script dialect.
//!
//! program   := (statement (NEWLINE statement)*)?
//! statement := IDENT '=' expr | expr
//! expr      := primary ('|>' call)*
//!
//! A pipe chain is kept flat as one [`ExprKind::Pipeline`] so that checking,
//! evaluating and dropping it never recurse per stage.
//! primary   := literal | IDENT | call | '[' exprs ']' | '{' props '}' | '(' expr ')'
//! call      := IDENT '(' props ')'
//! props     := (key ':' expr (',' key ':' expr)* ','?)?

use crate::error::{Error, Result};
use crate::script::lexer::{Position, Token, TokenKind};
use crate::values::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    Ident(String),
    Array(Vec<Expr>),
    Object(Vec<Property>),
    Call {
        callee: String,
        args: Vec<Property>,
    },
    /// `head |> f() |> g()`: each stage receives the previous value through
    /// its callee's pipe parameter.
    Pipeline {
        head: Box<Expr>,
        stages: Vec<Stage>,
    },
}

/// One `|> callee(args)` step of a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub callee: String,
    pub args: Vec<Property>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Expr,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign {
        name: String,
        value: Expr,
        pos: Position,
    },
    Expr(Expr),
}

pub fn parse(tokens: Vec<Token>) -> Result<Vec<Statement>> {
    Parser { tokens, cursor: 0 }.program()
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize always ends with Eof and the cursor never moves past it.
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn peek_nth(&self, n: usize) -> &TokenKind {
        let i = (self.cursor + n).min(self.tokens.len() - 1);
        &self.tokens[i].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.cursor += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        let token = self.advance();
        if token.kind != kind {
            return Err(unexpected(&token, &kind.to_string()));
        }
        Ok(token)
    }

    fn skip_newlines(&mut self) {
        while self.peek().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn program(mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            if self.peek().kind == TokenKind::Eof {
                return Ok(statements);
            }
            statements.push(self.statement()?);
            match self.peek().kind {
                TokenKind::Newline | TokenKind::Eof => {}
                _ => {
                    let token = self.peek().clone();
                    return Err(unexpected(&token, "end of statement"));
                }
            }
        }
    }

    fn statement(&mut self) -> Result<Statement> {
        if let (TokenKind::Ident(name), TokenKind::Assign) = (&self.peek().kind, self.peek_nth(1)) {
            let name = name.clone();
            let pos = self.advance().pos;
            self.advance();
            let value = self.expr()?;
            return Ok(Statement::Assign { name, value, pos });
        }
        Ok(Statement::Expr(self.expr()?))
    }

    fn expr(&mut self) -> Result<Expr> {
        let head = self.primary()?;
        let mut stages = Vec::new();
        loop {
            // A pipe may start the next line.
            let mut lookahead = 0;
            while *self.peek_nth(lookahead) == TokenKind::Newline {
                lookahead += 1;
            }
            if *self.peek_nth(lookahead) != TokenKind::Pipe {
                break;
            }
            self.cursor += lookahead;
            self.advance();

            let token = self.advance();
            let TokenKind::Ident(callee) = token.kind else {
                return Err(unexpected(&token, "function call after '|>'"));
            };
            self.expect(TokenKind::LParen)?;
            let args = self.properties(TokenKind::RParen)?;
            stages.push(Stage {
                callee,
                args,
                pos: token.pos,
            });
        }

        if stages.is_empty() {
            return Ok(head);
        }
        // `(a |> f()) |> g()` continues the inner chain.
        let pos = head.pos;
        let (head, stages) = match head.kind {
            ExprKind::Pipeline {
                head,
                stages: mut inner,
            } => {
                inner.append(&mut stages);
                (head, inner)
            }
            kind => (Box::new(Expr { kind, pos }), stages),
        };
        Ok(Expr {
            kind: ExprKind::Pipeline { head, stages },
            pos,
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        let pos = token.pos;
        let kind = match token.kind {
            TokenKind::Str(s) => ExprKind::String(s),
            TokenKind::Int(n) => ExprKind::Int(n),
            TokenKind::Float(x) => ExprKind::Float(x),
            TokenKind::Bool(b) => ExprKind::Bool(b),
            TokenKind::Duration(d) => ExprKind::Duration(d),
            TokenKind::Ident(name) => {
                if self.peek().kind == TokenKind::LParen {
                    self.advance();
                    let args = self.properties(TokenKind::RParen)?;
                    ExprKind::Call { callee: name, args }
                } else {
                    ExprKind::Ident(name)
                }
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                while self.peek().kind != TokenKind::RBracket {
                    items.push(self.expr()?);
                    if self.peek().kind != TokenKind::Comma {
                        break;
                    }
                    self.advance();
                }
                self.expect(TokenKind::RBracket)?;
                ExprKind::Array(items)
            }
            TokenKind::LBrace => ExprKind::Object(self.properties(TokenKind::RBrace)?),
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(inner);
            }
            _ => return Err(unexpected(&token, "expression")),
        };
        Ok(Expr { kind, pos })
    }

    /// Comma-separated `key: value` pairs up to and including `close`.
    fn properties(&mut self, close: TokenKind) -> Result<Vec<Property>> {
        let mut props = Vec::new();
        while self.peek().kind != close {
            let token = self.advance();
            let key = match token.kind {
                TokenKind::Ident(key) | TokenKind::Str(key) => key,
                _ => return Err(unexpected(&token, "property name")),
            };
            self.expect(TokenKind::Colon)?;
            let value = self.expr()?;
            props.push(Property {
                key,
                value,
                pos: token.pos,
            });
            if self.peek().kind != TokenKind::Comma {
                break;
            }
            self.advance();
        }
        self.expect(close)?;
        Ok(props)
    }
}

fn unexpected(token: &Token, expected: &str) -> Error {
    Error::parse(
        token.pos.line,
        token.pos.column,
        format!("expected {}, got {}", expected, token.kind),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;

    fn parse_str(source: &str) -> Result<Vec<Statement>> {
        parse(tokenize(source)?)
    }

    #[test]
    fn assignment_and_call() {
        let stmts = parse_str("a = from(bucket: \"b\")").unwrap();
        let [Statement::Assign { name, value, .. }] = stmts.as_slice() else {
            panic!("unexpected {stmts:?}");
        };
        assert_eq!(name, "a");
        let ExprKind::Call { callee, args } = &value.kind else {
            panic!("not a call: {value:?}");
        };
        assert_eq!(callee, "from");
        assert_eq!(args[0].key, "bucket");
        assert_eq!(args[0].value.kind, ExprKind::String("b".into()));
    }

    #[test]
    fn pipes_chain_left_to_right_across_lines() {
        let stmts = parse_str("from(bucket: \"b\")\n  |> range(start: -1h)\n  |> count()").unwrap();
        assert_eq!(stmts.len(), 1);
        let Statement::Expr(expr) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Pipeline { head, stages } = &expr.kind else {
            panic!("expected pipeline");
        };
        assert!(matches!(&head.kind, ExprKind::Call { callee, .. } if callee == "from"));
        let callees: Vec<&str> = stages.iter().map(|s| s.callee.as_str()).collect();
        assert_eq!(callees, ["range", "count"]);
        assert_eq!(stages[1].pos, Position { line: 3, column: 6 });
    }

    #[test]
    fn parenthesized_pipeline_stays_flat() {
        let stmts = parse_str("(a |> f()) |> g() |> h()").unwrap();
        let Statement::Expr(expr) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Pipeline { head, stages } = &expr.kind else {
            panic!("expected pipeline");
        };
        assert_eq!(head.kind, ExprKind::Ident("a".into()));
        assert_eq!(stages.len(), 3);
    }

    #[test]
    fn arrays_objects_and_trailing_commas() {
        let stmts = parse_str("x = [{name: \"a\", fn: \"r._value > 0\",}, {name: \"b\"},]").unwrap();
        let Statement::Assign { value, .. } = &stmts[0] else {
            panic!("expected assignment");
        };
        let ExprKind::Array(items) = &value.kind else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0].kind, ExprKind::Object(props) if props.len() == 2));
    }

    #[test]
    fn errors_point_at_the_offending_token() {
        let err = parse_str("a = from(bucket \"b\")").unwrap_err();
        assert_eq!(err.position(), Some((1, 17)));

        let err = parse_str("a = 1 2").unwrap_err();
        assert_eq!(err.position(), Some((1, 7)));

        let err = parse_str("a |> 3").unwrap_err();
        assert!(err.to_string().contains("function call after '|>'"), "{err}");
    }
}
