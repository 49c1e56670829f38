//! Recursive-descent parser producing the expression AST.

use super::lexer::{LexError, Token, TokenKind, Tokenizer};

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `name = expr`
    Assign {
        target: String,
        value: Expr,
        line: usize,
    },
    /// `if`/`elif` branches with an optional `else` body
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        orelse: Vec<Stmt>,
    },
    /// `pass`
    Pass,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    In,
    NotIn,
}

/// An expression, tagged with its line where evaluation can fail
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Expr>),
    Name {
        name: String,
        line: usize,
    },
    /// `context.get(key[, default])`
    ContextGet {
        key: Box<Expr>,
        default: Option<Box<Expr>>,
        line: usize,
    },
    /// `context[key]`
    ContextIndex {
        key: Box<Expr>,
        line: usize,
    },
    /// `left + right`
    Add {
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize,
    },
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

/// The name under which the resolution context is visible.
pub const CONTEXT_NAME: &str = "context";

const KEYWORDS: &[&str] =
    &["if", "elif", "else", "pass", "and", "or", "not", "in", "None", "True", "False"];

pub type ParseError = LexError;

/// Parses expression source into statements.
pub fn parse(source: &str) -> Result<Vec<Stmt>, ParseError> {
    let tokens = Tokenizer::tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
    };

    let mut body = Vec::new();
    while !parser.at(&TokenKind::Eof) {
        body.push(parser.statement()?);
    }
    Ok(body)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The tokenizer always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn line(&self) -> usize {
        self.peek().line
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Name(n) if n == keyword)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError {
            line: self.line(),
            message: message.into(),
        })
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            self.error(format!("expected {kind}, found {}", self.peek().kind))
        }
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if matches!(self.peek().kind, TokenKind::Op(o) if o == op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.eat_keyword("if") {
            return self.if_statement();
        }
        if self.at_keyword("elif") || self.at_keyword("else") {
            return self.error(format!("{} without a matching 'if'", self.peek().kind));
        }
        let stmt = self.simple_statement()?;
        self.expect(&TokenKind::Newline)?;
        Ok(stmt)
    }

    fn simple_statement(&mut self) -> Result<Stmt, ParseError> {
        if self.eat_keyword("pass") {
            return Ok(Stmt::Pass);
        }

        let token = self.advance();
        let TokenKind::Name(target) = token.kind else {
            return Err(ParseError {
                line: token.line,
                message: format!("expected a statement, found {}", token.kind),
            });
        };
        if KEYWORDS.contains(&target.as_str()) {
            return Err(ParseError {
                line: token.line,
                message: format!("unexpected keyword '{target}'"),
            });
        }
        if target == CONTEXT_NAME {
            return Err(ParseError {
                line: token.line,
                message: format!("'{CONTEXT_NAME}' is read-only"),
            });
        }
        if !self.eat_op("=") {
            return self.error(format!("expected '=' after '{target}'"));
        }

        let value = self.expression()?;
        Ok(Stmt::Assign {
            target,
            value,
            line: token.line,
        })
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        let mut branches = Vec::new();
        let condition = self.expression()?;
        branches.push((condition, self.block()?));

        let mut orelse = Vec::new();
        loop {
            if self.eat_keyword("elif") {
                let condition = self.expression()?;
                branches.push((condition, self.block()?));
            } else if self.eat_keyword("else") {
                orelse = self.block()?;
                break;
            } else {
                break;
            }
        }

        Ok(Stmt::If {
            branches,
            orelse,
        })
    }

    /// `: NEWLINE INDENT stmt+ DEDENT`, or `: simple_stmt NEWLINE` on one line.
    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if !self.eat_op(":") {
            return self.error("expected ':'");
        }

        if !self.at(&TokenKind::Newline) {
            let stmt = self.simple_statement()?;
            self.expect(&TokenKind::Newline)?;
            return Ok(vec![stmt]);
        }

        self.expect(&TokenKind::Newline)?;
        if !self.at(&TokenKind::Indent) {
            return self.error("expected an indented block");
        }
        self.advance();

        let mut body = Vec::new();
        while !self.at(&TokenKind::Dedent) && !self.at(&TokenKind::Eof) {
            body.push(self.statement()?);
        }
        if self.at(&TokenKind::Dedent) {
            self.advance();
        }
        Ok(body)
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        while self.eat_keyword("or") {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.not_expr()?;
        while self.eat_keyword("and") {
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.eat_keyword("not") {
            return Ok(Expr::Not(Box::new(self.not_expr()?)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.sum()?;
        let line = self.line();

        let op = if self.eat_op("==") {
            CompareOp::Eq
        } else if self.eat_op("!=") {
            CompareOp::NotEq
        } else if self.eat_keyword("in") {
            CompareOp::In
        } else if self.at_keyword("not") {
            self.advance();
            if !self.eat_keyword("in") {
                return self.error("expected 'in' after 'not'");
            }
            CompareOp::NotIn
        } else {
            return Ok(left);
        };

        let right = self.sum()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
            line,
        })
    }

    fn sum(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.primary()?;
        loop {
            let line = self.line();
            if !self.eat_op("+") {
                return Ok(left);
            }
            let right = self.primary()?;
            left = Expr::Add {
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        let line = token.line;
        match token.kind {
            TokenKind::Str(s) => Ok(Expr::Str(s)),
            TokenKind::Int(i) => Ok(Expr::Int(i)),
            TokenKind::Op("(") => {
                let inner = self.expression()?;
                self.expect(&TokenKind::Op(")"))?;
                Ok(inner)
            }
            TokenKind::Op("[") => {
                let mut items = Vec::new();
                while !self.eat_op("]") {
                    items.push(self.expression()?);
                    if !self.eat_op(",") {
                        self.expect(&TokenKind::Op("]"))?;
                        break;
                    }
                }
                Ok(Expr::List(items))
            }
            TokenKind::Name(name) => match name.as_str() {
                "None" => Ok(Expr::None),
                "True" => Ok(Expr::Bool(true)),
                "False" => Ok(Expr::Bool(false)),
                CONTEXT_NAME => self.context_access(line),
                n if KEYWORDS.contains(&n) => Err(ParseError {
                    line,
                    message: format!("unexpected keyword '{n}'"),
                }),
                _ => Ok(Expr::Name {
                    name,
                    line,
                }),
            },
            other => Err(ParseError {
                line,
                message: format!("unexpected {other}"),
            }),
        }
    }

    /// `context.get(...)`, `context[...]`, or bare `context` for membership tests.
    fn context_access(&mut self, line: usize) -> Result<Expr, ParseError> {
        if self.eat_op("[") {
            let key = self.expression()?;
            self.expect(&TokenKind::Op("]"))?;
            return Ok(Expr::ContextIndex {
                key: Box::new(key),
                line,
            });
        }

        if self.eat_op(".") {
            let method = self.advance();
            if method.kind != TokenKind::Name("get".to_string()) {
                return Err(ParseError {
                    line: method.line,
                    message: format!(
                        "unsupported attribute {} of '{CONTEXT_NAME}', only get() is available",
                        method.kind
                    ),
                });
            }
            self.expect(&TokenKind::Op("("))?;
            let key = self.expression()?;
            let default =
                if self.eat_op(",") { Some(Box::new(self.expression()?)) } else { None };
            self.expect(&TokenKind::Op(")"))?;
            return Ok(Expr::ContextGet {
                key: Box::new(key),
                default,
                line,
            });
        }

        Ok(Expr::Name {
            name: CONTEXT_NAME.to_string(),
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_if_else() {
        let body = parse("if context.get('mediaType') == '2drenders':\n\ttemplate = 'a'\nelse:\n\ttemplate = 'b'").unwrap();
        assert_eq!(body.len(), 1);
        let Stmt::If {
            branches,
            orelse,
        } = &body[0]
        else {
            panic!("expected if statement");
        };
        assert_eq!(branches.len(), 1);
        assert_eq!(orelse.len(), 1);
        assert!(matches!(branches[0].0, Expr::Compare { op: CompareOp::Eq, .. }));
    }

    #[test]
    fn test_parse_elif_chain_and_inline_block() {
        let body = parse("if a: x = 1\nelif b:\n    x = 2\nelif not c: pass\nelse: x = 3").unwrap();
        let Stmt::If {
            branches,
            orelse,
        } = &body[0]
        else {
            panic!("expected if statement");
        };
        assert_eq!(branches.len(), 3);
        assert_eq!(orelse, &vec![Stmt::Assign {
            target: "x".into(),
            value: Expr::Int(3),
            line: 5
        }]);
    }

    #[test]
    fn test_parse_not_in_and_precedence() {
        let body = parse("x = 'a' not in context or True and not False").unwrap();
        let Stmt::Assign {
            value,
            ..
        } = &body[0]
        else {
            panic!("expected assignment");
        };
        assert!(matches!(value, Expr::Or(left, _) if matches!(**left, Expr::Compare { op: CompareOp::NotIn, .. })));
    }

    #[test]
    fn test_parse_list_with_trailing_comma() {
        let body = parse("template = ['@a@', '@b@',]").unwrap();
        let Stmt::Assign {
            value: Expr::List(items),
            ..
        } = &body[0]
        else {
            panic!("expected list assignment");
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_parse_errors() {
        let err = parse("x = 1\nelse:\n  x = 2").unwrap_err();
        assert_eq!(err.line, 2);

        let err = parse("if a\n  x = 1").unwrap_err();
        assert!(err.message.contains("':'"));

        let err = parse("context = 'x'").unwrap_err();
        assert!(err.message.contains("read-only"));

        let err = parse("x = context.keys()").unwrap_err();
        assert!(err.message.contains("get()"));

        let err = parse("if a:\nx = 1").unwrap_err();
        assert!(err.message.contains("indented block"));

        assert!(parse("import os").is_err());
    }
}
