//! Pratt parser for condition and expression text.

use super::lexer::{tokenize, Token};
use crate::error::RuntimeError;
use crate::value::Value;
use smol_str::SmolStr;

/// Binding power of an infix operator as a (left, right) pair.
///
/// `left < right` makes the operator left-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingPower {
    pub left: u8,
    pub right: u8,
}

impl BindingPower {
    #[inline]
    pub const fn left(power: u8) -> Self {
        Self {
            left: power,
            right: power + 1,
        }
    }
}

/// Precedence levels. Higher numbers bind tighter.
pub mod prec {
    use super::BindingPower;

    pub const OR: BindingPower = BindingPower::left(2);
    pub const AND: BindingPower = BindingPower::left(4);
    /// `==`, `!=`
    pub const EQUALITY: BindingPower = BindingPower::left(6);
    /// `<`, `<=`, `>`, `>=`
    pub const RELATIONAL: BindingPower = BindingPower::left(8);
    pub const ADDITIVE: BindingPower = BindingPower::left(10);
    pub const MULTIPLICATIVE: BindingPower = BindingPower::left(12);
    /// Right binding power of `not`: its operand takes comparisons but not `and`.
    pub const NOT_WORD: u8 = 5;
    /// Right binding power of `!`, unary `-` and unary `+`.
    pub const PREFIX: u8 = 14;
    /// Left binding power of `.field` and `[index]`.
    pub const POSTFIX: u8 = 16;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    fn from_token(token: &Token) -> Option<(Self, BindingPower)> {
        let op = match token {
            Token::Or => (BinaryOp::Or, prec::OR),
            Token::And => (BinaryOp::And, prec::AND),
            Token::EqEq => (BinaryOp::Eq, prec::EQUALITY),
            Token::NotEq => (BinaryOp::Ne, prec::EQUALITY),
            Token::Lt => (BinaryOp::Lt, prec::RELATIONAL),
            Token::LtEq => (BinaryOp::Le, prec::RELATIONAL),
            Token::Gt => (BinaryOp::Gt, prec::RELATIONAL),
            Token::GtEq => (BinaryOp::Ge, prec::RELATIONAL),
            Token::Plus => (BinaryOp::Add, prec::ADDITIVE),
            Token::Minus => (BinaryOp::Sub, prec::ADDITIVE),
            Token::Star => (BinaryOp::Mul, prec::MULTIPLICATIVE),
            Token::Slash => (BinaryOp::Div, prec::MULTIPLICATIVE),
            Token::Percent => (BinaryOp::Rem, prec::MULTIPLICATIVE),
            _ => return None,
        };
        Some(op)
    }

    /// Returns the operator's source spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// A loop-bound name.
    Name(SmolStr),
    /// `[a, b, ...]`
    List(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `target.field`
    Field(Box<Expr>, SmolStr),
    /// `target[index]`
    Index(Box<Expr>, Box<Expr>),
}

/// Parses `text` into an expression tree.
pub fn parse(text: &str) -> Result<Expr, RuntimeError> {
    let tokens = tokenize(text).map_err(|range| {
        syntax(
            text,
            format!("unexpected character `{}`", &text[range.clone()]),
        )
    })?;
    if tokens.is_empty() {
        return Err(syntax(text, "empty expression"));
    }

    let mut parser = Parser {
        source: text,
        tokens: tokens.into_iter().map(|(token, _)| token).collect(),
        pos: 0,
    };
    let expr = parser.expr(0)?;
    if let Some(token) = parser.peek() {
        return Err(syntax(
            text,
            format!("unexpected {} after expression", token.name()),
        ));
    }
    Ok(expr)
}

fn syntax(expression: &str, message: impl Into<String>) -> RuntimeError {
    RuntimeError::Syntax {
        expression: expression.to_string(),
        message: message.into(),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), RuntimeError> {
        if self.eat(expected) {
            return Ok(());
        }
        let found = self.peek().map_or("end of input", Token::name);
        Err(self.error(format!("expected {}, found {found}", expected.name())))
    }

    fn error(&self, message: impl Into<String>) -> RuntimeError {
        syntax(self.source, message)
    }

    fn expr(&mut self, min_bp: u8) -> Result<Expr, RuntimeError> {
        let mut lhs = self.prefix()?;

        loop {
            match self.peek() {
                Some(Token::Dot) if prec::POSTFIX >= min_bp => {
                    self.pos += 1;
                    match self.bump() {
                        Some(Token::Ident(name)) => {
                            lhs = Expr::Field(Box::new(lhs), SmolStr::new(name));
                        }
                        _ => return Err(self.error("expected a field name after '.'")),
                    }
                }
                Some(Token::LBracket) if prec::POSTFIX >= min_bp => {
                    self.pos += 1;
                    let index = self.expr(0)?;
                    self.expect(&Token::RBracket)?;
                    lhs = Expr::Index(Box::new(lhs), Box::new(index));
                }
                Some(token) => {
                    let Some((op, bp)) = BinaryOp::from_token(token) else {
                        break;
                    };
                    if bp.left < min_bp {
                        break;
                    }
                    self.pos += 1;
                    let rhs = self.expr(bp.right)?;
                    lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
                }
                None => break,
            }
        }

        Ok(lhs)
    }

    fn prefix(&mut self) -> Result<Expr, RuntimeError> {
        let Some(token) = self.bump() else {
            return Err(self.error("unexpected end of input"));
        };

        let expr = match token {
            Token::Int(n) => Expr::Literal(Value::Int(n)),
            Token::Float(f) => Expr::Literal(Value::Float(f)),
            Token::Str(s) => Expr::Literal(Value::Str(s)),
            Token::True => Expr::Literal(Value::Bool(true)),
            Token::False => Expr::Literal(Value::Bool(false)),
            Token::Null => Expr::Literal(Value::Null),
            Token::Absent => Expr::Literal(Value::Absent),
            Token::Ident(name) => Expr::Name(SmolStr::new(name)),
            Token::Not => self.unary(UnaryOp::Not)?,
            Token::NotWord => {
                let operand = self.expr(prec::NOT_WORD)?;
                Expr::Unary(UnaryOp::Not, Box::new(operand))
            }
            Token::Minus => self.unary(UnaryOp::Neg)?,
            Token::Plus => self.unary(UnaryOp::Pos)?,
            Token::LParen => {
                let inner = self.expr(0)?;
                self.expect(&Token::RParen)?;
                inner
            }
            Token::LBracket => {
                let mut items = Vec::new();
                while !self.eat(&Token::RBracket) {
                    items.push(self.expr(0)?);
                    if !self.eat(&Token::Comma) {
                        self.expect(&Token::RBracket)?;
                        break;
                    }
                }
                Expr::List(items)
            }
            other => {
                return Err(self.error(format!("unexpected {}", other.name())));
            }
        };
        Ok(expr)
    }

    fn unary(&mut self, op: UnaryOp) -> Result<Expr, RuntimeError> {
        let operand = self.expr(prec::PREFIX)?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }
}
