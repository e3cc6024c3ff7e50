//! Expression language shared by rate laws, event triggers and event assignments.
//!
//! Expressions are stored in documents as their canonical infix text and parsed
//! back on load, so a persisted document reads like `ka * AGut` rather than a
//! serialized syntax tree.
//!
//! Booleans are numeric: comparisons and logical operators yield `1.0` or `0.0`
//! and any non-zero value is truthy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Identifier bound to the current simulation time.
pub const TIME_SYMBOL: &str = "time";

/// Relative tolerance used by `==` and `!=`.
const EQ_TOLERANCE: f64 = 1e-9;

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
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }

    const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Div | Self::Rem => 5,
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Or => bool_value(truthy(lhs) || truthy(rhs)),
            Self::And => bool_value(truthy(lhs) && truthy(rhs)),
            Self::Eq => bool_value(approx_eq(lhs, rhs)),
            Self::Ne => bool_value(!approx_eq(lhs, rhs)),
            Self::Lt => bool_value(lhs < rhs),
            Self::Le => bool_value(lhs <= rhs || approx_eq(lhs, rhs)),
            Self::Gt => bool_value(lhs > rhs),
            Self::Ge => bool_value(lhs >= rhs || approx_eq(lhs, rhs)),
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::Rem => lhs % rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Expr {
    Number(f64),
    Symbol(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parse an infix expression.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Expression` when the input is empty, contains an
    /// unexpected character, or is not a single well-formed expression.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            input,
            tokens,
            pos: 0,
        };
        let expr = parser.parse_binary(1)?;
        if let Some(token) = parser.tokens.get(parser.pos) {
            return Err(parser.error(format!("unexpected trailing token {token:?}")));
        }
        Ok(expr)
    }

    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
        Self::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Every identifier referenced by the expression, in first-use order.
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Number(_) => {}
            Self::Symbol(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Self::Unary(_, operand) => operand.collect_symbols(out),
            Self::Binary(_, lhs, rhs) => {
                lhs.collect_symbols(out);
                rhs.collect_symbols(out);
            }
        }
    }

    /// Evaluate against a symbol lookup.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownSymbol` for identifiers the lookup cannot resolve.
    pub fn eval<F>(&self, lookup: &F) -> Result<f64, CoreError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Symbol(name) => {
                lookup(name.as_str()).ok_or_else(|| CoreError::UnknownSymbol(name.clone()))
            }
            Self::Unary(UnaryOp::Neg, operand) => Ok(-operand.eval(lookup)?),
            Self::Unary(UnaryOp::Not, operand) => Ok(bool_value(!truthy(operand.eval(lookup)?))),
            Self::Binary(op, lhs, rhs) => Ok(op.apply(lhs.eval(lookup)?, rhs.eval(lookup)?)),
        }
    }

    /// Evaluate as a boolean condition.
    ///
    /// # Errors
    ///
    /// Same as [`Expr::eval`].
    pub fn holds<F>(&self, lookup: &F) -> Result<bool, CoreError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        self.eval(lookup).map(truthy)
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Binary(op, _, _) => op.precedence(),
            Self::Unary(..) => 6,
            Self::Number(value) if value.is_sign_negative() => 6,
            Self::Number(_) | Self::Symbol(_) => 7,
        }
    }
}

fn truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

const fn bool_value(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

fn approx_eq(lhs: f64, rhs: f64) -> bool {
    (lhs - rhs).abs() <= EQ_TOLERANCE * lhs.abs().max(rhs.abs()).max(1.0)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Symbol(name) => f.write_str(name),
            Self::Unary(op, operand) => {
                let sign = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                };
                if operand.precedence() < 6 {
                    write!(f, "{sign}({operand})")
                } else {
                    write!(f, "{sign}{operand}")
                }
            }
            Self::Binary(op, lhs, rhs) => {
                let prec = op.precedence();
                if lhs.precedence() < prec {
                    write!(f, "({lhs})")?;
                } else {
                    write!(f, "{lhs}")?;
                }
                write!(f, " {} ", op.symbol())?;
                // Left associative: an equal-precedence right operand needs parentheses.
                if rhs.precedence() <= prec {
                    write!(f, "({rhs})")
                } else {
                    write!(f, "{rhs}")
                }
            }
        }
    }
}

impl From<Expr> for String {
    fn from(expr: Expr) -> Self {
        expr.to_string()
    }
}

impl TryFrom<String> for Expr {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl std::str::FromStr for Expr {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
}

const OPERATORS: [&str; 15] = [
    "||", "&&", "==", "!=", "<=", ">=", "<", ">", "+", "-", "*", "/", "%", "!", "^",
];

fn tokenize(input: &str) -> Result<Vec<Token>, CoreError> {
    let err = |message: String| CoreError::Expression {
        input: input.to_string(),
        message,
    };

    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || (c == '.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
                let mut j = i + 1;
                if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j].is_ascii_digit() {
                    i = j;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let text = &input[start..i];
            let value = text
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| err(format!("invalid number '{text}'")))?;
            tokens.push(Token::Number(value));
        } else if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token::Ident(input[start..i].to_string()));
        } else if c == '(' {
            tokens.push(Token::LParen);
            i += 1;
        } else if c == ')' {
            tokens.push(Token::RParen);
            i += 1;
        } else if let Some(op) = OPERATORS
            .iter()
            .find(|op| input[i..].starts_with(**op))
        {
            if *op == "^" {
                return Err(err("'^' is not supported".to_string()));
            }
            tokens.push(Token::Op(op));
            i += op.len();
        } else {
            return Err(err(format!("unexpected character '{c}' at offset {i}")));
        }
    }

    if tokens.is_empty() {
        return Err(err("empty expression".to_string()));
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: String) -> CoreError {
        CoreError::Expression {
            input: self.input.to_string(),
            message,
        }
    }

    fn peek_binary(&self) -> Option<BinaryOp> {
        let Some(Token::Op(op)) = self.tokens.get(self.pos) else {
            return None;
        };
        let op = match *op {
            "||" => BinaryOp::Or,
            "&&" => BinaryOp::And,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            _ => return None,
        };
        Some(op)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, CoreError> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.peek_binary() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            let rhs = self.parse_binary(prec + 1)?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, CoreError> {
        match self.tokens.get(self.pos) {
            Some(Token::Op("-")) => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(match operand {
                    Expr::Number(value) => Expr::Number(-value),
                    other => Expr::Unary(UnaryOp::Neg, Box::new(other)),
                })
            }
            Some(Token::Op("!")) => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, CoreError> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        match token {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) => Ok(Expr::Symbol(name)),
            Some(Token::LParen) => {
                let inner = self.parse_binary(1)?;
                match self.tokens.get(self.pos) {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(self.error("missing closing ')'".to_string())),
                }
            }
            Some(other) => Err(self.error(format!("unexpected token {other:?}"))),
            None => Err(self.error("unexpected end of expression".to_string())),
        }
    }
}
