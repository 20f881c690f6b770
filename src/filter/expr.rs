//! Boolean expression language for trace filtering.
//!
//! A small recursive-descent parser and evaluator over numeric variables.
//! The language covers what users actually type into the filter field:
//! arithmetic, comparisons (with Python-style chaining, `0 < mean < 5`),
//! and boolean connectives in both spellings (`and`/`&&`, `or`/`||`,
//! `not`/`!`).
//!
//! Precedence, loosest to tightest: `or`, `and`, `not`, comparisons,
//! `+ -`, `* /`, unary minus.

use anyhow::{Result, bail};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Not,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Eq);
                    i += 2;
                } else {
                    bail!("single '=' is not a comparison, use '=='");
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else {
                    tokens.push(Token::Not);
                    i += 1;
                }
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::And);
                    i += 2;
                } else {
                    bail!("single '&' is not an operator, use '&&' or 'and'");
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::Or);
                    i += 2;
                } else {
                    bail!("single '|' is not an operator, use '||' or 'or'");
                }
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // optional exponent: 1e3, 2.5E-2
                if i < chars.len()
                    && (chars[i] == 'e' || chars[i] == 'E')
                    && chars
                        .get(i + 1)
                        .is_some_and(|&c| c.is_ascii_digit() || c == '+' || c == '-')
                {
                    i += 2;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value: f64 = text
                    .parse()
                    .map_err(|_| anyhow::anyhow!("'{text}' is not a valid number"))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Ident(word),
                });
            }
            other => bail!("unexpected character '{other}'"),
        }
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Chained comparison: `first op1 e1 op2 e2 ...` is true when every
    /// adjacent pair compares true (Python semantics)
    Comparison {
        first: Box<Expr>,
        rest: Vec<(CompareOp, Expr)>,
    },
}

/// Result of evaluating a (sub)expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
}

impl Value {
    fn as_number(&self) -> Result<f64> {
        match self {
            Self::Number(v) => Ok(*v),
            Self::Bool(_) => bail!("expected a number, found a boolean"),
        }
    }

    fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            Self::Number(_) => bail!("expected a boolean, found a number"),
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut expr = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            expr = Expr::Binary(BinaryOp::Or, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut expr = self.parse_not()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_not()?;
            expr = Expr::Binary(BinaryOp::And, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.eat(&Token::Not) {
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let first = self.parse_sum()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => CompareOp::Lt,
                Some(Token::Le) => CompareOp::Le,
                Some(Token::Gt) => CompareOp::Gt,
                Some(Token::Ge) => CompareOp::Ge,
                Some(Token::Eq) => CompareOp::Eq,
                Some(Token::Ne) => CompareOp::Ne,
                _ => break,
            };
            self.pos += 1;
            rest.push((op, self.parse_sum()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Comparison {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn parse_sum(&mut self) -> Result<Expr> {
        let mut expr = self.parse_product()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_product()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_product(&mut self) -> Result<Expr> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat(&Token::Minus) {
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) => Ok(Expr::Variable(name)),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                if !self.eat(&Token::RParen) {
                    bail!("missing closing parenthesis");
                }
                Ok(inner)
            }
            Some(other) => bail!("unexpected token {other:?}"),
            None => bail!("expression ends unexpectedly"),
        }
    }
}

impl Expr {
    /// Parses an expression string into its AST.
    pub fn parse(input: &str) -> Result<Self> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            bail!("empty expression");
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_or()?;
        if let Some(trailing) = parser.peek() {
            bail!("unexpected trailing token {trailing:?}");
        }
        Ok(expr)
    }

    /// Evaluates the expression; `lookup` resolves variable names.
    pub fn eval(&self, lookup: &dyn Fn(&str) -> Option<f64>) -> Result<Value> {
        match self {
            Self::Number(value) => Ok(Value::Number(*value)),
            Self::Variable(name) => lookup(name)
                .map(Value::Number)
                .ok_or_else(|| anyhow::anyhow!("unknown variable '{name}'")),
            Self::Neg(inner) => Ok(Value::Number(-inner.eval(lookup)?.as_number()?)),
            Self::Not(inner) => Ok(Value::Bool(!inner.eval(lookup)?.as_bool()?)),
            Self::Binary(op, lhs, rhs) => match op {
                BinaryOp::And => {
                    // short-circuit
                    if !lhs.eval(lookup)?.as_bool()? {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(rhs.eval(lookup)?.as_bool()?))
                }
                BinaryOp::Or => {
                    if lhs.eval(lookup)?.as_bool()? {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(rhs.eval(lookup)?.as_bool()?))
                }
                BinaryOp::Add => Ok(Value::Number(
                    lhs.eval(lookup)?.as_number()? + rhs.eval(lookup)?.as_number()?,
                )),
                BinaryOp::Sub => Ok(Value::Number(
                    lhs.eval(lookup)?.as_number()? - rhs.eval(lookup)?.as_number()?,
                )),
                BinaryOp::Mul => Ok(Value::Number(
                    lhs.eval(lookup)?.as_number()? * rhs.eval(lookup)?.as_number()?,
                )),
                BinaryOp::Div => Ok(Value::Number(
                    lhs.eval(lookup)?.as_number()? / rhs.eval(lookup)?.as_number()?,
                )),
            },
            Self::Comparison { first, rest } => {
                let mut lhs = first.eval(lookup)?.as_number()?;
                for (op, rhs_expr) in rest {
                    let rhs = rhs_expr.eval(lookup)?.as_number()?;
                    if !op.apply(lhs, rhs) {
                        return Ok(Value::Bool(false));
                    }
                    lhs = rhs;
                }
                Ok(Value::Bool(true))
            }
        }
    }

    /// Evaluates the expression and requires a boolean result.
    pub fn eval_bool(&self, lookup: &dyn Fn(&str) -> Option<f64>) -> Result<bool> {
        self.eval(lookup)?.as_bool().map_err(|_| {
            anyhow::anyhow!("expression evaluates to a number, a boolean condition is required")
        })
    }
}
