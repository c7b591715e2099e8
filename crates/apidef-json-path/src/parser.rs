//! Recursive-descent parser for path expressions.

use crate::types::*;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expected root identifier '$' at start")]
    ExpectedRoot,
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Invalid escape sequence")]
    InvalidEscape,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Unclosed string")]
    UnclosedString,
    #[error("Invalid selector")]
    InvalidSelector,
    #[error("Invalid filter expression")]
    InvalidFilter,
    #[error("Aggregate call must terminate the path")]
    AggregateNotTerminal,
    #[error("Trailing input after path expression")]
    TrailingInput,
}

struct ComparisonToken {
    op: CompareOp,
    len: usize,
}

/// Path-expression parser over a `{input, pos}` cursor.
pub struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PathParser<'a> {
    /// Parse a complete `$`-rooted path expression.
    pub fn parse(input: &'a str) -> Result<PathExpr, ParseError> {
        let mut parser = Self { input, pos: 0 };
        let expr = parser.parse_path()?;
        if !parser.is_at_end() {
            return Err(ParseError::TrailingInput);
        }
        Ok(expr)
    }

    fn parse_path(&mut self) -> Result<PathExpr, ParseError> {
        if self.peek() != Some('$') {
            return Err(ParseError::ExpectedRoot);
        }
        self.advance();

        let mut segments = Vec::new();
        let mut aggregate = None;

        while !self.is_at_end() {
            if aggregate.is_some() {
                return Err(ParseError::AggregateNotTerminal);
            }
            if self.peek() == Some('.') {
                self.advance();
                if self.peek() == Some('*') {
                    self.advance();
                    segments.push(Selector::Wildcard);
                } else {
                    let name = self.parse_identifier()?;
                    if self.peek_str("()") {
                        aggregate = Some(Self::aggregate_for(&name)?);
                        self.advance_by(2);
                    } else {
                        segments.push(Selector::Name(name));
                    }
                }
            } else if self.peek() == Some('[') {
                segments.push(self.parse_bracket_selector()?);
            } else {
                break;
            }
        }

        Ok(PathExpr { segments, aggregate })
    }

    fn aggregate_for(name: &str) -> Result<Aggregate, ParseError> {
        match name {
            "length" | "size" => Ok(Aggregate::Length),
            _ => Err(ParseError::InvalidSelector),
        }
    }

    fn parse_bracket_selector(&mut self) -> Result<Selector, ParseError> {
        self.expect('[')?;
        self.skip_whitespace();

        let selector = match self.peek() {
            Some('\'') | Some('"') => Selector::Name(self.parse_string()?),
            Some('*') => {
                self.advance();
                Selector::Wildcard
            }
            Some('-') | Some('0'..='9') => Selector::Index(self.parse_number()?),
            Some('?') => {
                self.advance();
                self.skip_whitespace();
                let parenthesized = self.peek() == Some('(');
                if parenthesized {
                    self.advance();
                }
                let expr = self.parse_filter_expression()?;
                self.skip_whitespace();
                if parenthesized {
                    self.expect(')')?;
                }
                Selector::Filter(expr)
            }
            Some(c) => return Err(ParseError::UnexpectedChar(c)),
            None => return Err(ParseError::UnexpectedEnd),
        };

        self.skip_whitespace();
        self.expect(']')?;
        Ok(selector)
    }

    // ── Filter expressions ───────────────────────────────────────────────

    fn parse_filter_expression(&mut self) -> Result<FilterExpr, ParseError> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> Result<FilterExpr, ParseError> {
        let mut left = self.parse_and_expression()?;
        self.skip_whitespace();

        while self.peek_str("||") {
            self.advance_by(2);
            let right = self.parse_and_expression()?;
            left = FilterExpr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
            self.skip_whitespace();
        }

        Ok(left)
    }

    fn parse_and_expression(&mut self) -> Result<FilterExpr, ParseError> {
        let mut left = self.parse_unary_expression()?;
        self.skip_whitespace();

        while self.peek_str("&&") {
            self.advance_by(2);
            let right = self.parse_unary_expression()?;
            left = FilterExpr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
            self.skip_whitespace();
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<FilterExpr, ParseError> {
        self.skip_whitespace();

        if self.peek() == Some('!') && !self.peek_str("!=") {
            self.advance();
            let inner = self.parse_unary_expression()?;
            return Ok(FilterExpr::Not(Box::new(inner)));
        }

        if self.peek() == Some('(') {
            self.advance();
            let expr = self.parse_filter_expression()?;
            self.skip_whitespace();
            self.expect(')')?;
            return Ok(expr);
        }

        self.parse_primary_expression()
    }

    fn parse_primary_expression(&mut self) -> Result<FilterExpr, ParseError> {
        let left = self.parse_operand()?;
        self.skip_whitespace();

        if let Some(token) = self.peek_comparison() {
            self.advance_by(token.len);
            let right = self.parse_operand()?;
            return Ok(FilterExpr::Comparison {
                op: token.op,
                left,
                right,
            });
        }

        // No comparison operator: a bare relative path is an existence test.
        match left {
            Operand::Relative(path) => Ok(FilterExpr::Existence { path }),
            Operand::Literal(_) => Err(ParseError::InvalidFilter),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        self.skip_whitespace();

        if self.peek() == Some('@') {
            self.advance();
            let path = self.parse_relative_segments()?;
            return Ok(Operand::Relative(path));
        }

        if self.peek() == Some('\'') || self.peek() == Some('"') {
            let s = self.parse_string()?;
            return Ok(Operand::Literal(serde_json::Value::String(s)));
        }

        if matches!(self.peek(), Some('0'..='9') | Some('-')) {
            let n = self.parse_float()?;
            return Ok(Operand::Literal(
                serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            ));
        }

        if self.peek_str("true") {
            self.advance_by(4);
            return Ok(Operand::Literal(serde_json::Value::Bool(true)));
        }

        if self.peek_str("false") {
            self.advance_by(5);
            return Ok(Operand::Literal(serde_json::Value::Bool(false)));
        }

        if self.peek_str("null") {
            self.advance_by(4);
            return Ok(Operand::Literal(serde_json::Value::Null));
        }

        Err(ParseError::InvalidFilter)
    }

    /// Relative path segments after `@`, stopping at any filter terminator
    /// (`)`, `]`, `,`, a logical or comparison operator, or whitespace).
    fn parse_relative_segments(&mut self) -> Result<Vec<Selector>, ParseError> {
        let mut segments = Vec::new();

        loop {
            if self.is_relative_terminator() {
                break;
            }
            if self.peek() == Some('.') {
                self.advance();
                if self.peek() == Some('*') {
                    self.advance();
                    segments.push(Selector::Wildcard);
                } else {
                    let name = self.parse_identifier()?;
                    segments.push(Selector::Name(name));
                }
            } else if self.peek() == Some('[') {
                segments.push(self.parse_bracket_selector()?);
            } else {
                break;
            }
        }

        Ok(segments)
    }

    fn is_relative_terminator(&self) -> bool {
        match self.peek() {
            None => true,
            Some(')') | Some(']') | Some(',') => true,
            Some('&') => self.peek_str("&&"),
            Some('|') => self.peek_str("||"),
            Some('=') => self.peek_str("=="),
            Some('!') => self.peek_str("!="),
            Some('<') | Some('>') => true,
            Some(c) => c.is_whitespace(),
        }
    }

    // ── Lexical helpers ──────────────────────────────────────────────────

    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.advance();
            } else {
                break;
            }
        }

        if self.pos == start {
            return match self.peek() {
                Some(c) => Err(ParseError::UnexpectedChar(c)),
                None => Err(ParseError::UnexpectedEnd),
            };
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(c @ ('\'' | '"')) => c,
            _ => return Err(ParseError::UnclosedString),
        };
        self.advance();

        let mut result = String::new();

        loop {
            match self.peek() {
                None => return Err(ParseError::UnclosedString),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('\\') => result.push('\\'),
                        Some('\'') => result.push('\''),
                        Some('"') => result.push('"'),
                        _ => return Err(ParseError::InvalidEscape),
                    }
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }

        Ok(result)
    }

    fn parse_number(&mut self) -> Result<isize, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        self.input[start..self.pos]
            .parse::<isize>()
            .map_err(|_| ParseError::InvalidNumber)
    }

    fn parse_float(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;

        if self.peek() == Some('-') {
            self.advance();
        }
        if !matches!(self.peek(), Some('0'..='9')) {
            return Err(ParseError::InvalidNumber);
        }
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        if self.peek() == Some('.') {
            self.advance();
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(ParseError::InvalidNumber);
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(ParseError::InvalidNumber);
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }

        self.input[start..self.pos]
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber)
    }

    fn peek_comparison(&self) -> Option<ComparisonToken> {
        if self.peek_str("==") {
            Some(ComparisonToken { op: CompareOp::Eq, len: 2 })
        } else if self.peek_str("!=") {
            Some(ComparisonToken { op: CompareOp::Ne, len: 2 })
        } else if self.peek_str("<=") {
            Some(ComparisonToken { op: CompareOp::Le, len: 2 })
        } else if self.peek_str(">=") {
            Some(ComparisonToken { op: CompareOp::Ge, len: 2 })
        } else if self.peek_str("<") {
            Some(ComparisonToken { op: CompareOp::Lt, len: 1 })
        } else if self.peek_str(">") {
            Some(ComparisonToken { op: CompareOp::Gt, len: 1 })
        } else {
            None
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            match self.peek() {
                Some(c) => Err(ParseError::UnexpectedChar(c)),
                None => Err(ParseError::UnexpectedEnd),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}
