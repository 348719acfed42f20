//! Recursive-descent parser for JSONPath queries.
//!
//! The parser keeps going after an unexpected token: it records a message,
//! skips the token and continues, so a single run reports as many problems as
//! it can. A query with any recorded message is rejected as a whole.
use crate::ast::{
    BinaryOperator, DescendantSelection, Expression, Literal, Query, QueryExpression, QueryRoot,
    Segment, Selector, Slice,
};
use crate::error::ParseErrors;
use crate::lexer::Lexer;
use crate::reader::{CharReader, StrReader, Utf8Reader};
use crate::token::{Token, TokenKind, unescape_string_literal};

/// Parses query text into a syntax tree.
pub fn parse_query(text: &str) -> Result<Query, ParseErrors> {
    Parser::new(StrReader::new(text)).parse_query()
}

/// Parses a query from UTF-8 bytes. Malformed sequences read as U+FFFD.
pub fn parse_query_utf8(bytes: &[u8]) -> Result<Query, ParseErrors> {
    Parser::new(Utf8Reader::new(bytes)).parse_query()
}

/// Bound on nested filter expressions, so hostile input cannot exhaust the stack.
const MAX_NESTING_DEPTH: usize = 128;

pub struct Parser<R: CharReader> {
    lexer: Lexer<R>,
    errors: Vec<String>,
    depth: usize,
}

impl<R: CharReader> Parser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lexer: Lexer::new(reader),
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// `query = "$" *segment EOF`
    pub fn parse_query(mut self) -> Result<Query, ParseErrors> {
        let first = self.advance();
        if first.kind != TokenKind::Root {
            self.error(format!("Expected Root but was {:?}.", first.kind));
        }
        let segments = self.segments();
        self.expect(TokenKind::EndOfFile);
        if self.errors.is_empty() {
            Ok(Query { segments })
        } else {
            Err(ParseErrors(self.errors))
        }
    }

    fn next_kind(&self) -> TokenKind {
        self.lexer.peek().kind
    }

    fn advance(&mut self) -> Token {
        self.lexer.next_token()
    }

    fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        (self.next_kind() == kind).then(|| self.advance())
    }

    /// Consumes the next token, recording an error if it is not of `kind`.
    fn expect(&mut self, kind: TokenKind) -> Token {
        let next = self.next_kind();
        if next != kind {
            self.error(format!("Expected {kind:?} but was {next:?}."));
        }
        self.advance()
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn error_and_skip(&mut self, message: String) {
        self.error(message);
        self.advance();
    }

    fn segments(&mut self) -> Vec<Segment> {
        let mut segments = Vec::new();
        while let Some(segment) = self.segment() {
            segments.push(segment);
        }
        segments
    }

    fn segment(&mut self) -> Option<Segment> {
        match self.next_kind() {
            TokenKind::OpenBracket => Some(Segment::Bracketed(self.bracketed_selection())),
            TokenKind::Dot => {
                self.advance();
                if self.accept(TokenKind::Asterisk).is_some() {
                    Some(Segment::Child(Selector::Wildcard))
                } else {
                    Some(Segment::Child(self.member_name_shorthand()))
                }
            }
            TokenKind::DotDot => self.descendant_segment(),
            _ => None,
        }
    }

    fn descendant_segment(&mut self) -> Option<Segment> {
        self.advance();
        let selection = match self.next_kind() {
            TokenKind::OpenBracket => DescendantSelection::Bracketed(self.bracketed_selection()),
            TokenKind::Asterisk => {
                self.advance();
                DescendantSelection::Selector(Selector::Wildcard)
            }
            TokenKind::MemberName => DescendantSelection::Selector(self.member_name_shorthand()),
            other => {
                self.error_and_skip(format!("Expected segment but was {other:?}."));
                return None;
            }
        };
        Some(Segment::Descendant(selection))
    }

    fn member_name_shorthand(&mut self) -> Selector {
        let token = self.expect(TokenKind::MemberName);
        Selector::MemberNameShorthand(token.text().to_string())
    }

    fn bracketed_selection(&mut self) -> Vec<Selector> {
        self.expect(TokenKind::OpenBracket);
        let mut selectors = Vec::new();
        while let Some(selector) = self.selector() {
            selectors.push(selector);
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::CloseBracket);
        selectors
    }

    fn selector(&mut self) -> Option<Selector> {
        match self.next_kind() {
            TokenKind::StringLiteral => {
                let token = self.advance();
                Some(Selector::Name(unescape_string_literal(token.text())))
            }
            TokenKind::Asterisk => {
                self.advance();
                Some(Selector::Wildcard)
            }
            TokenKind::IntegerLiteral | TokenKind::Colon => Some(self.slice_or_index()),
            TokenKind::Question => {
                self.advance();
                Some(Selector::Filter(self.logical_or()))
            }
            other => {
                self.error_and_skip(format!("Unexpected token kind: '{other:?}'."));
                None
            }
        }
    }

    /// `index = int` or `slice = [start] ":" [end] [":" [step]]`
    fn slice_or_index(&mut self) -> Selector {
        let first = self.advance();
        let start = if first.kind == TokenKind::IntegerLiteral {
            let value = parse_integer(first.text());
            if self.accept(TokenKind::Colon).is_none() {
                return Selector::Index(value);
            }
            Some(value)
        } else {
            None
        };
        let end = self
            .accept(TokenKind::IntegerLiteral)
            .map(|token| parse_integer(token.text()));
        let step = match self.accept(TokenKind::Colon) {
            Some(_) => self
                .accept(TokenKind::IntegerLiteral)
                .map(|token| parse_integer(token.text())),
            None => None,
        };
        Selector::Slice(Slice { start, end, step })
    }

    /// Every nested expression (parentheses, negation, function arguments,
    /// filters inside embedded queries) re-enters here.
    fn logical_or(&mut self) -> Expression {
        if self.depth >= MAX_NESTING_DEPTH {
            self.error("Expression nested too deeply.".to_string());
            while self.next_kind() != TokenKind::EndOfFile {
                self.advance();
            }
            return Expression::Literal(Literal::Null);
        }
        self.depth += 1;
        let expression = self.logical_or_chain();
        self.depth -= 1;
        expression
    }

    fn logical_or_chain(&mut self) -> Expression {
        let mut left = self.logical_and();
        while self.accept(TokenKind::BarBar).is_some() {
            let right = self.logical_and();
            left = binary(BinaryOperator::Or, left, right);
        }
        left
    }

    fn logical_and(&mut self) -> Expression {
        let mut left = self.basic_expression();
        while self.accept(TokenKind::AmpersandAmpersand).is_some() {
            let right = self.basic_expression();
            left = binary(BinaryOperator::And, left, right);
        }
        left
    }

    fn basic_expression(&mut self) -> Expression {
        let kind = self.next_kind();
        if kind == TokenKind::Exclamation {
            return self.logical_not();
        }
        let is_function = kind == TokenKind::MemberName && !is_keyword(self.lexer.peek().text());
        let left = match kind {
            TokenKind::MemberName if is_function => self.function_call(),
            TokenKind::OpenParen => self.parenthesized(),
            TokenKind::Root | TokenKind::Current => {
                let query = self.embedded_query();
                // Only a query that is compared is treated as singular.
                if self.next_kind().is_comparison() {
                    Expression::SingularQuery(query)
                } else {
                    Expression::FilterQuery(query)
                }
            }
            _ => self.literal(),
        };
        self.comparison_tail(left)
    }

    /// Completes `left` into a comparison when a comparison operator follows.
    fn comparison_tail(&mut self, left: Expression) -> Expression {
        let Some(op) = comparison_operator(self.next_kind()) else {
            return left;
        };
        self.advance();
        let right = self.comparable();
        binary(op, left, right)
    }

    fn comparable(&mut self) -> Expression {
        if let Some(literal) = self.try_literal() {
            return literal;
        }
        match self.next_kind() {
            TokenKind::MemberName => self.function_call(),
            TokenKind::Root | TokenKind::Current => {
                Expression::SingularQuery(self.embedded_query())
            }
            _ => {
                self.error_and_skip("Invalid comparable.".to_string());
                Expression::Literal(Literal::Null)
            }
        }
    }

    /// Reads a `$` or `@` token and the segments that follow it.
    fn embedded_query(&mut self) -> QueryExpression {
        let root = match self.advance().kind {
            TokenKind::Root => QueryRoot::Root,
            _ => QueryRoot::Current,
        };
        QueryExpression {
            root,
            segments: self.segments(),
        }
    }

    fn literal(&mut self) -> Expression {
        self.try_literal().unwrap_or_else(|| {
            self.error_and_skip("Invalid literal.".to_string());
            Expression::Literal(Literal::Null)
        })
    }

    fn try_literal(&mut self) -> Option<Expression> {
        let token = self.lexer.peek();
        let literal = match token.kind {
            TokenKind::FloatLiteral => Literal::Float(token.text().parse().unwrap_or(f64::NAN)),
            TokenKind::IntegerLiteral => Literal::Integer(parse_integer(token.text())),
            TokenKind::StringLiteral => Literal::String(unescape_string_literal(token.text())),
            TokenKind::MemberName => match token.text() {
                "true" => Literal::Boolean(true),
                "false" => Literal::Boolean(false),
                "null" => Literal::Null,
                _ => return None,
            },
            _ => return None,
        };
        self.advance();
        Some(Expression::Literal(literal))
    }

    fn logical_not(&mut self) -> Expression {
        self.expect(TokenKind::Exclamation);
        let inner = match self.next_kind() {
            TokenKind::OpenParen => self.parenthesized(),
            TokenKind::MemberName => self.function_call(),
            TokenKind::Root => Expression::FilterQuery(self.embedded_query()),
            _ => {
                self.expect(TokenKind::Current);
                Expression::FilterQuery(QueryExpression {
                    root: QueryRoot::Current,
                    segments: self.segments(),
                })
            }
        };
        Expression::Not(Box::new(inner))
    }

    fn parenthesized(&mut self) -> Expression {
        self.expect(TokenKind::OpenParen);
        let inner = self.logical_or();
        self.expect(TokenKind::CloseParen);
        Expression::Parenthesized(Box::new(inner))
    }

    fn function_call(&mut self) -> Expression {
        let name = self.expect(TokenKind::MemberName).text().to_string();
        self.expect(TokenKind::OpenParen);
        let mut args = Vec::new();
        if self.next_kind() != TokenKind::CloseParen {
            loop {
                args.push(self.argument());
                if self.accept(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseParen);
        Expression::FunctionCall { name, args }
    }

    fn argument(&mut self) -> Expression {
        match self.try_literal() {
            Some(literal) => self.comparison_tail(literal),
            None => self.logical_or(),
        }
    }
}

fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn comparison_operator(kind: TokenKind) -> Option<BinaryOperator> {
    Some(match kind {
        TokenKind::EqualsEquals => BinaryOperator::Equal,
        TokenKind::ExclamationEquals => BinaryOperator::NotEqual,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::LessEquals => BinaryOperator::LessEqual,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::GreaterEquals => BinaryOperator::GreaterEqual,
        _ => return None,
    })
}

fn is_keyword(text: &str) -> bool {
    matches!(text, "true" | "false" | "null")
}

/// Integer literals beyond the 64-bit range saturate.
fn parse_integer(text: &str) -> i64 {
    text.parse().unwrap_or(if text.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}
