//! Converts scalar values into a token stream with one token of lookahead.
//!
//! The lexer never fails: input it cannot classify becomes a
//! [`TokenKind::Unknown`] token and the parser reports it in context.
use crate::reader::CharReader;
use crate::token::{Token, TokenKind};

const BYTE_ORDER_MARK: char = '\u{FEFF}';

pub struct Lexer<R: CharReader> {
    reader: R,
    current: Option<char>,
    lexeme: String,
    lookahead: Token,
}

impl<R: CharReader> Lexer<R> {
    /// Creates a lexer and immediately scans the first token.
    pub fn new(mut reader: R) -> Self {
        let mut current = reader.try_read_next();
        if current == Some(BYTE_ORDER_MARK) {
            current = reader.try_read_next();
        }
        let mut lexer = Self {
            reader,
            current,
            lexeme: String::new(),
            lookahead: Token::end_of_file(),
        };
        lexer.lookahead = lexer.scan();
        lexer
    }

    /// Returns the buffered token and scans the one after it.
    pub fn next_token(&mut self) -> Token {
        let next = self.scan();
        std::mem::replace(&mut self.lookahead, next)
    }

    /// The token the next call to [`Lexer::next_token`] will return.
    pub fn peek(&self) -> &Token {
        &self.lookahead
    }

    fn advance(&mut self) {
        if let Some(c) = self.current {
            self.lexeme.push(c);
            self.current = self.reader.try_read_next();
        }
    }

    fn try_read(&mut self, expected: char) -> bool {
        self.try_read_if(|c| c == expected)
    }

    fn try_read_if(&mut self, predicate: impl Fn(char) -> bool) -> bool {
        match self.current {
            Some(c) if predicate(c) => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    /// Reads every consecutive match; returns whether at least one was read.
    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> bool {
        let mut any = false;
        while self.try_read_if(&predicate) {
            any = true;
        }
        any
    }

    fn emit(&mut self, kind: TokenKind) -> Token {
        Token::new(kind, std::mem::take(&mut self.lexeme))
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        self.advance();
        self.emit(kind)
    }

    /// Reads the first character of a two-character operator, then the
    /// second if present.
    fn pair(&mut self, second: char, paired: TokenKind, alone: TokenKind) -> Token {
        self.advance();
        if self.try_read(second) {
            self.emit(paired)
        } else {
            self.emit(alone)
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current, Some(' ' | '\t' | '\n' | '\r')) {
            self.current = self.reader.try_read_next();
        }
    }

    fn scan(&mut self) -> Token {
        self.skip_whitespace();
        let Some(c) = self.current else {
            return Token::end_of_file();
        };
        match c {
            '0' => {
                self.advance();
                self.number_tail()
                    .unwrap_or_else(|| self.emit(TokenKind::IntegerLiteral))
            }
            '1'..='9' => {
                self.advance();
                self.read_while(|c| c.is_ascii_digit());
                self.number_tail()
                    .unwrap_or_else(|| self.emit(TokenKind::IntegerLiteral))
            }
            '-' => self.negative_number(),
            '|' => self.pair('|', TokenKind::BarBar, TokenKind::Unknown),
            '&' => self.pair('&', TokenKind::AmpersandAmpersand, TokenKind::Unknown),
            '=' => self.pair('=', TokenKind::EqualsEquals, TokenKind::Unknown),
            '!' => self.pair('=', TokenKind::ExclamationEquals, TokenKind::Exclamation),
            '<' => self.pair('=', TokenKind::LessEquals, TokenKind::Less),
            '>' => self.pair('=', TokenKind::GreaterEquals, TokenKind::Greater),
            '.' => self.pair('.', TokenKind::DotDot, TokenKind::Dot),
            '$' => self.single(TokenKind::Root),
            '@' => self.single(TokenKind::Current),
            '[' => self.single(TokenKind::OpenBracket),
            ']' => self.single(TokenKind::CloseBracket),
            '(' => self.single(TokenKind::OpenParen),
            ')' => self.single(TokenKind::CloseParen),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '*' => self.single(TokenKind::Asterisk),
            '?' => self.single(TokenKind::Question),
            '\'' => self.string_literal('\'', '"'),
            '"' => self.string_literal('"', '\''),
            c if is_name_first(c) => {
                self.advance();
                self.read_while(is_name_char);
                self.emit(TokenKind::MemberName)
            }
            _ => self.single(TokenKind::Unknown),
        }
    }

    fn negative_number(&mut self) -> Token {
        self.advance();
        if self.try_read('0') {
            // `-0` is only valid as the start of a float.
            return self
                .number_tail()
                .unwrap_or_else(|| self.emit(TokenKind::Unknown));
        }
        if !self.try_read_if(|c| matches!(c, '1'..='9')) {
            return self.emit(TokenKind::Unknown);
        }
        self.read_while(|c| c.is_ascii_digit());
        self.number_tail()
            .unwrap_or_else(|| self.emit(TokenKind::IntegerLiteral))
    }

    /// Scans an optional fraction and exponent after the integer part.
    ///
    /// Returns `None` when neither follows, leaving the integer to the caller.
    fn number_tail(&mut self) -> Option<Token> {
        let mut has_fraction = false;
        if self.try_read('.') {
            if !self.read_while(|c| c.is_ascii_digit()) {
                return Some(self.emit(TokenKind::Unknown));
            }
            has_fraction = true;
        }
        if !self.try_read_if(|c| c == 'e' || c == 'E') {
            return has_fraction.then(|| self.emit(TokenKind::FloatLiteral));
        }
        let _ = self.try_read('-') || self.try_read('+');
        if self.read_while(|c| c.is_ascii_digit()) {
            Some(self.emit(TokenKind::FloatLiteral))
        } else {
            Some(self.emit(TokenKind::Unknown))
        }
    }

    fn string_literal(&mut self, quote: char, other_quote: char) -> Token {
        self.advance();
        loop {
            match self.current {
                None => return self.emit(TokenKind::Unknown),
                Some(c) if c == quote => return self.single(TokenKind::StringLiteral),
                Some(c) if c == other_quote || is_unescaped(c) => self.advance(),
                Some('\\') => {
                    self.advance();
                    if !self.escape(quote) {
                        return self.emit(TokenKind::Unknown);
                    }
                }
                Some(_) => return self.emit(TokenKind::Unknown),
            }
        }
    }

    fn escape(&mut self, quote: char) -> bool {
        match self.current {
            Some(c) if c == quote => {
                self.advance();
                true
            }
            Some('b' | 'f' | 'n' | 'r' | 't' | '/' | '\\') => {
                self.advance();
                true
            }
            Some('u') => {
                self.advance();
                self.unicode_escape()
            }
            _ => false,
        }
    }

    /// Validates the hex digits of a unicode escape. A high surrogate must be
    /// followed directly by an escaped low surrogate; a lone low surrogate is
    /// rejected.
    fn unicode_escape(&mut self) -> bool {
        match self.hex4() {
            Some(0xD800..=0xDBFF) => {
                self.try_read('\\')
                    && self.try_read('u')
                    && matches!(self.hex4(), Some(0xDC00..=0xDFFF))
            }
            Some(0xDC00..=0xDFFF) | None => false,
            Some(_) => true,
        }
    }

    fn hex4(&mut self) -> Option<u32> {
        let mut value = 0;
        for _ in 0..4 {
            let digit = self.current.and_then(|c| c.to_digit(16))?;
            self.advance();
            value = (value << 4) | digit;
        }
        Some(value)
    }
}

fn is_unescaped(c: char) -> bool {
    matches!(c,
        '\u{20}'..='\u{21}'
        | '\u{23}'..='\u{26}'
        | '\u{28}'..='\u{5B}'
        | '\u{5D}'..='\u{D7FF}'
        | '\u{E000}'..='\u{10FFFF}')
}

fn is_name_first(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_first(c) || c.is_ascii_digit()
}
