//! Lexical tokens and string literal decoding.
use std::fmt;

/// The closed set of token kinds the lexer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `$`
    Root,
    /// `@`
    Current,
    Dot,
    DotDot,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    Asterisk,
    Question,
    Exclamation,
    AmpersandAmpersand,
    BarBar,
    EqualsEquals,
    ExclamationEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    MemberName,
    EndOfFile,
    Unknown,
}

impl TokenKind {
    /// The fixed text of punctuation and operator tokens; empty for tokens whose
    /// text is taken from the source.
    pub fn fixed_text(self) -> &'static str {
        match self {
            TokenKind::Root => "$",
            TokenKind::Current => "@",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Asterisk => "*",
            TokenKind::Question => "?",
            TokenKind::Exclamation => "!",
            TokenKind::AmpersandAmpersand => "&&",
            TokenKind::BarBar => "||",
            TokenKind::EqualsEquals => "==",
            TokenKind::ExclamationEquals => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEquals => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEquals => ">=",
            _ => "",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            TokenKind::EqualsEquals
                | TokenKind::ExclamationEquals
                | TokenKind::Less
                | TokenKind::LessEquals
                | TokenKind::Greater
                | TokenKind::GreaterEquals
        )
    }
}

/// A token and the source text it was scanned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    text: String,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String) -> Self {
        // Punctuation carries no lexeme; its text is derived from the kind.
        let text = if kind.fixed_text().is_empty() { lexeme } else { String::new() };
        Self { kind, text }
    }

    pub fn end_of_file() -> Self {
        Self::new(TokenKind::EndOfFile, String::new())
    }

    pub fn text(&self) -> &str {
        match self.kind.fixed_text() {
            "" => &self.text,
            fixed => fixed,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}'", self.kind, self.text())
    }
}

/// Decodes the value of a quoted string literal lexeme (quotes included).
///
/// The lexer has already validated the escapes, so this never fails; a
/// surrogate pair escape (high then low surrogate) becomes a single scalar value.
pub fn unescape_string_literal(lexeme: &str) -> String {
    let mut chars = lexeme.chars();
    chars.next();
    chars.next_back();
    let body = chars.as_str();

    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => result.push('\u{0008}'),
            Some('f') => result.push('\u{000C}'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('u') => {
                let high = read_hex4(&mut chars);
                let scalar = if (0xD800..0xDC00).contains(&high) {
                    // Skip the `\u` introducing the low surrogate.
                    chars.next();
                    chars.next();
                    let low = read_hex4(&mut chars);
                    0x1_0000 + ((high - 0xD800) << 10) + (low.wrapping_sub(0xDC00) & 0x3FF)
                } else {
                    high
                };
                result.push(char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            // Quotes, `/` and `\` stand for themselves.
            Some(other) => result.push(other),
            None => {}
        }
    }
    result
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> u32 {
    chars
        .by_ref()
        .take(4)
        .fold(0, |acc, c| (acc << 4) | c.to_digit(16).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_text_comes_from_kind() {
        let token = Token::new(TokenKind::DotDot, "..".to_string());
        assert_eq!(token.text(), "..");
        let token = Token::new(TokenKind::MemberName, "store".to_string());
        assert_eq!(token.text(), "store");
    }

    #[test]
    fn test_unescape_simple_escapes() {
        assert_eq!(
            unescape_string_literal(r#"'a\b\f\n\r\t\/\\\''"#),
            "a\u{8}\u{c}\n\r\t/\\'"
        );
        assert_eq!(unescape_string_literal(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(unescape_string_literal("''"), "");
    }

    #[test]
    fn test_unescape_unicode_escapes() {
        assert_eq!(unescape_string_literal("'\x5cu00e9\x5cuA123'"), "\u{e9}\u{a123}");
        assert_eq!(unescape_string_literal("'\x5cuD83E\x5cuDD14'"), "\u{1F914}");
        assert_eq!(unescape_string_literal("'x\x5cud83d\x5cude4fy'"), "x\u{1F64F}y");
    }

    #[test]
    fn test_comparison_kinds() {
        assert!(TokenKind::LessEquals.is_comparison());
        assert!(!TokenKind::AmpersandAmpersand.is_comparison());
        assert!(!TokenKind::Exclamation.is_comparison());
    }
}
