//! JSONPath query syntax tree.
//!
//! Core types: [`Query`], [`Segment`], [`Selector`], [`Expression`].
//!
//! Every node implements `Display`, printing canonical query text that parses
//! back to an equivalent tree.

use std::fmt;

/// A parsed `$`-rooted query: the ordered segments applied to the document root.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// `.name` or `.*`
    Child(Selector),
    /// `[selector, ...]`
    Bracketed(Vec<Selector>),
    /// `..name`, `..*` or `..[selector, ...]`
    Descendant(DescendantSelection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DescendantSelection {
    Selector(Selector),
    Bracketed(Vec<Selector>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// A quoted member name, already unescaped.
    Name(String),
    MemberNameShorthand(String),
    Wildcard,
    Index(i64),
    Slice(Slice),
    Filter(Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slice {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub step: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRoot {
    /// `$`
    Root,
    /// `@`
    Current,
}

/// A query embedded in a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExpression {
    pub root: QueryRoot,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    /// A query compared against another value; yields at most one node.
    SingularQuery(QueryExpression),
    /// A query used for its node list, e.g. an existence test.
    FilterQuery(QueryExpression),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
    Parenthesized(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        self.segments.iter().try_for_each(|s| write!(f, "{s}"))
    }
}

fn write_selectors(f: &mut fmt::Formatter<'_>, selectors: &[Selector]) -> fmt::Result {
    write!(f, "[")?;
    for (i, selector) in selectors.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{selector}")?;
    }
    write!(f, "]")
}

/// Writes a selector that follows a `.` or `..`; bracket-only selectors get brackets.
fn write_dotted(f: &mut fmt::Formatter<'_>, selector: &Selector) -> fmt::Result {
    match selector {
        Selector::MemberNameShorthand(name) => write!(f, "{name}"),
        Selector::Wildcard => write!(f, "*"),
        other => write_selectors(f, std::slice::from_ref(other)),
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Child(selector @ (Selector::MemberNameShorthand(_) | Selector::Wildcard)) => {
                write!(f, ".")?;
                write_dotted(f, selector)
            }
            Segment::Child(selector) => write_selectors(f, std::slice::from_ref(selector)),
            Segment::Bracketed(selectors) => write_selectors(f, selectors),
            Segment::Descendant(DescendantSelection::Selector(selector)) => {
                write!(f, "..")?;
                write_dotted(f, selector)
            }
            Segment::Descendant(DescendantSelection::Bracketed(selectors)) => {
                write!(f, "..")?;
                write_selectors(f, selectors)
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name(name) => write_quoted(f, name),
            // Inside brackets a shorthand name needs quoting like any other name.
            Selector::MemberNameShorthand(name) => write_quoted(f, name),
            Selector::Wildcard => write!(f, "*"),
            Selector::Index(index) => write!(f, "{index}"),
            Selector::Slice(slice) => write!(f, "{slice}"),
            Selector::Filter(expression) => write!(f, "?{expression}"),
        }
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        write!(f, ":")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        if let Some(step) = self.step {
            write!(f, ":{step}")?;
        }
        Ok(())
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            QueryRoot::Root => write!(f, "$")?,
            QueryRoot::Current => write!(f, "@")?,
        }
        self.segments.iter().try_for_each(|s| write!(f, "{s}"))
    }
}

const ATOM: u8 = 5;

impl Expression {
    /// Binding strength of the printed form; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Expression::Binary { op: BinaryOperator::Or, .. } => 1,
            Expression::Binary { op: BinaryOperator::And, .. } => 2,
            Expression::Binary { .. } => 3,
            Expression::Not(_) => 4,
            _ => ATOM,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expression, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::SingularQuery(query) | Expression::FilterQuery(query) => {
                write!(f, "{query}")
            }
            Expression::FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expression::Binary { op, left, right } => {
                // Comparison operands must be atoms; logical operators are left-associative.
                let (left_min, right_min) = match op {
                    BinaryOperator::Or | BinaryOperator::And => {
                        (self.precedence(), self.precedence() + 1)
                    }
                    _ => (ATOM, ATOM),
                };
                write_operand(f, left, left.precedence() < left_min)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, right, right.precedence() < right_min)
            }
            Expression::Not(inner) => {
                let bare = matches!(
                    **inner,
                    Expression::SingularQuery(_)
                        | Expression::FilterQuery(_)
                        | Expression::FunctionCall { .. }
                        | Expression::Parenthesized(_)
                );
                write!(f, "!")?;
                write_operand(f, inner, !bare)
            }
            Expression::Parenthesized(inner) => write!(f, "({inner})"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{value}"),
            // Overflowing exponents parse to infinity; print a literal that does so again.
            Literal::Float(value) if value.is_infinite() => {
                write!(f, "{}1e999", if *value < 0.0 { "-" } else { "" })
            }
            Literal::Float(value) => write!(f, "{value:?}"),
            Literal::String(value) => write_quoted(f, value),
            Literal::Boolean(value) => write!(f, "{value}"),
            Literal::Null => write!(f, "null"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    write!(f, "'")?;
    for c in value.chars() {
        match c {
            '\'' => write!(f, "\\'")?,
            '\\' => write!(f, "\\\\")?,
            '\u{8}' => write!(f, "\\b")?,
            '\u{c}' => write!(f, "\\f")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            c if u32::from(c) < 0x20 => write!(f, "{}u{:04x}", '\\', u32::from(c))?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(segments: Vec<Segment>) -> QueryExpression {
        QueryExpression {
            root: QueryRoot::Current,
            segments,
        }
    }

    #[test]
    fn test_display_segments() {
        let query = Query {
            segments: vec![
                Segment::Child(Selector::MemberNameShorthand("store".into())),
                Segment::Descendant(DescendantSelection::Selector(Selector::Wildcard)),
                Segment::Bracketed(vec![
                    Selector::Index(-1),
                    Selector::Name("it's".into()),
                    Selector::Slice(Slice {
                        start: None,
                        end: Some(3),
                        step: Some(-1),
                    }),
                ]),
                Segment::Descendant(DescendantSelection::Bracketed(vec![Selector::Wildcard])),
            ],
        };
        assert_eq!(query.to_string(), r"$.store..*[-1,'it\'s',:3:-1]..[*]");
    }

    #[test]
    fn test_display_filter_expression() {
        let filter = Expression::Binary {
            op: BinaryOperator::And,
            left: Box::new(Expression::Not(Box::new(Expression::FilterQuery(current(vec![
                Segment::Child(Selector::MemberNameShorthand("a".into())),
            ]))))),
            right: Box::new(Expression::Binary {
                op: BinaryOperator::GreaterEqual,
                left: Box::new(Expression::FunctionCall {
                    name: "length".into(),
                    args: vec![Expression::FilterQuery(current(vec![]))],
                }),
                right: Box::new(Expression::Literal(Literal::Float(2.0))),
            }),
        };
        assert_eq!(
            Selector::Filter(filter).to_string(),
            "?!@.a && length(@) >= 2.0"
        );
    }

    #[test]
    fn test_display_parenthesizes_weaker_operands() {
        let test = |name: &str| {
            Expression::FilterQuery(current(vec![Segment::Child(Selector::MemberNameShorthand(
                name.into(),
            ))]))
        };
        let binary = |op, left, right| Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        let or = binary(BinaryOperator::Or, test("a"), test("b"));
        assert_eq!(
            binary(BinaryOperator::And, or.clone(), test("c")).to_string(),
            "(@.a || @.b) && @.c"
        );
        assert_eq!(
            binary(BinaryOperator::Or, test("c"), or.clone()).to_string(),
            "@.c || (@.a || @.b)"
        );
        assert_eq!(
            binary(BinaryOperator::Or, or.clone(), test("c")).to_string(),
            "@.a || @.b || @.c"
        );
        let equal = binary(BinaryOperator::Equal, test("a"), Expression::Literal(Literal::Integer(1)));
        assert_eq!(Expression::Not(Box::new(equal.clone())).to_string(), "!(@.a == 1)");
        assert_eq!(
            Expression::Not(Box::new(Expression::Literal(Literal::Boolean(true)))).to_string(),
            "!(true)"
        );
        assert_eq!(
            binary(BinaryOperator::Equal, equal, Expression::Literal(Literal::Boolean(false))).to_string(),
            "(@.a == 1) == false"
        );
        assert_eq!(
            binary(BinaryOperator::And, Expression::Not(Box::new(test("a"))), test("b")).to_string(),
            "!@.a && @.b"
        );
    }

    #[test]
    fn test_display_escapes_control_characters() {
        let literal = Literal::String("a\nb\u{1}".into());
        assert_eq!(literal.to_string(), r"'a\nb\u0001'");
    }
}
