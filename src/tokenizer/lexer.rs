//! SQL lexer using nom.
//!
//! Produces a flat, lossless stream of leaf tokens: concatenating every
//! token's value gives back the input exactly. Anything the lexer does not
//! recognize becomes an `Error` leaf instead of failing the whole input.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_until, take_while, take_while1},
    character::complete::{char, digit1, multispace1, one_of, satisfy},
    combinator::{map, not, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, terminated, tuple},
    IResult,
};

use crate::token::{TokenKind, TokenNode};

/// Single-word keywords. Anything else made of word characters is a `Name`.
const KEYWORDS: &[&str] = &[
    "all", "alter", "and", "as", "asc", "between", "by", "case", "create", "cross", "delete",
    "desc", "distinct", "drop", "else", "end", "except", "exists", "false", "from", "full",
    "group", "having", "ilike", "in", "inner", "insert", "intersect", "into", "is", "join",
    "like", "limit", "natural", "not", "null", "offset", "on", "or", "order", "outer", "over",
    "partition", "select", "table", "then", "true", "union", "update", "using", "values",
    "when", "where", "with",
];

/// Keywords that stay keywords even when directly followed by `(`.
/// Every other keyword turns into a `Name` there, so `left(x, 2)` is a call.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "and", "as", "exists", "from", "in", "join", "not", "on", "or", "over", "select", "table",
    "using", "values", "where", "with",
];

/// Split SQL text into leaf tokens.
pub fn lex(input: &str) -> Vec<TokenNode> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        match parse_token(rest) {
            Ok((remaining, token)) if remaining.len() < rest.len() => {
                tokens.push(token);
                rest = remaining;
            }
            _ => {
                let width = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                tokens.push(TokenNode::leaf(TokenKind::Error, &rest[..width]));
                rest = &rest[width..];
            }
        }
    }

    tokens
}

fn parse_token(input: &str) -> IResult<&str, TokenNode> {
    alt((
        leaf(TokenKind::Newline, parse_newline),
        leaf(TokenKind::Whitespace, take_while1(|c: char| c == ' ' || c == '\t' || c == '\u{0c}')),
        leaf(TokenKind::Comment, parse_comment),
        leaf(TokenKind::StringLiteral, parse_string_literal),
        leaf(TokenKind::Error, parse_unterminated_string),
        leaf(TokenKind::Name, parse_quoted_identifier),
        leaf(TokenKind::Number, parse_number),
        leaf(TokenKind::Keyword, parse_multiword_keyword),
        parse_word,
        leaf(TokenKind::Wildcard, recognize(char('*'))),
        leaf(TokenKind::Operator, parse_operator),
        leaf(TokenKind::Punctuation, recognize(one_of("(),;.[]"))),
    ))(input)
}

/// Wrap a recognizer so it yields a leaf of the given kind.
fn leaf<'a, F>(kind: TokenKind, parser: F) -> impl FnMut(&'a str) -> IResult<&'a str, TokenNode>
where
    F: FnMut(&'a str) -> IResult<&'a str, &'a str>,
{
    map(parser, move |s| TokenNode::leaf(kind, s))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn parse_newline(input: &str) -> IResult<&str, &str> {
    alt((tag("\r\n"), tag("\n"), tag("\r")))(input)
}

/// `-- line` or `/* block */`.
fn parse_comment(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(tag("--"), take_while(|c: char| c != '\n' && c != '\r'))),
        recognize(tuple((tag("/*"), take_until("*/"), tag("*/")))),
    ))(input)
}

/// Single-quoted string with `''` escapes.
fn parse_string_literal(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('\''),
        many0(alt((tag("''"), is_not("'")))),
        char('\''),
    ))(input)
}

/// An opening quote with no closing partner swallows the rest of the input.
fn parse_unterminated_string(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('\''), take_while(|_: char| true)))(input)
}

/// `"double quoted"` or `` `backtick` `` identifiers.
fn parse_quoted_identifier(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(delimited(
            char('"'),
            many0(alt((tag("\"\""), is_not("\"")))),
            char('"'),
        )),
        recognize(delimited(char('`'), take_while(|c: char| c != '`'), char('`'))),
    ))(input)
}

/// `12`, `1.5`, `.5`, `1e5`, `2.5E-3`.
fn parse_number(input: &str) -> IResult<&str, &str> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        recognize(pair(char('.'), digit1)),
    ));
    let exponent = recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)));
    terminated(
        recognize(pair(mantissa, opt(exponent))),
        not(satisfy(is_word_char)),
    )(input)
}

/// Keywords spanning several words, e.g. `CREATE OR REPLACE`, `GROUP BY`.
fn parse_multiword_keyword(input: &str) -> IResult<&str, &str> {
    terminated(
        alt((
            recognize(tuple((
                tag_no_case("create"),
                multispace1,
                tag_no_case("or"),
                multispace1,
                tag_no_case("replace"),
            ))),
            recognize(tuple((
                alt((
                    tag_no_case("group"),
                    tag_no_case("order"),
                    tag_no_case("partition"),
                )),
                multispace1,
                tag_no_case("by"),
            ))),
            recognize(tuple((tag_no_case("union"), multispace1, tag_no_case("all")))),
        )),
        not(satisfy(is_word_char)),
    )(input)
}

/// A bare word, classified as keyword or name.
fn parse_word(input: &str) -> IResult<&str, TokenNode> {
    let (rest, word) = recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_word_char),
    ))(input)?;

    let lower = word.to_lowercase();
    let is_keyword = KEYWORDS.contains(&lower.as_str())
        && !(rest.starts_with('(') && !STRUCTURAL_KEYWORDS.contains(&lower.as_str()));

    let kind = if is_keyword {
        TokenKind::Keyword
    } else {
        TokenKind::Name
    };
    Ok((rest, TokenNode::leaf(kind, word)))
}

fn parse_operator(input: &str) -> IResult<&str, &str> {
    alt((
        tag("<="),
        tag(">="),
        tag("<>"),
        tag("!="),
        tag("||"),
        tag("::"),
        tag("=>"),
        recognize(one_of("=<>+-/%^&|~!:")),
    ))(input)
}
