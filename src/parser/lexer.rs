//! Lexer (tokenizer) for C expressions
//!
//! Pulls one [`Token`] at a time from a [`LexBuf`] cursor over the source
//! string. Operator spellings are matched maximal-munch against a
//! process-wide trie, so multi-character operators like `>>=` always win
//! over their prefixes. Comments are consumed silently and never produce a
//! token.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::fmt;

/// All token kinds produced by the lexer.
///
/// `Bogus` marks a malformed token (unrecognized character, invalid numeric
/// literal, unterminated quoted literal); the parser turns it into a
/// diagnostic. `EndOfExpression` is terminal and repeats on every further
/// call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier or literal, carrying its spelling.
    LiteralOrId,

    // Punctuation
    OpenParen,    // (
    CloseParen,   // )
    OpenBracket,  // [
    CloseBracket, // ]
    OpenCurly,    // {
    CloseCurly,   // }

    // Operators
    Bang,       // !
    Percent,    // %
    Caret,      // ^
    Ampersand,  // &
    Bar,        // |
    Star,       // *
    Minus,      // -
    Plus,       // +
    Slash,      // /
    LeftShift,  // <<
    RightShift, // >>

    // Assignment
    Assign,          // =
    BangEqual,       // !=
    PercentEqual,    // %=
    CaretEqual,      // ^=
    AmpersandEqual,  // &=
    BarEqual,        // |=
    StarEqual,       // *=
    MinusEqual,      // -=
    PlusEqual,       // +=
    SlashEqual,      // /=
    LeftShiftEqual,  // <<=
    RightShiftEqual, // >>=

    // Member access
    Arrow, // ->
    Dot,   // .

    // Comparison
    IsEqual, // ==
    Lte,     // <=
    Gte,     // >=
    Lt,      // <
    Gt,      // >

    DoubleAmpersand, // &&
    DoubleBar,       // ||
    DoublePlus,      // ++
    DoubleMinus,     // --

    Question, // ?
    Colon,    // :
    Comma,    // ,
    Tilde,    // ~

    Sizeof,

    /// Malformed token, carrying the offending text.
    Bogus,
    /// End of input; has no text.
    EndOfExpression,
}

impl TokenKind {
    /// Display name used in diagnostics: the operator spelling, or a short
    /// word for the text-bearing and terminal kinds.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LiteralOrId => "literal",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenCurly => "{",
            TokenKind::CloseCurly => "}",
            TokenKind::Bang => "!",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::Ampersand => "&",
            TokenKind::Bar => "|",
            TokenKind::Star => "*",
            TokenKind::Minus => "-",
            TokenKind::Plus => "+",
            TokenKind::Slash => "/",
            TokenKind::LeftShift => "<<",
            TokenKind::RightShift => ">>",
            TokenKind::Assign => "=",
            TokenKind::BangEqual => "!=",
            TokenKind::PercentEqual => "%=",
            TokenKind::CaretEqual => "^=",
            TokenKind::AmpersandEqual => "&=",
            TokenKind::BarEqual => "|=",
            TokenKind::StarEqual => "*=",
            TokenKind::MinusEqual => "-=",
            TokenKind::PlusEqual => "+=",
            TokenKind::SlashEqual => "/=",
            TokenKind::LeftShiftEqual => "<<=",
            TokenKind::RightShiftEqual => ">>=",
            TokenKind::Arrow => "->",
            TokenKind::Dot => ".",
            TokenKind::IsEqual => "==",
            TokenKind::Lte => "<=",
            TokenKind::Gte => ">=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::DoubleAmpersand => "&&",
            TokenKind::DoubleBar => "||",
            TokenKind::DoublePlus => "++",
            TokenKind::DoubleMinus => "--",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Tilde => "~",
            TokenKind::Sizeof => "sizeof",
            TokenKind::Bogus => "bogus",
            TokenKind::EndOfExpression => "eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One lexed token: a kind plus optional owned text.
///
/// Text is present for identifiers, literals, and malformed tokens; operator
/// tokens carry none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Option<String>,
}

impl Token {
    fn plain(kind: TokenKind) -> Self {
        Token { kind, text: None }
    }

    fn with_text(kind: TokenKind, text: String) -> Self {
        Token {
            kind,
            text: Some(text),
        }
    }

    /// The token's text if it has one, otherwise its display name.
    pub fn text_or_name(&self) -> &str {
        self.text.as_deref().unwrap_or_else(|| self.kind.name())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text_or_name())
    }
}

/// Every operator and punctuation spelling the lexer recognizes.
const OPERATOR_SPECS: &[(&str, TokenKind)] = &[
    ("(", TokenKind::OpenParen),
    (")", TokenKind::CloseParen),
    ("[", TokenKind::OpenBracket),
    ("]", TokenKind::CloseBracket),
    ("{", TokenKind::OpenCurly),
    ("}", TokenKind::CloseCurly),
    ("!", TokenKind::Bang),
    ("!=", TokenKind::BangEqual),
    ("%", TokenKind::Percent),
    ("%=", TokenKind::PercentEqual),
    ("^", TokenKind::Caret),
    ("^=", TokenKind::CaretEqual),
    ("&", TokenKind::Ampersand),
    ("&&", TokenKind::DoubleAmpersand),
    ("&=", TokenKind::AmpersandEqual),
    ("|", TokenKind::Bar),
    ("||", TokenKind::DoubleBar),
    ("|=", TokenKind::BarEqual),
    ("*", TokenKind::Star),
    ("*=", TokenKind::StarEqual),
    ("-", TokenKind::Minus),
    ("--", TokenKind::DoubleMinus),
    ("-=", TokenKind::MinusEqual),
    ("->", TokenKind::Arrow),
    (".", TokenKind::Dot),
    ("+", TokenKind::Plus),
    ("++", TokenKind::DoublePlus),
    ("+=", TokenKind::PlusEqual),
    ("/", TokenKind::Slash),
    ("/=", TokenKind::SlashEqual),
    (">", TokenKind::Gt),
    (">>", TokenKind::RightShift),
    (">>=", TokenKind::RightShiftEqual),
    (">=", TokenKind::Gte),
    ("<", TokenKind::Lt),
    ("<<", TokenKind::LeftShift),
    ("<<=", TokenKind::LeftShiftEqual),
    ("<=", TokenKind::Lte),
    ("=", TokenKind::Assign),
    ("==", TokenKind::IsEqual),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    (",", TokenKind::Comma),
    ("~", TokenKind::Tilde),
];

struct TrieNode {
    kind: Option<TokenKind>,
    children: FxHashMap<char, usize>,
}

/// Immutable longest-match table over the operator spellings.
struct OperatorTrie {
    nodes: Vec<TrieNode>,
}

impl OperatorTrie {
    fn build() -> Self {
        let mut trie = OperatorTrie {
            nodes: vec![TrieNode {
                kind: None,
                children: FxHashMap::default(),
            }],
        };
        for &(spelling, kind) in OPERATOR_SPECS {
            trie.insert(spelling, kind);
        }
        trie
    }

    fn insert(&mut self, spelling: &str, kind: TokenKind) {
        let mut node = 0;
        for ch in spelling.chars() {
            node = match self.nodes[node].children.get(&ch) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode {
                        kind: None,
                        children: FxHashMap::default(),
                    });
                    self.nodes[node].children.insert(ch, next);
                    next
                }
            };
        }
        self.nodes[node].kind = Some(kind);
    }

    /// Longest operator spelling starting at `input[0]`, with its length in
    /// characters.
    fn longest_match(&self, input: &[char]) -> Option<(TokenKind, usize)> {
        let mut node = 0;
        let mut best = None;
        for (i, ch) in input.iter().enumerate() {
            match self.nodes[node].children.get(ch) {
                Some(&next) => {
                    node = next;
                    if let Some(kind) = self.nodes[node].kind {
                        best = Some((kind, i + 1));
                    }
                }
                None => break,
            }
        }
        best
    }
}

// Built on first use, read-only afterwards; the Lazy barrier makes the
// one-time construction safe under concurrent parses.
static OPERATORS: Lazy<OperatorTrie> = Lazy::new(OperatorTrie::build);

/// Forward-only lexing cursor. Not restartable; create a fresh one to
/// re-scan.
pub struct LexBuf {
    input: Vec<char>,
    pos: usize,
}

impl LexBuf {
    pub fn new(expr: &str) -> Self {
        LexBuf {
            input: expr.chars().collect(),
            pos: 0,
        }
    }

    /// Pull the next token. Returns `EndOfExpression` at (and after) the end
    /// of input.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Token::plain(TokenKind::EndOfExpression),
        };

        // A dot is member access unless a digit follows, in which case the
        // span re-lexes as a float starting at the dot.
        if ch == '.' && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            return self.scan_number();
        }
        if ch.is_ascii_digit() {
            return self.scan_number();
        }
        if ch.is_ascii_alphabetic() || ch == '_' {
            return self.scan_word();
        }
        if ch == '\'' || ch == '"' {
            return self.scan_quoted(ch);
        }

        if let Some((kind, len)) = OPERATORS.longest_match(&self.input[self.pos..]) {
            self.pos += len;
            return Token::plain(kind);
        }

        self.pos += 1;
        Token::with_text(TokenKind::Bogus, ch.to_string())
    }

    /// Skip space, tab, vertical tab, newline, and `/* ... */` comments. An
    /// unterminated comment consumes the rest of the input.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\x0b') | Some('\n') => {
                    self.pos += 1;
                }
                Some('/') if self.peek_ahead(1) == Some('*') => {
                    self.pos += 2;
                    while !self.at_end() {
                        if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Identifier or the `sizeof` keyword.
    fn scan_word(&mut self) -> Token {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let word: String = self.input[start..self.pos].iter().collect();
        if word == "sizeof" {
            Token::plain(TokenKind::Sizeof)
        } else {
            Token::with_text(TokenKind::LiteralOrId, word)
        }
    }

    /// Numeric literal in any of the accepted dialects: decimal integer or
    /// float, hex (optionally a hex float with a `p` exponent), or octal.
    /// Only recognition happens here; the numeric value is never computed.
    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        let mut malformed = false;

        if self.peek() == Some('0') && matches!(self.peek_ahead(1), Some('x') | Some('X')) {
            self.pos += 2;
            let mut digits = 0;
            let mut seen_dot = false;
            let mut seen_exp = false;
            while let Some(ch) = self.peek() {
                if ch.is_ascii_hexdigit() {
                    self.pos += 1;
                    digits += 1;
                } else if ch == '.' {
                    if seen_dot || seen_exp {
                        malformed = true;
                    }
                    seen_dot = true;
                    self.pos += 1;
                } else if ch == 'p' || ch == 'P' {
                    if seen_exp {
                        malformed = true;
                    }
                    seen_exp = true;
                    self.pos += 1;
                    if !self.scan_exponent_digits() {
                        malformed = true;
                    }
                } else {
                    break;
                }
            }
            if digits == 0 {
                malformed = true;
            }
        } else {
            let mut seen_dot = false;
            let mut seen_exp = false;
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    self.pos += 1;
                } else if ch == '.' {
                    if seen_dot || seen_exp {
                        malformed = true;
                    }
                    seen_dot = true;
                    self.pos += 1;
                } else if ch == 'e' || ch == 'E' {
                    if seen_exp {
                        malformed = true;
                    }
                    seen_exp = true;
                    self.pos += 1;
                    if !self.scan_exponent_digits() {
                        malformed = true;
                    }
                } else {
                    break;
                }
            }
            // A leading 0 with no dot or exponent is octal; 8 and 9 are not
            // octal digits.
            let text = &self.input[start..self.pos];
            if !seen_dot && !seen_exp && text.len() > 1 && text[0] == '0'
                && text.iter().any(|&c| c == '8' || c == '9')
            {
                malformed = true;
            }
        }

        let text: String = self.input[start..self.pos].iter().collect();
        let kind = if malformed {
            TokenKind::Bogus
        } else {
            TokenKind::LiteralOrId
        };
        Token::with_text(kind, text)
    }

    /// Optional sign plus at least one decimal digit; false if no digit
    /// follows.
    fn scan_exponent_digits(&mut self) -> bool {
        if matches!(self.peek(), Some('+') | Some('-')) {
            self.pos += 1;
        }
        let mut digits = 0;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            digits += 1;
        }
        digits > 0
    }

    /// Quoted literal; the token text includes the delimiters. Backslash
    /// escapes the following character, including the delimiter. Hitting end
    /// of input first yields a bogus token carrying the open span.
    fn scan_quoted(&mut self, delimiter: char) -> Token {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                None => {
                    let text: String = self.input[start..self.pos].iter().collect();
                    return Token::with_text(TokenKind::Bogus, text);
                }
                Some('\\') => {
                    self.pos += 1;
                    if self.at_end() {
                        let text: String = self.input[start..self.pos].iter().collect();
                        return Token::with_text(TokenKind::Bogus, text);
                    }
                    self.pos += 1;
                }
                Some(ch) if ch == delimiter => {
                    self.pos += 1;
                    let text: String = self.input[start..self.pos].iter().collect();
                    return Token::with_text(TokenKind::LiteralOrId, text);
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.pos + n).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(expr: &str) -> Vec<TokenKind> {
        let mut buf = LexBuf::new(expr);
        let mut out = Vec::new();
        loop {
            let kind = buf.next_token().kind;
            out.push(kind);
            if kind == EndOfExpression {
                return out;
            }
        }
    }

    fn texts(expr: &str) -> Vec<Option<String>> {
        let mut buf = LexBuf::new(expr);
        let mut out = Vec::new();
        loop {
            let tok = buf.next_token();
            let done = tok.kind == EndOfExpression;
            out.push(tok.text);
            if done {
                return out;
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![EndOfExpression]);
        assert_eq!(kinds("   \t\n"), vec![EndOfExpression]);
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(kinds("*"), vec![Star, EndOfExpression]);
        assert_eq!(kinds("*="), vec![StarEqual, EndOfExpression]);
        assert_eq!(
            kinds("a>>3"),
            vec![LiteralOrId, RightShift, LiteralOrId, EndOfExpression]
        );
        assert_eq!(
            kinds("a>>=3"),
            vec![LiteralOrId, RightShiftEqual, LiteralOrId, EndOfExpression]
        );
        assert_eq!(
            kinds("a->r"),
            vec![LiteralOrId, Arrow, LiteralOrId, EndOfExpression]
        );
        assert_eq!(kinds("<<="), vec![LeftShiftEqual, EndOfExpression]);
    }

    #[test]
    fn test_sizeof_keyword() {
        assert_eq!(kinds("sizeof"), vec![Sizeof, EndOfExpression]);
        assert_eq!(
            kinds("sizeof int"),
            vec![Sizeof, LiteralOrId, EndOfExpression]
        );
        assert_eq!(kinds("sizeof_int"), vec![LiteralOrId, EndOfExpression]);
        assert_eq!(
            kinds("sizeo sizeof"),
            vec![LiteralOrId, Sizeof, EndOfExpression]
        );
    }

    #[test]
    fn test_dot_disambiguation() {
        // Member access when no digit follows, float literal otherwise.
        assert_eq!(
            kinds("a.b"),
            vec![LiteralOrId, Dot, LiteralOrId, EndOfExpression]
        );
        assert_eq!(kinds(".1"), vec![LiteralOrId, EndOfExpression]);
        assert_eq!(texts(".1"), vec![Some(".1".to_string()), None]);
    }

    #[test]
    fn test_numeric_dialects() {
        assert_eq!(kinds("17"), vec![LiteralOrId, EndOfExpression]);
        assert_eq!(texts("1.5e-3"), vec![Some("1.5e-3".to_string()), None]);
        // Hex float with a binary exponent is a single token.
        assert_eq!(texts("0x17.fp1"), vec![Some("0x17.fp1".to_string()), None]);
        // Valid and invalid octal.
        assert_eq!(kinds("071"), vec![LiteralOrId, EndOfExpression]);
        assert_eq!(kinds("09"), vec![Bogus, EndOfExpression]);
        assert_eq!(texts("09"), vec![Some("09".to_string()), None]);
        // Second dot and dangling exponents are malformed.
        assert_eq!(kinds("1.2.3"), vec![Bogus, EndOfExpression]);
        assert_eq!(kinds("1e"), vec![Bogus, EndOfExpression]);
        assert_eq!(kinds("0x1p"), vec![Bogus, EndOfExpression]);
        assert_eq!(kinds("0x"), vec![Bogus, EndOfExpression]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("a /* comment */ b"),
            vec![LiteralOrId, LiteralOrId, EndOfExpression]
        );
        assert_eq!(kinds("/* c */"), vec![EndOfExpression]);
        // Unterminated comment silently consumes to end of input.
        assert_eq!(kinds("a /* oops"), vec![LiteralOrId, EndOfExpression]);
        // A lone slash is still the division operator.
        assert_eq!(
            kinds("a/b"),
            vec![LiteralOrId, Slash, LiteralOrId, EndOfExpression]
        );
    }

    #[test]
    fn test_quoted_literals() {
        assert_eq!(
            texts("\"hi there\""),
            vec![Some("\"hi there\"".to_string()), None]
        );
        assert_eq!(texts("'\\''"), vec![Some("'\\''".to_string()), None]);
        assert_eq!(
            kinds("\"a\\\"b\"*"),
            vec![LiteralOrId, Star, EndOfExpression]
        );
        // Unterminated literal is bogus.
        assert_eq!(kinds("\"abc"), vec![Bogus, EndOfExpression]);
    }

    #[test]
    fn test_bogus_character() {
        assert_eq!(kinds("a\u{1}"), vec![LiteralOrId, Bogus, EndOfExpression]);
        let mut buf = LexBuf::new("@");
        let tok = buf.next_token();
        assert_eq!(tok.kind, Bogus);
        assert_eq!(tok.text.as_deref(), Some("@"));
    }

    #[test]
    fn test_eof_repeats() {
        let mut buf = LexBuf::new("a");
        assert_eq!(buf.next_token().kind, LiteralOrId);
        assert_eq!(buf.next_token().kind, EndOfExpression);
        assert_eq!(buf.next_token().kind, EndOfExpression);
    }
}
