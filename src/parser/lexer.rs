//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a [`TokenStream`] consumed by the parser.
//! Tokenization is maximal munch and never fails: anything suspicious is
//! reported to the stream's [`Diagnostics`] and a token is still produced,
//! so the parser always receives a stream terminated by exactly one
//! [`TokenKind::End`].
//!
//! Character constants and string literals are split into three tokens:
//! the opening quote, the decoded body, and the closing quote. The lexer
//! keeps an explicit [`Mode`] while inside a literal instead of looking back
//! at the previously emitted token.
//!
//! Preprocessor directives are skipped with a warning; the front end has no
//! preprocessor.

use super::ast::SourceLocation;
use crate::diagnostics::Diagnostics;
use std::fmt;

/// Digits and suffix of an integer constant, exactly as written.
///
/// Base conversion and suffix validation happen in the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerLiteral {
    pub digits: String,
    pub suffix: String,
}

impl IntegerLiteral {
    pub fn is_unsigned(&self) -> bool {
        self.suffix.chars().any(|c| matches!(c, 'u' | 'U'))
    }

    pub fn is_long(&self) -> bool {
        self.suffix.chars().any(|c| matches!(c, 'l' | 'L'))
    }
}

impl fmt::Display for IntegerLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.digits, self.suffix)
    }
}

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Identifier(String),
    IntegerConstant(IntegerLiteral),
    CharConstant { value: u32, wide: bool },
    StringLiteral { value: String, wide: bool },
    Quote,      // "
    Apostrophe, // '

    // Keywords
    Auto,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Int,
    Long,
    Register,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^
    Tilde, // ~
    LtLt,  // <<
    GtGt,  // >>

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    AmpEq,     // &=
    CaretEq,   // ^=
    PipeEq,    // |=
    LtLtEq,    // <<=
    GtGtEq,    // >>=

    // Increment/Decrement
    PlusPlus,   // ++
    MinusMinus, // --

    // Member access
    Dot,   // .
    Arrow, // ->

    // Punctuation
    Question,  // ?
    Colon,     // :
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,
    Ellipsis,  // ...

    /// A character no token starts with
    Unknown(char),

    End,
}

impl TokenKind {
    /// Look up a keyword by its exact (case-sensitive) spelling.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "auto" => TokenKind::Auto,
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "char" => TokenKind::Char,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "default" => TokenKind::Default,
            "do" => TokenKind::Do,
            "double" => TokenKind::Double,
            "else" => TokenKind::Else,
            "enum" => TokenKind::Enum,
            "extern" => TokenKind::Extern,
            "float" => TokenKind::Float,
            "for" => TokenKind::For,
            "goto" => TokenKind::Goto,
            "if" => TokenKind::If,
            "int" => TokenKind::Int,
            "long" => TokenKind::Long,
            "register" => TokenKind::Register,
            "return" => TokenKind::Return,
            "short" => TokenKind::Short,
            "signed" => TokenKind::Signed,
            "sizeof" => TokenKind::Sizeof,
            "static" => TokenKind::Static,
            "struct" => TokenKind::Struct,
            "switch" => TokenKind::Switch,
            "typedef" => TokenKind::Typedef,
            "union" => TokenKind::Union,
            "unsigned" => TokenKind::Unsigned,
            "void" => TokenKind::Void,
            "volatile" => TokenKind::Volatile,
            "while" => TokenKind::While,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_storage_class(&self) -> bool {
        matches!(
            self,
            TokenKind::Auto
                | TokenKind::Register
                | TokenKind::Static
                | TokenKind::Extern
                | TokenKind::Typedef
        )
    }

    pub fn is_type_qualifier(&self) -> bool {
        matches!(self, TokenKind::Const | TokenKind::Volatile)
    }

    /// Type keywords the front end recognizes but does not model.
    pub fn is_unsupported_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Short
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Signed
                | TokenKind::Unsigned
        )
    }

    pub fn is_type_specifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Void
                | TokenKind::Char
                | TokenKind::Struct
                | TokenKind::Union
                | TokenKind::Enum
        ) || self.is_unsupported_type()
    }

    /// True for every token that can begin a declaration.
    pub fn is_declaration(&self) -> bool {
        self.is_storage_class() || self.is_type_qualifier() || self.is_type_specifier()
    }

    /// True for every token that can begin an expression.
    pub fn starts_expression(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::IntegerConstant(_)
                | TokenKind::Quote
                | TokenKind::Apostrophe
                | TokenKind::LParen
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::Amp
                | TokenKind::Star
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Tilde
                | TokenKind::Bang
                | TokenKind::Sizeof
        )
    }

    /// True for every token that can begin a statement.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Case
                | TokenKind::Default
                | TokenKind::If
                | TokenKind::Switch
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::Goto
                | TokenKind::Continue
                | TokenKind::Break
                | TokenKind::Return
                | TokenKind::LBrace
                | TokenKind::Semicolon
        ) || self.starts_expression()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Identifier(name) => return write!(f, "identifier '{}'", name),
            TokenKind::IntegerConstant(lit) => return write!(f, "integer constant '{}'", lit),
            TokenKind::CharConstant { value, .. } => {
                return write!(f, "character constant {}", value)
            }
            TokenKind::StringLiteral { value, .. } => {
                return write!(f, "string literal \"{}\"", value.escape_default())
            }
            TokenKind::Unknown(ch) => return write!(f, "'{}'", ch.escape_default()),
            TokenKind::End => return write!(f, "end of file"),
            TokenKind::Quote => "\"",
            TokenKind::Apostrophe => "'",
            TokenKind::Auto => "auto",
            TokenKind::Break => "break",
            TokenKind::Case => "case",
            TokenKind::Char => "char",
            TokenKind::Const => "const",
            TokenKind::Continue => "continue",
            TokenKind::Default => "default",
            TokenKind::Do => "do",
            TokenKind::Double => "double",
            TokenKind::Else => "else",
            TokenKind::Enum => "enum",
            TokenKind::Extern => "extern",
            TokenKind::Float => "float",
            TokenKind::For => "for",
            TokenKind::Goto => "goto",
            TokenKind::If => "if",
            TokenKind::Int => "int",
            TokenKind::Long => "long",
            TokenKind::Register => "register",
            TokenKind::Return => "return",
            TokenKind::Short => "short",
            TokenKind::Signed => "signed",
            TokenKind::Sizeof => "sizeof",
            TokenKind::Static => "static",
            TokenKind::Struct => "struct",
            TokenKind::Switch => "switch",
            TokenKind::Typedef => "typedef",
            TokenKind::Union => "union",
            TokenKind::Unsigned => "unsigned",
            TokenKind::Void => "void",
            TokenKind::Volatile => "volatile",
            TokenKind::While => "while",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::LtLt => "<<",
            TokenKind::GtGt => ">>",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::CaretEq => "^=",
            TokenKind::PipeEq => "|=",
            TokenKind::LtLtEq => "<<=",
            TokenKind::GtGtEq => ">>=",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Ellipsis => "...",
        };
        write!(f, "'{}'", text)
    }
}

/// A token and where it starts in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// Fully scanned translation unit with a cursor.
///
/// Lookahead is bounded to two tokens and may never pass the final
/// [`TokenKind::End`]; both are programming errors and panic.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
    diagnostics: Diagnostics,
}

impl TokenStream {
    /// Build a stream from already scanned tokens. A trailing `End` is added
    /// when missing.
    pub fn new(mut tokens: Vec<Token>, diagnostics: Diagnostics) -> Self {
        if !matches!(tokens.last(), Some(tok) if tok.kind == TokenKind::End) {
            let location = tokens.last().map(|tok| tok.location).unwrap_or_default();
            tokens.push(Token::new(TokenKind::End, location));
        }
        Self {
            tokens,
            cursor: 0,
            diagnostics,
        }
    }

    pub fn current(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    /// Move past the current token and return it. Stays on `End`.
    pub fn advance(&mut self) -> &Token {
        let consumed = self.cursor;
        if !self.is_at_end() {
            self.cursor += 1;
        }
        &self.tokens[consumed]
    }

    /// Token `n` positions after the current one.
    ///
    /// # Panics
    ///
    /// Panics when `n` is greater than 2 or the lookahead passes `End`.
    pub fn peek(&self, n: usize) -> &Token {
        assert!(n <= 2, "lookahead is bounded to two tokens, asked for {}", n);
        match self.tokens.get(self.cursor + n) {
            Some(token) => token,
            None => panic!(
                "lookahead of {} past end of token stream at {}",
                n,
                self.current().location
            ),
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.tokens[self.cursor].kind == TokenKind::End
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn previous(&self) -> Option<&Token> {
        self.cursor.checked_sub(1).map(|i| &self.tokens[i])
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn kinds(&self) -> impl Iterator<Item = &TokenKind> {
        self.tokens.iter().map(|tok| &tok.kind)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.len() == 1
    }

    /// Lexical diagnostics gathered while scanning
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Scan a whole source buffer.
pub fn tokenize(source: &str) -> TokenStream {
    Lexer::new(source).tokenize()
}

/// Where the lexer is relative to a quoted literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    StringBody { wide: bool },
    CharBody { wide: bool },
    Closing { quote: char },
}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    mode: Mode,
    at_line_start: bool,
    diagnostics: Diagnostics,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            mode: Mode::Normal,
            at_line_start: true,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> TokenStream {
        let mut tokens = Vec::new();

        loop {
            match std::mem::replace(&mut self.mode, Mode::Normal) {
                Mode::Normal => {}
                Mode::StringBody { wide } => {
                    tokens.push(self.string_body(wide));
                    continue;
                }
                Mode::CharBody { wide } => {
                    tokens.push(self.char_body(wide));
                    continue;
                }
                Mode::Closing { quote } => {
                    tokens.push(self.closing_quote(quote));
                    continue;
                }
            }

            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::End, self.current_location()));
                break;
            }

            if self.at_line_start && self.peek() == Some('#') {
                self.skip_preprocessor_directive();
                continue;
            }

            let token = self.next_token();
            log::trace!("token {} at {}", token.kind, token.location);
            self.at_line_start = false;
            tokens.push(token);
        }

        TokenStream::new(tokens, self.diagnostics)
    }

    /// Get next token
    fn next_token(&mut self) -> Token {
        let loc = self.current_location();
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::End, loc);
        };

        let kind = match ch {
            // Literal openers; the body is scanned on the next round
            '"' => {
                self.mode = Mode::StringBody { wide: false };
                TokenKind::Quote
            }
            '\'' => {
                self.mode = Mode::CharBody { wide: false };
                TokenKind::Apostrophe
            }

            '0'..='9' => self.number_literal(ch),

            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch),

            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEq
                } else if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '*' => self.with_eq(TokenKind::Star, TokenKind::StarEq),
            '/' => self.with_eq(TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.with_eq(TokenKind::Percent, TokenKind::PercentEq),
            '=' => self.with_eq(TokenKind::Eq, TokenKind::EqEq),
            '!' => self.with_eq(TokenKind::Bang, TokenKind::NotEq),
            '^' => self.with_eq(TokenKind::Caret, TokenKind::CaretEq),
            '<' => {
                if self.eat('<') {
                    self.with_eq(TokenKind::LtLt, TokenKind::LtLtEq)
                } else {
                    self.with_eq(TokenKind::Lt, TokenKind::Le)
                }
            }
            '>' => {
                if self.eat('>') {
                    self.with_eq(TokenKind::GtGt, TokenKind::GtGtEq)
                } else {
                    self.with_eq(TokenKind::Gt, TokenKind::Ge)
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else {
                    self.with_eq(TokenKind::Amp, TokenKind::AmpEq)
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else {
                    self.with_eq(TokenKind::Pipe, TokenKind::PipeEq)
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            '~' => TokenKind::Tilde,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            _ => {
                self.diagnostics
                    .error(loc, format!("stray '{}' in program", ch.escape_default()));
                TokenKind::Unknown(ch)
            }
        };

        Token::new(kind, loc)
    }

    /// Consume `expected` if it is the next character.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn with_eq(&mut self, plain: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.eat('=') {
            with_eq
        } else {
            plain
        }
    }

    /// Parse numeric literal (integers only)
    fn number_literal(&mut self, first_digit: char) -> TokenKind {
        let mut digits = String::new();
        digits.push(first_digit);

        if first_digit == '0'
            && matches!(self.peek(), Some('x' | 'X'))
            && self.peek_ahead(1).is_some_and(|c| c.is_ascii_hexdigit())
        {
            if let Some(x) = self.advance() {
                digits.push(x);
            }
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_hexdigit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Everything identifier-like glued to the number belongs to it
        let mut suffix = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                suffix.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::IntegerConstant(IntegerLiteral { digits, suffix })
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char) -> TokenKind {
        // Wide literal prefix
        if first_char == 'L' {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    self.mode = Mode::StringBody { wide: true };
                    return TokenKind::Quote;
                }
                Some('\'') => {
                    self.advance();
                    self.mode = Mode::CharBody { wide: true };
                    return TokenKind::Apostrophe;
                }
                _ => {}
            }
        }

        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::keyword(&ident).unwrap_or(TokenKind::Identifier(ident))
    }

    /// Body of a string literal, up to but not including the closing quote
    fn string_body(&mut self, wide: bool) -> Token {
        let loc = self.current_location();
        let mut value = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' | '\n' => break,
                '\\' => {
                    if let Some(code) = self.escape_sequence(wide) {
                        value.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                }
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        self.mode = Mode::Closing { quote: '"' };
        Token::new(TokenKind::StringLiteral { value, wide }, loc)
    }

    /// Body of a character constant, up to but not including the closing
    /// apostrophe
    fn char_body(&mut self, wide: bool) -> Token {
        let loc = self.current_location();
        let mut values = Vec::new();

        while let Some(ch) = self.peek() {
            match ch {
                '\'' | '\n' => break,
                '\\' => {
                    if let Some(code) = self.escape_sequence(wide) {
                        values.push(code);
                    }
                }
                _ => {
                    values.push(ch as u32);
                    self.advance();
                }
            }
        }

        let value = match values.as_slice() {
            [] => {
                self.diagnostics.error(loc, "empty character constant");
                0
            }
            [only] => *only,
            [first, ..] => {
                self.diagnostics.error(loc, "multi-character character constant");
                *first
            }
        };

        self.mode = Mode::Closing { quote: '\'' };
        Token::new(TokenKind::CharConstant { value, wide }, loc)
    }

    /// Closing quote of a literal, or a placeholder when it is missing
    fn closing_quote(&mut self, quote: char) -> Token {
        let loc = self.current_location();
        if !self.eat(quote) {
            self.diagnostics
                .error(loc, format!("missing terminating {} character", quote));
        }
        let kind = if quote == '"' {
            TokenKind::Quote
        } else {
            TokenKind::Apostrophe
        };
        Token::new(kind, loc)
    }

    /// Decode one escape sequence starting at the backslash. Returns `None`
    /// when the backslash is the last character on the line.
    fn escape_sequence(&mut self, wide: bool) -> Option<u32> {
        let loc = self.current_location();
        self.advance(); // '\'

        let ch = match self.peek() {
            Some(c) if c != '\n' => c,
            _ => return None,
        };
        self.advance();

        let value = match ch {
            'n' => 0x0a,
            't' => 0x09,
            'v' => 0x0b,
            'b' => 0x08,
            'r' => 0x0d,
            'f' => 0x0c,
            'a' => 0x07,
            '\\' | '?' | '\'' | '"' => ch as u32,
            '0'..='7' => {
                let mut value = ch as u32 - '0' as u32;
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ '0'..='7') => {
                            value = value * 8 + (d as u32 - '0' as u32);
                            self.advance();
                        }
                        _ => break,
                    }
                }
                if value > 0xff {
                    self.diagnostics
                        .error(loc, "octal escape sequence out of range");
                    0xff
                } else {
                    value
                }
            }
            'x' => {
                let mut value: u32 = 0;
                let mut count = 0;
                while let Some(d) = self.peek().and_then(|c| c.to_digit(16)) {
                    value = value.saturating_mul(16).saturating_add(d);
                    count += 1;
                    self.advance();
                }
                let max = if wide { u32::MAX } else { 0xff };
                if count == 0 {
                    self.diagnostics
                        .error(loc, "\\x used with no following hex digits");
                    0
                } else if value > max {
                    self.diagnostics
                        .error(loc, "hex escape sequence out of range");
                    max
                } else {
                    value
                }
            }
            other => {
                self.diagnostics.error(
                    loc,
                    format!("unknown escape sequence '\\{}'", other.escape_default()),
                );
                other as u32
            }
        };

        Some(value)
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment();
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return;
            }
            self.advance();
        }

        self.diagnostics.error(start_loc, "unterminated comment");
    }

    /// Skip a preprocessor directive, honoring backslash line continuations
    fn skip_preprocessor_directive(&mut self) {
        let loc = self.current_location();
        self.diagnostics
            .warning(loc, "preprocessor directives are not supported, line ignored");

        while let Some(ch) = self.peek() {
            if ch == '\\' && self.peek_ahead(1) == Some('\n') {
                self.advance();
                self.advance();
                continue;
            }
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).kinds().cloned().collect()
    }

    fn int(digits: &str, suffix: &str) -> TokenKind {
        TokenKind::IntegerConstant(IntegerLiteral {
            digits: digits.to_string(),
            suffix: suffix.to_string(),
        })
    }

    #[test]
    fn test_simple_tokens() {
        let stream = tokenize("int main() { return 0; }");
        let tokens = stream.tokens();

        assert!(matches!(tokens[0].kind, TokenKind::Int));
        assert!(matches!(tokens[1].kind, TokenKind::Identifier(ref s) if s == "main"));
        assert!(matches!(tokens[2].kind, TokenKind::LParen));
        assert!(matches!(tokens[3].kind, TokenKind::RParen));
        assert!(matches!(tokens[4].kind, TokenKind::LBrace));
        assert!(matches!(tokens[5].kind, TokenKind::Return));
        assert_eq!(tokens[6].kind, int("0", ""));
        assert!(matches!(tokens[7].kind, TokenKind::Semicolon));
        assert!(matches!(tokens[8].kind, TokenKind::RBrace));
        assert!(matches!(tokens[9].kind, TokenKind::End));
        assert_eq!(tokens.len(), 10);
        assert!(stream.diagnostics().is_empty());
    }

    #[test]
    fn test_operators_maximal_munch() {
        assert_eq!(
            kinds("++ -- += -= == != && || <<= >>= << >> -> ... &= ^= |="),
            vec![
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::LtLtEq,
                TokenKind::GtGtEq,
                TokenKind::LtLt,
                TokenKind::GtGt,
                TokenKind::Arrow,
                TokenKind::Ellipsis,
                TokenKind::AmpEq,
                TokenKind::CaretEq,
                TokenKind::PipeEq,
                TokenKind::End,
            ]
        );
        assert_eq!(
            kinds("a+++b"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::PlusPlus,
                TokenKind::Plus,
                TokenKind::Identifier("b".into()),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_integer_suffix_is_one_token() {
        let stream = tokenize("12ul");
        assert_eq!(stream.len(), 2);
        match &stream.tokens()[0].kind {
            TokenKind::IntegerConstant(lit) => {
                assert_eq!(lit.digits, "12");
                assert!(lit.is_unsigned());
                assert!(lit.is_long());
            }
            other => panic!("Expected integer constant, got {:?}", other),
        }
    }

    #[test]
    fn test_hex_and_octal_constants() {
        assert_eq!(
            kinds("0x1F 017 0xffUL"),
            vec![int("0x1F", ""), int("017", ""), int("0xff", "UL"), TokenKind::End]
        );
        // Trailing letters stay glued to the constant
        assert_eq!(kinds("12uz"), vec![int("12", "uz"), TokenKind::End]);
    }

    #[test]
    fn test_comments() {
        let stream = tokenize("1 /* a\nb */ + 2");
        let tokens = stream.tokens();
        assert_eq!(
            stream.kinds().cloned().collect::<Vec<_>>(),
            vec![int("1", ""), TokenKind::Plus, int("2", ""), TokenKind::End]
        );
        assert_eq!(tokens[0].line(), 1);
        assert_eq!(tokens[1].line(), 2);
        assert_eq!(tokens[2].line(), 2);

        assert_eq!(
            kinds("int x; // comment\nint y;"),
            vec![
                TokenKind::Int,
                TokenKind::Identifier("x".into()),
                TokenKind::Semicolon,
                TokenKind::Int,
                TokenKind::Identifier("y".into()),
                TokenKind::Semicolon,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_unterminated_comment_reports() {
        let stream = tokenize("int /* never closed");
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.diagnostics().error_count(), 1);
        assert_eq!(stream.diagnostics().entries()[0].message, "unterminated comment");
    }

    #[test]
    fn test_string_literal_three_tokens() {
        let stream = tokenize(r#""hello\nworld""#);
        assert_eq!(
            stream.kinds().cloned().collect::<Vec<_>>(),
            vec![
                TokenKind::Quote,
                TokenKind::StringLiteral {
                    value: "hello\nworld".to_string(),
                    wide: false
                },
                TokenKind::Quote,
                TokenKind::End,
            ]
        );
        assert!(stream.diagnostics().is_empty());
    }

    #[test]
    fn test_empty_string_literal() {
        assert_eq!(
            kinds(r#""""#),
            vec![
                TokenKind::Quote,
                TokenKind::StringLiteral {
                    value: String::new(),
                    wide: false
                },
                TokenKind::Quote,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_char_escapes() {
        let cases = [
            (r"'a'", 97),
            (r"'\n'", 10),
            (r"'\t'", 9),
            (r"'\v'", 11),
            (r"'\b'", 8),
            (r"'\r'", 13),
            (r"'\f'", 12),
            (r"'\a'", 7),
            (r"'\\'", 92),
            (r"'\?'", 63),
            (r"'\''", 39),
            (r"'\x41'", 65),
            (r"'\101'", 65),
            (r"'\0'", 0),
        ];
        for (source, expected) in cases {
            let stream = tokenize(source);
            assert_eq!(
                stream.tokens()[1].kind,
                TokenKind::CharConstant {
                    value: expected,
                    wide: false
                },
                "source {}",
                source
            );
            assert!(stream.diagnostics().is_empty(), "source {}", source);
        }
    }

    #[test]
    fn test_escape_errors() {
        let stream = tokenize(r"'\777'");
        assert_eq!(
            stream.tokens()[1].kind,
            TokenKind::CharConstant {
                value: 255,
                wide: false
            }
        );
        assert_eq!(
            stream.diagnostics().entries()[0].message,
            "octal escape sequence out of range"
        );

        let stream = tokenize(r"'\x100'");
        assert_eq!(
            stream.tokens()[1].kind,
            TokenKind::CharConstant {
                value: 255,
                wide: false
            }
        );
        assert_eq!(stream.diagnostics().error_count(), 1);
        assert_eq!(
            stream.diagnostics().entries()[0].message,
            "hex escape sequence out of range"
        );

        // Wide constants hold the full value
        let stream = tokenize(r"L'\x100'");
        assert_eq!(
            stream.tokens()[1].kind,
            TokenKind::CharConstant {
                value: 0x100,
                wide: true
            }
        );
        assert!(stream.diagnostics().is_empty());

        let stream = tokenize(r"'\xg'");
        assert_eq!(
            stream.diagnostics().entries()[0].message,
            "\\x used with no following hex digits"
        );

        let stream = tokenize(r"'\q'");
        assert_eq!(
            stream.diagnostics().entries()[0].message,
            "unknown escape sequence '\\q'"
        );
    }

    #[test]
    fn test_char_constant_errors() {
        let stream = tokenize("''");
        assert_eq!(stream.diagnostics().entries()[0].message, "empty character constant");
        assert_eq!(stream.len(), 4);

        let stream = tokenize("'ab'");
        assert_eq!(
            stream.diagnostics().entries()[0].message,
            "multi-character character constant"
        );
    }

    #[test]
    fn test_unterminated_string_gets_placeholder_quote() {
        let stream = tokenize("\"abc\nint");
        assert_eq!(
            stream.kinds().cloned().collect::<Vec<_>>(),
            vec![
                TokenKind::Quote,
                TokenKind::StringLiteral {
                    value: "abc".to_string(),
                    wide: false
                },
                TokenKind::Quote,
                TokenKind::Int,
                TokenKind::End,
            ]
        );
        assert_eq!(
            stream.diagnostics().entries()[0].message,
            "missing terminating \" character"
        );
    }

    #[test]
    fn test_wide_literals() {
        assert_eq!(
            kinds("L'x' L\"hi\" L"),
            vec![
                TokenKind::Apostrophe,
                TokenKind::CharConstant {
                    value: 'x' as u32,
                    wide: true
                },
                TokenKind::Apostrophe,
                TokenKind::Quote,
                TokenKind::StringLiteral {
                    value: "hi".to_string(),
                    wide: true
                },
                TokenKind::Quote,
                TokenKind::Identifier("L".into()),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_unknown_character() {
        let stream = tokenize("a @ b");
        assert_eq!(stream.tokens()[1].kind, TokenKind::Unknown('@'));
        assert_eq!(stream.tokens()[2].kind, TokenKind::Identifier("b".into()));
        assert_eq!(stream.diagnostics().error_count(), 1);
    }

    #[test]
    fn test_preprocessor_skip() {
        let stream = tokenize("#include <stdio.h>\nint x;");
        assert!(matches!(stream.tokens()[0].kind, TokenKind::Int));
        assert_eq!(stream.tokens()[0].line(), 2);
        assert!(matches!(stream.tokens()[1].kind, TokenKind::Identifier(ref s) if s == "x"));
        assert_eq!(stream.diagnostics().warning_count(), 1);
        assert!(!stream.diagnostics().has_errors());
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            kinds("while While unsigned volatile sizeof"),
            vec![
                TokenKind::While,
                TokenKind::Identifier("While".into()),
                TokenKind::Unsigned,
                TokenKind::Volatile,
                TokenKind::Sizeof,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_stream_cursor() {
        let mut stream = tokenize("a b");
        assert_eq!(stream.peek(1).kind, TokenKind::Identifier("b".into()));
        assert_eq!(stream.peek(2).kind, TokenKind::End);
        stream.advance();
        stream.advance();
        assert!(stream.is_at_end());
        // Advancing at the end stays there
        stream.advance();
        assert!(stream.is_at_end());
        assert_eq!(stream.previous().map(|t| &t.kind), Some(&TokenKind::Identifier("b".into())));
    }

    #[test]
    #[should_panic(expected = "past end of token stream")]
    fn test_peek_past_end_panics() {
        let stream = tokenize("a");
        stream.peek(2);
    }

    #[test]
    fn test_empty_input_has_single_end() {
        let stream = tokenize("  \n // nothing\n");
        assert_eq!(stream.len(), 1);
        assert!(stream.is_empty());
        assert!(stream.is_at_end());
    }
}
