use std::str::Chars;

use crate::token::{Line, Token, TokenKind, KEYWORDS};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 8_192;

/// Lexes the provided string, producing the tokens into the provided buffer.
///
/// Lexing never fails. Characters that don't start any token, as well as
/// unterminated strings, are produced as [`TokenKind::Unknown`] tokens and
/// scanning continues. The buffer always ends with a single
/// [`TokenKind::Eof`] token.
pub fn lex(src: &str, tokens: &mut Vec<Token>) {
    Lexer::new(src, tokens).lex();
}

/// A convenience function that allocates a new buffer per lexed input and
/// returns it.
pub fn lex_in_new(src: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    lex(src, &mut tokens);
    tokens
}

struct Lexer<'src, 'tok> {
    src: &'src str,
    iter: Chars<'src>,
    cursor: usize,
    current_lo: usize,
    line: Line,
    current_line: Line,
    tokens: &'tok mut Vec<Token>,
}

impl Lexer<'_, '_> {
    /// Scans the source string until the input is exhausted.
    ///
    /// Tokens are written into the provided tokens buffer.
    fn lex(mut self) {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            self.skip_trivia();
            let token = self.scan_token();
            let is_eof = token.is_eof();
            self.tokens.push(token);
            if is_eof {
                break;
            }
        }
    }

    /// Skips whitespace and line comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                c if c.is_ascii_whitespace() => {
                    self.advance();
                }
                '/' if self.peek_next() == '/' => {
                    while !matches!(self.peek(), '\n' | '\0') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Tries to scan the current character.
    fn scan_token(&mut self) -> Token {
        use TokenKind::*;
        let kind = match self.mark_advance() {
            '\0' if self.is_at_end() => Eof,
            ';' => Semicolon,
            ',' => Comma,
            '(' => LParen,
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            '[' => LBracket,
            ']' => RBracket,
            '+' => match self.peek() {
                '=' => self.advance_with(PlusEq),
                '+' => self.advance_with(PlusPlus),
                _ => Plus,
            },
            '-' => match self.peek() {
                '=' => self.advance_with(MinusEq),
                '-' => self.advance_with(MinusMinus),
                '>' => self.advance_with(ArrowRight),
                _ => Minus,
            },
            '*' => match self.peek() {
                '=' => self.advance_with(StarEq),
                _ => Star,
            },
            '/' => match self.peek() {
                '=' => self.advance_with(SlashEq),
                _ => Slash,
            },
            '%' => match self.peek() {
                '=' => self.advance_with(PercentEq),
                _ => Percent,
            },
            // `<=` is spelled `=<` in this language, see the `=` arm.
            '<' => match self.peek() {
                '<' => self.advance_with(StreamOut),
                '-' => self.advance_with(ArrowLeft),
                _ => Less,
            },
            '>' => Greater,
            '!' => match self.peek() {
                '=' => self.advance_with(BangEq),
                _ => Bang,
            },
            '&' => match self.peek() {
                '&' => self.advance_with(AmpAmp),
                _ => Amp,
            },
            '|' => match self.peek() {
                '|' => self.advance_with(PipePipe),
                _ => Pipe,
            },
            '^' => Caret,
            '~' => Tilde,
            '=' => match self.peek() {
                '=' => self.advance_with(EqEq),
                '<' => self.advance_with(LessEq),
                '>' => self.advance_with(GreaterEq),
                _ => Assign,
            },
            '@' => return self.directive(),
            '"' => return self.string(),
            c if c.is_ascii_digit() => return self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => return self.identifier_or_keyword(),
            _ => return self.produce_with(Unknown, self.substr()),
        };
        self.produce(kind)
    }

    /// Scans an `@word` directive. Only `@import` is recognized, which
    /// captures the following module name as its lexeme. Every other
    /// directive word is dropped, leaving a bare `@`.
    fn directive(&mut self) -> Token {
        let word_lo = self.cursor;
        while self.peek().is_ascii_alphabetic() {
            self.advance();
        }
        if self.src.get(word_lo..self.cursor) != Some("import") {
            return self.produce(TokenKind::At);
        }

        while self.peek().is_ascii_whitespace() {
            self.advance();
        }
        let valid_module_char = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.';
        let name_lo = self.cursor;
        while valid_module_char(self.peek()) {
            self.advance();
        }
        let name = &self.src[name_lo..self.cursor];
        if name.is_empty() {
            self.produce(TokenKind::Import)
        } else {
            self.produce_with(TokenKind::Import, name)
        }
    }

    /// Scans a string literal. The opening quote was already consumed.
    ///
    /// Like the number and identifier routines, escapes are only decoded once
    /// the whole literal has been scanned, and only if the literal contains
    /// any backslash at all.
    fn string(&mut self) -> Token {
        let raw_lo = self.cursor;
        // Whether any escaping did happen inside this string token
        let mut has_escaped = false;
        // Whether the current character is being escaped
        let mut is_escaping = false;
        loop {
            match (is_escaping, self.advance()) {
                // Input exhausted before the closing quote. The partial text,
                // opening quote included, is kept so that the parser can
                // report it.
                (_, '\0') if self.is_at_end() => {
                    let partial = &self.src[self.current_lo..self.cursor];
                    return self.produce_with(TokenKind::Unknown, partial);
                }
                (false, '"') => {
                    let raw = &self.src[raw_lo..self.cursor - 1];
                    let value = if has_escaped {
                        unescape(raw)
                    } else {
                        raw.to_owned()
                    };
                    return self.produce_with(TokenKind::String, value);
                }
                (false, '\\') => {
                    has_escaped = true;
                    is_escaping = true;
                }
                (_, _) => {
                    is_escaping = false;
                }
            }
        }
    }

    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        // A trailing dot without digits is not part of the number.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        self.produce_with(TokenKind::Number, self.substr())
    }

    fn identifier_or_keyword(&mut self) -> Token {
        let valid_identifier_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';

        while valid_identifier_suffix(self.peek()) {
            self.advance();
        }
        let substr = self.substr();
        match KEYWORDS.get(substr).copied() {
            Some(keyword) => self.produce(keyword),
            None => self.produce_with(TokenKind::Identifier, substr),
        }
    }
}

impl Lexer<'_, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok mut Vec<Token>) -> Lexer<'src, 'tok> {
        Lexer {
            src,
            iter: src.chars(),
            cursor: 0,
            current_lo: 0,
            line: Line::FIRST,
            current_line: Line::FIRST,
            tokens,
        }
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.current_lo = self.cursor;
        self.current_line = self.line;
        self.advance()
    }

    /// Returns the next character and advances the iterator, keeping track
    /// of line breaks.
    fn advance(&mut self) -> char {
        self.iter
            .next()
            .inspect(|&c| {
                self.cursor += c.len_utf8();
                if c == '\n' {
                    self.line = self.line.next();
                }
            })
            .unwrap_or('\0')
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next character without advancing the iterator.
    fn peek(&self) -> char {
        self.iter.clone().next().unwrap_or('\0')
    }

    /// Returns the character after the next one without advancing.
    fn peek_next(&self) -> char {
        self.iter.clone().nth(1).unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.cursor >= self.src.len()
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        &self.src[self.current_lo..self.cursor]
    }

    /// Produces a token on the marked line.
    fn produce(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.current_line)
    }

    /// Produces a token on the marked line, carrying the given text.
    fn produce_with(&self, kind: TokenKind, lexeme: impl Into<Box<str>>) -> Token {
        Token::with_lexeme(kind, self.current_line, lexeme)
    }
}

/// Decodes the `\n`, `\t`, `\"` and `\\` escape sequences of a raw string
/// literal body. Any other backslash is kept verbatim.
pub fn unescape(raw: &str) -> String {
    let mut buf = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(char) = chars.next() {
        if char != '\\' {
            buf.push(char);
            continue;
        }
        match chars.next() {
            Some('n') => buf.push('\n'),
            Some('t') => buf.push('\t'),
            Some('"') => buf.push('"'),
            Some('\\') => buf.push('\\'),
            Some(other) => {
                buf.push('\\');
                buf.push(other);
            }
            None => buf.push('\\'),
        }
    }
    buf
}
