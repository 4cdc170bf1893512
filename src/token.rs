use std::fmt;

#[derive(Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Token {
    pub kind: TokenKind,
    pub line: Line,
    /// Literal text, for identifiers, literals, unknown input and the
    /// `@import` directive's module name.
    pub lexeme: Option<Box<str>>,
}

impl Token {
    pub fn new(kind: TokenKind, line: Line) -> Token {
        Token {
            kind,
            line,
            lexeme: None,
        }
    }

    pub fn with_lexeme(kind: TokenKind, line: Line, lexeme: impl Into<Box<str>>) -> Token {
        Token {
            kind,
            line,
            lexeme: Some(lexeme.into()),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Returns the lexeme, or an empty string if the token has none.
    pub fn text(&self) -> &str {
        self.lexeme.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lexeme {
            Some(lexeme) => write!(f, "Token({:?}({lexeme:?}), {})", self.kind, self.line),
            None => write!(f, "Token({:?}, {})", self.kind, self.line),
        }
    }
}

/// A 1-based source line.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line(pub u32);

impl Line {
    pub const FIRST: Line = Line(1);

    pub fn next(self) -> Line {
        Line(self.0 + 1)
    }

    pub fn wrap<T>(self, inner: T) -> Lined<T> {
        Lined { line: self, inner }
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({})", self.0)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lined<T> {
    pub line: Line,
    pub inner: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Return,
    /// Both the `import` keyword and the `@import` directive. Only the
    /// directive form carries a lexeme (the module name).
    Import,
    Num,
    Str,
    Arr,
    If,
    Elif,
    Else,
    While,
    Do,
    For,
    Break,
    Continue,
    Print,
    Func,
    True,
    False,

    String,
    Number,
    Identifier,

    Semicolon,
    Comma,
    /// `=`
    Assign,
    Plus,
    PlusPlus,
    Minus,
    MinusMinus,
    /// `->`
    ArrowRight,
    /// `<-`
    ArrowLeft,
    Star,
    Slash,
    Percent,
    At,
    Less,
    Greater,
    /// `=<`
    LessEq,
    /// `=>`
    GreaterEq,
    Tilde,
    Bang,
    Amp,
    Pipe,
    Caret,
    PipePipe,
    AmpAmp,
    /// `<<`
    StreamOut,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    EqEq,
    BangEq,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Eof,
    Unknown,
}

impl TokenKind {
    /// Whether this token kind starts a declaration or statement that
    /// panic-mode recovery may resume at.
    pub fn is_statement_start(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Func | Num | Str | Arr | Import | If | While | For | Return
        )
    }

    /// How the token is written in source, for diagnostics.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Return => "return",
            Import => "import",
            Num => "num",
            Str => "str",
            Arr => "arr",
            If => "if",
            Elif => "elif",
            Else => "else",
            While => "while",
            Do => "do",
            For => "for",
            Break => "break",
            Continue => "continue",
            Print => "print",
            Func => "func",
            True => "true",
            False => "false",
            String => "string literal",
            Number => "number",
            Identifier => "identifier",
            Semicolon => ";",
            Comma => ",",
            Assign => "=",
            Plus => "+",
            PlusPlus => "++",
            Minus => "-",
            MinusMinus => "--",
            ArrowRight => "->",
            ArrowLeft => "<-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            At => "@",
            Less => "<",
            Greater => ">",
            LessEq => "=<",
            GreaterEq => "=>",
            Tilde => "~",
            Bang => "!",
            Amp => "&",
            Pipe => "|",
            Caret => "^",
            PipePipe => "||",
            AmpAmp => "&&",
            StreamOut => "<<",
            PlusEq => "+=",
            MinusEq => "-=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            EqEq => "==",
            BangEq => "!=",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Eof => "end of file",
            Unknown => "unknown",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "return" => TokenKind::Return,
    "import" => TokenKind::Import,
    "num" => TokenKind::Num,
    "str" => TokenKind::Str,
    "arr" => TokenKind::Arr,
    "if" => TokenKind::If,
    "elif" => TokenKind::Elif,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "do" => TokenKind::Do,
    "for" => TokenKind::For,
    "break" => TokenKind::Break,
    "continue" => TokenKind::Continue,
    "print" => TokenKind::Print,
    "func" => TokenKind::Func,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
};
