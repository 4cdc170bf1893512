use crate::{
    ast::{BinaryOperator, Expr, ExprKind, For, LiteralKind, Stmt, StmtKind, TypeName, UnaryOperator},
    lexer,
    token::{Line, Lined, Token, TokenKind},
};

type Result<T, E = ()> = std::result::Result<T, E>;

/// On failure, the partially parsed value is returned along with every
/// recorded error.
pub type ParseResult<T> = Result<T, (T, Vec<Lined<Error>>)>;

/// What the parser does once a top-level declaration fails.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Synchronize to the next statement boundary and keep parsing, so that
    /// every malformed declaration is reported.
    #[default]
    CollectAll,
    /// Stop at the first error.
    AbortOnFirst,
}

/// Lexes and parses a whole program.
pub fn parse_program(
    src: &str,
    tokens: &mut Vec<Token>,
    policy: ErrorPolicy,
) -> ParseResult<Vec<Stmt>> {
    assert!(tokens.is_empty());
    lexer::lex(src, tokens);
    parse(tokens, policy)
}

/// Parses a token sequence, as produced by the lexer, into the program's
/// top-level statements.
pub fn parse(tokens: &[Token], policy: ErrorPolicy) -> ParseResult<Vec<Stmt>> {
    let mut p = Parser::new(tokens, policy);
    let program = p.parse_program();
    p.finish(program)
}

/// Parses a token sequence holding a single expression.
pub fn parse_expr(tokens: &[Token]) -> ParseResult<Option<Expr>> {
    let mut p = Parser::new(tokens, ErrorPolicy::AbortOnFirst);
    let expr = p.parse_expr().ok();
    if expr.is_some() {
        let _ = p.consume(TokenKind::Eof, "after expression");
    }
    p.finish(expr)
}

/// Binary operator levels, from the loosest to the tightest. Every level is
/// left-associative. Assignment, which binds looser than all of them and
/// associates to the right, is handled separately.
const BINARY_LEVELS: &[&[(TokenKind, BinaryOperator)]] = &[
    &[(TokenKind::StreamOut, BinaryOperator::StreamOut)],
    &[(TokenKind::PipePipe, BinaryOperator::Or)],
    &[(TokenKind::AmpAmp, BinaryOperator::And)],
    &[(TokenKind::Pipe, BinaryOperator::BitOr)],
    &[(TokenKind::Caret, BinaryOperator::BitXor)],
    &[(TokenKind::Amp, BinaryOperator::BitAnd)],
    &[
        (TokenKind::EqEq, BinaryOperator::Eq),
        (TokenKind::BangEq, BinaryOperator::NotEq),
    ],
    &[
        (TokenKind::Less, BinaryOperator::Less),
        (TokenKind::Greater, BinaryOperator::Greater),
        (TokenKind::LessEq, BinaryOperator::LessEq),
        (TokenKind::GreaterEq, BinaryOperator::GreaterEq),
    ],
    &[
        (TokenKind::Plus, BinaryOperator::Add),
        (TokenKind::Minus, BinaryOperator::Sub),
    ],
    &[
        (TokenKind::Star, BinaryOperator::Mul),
        (TokenKind::Slash, BinaryOperator::Div),
        (TokenKind::Percent, BinaryOperator::Rem),
    ],
];

/// How deep blocks, statement arms and expressions may nest.
const MAX_DEPTH: usize = 64;

/// Used when the token buffer doesn't end with an end-of-file token.
static EOF: Token = Token {
    kind: TokenKind::Eof,
    line: Line::FIRST,
    lexeme: None,
};

struct Parser<'tok> {
    tokens: &'tok [Token],
    cursor: usize,
    policy: ErrorPolicy,
    errors: Vec<Lined<Error>>,
    depth: usize,
}

impl Parser<'_> {
    fn parse_program(&mut self) -> Vec<Stmt> {
        let mut program = Vec::with_capacity(16);
        while !self.is(TokenKind::Eof) {
            if let Ok(stmt) = self.parse_declaration() {
                program.push(stmt);
                continue;
            }
            match self.policy {
                ErrorPolicy::CollectAll => self.synchronize(),
                ErrorPolicy::AbortOnFirst => break,
            }
        }
        program
    }

    fn parse_declaration(&mut self) -> Result<Stmt> {
        let token = self.peek();
        if let Some(ty) = type_keyword(token.kind) {
            self.advance();
            return self.parse_var_decl(ty, token.line);
        }
        match token.kind {
            TokenKind::Func => {
                self.advance();
                self.parse_function(token.line)
            }
            TokenKind::Import => {
                self.advance();
                self.parse_import(token)
            }
            _ => self.parse_statement(),
        }
    }

    fn parse_function(&mut self, line: Line) -> Result<Stmt> {
        let name = self.consume(TokenKind::Identifier, "after `func`")?;

        self.consume(TokenKind::LParen, "after function name")?;
        let mut params = Vec::new();
        if !self.is(TokenKind::RParen) {
            loop {
                let param = self.consume(TokenKind::Identifier, "as parameter name")?;
                params.push(Box::from(param.text()));
                if !self.take(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "after parameters")?;

        let open = self.consume(TokenKind::LBrace, "before function body")?;
        let body = self.parse_block(open.line)?;

        let function = StmtKind::Function {
            name: Box::from(name.text()),
            params,
            body: Box::new(body),
        };
        Ok(Stmt::new(function, line))
    }

    fn parse_var_decl(&mut self, ty: TypeName, line: Line) -> Result<Stmt> {
        let name = self.consume(TokenKind::Identifier, "after variable type")?;
        let initializer = if self.take(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "after variable declaration")?;

        let decl = StmtKind::VarDecl {
            ty,
            name: Box::from(name.text()),
            initializer,
        };
        Ok(Stmt::new(decl, line))
    }

    /// The module name is either the `@import` directive's payload or, for
    /// the bare `import` keyword, a following string literal.
    fn parse_import(&mut self, import: &Token) -> Result<Stmt> {
        let module = match &import.lexeme {
            Some(module) => module.clone(),
            None => {
                let next = self.peek();
                if !self.take(TokenKind::String) {
                    let error = Error::MissingModuleName { actual: next.kind };
                    self.report(next, error);
                    return Err(());
                }
                Box::from(next.text())
            }
        };
        self.consume(TokenKind::Semicolon, "after import")?;
        Ok(Stmt::new(StmtKind::Import { module }, import.line))
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        let token = self.peek();
        let line = token.line;
        match token.kind {
            TokenKind::If => {
                self.advance();
                self.parse_if(line, "after `if`")
            }
            TokenKind::While => {
                self.advance();
                self.parse_while(line)
            }
            TokenKind::For => {
                self.advance();
                self.parse_for(line)
            }
            TokenKind::LBrace => {
                self.advance();
                self.parse_block(line)
            }
            TokenKind::Return => {
                self.advance();
                self.parse_return(line)
            }
            TokenKind::Print => {
                self.advance();
                self.parse_print(line)
            }
            TokenKind::Break => {
                self.advance();
                self.consume(TokenKind::Semicolon, "after `break`")?;
                Ok(Stmt::new(StmtKind::Break, line))
            }
            TokenKind::Continue => {
                self.advance();
                self.consume(TokenKind::Semicolon, "after `continue`")?;
                Ok(Stmt::new(StmtKind::Continue, line))
            }
            _ => self.parse_expr_stmt(),
        }
    }

    /// Parses the rest of an `if` or `elif`. An `elif` chain becomes nested
    /// `if`s in the else arm.
    fn parse_if(&mut self, line: Line, keyword_context: &'static str) -> Result<Stmt> {
        self.consume(TokenKind::LParen, keyword_context)?;
        let predicate = self.parse_expr()?;
        self.consume(TokenKind::RParen, "after if condition")?;
        let then_arm = self.nested(Self::parse_statement)?;

        let next = self.peek();
        let else_arm = match next.kind {
            TokenKind::Elif => {
                self.advance();
                Some(self.nested(|p| p.parse_if(next.line, "after `elif`"))?)
            }
            TokenKind::Else => {
                self.advance();
                Some(self.nested(Self::parse_statement)?)
            }
            _ => None,
        };

        let stmt = StmtKind::If {
            predicate,
            then_arm: Box::new(then_arm),
            else_arm: else_arm.map(Box::new),
        };
        Ok(Stmt::new(stmt, line))
    }

    fn parse_while(&mut self, line: Line) -> Result<Stmt> {
        self.consume(TokenKind::LParen, "after `while`")?;
        let predicate = self.parse_expr()?;
        self.consume(TokenKind::RParen, "after while condition")?;
        let body = self.nested(Self::parse_statement)?;

        let stmt = StmtKind::While {
            predicate,
            body: Box::new(body),
        };
        Ok(Stmt::new(stmt, line))
    }

    /// Parses a `for` loop, returning its `while` lowering.
    fn parse_for(&mut self, line: Line) -> Result<Stmt> {
        self.consume(TokenKind::LParen, "after `for`")?;

        let next = self.peek();
        let init = if self.take(TokenKind::Semicolon) {
            None
        } else if let Some(ty) = type_keyword(next.kind) {
            self.advance();
            Some(self.parse_var_decl(ty, next.line)?)
        } else {
            Some(self.parse_expr_stmt()?)
        };

        let predicate = if self.is(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume(TokenKind::Semicolon, "after loop condition")?;

        let step = if self.is(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume(TokenKind::RParen, "after for clauses")?;

        let body = self.nested(Self::parse_statement)?;

        let for_loop = For {
            init,
            predicate,
            step,
            body,
            line,
        };
        Ok(for_loop.desugar())
    }

    /// Parses the rest of a block. The opening brace was already consumed.
    fn parse_block(&mut self, line: Line) -> Result<Stmt> {
        let mut stmts = Vec::new();
        while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
            stmts.push(self.nested(Self::parse_declaration)?);
        }
        self.consume(TokenKind::RBrace, "after block")?;
        Ok(Stmt::new(StmtKind::Block(stmts), line))
    }

    fn parse_return(&mut self, line: Line) -> Result<Stmt> {
        let value = if self.is(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume(TokenKind::Semicolon, "after return value")?;
        Ok(Stmt::new(StmtKind::Return(value), line))
    }

    /// `print(a, b);` is sugar for calling the `print` builtin.
    fn parse_print(&mut self, line: Line) -> Result<Stmt> {
        self.consume(TokenKind::LParen, "after `print`")?;
        let args = self.parse_args()?;
        self.consume(TokenKind::RParen, "after print arguments")?;
        self.consume(TokenKind::Semicolon, "after print statement")?;

        let call = ExprKind::Call {
            callee: Box::from("print"),
            args,
        };
        Ok(Stmt::new(StmtKind::Expr(Expr::new(call, line)), line))
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt> {
        let expr = self.parse_expr()?;
        self.consume(TokenKind::Semicolon, "after expression")?;
        let line = expr.line;
        Ok(Stmt::new(StmtKind::Expr(expr), line))
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        let lhs = self.parse_binary(0)?;

        let op_token = self.peek();
        let Some(op) = assignment_operator(op_token.kind) else {
            return Ok(lhs);
        };
        if !matches!(lhs.kind, ExprKind::Ident(_)) {
            self.error(lhs.line.wrap(Error::InvalidAssignmentTarget));
            return Err(());
        }
        self.advance();

        // Right-associative: `a = b = c` is `a = (b = c)`.
        let value = self.nested(Self::parse_assignment)?;
        let assign = ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(value),
        };
        Ok(Expr::new(assign, op_token.line))
    }

    fn parse_binary(&mut self, level: usize) -> Result<Expr> {
        let Some(operators) = BINARY_LEVELS.get(level) else {
            return self.parse_unary();
        };

        let mut lhs = self.parse_binary(level + 1)?;
        while let Some(&(_, op)) = operators.iter().find(|(kind, _)| self.is(*kind)) {
            let op_token = self.advance();
            let rhs = self.parse_binary(level + 1)?;
            let binary = ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
            lhs = Expr::new(binary, op_token.line);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let token = self.peek();
        let op = match token.kind {
            TokenKind::Bang => UnaryOperator::Not,
            TokenKind::Minus => UnaryOperator::Neg,
            TokenKind::Tilde => UnaryOperator::BitNot,
            TokenKind::PlusPlus => UnaryOperator::PreIncrement,
            TokenKind::MinusMinus => UnaryOperator::PreDecrement,
            _ => return self.parse_postfix(),
        };
        self.advance();

        let expr = self.nested(Self::parse_unary)?;
        let unary = ExprKind::Unary {
            op,
            expr: Box::new(expr),
        };
        Ok(Expr::new(unary, token.line))
    }

    /// Parses calls, member accesses and postfix increments.
    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            let token = self.peek();
            let kind = match token.kind {
                TokenKind::LParen => {
                    self.advance();
                    self.finish_call(expr)?
                }
                TokenKind::ArrowRight => {
                    self.advance();
                    let member = self.consume(TokenKind::Identifier, "after `->`")?;
                    let member = Expr::new(ExprKind::Ident(Box::from(member.text())), member.line);
                    ExprKind::Binary {
                        op: BinaryOperator::Arrow,
                        lhs: Box::new(expr),
                        rhs: Box::new(member),
                    }
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    self.advance();
                    let op = if token.kind == TokenKind::PlusPlus {
                        UnaryOperator::PostIncrement
                    } else {
                        UnaryOperator::PostDecrement
                    };
                    ExprKind::Unary {
                        op,
                        expr: Box::new(expr),
                    }
                }
                _ => break,
            };
            expr = Expr::new(kind, token.line);
        }
        Ok(expr)
    }

    /// Parses the arguments of a call whose callee was already parsed. Only
    /// bare names may be called.
    fn finish_call(&mut self, callee: Expr) -> Result<ExprKind> {
        let ExprKind::Ident(name) = callee.kind else {
            self.error(callee.line.wrap(Error::InvalidCallee));
            return Err(());
        };
        let args = if self.is(TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_args()?
        };
        self.consume(TokenKind::RParen, "after arguments")?;
        Ok(ExprKind::Call { callee: name, args })
    }

    /// Parses `expr (',' expr)*`.
    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = vec![self.nested(Self::parse_expr)?];
        while self.take(TokenKind::Comma) {
            args.push(self.nested(Self::parse_expr)?);
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.peek();
        let kind = match token.kind {
            TokenKind::Number => ExprKind::Literal {
                text: Box::from(token.text()),
                kind: LiteralKind::Number,
            },
            TokenKind::String => ExprKind::Literal {
                text: Box::from(token.text()),
                kind: LiteralKind::String,
            },
            TokenKind::True | TokenKind::False => ExprKind::Literal {
                text: Box::from(token.kind.as_str()),
                kind: LiteralKind::Boolean,
            },
            TokenKind::Identifier => ExprKind::Ident(Box::from(token.text())),
            // Grouping: ( expr )
            TokenKind::LParen => {
                self.advance();
                let expr = self.nested(Self::parse_expr)?;
                self.consume(TokenKind::RParen, "after expression")?;
                return Ok(expr);
            }
            actual => {
                self.report(token, Error::ExpectedExpression { actual });
                return Err(());
            }
        };
        self.advance();
        Ok(Expr::new(kind, token.line))
    }
}

impl<'tok> Parser<'tok> {
    fn new(tokens: &'tok [Token], policy: ErrorPolicy) -> Parser<'tok> {
        debug_assert!(tokens.last().is_some_and(Token::is_eof));
        Parser {
            tokens,
            cursor: 0,
            policy,
            errors: Vec::with_capacity(8),
            depth: 0,
        }
    }

    fn finish<T>(self, value: T) -> ParseResult<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err((value, self.errors))
        }
    }

    /// Records an error.
    fn error(&mut self, error: Lined<Error>) {
        self.errors.push(error);
    }

    /// Records an error found at the given token. Unknown tokens are always
    /// reported as such, since they are what actually went wrong.
    fn report(&mut self, token: &Token, error: Error) {
        let error = match token.kind {
            TokenKind::Unknown => Error::UnrecognizedInput {
                text: Box::from(token.text()),
            },
            _ => error,
        };
        self.error(token.line.wrap(error));
    }

    /// Runs `f` one nesting level deeper. Past [`MAX_DEPTH`] levels, records
    /// an error at the current token instead.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            let line = self.peek().line;
            self.error(line.wrap(Error::TooDeep));
            return Err(());
        }
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }

    /// Returns the current token.
    fn peek(&self) -> &'tok Token {
        self.tokens.get(self.cursor).unwrap_or(&EOF)
    }

    /// Returns the current token and advances. Never moves past the end of
    /// the input.
    fn advance(&mut self) -> &'tok Token {
        let c = self.peek();
        if !c.is_eof() {
            self.cursor += 1;
        }
        c
    }

    /// Returns the kind of the last consumed token, if any.
    fn previous(&self) -> Option<TokenKind> {
        let index = self.cursor.checked_sub(1)?;
        self.tokens.get(index).map(|token| token.kind)
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one, returning it.
    /// If not, records an error. `context` says where the token was expected,
    /// as in "expected `;` *after expression*".
    fn consume(&mut self, expected: TokenKind, context: &'static str) -> Result<&'tok Token> {
        let c = self.peek();
        if c.kind == expected {
            self.advance();
            Ok(c)
        } else {
            let error = Error::Expected {
                expected,
                actual: c.kind,
                context,
            };
            self.report(c, error);
            Err(())
        }
    }

    /// Panic-mode recovery: skips the current token, then keeps skipping until
    /// just past a semicolon or until a token that starts a new declaration
    /// or statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is(TokenKind::Eof) {
            if self.previous() == Some(TokenKind::Semicolon) {
                return;
            }
            if self.peek().kind.is_statement_start() {
                return;
            }
            self.advance();
        }
    }
}

fn type_keyword(kind: TokenKind) -> Option<TypeName> {
    match kind {
        TokenKind::Num => Some(TypeName::Num),
        TokenKind::Str => Some(TypeName::Str),
        TokenKind::Arr => Some(TypeName::Arr),
        _ => None,
    }
}

fn assignment_operator(kind: TokenKind) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::Assign => BinaryOperator::Assign,
        TokenKind::PlusEq => BinaryOperator::AddAssign,
        TokenKind::MinusEq => BinaryOperator::SubAssign,
        TokenKind::StarEq => BinaryOperator::MulAssign,
        TokenKind::SlashEq => BinaryOperator::DivAssign,
        TokenKind::PercentEq => BinaryOperator::RemAssign,
        _ => return None,
    };
    Some(op)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Expected {
        expected: TokenKind,
        actual: TokenKind,
        context: &'static str,
    },
    ExpectedExpression {
        actual: TokenKind,
    },
    /// An unknown character or an unterminated string.
    UnrecognizedInput {
        text: Box<str>,
    },
    InvalidAssignmentTarget,
    InvalidCallee,
    MissingModuleName {
        actual: TokenKind,
    },
    /// Blocks, statements or expressions nested more than [`MAX_DEPTH`] deep.
    TooDeep,
}
