// program ::= declaration*
// declaration ::= func ID '(' [ID (',' ID)*] ')' block
//               | (num | str | arr) ID ['=' expr] ';'
//               | import (DIRECTIVE_NAME | STRING) ';'
//               | statement
// statement ::= block
//             | if '(' expr ')' statement (elif '(' expr ')' statement)* [else statement]
//             | while '(' expr ')' statement
//             | for '(' [init] ';' [expr] ';' [expr] ')' statement
//             | return [expr] ';'
//             | print '(' expr (',' expr)* ')' ';'
//             | break ';'
//             | continue ';'
//             | expr ';'
// block ::= '{' declaration* '}'
// expr ::= ID ('=' | '+=' | '-=' | '*=' | '/=' | '%=') expr
//        | expr '<<' expr
//        | expr '||' expr
//        | expr '&&' expr
//        | expr '|' expr
//        | expr '^' expr
//        | expr '&' expr
//        | expr ('==' | '!=') expr
//        | expr ('<' | '>' | '=<' | '=>') expr
//        | expr ('+' | '-') expr
//        | expr ('*' | '/' | '%') expr
//        | ('!' | '-' | '~' | '++' | '--') expr
//        | ID '(' [expr (',' expr)*] ')'
//        | expr '->' ID
//        | expr ('++' | '--')
//        | '(' expr ')'
//        | ID | NUMBER | STRING | true | false

// Precedence (loosest first)
//
// = += -= *= /= %=
// <<
// ||
// &&
// |
// ^
// &
// == !=
// < > =< =>
// + -
// * / %
// ! - ~ ++ -- (prefix)
// call -> ++ -- (postfix)

use std::fmt;

use crate::token::Line;

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: Line,
}

impl Expr {
    pub fn new(kind: ExprKind, line: Line) -> Expr {
        Expr { kind, line }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    Literal {
        text: Box<str>,
        kind: LiteralKind,
    },
    Ident(Box<str>),
    /// Functions are never values: the callee is always a bare name.
    Call {
        callee: Box<str>,
        args: Vec<Expr>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    /// Member access, `lhs->rhs`.
    Arrow,
    /// `lhs << rhs`, which prints `rhs` rather than shifting.
    StreamOut,
}

impl BinaryOperator {
    pub fn is_assignment(self) -> bool {
        use BinaryOperator::*;
        matches!(
            self,
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | RemAssign
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOperator {
    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOperator::PostIncrement | UnaryOperator::PostDecrement)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: Line,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: Line) -> Stmt {
        Stmt { kind, line }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Import {
        module: Box<str>,
    },
    VarDecl {
        ty: TypeName,
        name: Box<str>,
        initializer: Option<Expr>,
    },
    Expr(Expr),
    Block(Vec<Stmt>),
    If {
        predicate: Expr,
        then_arm: Box<Stmt>,
        else_arm: Option<Box<Stmt>>,
    },
    While {
        predicate: Expr,
        body: Box<Stmt>,
    },
    Function {
        name: Box<str>,
        params: Vec<Box<str>>,
        /// Always a [`StmtKind::Block`].
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
}

/// The declared type of a variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeName {
    Num,
    Str,
    Arr,
}

impl TypeName {
    /// The type's keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeName::Num => "num",
            TypeName::Str => "str",
            TypeName::Arr => "arr",
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `for` loop.
///
/// This is not a statement kind: the parser lowers it to a `while` loop
/// through [`For::desugar`] as soon as it is parsed, so later stages never
/// have to handle it.
#[derive(Debug, PartialEq)]
pub struct For {
    pub init: Option<Stmt>,
    pub predicate: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Stmt,
    pub line: Line,
}

impl For {
    /// Lowers `for (init; predicate; step) body` into
    /// `{ init; while (predicate) { body; step; } }`.
    ///
    /// The outer block is only built if there is an `init` and the inner one
    /// only if there is a `step`. A missing predicate loops forever, as the
    /// number literal `1`.
    ///
    /// With a `step`, every `continue` that targets this loop becomes
    /// `{ step; continue; }`.
    pub fn desugar(self) -> Stmt {
        let For {
            init,
            predicate,
            step,
            body,
            line,
        } = self;

        let predicate = predicate.unwrap_or_else(|| {
            let kind = ExprKind::Literal {
                text: Box::from("1"),
                kind: LiteralKind::Number,
            };
            Expr::new(kind, line)
        });

        let body = match step {
            Some(step) => {
                let step = Stmt::new(StmtKind::Expr(step), line);
                let mut body = body;
                step_before_continue(&mut body, &step);
                Stmt::new(StmtKind::Block(vec![body, step]), line)
            }
            None => body,
        };

        let while_loop = Stmt::new(
            StmtKind::While {
                predicate,
                body: Box::new(body),
            },
            line,
        );

        match init {
            Some(init) => Stmt::new(StmtKind::Block(vec![init, while_loop]), line),
            None => while_loop,
        }
    }
}

/// Prefixes each `continue` of the loop body with `step`. Nested loops and
/// functions are not entered.
fn step_before_continue(stmt: &mut Stmt, step: &Stmt) {
    match &mut stmt.kind {
        StmtKind::Continue => {
            let cont = Stmt::new(StmtKind::Continue, stmt.line);
            stmt.kind = StmtKind::Block(vec![step.clone(), cont]);
        }
        StmtKind::Block(stmts) => {
            for stmt in stmts {
                step_before_continue(stmt, step);
            }
        }
        StmtKind::If {
            then_arm,
            else_arm,
            ..
        } => {
            step_before_continue(then_arm, step);
            if let Some(else_arm) = else_arm {
                step_before_continue(else_arm, step);
            }
        }
        StmtKind::While { .. }
        | StmtKind::Function { .. }
        | StmtKind::Import { .. }
        | StmtKind::VarDecl { .. }
        | StmtKind::Expr(_)
        | StmtKind::Return(_)
        | StmtKind::Break => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Expr {
        Expr::new(ExprKind::Ident(Box::from(name)), Line(1))
    }

    fn expr_stmt(name: &str) -> Stmt {
        Stmt::new(StmtKind::Expr(ident(name)), Line(1))
    }

    #[test]
    fn test_desugar_bare_for() {
        let for_loop = For {
            init: None,
            predicate: None,
            step: None,
            body: expr_stmt("body"),
            line: Line(1),
        };
        let expected = Stmt::new(
            StmtKind::While {
                predicate: Expr::new(
                    ExprKind::Literal {
                        text: Box::from("1"),
                        kind: LiteralKind::Number,
                    },
                    Line(1),
                ),
                body: Box::new(expr_stmt("body")),
            },
            Line(1),
        );
        assert_eq!(for_loop.desugar(), expected);
    }

    #[test]
    fn test_desugar_full_for() {
        let for_loop = For {
            init: Some(expr_stmt("init")),
            predicate: Some(ident("cond")),
            step: Some(ident("step")),
            body: expr_stmt("body"),
            line: Line(1),
        };
        let expected = Stmt::new(
            StmtKind::Block(vec![
                expr_stmt("init"),
                Stmt::new(
                    StmtKind::While {
                        predicate: ident("cond"),
                        body: Box::new(Stmt::new(
                            StmtKind::Block(vec![expr_stmt("body"), expr_stmt("step")]),
                            Line(1),
                        )),
                    },
                    Line(1),
                ),
            ]),
            Line(1),
        );
        assert_eq!(for_loop.desugar(), expected);
    }

    #[test]
    fn test_desugar_continue_runs_step() {
        let cont = || Stmt::new(StmtKind::Continue, Line(1));
        let inner_loop = Stmt::new(
            StmtKind::While {
                predicate: ident("inner"),
                body: Box::new(cont()),
            },
            Line(1),
        );
        let for_loop = For {
            init: None,
            predicate: Some(ident("cond")),
            step: Some(ident("step")),
            body: Stmt::new(
                StmtKind::Block(vec![
                    Stmt::new(
                        StmtKind::If {
                            predicate: ident("skip"),
                            then_arm: Box::new(cont()),
                            else_arm: None,
                        },
                        Line(1),
                    ),
                    inner_loop.clone(),
                ]),
                Line(1),
            ),
            line: Line(1),
        };
        let step_then_continue = Stmt::new(
            StmtKind::Block(vec![expr_stmt("step"), cont()]),
            Line(1),
        );
        let expected = Stmt::new(
            StmtKind::While {
                predicate: ident("cond"),
                body: Box::new(Stmt::new(
                    StmtKind::Block(vec![
                        Stmt::new(
                            StmtKind::Block(vec![
                                Stmt::new(
                                    StmtKind::If {
                                        predicate: ident("skip"),
                                        then_arm: Box::new(step_then_continue),
                                        else_arm: None,
                                    },
                                    Line(1),
                                ),
                                inner_loop,
                            ]),
                            Line(1),
                        ),
                        expr_stmt("step"),
                    ]),
                    Line(1),
                )),
            },
            Line(1),
        );
        assert_eq!(for_loop.desugar(), expected);
    }
}
