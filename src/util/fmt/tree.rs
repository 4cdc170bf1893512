use std::io::Write;

use crate::ast::*;

const INDENT_WIDTH: usize = 2;

pub fn print_program_string(program: &[Stmt]) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_expr_string(expr: &Expr) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, 0, expr).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_program(w: &mut impl Write, program: &[Stmt]) -> std::io::Result<()> {
    for stmt in program {
        print_stmt(w, 0, stmt)?;
    }
    Ok(())
}

pub fn print_stmt(w: &mut impl Write, i: usize, stmt: &Stmt) -> std::io::Result<()> {
    sp(w, i)?;
    let line = stmt.line;
    match &stmt.kind {
        StmtKind::Import { module } => {
            writeln!(w, "import {module} ({line})")?;
        }
        StmtKind::VarDecl {
            ty,
            name,
            initializer,
        } => {
            writeln!(w, "var {ty} {name} ({line})")?;
            if let Some(initializer) = initializer {
                print_expr(w, i + 1, initializer)?;
            }
        }
        StmtKind::Expr(expr) => {
            writeln!(w, "expr ({line})")?;
            print_expr(w, i + 1, expr)?;
        }
        StmtKind::Block(stmts) => {
            writeln!(w, "block ({line})")?;
            for stmt in stmts {
                print_stmt(w, i + 1, stmt)?;
            }
        }
        StmtKind::If {
            predicate,
            then_arm,
            else_arm,
        } => {
            writeln!(w, "if ({line})")?;
            print_expr(w, i + 1, predicate)?;
            print_stmt(w, i + 1, then_arm)?;
            if let Some(else_arm) = else_arm {
                sp(w, i + 1)?;
                writeln!(w, "else")?;
                print_stmt(w, i + 2, else_arm)?;
            }
        }
        StmtKind::While { predicate, body } => {
            writeln!(w, "while ({line})")?;
            print_expr(w, i + 1, predicate)?;
            print_stmt(w, i + 1, body)?;
        }
        StmtKind::Function { name, params, body } => {
            writeln!(w, "func {name}({}) ({line})", params.join(", "))?;
            print_stmt(w, i + 1, body)?;
        }
        StmtKind::Return(value) => {
            writeln!(w, "return ({line})")?;
            if let Some(value) = value {
                print_expr(w, i + 1, value)?;
            }
        }
        StmtKind::Break => writeln!(w, "break ({line})")?,
        StmtKind::Continue => writeln!(w, "continue ({line})")?,
    }
    Ok(())
}

pub fn print_expr(w: &mut impl Write, i: usize, expr: &Expr) -> std::io::Result<()> {
    sp(w, i)?;
    let line = expr.line;
    match &expr.kind {
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({line})")?;
            print_expr(w, i + 1, lhs)?;
            print_expr(w, i + 1, rhs)?;
        }
        ExprKind::Unary { op, expr } => {
            writeln!(w, "unary {op:?} ({line})")?;
            print_expr(w, i + 1, expr)?;
        }
        ExprKind::Literal { text, kind } => match kind {
            LiteralKind::String => writeln!(w, "string {text:?} ({line})")?,
            LiteralKind::Number => writeln!(w, "number {text} ({line})")?,
            LiteralKind::Boolean => writeln!(w, "bool {text} ({line})")?,
        },
        ExprKind::Ident(name) => {
            writeln!(w, "ident {name} ({line})")?;
        }
        ExprKind::Call { callee, args } => {
            writeln!(w, "call {callee} ({line})")?;
            for arg in args {
                print_expr(w, i + 1, arg)?;
            }
        }
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}
