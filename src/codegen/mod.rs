use std::{
    fmt::{self, Write},
    format_args as f,
};

use crate::ast::{BinaryOperator, Expr, ExprKind, LiteralKind, Stmt, StmtKind, TypeName};

mod symbols;
pub mod tables;

#[cfg(test)]
mod tests;

pub use symbols::Symbols;

const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

const INDENT: &str = "    ";

const PRELUDE: &str = "\
#include <iostream>
#include <vector>
#include <string>
#include <unordered_map>
#include <cmath>

using namespace std;

";

/// Emits C++ source for a parsed program.
///
/// Top-level variables become globals and every top-level function is forward
/// declared before `main`, which holds the remaining top-level statements in
/// order. Function definitions follow `main`.
///
/// Emission never fails. Constructs without a C++ counterpart are emitted as
/// comments so the output can still be handed to a compiler.
pub struct Generator {
    code: String,
    depth: usize,
    symbols: Symbols,
}

impl Default for Generator {
    fn default() -> Generator {
        Generator::new()
    }
}

impl Generator {
    pub fn new() -> Generator {
        Generator {
            code: String::with_capacity(DEFAULT_CODE_CAPACITY),
            depth: 0,
            symbols: Symbols::with_capacity(32),
        }
    }

    pub fn generate(mut self, program: &[Stmt]) -> String {
        self.emit(PRELUDE);
        self.g_declarations(program);
        self.g_main(program);
        self.g_functions(program);
        self.code
    }
}

/// Top-level layout.
impl Generator {
    fn g_declarations(&mut self, program: &[Stmt]) {
        let mut declared_any = false;
        for stmt in program {
            match &stmt.kind {
                StmtKind::VarDecl {
                    ty,
                    name,
                    initializer,
                } => self.g_var_decl(*ty, name, initializer.as_ref()),
                StmtKind::Function { name, params, body } => {
                    self.symbols.declare_function(name, params.len(), body);
                    self.g_signature(name, params);
                    self.emit(";\n");
                }
                _ => continue,
            }
            declared_any = true;
        }
        if declared_any {
            self.emit("\n");
        }
    }

    fn g_main(&mut self, program: &[Stmt]) {
        self.emit("int main() {\n");
        self.indented(|this| {
            let body = program
                .iter()
                .filter(|stmt| !matches!(stmt.kind, StmtKind::VarDecl { .. } | StmtKind::Function { .. }));
            for stmt in body {
                this.g_stmt(stmt);
            }
            this.line("return 0;");
        });
        self.emit("}\n");
    }

    fn g_functions(&mut self, program: &[Stmt]) {
        for stmt in program {
            if let StmtKind::Function { name, params, body } = &stmt.kind {
                self.emit("\n");
                self.g_signature(name, params);
                self.emit(" ");
                self.g_body(body);
                self.emit("\n");
            }
        }
    }

    fn g_signature(&mut self, name: &str, params: &[Box<str>]) {
        let ret = self.symbols.return_type(name).unwrap_or(tables::VOID);
        let params = self
            .symbols
            .param_types(name)
            .iter()
            .zip(params)
            .map(|(ty, param)| format!("{ty} {param}"))
            .collect::<Vec<_>>()
            .join(", ");
        self.emit(f!("{ret} {name}({params})"));
    }
}

/// Statements. Each one starts at the beginning of a line and ends with a
/// line break.
impl Generator {
    fn g_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Import { module } => match tables::header_for(module) {
                Some(header) => self.line(f!("#include {header}")),
                None => self.line(f!("// unmapped import: {module}")),
            },
            StmtKind::VarDecl {
                ty,
                name,
                initializer,
            } => self.g_var_decl(*ty, name, initializer.as_ref()),
            StmtKind::Expr(expr) => {
                self.indent();
                self.g_bare_expr(expr);
                self.emit(";\n");
            }
            StmtKind::Block(_) => {
                self.indent();
                self.g_body(stmt);
                self.emit("\n");
            }
            StmtKind::If {
                predicate,
                then_arm,
                else_arm,
            } => {
                self.indent();
                self.g_if(predicate, then_arm, else_arm.as_deref());
                self.emit("\n");
            }
            StmtKind::While { predicate, body } => {
                self.indent();
                self.emit("while (");
                self.g_bare_expr(predicate);
                self.emit(") ");
                self.g_body(body);
                self.emit("\n");
            }
            // Functions are only emitted at the top level.
            StmtKind::Function { name, .. } => {
                self.line(f!("// nested function `{name}` is not supported"));
            }
            StmtKind::Return(Some(value)) => {
                self.indent();
                self.emit("return ");
                self.g_bare_expr(value);
                self.emit(";\n");
            }
            StmtKind::Return(None) => self.line("return;"),
            StmtKind::Break => self.line("break;"),
            StmtKind::Continue => self.line("continue;"),
        }
    }

    fn g_var_decl(&mut self, ty: TypeName, name: &str, initializer: Option<&Expr>) {
        let cpp_type = tables::declared_type(ty);
        self.indent();
        self.emit(f!("{cpp_type} {name}"));
        if let Some(initializer) = initializer {
            self.emit(" = ");
            self.g_bare_expr(initializer);
        }
        self.emit(";\n");
        self.symbols.declare_variable(name, cpp_type);
    }

    /// Emits an `if`, without the leading indentation or the trailing line
    /// break. An `if` in the else arm is chained as `else if`.
    fn g_if(&mut self, predicate: &Expr, then_arm: &Stmt, else_arm: Option<&Stmt>) {
        self.emit("if (");
        self.g_bare_expr(predicate);
        self.emit(") ");
        self.g_body(then_arm);

        let Some(else_arm) = else_arm else {
            return;
        };
        self.emit(" else ");
        match &else_arm.kind {
            StmtKind::If {
                predicate,
                then_arm,
                else_arm,
            } => self.g_if(predicate, then_arm, else_arm.as_deref()),
            _ => self.g_body(else_arm),
        }
    }

    /// Emits a braced body, from `{` to `}`. A block's statements are
    /// emitted directly; any other statement is wrapped in braces.
    fn g_body(&mut self, stmt: &Stmt) {
        self.emit("{\n");
        self.indented(|this| match &stmt.kind {
            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    this.g_stmt(stmt);
                }
            }
            _ => this.g_stmt(stmt),
        });
        self.indent();
        self.emit("}");
    }
}

/// Expressions.
impl Generator {
    /// Emits an expression in a position that needs no surrounding
    /// parentheses, such as a statement or a condition.
    fn g_bare_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Binary { op, lhs, rhs } if *op != BinaryOperator::StreamOut => {
                self.g_expr(lhs);
                self.emit(tables::binary_operator(*op));
                // Assignment binds looser than anything its value can hold.
                if op.is_assignment() {
                    self.g_bare_expr(rhs);
                } else {
                    self.g_expr(rhs);
                }
            }
            _ => self.g_expr(expr),
        }
    }

    fn g_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Binary {
                op: BinaryOperator::StreamOut,
                lhs,
                rhs,
            } => self.g_stream_out(lhs, rhs),
            ExprKind::Binary { op, lhs, rhs } => {
                self.emit("(");
                self.g_expr(lhs);
                self.emit(tables::binary_operator(*op));
                self.g_expr(rhs);
                self.emit(")");
            }
            ExprKind::Unary { op, expr: operand } => {
                let spelling = tables::unary_operator(*op);
                if op.is_postfix() {
                    self.g_expr(operand);
                    self.emit(spelling);
                    return;
                }
                self.emit(spelling);
                // `-(-x)` must not become `--x`.
                if matches!(&operand.kind, ExprKind::Unary { op, .. } if !op.is_postfix()) {
                    self.emit("(");
                    self.g_expr(operand);
                    self.emit(")");
                } else {
                    self.g_expr(operand);
                }
            }
            ExprKind::Literal { text, kind } => match kind {
                LiteralKind::String => self.emit(f!("\"{}\"", escape(text))),
                LiteralKind::Number | LiteralKind::Boolean => self.emit(text),
            },
            ExprKind::Ident(name) => self.emit(name),
            ExprKind::Call { callee, args } => self.g_call(callee, args),
        }
    }

    /// `a << b << c` prints `b` and `c`. The leftmost operand only names the
    /// stream, which is always standard output.
    fn g_stream_out(&mut self, lhs: &Expr, rhs: &Expr) {
        match &lhs.kind {
            ExprKind::Binary {
                op: BinaryOperator::StreamOut,
                lhs,
                rhs,
            } => self.g_stream_out(lhs, rhs),
            _ => self.emit("std::cout"),
        }
        self.emit(" << ");
        self.g_expr(rhs);
    }

    fn g_call(&mut self, callee: &str, args: &[Expr]) {
        match callee {
            "print" => {
                self.emit("std::cout");
                for arg in args {
                    self.emit(" << ");
                    self.g_expr(arg);
                }
                self.emit(" << std::endl");
            }
            "size" => match args.first() {
                Some(arg) => {
                    self.emit("(");
                    self.g_bare_expr(arg);
                    self.emit(").size()");
                }
                None => self.emit("0 /* size() called with no arguments */"),
            },
            _ => {
                self.emit(f!("{callee}("));
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.emit(", ");
                    }
                    self.g_bare_expr(arg);
                }
                self.emit(")");
            }
        }
    }
}

// Utility functions.
impl Generator {
    fn emit(&mut self, f: impl fmt::Display) {
        write!(self.code, "{f}").expect("code emit should be infallible");
    }

    /// Writes the indentation for the current nesting depth.
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.code.push_str(INDENT);
        }
    }

    /// Writes a whole indented line.
    fn line(&mut self, f: impl fmt::Display) {
        self.indent();
        self.emit(f);
        self.code.push('\n');
    }

    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }
}

/// Escapes text for a C++ string literal. This undoes [`crate::lexer::unescape`]
/// for `\n`, `\t`, `\"` and `\\`.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            c => escaped.push(c),
        }
    }
    escaped
}
