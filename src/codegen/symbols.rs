use std::collections::HashMap;

use crate::{
    ast::{Expr, ExprKind, LiteralKind, Stmt, StmtKind},
    codegen::tables,
};

/// What the generator knows about the names it has emitted so far.
///
/// Entries are recorded in a single top-to-bottom pass, so a name is only
/// known after its declaration was emitted.
#[derive(Debug, Default)]
pub struct Symbols {
    variables: HashMap<Box<str>, &'static str>,
    returns: HashMap<Box<str>, &'static str>,
    params: HashMap<Box<str>, Vec<&'static str>>,
}

impl Symbols {
    pub fn with_capacity(capacity: usize) -> Symbols {
        Symbols {
            variables: HashMap::with_capacity(capacity),
            returns: HashMap::with_capacity(capacity),
            params: HashMap::with_capacity(capacity),
        }
    }

    pub fn declare_variable(&mut self, name: &str, ty: &'static str) {
        self.variables.insert(Box::from(name), ty);
    }

    /// Records a function's signature, inferring its return type from `body`.
    pub fn declare_function(&mut self, name: &str, arity: usize, body: &Stmt) {
        let ret = self.infer_return_type(body);
        self.returns.insert(Box::from(name), ret);
        self.params.insert(Box::from(name), vec![tables::PARAM; arity]);
    }

    pub fn variable_type(&self, name: &str) -> Option<&'static str> {
        self.variables.get(name).copied()
    }

    pub fn return_type(&self, name: &str) -> Option<&'static str> {
        self.returns.get(name).copied()
    }

    pub fn param_types(&self, name: &str) -> &[&'static str] {
        self.params.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Infers a function's return type from the first `return` among the
    /// statements directly inside its body. Nested returns are not looked at.
    pub fn infer_return_type(&self, body: &Stmt) -> &'static str {
        let stmts = match &body.kind {
            StmtKind::Block(stmts) => stmts.as_slice(),
            _ => std::slice::from_ref(body),
        };
        let first_return = stmts.iter().find_map(|stmt| match &stmt.kind {
            StmtKind::Return(value) => Some(value),
            _ => None,
        });
        match first_return {
            Some(Some(value)) => self.infer_expr_type(value),
            Some(None) | None => tables::VOID,
        }
    }

    pub fn infer_expr_type(&self, expr: &Expr) -> &'static str {
        let inferred = match &expr.kind {
            ExprKind::Literal { kind, .. } => Some(match kind {
                LiteralKind::String => tables::STRING,
                LiteralKind::Number => tables::DOUBLE,
                LiteralKind::Boolean => tables::BOOL,
            }),
            ExprKind::Ident(name) => self.variable_type(name),
            ExprKind::Call { callee, .. } => self.return_type(callee),
            ExprKind::Binary { .. } | ExprKind::Unary { .. } => None,
        };
        inferred.unwrap_or(tables::INT)
    }
}
