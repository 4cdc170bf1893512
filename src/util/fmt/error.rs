use std::fmt;

use crate::{parser, token::Lined, util::fmt::Quoted, CompileError};

/// The alternate form (`{:#}`) prefixes the message with its line.
impl fmt::Display for Lined<parser::Error> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Lined { line, inner: error } = self;

        if f.alternate() {
            write!(f, "{line}: ")?;
        }

        use parser::Error::*;
        match error {
            Expected {
                expected,
                actual,
                context,
            } => {
                let (expected, actual) = (Quoted(*expected), Quoted(*actual));
                write!(f, "expected {expected} {context}, but got {actual}")
            }
            ExpectedExpression { actual } => {
                write!(f, "expected expression, but got {}", Quoted(*actual))
            }
            UnrecognizedInput { text } => write!(f, "unrecognized input `{text}`"),
            InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            InvalidCallee => write!(f, "can only call functions"),
            MissingModuleName { actual } => {
                write!(f, "expected module name after import, but got {}", Quoted(*actual))
            }
            TooDeep => write!(f, "nesting too deep"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error:#}")?;
        }
        Ok(())
    }
}
