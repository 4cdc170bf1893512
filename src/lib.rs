/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST. `for` loops
/// are lowered to `while` loops while parsing.
pub mod parser;

/// The code generator takes an AST, mapping it into C++ source.
pub mod codegen;

pub mod ast;
pub mod token;

pub mod util {
    pub mod fmt;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

pub use parser::ErrorPolicy;

use crate::{parser::Error, token::Lined};

/// Compilation settings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub error_policy: ErrorPolicy,
}

/// Returned when a program has syntax errors. Nothing is emitted in that case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    errors: Vec<Lined<Error>>,
}

impl CompileError {
    /// Every recorded syntax error, in source order.
    pub fn errors(&self) -> &[Lined<Error>] {
        &self.errors
    }
}

impl std::error::Error for CompileError {}

/// Compiles a program into C++ source with the default [`Options`].
pub fn compile(src: &str) -> Result<String, CompileError> {
    compile_with(src, &Options::default())
}

pub fn compile_with(src: &str, options: &Options) -> Result<String, CompileError> {
    let mut tokens = Vec::with_capacity(src.len() / 4);
    let program = parser::parse_program(src, &mut tokens, options.error_policy)
        .map_err(|(_, errors)| CompileError { errors })?;
    Ok(codegen::Generator::new().generate(&program))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{compile, compile_with, ErrorPolicy, Options};

    #[test]
    fn test_compile() {
        let code = compile("num x = 5; print(x);").unwrap();
        assert!(code.contains("double x = 5;\n"), "{code}");
        assert!(code.contains("    std::cout << x << std::endl;\n"), "{code}");
    }

    #[test]
    fn test_emission_gaps_are_not_errors() {
        let code = compile("@import io;\n@import frobnicate;").unwrap();
        assert!(code.contains("    #include <iostream>\n"), "{code}");
        assert!(code.contains("// unmapped import: frobnicate"), "{code}");
    }

    #[test]
    fn test_errors_abort_emission() {
        let error = compile("num a = ;\nnum b = 1;\nstr s = \"oops;").unwrap_err();
        assert_eq!(
            error.to_string(),
            "line 1: expected expression, but got `;`\n\
            line 3: unrecognized input `\"oops;`"
        );
    }

    #[test]
    fn test_abort_on_first() {
        let options = Options {
            error_policy: ErrorPolicy::AbortOnFirst,
        };
        let error = compile_with("num a = ;\nnum b = ;", &options).unwrap_err();
        assert_eq!(error.errors().len(), 1);
        assert_eq!(error.to_string(), "line 1: expected expression, but got `;`");
    }

    #[test]
    fn test_demos_compile() {
        for src in [
            include_str!("../demos/fib.sc"),
            include_str!("../demos/loops.sc"),
        ] {
            let code = compile(src).unwrap();
            assert!(code.starts_with("#include <iostream>\n"));
            assert!(code.contains("int main() {\n"));
        }
    }
}
