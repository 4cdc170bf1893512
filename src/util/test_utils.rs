use pretty_assertions::assert_eq;

use crate::{lexer, parser, token::Lined, util::fmt::tree};

pub fn format_errors(errors: &[Lined<parser::Error>]) -> Vec<String> {
    errors.iter().map(|error| format!("{error:#}")).collect()
}

/// What a tree test parses.
pub enum Input {
    Program(&'static str),
    Expr(&'static str),
}

/// What a tree test checks, against the printed tree and formatted errors.
pub enum Expect {
    /// The whole input parses without errors into this tree.
    Tree(&'static str),
    /// What was parsed despite the errors.
    PartialTree(&'static str),
    Errors(&'static [&'static str]),
}

/// Parses the input with [`parser::ErrorPolicy::CollectAll`], returning the
/// printed tree and the formatted errors.
pub fn parse_and_print(input: Input) -> (String, Vec<String>) {
    let mut tokens = Vec::with_capacity(1024);
    let policy = parser::ErrorPolicy::CollectAll;

    let (tree, errors) = match input {
        Input::Program(src) => {
            let (program, errors) = match parser::parse_program(src, &mut tokens, policy) {
                Ok(program) => (program, Vec::new()),
                Err(failed) => failed,
            };
            (tree::print_program_string(&program), errors)
        }
        Input::Expr(src) => {
            lexer::lex(src, &mut tokens);
            let (expr, errors) = match parser::parse_expr(&tokens) {
                Ok(expr) => (expr, Vec::new()),
                Err(failed) => failed,
            };
            let tree = expr.as_ref().map(tree::print_expr_string);
            (tree.unwrap_or_default(), errors)
        }
    };
    (tree, format_errors(&errors))
}

#[track_caller]
pub fn check(expect: Expect, tree: &str, errors: &[String]) {
    match expect {
        Expect::Tree(expected) => {
            assert_eq!(errors, &[] as &[String]);
            assert_eq!(tree.trim(), expected.trim());
        }
        Expect::PartialTree(expected) => assert_eq!(tree.trim(), expected.trim()),
        Expect::Errors(expected) => assert_eq!(errors, expected),
    }
}

/// Declares parser tests. Each test names its input as either `program` or
/// `expr`, followed by any of the `tree_ok`, `tree_error` and
/// `expected_errors` assertions.
macro_rules! tree_tests {
    ($(
        fn $name:ident() {
            let $input:ident = $src:expr;
            $(let $expect:ident = $expected:expr;)*
        }
    )*) => {$(
        #[test]
        fn $name() {
            use crate::util::test_utils::{check, parse_and_print, Expect, Input};

            let (tree, errors) = parse_and_print(tree_tests!(@input $input, $src));
            $(check(tree_tests!(@expect $expect, $expected), &tree, &errors);)*
        }
    )*};

    (@input program, $src:expr) => { Input::Program($src) };
    (@input expr, $src:expr) => { Input::Expr($src) };

    (@expect tree_ok, $expected:expr) => { Expect::Tree(::indoc::indoc! { $expected }) };
    (@expect tree_error, $expected:expr) => { Expect::PartialTree(::indoc::indoc! { $expected }) };
    (@expect expected_errors, $expected:expr) => { Expect::Errors($expected) };
}
pub(crate) use tree_tests;
