//! Fixed mappings from the source language to C++.

use crate::ast::{BinaryOperator, TypeName, UnaryOperator};

pub const DOUBLE: &str = "double";
pub const STRING: &str = "std::string";
pub const BOOL: &str = "bool";
pub const INT: &str = "int";
pub const VOID: &str = "void";

/// The type every function parameter is declared with.
pub const PARAM: &str = INT;

static TYPES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "num" => DOUBLE,
    "str" => STRING,
    "arr" => "std::vector<double>",
    "bool" => BOOL,
    "void" => VOID,
};

static IMPORTS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "io" => "<iostream>",
    "math" => "<cmath>",
    "vector" => "<vector>",
    "string" => "<string>",
    "map" => "<unordered_map>",
};

/// Maps a type keyword to its C++ type. Unknown names are passed through.
pub fn map_type(name: &str) -> &str {
    TYPES.get(name).copied().unwrap_or(name)
}

pub fn declared_type(ty: TypeName) -> &'static str {
    map_type(ty.as_str())
}

/// Returns the header to include for a module, if it is a known one.
pub fn header_for(module: &str) -> Option<&'static str> {
    IMPORTS.get(module).copied()
}

pub fn binary_operator(op: BinaryOperator) -> &'static str {
    use BinaryOperator::*;
    match op {
        Add => " + ",
        Sub => " - ",
        Mul => " * ",
        Div => " / ",
        Rem => " % ",
        Assign => " = ",
        AddAssign => " += ",
        SubAssign => " -= ",
        MulAssign => " *= ",
        DivAssign => " /= ",
        RemAssign => " %= ",
        Eq => " == ",
        NotEq => " != ",
        Less => " < ",
        Greater => " > ",
        LessEq => " <= ",
        GreaterEq => " >= ",
        And => " && ",
        Or => " || ",
        BitAnd => " & ",
        BitOr => " | ",
        BitXor => " ^ ",
        Arrow => "->",
        StreamOut => " << ",
    }
}

pub fn unary_operator(op: UnaryOperator) -> &'static str {
    use UnaryOperator::*;
    match op {
        Neg => "-",
        Not => "!",
        BitNot => "~",
        PreIncrement | PostIncrement => "++",
        PreDecrement | PostDecrement => "--",
    }
}
