//! Data type definitions

use serde::Serialize;
use std::fmt;

/// The inferred type of an expression or symbol.
///
/// `Undefined` is the "not yet inferred" sentinel; analysis replaces it on
/// every expression it reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Undefined,
    Integer,
    Float,
    String,
    Boolean,
    None,
    Function,
}

impl DataType {
    /// The C++ spelling used for declarations and error messages. Types
    /// with no concrete C++ counterpart fall back to `auto`.
    pub fn cpp_name(self) -> &'static str {
        match self {
            DataType::Integer => "int",
            DataType::String => "string",
            DataType::Float => "double",
            DataType::Boolean => "bool",
            DataType::None => "nullptr_t",
            DataType::Undefined | DataType::Function => "auto",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cpp_name())
    }
}
