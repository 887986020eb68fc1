//! Built-in functions seeded into the global scope

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::DataType;

/// Built-in function name -> return type. `Undefined` means the built-in
/// has no useful return type of its own; calls to it type as `None`.
pub static BUILTINS: Lazy<HashMap<&'static str, DataType>> = Lazy::new(|| {
    HashMap::from([
        ("print", DataType::Undefined),
        ("input", DataType::String),
        ("int", DataType::Integer),
        ("float", DataType::Float),
        ("str", DataType::String),
        ("range", DataType::Undefined),
    ])
});
