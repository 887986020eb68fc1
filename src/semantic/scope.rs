//! Symbol table - a stack of lexical scope frames

use std::collections::HashMap;

use super::DataType;

/// A named entity: variable, function, or built-in.
///
/// `function_return_type` is meaningful only when `ty == Function`. It
/// starts `Undefined` and is fixed by the first `return` encountered in the
/// function body.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: DataType,
    pub function_return_type: DataType,
}

impl Symbol {
    pub fn new(name: &str, ty: DataType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            function_return_type: DataType::Undefined,
        }
    }
}

/// One lexical scope frame.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
}

impl Scope {
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }
}

/// Stack of scope frames. Frame 0 is the global scope; frames are pushed
/// around function bodies and for-loop bodies.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn leave_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the innermost frame. Returns false if the name is
    /// already bound in that frame (the caller decides whether that is an
    /// error).
    pub fn define(&mut self, name: &str, ty: DataType) -> bool {
        match self.scopes.last_mut() {
            Some(scope) if !scope.contains(name) => {
                scope
                    .symbols
                    .insert(name.to_string(), Symbol::new(name, ty));
                true
            }
            _ => false,
        }
    }

    /// Find a symbol, searching from the innermost frame outward.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.symbols.get_mut(name))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn frames(&self) -> &[Scope] {
        &self.scopes
    }
}
