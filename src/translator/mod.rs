//! Translator module - C++ code generation
//!
//! Walks the type-annotated AST and assembles a complete translation unit:
//! a fixed preamble, the `safe_divide` helper, every function definition in
//! source order, then a `main()` holding the remaining top-level statements.
//! Division always routes through `safe_divide` so a zero denominator raises
//! a catchable exception instead of crashing the produced program.

use std::collections::HashSet;

use crate::parser::{BinOp, Block, ElseBranch, Expr, ExprKind, Program, Stmt, StmtKind, UnaryOp};
use crate::semantic::{DataType, SymbolTable};

/// Emit C++ source for an analyzed program.
pub fn translate(program: &Program, symbols: &SymbolTable) -> String {
    let mut translator = CppTranslator::new(symbols);
    translator.emit_program(program)
}

pub struct CppTranslator<'a> {
    symbols: &'a SymbolTable,
    /// Names already declared in the current C++ scope. Assignments to a
    /// name outside this set emit a typed declaration; later assignments
    /// emit plain stores.
    declared: HashSet<String>,
    indent: usize,
}

impl<'a> CppTranslator<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            declared: HashSet::new(),
            indent: 0,
        }
    }

    pub fn emit_program(&mut self, program: &Program) -> String {
        self.declared.clear();

        let mut out = String::new();
        out.push_str("#include <iostream>\n");
        out.push_str("#include <string>\n");
        out.push_str("#include <vector>\n");
        out.push_str("#include <cmath>\n");
        out.push_str("#include <stdexcept>\n");
        out.push_str("using namespace std;\n\n");

        out.push_str("// Helper: safe division so a zero denominator raises instead of crashing\n");
        out.push_str("template <typename T, typename U>\n");
        out.push_str("double safe_divide(T a, U b) {\n");
        out.push_str("    if (b == 0) throw runtime_error(\"Division by zero error\");\n");
        out.push_str("    return (double)a / (double)b;\n");
        out.push_str("}\n\n");

        let mut functions = String::new();
        let mut main_body = String::new();

        for stmt in &program.statements {
            if matches!(stmt.kind, StmtKind::FunctionDef { .. }) {
                self.indent = 0;
                functions.push_str(&self.emit_stmt(stmt));
                functions.push('\n');
            } else {
                self.indent = 1;
                let code = self.emit_stmt(stmt);
                main_body.push_str("    ");
                main_body.push_str(&code);
                if !code.ends_with('}') {
                    main_body.push(';');
                }
                main_body.push('\n');
            }
        }

        out.push_str(&functions);
        out.push_str("int main() {\n");
        out.push_str(&main_body);
        out.push_str("\n    return 0;\n");
        out.push_str("}\n");
        out
    }

    /// Emit one statement without a trailing semicolon; callers append one
    /// unless the statement ends in a closing brace.
    fn emit_stmt(&mut self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                let name = target.ident_name().unwrap_or("").to_string();
                let expr = self.emit_expr(value);
                if self.declared.contains(&name) {
                    format!("{name} = {expr}")
                } else {
                    self.declared.insert(name.clone());
                    let ty = value.determined_type.cpp_name();
                    format!("{ty} {name} = {expr}")
                }
            }

            StmtKind::Print(expr) => {
                format!("cout << {} << endl", self.emit_expr(expr))
            }

            StmtKind::Return(value) => match value {
                Some(expr) => format!("return {}", self.emit_expr(expr)),
                None => "return".to_string(),
            },

            StmtKind::Expr(expr) => self.emit_expr(expr),

            StmtKind::If {
                condition,
                then_block,
                else_branch,
            } => {
                let cond = self.emit_expr(condition);
                let body = self.emit_block(then_block);
                let mut out = format!("if ({cond}) {{\n{body}{}}}", self.pad());
                match else_branch {
                    Some(ElseBranch::Elif(nested)) => {
                        out.push_str(" else ");
                        out.push_str(&self.emit_stmt(nested));
                    }
                    Some(ElseBranch::Else(block)) => {
                        let body = self.emit_block(block);
                        out.push_str(&format!(" else {{\n{body}{}}}", self.pad()));
                    }
                    None => {}
                }
                out
            }

            StmtKind::While { condition, body } => {
                let cond = self.emit_expr(condition);
                let body = self.emit_block(body);
                format!("while ({cond}) {{\n{body}{}}}", self.pad())
            }

            StmtKind::ForRange {
                iterator,
                start,
                stop,
                step,
                body,
            } => {
                let name = iterator.ident_name().unwrap_or("").to_string();
                let start = self.emit_expr(start);
                let stop = self.emit_expr(stop);
                let step = self.emit_expr(step);
                let step_clause = if step == "1" {
                    format!("{name}++")
                } else {
                    format!("{name} += {step}")
                };
                let body = self.emit_block(body);
                format!(
                    "for (int {name} = {start}; {name} < {stop}; {step_clause}) {{\n{body}{}}}",
                    self.pad()
                )
            }

            StmtKind::ForGeneric {
                iterator,
                iterable,
                body,
            } => {
                let name = iterator.ident_name().unwrap_or("").to_string();
                let mut source = self.emit_expr(iterable);
                // Bare string literals need a string object to iterate over.
                if source.starts_with('"') {
                    source = format!("string({source})");
                }
                let body = self.emit_block(body);
                format!(
                    "for (auto {name} : {source}) {{\n{body}{}}}",
                    self.pad()
                )
            }

            StmtKind::TryExcept {
                try_block,
                except_block,
            } => {
                let try_body = self.emit_block(try_block);
                let except_body = match except_block {
                    Some(block) => self.emit_block(block),
                    None => {
                        let pad = "    ".repeat(self.indent + 1);
                        format!("{pad}cout << \"An error occurred.\" << endl;\n")
                    }
                };
                format!(
                    "try {{\n{try_body}{pad}}} catch (...) {{\n{except_body}{pad}}}",
                    pad = self.pad()
                )
            }

            StmtKind::FunctionDef { name, params, body } => {
                // Function bodies get a fresh C++ scope: remember the outer
                // declarations, start over with just the parameters.
                let outer = std::mem::take(&mut self.declared);

                let return_type = match self.symbols.lookup(name) {
                    Some(sym) if sym.function_return_type != DataType::Undefined => {
                        sym.function_return_type.cpp_name()
                    }
                    _ => "void",
                };

                let mut param_list = String::new();
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        param_list.push_str(", ");
                    }
                    param_list.push_str("int ");
                    param_list.push_str(param);
                    self.declared.insert(param.clone());
                }

                let body = self.emit_block(body);
                self.declared = outer;

                format!("{return_type} {name}({param_list}) {{\n{body}}}\n")
            }
        }
    }

    fn emit_block(&mut self, block: &Block) -> String {
        self.indent += 1;
        let mut out = String::new();
        for stmt in &block.statements {
            let code = self.emit_stmt(stmt);
            out.push_str(&self.pad());
            out.push_str(&code);
            if !code.ends_with('}') {
                out.push(';');
            }
            out.push('\n');
        }
        self.indent -= 1;
        out
    }

    fn emit_expr(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Number { lexeme } => lexeme.clone(),
            ExprKind::Str(content) => format!("\"{}\"", escape_cpp_string(content)),
            ExprKind::Bool(true) => "true".to_string(),
            ExprKind::Bool(false) => "false".to_string(),
            ExprKind::NoneLit => "nullptr".to_string(),
            ExprKind::Identifier(name) => name.clone(),

            ExprKind::Unary { op, operand } => {
                let operand = self.emit_expr(operand);
                let op = match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Neg => "-",
                };
                format!("({op}{operand})")
            }

            ExprKind::Binary { left, op, right } => {
                let left = self.emit_expr(left);
                let right = self.emit_expr(right);
                match op {
                    BinOp::Div => format!("safe_divide({left}, {right})"),
                    BinOp::And => format!("({left} && {right})"),
                    BinOp::Or => format!("({left} || {right})"),
                    _ => format!("({left} {} {right})", op.lexeme()),
                }
            }

            ExprKind::Call { name, args } => self.emit_call(name, args),
        }
    }

    fn emit_call(&mut self, name: &str, args: &[Expr]) -> String {
        // Cast built-ins map to C++ conversions; with no argument they
        // collapse to the type's zero value.
        match name {
            "int" => {
                return match args.first() {
                    Some(arg) => format!("(int)({})", self.emit_expr(arg)),
                    None => "0".to_string(),
                };
            }
            "float" => {
                return match args.first() {
                    Some(arg) => format!("(double)({})", self.emit_expr(arg)),
                    None => "0.0".to_string(),
                };
            }
            "str" => {
                return match args.first() {
                    Some(arg) => format!("to_string({})", self.emit_expr(arg)),
                    None => "\"\"".to_string(),
                };
            }
            _ => {}
        }

        let args: Vec<String> = args.iter().map(|arg| self.emit_expr(arg)).collect();
        format!("{name}({})", args.join(", "))
    }

    fn pad(&self) -> String {
        "    ".repeat(self.indent)
    }
}

/// Re-escape a resolved string literal so the emitted C++ parses.
fn escape_cpp_string(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}
