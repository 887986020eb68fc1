//! Semantic analysis module
//!
//! A single pass over the AST in source order. It populates the scoped
//! symbol table, writes a `DataType` into every expression node it reaches,
//! and enforces the typing discipline: assignment compatibility with
//! int-to-float promotion, string arithmetic restricted to `+`, integer loop
//! bounds, and consistent function return types.
//!
//! Scopes are pushed for function bodies and for-loop bodies only;
//! conditionals and `while` loops share their enclosing scope.

mod builtins;
mod scope;
mod types;

pub use builtins::*;
pub use scope::*;
pub use types::*;

use crate::error::TranslateError;
use crate::parser::{BinOp, Block, ElseBranch, Expr, ExprKind, Program, Stmt, StmtKind, UnaryOp};

/// Analyze a program in place, returning the symbol table for the
/// translator (and for callers that display it).
pub fn analyze(program: &mut Program) -> Result<SymbolTable, TranslateError> {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.analyze_program(program)?;
    Ok(analyzer.symbols)
}

pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    /// Names of the functions whose bodies are currently being walked,
    /// innermost last. `return` binds to the innermost one.
    function_stack: Vec<String>,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        for (name, ret) in BUILTINS.iter() {
            symbols.define(name, DataType::Function);
            if *ret != DataType::Undefined {
                if let Some(sym) = symbols.lookup_mut(name) {
                    sym.function_return_type = *ret;
                }
            }
        }
        Self {
            symbols,
            function_stack: Vec::new(),
        }
    }

    pub fn analyze_program(&mut self, program: &mut Program) -> Result<(), TranslateError> {
        for stmt in &mut program.statements {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_block(&mut self, block: &mut Block) -> Result<(), TranslateError> {
        for stmt in &mut block.statements {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), TranslateError> {
        let line = stmt.line;
        match &mut stmt.kind {
            StmtKind::Assign { target, value } => {
                let ty = self.infer_expr(value)?;
                if let ExprKind::Identifier(name) = &target.kind {
                    let bound = self.symbols.lookup(name).map(|sym| sym.ty);
                    match bound {
                        Some(bound) => {
                            let promoted = bound == DataType::Float && ty == DataType::Integer;
                            if bound != ty && !promoted {
                                return Err(TranslateError::AssignmentMismatch {
                                    name: name.clone(),
                                    expected: bound,
                                    found: ty,
                                    line,
                                });
                            }
                        }
                        Option::None => {
                            self.symbols.define(name, ty);
                        }
                    }
                }
                target.determined_type = ty;
                stmt.determined_type = ty;
            }

            StmtKind::FunctionDef { name, params, body } => {
                if !self.symbols.define(name, DataType::Function) {
                    return Err(TranslateError::FunctionRedefinition {
                        name: name.clone(),
                        line,
                    });
                }
                self.function_stack.push(name.clone());
                self.symbols.enter_scope();
                // Parameter types are not inferred from call sites; every
                // parameter is an integer.
                for param in params.iter() {
                    self.symbols.define(param, DataType::Integer);
                }
                self.visit_block(body)?;
                self.symbols.leave_scope();
                self.function_stack.pop();
            }

            StmtKind::ForRange {
                iterator,
                start,
                stop,
                step,
                body,
            } => {
                self.symbols.enter_scope();
                let start_ty = self.infer_expr(start)?;
                if start_ty != DataType::Integer {
                    return Err(TranslateError::LoopBound {
                        bound: "start",
                        line: start.line,
                    });
                }
                let stop_ty = self.infer_expr(stop)?;
                if stop_ty != DataType::Integer {
                    return Err(TranslateError::LoopBound {
                        bound: "stop",
                        line: stop.line,
                    });
                }
                // The step is typed like any expression but not constrained.
                self.infer_expr(step)?;

                iterator.determined_type = DataType::Integer;
                if let ExprKind::Identifier(name) = &iterator.kind {
                    self.symbols.define(name, DataType::Integer);
                }
                self.visit_block(body)?;
                self.symbols.leave_scope();
            }

            StmtKind::ForGeneric {
                iterator,
                iterable,
                body,
            } => {
                self.symbols.enter_scope();
                let iter_ty = self.infer_expr(iterable)?;
                if let ExprKind::Identifier(name) = &iterator.kind {
                    if iter_ty == DataType::String {
                        iterator.determined_type = DataType::String;
                        self.symbols.define(name, DataType::String);
                    } else {
                        // Nothing useful is known about the element type.
                        self.symbols.define(name, DataType::Undefined);
                    }
                }
                self.visit_block(body)?;
                self.symbols.leave_scope();
            }

            StmtKind::If {
                condition,
                then_block,
                else_branch,
            } => {
                self.infer_expr(condition)?;
                self.visit_block(then_block)?;
                match else_branch {
                    Some(ElseBranch::Else(block)) => self.visit_block(block)?,
                    Some(ElseBranch::Elif(nested)) => self.visit_stmt(nested)?,
                    Option::None => {}
                }
            }

            StmtKind::While { condition, body } => {
                self.infer_expr(condition)?;
                self.visit_block(body)?;
            }

            StmtKind::TryExcept {
                try_block,
                except_block,
            } => {
                self.visit_block(try_block)?;
                if let Some(block) = except_block {
                    self.visit_block(block)?;
                }
            }

            StmtKind::Return(value) => {
                let func_name = match self.function_stack.last() {
                    Some(name) => name.clone(),
                    Option::None => {
                        return Err(TranslateError::ReturnOutsideFunction { line });
                    }
                };
                let ty = match value {
                    Some(expr) => self.infer_expr(expr)?,
                    Option::None => DataType::None,
                };
                if let Some(sym) = self.symbols.lookup_mut(&func_name) {
                    if sym.function_return_type == DataType::Undefined {
                        sym.function_return_type = ty;
                    } else if sym.function_return_type != ty {
                        // Integer returns into a float-typed function are
                        // promoted; the function's type is never widened the
                        // other way.
                        let promoted = sym.function_return_type == DataType::Float
                            && ty == DataType::Integer;
                        if !promoted {
                            return Err(TranslateError::ReturnTypeMismatch {
                                name: func_name,
                                expected: sym.function_return_type,
                                found: ty,
                                line,
                            });
                        }
                    }
                }
            }

            StmtKind::Print(expr) => {
                self.infer_expr(expr)?;
            }

            StmtKind::Expr(expr) => {
                self.infer_expr(expr)?;
            }
        }
        Ok(())
    }

    /// Infer and record the type of an expression. Each node is visited
    /// exactly once, so the write to `determined_type` is the only one.
    fn infer_expr(&mut self, expr: &mut Expr) -> Result<DataType, TranslateError> {
        let line = expr.line;
        let ty = match &mut expr.kind {
            ExprKind::Number { lexeme } => {
                if lexeme.contains('.') {
                    DataType::Float
                } else {
                    DataType::Integer
                }
            }
            ExprKind::Str(_) => DataType::String,
            ExprKind::Bool(_) => DataType::Boolean,
            ExprKind::NoneLit => DataType::None,

            ExprKind::Identifier(name) => match self.symbols.lookup(name) {
                Some(sym) => sym.ty,
                Option::None => {
                    return Err(TranslateError::UndefinedVariable {
                        name: name.clone(),
                        line,
                    });
                }
            },

            ExprKind::Unary { op, operand } => {
                let operand_ty = self.infer_expr(operand)?;
                match op {
                    UnaryOp::Not => DataType::Boolean,
                    UnaryOp::Neg => operand_ty,
                }
            }

            ExprKind::Binary { left, op, right } => {
                let op = *op;
                let left_ty = self.infer_expr(left)?;
                let right_ty = self.infer_expr(right)?;
                if op.is_arithmetic() {
                    if left_ty == DataType::String || right_ty == DataType::String {
                        if op == BinOp::Add {
                            DataType::String
                        } else {
                            return Err(TranslateError::StringArithmetic {
                                op: op.lexeme(),
                                line,
                            });
                        }
                    } else if left_ty == DataType::Float || right_ty == DataType::Float {
                        DataType::Float
                    } else {
                        DataType::Integer
                    }
                } else {
                    // Comparisons and logical operators both yield booleans.
                    DataType::Boolean
                }
            }

            ExprKind::Call { name, args } => {
                let callee = match self.symbols.lookup(name) {
                    Some(sym) => sym.clone(),
                    Option::None => {
                        return Err(TranslateError::UndefinedFunction {
                            name: name.clone(),
                            line,
                        });
                    }
                };
                if callee.ty != DataType::Function {
                    return Err(TranslateError::NotCallable {
                        name: name.clone(),
                        line,
                    });
                }
                // Arguments are typed but not checked against parameters.
                for arg in args.iter_mut() {
                    self.infer_expr(arg)?;
                }
                if callee.function_return_type != DataType::Undefined {
                    callee.function_return_type
                } else {
                    DataType::None
                }
            }
        };
        expr.determined_type = ty;
        Ok(ty)
    }
}

#[cfg(test)]
mod tests;
