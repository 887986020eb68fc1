//! semantic module tests

use super::*;
use crate::lexer::tokenize;
use crate::parser::parse;
use indoc::indoc;

fn analyze_source(source: &str) -> (Program, SymbolTable) {
    let tokens = tokenize(source).expect("lexing should succeed");
    let mut program = parse(tokens).expect("parsing should succeed");
    let symbols = analyze(&mut program).expect("analysis should succeed");
    (program, symbols)
}

fn analyze_err(source: &str) -> TranslateError {
    let tokens = tokenize(source).expect("lexing should succeed");
    let mut program = parse(tokens).expect("parsing should succeed");
    analyze(&mut program).expect_err("expected semantic failure")
}

/// Walk every expression in the program, asserting the predicate.
fn assert_all_exprs(program: &Program, pred: &dyn Fn(&Expr)) {
    fn walk_expr(expr: &Expr, pred: &dyn Fn(&Expr)) {
        pred(expr);
        match &expr.kind {
            ExprKind::Unary { operand, .. } => walk_expr(operand, pred),
            ExprKind::Binary { left, right, .. } => {
                walk_expr(left, pred);
                walk_expr(right, pred);
            }
            ExprKind::Call { args, .. } => {
                for arg in args {
                    walk_expr(arg, pred);
                }
            }
            _ => {}
        }
    }
    fn walk_block(block: &Block, pred: &dyn Fn(&Expr)) {
        for stmt in &block.statements {
            walk_stmt(stmt, pred);
        }
    }
    fn walk_stmt(stmt: &Stmt, pred: &dyn Fn(&Expr)) {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                walk_expr(target, pred);
                walk_expr(value, pred);
            }
            StmtKind::Print(expr) | StmtKind::Expr(expr) => walk_expr(expr, pred),
            StmtKind::Return(value) => {
                if let Some(expr) = value {
                    walk_expr(expr, pred);
                }
            }
            StmtKind::If {
                condition,
                then_block,
                else_branch,
            } => {
                walk_expr(condition, pred);
                walk_block(then_block, pred);
                match else_branch {
                    Some(ElseBranch::Else(block)) => walk_block(block, pred),
                    Some(ElseBranch::Elif(nested)) => walk_stmt(nested, pred),
                    None => {}
                }
            }
            StmtKind::While { condition, body } => {
                walk_expr(condition, pred);
                walk_block(body, pred);
            }
            StmtKind::ForRange {
                iterator,
                start,
                stop,
                step,
                body,
            } => {
                walk_expr(iterator, pred);
                walk_expr(start, pred);
                walk_expr(stop, pred);
                walk_expr(step, pred);
                walk_block(body, pred);
            }
            StmtKind::ForGeneric {
                iterator,
                iterable,
                body,
            } => {
                walk_expr(iterator, pred);
                walk_expr(iterable, pred);
                walk_block(body, pred);
            }
            StmtKind::TryExcept {
                try_block,
                except_block,
            } => {
                walk_block(try_block, pred);
                if let Some(block) = except_block {
                    walk_block(block, pred);
                }
            }
            StmtKind::FunctionDef { body, .. } => walk_block(body, pred),
        }
    }
    for stmt in &program.statements {
        walk_stmt(stmt, pred);
    }
}

#[test]
fn test_integer_arithmetic_types_integer() {
    let (program, symbols) = analyze_source("x = 2 + 3\ny = x * 4\n");
    assert_eq!(symbols.lookup("x").unwrap().ty, DataType::Integer);
    assert_eq!(symbols.lookup("y").unwrap().ty, DataType::Integer);
    assert_all_exprs(&program, &|expr| {
        assert_eq!(expr.determined_type, DataType::Integer, "{expr:?}");
    });
}

#[test]
fn test_float_operand_promotes_result() {
    let (program, _) = analyze_source("x = 1 + 2.5\n");
    let StmtKind::Assign { value, .. } = &program.statements[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.determined_type, DataType::Float);
}

#[test]
fn test_float_bound_accepts_integer_assignment() {
    let (program, symbols) = analyze_source("total = 0.0\ntotal = total + 5\n");
    assert_eq!(symbols.lookup("total").unwrap().ty, DataType::Float);
    let StmtKind::Assign { value, .. } = &program.statements[1].kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.determined_type, DataType::Float);
}

#[test]
fn test_integer_bound_rejects_string_assignment() {
    let err = analyze_err("n = 1\nn = \"s\"\n");
    let msg = err.to_string();
    assert!(msg.contains("line 2"));
    assert!(msg.contains('n'));
    assert!(matches!(err, TranslateError::AssignmentMismatch { .. }));
}

#[test]
fn test_string_concatenation_is_string() {
    let (program, symbols) = analyze_source("a = \"hi\"\nb = a + \"!\"\n");
    assert_eq!(symbols.lookup("a").unwrap().ty, DataType::String);
    assert_eq!(symbols.lookup("b").unwrap().ty, DataType::String);
    let StmtKind::Assign { value, .. } = &program.statements[1].kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.determined_type, DataType::String);
}

#[test]
fn test_string_subtraction_is_an_error() {
    let err = analyze_err("s = \"x\"\nn = s - 1\n");
    assert!(matches!(err, TranslateError::StringArithmetic { op: "-", .. }));
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_comparison_and_logical_type_boolean() {
    let (program, _) = analyze_source("b = 1 < 2 and 3 >= 1\n");
    let StmtKind::Assign { value, .. } = &program.statements[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.determined_type, DataType::Boolean);
}

#[test]
fn test_unary_not_is_boolean_and_neg_keeps_type() {
    let (program, _) = analyze_source("a = not True\nb = -2.5\n");
    let StmtKind::Assign { value, .. } = &program.statements[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.determined_type, DataType::Boolean);
    let StmtKind::Assign { value, .. } = &program.statements[1].kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.determined_type, DataType::Float);
}

#[test]
fn test_undefined_variable_is_an_error() {
    let err = analyze_err("print(z)");
    assert!(matches!(err, TranslateError::UndefinedVariable { .. }));
    assert!(err.to_string().contains("line 1"));
}

#[test]
fn test_undefined_function_is_an_error() {
    let err = analyze_err("foo()");
    assert!(matches!(err, TranslateError::UndefinedFunction { .. }));
}

#[test]
fn test_calling_a_variable_is_an_error() {
    let err = analyze_err("x = 1\nx()\n");
    assert!(matches!(err, TranslateError::NotCallable { .. }));
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_function_return_type_inferred_from_first_return() {
    let source = indoc! {"
        def double(n):
            return n * 2
    "};
    let (_, symbols) = analyze_source(source);
    let sym = symbols.lookup("double").unwrap();
    assert_eq!(sym.ty, DataType::Function);
    assert_eq!(sym.function_return_type, DataType::Integer);
}

#[test]
fn test_call_result_uses_function_return_type() {
    let source = indoc! {"
        def double(n):
            return n * 2
        x = double(4)
    "};
    let (_, symbols) = analyze_source(source);
    assert_eq!(symbols.lookup("x").unwrap().ty, DataType::Integer);
}

#[test]
fn test_parameters_default_to_integer() {
    let source = indoc! {"
        def ident(a):
            return a
    "};
    let (_, symbols) = analyze_source(source);
    assert_eq!(
        symbols.lookup("ident").unwrap().function_return_type,
        DataType::Integer
    );
}

#[test]
fn test_inconsistent_return_types_are_an_error() {
    let source = indoc! {"
        def f(n):
            if n > 0:
                return 1
            return \"s\"
    "};
    let err = {
        let tokens = tokenize(source).unwrap();
        let mut program = parse(tokens).unwrap();
        analyze(&mut program).expect_err("expected return type mismatch")
    };
    assert!(matches!(err, TranslateError::ReturnTypeMismatch { .. }));
}

#[test]
fn test_integer_return_into_float_function_is_promoted() {
    let source = indoc! {"
        def f(n):
            if n > 0:
                return 1.5
            return 1
    "};
    let (_, symbols) = analyze_source(source);
    assert_eq!(
        symbols.lookup("f").unwrap().function_return_type,
        DataType::Float
    );
}

#[test]
fn test_integer_return_type_is_not_widened_by_float() {
    let source = indoc! {"
        def f(n):
            if n > 0:
                return 1
            return 1.5
    "};
    let tokens = tokenize(source).unwrap();
    let mut program = parse(tokens).unwrap();
    let err = analyze(&mut program).expect_err("expected mismatch");
    assert!(matches!(err, TranslateError::ReturnTypeMismatch { .. }));
}

#[test]
fn test_return_outside_function_is_an_error() {
    let err = analyze_err("return 1");
    assert!(matches!(err, TranslateError::ReturnOutsideFunction { .. }));
}

#[test]
fn test_function_redefinition_is_an_error() {
    let source = indoc! {"
        def f():
            return 1
        def f():
            return 2
    "};
    let tokens = tokenize(source).unwrap();
    let mut program = parse(tokens).unwrap();
    let err = analyze(&mut program).expect_err("expected redefinition error");
    assert!(matches!(err, TranslateError::FunctionRedefinition { .. }));
}

#[test]
fn test_variable_rebinding_with_same_type_is_fine() {
    let (_, symbols) = analyze_source("x = 1\nx = 2\n");
    assert_eq!(symbols.lookup("x").unwrap().ty, DataType::Integer);
}

#[test]
fn test_range_loop_scopes_iterator() {
    let source = indoc! {"
        for i in range(3):
            x = i
        print(i)
    "};
    let err = {
        let tokens = tokenize(source).unwrap();
        let mut program = parse(tokens).unwrap();
        analyze(&mut program).expect_err("iterator should not escape the loop")
    };
    assert!(matches!(err, TranslateError::UndefinedVariable { .. }));
}

#[test]
fn test_conditionals_do_not_scope() {
    let source = indoc! {"
        if True:
            x = 1
        print(x)
    "};
    let (_, symbols) = analyze_source(source);
    assert_eq!(symbols.lookup("x").unwrap().ty, DataType::Integer);
}

#[test]
fn test_range_bounds_must_be_integers() {
    let source = indoc! {"
        for i in range(1.5):
            print(i)
    "};
    let tokens = tokenize(source).unwrap();
    let mut program = parse(tokens).unwrap();
    let err = analyze(&mut program).expect_err("expected loop bound error");
    assert!(matches!(err, TranslateError::LoopBound { bound: "stop", .. }));
}

#[test]
fn test_generic_loop_over_string_types_iterator_string() {
    let source = indoc! {"
        s = \"abc\"
        for c in s:
            msg = c + \"!\"
    "};
    let (program, _) = analyze_source(source);
    let StmtKind::ForGeneric { iterator, .. } = &program.statements[1].kind else {
        panic!("expected generic loop");
    };
    assert_eq!(iterator.determined_type, DataType::String);
}

#[test]
fn test_builtin_calls_have_return_types() {
    let source = indoc! {"
        name = input()
        n = int(name)
        f = float(n)
        s = str(f)
    "};
    let (_, symbols) = analyze_source(source);
    assert_eq!(symbols.lookup("name").unwrap().ty, DataType::String);
    assert_eq!(symbols.lookup("n").unwrap().ty, DataType::Integer);
    assert_eq!(symbols.lookup("f").unwrap().ty, DataType::Float);
    assert_eq!(symbols.lookup("s").unwrap().ty, DataType::String);
}

#[test]
fn test_no_expression_is_left_undefined() {
    let source = indoc! {"
        def sum_to(n):
            total = 0
            for i in range(1, n, 1):
                total = total + i
            return total
        r = sum_to(10)
        if r > 20:
            print(r)
        else:
            print(0)
    "};
    let (program, _) = analyze_source(source);
    assert_all_exprs(&program, &|expr| {
        assert_ne!(expr.determined_type, DataType::Undefined, "{expr:?}");
    });
}

#[test]
fn test_assignment_node_is_annotated() {
    let (program, _) = analyze_source("x = 1.5\n");
    let stmt = &program.statements[0];
    assert_eq!(stmt.determined_type, DataType::Float);
    let StmtKind::Assign { target, .. } = &stmt.kind else {
        panic!("expected assignment");
    };
    assert_eq!(target.determined_type, DataType::Float);
}

#[test]
fn test_try_except_does_not_scope() {
    let source = indoc! {"
        try:
            x = 1
        except:
            y = 2
        x = 3
    "};
    let (_, symbols) = analyze_source(source);
    assert_eq!(symbols.lookup("x").unwrap().ty, DataType::Integer);
    assert_eq!(symbols.lookup("y").unwrap().ty, DataType::Integer);
}
