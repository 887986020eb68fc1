//! Parser module - recursive descent over the token stream
//!
//! One method per grammar rule, producing the owned AST. Blocks are the
//! token pair `Indent .. Dedent`; stray layout tokens at statement
//! boundaries are skipped so lexer edge cases degrade gracefully instead of
//! derailing the parse. `expect` recovers from a mismatch by consuming one
//! token and proceeding, so the only hard parse failure is a token that
//! cannot begin an expression where an operand is required.
//!
//! `and` and `or` are parsed at the same precedence level, left to right.

mod ast;
mod trace;

pub use ast::*;
pub use trace::*;

use crate::error::TranslateError;
use crate::lexer::{Token, TokenKind};

/// Parse a token stream into a program.
pub fn parse(tokens: Vec<Token>) -> Result<Program, TranslateError> {
    Parser::new(tokens).parse_program()
}

/// Parse and also hand back the state trace, whether or not parsing
/// succeeded.
pub fn parse_with_trace(tokens: Vec<Token>) -> (Result<Program, TranslateError>, ParseTrace) {
    let mut parser = Parser::new(tokens);
    let result = parser.parse_program();
    (result, parser.trace)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    state: ParserState,
    trace: ParseTrace,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", 1));
        }
        Self {
            tokens,
            pos: 0,
            state: ParserState::Start,
            trace: ParseTrace::new(),
        }
    }

    fn parse_program(&mut self) -> Result<Program, TranslateError> {
        self.set_state(ParserState::Start);
        let mut program = Program::default();
        while self.current().kind != TokenKind::Eof {
            if self.skip_layout() {
                continue;
            }
            self.set_state(ParserState::ExpectStatement);
            let stmt = self.parse_statement()?;
            self.set_state(ParserState::EndStatement);
            program.statements.push(stmt);
        }
        Ok(program)
    }

    fn parse_statement(&mut self) -> Result<Stmt, TranslateError> {
        match self.current().kind {
            TokenKind::Def => self.parse_function_def(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Print => self.parse_print(),
            TokenKind::Identifier => {
                if self.peek_kind(1) == TokenKind::Equal {
                    self.parse_assignment()
                } else if self.augmented_op().is_some() && self.peek_kind(2) == TokenKind::Equal {
                    self.parse_augmented_assignment()
                } else {
                    self.parse_expression_statement()
                }
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, TranslateError> {
        let line = self.current().line;
        let expr = self.parse_expression()?;
        Ok(Stmt::new(StmtKind::Expr(expr), line))
    }

    fn parse_function_def(&mut self) -> Result<Stmt, TranslateError> {
        let line = self.current().line;
        self.advance();
        self.set_state(ParserState::InFunctionDef);
        let name = self.expect(TokenKind::Identifier).lexeme;
        self.expect(TokenKind::LParen);
        self.set_state(ParserState::InFunctionParams);
        let mut params = Vec::new();
        while self.current().kind == TokenKind::Identifier {
            params.push(self.bump().lexeme);
            if self.current().kind == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen);
        self.expect(TokenKind::Colon);
        self.set_state(ParserState::InFunctionBody);
        let body = self.parse_block()?;
        Ok(Stmt::new(StmtKind::FunctionDef { name, params, body }, line))
    }

    /// Parse an `if` (or `elif`, which starts the same way) with its chain
    /// of alternatives. Each `elif` becomes a nested `if` in the else arm.
    fn parse_if(&mut self) -> Result<Stmt, TranslateError> {
        let line = self.current().line;
        self.advance();
        self.set_state(ParserState::InIfCondition);
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon);
        self.set_state(ParserState::InIfBody);
        let then_block = self.parse_block()?;

        let else_branch = match self.current().kind {
            TokenKind::Elif => Some(ElseBranch::Elif(Box::new(self.parse_if()?))),
            TokenKind::Else => {
                self.advance();
                self.expect(TokenKind::Colon);
                Some(ElseBranch::Else(self.parse_block()?))
            }
            _ => Option::None,
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_block,
                else_branch,
            },
            line,
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, TranslateError> {
        let line = self.current().line;
        self.advance();
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon);
        let body = self.parse_block()?;
        Ok(Stmt::new(StmtKind::While { condition, body }, line))
    }

    fn parse_for(&mut self) -> Result<Stmt, TranslateError> {
        let line = self.current().line;
        self.advance();
        let iter_tok = self.expect(TokenKind::Identifier);
        let iterator = Expr::new(ExprKind::Identifier(iter_tok.lexeme), iter_tok.line);
        self.expect(TokenKind::In);

        let is_range = self.current().kind == TokenKind::Identifier
            && self.current().lexeme == "range"
            && self.peek_kind(1) == TokenKind::LParen;

        if is_range {
            self.advance();
            self.advance();
            let mut args = Vec::new();
            if self.current().kind != TokenKind::RParen && self.current().kind != TokenKind::Eof {
                loop {
                    args.push(self.parse_expression()?);
                    if self.current().kind == TokenKind::Comma {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen);
            self.expect(TokenKind::Colon);
            let body = self.parse_block()?;

            let mut args = args.into_iter();
            let (start, stop, step) = match (args.next(), args.next(), args.next()) {
                (Some(stop), Option::None, Option::None) => {
                    (number_expr("0", line), stop, number_expr("1", line))
                }
                (Some(start), Some(stop), Option::None) => (start, stop, number_expr("1", line)),
                (Some(start), Some(stop), Some(step)) => (start, stop, step),
                _ => (
                    number_expr("0", line),
                    number_expr("0", line),
                    number_expr("1", line),
                ),
            };

            Ok(Stmt::new(
                StmtKind::ForRange {
                    iterator,
                    start,
                    stop,
                    step,
                    body,
                },
                line,
            ))
        } else {
            let iterable = self.parse_expression()?;
            self.expect(TokenKind::Colon);
            let body = self.parse_block()?;
            Ok(Stmt::new(
                StmtKind::ForGeneric {
                    iterator,
                    iterable,
                    body,
                },
                line,
            ))
        }
    }

    fn parse_try(&mut self) -> Result<Stmt, TranslateError> {
        let line = self.current().line;
        self.advance();
        self.expect(TokenKind::Colon);
        self.set_state(ParserState::InTryBlock);
        let try_block = self.parse_block()?;

        let except_block = if self.current().kind == TokenKind::Except {
            self.advance();
            self.expect(TokenKind::Colon);
            self.set_state(ParserState::InExceptBlock);
            Some(self.parse_block()?)
        } else {
            Option::None
        };

        Ok(Stmt::new(
            StmtKind::TryExcept {
                try_block,
                except_block,
            },
            line,
        ))
    }

    fn parse_return(&mut self) -> Result<Stmt, TranslateError> {
        let line = self.current().line;
        self.advance();
        let value = if starts_expression(self.current().kind) {
            Some(self.parse_expression()?)
        } else {
            Option::None
        };
        Ok(Stmt::new(StmtKind::Return(value), line))
    }

    fn parse_print(&mut self) -> Result<Stmt, TranslateError> {
        let line = self.current().line;
        self.advance();
        let expr = self.parse_expression()?;
        Ok(Stmt::new(StmtKind::Print(expr), line))
    }

    fn parse_assignment(&mut self) -> Result<Stmt, TranslateError> {
        let target_tok = self.bump();
        let line = target_tok.line;
        self.set_state(ParserState::InAssignment);
        self.advance(); // '='
        let value = self.parse_expression()?;
        let target = Expr::new(ExprKind::Identifier(target_tok.lexeme), line);
        Ok(Stmt::new(StmtKind::Assign { target, value }, line))
    }

    /// `x op= e` is sugar for `x = x op e`. The identifier appears twice in
    /// the result, as two independent nodes with their own type slots.
    fn parse_augmented_assignment(&mut self) -> Result<Stmt, TranslateError> {
        let target_tok = self.bump();
        let line = target_tok.line;
        self.set_state(ParserState::InAssignment);
        let op_tok = self.bump();
        let op = match op_tok.kind {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            _ => BinOp::Div,
        };
        self.advance(); // '='
        let rhs = self.parse_expression()?;

        let left = Expr::new(ExprKind::Identifier(target_tok.lexeme.clone()), line);
        let value = Expr::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(rhs),
            },
            line,
        );
        let target = Expr::new(ExprKind::Identifier(target_tok.lexeme), line);
        Ok(Stmt::new(StmtKind::Assign { target, value }, line))
    }

    fn parse_block(&mut self) -> Result<Block, TranslateError> {
        if self.current().kind == TokenKind::Indent {
            self.advance();
        }
        let mut block = Block::default();
        loop {
            match self.current().kind {
                TokenKind::Dedent => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::Indent => {
                    self.advance();
                }
                _ => {
                    self.set_state(ParserState::ExpectStatement);
                    block.statements.push(self.parse_statement()?);
                    self.set_state(ParserState::EndStatement);
                }
            }
        }
        Ok(block)
    }

    // --- Expression grammar, lowest precedence first ---

    fn parse_expression(&mut self) -> Result<Expr, TranslateError> {
        self.set_state(ParserState::InExpression);
        let mut node = self.parse_comparison()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Or => BinOp::Or,
                TokenKind::And => BinOp::And,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            node = binary(node, op, right);
        }
        Ok(node)
    }

    fn parse_comparison(&mut self) -> Result<Expr, TranslateError> {
        let mut node = self.parse_term()?;
        loop {
            self.set_state(ParserState::ExpectOperator);
            let op = match self.current().kind {
                TokenKind::EqEq => BinOp::EqEq,
                TokenKind::Greater => BinOp::Greater,
                TokenKind::GreaterEq => BinOp::GreaterEq,
                TokenKind::Less => BinOp::Less,
                TokenKind::LessEq => BinOp::LessEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            node = binary(node, op, right);
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Expr, TranslateError> {
        self.set_state(ParserState::InTerm);
        let mut node = self.parse_factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            node = binary(node, op, right);
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<Expr, TranslateError> {
        self.set_state(ParserState::InFactor);
        let mut node = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            node = binary(node, op, right);
        }
        Ok(node)
    }

    fn parse_unary(&mut self) -> Result<Expr, TranslateError> {
        let op = match self.current().kind {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_primary(),
        };
        let line = self.current().line;
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            line,
        ))
    }

    fn parse_primary(&mut self) -> Result<Expr, TranslateError> {
        self.set_state(ParserState::ExpectOperand);
        let token = self.current().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                Ok(Expr::new(
                    ExprKind::Number {
                        lexeme: token.lexeme,
                    },
                    token.line,
                ))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::new(ExprKind::Str(token.lexeme), token.line))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::Bool(true), token.line))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::Bool(false), token.line))
            }
            TokenKind::None => {
                self.advance();
                Ok(Expr::new(ExprKind::NoneLit, token.line))
            }
            TokenKind::Identifier => {
                self.advance();
                if self.current().kind == TokenKind::LParen {
                    self.parse_call(token)
                } else {
                    Ok(Expr::new(ExprKind::Identifier(token.lexeme), token.line))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen);
                Ok(expr)
            }
            TokenKind::Illegal => Err(TranslateError::Parse {
                line: token.line,
                message: format!("illegal character '{}'", token.lexeme),
            }),
            kind => Err(TranslateError::Parse {
                line: token.line,
                message: format!("expected an expression, found {kind:?}"),
            }),
        }
    }

    fn parse_call(&mut self, name_tok: Token) -> Result<Expr, TranslateError> {
        self.set_state(ParserState::InFunctionCall);
        self.advance(); // '('
        let mut args = Vec::new();
        if self.current().kind != TokenKind::RParen && self.current().kind != TokenKind::Eof {
            loop {
                args.push(self.parse_expression()?);
                if self.current().kind == TokenKind::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen);
        Ok(Expr::new(
            ExprKind::Call {
                name: name_tok.lexeme,
                args,
            },
            name_tok.line,
        ))
    }

    // --- Token cursor ---

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) {
        if self.current().kind != TokenKind::Eof {
            self.pos += 1;
        }
    }

    /// Consume and return the current token.
    fn bump(&mut self) -> Token {
        let token = self.current().clone();
        self.advance();
        token
    }

    /// Arithmetic operator of a `x op= e` statement, if the next token is
    /// one. Paired with a lookahead for `=`, since the compound spellings
    /// are two tokens.
    fn augmented_op(&self) -> Option<BinOp> {
        match self.peek_kind(1) {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            _ => Option::None,
        }
    }

    /// Consume one token, whatever it is. When the token matches `kind` this
    /// is an ordinary match; when it does not, the parse continues as if it
    /// had, which keeps later diagnostics flowing at the cost of precision.
    fn expect(&mut self, _kind: TokenKind) -> Token {
        self.bump()
    }

    /// Skip one stray layout token at a statement boundary. Returns true if
    /// something was skipped.
    fn skip_layout(&mut self) -> bool {
        if matches!(
            self.current().kind,
            TokenKind::Indent | TokenKind::Dedent
        ) {
            self.advance();
            return true;
        }
        false
    }

    fn set_state(&mut self, next: ParserState) {
        let token = self.current().clone();
        self.trace.record(self.state, next, &token);
        self.state = next;
    }
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let line = left.line;
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        line,
    )
}

fn number_expr(lexeme: &str, line: usize) -> Expr {
    Expr::new(
        ExprKind::Number {
            lexeme: lexeme.to_string(),
        },
        line,
    )
}

/// Token kinds that can begin an expression; used to decide whether a
/// `return` carries a value.
fn starts_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Number
            | TokenKind::Str
            | TokenKind::True
            | TokenKind::False
            | TokenKind::None
            | TokenKind::Identifier
            | TokenKind::LParen
            | TokenKind::Not
            | TokenKind::Minus
    )
}
