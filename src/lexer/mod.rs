//! Lexer module - tokenization with layout analysis
//!
//! Converts source text into a flat token sequence. Blocks in the source are
//! expressed by indentation; the lexer rewrites them into synthetic `Indent`
//! and `Dedent` tokens so the parser can treat the input as brace-structured.
//! Indentation width counts a space as 1 and a tab as 4. Blank lines and
//! comment-only lines never change the block structure.

mod token;

pub use token::*;

use crate::error::TranslateError;

/// Tokenize source code. The returned sequence always ends with `Eof` and
/// has balanced `Indent`/`Dedent` pairs. The only failure mode is an
/// indentation width that matches no enclosing block.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TranslateError> {
    let mut lexer = Lexer::new(source);
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    indent_stack: Vec<usize>,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            indent_stack: vec![0],
            tokens: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<(), TranslateError> {
        loop {
            if !self.handle_line_start()? {
                break;
            }
            self.lex_line();
        }

        // Close every block still open at end of input.
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push(TokenKind::Dedent, "");
        }
        self.push(TokenKind::Eof, "");
        Ok(())
    }

    /// Measure the indentation of the next line and adjust the block
    /// structure. Returns false once the input is exhausted. Lines that are
    /// blank or hold only a comment are consumed here without touching the
    /// indent stack.
    fn handle_line_start(&mut self) -> Result<bool, TranslateError> {
        loop {
            let mut width = 0usize;
            while let Some(c) = self.peek() {
                match c {
                    ' ' => width += 1,
                    '\t' => width += 4,
                    '\r' => {}
                    _ => break,
                }
                self.advance();
            }

            match self.peek() {
                Option::None => return Ok(false),
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    continue;
                }
                Some('#') => {
                    self.skip_comment();
                    continue;
                }
                Some(_) => {
                    self.apply_indent(width)?;
                    return Ok(true);
                }
            }
        }
    }

    fn apply_indent(&mut self, width: usize) -> Result<(), TranslateError> {
        let current = self.current_indent();
        if width > current {
            self.indent_stack.push(width);
            self.push(TokenKind::Indent, "");
            return Ok(());
        }
        if width < current {
            while self.indent_stack.len() > 1 && self.current_indent() > width {
                self.indent_stack.pop();
                self.push(TokenKind::Dedent, "");
            }
            if self.current_indent() != width {
                return Err(TranslateError::Indentation { line: self.line });
            }
        }
        Ok(())
    }

    fn current_indent(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    /// Lex tokens until the physical line ends.
    fn lex_line(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    self.advance();
                    self.line += 1;
                    return;
                }
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '#' => {
                    self.skip_comment();
                    return;
                }
                '"' | '\'' => self.read_string(c),
                c if c.is_ascii_digit() => self.read_number(),
                c if c.is_alphabetic() || c == '_' => self.read_identifier(),
                _ => self.read_operator(),
            }
        }
    }

    fn read_number(&mut self) {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        // At most one decimal point; a second one starts a new token.
        if self.peek() == Some('.') {
            lexeme.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    lexeme.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.push(TokenKind::Number, lexeme);
    }

    fn read_identifier(&mut self) {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = TokenKind::keyword(&lexeme).unwrap_or(TokenKind::Identifier);
        self.push(kind, lexeme);
    }

    /// Read a string literal delimited by `quote`. A backslash takes the next
    /// character verbatim. If the input ends before the closing quote the
    /// partial content is kept.
    fn read_string(&mut self, quote: char) {
        let start_line = self.line;
        self.advance();
        let mut content = String::new();
        while let Some(c) = self.peek() {
            self.advance();
            if c == quote {
                break;
            }
            if c == '\\' {
                if let Some(escaped) = self.peek() {
                    content.push(escaped);
                    self.advance();
                    if escaped == '\n' {
                        self.line += 1;
                    }
                }
                continue;
            }
            if c == '\n' {
                self.line += 1;
            }
            content.push(c);
        }
        self.tokens
            .push(Token::new(TokenKind::Str, content, start_line));
    }

    fn read_operator(&mut self) {
        let c = self.peek().unwrap_or('\0');
        self.advance();
        let (kind, lexeme) = match c {
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    (TokenKind::EqEq, "==".to_string())
                } else {
                    (TokenKind::Equal, "=".to_string())
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    (TokenKind::GreaterEq, ">=".to_string())
                } else {
                    (TokenKind::Greater, ">".to_string())
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    (TokenKind::LessEq, "<=".to_string())
                } else {
                    (TokenKind::Less, "<".to_string())
                }
            }
            '+' => (TokenKind::Plus, c.to_string()),
            '-' => (TokenKind::Minus, c.to_string()),
            '*' => (TokenKind::Star, c.to_string()),
            '/' => (TokenKind::Slash, c.to_string()),
            '(' => (TokenKind::LParen, c.to_string()),
            ')' => (TokenKind::RParen, c.to_string()),
            '{' => (TokenKind::LBrace, c.to_string()),
            '}' => (TokenKind::RBrace, c.to_string()),
            ':' => (TokenKind::Colon, c.to_string()),
            ',' => (TokenKind::Comma, c.to_string()),
            ';' => (TokenKind::Semicolon, c.to_string()),
            '.' => (TokenKind::Dot, c.to_string()),
            _ => (TokenKind::Illegal, c.to_string()),
        };
        self.push(kind, lexeme);
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                return;
            }
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) {
        if self.pos < self.chars.len() {
            self.pos += 1;
        }
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>) {
        let line = self.line;
        self.tokens.push(Token::new(kind, lexeme, line));
    }
}
