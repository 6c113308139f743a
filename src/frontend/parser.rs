//! Parser for Lua 5.2
//!
//! Recursive descent parser with priority climbing for expressions. It
//! builds homogeneous [`AstNode`] trees: structural nodes (`CHUNK`,
//! `ASSIGNMENT`, ...) hold their display name as text, operator and
//! keyword nodes hold the source lexeme.

use crate::frontend::ast::AstNode;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::Token;
use crate::frontend::token_types::{self as types, TypeId};
use crate::utils::{Error, Result, Span};

/// Nesting limit for statements and expressions. Chosen so that a debug
/// build stays within a 2 MiB thread stack, the default for spawned threads.
const MAX_SYNTAX_LEVELS: usize = 100;

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    level: usize,
}

impl Parser {
    /// Create a parser from pre-tokenized input
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let span = tokens
                .last()
                .map(|t| Span::new(t.span.end, t.span.end, t.span.line, t.span.column))
                .unwrap_or_default();
            tokens.push(Token::eof(span));
        }
        Self { tokens, pos: 0, level: 0 }
    }

    /// Tokenize `source` and create a parser over the result
    pub fn from_source(source: &str) -> Result<Self> {
        Ok(Self::new(Lexer::new(source).tokenize()?))
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // `pos` never moves past the trailing EOF
        &self.tokens[self.pos]
    }

    fn current_type(&self) -> TypeId {
        self.current().type_id
    }

    fn peek_type(&self) -> TypeId {
        self.tokens.get(self.pos + 1).map_or(types::EOF, |t| t.type_id)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, type_id: TypeId) -> bool {
        self.current_type() == type_id
    }

    fn consume(&mut self, type_id: TypeId) -> Option<Token> {
        if self.check(type_id) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expected(&self, what: &str) -> Error {
        Error::UnexpectedToken {
            expected: what.to_string(),
            got: self.current().near(),
            span: self.current().span,
        }
    }

    fn syntax_error(&self, message: &str) -> Error {
        Error::Syntax {
            message: format!("{} near {}", message, self.current().near()),
            span: self.current().span,
        }
    }

    fn expect(&mut self, type_id: TypeId, text: &str) -> Result<Token> {
        match self.consume(type_id) {
            Some(token) => Ok(token),
            None => Err(self.expected(&format!("'{}'", text))),
        }
    }

    /// Expect the token closing a construct opened by `who` on `line`
    fn expect_match(
        &mut self,
        type_id: TypeId,
        text: &str,
        who: &str,
        line: usize,
    ) -> Result<Token> {
        if let Some(token) = self.consume(type_id) {
            return Ok(token);
        }
        if line == self.current().span.line {
            Err(self.expected(&format!("'{}'", text)))
        } else {
            Err(Error::Syntax {
                message: format!(
                    "'{}' expected (to close '{}' at line {}) near {}",
                    text,
                    who,
                    line,
                    self.current().near()
                ),
                span: self.current().span,
            })
        }
    }

    fn enter_level(&mut self) -> Result<()> {
        self.level += 1;
        if self.level > MAX_SYNTAX_LEVELS {
            return Err(Error::Syntax {
                message: "chunk has too many syntax levels".to_string(),
                span: self.current().span,
            });
        }
        Ok(())
    }

    fn leave_level(&mut self) {
        self.level -= 1;
    }

    // ==================== Blocks and Statements ====================

    /// Parse a complete chunk into a `CHUNK` root
    pub fn parse_chunk(&mut self) -> Result<AstNode> {
        let mut chunk = AstNode::imaginary(types::CHUNK, self.current().span);
        self.parse_statements(&mut chunk)?;
        if !self.current().is_eof() {
            return Err(self.expected("'<eof>'"));
        }
        Ok(chunk)
    }

    fn parse_block(&mut self) -> Result<AstNode> {
        let mut block = AstNode::imaginary(types::BLOCK, self.current().span);
        self.parse_statements(&mut block)?;
        Ok(block)
    }

    fn parse_statements(&mut self, block: &mut AstNode) -> Result<()> {
        while !types::is_block_follow(self.current_type()) {
            // `return` must be the last statement of a block
            if self.check(types::RETURN) {
                block.push(self.parse_return()?);
                return Ok(());
            }
            if let Some(stat) = self.parse_statement()? {
                block.push(stat);
            }
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> Result<Option<AstNode>> {
        self.enter_level()?;
        let line = self.current().span.line;
        let stat = match self.current_type() {
            types::SEMI_COL => {
                self.advance();
                None
            }
            types::IF => Some(self.parse_if(line)?),
            types::WHILE => Some(self.parse_while(line)?),
            types::DO => Some(self.parse_do(line)?),
            types::FOR => Some(self.parse_for(line)?),
            types::REPEAT => Some(self.parse_repeat(line)?),
            types::FUNCTION_KW => Some(self.parse_function_decl()?),
            types::LOCAL => Some(self.parse_local()?),
            types::DOUBLE_COLON => Some(self.parse_label()?),
            types::BREAK => Some(AstNode::from_token(self.advance())),
            types::GOTO => Some(self.parse_goto()?),
            _ => Some(self.parse_expr_stat()?),
        };
        self.leave_level();
        Ok(stat)
    }

    fn parse_do(&mut self, line: usize) -> Result<AstNode> {
        let token = self.advance();
        let block = self.parse_block()?;
        self.expect_match(types::END, "end", "do", line)?;
        Ok(AstNode::imaginary(types::DO_BLOCK, token.span).with_child(block))
    }

    /// `::name::`
    fn parse_label(&mut self) -> Result<AstNode> {
        let token = self.advance();
        let name = self.parse_name()?;
        self.expect(types::DOUBLE_COLON, "::")?;
        Ok(AstNode::imaginary(types::LABEL, token.span).with_child(name))
    }

    fn parse_goto(&mut self) -> Result<AstNode> {
        let goto = AstNode::from_token(self.advance());
        Ok(goto.with_child(self.parse_name()?))
    }

    fn parse_return(&mut self) -> Result<AstNode> {
        let mut ret = AstNode::from_token(self.advance());
        if !types::is_block_follow(self.current_type()) && !self.check(types::SEMI_COL) {
            ret.push(self.parse_expr()?);
            while self.consume(types::COMMA).is_some() {
                ret.push(self.parse_expr()?);
            }
        }
        self.consume(types::SEMI_COL);
        Ok(ret)
    }

    fn parse_if(&mut self, line: usize) -> Result<AstNode> {
        let mut node = AstNode::from_token(self.advance());
        node.push(self.parse_condition()?);
        while self.consume(types::ELSEIF).is_some() {
            node.push(self.parse_condition()?);
        }
        if let Some(token) = self.consume(types::ELSE) {
            node.push(AstNode::from_token(token).with_child(self.parse_block()?));
        }
        self.expect_match(types::END, "end", "if", line)?;
        Ok(node)
    }

    /// `exp then block` of an `if` or `elseif` branch
    fn parse_condition(&mut self) -> Result<AstNode> {
        let span = self.current().span;
        let test = self.parse_expr()?;
        self.expect(types::THEN, "then")?;
        let block = self.parse_block()?;
        Ok(AstNode::imaginary(types::CONDITION, span).with_child(test).with_child(block))
    }

    fn parse_while(&mut self, line: usize) -> Result<AstNode> {
        let node = AstNode::from_token(self.advance());
        let test = self.parse_expr()?;
        self.expect(types::DO, "do")?;
        let block = self.parse_block()?;
        self.expect_match(types::END, "end", "while", line)?;
        Ok(node.with_child(test).with_child(block))
    }

    fn parse_repeat(&mut self, line: usize) -> Result<AstNode> {
        let node = AstNode::from_token(self.advance());
        let block = self.parse_block()?;
        self.expect_match(types::UNTIL, "until", "repeat", line)?;
        let test = self.parse_expr()?;
        Ok(node.with_child(block).with_child(test))
    }

    fn parse_for(&mut self, line: usize) -> Result<AstNode> {
        let token = self.advance();
        let name = self.parse_name()?;
        let mut node = match self.current_type() {
            types::ASSIGN => {
                self.advance();
                let mut node = AstNode::imaginary(types::FOR_NUM, token.span).with_child(name);
                node.push(self.parse_expr()?);
                self.expect(types::COMMA, ",")?;
                node.push(self.parse_expr()?);
                if self.consume(types::COMMA).is_some() {
                    node.push(self.parse_expr()?);
                }
                node
            }
            types::COMMA | types::IN => {
                let mut names = AstNode::imaginary(types::NAME_LIST, name.span).with_child(name);
                while self.consume(types::COMMA).is_some() {
                    names.push(self.parse_name()?);
                }
                self.expect(types::IN, "in")?;
                let exprs = self.parse_expr_list()?;
                AstNode::imaginary(types::FOR_IN, token.span).with_child(names).with_child(exprs)
            }
            _ => return Err(self.expected("'=' or 'in'")),
        };
        self.expect(types::DO, "do")?;
        node.push(self.parse_block()?);
        self.expect_match(types::END, "end", "for", line)?;
        Ok(node)
    }

    /// `function a.b.c:m (params) body end`
    fn parse_function_decl(&mut self) -> Result<AstNode> {
        let token = self.advance();
        let first = self.parse_name()?;
        let mut func_name = AstNode::imaginary(types::FUNC_NAME, first.span).with_child(first);
        while self.consume(types::DOT).is_some() {
            func_name.push(self.parse_name()?);
        }
        if let Some(colon) = self.consume(types::COL) {
            let method = self.parse_name()?;
            func_name.push(AstNode::from_token(colon).with_child(method));
        }
        let body = self.parse_function_body(token.span)?;
        Ok(AstNode::imaginary(types::FUNCTION_DECL, token.span)
            .with_child(func_name)
            .with_child(body))
    }

    fn parse_local(&mut self) -> Result<AstNode> {
        let token = self.advance();
        if let Some(function) = self.consume(types::FUNCTION_KW) {
            let name = self.parse_name()?;
            let body = self.parse_function_body(function.span)?;
            return Ok(AstNode::imaginary(types::LOCAL_FUNCTION, token.span)
                .with_child(name)
                .with_child(body));
        }

        let first = self.parse_name()?;
        let mut names = AstNode::imaginary(types::NAME_LIST, first.span).with_child(first);
        while self.consume(types::COMMA).is_some() {
            names.push(self.parse_name()?);
        }
        let mut node = AstNode::imaginary(types::LOCAL_ASSIGNMENT, token.span).with_child(names);
        if self.consume(types::ASSIGN).is_some() {
            node.push(self.parse_expr_list()?);
        }
        Ok(node)
    }

    /// A call statement or an assignment
    fn parse_expr_stat(&mut self) -> Result<AstNode> {
        let first = self.parse_suffixed_expr()?;
        if self.check(types::ASSIGN) || self.check(types::COMMA) {
            self.check_assignable(&first)?;
            let mut vars = AstNode::imaginary(types::VAR_LIST, first.span).with_child(first);
            while self.consume(types::COMMA).is_some() {
                let var = self.parse_suffixed_expr()?;
                self.check_assignable(&var)?;
                vars.push(var);
            }
            self.expect(types::ASSIGN, "=")?;
            let exprs = self.parse_expr_list()?;
            return Ok(AstNode::imaginary(types::ASSIGNMENT, vars.span)
                .with_child(vars)
                .with_child(exprs));
        }
        if first.is(types::CALL) || first.is(types::METHOD_CALL) {
            Ok(first)
        } else {
            Err(self.syntax_error("syntax error"))
        }
    }

    fn check_assignable(&self, target: &AstNode) -> Result<()> {
        if target.is(types::NAME) || target.is(types::INDEX) {
            Ok(())
        } else {
            Err(self.syntax_error("syntax error"))
        }
    }

    fn parse_name(&mut self) -> Result<AstNode> {
        match self.consume(types::NAME) {
            Some(token) => Ok(AstNode::from_token(token)),
            None => Err(self.expected("<name>")),
        }
    }

    // ==================== Expression Parsing ====================

    fn parse_expr_list(&mut self) -> Result<AstNode> {
        let mut list = AstNode::imaginary(types::EXPR_LIST, self.current().span);
        list.push(self.parse_expr()?);
        while self.consume(types::COMMA).is_some() {
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    fn parse_expr(&mut self) -> Result<AstNode> {
        self.parse_sub_expr(0)
    }

    /// Parse operators whose left priority is above `limit`
    fn parse_sub_expr(&mut self, limit: u8) -> Result<AstNode> {
        self.enter_level()?;
        let mut left = if types::is_unary_operator(self.current_type()) {
            let op = self.advance();
            let operand = self.parse_sub_expr(types::UNARY_PRIORITY)?;
            let node = if op.type_id == types::SUB {
                AstNode::imaginary(types::UNARY_MINUS, op.span)
            } else {
                AstNode::from_token(op)
            };
            node.with_child(operand)
        } else {
            self.parse_simple_expr()?
        };

        while let Some((left_priority, right_priority)) =
            types::binary_priority(self.current_type())
        {
            if left_priority <= limit {
                break;
            }
            let op = self.advance();
            let right = self.parse_sub_expr(right_priority)?;
            left = AstNode::from_token(op).with_child(left).with_child(right);
        }

        self.leave_level();
        Ok(left)
    }

    fn parse_simple_expr(&mut self) -> Result<AstNode> {
        match self.current_type() {
            types::NUMBER
            | types::STRING
            | types::NIL
            | types::TRUE
            | types::FALSE
            | types::ELLIPSIS => Ok(AstNode::from_token(self.advance())),
            types::OBRACE => self.parse_table(),
            types::FUNCTION_KW => {
                let token = self.advance();
                self.parse_function_body(token.span)
            }
            _ => self.parse_suffixed_expr(),
        }
    }

    /// `Name` or a parenthesized expression, followed by field accesses,
    /// indexing and calls
    fn parse_suffixed_expr(&mut self) -> Result<AstNode> {
        let mut expr = match self.current_type() {
            types::NAME => AstNode::from_token(self.advance()),
            types::OPAREN => {
                let open = self.advance();
                let inner = self.parse_sub_expr(0)?;
                self.expect_match(types::CPAREN, ")", "(", open.span.line)?;
                AstNode::imaginary(types::PAREN_EXPR, open.span).with_child(inner)
            }
            _ => return Err(self.syntax_error("unexpected symbol")),
        };
        loop {
            expr = match self.current_type() {
                types::DOT => {
                    self.advance();
                    let key = self.parse_name()?;
                    AstNode::imaginary(types::INDEX, expr.span).with_child(expr).with_child(key)
                }
                types::OBRACK => {
                    self.advance();
                    let key = self.parse_expr()?;
                    self.expect(types::CBRACK, "]")?;
                    AstNode::imaginary(types::INDEX, expr.span).with_child(expr).with_child(key)
                }
                types::COL => {
                    self.advance();
                    let method = self.parse_name()?;
                    let args = self.parse_args()?;
                    AstNode::imaginary(types::METHOD_CALL, expr.span)
                        .with_child(expr)
                        .with_child(method)
                        .with_child(args)
                }
                types::OPAREN | types::STRING | types::OBRACE => {
                    let args = self.parse_args()?;
                    AstNode::imaginary(types::CALL, expr.span).with_child(expr).with_child(args)
                }
                _ => return Ok(expr),
            };
        }
    }

    fn parse_args(&mut self) -> Result<AstNode> {
        let mut args = AstNode::imaginary(types::ARGS, self.current().span);
        match self.current_type() {
            types::STRING => args.push(AstNode::from_token(self.advance())),
            types::OBRACE => args.push(self.parse_table()?),
            types::OPAREN => {
                let open = self.advance();
                if !self.check(types::CPAREN) {
                    args.push(self.parse_expr()?);
                    while self.consume(types::COMMA).is_some() {
                        args.push(self.parse_expr()?);
                    }
                }
                self.expect_match(types::CPAREN, ")", "(", open.span.line)?;
            }
            _ => return Err(self.syntax_error("function arguments expected")),
        }
        Ok(args)
    }

    /// `(params) block end`, after the `function` keyword
    fn parse_function_body(&mut self, start: Span) -> Result<AstNode> {
        let mut params = AstNode::imaginary(types::PARAM_LIST, self.current().span);
        self.expect(types::OPAREN, "(")?;
        if !self.check(types::CPAREN) {
            loop {
                match self.current_type() {
                    types::NAME => params.push(AstNode::from_token(self.advance())),
                    types::ELLIPSIS => {
                        params.push(AstNode::from_token(self.advance()));
                        break;
                    }
                    _ => return Err(self.expected("<name>")),
                }
                if self.consume(types::COMMA).is_none() {
                    break;
                }
            }
        }
        self.expect(types::CPAREN, ")")?;
        let body = self.parse_block()?;
        self.expect_match(types::END, "end", "function", start.line)?;
        Ok(AstNode::imaginary(types::FUNCTION, start).with_child(params).with_child(body))
    }

    fn parse_table(&mut self) -> Result<AstNode> {
        let open = self.expect(types::OBRACE, "{")?;
        let mut table = AstNode::imaginary(types::TABLE, open.span);
        while !self.check(types::CBRACE) {
            table.push(self.parse_field()?);
            if self.consume(types::COMMA).is_none() && self.consume(types::SEMI_COL).is_none() {
                break;
            }
        }
        self.expect_match(types::CBRACE, "}", "{", open.span.line)?;
        Ok(table)
    }

    fn parse_field(&mut self) -> Result<AstNode> {
        let mut field = AstNode::imaginary(types::FIELD, self.current().span);
        match self.current_type() {
            types::OBRACK => {
                self.advance();
                field.push(self.parse_expr()?);
                self.expect(types::CBRACK, "]")?;
                self.expect(types::ASSIGN, "=")?;
                field.push(self.parse_expr()?);
            }
            types::NAME if self.peek_type() == types::ASSIGN => {
                field.push(AstNode::from_token(self.advance()));
                self.advance();
                field.push(self.parse_expr()?);
            }
            _ => field.push(self.parse_expr()?),
        }
        Ok(field)
    }
}
