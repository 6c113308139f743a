//! Lexer for Lua 5.2
//!
//! Converts source code into a stream of tokens. Token text is always the
//! raw lexeme as it appears in the source, quotes and brackets included.

use crate::frontend::token::Token;
use crate::frontend::token_types::{self as types, TypeId};
use crate::utils::{Error, Result, Span};

/// The lexer state
pub struct Lexer {
    /// Source code as characters
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the character after the current one without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    /// Advance to the next character. `\n`, `\r`, `\r\n` and `\n\r` each
    /// count as a single line break and are consumed together.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' || c == '\r' {
            if matches!(self.peek(), Some(next) if (next == '\n' || next == '\r') && next != c) {
                self.pos += 1;
            }
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Remember where the current lexeme begins
    fn mark(&mut self) {
        self.start = self.pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    /// Create a span from start to current position
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.start_line, self.start_column)
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.pos].iter().collect()
    }

    /// Create a token with the current span and lexeme
    fn make_token(&self, type_id: TypeId) -> Token {
        Token::new(type_id, self.lexeme(), self.make_span())
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Lex {
            message: message.into(),
            span: self.make_span(),
        }
    }

    /// Skip a `#` first line, as the stand-alone interpreter does
    fn skip_shebang(&mut self) {
        if self.peek() == Some('#') {
            self.skip_line();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.advance();
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' | '\u{0B}' | '\u{0C}' => {
                    self.advance();
                }
                '-' if self.peek_next() == Some('-') => {
                    self.mark();
                    self.advance();
                    self.advance();
                    match self.long_bracket() {
                        (level, true) => self.read_long_body(level, "comment")?,
                        _ => self.skip_line(),
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Inspect an opening long bracket at the current `[` without
    /// consuming it: returns the number of `=` and whether it is complete.
    fn long_bracket(&self) -> (usize, bool) {
        if self.peek() != Some('[') {
            return (0, false);
        }
        let mut level = 0;
        while self.peek_at(1 + level) == Some('=') {
            level += 1;
        }
        (level, self.peek_at(1 + level) == Some('['))
    }

    fn at_long_close(&self, level: usize) -> bool {
        self.peek() == Some(']')
            && (1..=level).all(|i| self.peek_at(i) == Some('='))
            && self.peek_at(level + 1) == Some(']')
    }

    /// Consume `[==[ ... ]==]`, the opening bracket included
    fn read_long_body(&mut self, level: usize, what: &str) -> Result<()> {
        for _ in 0..level + 2 {
            self.advance();
        }
        loop {
            if self.is_at_end() {
                return Err(self.error(format!("unfinished long {}", what)));
            }
            if self.at_long_close(level) {
                for _ in 0..level + 2 {
                    self.advance();
                }
                return Ok(());
            }
            self.advance();
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.lexeme();
        let type_id = types::keyword_from_str(&text).unwrap_or(types::NAME);
        Token::new(type_id, text, self.make_span())
    }

    /// Read a numeral. Consumption is greedy, so trailing letters end up in
    /// the malformed-number message instead of starting a new token.
    fn read_number(&mut self) -> Result<Token> {
        let hex = self.peek() == Some('0') && matches!(self.peek_next(), Some('x') | Some('X'));
        let exponent = if hex { ['p', 'P'] } else { ['e', 'E'] };
        if hex {
            self.advance();
            self.advance();
        }

        while let Some(c) = self.peek() {
            if exponent.contains(&c) {
                self.advance();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.advance();
                }
            } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.lexeme();
        if is_valid_numeral(&text) {
            Ok(Token::new(types::NUMBER, text, self.make_span()))
        } else {
            Err(self.error(format!("malformed number near '{}'", text)))
        }
    }

    /// Read a short string literal delimited by `'` or `"`
    fn read_string(&mut self, delimiter: char) -> Result<Token> {
        self.advance(); // consume opening quote

        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.error("unfinished string"));
                }
                Some(c) if c == delimiter => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.read_escape()?;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        Ok(self.make_token(types::STRING))
    }

    /// Validate and consume the escape sequence after a backslash
    fn read_escape(&mut self) -> Result<()> {
        match self.peek() {
            None => Err(self.error("unfinished string")),
            Some('a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\' | '"' | '\'' | '\n' | '\r') => {
                self.advance();
                Ok(())
            }
            Some('x') => {
                self.advance();
                for _ in 0..2 {
                    match self.peek() {
                        Some(c) if c.is_ascii_hexdigit() => {
                            self.advance();
                        }
                        _ => return Err(self.error("hexadecimal digit expected")),
                    }
                }
                Ok(())
            }
            Some('z') => {
                self.advance();
                while matches!(self.peek(), Some(c) if c.is_ascii_whitespace() || c == '\u{0B}') {
                    self.advance();
                }
                Ok(())
            }
            Some(c) if c.is_ascii_digit() => {
                let mut value = 0u32;
                for _ in 0..3 {
                    match self.peek().and_then(|c| c.to_digit(10)) {
                        Some(digit) => {
                            value = value * 10 + digit;
                            self.advance();
                        }
                        None => break,
                    }
                }
                if value > 255 {
                    Err(self.error("decimal escape too large"))
                } else {
                    Ok(())
                }
            }
            Some(c) => Err(self.error(format!("invalid escape sequence '\\{}'", c))),
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace()?;
        self.mark();

        let Some(c) = self.peek() else {
            return Ok(Token::eof(self.make_span()));
        };

        // Identifiers and keywords
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.read_identifier());
        }

        // Numbers
        let digit_follows = self.peek_next().is_some_and(|n| n.is_ascii_digit());
        if c.is_ascii_digit() || (c == '.' && digit_follows) {
            return self.read_number();
        }

        // String literals
        if c == '"' || c == '\'' {
            return self.read_string(c);
        }

        // Long strings
        if c == '[' {
            match self.long_bracket() {
                (level, true) => {
                    self.read_long_body(level, "string")?;
                    return Ok(self.make_token(types::STRING));
                }
                (0, false) => {}
                _ => {
                    self.advance();
                    return Err(self.error("invalid long string delimiter"));
                }
            }
        }

        self.advance();

        // Operators and punctuation
        let type_id = match c {
            '+' => types::ADD,
            '-' => types::SUB,
            '*' => types::MUL,
            '/' => types::DIV,
            '%' => types::MOD,
            '^' => types::POW,
            '#' => types::LENGTH,
            '=' => self.pick('=', types::EQ, types::ASSIGN),
            '<' => self.pick('=', types::LT_EQ, types::LT),
            '>' => self.pick('=', types::GT_EQ, types::GT),
            '~' => {
                if self.peek() == Some('=') {
                    self.advance();
                    types::NOT_EQ
                } else {
                    return Err(self.error("unexpected character '~'"));
                }
            }
            ':' => self.pick(':', types::DOUBLE_COLON, types::COL),
            '.' => {
                if self.peek() == Some('.') {
                    self.advance();
                    self.pick('.', types::ELLIPSIS, types::CONCAT)
                } else {
                    types::DOT
                }
            }
            '(' => types::OPAREN,
            ')' => types::CPAREN,
            '{' => types::OBRACE,
            '}' => types::CBRACE,
            '[' => types::OBRACK,
            ']' => types::CBRACK,
            ';' => types::SEMI_COL,
            ',' => types::COMMA,
            _ => return Err(self.error(format!("unexpected character '{}'", c))),
        };

        Ok(self.make_token(type_id))
    }

    /// Consume `next` if present and pick the two-character token
    fn pick(&mut self, next: char, matched: TypeId, otherwise: TypeId) -> TypeId {
        if self.peek() == Some(next) {
            self.advance();
            matched
        } else {
            otherwise
        }
    }

    /// Tokenize the entire source and return all tokens, ending with EOF
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        self.skip_shebang();
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}

/// Check a greedily scanned numeral against the Lua 5.2 number syntax
fn is_valid_numeral(text: &str) -> bool {
    let (digits, hex) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    let exponent_marks: &[char] = if hex { &['p', 'P'] } else { &['e', 'E'] };
    let is_digit = |c: char| if hex { c.is_ascii_hexdigit() } else { c.is_ascii_digit() };

    let (mantissa, exponent) = match digits.find(exponent_marks) {
        Some(at) => (&digits[..at], Some(&digits[at + 1..])),
        None => (digits, None),
    };

    let mut dots = 0;
    let mut seen_digit = false;
    for c in mantissa.chars() {
        if c == '.' {
            dots += 1;
        } else if is_digit(c) {
            seen_digit = true;
        } else {
            return false;
        }
    }
    if dots > 1 || !seen_digit {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(&['+', '-'][..]).unwrap_or(exp);
            !exp.is_empty() && exp.chars().all(|c| c.is_ascii_digit())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize().unwrap()
    }

    fn types_of(source: &str) -> Vec<TypeId> {
        lex(source).iter().map(|t| t.type_id).collect()
    }

    fn lex_error(source: &str) -> (String, Span) {
        match Lexer::new(source).tokenize() {
            Err(Error::Lex { message, span }) => (message, span),
            other => panic!("expected a lexical error, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = lex("local x = f(1)");
        let types: Vec<TypeId> = tokens.iter().map(|t| t.type_id).collect();
        assert_eq!(
            types,
            vec![
                types::LOCAL,
                types::NAME,
                types::ASSIGN,
                types::NAME,
                types::OPAREN,
                types::NUMBER,
                types::CPAREN,
                types::EOF
            ]
        );
        assert_eq!(tokens[0].text, "local");
        assert_eq!(tokens[1].text, "x");
        assert_eq!(tokens[7].text, "<EOF>");
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            types_of("== ~= <= >= < > = .. ... . :: : # ^ %"),
            vec![
                types::EQ,
                types::NOT_EQ,
                types::LT_EQ,
                types::GT_EQ,
                types::LT,
                types::GT,
                types::ASSIGN,
                types::CONCAT,
                types::ELLIPSIS,
                types::DOT,
                types::DOUBLE_COLON,
                types::COL,
                types::LENGTH,
                types::POW,
                types::MOD,
                types::EOF
            ]
        );
    }

    #[test]
    fn test_keywords_and_names() {
        let tokens = lex("while whiles _end end");
        assert_eq!(tokens[0].type_id, types::WHILE);
        assert_eq!(tokens[1].type_id, types::NAME);
        assert_eq!(tokens[2].type_id, types::NAME);
        assert_eq!(tokens[3].type_id, types::END);
    }

    #[test]
    fn test_numbers() {
        let numerals = [
            "3",
            "3.0",
            "3.1416",
            "314.16e-2",
            "0.31416E1",
            ".5",
            "5.",
            "0xff",
            "0x0.1E",
            "0xA23p-4",
            "0X1.921FB54442D18P+1",
        ];
        for numeral in numerals {
            let tokens = lex(numeral);
            assert_eq!(tokens[0].type_id, types::NUMBER, "{numeral}");
            assert_eq!(tokens[0].text, numeral);
        }
    }

    #[test]
    fn test_malformed_numbers() {
        for source in ["3..2", "1e", "12abc", "0x", "1.2.3"] {
            let (message, _) = lex_error(source);
            assert_eq!(message, format!("malformed number near '{}'", source));
        }
    }

    #[test]
    fn test_strings_keep_raw_text() {
        let tokens = lex(r#"'it\'s' "a\tb\n" '\x41\65\z
              c'"#);
        assert_eq!(tokens[0].type_id, types::STRING);
        assert_eq!(tokens[0].text, r"'it\'s'");
        assert_eq!(tokens[1].text, r#""a\tb\n""#);
        assert_eq!(tokens[2].type_id, types::STRING);
        assert_eq!(tokens[3].type_id, types::EOF);
    }

    #[test]
    fn test_long_strings_and_comments() {
        let tokens = lex("--[==[ long\ncomment ]] still ]==] x = [[a\nb]] -- tail\ny = [=[]]]=]");
        let types: Vec<TypeId> = tokens.iter().map(|t| t.type_id).collect();
        assert_eq!(
            types,
            vec![
                types::NAME,
                types::ASSIGN,
                types::STRING,
                types::NAME,
                types::ASSIGN,
                types::STRING,
                types::EOF
            ]
        );
        assert_eq!(tokens[2].text, "[[a\nb]]");
        assert_eq!(tokens[5].text, "[=[]]]=]");
    }

    #[test]
    fn test_positions() {
        let tokens = lex("a = 1\n  b = 'x'");
        assert_eq!((tokens[0].span.line, tokens[0].span.column), (1, 1));
        assert_eq!((tokens[2].span.line, tokens[2].span.column), (1, 5));
        assert_eq!((tokens[3].span.line, tokens[3].span.column), (2, 3));
        assert_eq!((tokens[5].span.line, tokens[5].span.column), (2, 7));
    }

    #[test]
    fn test_carriage_return_line_breaks() {
        let tokens = lex("a = 1\rb = 2\r\nc = 3\n\rd = 4\n\ne");
        let lines: Vec<usize> = tokens
            .iter()
            .filter(|t| t.type_id == types::NAME)
            .map(|t| t.span.line)
            .collect();
        assert_eq!(lines, vec![1, 2, 3, 4, 6]);
        assert_eq!(tokens[3].span.column, 1);

        let (message, span) = lex_error("a = 1\rb = 2\rc = $");
        assert_eq!(message, "unexpected character '$'");
        assert_eq!((span.line, span.column), (3, 5));
    }

    #[test]
    fn test_comment_ends_at_carriage_return() {
        let tokens = lex("-- note\rx = 1");
        assert_eq!(tokens[0].type_id, types::NAME);
        assert_eq!(tokens[0].span.line, 2);
    }

    #[test]
    fn test_escaped_line_break_in_string() {
        let tokens = lex("s = 'a\\\r\nb'\rt");
        assert_eq!(tokens[2].type_id, types::STRING);
        assert_eq!(tokens[3].span.line, 3);
    }

    #[test]
    fn test_shebang_is_skipped() {
        let tokens = lex("#!/usr/bin/env lua\nprint(1)");
        assert_eq!(tokens[0].type_id, types::NAME);
        assert_eq!(tokens[0].span.line, 2);
    }

    #[test]
    fn test_string_errors() {
        let (message, span) = lex_error("x = 1\ny = 'abc\n'");
        assert_eq!(message, "unfinished string");
        assert_eq!((span.line, span.column), (2, 5));

        assert_eq!(lex_error(r"'\q'").0, r"invalid escape sequence '\q'");
        assert_eq!(lex_error(r"'\xZZ'").0, "hexadecimal digit expected");
        assert_eq!(lex_error(r"'\300'").0, "decimal escape too large");
    }

    #[test]
    fn test_long_bracket_errors() {
        assert_eq!(lex_error("x = [==").0, "invalid long string delimiter");
        assert_eq!(lex_error("x = [[never closed").0, "unfinished long string");
        assert_eq!(lex_error("--[[ never closed").0, "unfinished long comment");
    }

    #[test]
    fn test_unexpected_characters() {
        let (message, span) = lex_error("a = b ~ c");
        assert_eq!(message, "unexpected character '~'");
        assert_eq!(span.column, 7);
        assert_eq!(lex_error("x = $").0, "unexpected character '$'");
    }
}
