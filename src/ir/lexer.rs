use std::iter::Peekable;
use std::str::Chars;

fn is_identifier(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Tokenizer over a source buffer. Identifiers are letters and underscores
/// only; digit runs are separate tokens, so a type like `int32` comes out as
/// `int` followed by `32`. Brackets, `-` and `:` are single-character
/// tokens. The empty string signals end of input.
#[derive(Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            pos: 0,
            line: 1,
        }
    }

    /// Line of the most recently returned token.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn next_token(&mut self) -> &'a str {
        self.skip_whitespace();

        let start = self.pos;
        match self.chars.peek() {
            None => "",
            Some(&c) if is_identifier(c) => {
                self.advance_while(is_identifier);
                &self.input[start..self.pos]
            }
            Some(&c) if c.is_ascii_digit() => {
                self.advance_while(|c| c.is_ascii_digit());
                &self.input[start..self.pos]
            }
            // brackets, minus, colon and any stray byte come out one
            // character at a time so the parser can report them
            Some(_) => {
                self.advance();
                &self.input[start..self.pos]
            }
        }
    }

    /// Looks at the next token without consuming it.
    pub fn peek_token(&mut self) -> &'a str {
        self.clone().next_token()
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                self.line += 1;
                self.advance();
            } else if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) {
        if let Some(c) = self.chars.next() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while matches!(self.chars.peek(), Some(&c) if pred(c)) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_src_tokens(source: &str, tokens: Vec<&str>) {
        let mut scanner = Scanner::new(source);

        for expected_token in tokens {
            assert_eq!(scanner.next_token(), expected_token);
        }

        assert_eq!(scanner.next_token(), "");
    }

    #[test]
    fn lex_declarations() {
        let source = "var a int32\nmov a 4";

        assert_src_tokens(source, vec!["var", "a", "int", "32", "mov", "a", "4"]);
    }

    #[test]
    fn lex_negative_offsets() {
        let source = "jmp -2";

        assert_src_tokens(source, vec!["jmp", "-", "2"]);
    }

    #[test]
    fn lex_function_signature() {
        let source = "function sum (x int32 y int32)\nret";

        assert_src_tokens(
            source,
            vec![
                "function", "sum", "(", "x", "int", "32", "y", "int", "32", ")", "ret",
            ],
        );
    }

    #[test]
    fn lex_label_with_colon() {
        assert_src_tokens("label loop :", vec!["label", "loop", ":"]);
    }

    #[test]
    fn line_numbers_follow_newlines() {
        let mut scanner = Scanner::new("nop\nnop\r\nnop");

        scanner.next_token();
        assert_eq!(scanner.line(), 1);
        scanner.next_token();
        assert_eq!(scanner.line(), 2);
        scanner.next_token();
        assert_eq!(scanner.line(), 3);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut scanner = Scanner::new("push x");

        assert_eq!(scanner.peek_token(), "push");
        assert_eq!(scanner.next_token(), "push");
        assert_eq!(scanner.peek_token(), "x");
        assert_eq!(scanner.next_token(), "x");
        assert_eq!(scanner.peek_token(), "");
    }

    #[test]
    fn stray_bytes_become_tokens() {
        assert_src_tokens("nop @ nop", vec!["nop", "@", "nop"]);
    }
}
