use hashbrown::HashMap;

use super::instruction::{Instruction, Opcode, Program};
use super::lexer::Scanner;

/// Maps a label name to the index of the instruction *after* the `label`
/// pseudo-instruction, which is where jumps land.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelTable {
    labels: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn insert(&mut self, name: String, index: usize) -> Option<usize> {
        self.labels.insert(name, index)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, PartialEq)]
pub enum ParseError {
    UnknownOpcode { token: String, line: usize },
    UnexpectedToken { expected: &'static str, found: String, line: usize },
    UnexpectedEof { line: usize },
    DuplicateLabel { name: String, line: usize },
}

impl ParseError {
    pub fn render(&self) -> String {
        match self {
            ParseError::UnknownOpcode { token, line } => {
                format!("parser error: undefined opcode `{token}` in line {line}")
            }
            ParseError::UnexpectedToken { expected, found, line } => {
                format!("parser error: expected `{expected}`, found `{found}` in line {line}")
            }
            ParseError::UnexpectedEof { line } => {
                format!("parser error: unexpected end of input in line {line}")
            }
            ParseError::DuplicateLabel { name, line } => {
                format!("parser error: label `{name}` redefined in line {line}")
            }
        }
    }
}

/// Parses a whole source buffer into a program and its label table.
pub fn parse_program(input: &str) -> Result<(Program, LabelTable), ParseError> {
    let mut parser = Parser::new(input);
    let mut program = Program::new();

    loop {
        let token = parser.scanner.next_token();
        if token.is_empty() {
            break;
        }

        parser.parse_instruction(token, &mut program)?;
    }

    Ok((program, parser.table))
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    table: LabelTable,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            scanner: Scanner::new(input),
            table: LabelTable::new(),
        }
    }

    /// One instruction per invocation; `out` is the top-level program or,
    /// while inside `function`, the body being filled.
    fn parse_instruction(&mut self, token: &str, out: &mut Program) -> Result<(), ParseError> {
        match token {
            "var" => self.parse_var(out),
            "mov" => self.parse_binary(Opcode::Mov, out),
            "push" => self.parse_unary(Opcode::Push, out),
            "pop" => self.parse_unary(Opcode::Pop, out),
            "jmp" => self.parse_unary(Opcode::Jmp, out),
            "if" => self.parse_binary(Opcode::If, out),
            "call" => self.parse_call(out),
            "ret" => {
                out.push(Instruction::NoArg(Opcode::Ret));
                Ok(())
            }
            "add" => self.parse_three_addr(Opcode::Add, out),
            "sub" => self.parse_three_addr(Opcode::Sub, out),
            "mul" => self.parse_three_addr(Opcode::Mul, out),
            "div" => self.parse_three_addr(Opcode::Div, out),
            "new" => self.parse_unary(Opcode::New, out),
            "delete" => self.parse_unary(Opcode::Delete, out),
            "cmp_eq" => self.parse_three_addr(Opcode::CmpEq, out),
            "cmp_neq" => self.parse_three_addr(Opcode::CmpNeq, out),
            "cmp_gt" => self.parse_three_addr(Opcode::CmpGt, out),
            "cmp_lt" => self.parse_three_addr(Opcode::CmpLt, out),
            "cmp_lte" => self.parse_three_addr(Opcode::CmpLte, out),
            "cmp_gte" => self.parse_three_addr(Opcode::CmpGte, out),
            "label" => self.parse_label(out),
            "function" => self.parse_function(out),
            "nop" => {
                out.push(Instruction::NoArg(Opcode::Nop));
                Ok(())
            }
            _ => Err(ParseError::UnknownOpcode {
                token: token.to_string(),
                line: self.scanner.line(),
            }),
        }
    }

    fn expect_token(&mut self) -> Result<&'a str, ParseError> {
        let token = self.scanner.next_token();
        if token.is_empty() {
            Err(ParseError::UnexpectedEof { line: self.scanner.line() })
        } else {
            Ok(token)
        }
    }

    /// Reads one operand, gluing a standalone `-` onto a following digit run
    /// so negative literals come out as a single string.
    fn parse_operand(&mut self) -> Result<String, ParseError> {
        let token = self.expect_token()?;
        if token == "-" {
            let digits = self.expect_token()?;
            Ok(format!("-{digits}"))
        } else {
            Ok(token.to_string())
        }
    }

    fn parse_unary(&mut self, op: Opcode, out: &mut Program) -> Result<(), ParseError> {
        let arg = self.parse_operand()?;
        out.push(Instruction::Unary(op, arg));
        Ok(())
    }

    fn parse_binary(&mut self, op: Opcode, out: &mut Program) -> Result<(), ParseError> {
        let arg_1 = self.parse_operand()?;
        let arg_2 = self.parse_operand()?;
        out.push(Instruction::Binary(op, arg_1, arg_2));
        Ok(())
    }

    fn parse_three_addr(&mut self, op: Opcode, out: &mut Program) -> Result<(), ParseError> {
        let arg_1 = self.parse_operand()?;
        let arg_2 = self.parse_operand()?;
        let arg_3 = self.parse_operand()?;
        out.push(Instruction::ThreeAddr(op, arg_1, arg_2, arg_3));
        Ok(())
    }

    /// `var NAME TYPE [SIZE]` — the size digits are optional and get glued
    /// onto the type, so `int` `32` becomes `int32`.
    fn parse_var(&mut self, out: &mut Program) -> Result<(), ParseError> {
        let name = self.parse_operand()?;
        let mut ty = self.expect_token()?.to_string();

        let peek = self.scanner.peek_token();
        if !peek.is_empty() && peek.as_bytes()[0].is_ascii_digit() {
            ty.push_str(self.scanner.next_token());
        }

        out.push(Instruction::Binary(Opcode::Var, name, ty));
        Ok(())
    }

    /// `call NAME ARG*` — operands are consumed greedily until the next
    /// token starts an instruction.
    fn parse_call(&mut self, out: &mut Program) -> Result<(), ParseError> {
        let callee = self.parse_operand()?;
        let mut args = vec![callee];

        loop {
            let peek = self.scanner.peek_token();
            if peek.is_empty() || Opcode::from_keyword(peek).is_some() {
                break;
            }
            args.push(self.parse_operand()?);
        }

        out.push(Instruction::Call { args });
        Ok(())
    }

    fn parse_label(&mut self, out: &mut Program) -> Result<(), ParseError> {
        let name = self.expect_token()?.to_string();
        out.push(Instruction::Unary(Opcode::Label, name.clone()));

        // jumps land after the label pseudo-instruction
        let target = out.len();
        if self.table.insert(name.clone(), target).is_some() {
            return Err(ParseError::DuplicateLabel { name, line: self.scanner.line() });
        }

        let colon = self.expect_token()?;
        if colon != ":" {
            return Err(ParseError::UnexpectedToken {
                expected: ":",
                found: colon.to_string(),
                line: self.scanner.line(),
            });
        }

        Ok(())
    }

    /// `function NAME ( [PARAM TYPE]... ) BODY ret` — digit runs inside the
    /// signature glue onto the previous token, and the body is parsed
    /// recursively until its terminating `ret` has been consumed.
    fn parse_function(&mut self, out: &mut Program) -> Result<(), ParseError> {
        let name = self.expect_token()?.to_string();

        let open = self.expect_token()?;
        if open != "(" {
            return Err(ParseError::UnexpectedToken {
                expected: "(",
                found: open.to_string(),
                line: self.scanner.line(),
            });
        }

        let mut args = vec![name];
        loop {
            let token = self.expect_token()?;
            if token == ")" {
                break;
            }
            if token.as_bytes()[0].is_ascii_digit() {
                // args is never empty here, the function name is args[0]
                args.last_mut().unwrap().push_str(token);
            } else {
                args.push(token.to_string());
            }
        }

        let mut body = Program::new();
        loop {
            let token = self.scanner.next_token();
            if token.is_empty() {
                return Err(ParseError::UnexpectedEof { line: self.scanner.line() });
            }

            let is_ret = token == "ret";
            self.parse_instruction(token, &mut body)?;
            if is_ret {
                break;
            }
        }

        out.push(Instruction::Function { args, body });
        Ok(())
    }
}
