use std::fmt;

/// Every opcode of the textual IR plus the synthesized `pop_args`, which is
/// injected at the head of function bodies during lowering and never parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Var,
    Mov,
    Push,
    Pop,
    Jmp,
    If,
    Call,
    Add,
    Sub,
    Mul,
    Div,
    Ret,
    New,
    Delete,
    CmpEq,
    CmpNeq,
    CmpGt,
    CmpLt,
    CmpLte,
    CmpGte,
    Label,
    Function,
    Nop,
    PopArgs,
}

impl Opcode {
    /// Maps a source keyword to its opcode. `pop_args` is not a keyword.
    pub fn from_keyword(token: &str) -> Option<Opcode> {
        let op = match token {
            "var" => Opcode::Var,
            "mov" => Opcode::Mov,
            "push" => Opcode::Push,
            "pop" => Opcode::Pop,
            "jmp" => Opcode::Jmp,
            "if" => Opcode::If,
            "call" => Opcode::Call,
            "add" => Opcode::Add,
            "sub" => Opcode::Sub,
            "mul" => Opcode::Mul,
            "div" => Opcode::Div,
            "ret" => Opcode::Ret,
            "new" => Opcode::New,
            "delete" => Opcode::Delete,
            "cmp_eq" => Opcode::CmpEq,
            "cmp_neq" => Opcode::CmpNeq,
            "cmp_gt" => Opcode::CmpGt,
            "cmp_lt" => Opcode::CmpLt,
            "cmp_lte" => Opcode::CmpLte,
            "cmp_gte" => Opcode::CmpGte,
            "label" => Opcode::Label,
            "function" => Opcode::Function,
            "nop" => Opcode::Nop,
            _ => return None,
        };

        Some(op)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Opcode::Var => "var",
            Opcode::Mov => "mov",
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Jmp => "jmp",
            Opcode::If => "if",
            Opcode::Call => "call",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Ret => "ret",
            Opcode::New => "new",
            Opcode::Delete => "delete",
            Opcode::CmpEq => "cmp_eq",
            Opcode::CmpNeq => "cmp_neq",
            Opcode::CmpGt => "cmp_gt",
            Opcode::CmpLt => "cmp_lt",
            Opcode::CmpLte => "cmp_lte",
            Opcode::CmpGte => "cmp_gte",
            Opcode::Label => "label",
            Opcode::Function => "function",
            Opcode::Nop => "nop",
            Opcode::PopArgs => "pop_args",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Opcode::CmpEq
                | Opcode::CmpNeq
                | Opcode::CmpGt
                | Opcode::CmpLt
                | Opcode::CmpLte
                | Opcode::CmpGte
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// One IR instruction. The sum is tagged by arity rather than by opcode;
/// `Function`, `Call` and `PopArgs` carry their own payload shapes.
///
/// `Function` stores its flat signature `[name, p1, t1, p2, t2, ...]`
/// together with the nested body, which keeps its terminating `ret`.
/// `Call` stores `[callee, a1, a2, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    NoArg(Opcode),
    Unary(Opcode, String),
    Binary(Opcode, String, String),
    ThreeAddr(Opcode, String, String, String),
    Function { args: Vec<String>, body: Vec<Instruction> },
    Call { args: Vec<String> },
    PopArgs { params: Vec<(String, String)> },
}

/// A program is an ordered instruction sequence; 0-based indices are the
/// identifiers every analysis works with.
pub type Program = Vec<Instruction>;

/// An operand is a numeric literal when it starts with a digit or a glued
/// minus sign; anything else names a variable, label or function.
pub fn is_literal_operand(operand: &str) -> bool {
    matches!(operand.as_bytes().first(), Some(b'0'..=b'9') | Some(b'-'))
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::NoArg(op)
            | Instruction::Unary(op, _)
            | Instruction::Binary(op, _, _)
            | Instruction::ThreeAddr(op, _, _, _) => *op,
            Instruction::Function { .. } => Opcode::Function,
            Instruction::Call { .. } => Opcode::Call,
            Instruction::PopArgs { .. } => Opcode::PopArgs,
        }
    }

    /// True when any operand equals `value`. For `Function` this matches the
    /// flat signature, which is how DCE rescues declarations whose name or
    /// parameters are still referenced.
    pub fn is_arg_equal(&self, value: &str) -> bool {
        match self {
            Instruction::NoArg(_) => false,
            Instruction::Unary(_, arg) => arg == value,
            Instruction::Binary(_, arg_1, arg_2) => arg_1 == value || arg_2 == value,
            Instruction::ThreeAddr(_, arg_1, arg_2, arg_3) => {
                arg_1 == value || arg_2 == value || arg_3 == value
            }
            Instruction::Function { args, .. } | Instruction::Call { args } => {
                args.iter().any(|arg| arg == value)
            }
            Instruction::PopArgs { params } => {
                params.iter().any(|(name, ty)| name == value || ty == value)
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::NoArg(op) => write!(f, "{op}"),
            // the trailing colon keeps the dump reparsable
            Instruction::Unary(Opcode::Label, name) => write!(f, "label {name} :"),
            Instruction::Unary(op, arg) => write!(f, "{op} {arg}"),
            Instruction::Binary(op, arg_1, arg_2) => write!(f, "{op} {arg_1} {arg_2}"),
            Instruction::ThreeAddr(op, arg_1, arg_2, arg_3) => {
                write!(f, "{op} {arg_1} {arg_2} {arg_3}")
            }
            Instruction::Function { args, .. } => {
                write!(f, "function {} (", args[0])?;
                for (index, arg) in args[1..].iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Instruction::Call { args } => {
                write!(f, "call")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            Instruction::PopArgs { params } => {
                write!(f, "pop_args")?;
                for (name, ty) in params {
                    write!(f, " {name} {ty}")?;
                }
                Ok(())
            }
        }
    }
}
