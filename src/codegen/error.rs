use iced_x86::IcedError;

/// Lowering failures. `Emit` wraps refusals from the assembler back end;
/// the other variants are semantic lookups that came up empty.
#[derive(Debug, Clone, PartialEq)]
pub enum CodegenError {
    UnknownLabel { name: String },
    UnknownFunction { name: String },
    UnknownVariable { name: String },
    TargetOutOfRange { index: i32 },
    BadImmediate { token: String },
    Emit { message: String },
}

impl CodegenError {
    pub fn render(&self) -> String {
        match self {
            CodegenError::UnknownLabel { name } => {
                format!("codegen error: label `{name}` does not exist")
            }
            CodegenError::UnknownFunction { name } => {
                format!("codegen error: function `{name}` does not exist")
            }
            CodegenError::UnknownVariable { name } => {
                format!("codegen error: variable `{name}` has no stack slot")
            }
            CodegenError::TargetOutOfRange { index } => {
                format!("codegen error: instruction {index} is out of range")
            }
            CodegenError::BadImmediate { token } => {
                format!("codegen error: `{token}` is not a valid immediate")
            }
            CodegenError::Emit { message } => format!("emit error: {message}"),
        }
    }
}

impl From<IcedError> for CodegenError {
    fn from(err: IcedError) -> Self {
        CodegenError::Emit { message: err.to_string() }
    }
}
