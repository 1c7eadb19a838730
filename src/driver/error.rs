use crate::codegen::CodegenError;
use crate::ir::ParseError;

/// Everything the pipeline can fail with, surfaced at the CLI. Nothing is
/// recovered locally; the driver renders the error and exits non-zero.
#[derive(Debug, PartialEq)]
pub enum YadfaError {
    FileNotFound { path: String },
    Parse(ParseError),
    Codegen(CodegenError),
    UnknownAnalysis { kind: String },
    Io { message: String },
}

impl YadfaError {
    pub fn render(&self) -> String {
        match self {
            YadfaError::FileNotFound { path } => format!("error: FileNotFound: {path}"),
            YadfaError::Parse(err) => err.render(),
            YadfaError::Codegen(err) => err.render(),
            YadfaError::UnknownAnalysis { kind } => {
                format!("error: unknown analysis `{kind}`, expected `liveness`")
            }
            YadfaError::Io { message } => format!("io error: {message}"),
        }
    }
}

impl From<ParseError> for YadfaError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<CodegenError> for YadfaError {
    fn from(err: CodegenError) -> Self {
        Self::Codegen(err)
    }
}
