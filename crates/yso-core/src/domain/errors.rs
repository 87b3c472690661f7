use std::path::PathBuf;

pub type SedResult<T> = Result<T, SedError>;
pub type ParserResult<T> = SedResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SedErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl SedErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn rust_category(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SedError {
    #[error("cannot determine model family of '{}': {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    #[error(
        "'{}' line {line}: field `{field}` is not numeric ({text:?})",
        path.display()
    )]
    Parse {
        path: PathBuf,
        line: usize,
        field: String,
        text: String,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("computation failed: {0}")]
    Computation(String),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SedError {
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(
        path: impl Into<PathBuf>,
        line: usize,
        field: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            field: field.into(),
            text: text.into(),
        }
    }

    pub const fn category(&self) -> SedErrorCategory {
        match self {
            Self::Format { .. }
            | Self::Parse { .. }
            | Self::ConfigParse { .. }
            | Self::InvalidConfig(_)
            | Self::InvalidInput(_) => SedErrorCategory::InputValidationError,
            Self::Read { .. } | Self::Write { .. } => SedErrorCategory::IoSystemError,
            Self::Computation(_) => SedErrorCategory::ComputationError,
            Self::Serialize(_) => SedErrorCategory::InternalError,
        }
    }

    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::Format { .. } => "FORMAT.FAMILY",
            Self::Parse { .. } => "PARSE.FIELD",
            Self::Read { .. } => "IO.READ",
            Self::Write { .. } => "IO.WRITE",
            Self::ConfigParse { .. } => "INPUT.CONFIG_PARSE",
            Self::InvalidConfig(_) => "INPUT.CONFIG",
            Self::InvalidInput(_) => "INPUT.VALIDATION",
            Self::Computation(_) => "RUN.COMPUTE",
            Self::Serialize(_) => "SYS.SERIALIZE",
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder(), self)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}
