use std::fmt;

use thiserror::Error;

/// One error reported by the database server or driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlErrorDetail {
    pub code: Option<String>,
    pub message: String,
    pub line: Option<u32>,
    /// Server error number, when the server produced it.
    pub number: Option<u32>,
}

impl SqlErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            line: None,
            number: None,
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        // Servers report line 0 when the error is not tied to a statement
        self.line = (line != 0).then_some(line);
        self
    }

    pub fn with_number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }
}

impl fmt::Display for SqlErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("{message}")]
    Connection { code: &'static str, message: String },

    #[error("{0}")]
    Timeout(String),

    #[error("Validation failed for parameter '{name}'. {message}")]
    Parameter { name: String, message: String },

    /// A statement or procedure failed. `preceding` holds the causes the
    /// driver reported before `error`, earliest first.
    #[error("{error}")]
    Request {
        error: SqlErrorDetail,
        preceding: Vec<SqlErrorDetail>,
    },
}

impl PersistError {
    pub fn request(error: SqlErrorDetail) -> Self {
        Self::Request {
            error,
            preceding: Vec::new(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Connection { code, .. } => Some(*code),
            Self::Timeout(_) => Some("ETIMEOUT"),
            Self::Parameter { .. } => Some("EPARAM"),
            Self::Request { error, .. } => error.code.as_deref(),
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Request { error, .. } => error.line,
            _ => None,
        }
    }

    pub fn preceding_errors(&self) -> &[SqlErrorDetail] {
        match self {
            Self::Request { preceding, .. } => preceding,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
