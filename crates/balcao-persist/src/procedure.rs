use std::fmt;

use crate::error::{PersistError, Result};

/// Declared SQL type of a procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    VarChar(usize),
    /// Fixed width; the server pads shorter values.
    Char(usize),
}

impl SqlType {
    pub fn max_len(&self) -> usize {
        match self {
            SqlType::VarChar(n) | SqlType::Char(n) => *n,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::VarChar(n) => write!(f, "VARCHAR({})", n),
            SqlType::Char(n) => write!(f, "CHAR({})", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlParam {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub value: String,
}

/// A named stored procedure plus its bound input parameters.
///
/// Parameters are rendered as named arguments bound positionally, so values
/// never reach the statement text:
///
/// ```
/// use balcao_persist::{ProcedureCall, SqlType};
///
/// let call = ProcedureCall::new("SpGrCliente")
///     .input("Celular", SqlType::VarChar(20), "5511999999999")
///     .input("NomeCli", SqlType::VarChar(200), "Ana");
///
/// assert_eq!(call.statement(), "EXEC SpGrCliente @Celular = @P1, @NomeCli = @P2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureCall {
    procedure: &'static str,
    params: Vec<SqlParam>,
}

impl ProcedureCall {
    pub fn new(procedure: &'static str) -> Self {
        Self {
            procedure,
            params: Vec::new(),
        }
    }

    pub fn input(mut self, name: &'static str, sql_type: SqlType, value: impl Into<String>) -> Self {
        self.params.push(SqlParam {
            name,
            sql_type,
            value: value.into(),
        });
        self
    }

    pub fn procedure(&self) -> &'static str {
        self.procedure
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Value bound to `name`, if any.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Reject values wider than their declared type before any round-trip.
    pub fn validate(&self) -> Result<()> {
        for param in &self.params {
            if param.value.chars().count() > param.sql_type.max_len() {
                return Err(PersistError::Parameter {
                    name: param.name.to_string(),
                    message: "String too long.".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn statement(&self) -> String {
        if self.params.is_empty() {
            return format!("EXEC {}", self.procedure);
        }

        let args: Vec<String> = self
            .params
            .iter()
            .enumerate()
            .map(|(idx, p)| format!("@{} = @P{}", p.name, idx + 1))
            .collect();

        format!("EXEC {} {}", self.procedure, args.join(", "))
    }
}
