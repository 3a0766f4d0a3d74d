use serde::{Deserialize, Serialize};

/// One result-set row: column name to value, in column order as returned.
pub type Record = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInput {
    pub phone: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl CustomerInput {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadInput {
    pub thread_id: String,
    pub phone: String,
    pub subject: String,
}
