use std::sync::Arc;

use crate::error::Result;
use crate::models::{CustomerInput, Record};
use crate::procedure::{ProcedureCall, SqlType};
use crate::trait_client::ProcedureClient;

const UPSERT_PROCEDURE: &str = "SpGrCliente";
const FIND_PROCEDURE: &str = "spse1cliente";

const LIST_QUERY: &str = "SELECT Celular, NomeCli, eMail FROM cliente ORDER BY NomeCli";

#[derive(Clone)]
pub struct CustomerRepository {
    client: Arc<dyn ProcedureClient>,
}

impl CustomerRepository {
    pub fn new(client: Arc<dyn ProcedureClient>) -> Self {
        Self { client }
    }

    /// Create or update a customer keyed by phone
    pub async fn upsert(&self, customer: &CustomerInput) -> Result<Vec<Record>> {
        let call = ProcedureCall::new(UPSERT_PROCEDURE)
            .input("Celular", SqlType::VarChar(20), customer.phone.as_str())
            .input("NomeCli", SqlType::VarChar(200), customer.name.as_str())
            .input("eMail", SqlType::VarChar(50), customer.email.as_str());

        call.validate()?;
        self.client.execute(call).await
    }

    /// List all customers ordered by name
    pub async fn list(&self) -> Result<Vec<Record>> {
        self.client.query(LIST_QUERY).await
    }

    /// Get a customer by phone
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Record>> {
        let call = ProcedureCall::new(FIND_PROCEDURE)
            .input("Celular", SqlType::VarChar(15), phone);

        call.validate()?;
        let rows = self.client.execute(call).await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::testing::RecordingClient;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_upsert_binds_all_fields() {
        let client = Arc::new(RecordingClient::default());
        let repo = CustomerRepository::new(client.clone());

        let input = CustomerInput::new("5511999999999").name("Ana");
        repo.upsert(&input).await.unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].procedure(), "SpGrCliente");
        assert_eq!(calls[0].param("Celular"), Some("5511999999999"));
        assert_eq!(calls[0].param("NomeCli"), Some("Ana"));
        assert_eq!(calls[0].param("eMail"), Some(""));
    }

    #[tokio::test]
    async fn test_upsert_rejects_long_phone_without_calling() {
        let client = Arc::new(RecordingClient::default());
        let repo = CustomerRepository::new(client.clone());

        let input = CustomerInput::new("1".repeat(21));
        let err = repo.upsert(&input).await.unwrap_err();

        assert_eq!(err.code(), Some("EPARAM"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_phone_returns_first_row() {
        let client = Arc::new(RecordingClient::with_rows(vec![
            record(json!({"Celular": "5511", "NomeCli": "Ana", "eMail": ""})),
            record(json!({"Celular": "5511", "NomeCli": "Duplicate", "eMail": ""})),
        ]));
        let repo = CustomerRepository::new(client.clone());

        let found = repo.find_by_phone("5511").await.unwrap().unwrap();
        assert_eq!(found["NomeCli"], "Ana");
        assert_eq!(client.calls()[0].procedure(), "spse1cliente");
    }

    #[tokio::test]
    async fn test_list_uses_inline_query() {
        let client = Arc::new(RecordingClient::default());
        let repo = CustomerRepository::new(client.clone());

        let rows = repo.list().await.unwrap();

        assert!(rows.is_empty());
        let queries = client.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].contains("ORDER BY NomeCli"));
    }
}
