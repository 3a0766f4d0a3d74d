use std::sync::Arc;

use crate::error::Result;
use crate::models::{Record, ThreadInput};
use crate::procedure::{ProcedureCall, SqlType};
use crate::trait_client::ProcedureClient;

const UPSERT_PROCEDURE: &str = "SpGrThreadIA";
const SELECT_PROCEDURE: &str = "SpSeThreadIA";
const DELETE_PROCEDURE: &str = "SpExThreadIA";

// The procedures spell the thread key parameter `TreadId`
const THREAD_ID_PARAM: &str = "TreadId";

#[derive(Clone)]
pub struct ThreadRepository {
    client: Arc<dyn ProcedureClient>,
}

impl ThreadRepository {
    pub fn new(client: Arc<dyn ProcedureClient>) -> Self {
        Self { client }
    }

    /// Create or update a thread
    pub async fn upsert(&self, thread: &ThreadInput) -> Result<Vec<Record>> {
        let call = ProcedureCall::new(UPSERT_PROCEDURE)
            .input(THREAD_ID_PARAM, SqlType::Char(50), thread.thread_id.as_str())
            .input("Celular", SqlType::Char(20), thread.phone.as_str())
            .input("Assunto", SqlType::VarChar(200), thread.subject.as_str());

        call.validate()?;
        self.client.execute(call).await
    }

    /// List threads for a phone
    pub async fn list_by_phone(&self, phone: &str) -> Result<Vec<Record>> {
        let call = ProcedureCall::new(SELECT_PROCEDURE)
            .input("Celular", SqlType::Char(20), phone);

        call.validate()?;
        self.client.execute(call).await
    }

    /// List every thread
    pub async fn list_all(&self) -> Result<Vec<Record>> {
        self.client.execute(ProcedureCall::new(SELECT_PROCEDURE)).await
    }

    /// Delete a thread, optionally narrowed to one phone
    pub async fn delete(&self, thread_id: &str, phone: Option<&str>) -> Result<()> {
        let mut call = ProcedureCall::new(DELETE_PROCEDURE)
            .input(THREAD_ID_PARAM, SqlType::Char(50), thread_id);

        if let Some(phone) = phone {
            call = call.input("Celular", SqlType::Char(20), phone);
        }

        call.validate()?;
        self.client.execute(call).await?;
        Ok(())
    }
}
