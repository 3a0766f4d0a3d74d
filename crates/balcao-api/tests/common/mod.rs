#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use balcao_api::{
    build_router,
    config::{Config, CorsConfig, LoggingConfig, RunMode, ServerConfig},
    state::AppState,
};
use balcao_persist::{
    MssqlConfig, PersistError, PoolConfig, ProcedureCall, ProcedureClient, Record, Result,
};

type ErrorFactory = Box<dyn Fn() -> PersistError + Send + Sync>;

/// In-memory stand-in for the customer and thread procedures
#[derive(Default)]
pub struct FakeDb {
    customers: Mutex<BTreeMap<String, (String, String)>>,
    threads: Mutex<Vec<(String, String, String)>>,
    calls: AtomicUsize,
    failure: Mutex<Option<ErrorFactory>>,
    latency: Option<Duration>,
}

impl FakeDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency: Some(latency),
            ..Default::default()
        })
    }

    /// Make every subsequent call fail with the error `factory` builds
    pub fn fail_with(&self, factory: impl Fn() -> PersistError + Send + Sync + 'static) {
        *self.failure.lock().unwrap() = Some(Box::new(factory));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn insert_thread(&self, thread_id: &str, phone: &str, subject: &str) {
        self.threads
            .lock()
            .unwrap()
            .push((thread_id.to_string(), phone.to_string(), subject.to_string()));
    }

    async fn begin(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.failure.lock().unwrap().as_ref() {
            Some(factory) => Err(factory()),
            None => Ok(()),
        }
    }

    fn customer_row(phone: &str, name: &str, email: &str) -> Record {
        record(json!({"Celular": phone, "NomeCli": name, "eMail": email}))
    }

    fn thread_row(thread: &(String, String, String)) -> Record {
        record(json!({"TreadId": thread.0, "Celular": thread.1, "Assunto": thread.2}))
    }
}

#[async_trait]
impl ProcedureClient for FakeDb {
    async fn execute(&self, call: ProcedureCall) -> Result<Vec<Record>> {
        self.begin().await?;
        call.validate()?;

        let param = |name: &str| call.param(name).unwrap_or_default().to_string();

        match call.procedure() {
            "SpGrCliente" => {
                self.customers
                    .lock()
                    .unwrap()
                    .insert(param("Celular"), (param("NomeCli"), param("eMail")));
                Ok(vec![])
            }
            "spse1cliente" => {
                let phone = param("Celular");
                let customers = self.customers.lock().unwrap();
                Ok(customers
                    .get(&phone)
                    .map(|(name, email)| Self::customer_row(&phone, name, email))
                    .into_iter()
                    .collect())
            }
            "SpGrThreadIA" => {
                let mut threads = self.threads.lock().unwrap();
                let thread_id = param("TreadId");
                threads.retain(|t| t.0 != thread_id);
                threads.push((thread_id, param("Celular"), param("Assunto")));
                Ok(vec![record(json!({"Resultado": "OK"}))])
            }
            "SpSeThreadIA" => {
                let threads = self.threads.lock().unwrap();
                Ok(threads
                    .iter()
                    .filter(|t| call.param("Celular").map_or(true, |p| p == t.1))
                    .map(Self::thread_row)
                    .collect())
            }
            "SpExThreadIA" => {
                let thread_id = param("TreadId");
                let phone = call.param("Celular");
                self.threads
                    .lock()
                    .unwrap()
                    .retain(|t| !(t.0 == thread_id && phone.map_or(true, |p| p == t.1)));
                Ok(vec![])
            }
            other => Err(missing_procedure(other)),
        }
    }

    async fn query(&self, _sql: &str) -> Result<Vec<Record>> {
        self.begin().await?;

        let customers = self.customers.lock().unwrap();
        let mut rows: Vec<(String, String, String)> = customers
            .iter()
            .map(|(phone, (name, email))| (name.clone(), phone.clone(), email.clone()))
            .collect();
        rows.sort();

        Ok(rows
            .iter()
            .map(|(name, phone, email)| Self::customer_row(phone, name, email))
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        self.begin().await
    }
}

pub fn missing_procedure(name: &str) -> PersistError {
    PersistError::request(
        balcao_persist::SqlErrorDetail::new(
            "EREQUEST",
            format!("Could not find stored procedure '{}'.", name),
        )
        .with_number(2812),
    )
}

pub fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

pub fn test_config(environment: RunMode) -> Config {
    Config {
        environment,
        server: ServerConfig::default(),
        database: MssqlConfig {
            host: "localhost".to_string(),
            port: 1433,
            user: "sa".to_string(),
            password: "unused".to_string(),
            database: "balcao".to_string(),
            encrypt: false,
            trust_server_certificate: None,
            pool: PoolConfig::default(),
        },
        cors: CorsConfig::default(),
        logging: LoggingConfig::default(),
    }
}

pub fn app(db: Arc<FakeDb>) -> Router {
    app_in(db, RunMode::Production)
}

pub fn app_in(db: Arc<FakeDb>, environment: RunMode) -> Router {
    let state = AppState::new(test_config(environment), db);
    build_router(Arc::new(state))
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Run one request and decode the JSON body (`Null` when empty)
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}
