//! Remote gateway to the spreadsheet endpoint.
//!
//! One URL serves both directions: `GET` returns `{ "inventory": [...] }`,
//! `POST` takes a [`SheetCommand`]. Writes are sequential and never retried.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::types::{SheetCommand, inventory_rows};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// How much of a write response is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Only a transport failure is an error; the response is never inspected.
    #[default]
    FireAndForget,
    /// A non-2xx status is an error as well.
    Acknowledged,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown write mode {0:?} (expected `fire-and-forget` or `acknowledged`)")]
pub struct UnknownWriteMode(String);

impl core::str::FromStr for WriteMode {
    type Err = UnknownWriteMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire-and-forget" | "fire_and_forget" => Ok(WriteMode::FireAndForget),
            "acknowledged" | "ack" => Ok(WriteMode::Acknowledged),
            _ => Err(UnknownWriteMode(s.to_string())),
        }
    }
}

/// Read/write access to the remote inventory sheet.
#[async_trait]
pub trait SheetGateway: Send + Sync {
    /// Fetch the raw `inventory` rows.
    async fn fetch_inventory(&self) -> Result<Vec<Value>, GatewayError>;

    /// Send one write command.
    async fn send(&self, command: &SheetCommand) -> Result<(), GatewayError>;
}

/// `reqwest`-backed gateway.
#[derive(Debug, Clone)]
pub struct HttpSheetGateway {
    client: reqwest::Client,
    endpoint: String,
    write_mode: WriteMode,
}

impl HttpSheetGateway {
    pub fn new(endpoint: impl Into<String>, write_mode: WriteMode) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            write_mode,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.sheet_url.clone(), config.write_mode)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }
}

#[async_trait]
impl SheetGateway for HttpSheetGateway {
    async fn fetch_inventory(&self) -> Result<Vec<Value>, GatewayError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GatewayError::Api(
                resp.status().as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        inventory_rows(body)
    }

    async fn send(&self, command: &SheetCommand) -> Result<(), GatewayError> {
        tracing::debug!("POST {} action={}", self.endpoint, command.action());

        let resp = self
            .client
            .post(&self.endpoint)
            .json(command)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        match self.write_mode {
            WriteMode::FireAndForget => Ok(()),
            WriteMode::Acknowledged if resp.status().is_success() => Ok(()),
            WriteMode::Acknowledged => Err(GatewayError::Api(
                resp.status().as_u16(),
                resp.text().await.unwrap_or_default(),
            )),
        }
    }
}

/// In-memory gateway for tests/dev.
///
/// - Serves a fixed set of rows (or a scripted read failure)
/// - Records every write in order
/// - Can fail the n-th write (0-based) to exercise partial commits
#[derive(Debug, Default)]
pub struct RecordingGateway {
    rows: Mutex<Option<Vec<Value>>>,
    read_failures: Mutex<VecDeque<GatewayError>>,
    sent: Mutex<Vec<SheetCommand>>,
    fail_write_at: Mutex<Option<usize>>,
    write_attempts: Mutex<usize>,
}

impl RecordingGateway {
    pub fn new(rows: Vec<Value>) -> Self {
        let gateway = Self::default();
        *lock(&gateway.rows) = Some(rows);
        gateway
    }

    /// Replace the rows served by subsequent reads.
    pub fn set_rows(&self, rows: Vec<Value>) {
        *lock(&self.rows) = Some(rows);
    }

    /// Make the next read fail with `error`.
    pub fn fail_next_read(&self, error: GatewayError) {
        lock(&self.read_failures).push_back(error);
    }

    /// Make the write with this 0-based attempt number fail at the transport level.
    pub fn fail_write_at(&self, attempt: usize) {
        *lock(&self.fail_write_at) = Some(attempt);
    }

    /// Writes that went through, in send order.
    pub fn sent(&self) -> Vec<SheetCommand> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl SheetGateway for RecordingGateway {
    async fn fetch_inventory(&self) -> Result<Vec<Value>, GatewayError> {
        if let Some(err) = lock(&self.read_failures).pop_front() {
            return Err(err);
        }
        lock(&self.rows)
            .clone()
            .ok_or_else(|| GatewayError::Network("no inventory configured".to_string()))
    }

    async fn send(&self, command: &SheetCommand) -> Result<(), GatewayError> {
        let attempt = {
            let mut attempts = lock(&self.write_attempts);
            let current = *attempts;
            *attempts += 1;
            current
        };
        if *lock(&self.fail_write_at) == Some(attempt) {
            return Err(GatewayError::Network(format!("write {attempt} dropped")));
        }
        lock(&self.sent).push(command.clone());
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
