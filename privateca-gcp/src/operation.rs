//! Long-running operations
//!
//! Mutations return an `Operation` that is polled until `done`.

use log::debug;
use privateca_core::provider::{ProviderError, ProviderResult};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;

use crate::client::PrivateCaClient;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub error: Option<OperationStatus>,
    pub response: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl Operation {
    pub fn from_value(value: Value) -> ProviderResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| ProviderError::Serialization(format!("Invalid operation: {e}")))
    }

    /// Result of a finished operation
    fn into_result(self) -> ProviderResult<Option<Value>> {
        match self.error {
            Some(status) => Err(ProviderError::OperationFailed {
                name: self.name,
                code: status.code,
                message: status.message,
            }),
            None => Ok(self.response),
        }
    }
}

impl PrivateCaClient {
    /// Poll an operation until it finishes and return its `response`
    pub async fn wait_for_operation(&self, operation: Operation) -> ProviderResult<Option<Value>> {
        let config = self.config();
        let deadline = Instant::now() + config.operation_timeout;
        let mut operation = operation;

        loop {
            if operation.done {
                return operation.into_result();
            }
            if Instant::now() >= deadline {
                return Err(ProviderError::OperationTimeout {
                    name: operation.name,
                    timeout: config.operation_timeout,
                });
            }

            debug!("Waiting for operation {}", operation.name);
            tokio::time::sleep(config.operation_poll_interval).await;

            let url = format!("{}{}", self.base_path(), operation.name);
            operation = Operation::from_value(self.send(Method::GET, &url, None).await?)?;
        }
    }

    /// Send a mutation and wait for the operation it starts
    pub async fn send_and_wait(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> ProviderResult<Option<Value>> {
        let operation = Operation::from_value(self.send(method, url, body).await?)?;
        self.wait_for_operation(operation).await
    }
}
