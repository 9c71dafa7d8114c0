use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};

/// Uniform `{ success, data?, error?, message? }` wrapper returned by every
/// backend endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// Failed envelope with an error text
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// Best available failure text: `error`, then `message`.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "request failed".to_string())
    }

    /// Map `success: false` to [`GatewayError::Application`].
    pub fn into_result(self) -> GatewayResult<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(GatewayError::Application {
                message: self.failure_message(),
            })
        }
    }

    /// Like [`into_result`](Self::into_result) but a success without data is
    /// an invalid response.
    pub fn into_data(self) -> GatewayResult<T> {
        self.into_result()?.ok_or_else(|| GatewayError::InvalidResponse {
            message: "success envelope without data".to_string(),
        })
    }
}

impl Envelope<Value> {
    /// Decode the payload of a raw envelope into `T`.
    ///
    /// Failure envelopes keep their text; their payload is dropped since it
    /// is rarely shaped like the success payload.
    pub fn decode<T: DeserializeOwned>(self) -> GatewayResult<Envelope<T>> {
        let data = if self.success {
            match self.data {
                Some(Value::Null) | None => None,
                Some(value) => Some(serde_json::from_value(value).map_err(|e| {
                    GatewayError::InvalidResponse {
                        message: format!("Failed to decode envelope data: {}", e),
                    }
                })?),
            }
        } else {
            None
        };

        Ok(Envelope {
            success: self.success,
            data,
            error: self.error,
            message: self.message,
        })
    }
}

/// Confirmation returned by endpoints with no meaningful payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ack {
    pub message: Option<String>,
    pub data: Option<Value>,
}
