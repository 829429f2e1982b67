//! JSON-RPC frames exchanged with the worker

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{decode_all, decode_hex, to_hex};
use crate::error::{DecodeError, Result};
use crate::status::{classify, Classification, DirectRequestStatus};

pub const JSONRPC_VERSION: &str = "2.0";

/// Worker RPC method names
pub mod methods {
    pub const AUTHOR_GET_SHIELDING_KEY: &str = "author_getShieldingKey";
    pub const AUTHOR_GET_NEXT_NONCE: &str = "author_getNextNonce";
    pub const AUTHOR_SUBMIT_AND_WATCH_AES_REQUEST: &str = "author_submitAndWatchAesRequest";
    pub const AUTHOR_SUBMIT_AND_WATCH_RS_REQUEST: &str = "author_submitAndWatchRsRequest";
    pub const AUTHOR_SUBMIT_AND_WATCH_EXTRINSIC: &str = "author_submitAndWatchExtrinsic";
    pub const AUTHOR_REQUEST_VC: &str = "author_requestVc";
    pub const STATE_EXECUTE_GETTER: &str = "state_executeGetter";
    pub const STATE_EXECUTE_AES_GETTER: &str = "state_executeAesGetter";
    pub const STATE_GET_METADATA: &str = "state_getMetadata";
    pub const STATE_GET_STORAGE: &str = "state_getStorage";
    pub const STATE_GET_SCHEDULED_ENCLAVE: &str = "state_getScheduledEnclave";
    pub const SIDECHAIN_LATEST_BLOCK: &str = "sidechain_latestBlock";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    /// Success frame for `id` carrying `result`
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            id: Some(Value::from(id)),
            result: Some(result),
            error: None,
        }
    }

    /// Request id as an integer. Numeric strings are accepted.
    pub fn numeric_id(&self) -> Option<u64> {
        match self.id.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Decode the `result` member as a hex-encoded [`RpcReturnValue`]
    pub fn return_value(&self) -> Result<RpcReturnValue> {
        match &self.result {
            Some(Value::String(hex)) => RpcReturnValue::from_hex(hex),
            Some(other) => Err(DecodeError::Unexpected(format!(
                "result is not a hex string: {}",
                other
            ))),
            None => Err(DecodeError::Unexpected("response has no result".to_string())),
        }
    }
}

/// Body of every worker reply
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct RpcReturnValue {
    pub value: Vec<u8>,
    /// More replies for the same request id will follow
    pub do_watch: bool,
    pub status: DirectRequestStatus,
}

impl RpcReturnValue {
    pub fn new(value: Vec<u8>, do_watch: bool, status: DirectRequestStatus) -> Self {
        Self {
            value,
            do_watch,
            status,
        }
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        decode_hex(hex)
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.encode())
    }

    pub fn classify(&self) -> Classification {
        classify(&self.status)
    }

    /// Interpret `value` as SCALE-encoded bytes holding UTF-8 text, the form used
    /// for error messages and the shielding key
    pub fn value_as_string(&self) -> Result<String> {
        let bytes: Vec<u8> = decode_all(&self.value)?;
        String::from_utf8(bytes).map_err(|e| DecodeError::Unexpected(e.to_string()))
    }

    /// Decode `value` as a single SCALE value
    pub fn decode_value<T: Decode>(&self) -> Result<T> {
        decode_all(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::TrustedOperationStatus;

    #[test]
    fn test_request_serialization() {
        let request = RpcRequest::new(7, methods::STATE_GET_METADATA, Value::Array(vec![]));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "state_getMetadata");
        assert_eq!(json["id"], 7);
        assert!(json["params"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_response_id_forms() {
        let r: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":3,"result":"0x"}"#).unwrap();
        assert_eq!(r.numeric_id(), Some(3));
        let r: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":"4","result":"0x"}"#).unwrap();
        assert_eq!(r.numeric_id(), Some(4));
        let r: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","result":"0x"}"#).unwrap();
        assert_eq!(r.numeric_id(), None);
    }

    #[test]
    fn test_return_value_from_response() {
        let value = RpcReturnValue::new(
            vec![1, 2],
            true,
            DirectRequestStatus::TrustedOperationStatus(TrustedOperationStatus::Submitted, [0; 32]),
        );
        let response = RpcResponse::success(1, Value::String(value.to_hex()));
        let decoded = response.return_value().unwrap();
        assert_eq!(decoded, value);
        assert!(decoded.classify().is_pending());
    }

    #[test]
    fn test_error_message_value() {
        let value = RpcReturnValue::new(
            "nonce too low".as_bytes().to_vec().encode(),
            false,
            DirectRequestStatus::Error,
        );
        assert_eq!(value.value_as_string().unwrap(), "nonce too low");
    }

    #[test]
    fn test_non_string_result_is_rejected() {
        let response = RpcResponse::success(1, serde_json::json!({"number": 3}));
        assert!(matches!(response.return_value(), Err(DecodeError::Unexpected(_))));
    }
}
