//! Argument helpers for MCP tool calls

use crate::mcp::protocol::{error_codes, Response};
use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<T, Response> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}'", key),
        )
    })
}

/// Extracts an optional argument, falling back to `default` when absent or null.
pub fn get_optional_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    default: T,
    req_id: &Value,
) -> Result<T, Response> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => from_value(value.clone()).map_err(|_| {
            Response::error(
                req_id.clone(),
                error_codes::INVALID_PARAMS,
                format!("Invalid value for argument: '{}'", key),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_arg_falls_back_on_absence_or_null() {
        let args = json!({ "token_amount": null, "eth_amount": 0.2 });
        let id = json!(1);
        assert_eq!(get_optional_arg(&args, "token_amount", 0.1, &id).unwrap(), 0.1);
        assert_eq!(get_optional_arg(&args, "eth_amount", 0.05, &id).unwrap(), 0.2);
        assert_eq!(get_optional_arg(&args, "missing", 7u8, &id).unwrap(), 7);
    }

    #[test]
    fn wrong_type_is_invalid_params() {
        let args = json!({ "eth_amount": "lots" });
        let err = get_optional_arg(&args, "eth_amount", 0.05, &json!(1)).unwrap_err();
        assert_eq!(err.error.unwrap().code, error_codes::INVALID_PARAMS);

        let err = get_required_arg::<String>(&args, "sender_chain", &json!(1)).unwrap_err();
        assert!(err.error.unwrap().message.contains("sender_chain"));
    }
}
