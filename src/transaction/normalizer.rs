//! Request canonicalization
//!
//! Each logical field is looked up through a fixed alias order; the first
//! alias present wins and aliases are never merged.

use serde_json::Value;

use super::types::{CanonicalTransaction, TransactionRequest};
use crate::wallet::{Result, WalletError};

/// Reduces any recognized request shape to a [`CanonicalTransaction`]
pub struct PayloadNormalizer;

impl PayloadNormalizer {
    /// Canonicalize a typed request.
    ///
    /// Alias order:
    /// - function id: `function`, `data.function`
    /// - type args: `type_arguments`, `typeArguments`, `data.type_arguments`,
    ///   `data.typeArguments`
    /// - args: `arguments`, `functionArguments`, `data.arguments`,
    ///   `data.functionArguments`
    pub fn normalize(request: &TransactionRequest) -> Result<CanonicalTransaction> {
        let top = &request.fields;
        let data = request.data.as_ref();

        let function_id = top
            .function_id()
            .or_else(|| data.and_then(|d| d.function_id()))
            .ok_or(WalletError::MissingFunctionId)?;

        let type_arguments = top
            .type_args()
            .or_else(|| data.and_then(|d| d.type_args()))
            .cloned()
            .unwrap_or_default();

        let function_arguments = top
            .function_args()
            .or_else(|| data.and_then(|d| d.function_args()))
            .cloned()
            .unwrap_or_default();

        Ok(CanonicalTransaction {
            function_id: function_id.to_string(),
            type_arguments,
            function_arguments,
        })
    }

    /// Canonicalize a raw JSON request
    pub fn normalize_value(request: &Value) -> Result<CanonicalTransaction> {
        let request: TransactionRequest = serde_json::from_value(request.clone())
            .map_err(|e| WalletError::InvalidRequest(e.to_string()))?;
        Self::normalize(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonical(function: &str, type_args: &[&str], args: Vec<Value>) -> CanonicalTransaction {
        CanonicalTransaction {
            function_id: function.to_string(),
            type_arguments: type_args.iter().map(|s| s.to_string()).collect(),
            function_arguments: args,
        }
    }

    #[test]
    fn test_flat_request_with_arguments() {
        let tx = PayloadNormalizer::normalize_value(&json!({
            "function": "0xAB::m::f",
            "arguments": ["x", "y"]
        }))
        .unwrap();

        assert_eq!(tx, canonical("0xAB::m::f", &[], vec![json!("x"), json!("y")]));
    }

    #[test]
    fn test_data_wrapper_with_function_arguments() {
        let tx = PayloadNormalizer::normalize_value(&json!({
            "data": { "function": "0xAB::m::f", "functionArguments": ["x"] }
        }))
        .unwrap();

        assert_eq!(tx.function_id, "0xAB::m::f");
        assert_eq!(tx.function_arguments, vec![json!("x")]);
        assert!(tx.type_arguments.is_empty());
    }

    #[test]
    fn test_alias_equivalence() {
        let expected = canonical("0x1::nexus::call", &["0x1::eds::EDS"], vec![json!("a"), json!(7)]);

        let shapes = [
            json!({ "function": "0x1::nexus::call", "type_arguments": ["0x1::eds::EDS"], "arguments": ["a", 7] }),
            json!({ "function": "0x1::nexus::call", "typeArguments": ["0x1::eds::EDS"], "functionArguments": ["a", 7] }),
            json!({ "data": { "function": "0x1::nexus::call", "type_arguments": ["0x1::eds::EDS"], "arguments": ["a", 7] } }),
            json!({ "data": { "function": "0x1::nexus::call", "typeArguments": ["0x1::eds::EDS"], "functionArguments": ["a", 7] } }),
            json!({ "function": "0x1::nexus::call", "data": { "typeArguments": ["0x1::eds::EDS"], "arguments": ["a", 7] } }),
        ];

        for shape in shapes {
            assert_eq!(PayloadNormalizer::normalize_value(&shape).unwrap(), expected, "{shape}");
        }
    }

    #[test]
    fn test_first_alias_wins_without_merging() {
        let tx = PayloadNormalizer::normalize_value(&json!({
            "function": "0x1::m::top",
            "arguments": ["top"],
            "functionArguments": ["camel"],
            "typeArguments": [],
            "data": {
                "function": "0x1::m::nested",
                "type_arguments": ["0x1::ignored::T"],
                "arguments": ["nested"]
            }
        }))
        .unwrap();

        assert_eq!(tx.function_id, "0x1::m::top");
        assert_eq!(tx.function_arguments, vec![json!("top")]);
        // An empty top-level alias still counts as present
        assert!(tx.type_arguments.is_empty());
    }

    #[test]
    fn test_argument_order_is_preserved() {
        let request = TransactionRequest::entry_function(
            "0x1::m::f",
            vec![],
            vec![json!("model"), json!("prompt"), json!("100000000"), json!([1, 2, 3])],
        );
        let before = request.clone();

        let tx = PayloadNormalizer::normalize(&request).unwrap();

        assert_eq!(
            tx.function_arguments,
            vec![json!("model"), json!("prompt"), json!("100000000"), json!([1, 2, 3])]
        );
        assert_eq!(request, before);
    }

    #[test]
    fn test_missing_function_id() {
        let shapes = [
            json!({}),
            json!({ "arguments": ["x"] }),
            json!({ "function": "", "data": { "functionArguments": [] } }),
            json!({ "data": {} }),
        ];

        for shape in shapes {
            assert_eq!(
                PayloadNormalizer::normalize_value(&shape),
                Err(WalletError::MissingFunctionId),
                "{shape}"
            );
        }
    }

    #[test]
    fn test_empty_top_level_function_falls_back_to_data() {
        let tx = PayloadNormalizer::normalize_value(&json!({
            "function": "",
            "data": { "function": "0x1::m::f" }
        }))
        .unwrap();
        assert_eq!(tx.function_id, "0x1::m::f");
    }

    #[test]
    fn test_malformed_request() {
        let result = PayloadNormalizer::normalize_value(&json!({ "function": 42 }));
        assert!(matches!(result, Err(WalletError::InvalidRequest(_))));
    }
}
