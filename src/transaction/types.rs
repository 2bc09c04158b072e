//! Request and result types shared by the normalizer, the extractor and the
//! providers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A provider-native response, shape unknown until extracted
pub type ProviderResponse = Value;

/// One positional argument of an entry or view function
pub type FunctionArgument = Value;

/// The logical fields a request may carry, under any of their aliases.
///
/// Appears both at the top level of a request and inside its `data` wrapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_arguments: Option<Vec<String>>,

    #[serde(default, rename = "typeArguments", skip_serializing_if = "Option::is_none")]
    pub type_arguments_camel: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<FunctionArgument>>,

    #[serde(default, rename = "functionArguments", skip_serializing_if = "Option::is_none")]
    pub function_arguments: Option<Vec<FunctionArgument>>,
}

impl RequestFields {
    /// Function id, ignoring empty strings
    pub fn function_id(&self) -> Option<&str> {
        self.function.as_deref().filter(|f| !f.is_empty())
    }

    /// `type_arguments` wins over `typeArguments`
    pub fn type_args(&self) -> Option<&Vec<String>> {
        self.type_arguments
            .as_ref()
            .or(self.type_arguments_camel.as_ref())
    }

    /// `arguments` wins over `functionArguments`
    pub fn function_args(&self) -> Option<&Vec<FunctionArgument>> {
        self.arguments.as_ref().or(self.function_arguments.as_ref())
    }
}

/// Caller-facing transaction request in any recognized shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(flatten)]
    pub fields: RequestFields,

    /// Legacy wrapper used by the marketplace UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RequestFields>,
}

impl TransactionRequest {
    /// Build a flat `{function, type_arguments, arguments}` request
    pub fn entry_function(
        function: impl Into<String>,
        type_arguments: Vec<String>,
        arguments: Vec<FunctionArgument>,
    ) -> Self {
        Self {
            fields: RequestFields {
                function: Some(function.into()),
                type_arguments: Some(type_arguments),
                arguments: Some(arguments),
                ..Default::default()
            },
            data: None,
        }
    }

    /// Build a `{data: {function, typeArguments, functionArguments}}` request
    pub fn wrapped(
        function: impl Into<String>,
        type_arguments: Vec<String>,
        function_arguments: Vec<FunctionArgument>,
    ) -> Self {
        Self {
            fields: RequestFields::default(),
            data: Some(RequestFields {
                function: Some(function.into()),
                type_arguments_camel: Some(type_arguments),
                function_arguments: Some(function_arguments),
                ..Default::default()
            }),
        }
    }
}

/// The single internal shape every request is reduced to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTransaction {
    /// `address::module::function`
    pub function_id: String,
    pub type_arguments: Vec<String>,
    /// Positional, in the target function's parameter order
    pub function_arguments: Vec<FunctionArgument>,
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserializes_all_aliases() {
        let request: TransactionRequest = serde_json::from_value(json!({
            "function": "0x1::m::f",
            "typeArguments": ["0x1::coin::EDS"],
            "functionArguments": [1, "two"],
            "data": { "function": "0x2::m::g", "type_arguments": [] }
        }))
        .unwrap();

        assert_eq!(request.fields.function_id(), Some("0x1::m::f"));
        assert_eq!(request.fields.type_arguments, None);
        assert_eq!(
            request.fields.type_args(),
            Some(&vec!["0x1::coin::EDS".to_string()])
        );
        assert_eq!(request.fields.function_args(), Some(&vec![json!(1), json!("two")]));

        let data = request.data.unwrap();
        assert_eq!(data.function_id(), Some("0x2::m::g"));
        assert_eq!(data.type_args(), Some(&vec![]));
        assert_eq!(data.function_args(), None);
    }

    #[test]
    fn test_empty_function_is_absent() {
        let fields = RequestFields {
            function: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(fields.function_id(), None);
    }

    #[test]
    fn test_wrapped_serializes_like_marketplace_payload() {
        let request = TransactionRequest::wrapped("0xAB::m::f", vec![], vec![json!("agent-1")]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "data": {
                    "function": "0xAB::m::f",
                    "typeArguments": [],
                    "functionArguments": ["agent-1"]
                }
            })
        );
    }
}
