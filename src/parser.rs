//! GraphQL request decoding and query parsing.

use crate::error::RequestError;
use async_graphql_parser::types::ExecutableDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GraphQL-over-HTTP request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLRequest {
    /// The query text
    pub query: String,
    /// Variables for the operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    /// Operation to run when the document holds several
    #[serde(
        default,
        rename = "operationName",
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_name: Option<String>,
}

/// Decode a JSON request body.
pub fn parse_request(body: &[u8]) -> Result<GraphQLRequest, RequestError> {
    let request: GraphQLRequest = serde_json::from_slice(body)
        .map_err(|e| RequestError::invalid_request(&format!("Invalid JSON body: {}", e)))?;

    if request.query.trim().is_empty() {
        return Err(RequestError::invalid_request("Missing or empty query"));
    }

    Ok(request)
}

/// Parse query text into an executable document.
pub fn parse_query(query: &str) -> Result<ExecutableDocument, RequestError> {
    async_graphql_parser::parse_query(query)
        .map_err(|e| RequestError::parse_error(&format!("Syntax error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use serde_json::json;

    #[test]
    fn test_parse_request() {
        let body = br#"{"query": "{ users { id } }", "variables": {"id": 1}, "operationName": "Users"}"#;
        let request = parse_request(body).unwrap();

        assert_eq!(request.query, "{ users { id } }");
        assert_eq!(request.variables, Some(json!({"id": 1})));
        assert_eq!(request.operation_name.as_deref(), Some("Users"));
    }

    #[test]
    fn test_parse_request_query_only() {
        let request = parse_request(br#"{"query": "{ posts { title } }"}"#).unwrap();
        assert!(request.variables.is_none());
        assert!(request.operation_name.is_none());
    }

    #[test]
    fn test_parse_request_invalid_json() {
        let err = parse_request(b"not json").unwrap_err();
        assert_eq!(err.error_type, ErrorType::InvalidRequest);
    }

    #[test]
    fn test_parse_request_missing_query() {
        assert!(parse_request(br#"{"variables": {}}"#).is_err());

        let err = parse_request(br#"{"query": "   "}"#).unwrap_err();
        assert_eq!(err.message, "Missing or empty query");
    }

    #[test]
    fn test_request_serializes_operation_name() {
        let request = GraphQLRequest {
            query: "{ a }".to_string(),
            variables: None,
            operation_name: Some("A".to_string()),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({ "query": "{ a }", "operationName": "A" }));
    }

    #[test]
    fn test_parse_query() {
        let document = parse_query("query Users { users { id name } }").unwrap();
        assert_eq!(document.operations.iter().count(), 1);
    }

    #[test]
    fn test_parse_query_syntax_error() {
        let err = parse_query("{ users { id ").unwrap_err();
        assert_eq!(err.error_type, ErrorType::ParseError);
        assert!(err.message.starts_with("Syntax error"));
    }
}
