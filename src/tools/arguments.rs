//! Typed access to tool call arguments.

use crate::error::ClimaError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Parse the JSON-encoded argument string the assistant sends.
    ///
    /// A string that is not valid JSON is kept verbatim as a JSON string so
    /// schema validation can report it instead of failing the whole dispatch.
    pub fn from_wire(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::new(serde_json::json!({}));
        }
        let value = serde_json::from_str(trimmed)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        Self::new(value)
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, ClimaError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ClimaError::InvalidArgument(format!("Missing string argument: {key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_wire_parses_json_object() {
        let args = ToolArguments::from_wire(r#"{"city":"Madrid"}"#);
        assert_eq!(args.get_str("city").unwrap(), "Madrid");
    }

    #[test]
    fn from_wire_keeps_garbage_as_string() {
        let args = ToolArguments::from_wire("city=Madrid");
        assert_eq!(args.raw(), &serde_json::json!("city=Madrid"));
        assert!(args.get_str("city").is_err());
    }

    #[test]
    fn from_wire_treats_blank_as_empty_object() {
        let args = ToolArguments::from_wire("  ");
        assert_eq!(args.raw(), &serde_json::json!({}));
    }

    #[test]
    fn get_str_reports_missing_key() {
        let args = ToolArguments::new(serde_json::json!({}));
        match args.get_str("city") {
            Err(ClimaError::InvalidArgument(message)) => assert!(message.contains("city")),
            other => panic!("expected invalid argument, got {other:?}"),
        }
    }
}
