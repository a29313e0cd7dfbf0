//! Error handling utilities for MCP server

use rmcp::ErrorData;
use runflow_core::RunflowError;

/// Convert a store error to an MCP error.
///
/// Lookups and validation failures are the caller's fault and map to
/// `invalid_params`; everything else is an internal error.
pub fn to_mcp_error(message: &str, error: &RunflowError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error {
        RunflowError::ProgramNotFound
        | RunflowError::WeekNotFound { .. }
        | RunflowError::SessionNotFound { .. }
        | RunflowError::InvalidInput { .. } => ErrorData::invalid_params(text, None),
        _ => ErrorData::internal_error(text, None),
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;

    use super::*;

    #[test]
    fn test_lookup_errors_are_invalid_params() {
        let err = to_mcp_error("Failed to show week", &RunflowError::ProgramNotFound);
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("No training program found"));

        let err = to_mcp_error(
            "Failed to toggle session",
            &RunflowError::model("connection reset"),
        );
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    }
}
