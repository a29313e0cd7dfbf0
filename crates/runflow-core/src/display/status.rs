//! Status and confirmation messages.

use std::fmt;

/// Outcome message of an operation that has no resource to show.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.success { "✓" } else { "✗" };
        writeln!(f, "{marker} {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_status_display() {
        let success = OperationStatus::success("Programme supprimé");
        assert_eq!(format!("{success}"), "✓ Programme supprimé\n");

        let failure = OperationStatus::failure("Aucun programme");
        assert!(format!("{failure}").starts_with('✗'));
    }
}
