//! Request validation performed before any worker is started.

use thiserror::Error;

use super::types::{InputField, JobRequest};

/// A job request that may not start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required paths are empty.
    #[error("Please select all required files (missing: {})", join_labels(.missing))]
    MissingInputs { missing: Vec<InputField> },
}

impl ValidationError {
    /// Fields the user still has to provide.
    pub fn missing(&self) -> &[InputField] {
        match self {
            Self::MissingInputs { missing } => missing,
        }
    }

    /// Per-field checklist for a blocking dialog, e.g. `XML: ✓`.
    pub fn checklist(&self) -> String {
        let missing = self.missing();
        InputField::ALL
            .iter()
            .filter(|field| field.is_required())
            .map(|field| {
                let mark = if missing.contains(field) { '✗' } else { '✓' };
                format!("{}: {}", field.label(), mark)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn join_labels(fields: &[InputField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl JobRequest {
    /// Check that xml, excel and video folder are all present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingInputs { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_request_passes() {
        let request = JobRequest::new("a.xml", "b.xlsx", "/vids", None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn error_message_names_missing_fields() {
        let request = JobRequest::new("a.xml", "", "", None);
        let err = request.validate().unwrap_err();
        assert_eq!(err.missing(), &[InputField::Excel, InputField::Videos]);
        assert_eq!(
            err.to_string(),
            "Please select all required files (missing: Excel, Videos)"
        );
    }

    #[test]
    fn checklist_marks_each_required_field() {
        let request = JobRequest::new("a.xml", "", "/vids", None);
        let err = request.validate().unwrap_err();
        assert_eq!(err.checklist(), "XML: ✓\nExcel: ✗\nVideos: ✓");
    }
}
