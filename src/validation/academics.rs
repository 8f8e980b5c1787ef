use uuid::Uuid;
use crate::error::{AppError, Result};

/// Validates a subject label's shape.
///
/// Membership in a specific course's subject list is checked in the service
/// layer, where the course is known; this only rejects labels that could
/// never be valid.
pub fn validate_subject_label(subject: &str) -> Result<()> {
    if subject.trim().is_empty() {
        return Err(AppError::Validation(
            "Subject label cannot be empty".to_string(),
        ));
    }

    if subject.len() > 64 {
        return Err(AppError::Validation(
            "Subject label must be at most 64 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a non-empty, reasonably sized enrollment id list.
pub fn validate_enrollment_ids(enrollment_ids: &[Uuid]) -> Result<()> {
    if enrollment_ids.is_empty() {
        return Err(AppError::Validation(
            "enrollmentIds cannot be empty".to_string(),
        ));
    }

    if enrollment_ids.len() > 1000 {
        return Err(AppError::Validation(
            "enrollmentIds cannot exceed 1000 entries per request".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_subject_label_rejected() {
        assert!(validate_subject_label("  ").is_err());
        assert!(validate_subject_label("A").is_ok());
    }

    #[test]
    fn oversized_subject_label_rejected() {
        let long = "x".repeat(65);
        assert!(validate_subject_label(&long).is_err());
    }

    #[test]
    fn enrollment_id_list_bounds() {
        assert!(validate_enrollment_ids(&[]).is_err());
        assert!(validate_enrollment_ids(&[Uuid::new_v4()]).is_ok());
        let too_many: Vec<Uuid> = (0..1001).map(|_| Uuid::new_v4()).collect();
        assert!(validate_enrollment_ids(&too_many).is_err());
    }
}
