use crate::error::AppError;
use crate::models::profiles::{Model, Roles};

pub fn require_admin(actor: &Model) -> Result<(), AppError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}

/// Workers may only act once an admin has approved their account.
pub fn require_approved(actor: &Model) -> Result<(), AppError> {
    if actor.is_approved {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Your account is pending approval by an administrator".to_string(),
        ))
    }
}

pub fn require_approved_worker(actor: &Model) -> Result<(), AppError> {
    if actor.role != Roles::Worker {
        return Err(AppError::Forbidden(
            "Only workers can perform this action".to_string(),
        ));
    }
    require_approved(actor)
}
