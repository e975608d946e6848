use crate::applications::receiver::{ReceivedSubmission, StagedFile};
use crate::errors::AppError;

pub const REQUIRED_FIELDS_MESSAGE: &str = "`fullName` and `email` are required fields";
pub const RESUME_REQUIRED_MESSAGE: &str = "`resume` is a required file field";

/// A submission that carries every required part.
#[derive(Debug)]
pub struct ValidSubmission {
    pub full_name: String,
    pub email: String,
    pub resume: StagedFile,
}

/// A rejected submission still owning whatever file was staged for it.
#[derive(Debug)]
pub struct Rejection {
    pub error: AppError,
    pub staged: Option<StagedFile>,
}

impl Rejection {
    /// Removes the staged file, if any, and hands back the error to report.
    pub async fn discard(self) -> AppError {
        if let Some(staged) = &self.staged {
            staged.discard().await;
        }
        self.error
    }
}

/// Checks required parts. Text fields are checked before the file, and
/// whitespace-only values count as missing; accepted values are kept verbatim.
pub fn validate_submission(received: ReceivedSubmission) -> Result<ValidSubmission, Rejection> {
    let ReceivedSubmission {
        full_name,
        email,
        resume,
    } = received;

    let (full_name, email) = match (present(full_name), present(email)) {
        (Some(full_name), Some(email)) => (full_name, email),
        _ => {
            return Err(Rejection {
                error: AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()),
                staged: resume,
            })
        }
    };

    let Some(resume) = resume else {
        return Err(Rejection {
            error: AppError::Validation(RESUME_REQUIRED_MESSAGE.to_string()),
            staged: None,
        });
    };

    Ok(ValidSubmission {
        full_name,
        email,
        resume,
    })
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
