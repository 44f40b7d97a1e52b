/// Reasons a profile update is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileUpdateError {
    /// The account being edited does not exist.
    #[error("The page you were looking for doesn't exist.")]
    NotFound,

    #[error("Invalid profile request: {0}")]
    InvalidRequest(String),

    #[error("Passwords must match")]
    PasswordMismatch,
}

impl ProfileUpdateError {
    /// Human-readable reason shown next to the form.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
