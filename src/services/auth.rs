use crate::{
    config::admin::AdminCredentials,
    error::{AppError, AppResult},
    utils::{encode_access_token, verify_password},
};

pub struct AuthService<'a> {
    credentials: &'a AdminCredentials,
}

impl<'a> AuthService<'a> {
    pub fn new(credentials: &'a AdminCredentials) -> Self {
        Self { credentials }
    }

    /// Check operator credentials and issue an access token.
    /// Returns (token, expires_in_seconds).
    pub fn login(&self, username: &str, password: &str) -> AppResult<(String, u64)> {
        // bcrypt runs even when the username is wrong.
        let password_ok = verify_password(password, &self.credentials.password_hash)?;
        if username != self.credentials.username || !password_ok {
            tracing::warn!("Rejected admin login for '{}'", username);
            return Err(AppError::Unauthorized);
        }

        let issued = encode_access_token(username)?;
        tracing::info!("Admin '{}' logged in", username);
        Ok(issued)
    }
}
