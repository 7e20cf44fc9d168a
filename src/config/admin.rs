use crate::utils::hash_password;
use anyhow::Result;
use std::env;

/// Operator credentials for the admin dashboard.
///
/// The password is only ever held as a bcrypt hash. `ADMIN_PASSWORD_HASH`
/// wins over `ADMIN_PASSWORD`; the plain variant is hashed once at startup.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password_hash: String,
}

impl AdminCredentials {
    pub fn from_env() -> Result<Self> {
        let username = env::var("ADMIN_USERNAME")
            .ok()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| "admin".to_string());

        let password_hash = match env::var("ADMIN_PASSWORD_HASH") {
            Ok(hash) if !hash.trim().is_empty() => hash.trim().to_string(),
            _ => {
                let password = env::var("ADMIN_PASSWORD").map_err(|_| {
                    anyhow::anyhow!("ADMIN_PASSWORD or ADMIN_PASSWORD_HASH must be set")
                })?;
                if password.len() < 8 {
                    return Err(anyhow::anyhow!(
                        "ADMIN_PASSWORD must be at least 8 characters"
                    ));
                }
                hash_password(&password)?
            }
        };

        Ok(Self {
            username,
            password_hash,
        })
    }
}
