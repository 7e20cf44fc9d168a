pub mod jwt;
pub mod password;
pub mod report_id;

pub use jwt::encode_access_token;
pub use password::{hash_password, verify_password};
pub use report_id::{generate_report_id, is_valid_report_id};
