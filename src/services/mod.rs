pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod issue;
pub mod seed;
pub mod upload;
pub mod workflow;
