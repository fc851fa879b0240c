use serde::{Deserialize, Serialize};

use crate::users::repo_types::PublicUser;

/// Request body for self-service registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for the admin-provisioning route; `secretKey` must match
/// the configured admin secret.
#[derive(Debug, Deserialize)]
pub struct RegisterAdminRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "secretKey")]
    pub secret_key: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register, register-admin and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}
