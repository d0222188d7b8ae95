//! DTOs de autenticación

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request de login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 100))]
    pub username: String,

    #[validate(length(min = 1, max = 100))]
    pub password: String,
}

/// Response de login con el token emitido
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub nombre_completo: String,
    pub roles: Vec<String>,
}
