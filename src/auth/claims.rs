use serde::{Deserialize, Serialize};

/// JWT payload used for authentication and role checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,     // user ID
    pub role: String, // role granted at token issuance
    pub iat: usize,   // issued at (unix timestamp)
    pub exp: usize,   // expires at (unix timestamp)
    pub iss: String,  // issuer
    pub aud: String,  // audience
}
