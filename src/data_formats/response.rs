use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
}

impl TokenResponse {
    pub fn new(message: &str, token: String) -> Self {
        TokenResponse {
            message: message.to_string(),
            token,
        }
    }
}
