use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Non-empty string or nothing. Absent keys, `null`, `""` and non-string
/// values all collapse to `None` so every bad shape gets the same answer.
fn text_field(v: Option<Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Request body for `/signup`. Fields stay untyped at the wire level so a
/// missing or mistyped key reports "Missing fields" rather than a
/// deserialization error.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<Value>,
    pub password: Option<Value>,
    pub name: Option<Value>,
    pub role: Option<Value>,
}

/// Signup payload with every field present and non-empty.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

impl SignupRequest {
    /// `None` if any field is absent, null, empty or not a string.
    pub fn into_new_user(self) -> Option<NewUser> {
        Some(NewUser {
            email: text_field(self.email)?,
            password: text_field(self.password)?,
            name: text_field(self.name)?,
            role: text_field(self.role)?,
        })
    }
}

/// Request body for `/signin`.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: Option<Value>,
    pub password: Option<Value>,
    pub role: Option<Value>,
}

/// Sign in attempt; a field that is not a string can never match a record.
#[derive(Debug)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl From<SigninRequest> for Credentials {
    fn from(req: SigninRequest) -> Self {
        Self {
            email: text_field(req.email),
            password: text_field(req.password),
            role: text_field(req.role),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response returned after a successful sign in.
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub message: String,
    pub name: String,
    pub role: String,
}
