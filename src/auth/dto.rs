use serde::{Deserialize, Serialize};

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_exposes_only_public_fields() {
        let response = LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            user: PublicUser {
                id: 42,
                email: "shopper@example.com".to_string(),
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("shopper@example.com"));
        assert!(json.contains("\"success\":true"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn signup_request_accepts_camel_case_confirm_field() {
        let body = r#"{"email":"a@b.c","password":"p","confirmPassword":"p"}"#;
        let parsed: SignupRequest = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.confirm_password, "p");
    }
}
