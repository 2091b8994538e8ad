use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Body returned by `/api/auth/login` and `/api/auth/google`.
///
/// Both fields are optional on the wire: a 2xx answer without a token is
/// treated as a failed exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// User ids arrive as strings from some deployments and as integers from others.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for user id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{"token":"eyJhbGciOi","user":{"id":"u-42","username":"rina","email":"rina@example.com"}}"#;
        let resp: AuthResponse = serde_json::from_str(json).expect("Failed to parse auth test JSON");
        assert_eq!(resp.token.as_deref(), Some("eyJhbGciOi"));
        let user = resp.user.expect("user present");
        assert_eq!(user.id, "u-42");
        assert_eq!(user.username.as_deref(), Some("rina"));
    }

    #[test]
    fn test_numeric_user_id() {
        let user: User = serde_json::from_str(r#"{"id":7,"username":"budi"}"#)
            .expect("Failed to parse user test JSON");
        assert_eq!(user.id, "7");
    }

    #[test]
    fn test_auth_response_without_token() {
        let resp: AuthResponse = serde_json::from_str(r#"{"msg":"ok"}"#)
            .expect("Failed to parse auth test JSON");
        assert!(resp.token.is_none());
        assert!(resp.user.is_none());
    }
}
