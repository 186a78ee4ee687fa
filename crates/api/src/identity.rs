use eventdesk_shared::{LoginRequest, ProfileUpdate, RegisterRequest, User};
use serde::Deserialize;
use serde_json::Value;

use crate::{ApiClient, ApiError};

#[derive(Clone, Debug, PartialEq)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

/// Decodes the identity endpoints' reply.
///
/// Two envelopes are accepted, tried in order: the nested
/// `{success: true, data: {user, token}}` and the flat `{user, token}`.
/// Anything else, or a matching envelope missing either field, is a
/// [`ApiError::MalformedResponse`].
pub fn decode_auth_response(body: &Value) -> Result<AuthPayload, ApiError> {
    let nested = body
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false)
        .then(|| body.get("data"))
        .flatten()
        .filter(|data| data.is_object());

    if let Some(data) = nested {
        tracing::debug!("identity response uses the nested envelope");
        return credentials(data);
    }

    if body.get("user").is_some() && body.get("token").is_some() {
        tracing::debug!("identity response uses the flat envelope");
        return credentials(body);
    }

    Err(ApiError::MalformedResponse(
        "expected {success, data: {user, token}} or {user, token}".to_owned(),
    ))
}

fn credentials(fields: &Value) -> Result<AuthPayload, ApiError> {
    let user = fields.get("user").filter(|user| !user.is_null());
    let token = fields
        .get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.trim().is_empty());

    let (Some(user), Some(token)) = (user, token) else {
        return Err(ApiError::MalformedResponse(
            "missing user or token in response".to_owned(),
        ));
    };

    let user = user_from(user)?;

    Ok(AuthPayload {
        user,
        token: token.to_owned(),
    })
}

fn user_from(value: &Value) -> Result<User, ApiError> {
    User::deserialize(value)
        .map_err(|err| ApiError::MalformedResponse(format!("invalid user: {err}")))
}

impl ApiClient {
    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ApiError> {
        let body = self.post("/auth/login", Some(request)).await?;
        decode_auth_response(&body)
    }

    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ApiError> {
        let body = self.post("/auth/register", Some(request)).await?;
        decode_auth_response(&body)
    }

    /// Returns the user as stored by the server, either wrapped in an
    /// envelope or bare.
    #[tracing::instrument(skip_all)]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let body = self.put("/auth/profile", update).await?;

        if let Some(user) = body.get("data").filter(|data| data.is_object()) {
            return user_from(user);
        }

        user_from(&body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user() -> Value {
        json!({
            "id": "u1",
            "email": "ana@example.com",
            "firstName": "Ana",
            "lastName": "Souza",
            "role": "USER",
            "createdAt": "2025-01-01T00:00:00.000Z"
        })
    }

    #[test]
    fn test_nested_envelope() {
        let payload = decode_auth_response(&json!({
            "success": true,
            "data": {"user": user(), "token": "jwt"}
        }))
        .unwrap();

        assert_eq!(payload.token, "jwt");
        assert_eq!(payload.user.first_name, "Ana");
    }

    #[test]
    fn test_flat_envelope() {
        let payload = decode_auth_response(&json!({"user": user(), "token": "jwt"})).unwrap();
        assert_eq!(payload.user.id, "u1");
    }

    #[test]
    fn test_malformed_envelopes() {
        let bodies = [
            json!({}),
            json!(null),
            json!({"success": true}),
            json!({"success": false, "data": {"user": user(), "token": "jwt"}}),
            json!({"success": true, "data": {"user": user()}}),
            json!({"success": true, "data": {"user": null, "token": "jwt"}}),
            json!({"user": user()}),
            json!({"user": user(), "token": ""}),
            json!({"user": {"id": 5}, "token": "jwt"}),
        ];

        for body in bodies {
            assert!(
                matches!(
                    decode_auth_response(&body),
                    Err(ApiError::MalformedResponse(_))
                ),
                "{body} should be rejected"
            );
        }
    }
}
