use std::fmt;

/// Prefix the API expects in front of a bearer token
pub const TOKEN_SCHEME: &str = "AnaplanAuthToken";

/// Opaque token issued by the identity service
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        AuthToken(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header for API calls
    pub fn authorization_header(&self) -> String {
        format!("{} {}", TOKEN_SCHEME, self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Authenticated session scoped to one model.
///
/// Created once after authentication and passed by reference to every
/// operation. It carries no mutable state.
#[derive(Debug, Clone)]
pub struct Connection {
    token: AuthToken,
    workspace_id: String,
    model_id: String,
}

impl Connection {
    pub fn new(
        token: AuthToken,
        workspace_id: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            token,
            workspace_id: workspace_id.into(),
            model_id: model_id.into(),
        }
    }

    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}
