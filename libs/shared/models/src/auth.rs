use serde::{Deserialize, Serialize};

/// Role value that grants access to doctor management and admin promotion.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub email: String,
    pub iat: i64,
    pub exp: Option<i64>,
}

/// Decoded identity claim attached to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self { email: email.into() }
    }
}

impl From<JwtClaims> for Identity {
    fn from(claims: JwtClaims) -> Self {
        Self { email: claims.email }
    }
}

pub fn is_admin_role(role: Option<&str>) -> bool {
    role == Some(ADMIN_ROLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_admin_role_counts() {
        assert!(is_admin_role(Some("admin")));
        assert!(!is_admin_role(Some("Admin")));
        assert!(!is_admin_role(Some("admin ")));
        assert!(!is_admin_role(Some("doctor")));
        assert!(!is_admin_role(None));
    }
}
