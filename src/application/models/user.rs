use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform role of an authenticated user. Determines which profile
/// endpoint applies and which UI surface a user lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Barber,
    Client,
}

impl Role {
    /// Endpoint serving the role-specific profile.
    pub fn profile_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/profile/",
            Role::Barber => "/barber/profile/",
            Role::Client => "/client/profile/",
        }
    }

    /// Path segment used in role-scoped routes (`/admin/...`).
    pub fn url_segment(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Barber => "barber",
            Role::Client => "client",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Role> {
        match segment {
            "admin" => Some(Role::Admin),
            "barber" => Some(Role::Barber),
            "client" => Some(Role::Client),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url_segment())
    }
}

/// Account identity as returned by `/auth/users/me/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests_role {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Barber).unwrap(), "\"BARBER\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_profile_path_dispatch() {
        assert_eq!(Role::Admin.profile_path(), "/admin/profile/");
        assert_eq!(Role::Barber.profile_path(), "/barber/profile/");
        assert_eq!(Role::Client.profile_path(), "/client/profile/");
    }

    #[test]
    fn test_segment_round_trip() {
        for role in [Role::Admin, Role::Barber, Role::Client] {
            assert_eq!(Role::from_segment(role.url_segment()), Some(role));
        }
        assert_eq!(Role::from_segment("stylist"), None);
    }

    #[test]
    fn test_user_deserialize() {
        let json = r#"
        {
            "id": "8c3f2f64-9d7a-4f8e-9f3a-1c2b3d4e5f60",
            "email": "ana@example.com",
            "first_name": "Ana",
            "last_name": "Silva",
            "role": "CLIENT"
        }
        "#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Client);
        assert_eq!(user.full_name(), "Ana Silva");
        assert!(!user.is_verified);
    }
}
