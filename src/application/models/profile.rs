use crate::application::models::user::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of `/admin/profile/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload of `/barber/profile/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarberProfile {
    pub id: Uuid,
    pub bio: Option<String>,
    pub years_of_experience: u32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload of `/client/profile/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub id: Uuid,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Role-specific profile, one variant per profile endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Admin(AdminProfile),
    Barber(BarberProfile),
    Client(ClientProfile),
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Admin(_) => Role::Admin,
            Profile::Barber(_) => Role::Barber,
            Profile::Client(_) => Role::Client,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            Profile::Admin(p) => p.image.as_deref(),
            Profile::Barber(p) => p.image.as_deref(),
            Profile::Client(p) => p.image.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests_profile {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_barber_profile_deserialize() {
        let json = r#"
        {
            "id": "5e8c2b1a-0f3d-4c6e-8a7b-9d0e1f2a3b4c",
            "bio": "Fades and classic cuts",
            "years_of_experience": 7,
            "image": "https://cdn.example.com/b/5e8c.jpg",
            "created_at": "2024-11-02T09:30:00Z"
        }
        "#;
        let profile: BarberProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.years_of_experience, 7);

        let profile = Profile::Barber(profile);
        assert_eq!(profile.role(), Role::Barber);
        assert_eq!(profile.image(), Some("https://cdn.example.com/b/5e8c.jpg"));
    }

    #[test]
    fn test_client_profile_optional_fields() {
        let json = r#"
        {
            "id": "5e8c2b1a-0f3d-4c6e-8a7b-9d0e1f2a3b4c",
            "phone": null,
            "image": null,
            "created_at": "2025-01-15T12:00:00Z"
        }
        "#;
        let profile: ClientProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.phone, None);
        assert_eq!(Profile::Client(profile).image(), None);
    }
}
