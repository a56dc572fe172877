use crate::application::models::profile::Profile;
use crate::application::models::user::{Role, User};

/// In-memory session state, rebuilt from the persisted tokens on startup
/// and torn down on logout. The loading flags let a caller render spinners
/// while an operation is in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub profile: Option<Profile>,
    pub is_logging_in: bool,
    pub is_fetching_profile: bool,
    pub is_logging_out: bool,
}

impl SessionState {
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub(crate) fn establish(&mut self, user: User, profile: Profile) {
        self.is_authenticated = true;
        self.user = Some(user);
        self.profile = Some(profile);
    }

    pub(crate) fn reset(&mut self) {
        *self = SessionState::default();
    }
}

#[cfg(test)]
mod tests_state {
    use super::*;
    use crate::application::models::profile::AdminProfile;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn admin_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "root@example.com".to_string(),
            first_name: "Root".to_string(),
            last_name: "Admin".to_string(),
            role: Role::Admin,
            is_verified: true,
        }
    }

    #[test]
    fn test_establish_and_reset() {
        let mut state = SessionState::default();
        assert_eq!(state.role(), None);

        state.establish(
            admin_user(),
            Profile::Admin(AdminProfile {
                id: Uuid::new_v4(),
                image: None,
                created_at: Utc::now(),
            }),
        );
        assert!(state.is_authenticated);
        assert_eq!(state.role(), Some(Role::Admin));

        state.reset();
        assert_eq!(state, SessionState::default());
    }
}
