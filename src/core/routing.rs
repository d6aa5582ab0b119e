//! Screens and the role checks that decide which one is shown.

use crate::api::types::{Baby, Role};
use crate::core::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Profile,
    Questionnaire,
    Babies,
    MyBabies,
    Chat { baby_id: i64 },
    Admin,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Profile => "Profile",
            Screen::Questionnaire => "Questionnaire",
            Screen::Babies => "Babies",
            Screen::MyBabies => "My Babies",
            Screen::Chat { .. } => "Chat",
            Screen::Admin => "Admin Dashboard",
        }
    }
}

/// Where a session lands by default.
pub fn home(session: &Session) -> Screen {
    match &session.user {
        None => Screen::Login,
        Some(user) if user.role == Role::Admin => Screen::Admin,
        Some(_) => Screen::Profile,
    }
}

/// Redirects `target` when the session may not see it.
///
/// Logged-out users only see Login; logged-in users never see Login. Admins
/// are kept off the questionnaire and everyone else off the admin dashboard.
pub fn guard(target: Screen, session: &Session) -> Screen {
    let Some(user) = &session.user else {
        return Screen::Login;
    };
    match (target, user.role) {
        (Screen::Login, _) => home(session),
        (Screen::Admin, Role::User) => Screen::Questionnaire,
        (Screen::Questionnaire, Role::Admin) => Screen::Admin,
        (other, _) => other,
    }
}

/// Whether babies are open for browsing.
///
/// Derived from the baby list alone: the admin toggle flips `is_visible` on
/// every baby, and non-admin listings only ever contain visible babies.
pub fn babies_visible(babies: &[Baby]) -> bool {
    babies.iter().any(|b| b.is_visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin_session, baby, user_session};

    #[test]
    fn test_home_by_role() {
        assert_eq!(home(&Session::default()), Screen::Login);
        assert_eq!(home(&user_session()), Screen::Profile);
        assert_eq!(home(&admin_session()), Screen::Admin);
    }

    #[test]
    fn test_logged_out_always_login() {
        assert_eq!(guard(Screen::Babies, &Session::default()), Screen::Login);
        assert_eq!(guard(Screen::Admin, &Session::default()), Screen::Login);
    }

    #[test]
    fn test_role_redirects() {
        assert_eq!(guard(Screen::Admin, &user_session()), Screen::Questionnaire);
        assert_eq!(guard(Screen::Questionnaire, &admin_session()), Screen::Admin);
        assert_eq!(guard(Screen::Login, &user_session()), Screen::Profile);
        assert_eq!(
            guard(Screen::Chat { baby_id: 3 }, &user_session()),
            Screen::Chat { baby_id: 3 }
        );
    }

    #[test]
    fn test_babies_visible() {
        let mut hidden = baby(1, "Max");
        hidden.is_visible = false;
        assert!(!babies_visible(&[]));
        assert!(!babies_visible(std::slice::from_ref(&hidden)));
        assert!(babies_visible(&[hidden, baby(2, "Emma")]));
    }
}
