//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::time::Duration;

use crate::api::types::{Baby, LifeStage, Role};
use crate::core::session::{Session, User};
use crate::core::state::App;

pub fn baby(id: i64, name: &str) -> Baby {
    Baby {
        id,
        name: name.to_string(),
        age: "6 months".to_string(),
        attributes: vec!["Curious".to_string()],
        image_path: format!("/images/baby{id}.png"),
        is_visible: true,
        life_stages: Vec::new(),
        user_id: None,
    }
}

pub fn baby_with_stages(id: i64, name: &str, ages: &[&str]) -> Baby {
    let mut b = baby(id, name);
    b.life_stages = ages
        .iter()
        .map(|age| LifeStage {
            age: age.to_string(),
            description: format!("{name} at {age}"),
            image_path: format!("/images/baby{id}_{}.png", age.replace(' ', "_")),
        })
        .collect();
    b
}

fn session_for(email: &str, role: Role) -> Session {
    Session::logged_in(User {
        email: email.to_string(),
        role,
        token: "test-token".to_string(),
        selected_baby_id: None,
    })
}

pub fn user_session() -> Session {
    session_for("user@example.com", Role::User)
}

pub fn admin_session() -> Session {
    session_for("admin@example.com", Role::Admin)
}

/// Creates a logged-out test App.
pub fn test_app() -> App {
    test_app_with(Session::default())
}

pub fn test_app_with(session: Session) -> App {
    App::new(session, Duration::from_millis(1000))
}
