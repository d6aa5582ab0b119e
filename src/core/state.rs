//! # Application State
//!
//! Core business state for AI Baby. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── session: Session              // who is logged in (persisted)
//! ├── screen: Screen                // current page, always guard()-ed
//! ├── status_message: String        // status bar text
//! ├── error: Option<String>         // inline error for the current form
//! ├── in_flight: usize              // requests awaiting a response
//! ├── babies_visible: bool          // gates the Babies tab
//! ├── profile: ProfilePage
//! ├── questionnaire: Questionnaire  // answers + autosave timer
//! ├── babies: BabiesPage            // card navigator + selected baby
//! ├── my_babies: Vec<Baby>
//! ├── chat: Option<Conversation>
//! └── admin: AdminPage
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use std::time::Duration;

use crate::api::types::{Baby, Me, QuestionnaireSummary, UserSummary};
use crate::core::chat::Conversation;
use crate::core::navigator::Navigator;
use crate::core::questionnaire::Questionnaire;
use crate::core::routing::{self, Screen};
use crate::core::session::Session;

#[derive(Debug, Default)]
pub struct ProfilePage {
    pub me: Option<Me>,
    /// Success text shown under the forms.
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct BabiesPage {
    pub navigator: Navigator<Baby>,
    /// Once set, the page shows only this baby.
    pub selected: Option<Baby>,
    pub loaded: bool,
}

impl Default for BabiesPage {
    fn default() -> Self {
        Self {
            navigator: Navigator::new(Vec::new()),
            selected: None,
            loaded: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct AdminPage {
    pub questionnaires: Vec<QuestionnaireSummary>,
    pub babies: Vec<Baby>,
    pub users: Vec<UserSummary>,
    pub questionnaires_locked: bool,
    pub loaded: bool,
}

impl AdminPage {
    pub fn babies_visible(&self) -> bool {
        routing::babies_visible(&self.babies)
    }

    pub fn user_email(&self, user_id: i64) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.email.as_str())
            .or_else(|| {
                self.questionnaires
                    .iter()
                    .find(|q| q.user_id == user_id)
                    .map(|q| q.email.as_str())
            })
    }
}

pub struct App {
    pub session: Session,
    pub screen: Screen,
    pub status_message: String,
    pub error: Option<String>,
    pub in_flight: usize,
    pub babies_visible: bool,
    pub profile: ProfilePage,
    pub questionnaire: Questionnaire,
    pub babies: BabiesPage,
    pub my_babies: Vec<Baby>,
    pub chat: Option<Conversation>,
    pub admin: AdminPage,
}

impl App {
    pub fn new(session: Session, autosave_debounce: Duration) -> Self {
        let screen = routing::home(&session);
        Self {
            session,
            screen,
            status_message: String::from("Welcome to AI Baby!"),
            error: None,
            in_flight: 0,
            babies_visible: false,
            profile: ProfilePage::default(),
            questionnaire: Questionnaire::new(autosave_debounce),
            babies: BabiesPage::default(),
            my_babies: Vec::new(),
            chat: None,
            admin: AdminPage::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Drops everything fetched for the previous user.
    pub fn reset_pages(&mut self) {
        let debounce = self.questionnaire.autosave.delay();
        self.error = None;
        self.babies_visible = false;
        self.profile = ProfilePage::default();
        self.questionnaire = Questionnaire::new(debounce);
        self.babies = BabiesPage::default();
        self.my_babies.clear();
        self.chat = None;
        self.admin = AdminPage::default();
    }
}
