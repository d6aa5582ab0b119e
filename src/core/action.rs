//! # Actions
//!
//! Everything that can happen in AI Baby becomes an `Action`.
//! User swipes a card? That's `Action::Pointer(event)`.
//! Server answers? That's `Action::Completed(response)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns the side effects the adapter must carry out.
//! No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effects
//! ```
//!
//! Requests go out as [`Effect::Request`]; the adapter runs them and feeds
//! the outcome back as `Completed` or `Failed`.

use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use log::{debug, info, warn};

use crate::api::types::{
    AnswerMap, AuthResponse, Baby, ChatHistory, LifeStage, Me, QuestionnaireData,
    QuestionnaireSummary, SendMessageResponse, UserSummary,
};
use crate::api::{ApiError, ErrorKind};
use crate::core::chat::Conversation;
use crate::core::gesture::PointerEvent;
use crate::core::navigator::Navigator;
use crate::core::questionnaire::AnswerEdit;
use crate::core::routing::{self, Screen};
use crate::core::session::{Session, User};
use crate::core::state::App;
use crate::core::validation::{ValidationError, validate_credentials, validate_new_password};

#[derive(Debug, Clone)]
pub enum Action {
    Navigate(Screen),
    Login { email: String, password: String },
    Register { email: String, password: String },
    Logout,
    Quit,
    /// Periodic clock from the event loop; drives autosave.
    Tick(Instant),

    // Questionnaire
    EditAnswer { edit: AnswerEdit, at: Instant },
    UploadImage(PathBuf),

    // Babies
    Pointer(PointerEvent),
    JumpTo(usize),
    SelectBaby(i64),
    OpenChat { baby: Baby, stage: Option<LifeStage> },

    // Chat
    SendChat(String),

    // Profile
    ChangePassword { current: String, new: String, confirm: String },
    SavePartner(String),

    // Admin
    ToggleBabiesVisible,
    ToggleQuestionnaireLock,
    AssignBaby { baby_id: i64, user_id: i64 },

    // Request outcomes
    Completed(Response),
    Failed { request: Request, error: ApiError },
}

/// A server call the adapter should make on the reducer's behalf.
///
/// `Debug` leaves out passwords and message bodies so requests can be logged.
#[derive(Clone, PartialEq)]
pub enum Request {
    Login { email: String, password: String },
    Register { email: String, password: String },
    LoadProfile,
    ChangePassword { current: String, new: String },
    SavePartner(String),
    LoadQuestionnaire,
    SaveQuestionnaire(AnswerMap),
    UploadImage(PathBuf),
    LoadBabies,
    LoadMyBabies,
    SelectBaby(i64),
    LoadChat(i64),
    SendChat {
        baby_id: i64,
        message: String,
        stage: Option<LifeStage>,
    },
    LoadAdmin,
    SetBabiesVisible(bool),
    SetQuestionnairesLocked(bool),
    AssignBaby { baby_id: i64, user_id: i64 },
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Login { email, .. } => write!(f, "Login({email})"),
            Request::Register { email, .. } => write!(f, "Register({email})"),
            Request::LoadProfile => f.write_str("LoadProfile"),
            Request::ChangePassword { .. } => f.write_str("ChangePassword"),
            Request::SavePartner(_) => f.write_str("SavePartner"),
            Request::LoadQuestionnaire => f.write_str("LoadQuestionnaire"),
            Request::SaveQuestionnaire(answers) => {
                write!(f, "SaveQuestionnaire({} answers)", answers.len())
            }
            Request::UploadImage(path) => write!(f, "UploadImage({})", path.display()),
            Request::LoadBabies => f.write_str("LoadBabies"),
            Request::LoadMyBabies => f.write_str("LoadMyBabies"),
            Request::SelectBaby(id) => write!(f, "SelectBaby({id})"),
            Request::LoadChat(id) => write!(f, "LoadChat({id})"),
            Request::SendChat { baby_id, stage, .. } => match stage {
                Some(stage) => write!(f, "SendChat({baby_id} at {})", stage.age),
                None => write!(f, "SendChat({baby_id})"),
            },
            Request::LoadAdmin => f.write_str("LoadAdmin"),
            Request::SetBabiesVisible(v) => write!(f, "SetBabiesVisible({v})"),
            Request::SetQuestionnairesLocked(v) => write!(f, "SetQuestionnairesLocked({v})"),
            Request::AssignBaby { baby_id, user_id } => {
                write!(f, "AssignBaby({baby_id} -> {user_id})")
            }
        }
    }
}

/// Successful outcome of a [`Request`].
#[derive(Debug, Clone)]
pub enum Response {
    LoggedIn(AuthResponse),
    Profile { me: Me, babies_visible: bool },
    PasswordChanged,
    PartnerSaved(String),
    Questionnaire {
        data: QuestionnaireData,
        locked: bool,
        babies_visible: bool,
    },
    QuestionnaireSaved,
    ImageUploaded(String),
    Babies {
        babies: Vec<Baby>,
        selected: Option<Baby>,
    },
    MyBabies {
        babies: Vec<Baby>,
        babies_visible: bool,
    },
    BabySelected(i64),
    ChatHistory { baby_id: i64, history: ChatHistory },
    ChatReply {
        baby_id: i64,
        sent: String,
        reply: SendMessageResponse,
    },
    Admin {
        questionnaires: Vec<QuestionnaireSummary>,
        babies: Vec<Baby>,
        users: Vec<UserSummary>,
        locked: bool,
    },
    BabiesVisibilitySet(bool),
    QuestionnairesLockSet(bool),
    BabyAssigned { baby_id: i64, user_id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Request(Request),
    /// Persist `app.session`.
    SaveSession,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Vec<Effect> {
    match action {
        Action::Navigate(target) => navigate(app, target),
        Action::Login { email, password } => login(app, email, password, false),
        Action::Register { email, password } => login(app, email, password, true),
        Action::Logout => {
            info!("Logging out");
            app.session = Session::default();
            app.reset_pages();
            app.screen = Screen::Login;
            app.status_message = "Logged out".to_string();
            vec![Effect::SaveSession]
        }
        Action::Quit => vec![Effect::Quit],
        Action::Tick(now) => {
            if app.questionnaire.autosave.take_due(now) {
                save_questionnaire(app)
            } else {
                vec![]
            }
        }

        Action::EditAnswer { edit, at } => {
            if !app.questionnaire.apply(edit, at) {
                app.status_message = "Questionnaires are locked by the admin".to_string();
            }
            vec![]
        }
        Action::UploadImage(path) => {
            if app.questionnaire.locked {
                app.status_message = "Questionnaires are locked by the admin".to_string();
                return vec![];
            }
            app.status_message = format!("Uploading {}...", path.display());
            vec![request(app, Request::UploadImage(path))]
        }

        Action::Pointer(event) => {
            if app.screen != Screen::Babies {
                return vec![];
            }
            if let Some(index) = app.babies.navigator.handle_pointer(event) {
                peek(app, index);
            }
            vec![]
        }
        Action::JumpTo(index) => {
            if app.screen == Screen::Babies
                && let Some(index) = app.babies.navigator.jump_to(index)
            {
                peek(app, index);
            }
            vec![]
        }
        Action::SelectBaby(baby_id) => vec![request(app, Request::SelectBaby(baby_id))],
        Action::OpenChat { baby, stage } => {
            let baby_id = baby.id;
            app.chat = Some(Conversation::new(baby, stage));
            navigate(app, Screen::Chat { baby_id })
        }

        Action::SendChat(text) => {
            let Some(chat) = app.chat.as_mut() else {
                return vec![];
            };
            if chat.limit_reached {
                app.status_message = "Message limit reached for this conversation".to_string();
                return vec![];
            }
            let Some(message) = chat.begin_send(&text) else {
                return vec![];
            };
            let req = Request::SendChat {
                baby_id: chat.baby_id(),
                message,
                stage: chat.stage.clone(),
            };
            vec![request(app, req)]
        }

        Action::ChangePassword {
            current,
            new,
            confirm,
        } => {
            app.profile.notice = None;
            let checked = if current.is_empty() {
                Err(ValidationError::EmptyField("Current password"))
            } else {
                validate_new_password(&new, &confirm)
            };
            match checked {
                Ok(()) => {
                    app.profile.error = None;
                    vec![request(app, Request::ChangePassword { current, new })]
                }
                Err(e) => {
                    app.profile.error = Some(e.to_string());
                    vec![]
                }
            }
        }
        Action::SavePartner(partner) => {
            app.profile.notice = None;
            app.profile.error = None;
            vec![request(app, Request::SavePartner(partner.trim().to_string()))]
        }

        Action::ToggleBabiesVisible => {
            let next = !app.admin.babies_visible();
            vec![request(app, Request::SetBabiesVisible(next))]
        }
        Action::ToggleQuestionnaireLock => {
            let next = !app.admin.questionnaires_locked;
            vec![request(app, Request::SetQuestionnairesLocked(next))]
        }
        Action::AssignBaby { baby_id, user_id } => {
            vec![request(app, Request::AssignBaby { baby_id, user_id })]
        }

        Action::Completed(response) => {
            app.in_flight = app.in_flight.saturating_sub(1);
            completed(app, response)
        }
        Action::Failed { request, error } => {
            app.in_flight = app.in_flight.saturating_sub(1);
            failed(app, request, error)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn request(app: &mut App, request: Request) -> Effect {
    app.in_flight += 1;
    debug!("Queueing request {:?}", request);
    Effect::Request(request)
}

/// Moves to `target` (after the role guard) and asks for the data it shows.
fn navigate(app: &mut App, target: Screen) -> Vec<Effect> {
    let screen = routing::guard(target, &app.session);
    if screen != target {
        info!("Redirecting {:?} -> {:?}", target, screen);
    }
    if screen == Screen::Babies && !app.babies_visible && !app.session.is_admin() {
        app.status_message = "Babies are not available yet".to_string();
        return vec![];
    }

    let mut effects = Vec::new();
    // Leaving the questionnaire flushes a pending autosave instead of dropping it.
    if app.screen == Screen::Questionnaire
        && screen != Screen::Questionnaire
        && app.questionnaire.autosave.is_pending()
    {
        app.questionnaire.autosave.cancel();
        effects.extend(save_questionnaire(app));
    }

    app.screen = screen;
    app.error = None;
    let load = match screen {
        Screen::Login => None,
        Screen::Profile => Some(Request::LoadProfile),
        Screen::Questionnaire => Some(Request::LoadQuestionnaire),
        Screen::Babies => Some(Request::LoadBabies),
        Screen::MyBabies => Some(Request::LoadMyBabies),
        Screen::Chat { baby_id } => {
            if app.chat.as_ref().map(Conversation::baby_id) == Some(baby_id) {
                Some(Request::LoadChat(baby_id))
            } else {
                // Nothing to show without the baby; send the user to pick one.
                warn!("No conversation open for baby {baby_id}");
                app.screen = Screen::MyBabies;
                Some(Request::LoadMyBabies)
            }
        }
        Screen::Admin => Some(Request::LoadAdmin),
    };
    effects.extend(load.map(|r| request(app, r)));
    effects
}

fn login(app: &mut App, email: String, password: String, register: bool) -> Vec<Effect> {
    let email = email.trim().to_string();
    if let Err(e) = validate_credentials(&email, &password) {
        app.error = Some(e.to_string());
        return vec![];
    }
    app.error = None;
    app.status_message = if register {
        "Creating account...".to_string()
    } else {
        "Logging in...".to_string()
    };
    let req = if register {
        Request::Register { email, password }
    } else {
        Request::Login { email, password }
    };
    vec![request(app, req)]
}

fn save_questionnaire(app: &mut App) -> Vec<Effect> {
    if app.questionnaire.locked || app.session.user.is_none() {
        return vec![];
    }
    app.questionnaire.saving = true;
    let answers = app.questionnaire.answers.clone();
    vec![request(app, Request::SaveQuestionnaire(answers))]
}

/// Reports that the navigator moved to `index`.
fn peek(app: &mut App, index: usize) {
    let total = app.babies.navigator.len();
    if let Some(baby) = app.babies.navigator.current() {
        info!("Peeking at baby {} ({}/{})", baby.id, index + 1, total);
        app.status_message = format!("Now viewing {} ({}/{})", baby.name, index + 1, total);
    }
}

fn set_selected_baby(app: &mut App, baby_id: Option<i64>) -> bool {
    match app.session.user.as_mut() {
        Some(user) if user.selected_baby_id != baby_id => {
            user.selected_baby_id = baby_id;
            true
        }
        _ => false,
    }
}

// ============================================================================
// Outcomes
// ============================================================================

fn completed(app: &mut App, response: Response) -> Vec<Effect> {
    match response {
        Response::LoggedIn(auth) => {
            info!("Logged in as {} ({:?})", auth.email, auth.role);
            app.reset_pages();
            app.status_message = format!("Welcome, {}", auth.email);
            app.session = Session::logged_in(User::from(auth));
            let home = routing::home(&app.session);
            let mut effects = vec![Effect::SaveSession];
            effects.extend(navigate(app, home));
            effects
        }
        Response::Profile { me, babies_visible } => {
            app.babies_visible = babies_visible;
            let changed = set_selected_baby(app, me.selected_baby_id);
            app.profile.me = Some(me);
            if changed {
                vec![Effect::SaveSession]
            } else {
                vec![]
            }
        }
        Response::PasswordChanged => {
            app.profile.error = None;
            app.profile.notice = Some("Password changed successfully".to_string());
            vec![]
        }
        Response::PartnerSaved(partner) => {
            if let Some(me) = app.profile.me.as_mut() {
                me.partner = (!partner.is_empty()).then_some(partner);
            }
            app.profile.notice = Some("Partner updated".to_string());
            vec![]
        }
        Response::Questionnaire {
            data,
            locked,
            babies_visible,
        } => {
            app.babies_visible = babies_visible;
            // A save still waiting to fire means local edits are newer.
            if !app.questionnaire.autosave.is_pending() && !app.questionnaire.saving {
                app.questionnaire.load(data, locked);
            } else {
                app.questionnaire.locked = locked;
            }
            vec![]
        }
        Response::QuestionnaireSaved => {
            app.questionnaire.saving = false;
            app.questionnaire.last_saved = Some(chrono::Local::now());
            app.status_message = "Questionnaire saved".to_string();
            vec![]
        }
        Response::ImageUploaded(filename) => {
            app.status_message = format!("Uploaded {filename}");
            app.questionnaire.image_paths.push(filename);
            vec![]
        }
        Response::Babies { babies, selected } => {
            app.babies_visible = routing::babies_visible(&babies);
            app.babies.navigator = Navigator::new(babies);
            app.babies.selected = selected;
            app.babies.loaded = true;
            let selected_id = app.babies.selected.as_ref().map(|b| b.id);
            let changed = set_selected_baby(app, selected_id);
            if changed {
                vec![Effect::SaveSession]
            } else {
                vec![]
            }
        }
        Response::MyBabies {
            babies,
            babies_visible,
        } => {
            app.babies_visible = babies_visible;
            app.my_babies = babies;
            vec![]
        }
        Response::BabySelected(baby_id) => {
            let chosen = app
                .babies
                .navigator
                .cards()
                .iter()
                .chain(app.chat.as_ref().map(|c| &c.baby))
                .chain(app.my_babies.iter())
                .find(|b| b.id == baby_id)
                .cloned();
            if let Some(baby) = &chosen {
                app.status_message = format!("You chose {}!", baby.name);
            }
            app.babies.selected = chosen;
            set_selected_baby(app, Some(baby_id));
            let mut effects = vec![Effect::SaveSession];
            // A choice made from a chat lands back on the Babies page.
            if matches!(app.screen, Screen::Chat { .. }) {
                effects.extend(navigate(app, Screen::Babies));
            }
            effects
        }
        Response::ChatHistory { baby_id, history } => {
            match app.chat.as_mut() {
                Some(chat) if chat.baby_id() == baby_id => chat.apply_history(history),
                _ => debug!("Dropping stale chat history for baby {baby_id}"),
            }
            vec![]
        }
        Response::ChatReply {
            baby_id,
            sent,
            reply,
        } => {
            match app.chat.as_mut() {
                Some(chat) if chat.baby_id() == baby_id => {
                    chat.apply_reply(sent, reply);
                    if chat.limit_reached {
                        app.status_message = "Message limit reached".to_string();
                    }
                }
                _ => debug!("Dropping stale chat reply for baby {baby_id}"),
            }
            vec![]
        }
        Response::Admin {
            questionnaires,
            babies,
            users,
            locked,
        } => {
            app.admin.questionnaires = questionnaires;
            app.admin.babies = babies;
            app.admin.users = users;
            app.admin.questionnaires_locked = locked;
            app.admin.loaded = true;
            vec![]
        }
        Response::BabiesVisibilitySet(visible) => {
            for baby in &mut app.admin.babies {
                baby.is_visible = visible;
            }
            app.babies_visible = visible;
            app.status_message = if visible {
                "Babies are now visible to users".to_string()
            } else {
                "Babies are now hidden from users".to_string()
            };
            vec![]
        }
        Response::QuestionnairesLockSet(locked) => {
            app.admin.questionnaires_locked = locked;
            app.status_message = if locked {
                "Questionnaires locked".to_string()
            } else {
                "Questionnaires unlocked".to_string()
            };
            vec![]
        }
        Response::BabyAssigned { baby_id, user_id } => {
            let email = app.admin.user_email(user_id).unwrap_or("user").to_string();
            if let Some(baby) = app.admin.babies.iter_mut().find(|b| b.id == baby_id) {
                baby.user_id = Some(user_id);
                app.status_message = format!("Assigned {} to {}", baby.name, email);
            }
            vec![]
        }
    }
}

fn failed(app: &mut App, request: Request, error: ApiError) -> Vec<Effect> {
    warn!("Request {:?} failed: {}", request, error);
    let message = error.user_message();
    let is_login = matches!(request, Request::Login { .. } | Request::Register { .. });

    if error.is_unauthenticated() && !is_login && app.session.user.is_some() {
        info!("Token rejected, clearing session");
        app.session = Session::default();
        app.reset_pages();
        app.screen = Screen::Login;
        app.status_message = "Session expired, please log in again".to_string();
        return vec![Effect::SaveSession];
    }

    match request {
        Request::Login { .. } | Request::Register { .. } => {
            app.error = Some(message);
            app.status_message = "Login failed".to_string();
        }
        Request::ChangePassword { .. } | Request::SavePartner(_) => {
            app.profile.error = Some(message);
        }
        Request::SaveQuestionnaire(_) => {
            app.questionnaire.saving = false;
            if error.kind() == ErrorKind::Authorization {
                app.questionnaire.locked = true;
                app.status_message = "Questionnaires are locked by the admin".to_string();
            } else {
                app.status_message = format!("Save failed: {message}");
            }
        }
        Request::UploadImage(_) => {
            app.status_message = format!("Upload failed: {message}");
        }
        Request::SendChat { baby_id, .. } => {
            if let Some(chat) = app.chat.as_mut().filter(|c| c.baby_id() == baby_id) {
                chat.fail_send(&error);
            }
            app.status_message = message;
        }
        other => {
            app.status_message = message;
            // Forbidden page data: fall back to the role's home screen.
            let is_page_load = matches!(
                other,
                Request::LoadProfile
                    | Request::LoadQuestionnaire
                    | Request::LoadBabies
                    | Request::LoadMyBabies
                    | Request::LoadChat(_)
                    | Request::LoadAdmin
            );
            if is_page_load && error.kind() == ErrorKind::Authorization {
                let home = routing::home(&app.session);
                if app.screen != home {
                    app.screen = home;
                }
            }
        }
    }
    vec![]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{ChatRole, Role};
    use crate::test_support::{admin_session, baby, test_app, test_app_with, user_session};
    use std::time::Duration;

    fn api_error(status: u16, message: &str) -> ApiError {
        ApiError::Api {
            status,
            message: message.to_string(),
            limit_reached: false,
        }
    }

    fn load_babies(app: &mut App, babies: Vec<Baby>) {
        app.babies_visible = true;
        update(app, Action::Navigate(Screen::Babies));
        update(
            app,
            Action::Completed(Response::Babies {
                babies,
                selected: None,
            }),
        );
    }

    // ------------------------------------------------------------------------
    // Auth & routing
    // ------------------------------------------------------------------------

    #[test]
    fn test_login_validates_before_sending() {
        let mut app = test_app();
        let effects = update(
            &mut app,
            Action::Login {
                email: " ".into(),
                password: "pw".into(),
            },
        );
        assert!(effects.is_empty());
        assert!(app.error.is_some());
        assert!(!app.is_loading());
    }

    #[test]
    fn test_login_success_saves_session_and_routes_home() {
        let mut app = test_app();
        let effects = update(
            &mut app,
            Action::Login {
                email: "a@b.c".into(),
                password: "secret".into(),
            },
        );
        assert_eq!(
            effects,
            vec![Effect::Request(Request::Login {
                email: "a@b.c".into(),
                password: "secret".into()
            })]
        );
        assert!(app.is_loading());

        let effects = update(
            &mut app,
            Action::Completed(Response::LoggedIn(AuthResponse {
                token: "tok".into(),
                role: Role::User,
                email: "a@b.c".into(),
            })),
        );
        assert_eq!(
            effects,
            vec![Effect::SaveSession, Effect::Request(Request::LoadProfile)]
        );
        assert_eq!(app.screen, Screen::Profile);
        assert_eq!(app.session.token(), Some("tok"));
    }

    #[test]
    fn test_admin_login_lands_on_dashboard() {
        let mut app = test_app();
        let effects = update(
            &mut app,
            Action::Completed(Response::LoggedIn(AuthResponse {
                token: "tok".into(),
                role: Role::Admin,
                email: "admin@x.y".into(),
            })),
        );
        assert_eq!(app.screen, Screen::Admin);
        assert!(effects.contains(&Effect::Request(Request::LoadAdmin)));
    }

    #[test]
    fn test_login_failure_shows_inline_error() {
        let mut app = test_app();
        update(
            &mut app,
            Action::Failed {
                request: Request::Login {
                    email: "a@b.c".into(),
                    password: "nope".into(),
                },
                error: api_error(401, "Invalid credentials"),
            },
        );
        assert_eq!(app.error.as_deref(), Some("Invalid credentials"));
        assert_eq!(app.screen, Screen::Login);
    }

    #[test]
    fn test_navigate_is_guarded() {
        let mut app = test_app_with(user_session());
        update(&mut app, Action::Navigate(Screen::Admin));
        assert_eq!(app.screen, Screen::Questionnaire);

        let mut app = test_app_with(admin_session());
        update(&mut app, Action::Navigate(Screen::Questionnaire));
        assert_eq!(app.screen, Screen::Admin);
    }

    #[test]
    fn test_babies_tab_disabled_until_visible() {
        let mut app = test_app_with(user_session());
        let effects = update(&mut app, Action::Navigate(Screen::Babies));
        assert!(effects.is_empty());
        assert_eq!(app.screen, Screen::Profile);
        assert_eq!(app.status_message, "Babies are not available yet");
    }

    #[test]
    fn test_expired_token_clears_session() {
        let mut app = test_app_with(user_session());
        let effects = update(
            &mut app,
            Action::Failed {
                request: Request::LoadProfile,
                error: api_error(401, "Token expired"),
            },
        );
        assert_eq!(effects, vec![Effect::SaveSession]);
        assert_eq!(app.session, Session::default());
        assert_eq!(app.screen, Screen::Login);
    }

    #[test]
    fn test_forbidden_page_falls_back_home() {
        let mut app = test_app_with(user_session());
        app.babies_visible = true;
        update(&mut app, Action::Navigate(Screen::Babies));
        update(
            &mut app,
            Action::Failed {
                request: Request::LoadBabies,
                error: api_error(403, "Forbidden"),
            },
        );
        assert_eq!(app.screen, Screen::Profile);
        assert_eq!(app.status_message, "Forbidden");
    }

    #[test]
    fn test_logout() {
        let mut app = test_app_with(user_session());
        app.my_babies.push(baby(1, "Lily"));
        let effects = update(&mut app, Action::Logout);
        assert_eq!(effects, vec![Effect::SaveSession]);
        assert!(app.session.user.is_none());
        assert!(app.my_babies.is_empty());
        assert_eq!(app.screen, Screen::Login);
    }

    #[test]
    fn test_in_flight_counter_balances() {
        let mut app = test_app_with(user_session());
        update(&mut app, Action::Navigate(Screen::MyBabies));
        assert!(app.is_loading());
        update(
            &mut app,
            Action::Completed(Response::MyBabies {
                babies: vec![baby(1, "Lily")],
                babies_visible: true,
            }),
        );
        assert!(!app.is_loading());
        assert_eq!(app.my_babies.len(), 1);
        assert!(app.babies_visible);
    }

    // ------------------------------------------------------------------------
    // Babies & navigator
    // ------------------------------------------------------------------------

    #[test]
    fn test_swipe_left_peeks_next_baby() {
        let mut app = test_app_with(user_session());
        load_babies(&mut app, vec![baby(1, "A"), baby(2, "B"), baby(3, "C")]);

        update(&mut app, Action::Pointer(PointerEvent::Down(300.0)));
        update(&mut app, Action::Pointer(PointerEvent::Move(180.0)));
        update(&mut app, Action::Pointer(PointerEvent::Up));

        assert_eq!(app.babies.navigator.current_index(), 1);
        assert_eq!(app.status_message, "Now viewing B (2/3)");
    }

    #[test]
    fn test_pointer_ignored_off_babies_screen() {
        let mut app = test_app_with(user_session());
        load_babies(&mut app, vec![baby(1, "A"), baby(2, "B")]);
        update(&mut app, Action::Navigate(Screen::Profile));
        update(&mut app, Action::JumpTo(1));
        assert_eq!(app.babies.navigator.current_index(), 0);
    }

    #[test]
    fn test_select_baby_updates_session() {
        let mut app = test_app_with(user_session());
        load_babies(&mut app, vec![baby(1, "A"), baby(2, "B")]);
        update(&mut app, Action::JumpTo(1));

        let effects = update(&mut app, Action::SelectBaby(2));
        assert_eq!(effects, vec![Effect::Request(Request::SelectBaby(2))]);
        let effects = update(&mut app, Action::Completed(Response::BabySelected(2)));
        assert_eq!(effects, vec![Effect::SaveSession]);
        assert_eq!(app.babies.selected.as_ref().map(|b| b.name.as_str()), Some("B"));
        assert_eq!(
            app.session.user.as_ref().and_then(|u| u.selected_baby_id),
            Some(2)
        );
    }

    #[test]
    fn test_select_from_chat_returns_to_babies() {
        let mut app = test_app_with(user_session());
        app.babies_visible = true;
        update(
            &mut app,
            Action::OpenChat {
                baby: baby(7, "Max"),
                stage: None,
            },
        );
        update(&mut app, Action::SelectBaby(7));
        let effects = update(&mut app, Action::Completed(Response::BabySelected(7)));
        assert_eq!(
            effects,
            vec![
                Effect::SaveSession,
                Effect::Request(Request::LoadBabies)
            ]
        );
        assert_eq!(app.screen, Screen::Babies);
        assert_eq!(app.babies.selected.as_ref().map(|b| b.id), Some(7));
    }

    #[test]
    fn test_request_debug_hides_passwords() {
        let login = Request::Login {
            email: "a@b.c".into(),
            password: "hunter22".into(),
        };
        let change = Request::ChangePassword {
            current: "hunter22".into(),
            new: "swordfish".into(),
        };
        assert_eq!(format!("{login:?}"), "Login(a@b.c)");
        assert!(!format!("{change:?}").contains("hunter22"));
    }

    #[test]
    fn test_loading_babies_sets_visibility() {
        let mut app = test_app_with(user_session());
        let mut hidden = baby(1, "A");
        hidden.is_visible = false;
        update(
            &mut app,
            Action::Completed(Response::Babies {
                babies: vec![hidden],
                selected: None,
            }),
        );
        assert!(!app.babies_visible);
    }

    // ------------------------------------------------------------------------
    // Questionnaire
    // ------------------------------------------------------------------------

    #[test]
    fn test_autosave_fires_after_quiet_period() {
        let mut app = test_app_with(user_session());
        update(&mut app, Action::Navigate(Screen::Questionnaire));
        update(
            &mut app,
            Action::Completed(Response::Questionnaire {
                data: QuestionnaireData::default(),
                locked: false,
                babies_visible: false,
            }),
        );

        let t0 = Instant::now();
        for (i, ch) in ["c", "ch", "che"].iter().enumerate() {
            update(
                &mut app,
                Action::EditAnswer {
                    edit: AnswerEdit::Text {
                        key: "hobbies",
                        value: ch.to_string(),
                    },
                    at: t0 + Duration::from_millis(100 * i as u64),
                },
            );
        }
        assert!(update(&mut app, Action::Tick(t0 + Duration::from_millis(500))).is_empty());

        let effects = update(&mut app, Action::Tick(t0 + Duration::from_millis(1300)));
        let [Effect::Request(Request::SaveQuestionnaire(answers))] = effects.as_slice() else {
            panic!("expected one save, got {effects:?}");
        };
        assert_eq!(answers.get("hobbies").and_then(|v| v.as_str()), Some("che"));
        assert!(app.questionnaire.saving);

        update(&mut app, Action::Completed(Response::QuestionnaireSaved));
        assert!(!app.questionnaire.saving);
        assert!(app.questionnaire.last_saved.is_some());
    }

    #[test]
    fn test_locked_questionnaire_ignores_edits() {
        let mut app = test_app_with(user_session());
        update(
            &mut app,
            Action::Completed(Response::Questionnaire {
                data: QuestionnaireData::default(),
                locked: true,
                babies_visible: false,
            }),
        );
        update(
            &mut app,
            Action::EditAnswer {
                edit: AnswerEdit::Choose {
                    key: "energy_level",
                    option: "Calm",
                },
                at: Instant::now(),
            },
        );
        assert!(app.questionnaire.answers.is_empty());
        assert!(update(&mut app, Action::UploadImage("me.png".into())).is_empty());
    }

    #[test]
    fn test_save_forbidden_marks_locked() {
        let mut app = test_app_with(user_session());
        update(
            &mut app,
            Action::Failed {
                request: Request::SaveQuestionnaire(AnswerMap::new()),
                error: api_error(403, "Questionnaires are locked"),
            },
        );
        assert!(app.questionnaire.locked);
        assert_eq!(app.screen, Screen::Profile, "a failed save never navigates");
    }

    #[test]
    fn test_leaving_questionnaire_flushes_autosave() {
        let mut app = test_app_with(user_session());
        update(&mut app, Action::Navigate(Screen::Questionnaire));
        update(
            &mut app,
            Action::EditAnswer {
                edit: AnswerEdit::Text {
                    key: "hobbies",
                    value: "x".into(),
                },
                at: Instant::now(),
            },
        );
        let effects = update(&mut app, Action::Navigate(Screen::Profile));
        assert!(matches!(
            effects.as_slice(),
            [
                Effect::Request(Request::SaveQuestionnaire(_)),
                Effect::Request(Request::LoadProfile)
            ]
        ));
    }

    // ------------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------------

    #[test]
    fn test_open_chat_and_exchange() {
        let mut app = test_app_with(user_session());
        let effects = update(
            &mut app,
            Action::OpenChat {
                baby: baby(4, "Lily"),
                stage: None,
            },
        );
        assert_eq!(effects, vec![Effect::Request(Request::LoadChat(4))]);
        assert_eq!(app.screen, Screen::Chat { baby_id: 4 });

        let effects = update(&mut app, Action::SendChat("hi".into()));
        assert_eq!(
            effects,
            vec![Effect::Request(Request::SendChat {
                baby_id: 4,
                message: "hi".into(),
                stage: None
            })]
        );
        update(
            &mut app,
            Action::Completed(Response::ChatReply {
                baby_id: 4,
                sent: "hi".into(),
                reply: SendMessageResponse {
                    message: "goo".into(),
                    message_count: 2,
                    limit_reached: false,
                },
            }),
        );
        let chat = app.chat.as_ref().unwrap();
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[1].role, ChatRole::Assistant);
    }

    #[test]
    fn test_chat_limit_error() {
        let mut app = test_app_with(user_session());
        update(
            &mut app,
            Action::OpenChat {
                baby: baby(4, "Lily"),
                stage: None,
            },
        );
        update(&mut app, Action::SendChat("one more".into()));
        update(
            &mut app,
            Action::Failed {
                request: Request::SendChat {
                    baby_id: 4,
                    message: "one more".into(),
                    stage: None,
                },
                error: ApiError::Api {
                    status: 400,
                    message: "Message limit reached".into(),
                    limit_reached: true,
                },
            },
        );
        let chat = app.chat.as_ref().unwrap();
        assert!(chat.limit_reached);
        assert_eq!(chat.unsent.as_deref(), Some("one more"));
        assert!(update(&mut app, Action::SendChat("again".into())).is_empty());
    }

    #[test]
    fn test_chat_without_conversation_redirects() {
        let mut app = test_app_with(user_session());
        update(&mut app, Action::Navigate(Screen::Chat { baby_id: 9 }));
        assert_eq!(app.screen, Screen::MyBabies);
    }

    // ------------------------------------------------------------------------
    // Profile & admin
    // ------------------------------------------------------------------------

    #[test]
    fn test_change_password_mismatch() {
        let mut app = test_app_with(user_session());
        let effects = update(
            &mut app,
            Action::ChangePassword {
                current: "old".into(),
                new: "abcdef".into(),
                confirm: "abcdeg".into(),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(app.profile.error.as_deref(), Some("New passwords do not match"));
    }

    #[test]
    fn test_change_password_success() {
        let mut app = test_app_with(user_session());
        let effects = update(
            &mut app,
            Action::ChangePassword {
                current: "old".into(),
                new: "abcdef".into(),
                confirm: "abcdef".into(),
            },
        );
        assert_eq!(effects.len(), 1);
        update(&mut app, Action::Completed(Response::PasswordChanged));
        assert_eq!(
            app.profile.notice.as_deref(),
            Some("Password changed successfully")
        );
    }

    #[test]
    fn test_admin_toggles() {
        let mut app = test_app_with(admin_session());
        update(
            &mut app,
            Action::Completed(Response::Admin {
                questionnaires: vec![],
                babies: vec![baby(1, "A"), baby(2, "B")],
                users: vec![UserSummary {
                    id: 5,
                    email: "u@x.y".into(),
                    role: Role::User,
                }],
                locked: false,
            }),
        );
        assert_eq!(
            update(&mut app, Action::ToggleBabiesVisible),
            vec![Effect::Request(Request::SetBabiesVisible(false))]
        );
        update(&mut app, Action::Completed(Response::BabiesVisibilitySet(false)));
        assert!(!app.admin.babies_visible());

        assert_eq!(
            update(&mut app, Action::ToggleQuestionnaireLock),
            vec![Effect::Request(Request::SetQuestionnairesLocked(true))]
        );

        update(
            &mut app,
            Action::Completed(Response::BabyAssigned {
                baby_id: 2,
                user_id: 5,
            }),
        );
        assert_eq!(app.admin.babies[1].user_id, Some(5));
        assert_eq!(app.status_message, "Assigned B to u@x.y");
    }
}
