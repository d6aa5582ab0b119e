//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Busy** (requests in flight, autosave pending): draws every ~80ms so the
//!   spinner turns and the save timer is checked promptly.
//! - **Idle**: sleeps up to 500ms, only redraws on events, responses or
//!   terminal resize.
//!
//! ## Requests
//!
//! `Effect::Request` is run on a tokio task with a clone of the client and
//! session. The outcome comes back over an mpsc channel as
//! `Action::Completed` / `Action::Failed` and is drained once per loop turn.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::{self, stdout};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::layout::Rect;

use crate::api::ApiClient;
use crate::api::dispatch::execute;
use crate::api::types::{Baby, LifeStage};
use crate::core::action::{Action, Effect, Request, Response, update};
use crate::core::config::ResolvedConfig;
use crate::core::gesture::{self, MouseInput, MouseKind, PointerScale, RawInput};
use crate::core::routing::{self, Screen};
use crate::core::session::{Session, SessionStore};
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::title_bar::{tab_at, tabs};
use crate::tui::components::{
    AdminEvent, AdminPanelState, BabyListEvent, BabyListState, ChatEvent, ChatViewState,
    ImageViewerState, LifeStagesEvent, LifeStagesState, LoginEvent, LoginForm, ProfileEvent,
    ProfileForm, QuestionnaireEvent, QuestionnaireForm, StackLayout,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub login: LoginForm,
    pub profile: ProfileForm,
    pub questionnaire: QuestionnaireForm,
    pub baby_list: BabyListState,
    pub chat_view: ChatViewState,
    pub admin_panel: AdminPanelState,
    // Card deck geometry from the last frame, for hit testing
    pub stack: StackLayout,
    pub scale: PointerScale,
    pub tab_hits: Vec<(Screen, Rect)>,
    // Overlays (None = hidden)
    pub life_stages: Option<LifeStagesState>,
    pub image_viewer: Option<ImageViewerState>,
    /// Column where the current drag on the deck started.
    press: Option<u16>,
}

impl TuiState {
    pub fn new(scale: PointerScale) -> Self {
        Self {
            login: LoginForm::new(),
            profile: ProfileForm::new(),
            questionnaire: QuestionnaireForm::new(),
            baby_list: BabyListState::default(),
            chat_view: ChatViewState::new(),
            admin_panel: AdminPanelState::default(),
            stack: StackLayout::default(),
            scale,
            tab_hits: Vec::new(),
            life_stages: None,
            image_viewer: None,
            press: None,
        }
    }

    /// Forgets everything typed or browsed by the previous user.
    fn reset(&mut self) {
        *self = Self::new(self.scale);
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Enable Kitty keyboard protocol unconditionally (releases are filtered
        // in event.rs). Terminals that don't support it ignore the request.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,                        // Show cursor for form editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!(
            "Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)"
        );
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide // Hide cursor on exit
        );
    }
}

/// What effects need to reach the outside world.
struct Runtime {
    client: ApiClient,
    store: SessionStore,
    tx: mpsc::Sender<Action>,
    max_upload_bytes: u64,
}

impl Runtime {
    /// Runs `action` through the reducer and carries out its effects.
    /// Returns true when the app should quit.
    fn apply(&self, app: &mut App, action: Action) -> bool {
        let mut quit = false;
        for effect in update(app, action) {
            match effect {
                Effect::Request(request) => self.spawn_request(app.session.clone(), request),
                Effect::SaveSession => {
                    if let Err(e) = self.store.save(&app.session) {
                        warn!("Failed to save session: {}", e);
                    }
                }
                Effect::Quit => quit = true,
            }
        }
        quit
    }

    fn spawn_request(&self, session: Session, request: Request) {
        info!("Spawning request {:?}", request);
        let client = self.client.clone();
        let tx = self.tx.clone();
        let max_upload_bytes = self.max_upload_bytes;
        tokio::spawn(async move {
            let action = match execute(&client, &session, request.clone(), max_upload_bytes).await
            {
                Ok(response) => Action::Completed(response),
                Err(error) => Action::Failed { request, error },
            };
            if tx.send(action).is_err() {
                warn!("Failed to deliver request outcome: receiver dropped");
            }
        });
    }
}

pub fn run(config: ResolvedConfig, store: SessionStore, session: Session) -> io::Result<()> {
    let client = ApiClient::new(config.api_url.clone(), config.timeout)
        .map_err(|e| io::Error::other(e.to_string()))?;
    info!("Using API at {}", client.base_url());

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let runtime = Runtime {
        client,
        store,
        tx,
        max_upload_bytes: config.max_upload_bytes,
    };

    let mut app = App::new(session, config.autosave_debounce);
    let mut tui = TuiState::new(PointerScale::new(config.units_per_column));
    let mut current_user = app.session.user.as_ref().map(|u| u.email.clone());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Failed to enable terminal modes: {}", e));

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame
    let home = routing::home(&app.session);
    let mut should_quit = runtime.apply(&mut app, Action::Navigate(home));

    while !should_quit {
        // A different user (or none) means the forms hold stale input.
        let user = app.session.user.as_ref().map(|u| u.email.clone());
        if user != current_user {
            debug!("Session user changed, resetting TUI state");
            tui.reset();
            current_user = user;
        }
        sync_components(&mut app, &mut tui);

        let animating = app.is_loading() || app.questionnaire.autosave.is_pending();
        if animating {
            needs_redraw = true;
        }

        // Only draw when something changed
        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when busy (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(&mut app, &mut tui, &runtime, event) {
                should_quit = true;
                break;
            }
        }

        // Clock for the questionnaire autosave
        if runtime.apply(&mut app, Action::Tick(Instant::now())) {
            should_quit = true;
        }

        // Handle request outcomes from background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            if matches!(action, Action::Completed(Response::PasswordChanged)) {
                tui.profile.clear_passwords();
            }
            if runtime.apply(&mut app, action) {
                should_quit = true;
            }
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}

/// Pushes core state the components mirror locally.
fn sync_components(app: &mut App, tui: &mut TuiState) {
    tui.profile.sync(&app.profile);
    tui.questionnaire.sync(&app.questionnaire);
    if app.screen != Screen::Babies {
        tui.life_stages = None;
    }
    // A send that failed hands its text back to the composer.
    if let Some(text) = app.chat.as_mut().and_then(|c| c.unsent.take()) {
        tui.chat_view.restore(text);
    }
}

/// Routes one terminal event. Returns true when the app should quit.
fn handle_event(app: &mut App, tui: &mut TuiState, rt: &Runtime, event: TuiEvent) -> bool {
    match event {
        // Resize just needs a redraw (already flagged by the caller)
        TuiEvent::Resize => return false,
        // ForceQuit (Ctrl+C) always quits regardless of overlays
        TuiEvent::ForceQuit => return rt.apply(app, Action::Quit),
        _ => {}
    }

    // Overlays take every event while open
    if let Some(viewer) = &tui.image_viewer {
        if viewer.handle_event(&event) {
            tui.image_viewer = None;
        }
        return false;
    }
    if tui.life_stages.is_some() {
        return handle_life_stages(app, tui, rt, &event);
    }

    // Global navigation
    match event {
        TuiEvent::Logout if app.session.user.is_some() => {
            return rt.apply(app, Action::Logout);
        }
        TuiEvent::SwitchTab(index) => {
            return match tabs(&app.session).get(index) {
                Some(&screen) => rt.apply(app, Action::Navigate(screen)),
                None => false,
            };
        }
        TuiEvent::MouseDown(col, row) => {
            if let Some(screen) = tab_at(&tui.tab_hits, col, row) {
                return rt.apply(app, Action::Navigate(screen));
            }
        }
        _ => {}
    }

    match app.screen {
        Screen::Login => match tui.login.handle_event(&event) {
            Some(LoginEvent::Login { email, password }) => {
                rt.apply(app, Action::Login { email, password })
            }
            Some(LoginEvent::Register { email, password }) => {
                rt.apply(app, Action::Register { email, password })
            }
            None => false,
        },
        Screen::Profile => match tui.profile.handle_event(&event) {
            Some(ProfileEvent::SavePartner(partner)) => rt.apply(app, Action::SavePartner(partner)),
            Some(ProfileEvent::ChangePassword {
                current,
                new,
                confirm,
            }) => rt.apply(
                app,
                Action::ChangePassword {
                    current,
                    new,
                    confirm,
                },
            ),
            None => false,
        },
        Screen::Questionnaire => match tui.questionnaire.handle_event(&event) {
            Some(QuestionnaireEvent::Edit(edit)) => rt.apply(
                app,
                Action::EditAnswer {
                    edit,
                    at: Instant::now(),
                },
            ),
            Some(QuestionnaireEvent::Upload(path)) => rt.apply(app, Action::UploadImage(path)),
            Some(QuestionnaireEvent::ViewPhoto(filename)) => {
                let url = rt.client.upload_url(&filename);
                tui.image_viewer = Some(ImageViewerState::new(url, filename));
                false
            }
            None => false,
        },
        Screen::Babies => handle_babies(app, tui, rt, &event),
        Screen::MyBabies => match tui.baby_list.handle_event(&event, &app.my_babies) {
            Some(BabyListEvent::Chat(baby)) => open_chat(app, tui, rt, baby, None),
            Some(BabyListEvent::ViewPhoto(baby)) => {
                view_baby_photo(tui, rt, &baby);
                false
            }
            Some(BabyListEvent::Browse) => rt.apply(app, Action::Navigate(Screen::Babies)),
            None => false,
        },
        Screen::Chat { .. } => handle_chat(app, tui, rt, &event),
        Screen::Admin => match tui.admin_panel.handle_event(&event, &app.admin) {
            Some(AdminEvent::ToggleBabiesVisible) => rt.apply(app, Action::ToggleBabiesVisible),
            Some(AdminEvent::ToggleQuestionnaireLock) => {
                rt.apply(app, Action::ToggleQuestionnaireLock)
            }
            Some(AdminEvent::Assign { baby_id, user_id }) => {
                rt.apply(app, Action::AssignBaby { baby_id, user_id })
            }
            Some(AdminEvent::ViewPhoto(filename)) => {
                let url = rt.client.upload_url(&filename);
                tui.image_viewer = Some(ImageViewerState::new(url, filename));
                false
            }
            None => false,
        },
    }
}

fn pointer(app: &mut App, rt: &Runtime, kind: MouseKind, x: f64) -> bool {
    match gesture::normalize(RawInput::Mouse(MouseInput { kind, x })) {
        Some(event) => rt.apply(app, Action::Pointer(event)),
        None => false,
    }
}

fn handle_babies(app: &mut App, tui: &mut TuiState, rt: &Runtime, event: &TuiEvent) -> bool {
    // Once a baby is chosen the page shows only that baby.
    if let Some(baby) = app.babies.selected.clone() {
        return match event {
            TuiEvent::Submit | TuiEvent::InputChar('c') => open_chat(app, tui, rt, baby, None),
            TuiEvent::InputChar('v') => {
                view_baby_photo(tui, rt, &baby);
                false
            }
            _ => false,
        };
    }

    let current = app.babies.navigator.current_index();
    match *event {
        TuiEvent::MouseDown(col, row) => {
            if let Some(index) = tui.stack.dot_at(col, row) {
                return rt.apply(app, Action::JumpTo(index));
            }
            if tui.stack.on_active_card(col, row) {
                tui.press = Some(col);
                return pointer(app, rt, MouseKind::Down, tui.scale.to_units(col));
            }
            false
        }
        TuiEvent::MouseDrag(col, row) if tui.press.is_some() => {
            if tui.stack.on_active_card(col, row) {
                pointer(app, rt, MouseKind::Move, tui.scale.to_units(col))
            } else {
                // Dragged off the front card.
                tui.press = None;
                pointer(app, rt, MouseKind::Leave, 0.0)
            }
        }
        TuiEvent::MouseUp(col, row) => {
            let Some(start) = tui.press.take() else {
                return false;
            };
            if pointer(app, rt, MouseKind::Up, tui.scale.to_units(col)) {
                return true;
            }
            // A click without movement on the front card opens it.
            if start == col
                && tui.stack.on_active_card(col, row)
                && let Some(baby) = app.babies.navigator.current().cloned()
            {
                return meet(app, tui, rt, baby);
            }
            false
        }
        TuiEvent::CursorLeft if current > 0 => rt.apply(app, Action::JumpTo(current - 1)),
        TuiEvent::CursorRight => rt.apply(app, Action::JumpTo(current + 1)),
        TuiEvent::Submit => match app.babies.navigator.current().cloned() {
            Some(baby) => meet(app, tui, rt, baby),
            None => false,
        },
        TuiEvent::InputChar('s') => match app.babies.navigator.current() {
            Some(baby) => {
                let id = baby.id;
                rt.apply(app, Action::SelectBaby(id))
            }
            None => false,
        },
        TuiEvent::InputChar('v') => {
            if let Some(baby) = app.babies.navigator.current() {
                view_baby_photo(tui, rt, baby);
            }
            false
        }
        _ => false,
    }
}

/// Shows a baby's life stages, or goes straight to chat when it has none.
fn meet(app: &mut App, tui: &mut TuiState, rt: &Runtime, baby: Baby) -> bool {
    if baby.life_stages.is_empty() {
        open_chat(app, tui, rt, baby, None)
    } else {
        tui.life_stages = Some(LifeStagesState::new(baby));
        false
    }
}

fn handle_life_stages(app: &mut App, tui: &mut TuiState, rt: &Runtime, event: &TuiEvent) -> bool {
    let Some(overlay) = tui.life_stages.as_mut() else {
        return false;
    };
    let Some(outcome) = overlay.handle_event(event) else {
        return false;
    };
    let baby = overlay.baby.clone();
    match outcome {
        LifeStagesEvent::Chat(stage) => {
            tui.life_stages = None;
            open_chat(app, tui, rt, baby, Some(stage))
        }
        LifeStagesEvent::Select => {
            tui.life_stages = None;
            rt.apply(app, Action::SelectBaby(baby.id))
        }
        LifeStagesEvent::ViewImage(path) => {
            let caption = baby
                .life_stages
                .iter()
                .find(|s| s.image_path == path)
                .map(|s| format!("{} at {}", baby.name, s.age))
                .unwrap_or_else(|| baby.name.clone());
            tui.image_viewer = Some(ImageViewerState::new(rt.client.asset_url(&path), caption));
            false
        }
        LifeStagesEvent::Dismiss => {
            tui.life_stages = None;
            false
        }
    }
}

fn open_chat(
    app: &mut App,
    tui: &mut TuiState,
    rt: &Runtime,
    baby: Baby,
    stage: Option<LifeStage>,
) -> bool {
    tui.chat_view = ChatViewState::new();
    rt.apply(app, Action::OpenChat { baby, stage })
}

fn handle_chat(app: &mut App, tui: &mut TuiState, rt: &Runtime, event: &TuiEvent) -> bool {
    let Some(chat) = app.chat.as_ref() else {
        return false;
    };
    let baby_id = chat.baby_id();
    let outcome = if chat.limit_reached {
        tui.chat_view.handle_capped_event(event)
    } else {
        tui.chat_view.handle_event(event)
    };
    match outcome {
        Some(ChatEvent::Send(text)) => rt.apply(app, Action::SendChat(text)),
        Some(ChatEvent::Select) => rt.apply(app, Action::SelectBaby(baby_id)),
        Some(ChatEvent::Back) => {
            let back = if app.babies_visible || app.session.is_admin() {
                Screen::Babies
            } else {
                Screen::MyBabies
            };
            rt.apply(app, Action::Navigate(back))
        }
        None => false,
    }
}

fn view_baby_photo(tui: &mut TuiState, rt: &Runtime, baby: &Baby) {
    if baby.image_path.is_empty() {
        return;
    }
    let url = rt.client.asset_url(&baby.image_path);
    tui.image_viewer = Some(ImageViewerState::new(url, baby.name.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::navigator::Navigator;
    use crate::test_support::{baby, test_app_with, user_session};
    use tempfile::TempDir;

    fn runtime(dir: &TempDir) -> (Runtime, mpsc::Receiver<Action>) {
        let (tx, rx) = mpsc::channel();
        let runtime = Runtime {
            client: ApiClient::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap(),
            store: SessionStore::new(dir.path().join("session.json")),
            tx,
            max_upload_bytes: 1024,
        };
        (runtime, rx)
    }

    /// Babies page with a deck of three drawn at a known place.
    fn babies_page() -> (App, TuiState) {
        let mut app = test_app_with(user_session());
        app.screen = Screen::Babies;
        app.babies_visible = true;
        app.babies.loaded = true;
        app.babies.navigator =
            Navigator::new(vec![baby(1, "Ava"), baby(2, "Ben"), baby(3, "Cal")]);
        let mut tui = TuiState::new(PointerScale::default());
        tui.stack = StackLayout {
            stack: Rect::new(0, 0, 60, 20),
            active_card: Rect::new(8, 0, 44, 17),
            dots: vec![],
        };
        (app, tui)
    }

    fn send(app: &mut App, tui: &mut TuiState, rt: &Runtime, events: &[TuiEvent]) {
        for event in events {
            handle_babies(app, tui, rt, event);
        }
    }

    #[test]
    fn test_drag_on_active_card_swipes() {
        let dir = TempDir::new().unwrap();
        let (rt, _rx) = runtime(&dir);
        let (mut app, mut tui) = babies_page();

        send(
            &mut app,
            &mut tui,
            &rt,
            &[
                TuiEvent::MouseDown(40, 5),
                TuiEvent::MouseDrag(20, 5),
                TuiEvent::MouseUp(20, 5),
            ],
        );
        assert_eq!(app.babies.navigator.current_index(), 1);
    }

    #[test]
    fn test_press_off_active_card_does_not_drag() {
        let dir = TempDir::new().unwrap();
        let (rt, _rx) = runtime(&dir);
        let (mut app, mut tui) = babies_page();

        // Inside the deck area but below the front card.
        send(
            &mut app,
            &mut tui,
            &rt,
            &[
                TuiEvent::MouseDown(58, 18),
                TuiEvent::MouseDrag(40, 18),
                TuiEvent::MouseUp(40, 18),
            ],
        );
        assert_eq!(app.babies.navigator.current_index(), 0);
        assert!(!app.babies.navigator.state().drag_active);
        assert_eq!(tui.press, None);
    }

    #[test]
    fn test_dragging_off_active_card_ends_gesture() {
        let dir = TempDir::new().unwrap();
        let (rt, _rx) = runtime(&dir);
        let (mut app, mut tui) = babies_page();

        send(
            &mut app,
            &mut tui,
            &rt,
            &[TuiEvent::MouseDown(30, 5), TuiEvent::MouseDrag(25, 5)],
        );
        assert!(app.babies.navigator.state().drag_active);

        // Onto the margin beside the card: treated as leaving.
        send(&mut app, &mut tui, &rt, &[TuiEvent::MouseDrag(56, 5)]);
        assert!(!app.babies.navigator.state().drag_active);
        assert_eq!(
            app.babies.navigator.current_index(),
            0,
            "50 units is below the commit threshold"
        );
        assert_eq!(tui.press, None);

        // The release that follows is ignored.
        send(&mut app, &mut tui, &rt, &[TuiEvent::MouseUp(56, 5)]);
        assert_eq!(app.babies.navigator.current_index(), 0);
    }
}
