//! # TUI Components
//!
//! UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! Components follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as parameters:
//! - `TitleBar`: app name, user, status and spinner
//! - `TabBar`: screens for the current role
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep local state in `TuiState` and emit events:
//! - `TextField`: the input used by every form
//! - `LoginForm`, `ProfileForm`, `QuestionnaireForm`
//! - `CardStack` (+ `StackLayout`): the swipeable baby deck
//! - `LifeStagesState`: fanned life-stage cards over a baby
//! - `ImageViewerState`: photo modal
//! - `BabyListState`, `ChatViewState`, `AdminPanelState`
//!
//! Components receive core data as props and never reach into `App`
//! themselves. What they want changed comes back as an event that the
//! event loop turns into an `Action`.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs                (this file)
//! ├── title_bar.rs          (top bar + tabs)
//! ├── text_field.rs         (form input)
//! ├── login_form.rs
//! ├── profile_form.rs
//! ├── questionnaire_form.rs
//! ├── card_stack.rs         (baby deck, dots, hit testing)
//! ├── life_stages.rs        (fan overlay)
//! ├── image_viewer.rs       (photo modal)
//! ├── baby_list.rs          (My Babies)
//! ├── chat_view.rs
//! └── admin_panel.rs
//! ```

use ratatui::layout::{Constraint, Layout, Rect};

pub mod admin_panel;
pub mod baby_list;
pub mod card_stack;
pub mod chat_view;
pub mod image_viewer;
pub mod life_stages;
pub mod login_form;
pub mod profile_form;
pub mod questionnaire_form;
pub mod text_field;
pub mod title_bar;

pub use admin_panel::{AdminEvent, AdminPanel, AdminPanelState};
pub use baby_list::{BabyList, BabyListEvent, BabyListState};
pub use card_stack::{CardStack, StackLayout};
pub use chat_view::{ChatEvent, ChatView, ChatViewState};
pub use image_viewer::ImageViewerState;
pub use life_stages::{LifeStagesEvent, LifeStagesState};
pub use login_form::{LoginEvent, LoginForm};
pub use profile_form::{ProfileEvent, ProfileForm};
pub use questionnaire_form::{QuestionnaireEvent, QuestionnaireForm};
pub use title_bar::{TabBar, TitleBar};

/// A rectangle of `percent_x` by `percent_y` centered in `outer`.
pub fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
