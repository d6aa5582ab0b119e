use crate::api::types::Baby;
use crate::core::routing::Screen;
use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::title_bar::tabs;
use crate::tui::components::{
    AdminPanel, BabyList, CardStack, ChatView, TabBar, TitleBar, centered_rect,
};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

/// Screen areas shared by drawing and mouse routing.
pub struct Areas {
    pub title: Rect,
    pub tabs: Rect,
    pub main: Rect,
    pub error: Rect,
}

pub fn layout(frame_area: Rect, app: &App) -> Areas {
    use Constraint::{Length, Min};
    let tabs_height = if app.session.user.is_some() { 1 } else { 0 };
    let error_height = if app.error.is_some() { 1 } else { 0 };
    let [title, tabs, main, error] = Layout::vertical([
        Length(1),
        Length(tabs_height),
        Min(0),
        Length(error_height),
    ])
    .areas(frame_area);
    Areas {
        title,
        tabs,
        main,
        error,
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let areas = layout(frame.area(), app);

    // Title bar
    let user = app.session.user.as_ref().map(|u| u.email.clone());
    let spinner = app.is_loading().then_some(spinner_frame);
    TitleBar::new(user, app.status_message.clone(), spinner).render(frame, areas.title);

    // Tabs
    let screens = tabs(&app.session);
    let babies_enabled = app.babies_visible || app.session.is_admin();
    TabBar::new(&screens, app.screen, babies_enabled, &mut tui.tab_hits).render(frame, areas.tabs);

    // Main area
    match app.screen {
        Screen::Login => tui.login.render(frame, areas.main),
        Screen::Profile => tui.profile.render(frame, areas.main, &app.profile),
        Screen::Questionnaire => tui.questionnaire.render(frame, areas.main, &app.questionnaire),
        Screen::Babies => draw_babies(frame, areas.main, app, tui),
        Screen::MyBabies => {
            BabyList::new(&mut tui.baby_list, &app.my_babies, app.babies_visible)
                .render(frame, areas.main);
        }
        Screen::Chat { .. } => match &app.chat {
            Some(chat) => ChatView::new(&mut tui.chat_view, chat).render(frame, areas.main),
            None => draw_notice(frame, areas.main, "No conversation open."),
        },
        Screen::Admin => {
            AdminPanel::new(&mut tui.admin_panel, &app.admin).render(frame, areas.main)
        }
    }

    if let Some(error) = &app.error {
        frame.render_widget(
            Span::styled(error.as_str(), Style::default().fg(Color::Red)),
            areas.error,
        );
    }

    // Overlays, topmost last
    if let Some(life_stages) = tui.life_stages.as_mut() {
        life_stages.render(frame, areas.main);
    }
    if let Some(viewer) = &tui.image_viewer {
        viewer.render(frame, frame.area());
    }
}

fn draw_notice(frame: &mut Frame, area: Rect, text: &str) {
    let notice = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    let [_, row, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);
    frame.render_widget(notice, row);
}

fn draw_babies(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    if !app.babies.loaded {
        draw_notice(frame, area, "Loading babies...");
        return;
    }
    if let Some(baby) = &app.babies.selected {
        draw_selected_baby(frame, area, baby);
        return;
    }

    let [stack, help] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
    CardStack::new(&app.babies.navigator, tui.scale, &mut tui.stack).render(frame, stack);
    if !app.babies.navigator.is_empty() {
        frame.render_widget(
            Line::from(Span::styled(
                "Drag or ←/→ to browse  Enter Meet  s Select  v Photo",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
            help,
        );
    }
}

/// The baby the user already chose; nothing else is offered.
fn draw_selected_baby(frame: &mut Frame, area: Rect, baby: &Baby) {
    let card = centered_rect(60, 70, area);
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Your Baby ")
        .title_alignment(Alignment::Center);
    let mut body = vec![
        Line::from(""),
        Line::from("👶").centered(),
        Line::from(""),
        Line::from(Span::styled(
            baby.name.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::from(format!("Age: {}", baby.age)).centered(),
        Line::from(Span::styled(
            baby.attributes.join(" · "),
            Style::default().fg(Color::Magenta),
        ))
        .centered(),
        Line::from(""),
        Line::from(Span::styled(
            format!("[Enter] Chat with {}", baby.name),
            Style::default().fg(Color::Black).bg(Color::Magenta),
        ))
        .centered(),
    ];
    if !baby.image_path.is_empty() {
        body.push(Line::from("[v] View photo").centered());
    }
    frame.render_widget(
        Paragraph::new(body).wrap(Wrap { trim: true }).block(block),
        card,
    );
}
