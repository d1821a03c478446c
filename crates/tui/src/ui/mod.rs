pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AccountsMode, AppState, Section, ServersMode, TradesMode};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    let theme = Theme::default();

    // Main layout: info bar, tabs, content, bottom bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tab bar (label + underline)
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], state.section, &theme);

    match state.section {
        Section::Dashboard => screens::dashboard::render(frame, layout[2], state),
        Section::Accounts => screens::accounts::render(frame, layout[2], state),
        Section::Trades => screens::trades::render(frame, layout[2], state),
        Section::Calendar => screens::calendar::render(frame, layout[2], state),
        Section::Servers => screens::servers::render(frame, layout[2], state),
    }

    render_bottom_bar(frame, layout[3], state, &theme);
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let refresh = state
        .last_refresh
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let status = if state.connected { "OK" } else { "ERR" };
    let status_style = if state.connected {
        Style::default().fg(theme.positive)
    } else {
        Style::default().fg(theme.error)
    };

    let mut spans = vec![
        Span::styled("API", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Scope", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.scope_label())),
        Span::styled("Refresh", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {refresh}  ")),
    ];
    if state.sync_in_flight {
        spans.push(Span::styled("Sync...  ", Style::default().fg(theme.accent)));
    }
    spans.push(Span::styled(status, status_style));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    // Global shortcuts (always shown, compact)
    let mut parts = components::tabs::tab_shortcuts(theme);

    let context_hints = get_context_hints(state, theme);
    if !context_hints.is_empty() {
        parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
        parts.extend(context_hints);
    }

    // Quit hint at the end
    parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
    parts.push(Span::styled("q", Style::default().fg(theme.accent)));
    parts.push(Span::raw(" quit"));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

/// Returns context-specific keyboard hints based on current section and mode.
fn get_context_hints(state: &AppState, theme: &Theme) -> Vec<Span<'static>> {
    match state.section {
        Section::Dashboard => vec![
            Span::styled("r", Style::default().fg(theme.accent)),
            Span::raw(" refresh  "),
            Span::styled("u", Style::default().fg(theme.accent)),
            Span::raw(" sync  "),
            Span::styled("[ ]", Style::default().fg(theme.accent)),
            Span::raw(" scope"),
        ],
        Section::Accounts => get_accounts_hints(state, theme),
        Section::Trades => get_trades_hints(state, theme),
        Section::Calendar => vec![
            Span::styled("p/n", Style::default().fg(theme.accent)),
            Span::raw(" month  "),
            Span::styled("[ ]", Style::default().fg(theme.accent)),
            Span::raw(" scope"),
        ],
        Section::Servers => get_servers_hints(state, theme),
    }
}

fn get_accounts_hints(state: &AppState, theme: &Theme) -> Vec<Span<'static>> {
    match state.accounts.mode {
        AccountsMode::List => vec![
            Span::styled("f", Style::default().fg(theme.accent)),
            Span::raw(" filter  "),
            Span::styled("n", Style::default().fg(theme.accent)),
            Span::raw(" new  "),
            Span::styled("e", Style::default().fg(theme.accent)),
            Span::raw(" edit  "),
            Span::styled("x", Style::default().fg(theme.accent)),
            Span::raw(" delete  "),
            Span::styled("u", Style::default().fg(theme.accent)),
            Span::raw(" sync"),
        ],
        AccountsMode::Create(_) | AccountsMode::Edit(_) => vec![
            Span::styled("Tab", Style::default().fg(theme.accent)),
            Span::raw(" next  "),
            Span::styled("Enter", Style::default().fg(theme.accent)),
            Span::raw(" save  "),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::raw(" cancel"),
        ],
        AccountsMode::ConfirmDelete(_) => vec![
            Span::styled("y", Style::default().fg(theme.accent)),
            Span::raw(" confirm  "),
            Span::styled("n", Style::default().fg(theme.accent)),
            Span::raw(" cancel"),
        ],
    }
}

fn get_trades_hints(state: &AppState, theme: &Theme) -> Vec<Span<'static>> {
    match state.trades.mode {
        TradesMode::List => vec![
            Span::styled("Enter", Style::default().fg(theme.accent)),
            Span::raw(" detail  "),
            Span::styled("p/n", Style::default().fg(theme.accent)),
            Span::raw(" day  "),
            Span::styled("g", Style::default().fg(theme.accent)),
            Span::raw(" today"),
        ],
        TradesMode::Detail => vec![
            Span::styled("b", Style::default().fg(theme.accent)),
            Span::raw(" back  "),
            Span::styled("j/k", Style::default().fg(theme.accent)),
            Span::raw(" browse"),
        ],
    }
}

fn get_servers_hints(state: &AppState, theme: &Theme) -> Vec<Span<'static>> {
    match state.servers.mode {
        ServersMode::List => vec![
            Span::styled("n", Style::default().fg(theme.accent)),
            Span::raw(" new  "),
            Span::styled("x", Style::default().fg(theme.accent)),
            Span::raw(" delete"),
        ],
        ServersMode::Create(_) => vec![
            Span::styled("Tab", Style::default().fg(theme.accent)),
            Span::raw(" next  "),
            Span::styled("Enter", Style::default().fg(theme.accent)),
            Span::raw(" save  "),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::raw(" cancel"),
        ],
        ServersMode::ConfirmDelete(_) => vec![
            Span::styled("y", Style::default().fg(theme.accent)),
            Span::raw(" confirm  "),
            Span::styled("n", Style::default().fg(theme.accent)),
            Span::raw(" cancel"),
        ],
    }
}
