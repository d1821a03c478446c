use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::{
    app::{AppState, PendingDelete, ServersMode},
    forms::{ServerField, ServerForm},
    ui::{
        components::{card::Card, popup},
        theme::Theme,
    },
};

use super::accounts::confirm_hints;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_header(frame, rows[0], state, &theme);
    render_list(frame, rows[1], state, &theme);

    match &state.servers.mode {
        ServersMode::List => {}
        ServersMode::Create(form) => render_create_popup(frame, area, form, &theme),
        ServersMode::ConfirmDelete(pending) => render_delete_popup(frame, area, pending, &theme),
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut spans = vec![Span::styled(
        format!("{} servers", state.servers.items.len()),
        Style::default().fg(theme.text_muted),
    )];
    if state.servers.loading {
        spans.push(Span::styled("  loading...", Style::default().fg(theme.dim)));
    }
    if let Some(error) = &state.servers.error {
        spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(theme.error),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(" Servers ", Style::default().fg(theme.accent)));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_list(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    if state.servers.items.is_empty() {
        let text = if state.servers.loading {
            "Loading servers..."
        } else {
            "No servers yet. Press n to add the first one."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = state
        .servers
        .items
        .iter()
        .map(|server| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<16}", server.alias),
                    Style::default().fg(theme.text),
                ),
                Span::styled(server.name.clone(), Style::default().fg(theme.text_muted)),
            ]))
        })
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(state.servers.selected.min(state.servers.items.len() - 1)));

    let list = List::new(items)
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_create_popup(frame: &mut Frame<'_>, area: Rect, form: &ServerForm, theme: &Theme) {
    let rect = popup::centered(area, 52, 9);
    frame.render_widget(Clear, rect);
    let card = Card::new("New Server", theme).focused(true);
    let inner = card.inner(rect);
    card.render_frame(frame, rect);

    let mut lines = vec![
        field_line("Name", &form.name, form.focus() == ServerField::Name, theme),
        field_line("Alias", &form.alias, form.focus() == ServerField::Alias, theme),
        Line::from(Span::styled(
            "Name is the platform's technical id, alias is yours.",
            Style::default().fg(theme.dim),
        )),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme.error),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Tab next  Enter save  Esc cancel",
        Style::default().fg(theme.dim),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn field_line(label: &str, value: &str, focused: bool, theme: &Theme) -> Line<'static> {
    let label_style = if focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_muted)
    };

    let mut spans = vec![
        Span::styled(format!("{label:<8}"), label_style),
        Span::styled(value.to_string(), Style::default().fg(theme.text)),
    ];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(theme.accent)));
    }
    Line::from(spans)
}

fn render_delete_popup(frame: &mut Frame<'_>, area: Rect, pending: &PendingDelete, theme: &Theme) {
    let rect = popup::centered(area, 46, 7);
    frame.render_widget(Clear, rect);
    let card = Card::new("Delete Server", theme).focused(true);
    let inner = card.inner(rect);
    card.render_frame(frame, rect);

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Delete server {}?", pending.alias),
                Style::default().fg(theme.text),
            )),
            Line::from(Span::styled(
                "Fails if any account still uses it.",
                Style::default().fg(theme.warning),
            )),
            Line::from(""),
            Line::from(confirm_hints(theme)),
        ]),
        inner,
    );
}
