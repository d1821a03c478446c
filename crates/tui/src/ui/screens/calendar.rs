use chrono::{Datelike, NaiveDate};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use api_types::calendar::DailyStat;

use crate::{
    app::AppState,
    calendar::{WEEKDAY_LABELS, day_stat, in_month, month_grid, month_label},
    ui::{components::money, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let grid = month_grid(state.calendar.anchor);
    let weeks = grid.len() / 7;

    let mut constraints = vec![Constraint::Length(3), Constraint::Length(1)];
    constraints.extend(std::iter::repeat_n(Constraint::Length(3), weeks));
    constraints.push(Constraint::Min(0));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_header(frame, rows[0], state, &theme);
    render_weekday_row(frame, rows[1], &theme);

    let days: &[DailyStat] = state
        .calendar
        .data
        .as_ref()
        .map_or(&[], |data| data.days.as_slice());

    for week in 0..weeks {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7])
            .split(rows[2 + week]);
        for (slot, cell) in grid[week * 7..(week + 1) * 7].iter().enumerate() {
            render_cell(frame, cols[slot], *cell, state.calendar.anchor, days, &theme);
        }
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut spans = vec![Span::styled(
        month_label(state.calendar.anchor),
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    )];

    if let Some(data) = &state.calendar.data {
        spans.push(Span::styled("   P&L ", Style::default().fg(theme.text_muted)));
        spans.push(money::styled_amount(data.month_total_profit, theme));
        spans.push(Span::styled(
            format!(
                "   Win rate {:.1}%   {} trades",
                data.month_win_rate, data.total_trades
            ),
            Style::default().fg(theme.text_muted),
        ));
    } else if state.calendar.loading {
        spans.push(Span::styled("   loading...", Style::default().fg(theme.dim)));
    }
    // Stale month stays visible under the error, like the list screens.
    if let Some(error) = &state.calendar.error {
        spans.push(Span::styled(
            format!("   {error}"),
            Style::default().fg(theme.error),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(" Calendar ", Style::default().fg(theme.accent)));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_weekday_row(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(area);
    for (slot, label) in WEEKDAY_LABELS.iter().enumerate() {
        frame.render_widget(
            Paragraph::new(Span::styled(*label, Style::default().fg(theme.dim))),
            cols[slot],
        );
    }
}

fn render_cell(
    frame: &mut Frame<'_>,
    area: Rect,
    cell: NaiveDate,
    anchor: NaiveDate,
    days: &[DailyStat],
    theme: &Theme,
) {
    let day_color = if in_month(cell, anchor) {
        theme.text
    } else {
        theme.dim
    };

    let mut lines = vec![Line::from(Span::styled(
        cell.day().to_string(),
        Style::default().fg(day_color),
    ))];

    // Days without trades show only the date.
    if let Some(stat) = day_stat(days, cell) {
        lines.push(Line::from(Span::styled(
            format!("{}t", stat.trades_count),
            Style::default().fg(theme.dim),
        )));
        let profit_color = if stat.profit >= 0.0 {
            theme.positive
        } else {
            theme.negative
        };
        lines.push(Line::from(Span::styled(
            money::signed_usd_whole(stat.profit),
            Style::default().fg(profit_color),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}
