use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use api_types::{TradeSide, trade::Trade};

use crate::{
    app::{AppState, TradesMode},
    metrics,
    ui::{
        components::{card::Card, money},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_header(frame, rows[0], state, &theme);

    // Unlike the list screens, a failed day load leaves nothing worth
    // keeping on screen; the body becomes the error.
    if let Some(message) = &state.trades.error {
        render_error(frame, rows[1], message, &theme);
        return;
    }

    match state.trades.mode {
        TradesMode::List => render_list(frame, rows[1], state, &theme),
        TradesMode::Detail => render_detail(frame, rows[1], state, &theme),
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut spans = vec![Span::styled(
        state.trades.date.format("%A %d %B %Y").to_string(),
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    )];
    if state.trades.loading {
        spans.push(Span::styled("  loading...", Style::default().fg(theme.dim)));
    } else if !state.trades.items.is_empty() {
        let total: f64 = state.trades.items.iter().map(|t| t.profit).sum();
        spans.push(Span::styled(
            format!("  {} trades  ", state.trades.items.len()),
            Style::default().fg(theme.dim),
        ));
        spans.push(money::styled_amount(total, theme));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(" Trades ", Style::default().fg(theme.accent)));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_list(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    if state.trades.items.is_empty() {
        let text = if state.trades.loading {
            "Loading trades..."
        } else {
            "No trades on this day."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = state
        .trades
        .items
        .iter()
        .map(|trade| trade_row(trade, theme))
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(state.trades.selected.min(state.trades.items.len() - 1)));

    let list = List::new(items)
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn trade_row(trade: &Trade, theme: &Theme) -> ListItem<'static> {
    let (arrow, arrow_color) = side_marker(trade.side, theme);
    let outcome = if metrics::is_win(trade.profit) {
        Span::styled("WIN ", Style::default().fg(theme.positive))
    } else {
        Span::styled("LOSS", Style::default().fg(theme.negative))
    };

    ListItem::new(Line::from(vec![
        Span::styled(
            trade.close_time.format("%H:%M:%S").to_string(),
            Style::default().fg(theme.dim),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{:<10}", trade.symbol),
            Style::default().fg(theme.text),
        ),
        Span::styled(
            format!("{arrow} {:<5}", trade.side.as_str()),
            Style::default().fg(arrow_color),
        ),
        money::styled_amount(trade.profit, theme),
        Span::raw("  "),
        outcome,
        Span::raw("  "),
        Span::styled(
            trade.account_alias.clone(),
            Style::default().fg(theme.text_muted),
        ),
    ]))
}

fn render_detail(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let Some(trade) = state.trades.selected_trade() else {
        // Selection vanished under us (refresh emptied the day).
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Trade no longer available.",
                Style::default().fg(theme.dim),
            )),
            area,
        );
        return;
    };

    let title = format!("Trade #{}", trade.ticket);
    let card = Card::new(&title, theme).focused(true);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let (arrow, arrow_color) = side_marker(trade.side, theme);
    let net = trade.profit + trade.commission + trade.swap;
    let open = trade
        .open_time
        .map_or_else(|| "-".to_string(), |t| t.format("%d %b %Y %H:%M:%S").to_string());
    let comment = trade.comment.clone().filter(|c| !c.is_empty());

    let lines = vec![
        detail_line(
            "Symbol",
            vec![
                Span::styled(trade.symbol.clone(), Style::default().fg(theme.text)),
                Span::styled(
                    format!("  {arrow} {}", trade.side.as_str()),
                    Style::default().fg(arrow_color),
                ),
            ],
            theme,
        ),
        detail_line(
            "Account",
            vec![Span::styled(
                trade.account_alias.clone(),
                Style::default().fg(theme.text),
            )],
            theme,
        ),
        detail_line(
            "Open",
            vec![Span::styled(open, Style::default().fg(theme.text))],
            theme,
        ),
        detail_line(
            "Close",
            vec![Span::styled(
                trade.close_time.format("%d %b %Y %H:%M:%S").to_string(),
                Style::default().fg(theme.text),
            )],
            theme,
        ),
        Line::from(""),
        detail_line("Profit", vec![money::styled_amount(trade.profit, theme)], theme),
        detail_line(
            "Commission",
            vec![money::styled_amount(trade.commission, theme)],
            theme,
        ),
        detail_line("Swap", vec![money::styled_amount(trade.swap, theme)], theme),
        detail_line("Net", vec![money::styled_amount_bold(net, theme)], theme),
        Line::from(""),
        detail_line(
            "Comment",
            vec![Span::styled(
                comment.unwrap_or_else(|| "-".to_string()),
                Style::default().fg(theme.text_muted),
            )],
            theme,
        ),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn detail_line(label: &str, value: Vec<Span<'static>>, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{label:<12}"),
        Style::default().fg(theme.dim),
    )];
    spans.extend(value);
    Line::from(spans)
}

fn side_marker(side: TradeSide, theme: &Theme) -> (&'static str, ratatui::style::Color) {
    match side {
        TradeSide::Buy => ("▲", theme.accent),
        TradeSide::Sell => ("▼", theme.warning),
    }
}

fn render_error(frame: &mut Frame<'_>, area: Rect, message: &str, theme: &Theme) {
    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme.error),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to retry.",
            Style::default().fg(theme.dim),
        )),
    ])
    .alignment(Alignment::Center);
    Card::new("Trades", theme).render_with(frame, area, body);
}
