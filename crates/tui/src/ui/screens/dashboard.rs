use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, List, ListItem, Paragraph},
};

use api_types::{TradeSide, stats::DashboardStats};

use crate::{
    app::AppState,
    metrics::{chart_domain, consistency_view},
    ui::{
        components::{
            card::{Card, StatCard},
            charts, money,
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    // A failed load replaces the whole dashboard, like the other loaders.
    if let Some(message) = &state.dashboard.error {
        render_error(frame, area, message, &theme);
        return;
    }
    let Some(stats) = state.dashboard.stats.as_ref() else {
        let text = if state.dashboard.loading {
            "Loading dashboard..."
        } else {
            "No data yet. Press r to refresh."
        };
        render_placeholder(frame, area, text, &theme);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // KPI cards
            Constraint::Min(10),   // Balance curve + recent trades
            Constraint::Length(9), // Risk + performance
        ])
        .split(area);

    render_kpis(frame, rows[0], stats, &theme);

    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);
    render_balance_curve(frame, mid[0], stats, &theme);
    render_recent_trades(frame, mid[1], stats, &theme);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    render_risk(frame, bottom[0], stats, &theme);
    render_performance(frame, bottom[1], stats, &theme);
}

fn render_kpis(frame: &mut Frame<'_>, area: Rect, stats: &DashboardStats, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
        ])
        .split(area);

    StatCard::new(
        "Total Balance",
        Span::styled(
            money::usd(stats.total_balance),
            Style::default().fg(theme.text),
        ),
        theme,
    )
    .render(frame, cols[0]);

    StatCard::new("Total P&L", money::styled_amount(stats.total_pl, theme), theme)
        .render(frame, cols[1]);

    StatCard::new(
        "Active Accounts",
        Span::styled(
            stats.active_accounts.to_string(),
            Style::default().fg(theme.text),
        ),
        theme,
    )
    .render(frame, cols[2]);

    StatCard::new(
        "Win Rate",
        Span::styled(
            format!("{:.1}%", stats.win_rate),
            Style::default().fg(theme.text),
        ),
        theme,
    )
    .subtitle(Line::from(Span::styled(
        format!("{} trades", stats.total_trades_count),
        Style::default().fg(theme.dim),
    )))
    .render(frame, cols[3]);
}

fn render_balance_curve(frame: &mut Frame<'_>, area: Rect, stats: &DashboardStats, theme: &Theme) {
    let card = Card::new("Balance Curve", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let values: Vec<f64> = stats.balance_curve.iter().map(|p| p.balance).collect();
    let Some((lo, hi)) = chart_domain(&values) else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No balance history yet.",
                Style::default().fg(theme.dim),
            )),
            inner,
        );
        return;
    };
    // A flat series still needs a visible span to draw on.
    let (lo, hi) = if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    };

    let points: Vec<(f64, f64)> = stats
        .balance_curve
        .iter()
        .enumerate()
        .map(|(i, point)| (i as f64, point.balance))
        .collect();
    let x_max = points.len().saturating_sub(1).max(1) as f64;

    let x_labels = vec![
        stats
            .balance_curve
            .first()
            .map(|p| p.date.format("%d %b").to_string())
            .unwrap_or_default(),
        stats
            .balance_curve
            .last()
            .map(|p| p.date.format("%d %b").to_string())
            .unwrap_or_default(),
    ];
    let y_labels = vec![
        money::usd_whole(lo),
        money::usd_whole((lo + hi) / 2.0),
        money::usd_whole(hi),
    ];

    let dataset = Dataset::default()
        .name("Balance")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.accent))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(Style::default().fg(theme.dim))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme.dim))
                .bounds([lo, hi])
                .labels(y_labels),
        );

    frame.render_widget(chart, inner);
}

fn render_recent_trades(frame: &mut Frame<'_>, area: Rect, stats: &DashboardStats, theme: &Theme) {
    let card = Card::new("Recent Trades", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let items: Vec<ListItem> = stats
        .recent_trades
        .iter()
        .take(inner.height as usize)
        .map(|trade| {
            let time = trade.close_time.format("%d %b %H:%M").to_string();
            let (arrow, arrow_color) = match trade.side {
                TradeSide::Buy => ("▲", theme.accent),
                TradeSide::Sell => ("▼", theme.warning),
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{time:<13}"), Style::default().fg(theme.dim)),
                Span::styled(format!("{arrow} "), Style::default().fg(arrow_color)),
                Span::styled(format!("{:<9}", trade.symbol), Style::default().fg(theme.text)),
                money::styled_amount(trade.profit, theme),
                Span::raw("  "),
                Span::styled(
                    trade.account_alias.clone(),
                    Style::default().fg(theme.text_muted),
                ),
            ]))
        })
        .collect();

    if items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No recent trades",
                Style::default().fg(theme.dim),
            )),
            inner,
        );
    } else {
        frame.render_widget(List::new(items), inner);
    }
}

fn render_risk(frame: &mut Frame<'_>, area: Rect, stats: &DashboardStats, theme: &Theme) {
    let card = Card::new("Risk", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if stats.risk_metrics.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No accounts with risk rules.",
                Style::default().fg(theme.dim),
            )),
            inner,
        );
        return;
    }

    let bar_width = 14;
    let mut lines = Vec::new();
    for metric in stats.risk_metrics.iter().take(inner.height as usize / 3) {
        let mut name = vec![Span::styled(
            metric.account_alias.clone(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )];
        if metric.is_trailing {
            name.push(Span::styled(" trailing", Style::default().fg(theme.dim)));
        }
        lines.push(Line::from(name));

        let dd = metric.drawdown_progress;
        lines.push(Line::from(vec![
            Span::styled("  DD ", Style::default().fg(theme.text_muted)),
            Span::styled(
                charts::percentage_bar(dd, bar_width),
                Style::default().fg(charts::bar_color(dd, theme)),
            ),
            Span::styled(
                format!("  floor {}", money::usd(metric.drawdown_limit_price)),
                Style::default().fg(theme.dim),
            ),
        ]));

        if let Some(view) = consistency_view(metric) {
            let label_color = if metric.is_in_drawdown {
                theme.negative
            } else {
                theme.text
            };
            lines.push(Line::from(vec![
                Span::styled("  CR ", Style::default().fg(theme.text_muted)),
                Span::styled(
                    charts::fill_bar(view.percent, bar_width),
                    Style::default().fg(theme.accent),
                ),
                Span::raw(" "),
                Span::styled(view.label, Style::default().fg(label_color)),
            ]));
        }
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_performance(frame: &mut Frame<'_>, area: Rect, stats: &DashboardStats, theme: &Theme) {
    let card = Card::new("Performance", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let amounts = vec![
        stat_line("Best trade", money::styled_amount(stats.best_trade, theme), theme),
        stat_line(
            "Worst trade",
            money::styled_amount(stats.worst_trade, theme),
            theme,
        ),
        stat_line(
            "Average win",
            money::styled_amount(stats.average_win, theme),
            theme,
        ),
        stat_line(
            "Average loss",
            money::styled_amount(stats.average_loss, theme),
            theme,
        ),
        stat_line(
            "Best day",
            money::styled_amount(stats.highest_profitable_day, theme),
            theme,
        ),
    ];
    frame.render_widget(Paragraph::new(amounts), cols[0]);

    let ratios = vec![
        stat_line(
            "Total trades",
            Span::styled(
                stats.total_trades_count.to_string(),
                Style::default().fg(theme.text),
            ),
            theme,
        ),
        stat_line(
            "Profit factor",
            ratio_span(stats.profit_factor, stats.profit_factor >= 1.0, theme),
            theme,
        ),
        stat_line(
            "Average RRR",
            Span::styled(
                format!("{:.2}", stats.average_rrr),
                Style::default().fg(theme.text),
            ),
            theme,
        ),
        stat_line(
            "Sharpe ratio",
            ratio_span(stats.sharpe_ratio, stats.sharpe_ratio > 1.0, theme),
            theme,
        ),
        stat_line(
            "Z-score",
            ratio_span(stats.z_score, stats.z_score >= 0.0, theme),
            theme,
        ),
    ];
    frame.render_widget(Paragraph::new(ratios), cols[1]);
}

fn stat_line(label: &str, value: Span<'static>, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<14}"), Style::default().fg(theme.text_muted)),
        value,
    ])
}

fn ratio_span(value: f64, healthy: bool, theme: &Theme) -> Span<'static> {
    let color = if healthy { theme.positive } else { theme.warning };
    Span::styled(format!("{value:.2}"), Style::default().fg(color))
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
    Card::new("Dashboard", theme).render_with(frame, area, body);
}

fn render_placeholder(frame: &mut Frame<'_>, area: Rect, text: &str, theme: &Theme) {
    let body = Paragraph::new(Span::styled(
        text.to_string(),
        Style::default().fg(theme.dim),
    ))
    .alignment(Alignment::Center);
    Card::new("Dashboard", theme).render_with(frame, area, body);
}
