use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use api_types::{account::Account, server::Server};

use crate::{
    app::{AccountsMode, AppState, PendingDelete},
    forms::{AccountField, AccountForm, EditAccountForm, EditField},
    metrics,
    ui::{
        components::{card::Card, money, popup},
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
    render_list(frame, rows[1], state, &theme);

    match &state.accounts.mode {
        AccountsMode::List => {}
        AccountsMode::Create(form) => render_create_popup(frame, area, form, state, &theme),
        AccountsMode::Edit(form) => render_edit_popup(frame, area, form, &theme),
        AccountsMode::ConfirmDelete(pending) => render_delete_popup(frame, area, pending, &theme),
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let accounts = &state.accounts;
    let shown = accounts.visible().len();

    let mut spans = vec![
        Span::styled("Filter: ", Style::default().fg(theme.text_muted)),
        Span::styled(
            accounts.filter.label(),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  ({shown} shown)"), Style::default().fg(theme.dim)),
    ];
    if accounts.loading {
        spans.push(Span::styled("  loading...", Style::default().fg(theme.dim)));
    }
    // Load failures show here; the last good list stays on screen below.
    if let Some(error) = &accounts.error {
        spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(theme.error),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(" Accounts ", Style::default().fg(theme.accent)));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_list(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let visible = state.accounts.visible();
    if visible.is_empty() {
        let text = if state.accounts.loading {
            "Loading accounts..."
        } else {
            "No accounts match this filter. Press n to add one."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|account| account_row(account, theme))
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(state.accounts.selected.min(visible.len() - 1)));

    let list = List::new(items)
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn account_row(account: &Account, theme: &Theme) -> ListItem<'static> {
    let perf = metrics::performance(account.initial_balance, account.balance);
    let status = if account.active {
        Span::styled("ACTIVE", Style::default().fg(theme.positive))
    } else {
        Span::styled("INACTIVE", Style::default().fg(theme.dim))
    };

    let head = Line::from(vec![
        Span::styled(
            format!("{:<16}", account.alias),
            Style::default().fg(theme.text),
        ),
        Span::styled(
            format!("{:<14}", account.prop_firm),
            Style::default().fg(theme.text_muted),
        ),
        Span::styled(
            format!("{:<9}", account.account_type.as_str()),
            Style::default().fg(theme.accent),
        ),
        Span::styled(
            format!("{:<10}", account.login_id),
            Style::default().fg(theme.dim),
        ),
        Span::styled(
            format!("{:>12}", money::usd(account.balance)),
            Style::default().fg(theme.text),
        ),
        Span::raw("  "),
        money::styled_amount(perf.pl, theme),
        Span::raw("  "),
        money::styled_percent_change(perf.growth_pct, theme),
        Span::raw("  "),
        status,
    ]);

    let mut detail = vec![Span::styled(
        format!("  {:<28}", account.server),
        Style::default().fg(theme.dim),
    )];
    detail.push(Span::styled(
        format!("risk {:.1}%", account.risk_per_trade),
        Style::default().fg(theme.dim),
    ));
    if account.account_type.has_profit_target() {
        detail.push(Span::styled(
            format!("   target {:.1}%", account.target_percent),
            Style::default().fg(theme.dim),
        ));
    }

    ListItem::new(vec![head, Line::from(detail)])
}

fn render_create_popup(
    frame: &mut Frame<'_>,
    area: Rect,
    form: &AccountForm,
    state: &AppState,
    theme: &Theme,
) {
    let rect = popup::centered(area, 64, 20);
    frame.render_widget(Clear, rect);
    let card = Card::new("New Account", theme).focused(true);
    let inner = card.inner(rect);
    card.render_frame(frame, rect);

    let mut lines: Vec<Line> = AccountField::ORDER
        .iter()
        .map(|field| field_line(form, *field, &state.servers.items, theme))
        .collect();

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme.error),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Tab next  ◂ ▸ cycle  Enter save  Esc cancel",
        Style::default().fg(theme.dim),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn field_line(
    form: &AccountForm,
    field: AccountField,
    servers: &[Server],
    theme: &Theme,
) -> Line<'static> {
    let focused = form.focus == field;
    let value_style = if focused {
        Style::default().fg(theme.text)
    } else {
        Style::default().fg(theme.dim)
    };

    let mut spans = vec![
        Span::styled(format!("{:<20}", field.label()), label_style(focused, theme)),
        Span::styled(field_value(form, field, servers), value_style),
    ];
    if focused && !field.is_picker() {
        spans.push(Span::styled("▏", Style::default().fg(theme.accent)));
    }
    Line::from(spans)
}

fn field_value(form: &AccountForm, field: AccountField, servers: &[Server]) -> String {
    match field {
        AccountField::LoginId => form.login_id.clone(),
        AccountField::Password => "•".repeat(form.password.chars().count()),
        AccountField::Server => form.selected_server(servers).map_or_else(
            || "no servers yet".to_string(),
            |server| format!("◂ {} ({}) ▸", server.alias, server.name),
        ),
        AccountField::Alias => form.alias.clone(),
        AccountField::PropFirm => form.prop_firm.clone(),
        AccountField::AccountType => format!("◂ {} ▸", form.account_type.as_str()),
        AccountField::InitialBalance => form.initial_balance.clone(),
        AccountField::RiskPerTrade => form.risk_per_trade.clone(),
        AccountField::TargetPercent => {
            if form.account_type.has_profit_target() {
                form.target_percent.clone()
            } else {
                "0  (not used for this account type)".to_string()
            }
        }
        AccountField::Investment => form.investment.clone(),
        AccountField::TrailingDrawdown => {
            if form.trailing_drawdown { "[x]" } else { "[ ]" }.to_string()
        }
        AccountField::DailyDrawdownLimit => form.daily_drawdown_limit.clone(),
        AccountField::MaxDrawdownLimit => form.max_drawdown_limit.clone(),
        AccountField::ConsistencyRule => form.consistency_rule.clone(),
    }
}

fn render_edit_popup(frame: &mut Frame<'_>, area: Rect, form: &EditAccountForm, theme: &Theme) {
    let rect = popup::centered(area, 48, 9);
    frame.render_widget(Clear, rect);
    let card = Card::new("Edit Account", theme).focused(true);
    let inner = card.inner(rect);
    card.render_frame(frame, rect);

    let alias_focused = form.focus == EditField::Alias;
    let mut alias_spans = vec![
        Span::styled(format!("{:<8}", "Alias"), label_style(alias_focused, theme)),
        Span::styled(form.alias.clone(), Style::default().fg(theme.text)),
    ];
    if alias_focused {
        alias_spans.push(Span::styled("▏", Style::default().fg(theme.accent)));
    }

    let mut lines = vec![
        Line::from(alias_spans),
        Line::from(vec![
            Span::styled(
                format!("{:<8}", "Active"),
                label_style(form.focus == EditField::Active, theme),
            ),
            Span::styled(
                if form.active { "[x]" } else { "[ ]" },
                Style::default().fg(theme.text),
            ),
        ]),
        Line::from(""),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme.error),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Tab next  Space toggle  Enter save  Esc cancel",
        Style::default().fg(theme.dim),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_delete_popup(frame: &mut Frame<'_>, area: Rect, pending: &PendingDelete, theme: &Theme) {
    let rect = popup::centered(area, 46, 7);
    frame.render_widget(Clear, rect);
    let card = Card::new("Delete Account", theme).focused(true);
    let inner = card.inner(rect);
    card.render_frame(frame, rect);

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Delete account {}?", pending.alias),
                Style::default().fg(theme.text),
            )),
            Line::from(Span::styled(
                "Its trade history goes with it.",
                Style::default().fg(theme.warning),
            )),
            Line::from(""),
            Line::from(confirm_hints(theme)),
        ]),
        inner,
    );
}

fn label_style(focused: bool, theme: &Theme) -> Style {
    if focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_muted)
    }
}

pub(super) fn confirm_hints(theme: &Theme) -> Vec<Span<'static>> {
    vec![
        Span::styled("y", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
        Span::styled(" confirm   ", Style::default().fg(theme.text_muted)),
        Span::styled("n", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
        Span::styled(" cancel", Style::default().fg(theme.text_muted)),
    ]
}
