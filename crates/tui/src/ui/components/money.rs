use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// Formats dollars with thousands separators: `$51,200.00`, `-$1,300.50`.
#[must_use]
pub fn usd(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// Like [`usd`] but with an explicit `+` on gains. Breakeven is a gain.
#[must_use]
pub fn signed_usd(amount: f64) -> String {
    if amount < 0.0 {
        usd(amount)
    } else {
        format!("+{}", usd(amount))
    }
}

/// Compact signed form without cents, for calendar cells: `+$120`.
#[must_use]
pub fn signed_usd_whole(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "+" };
    format!("{sign}${}", group_thousands(amount.abs().round() as u64))
}

/// Whole-dollar form for chart axis labels: `$51,200`.
#[must_use]
pub fn usd_whole(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(amount.abs().round() as u64))
}

/// Signed amount colored by direction. Zero styles as a gain, matching
/// how breakeven trades are counted.
#[must_use]
pub fn styled_amount(amount: f64, theme: &Theme) -> Span<'static> {
    let color = if amount >= 0.0 {
        theme.positive
    } else {
        theme.negative
    };
    Span::styled(signed_usd(amount), Style::default().fg(color))
}

#[must_use]
pub fn styled_amount_bold(amount: f64, theme: &Theme) -> Span<'static> {
    let color = if amount >= 0.0 {
        theme.positive
    } else {
        theme.negative
    };
    Span::styled(
        signed_usd(amount),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Growth as `▲ +15.00%` (green) or `▼ -13.00%` (red).
#[must_use]
pub fn styled_percent_change(change: f64, theme: &Theme) -> Span<'static> {
    let (arrow, color) = if change >= 0.0 {
        ("▲", theme.positive)
    } else {
        ("▼", theme.negative)
    };
    let sign = if change >= 0.0 { "+" } else { "" };
    Span::styled(
        format!("{arrow} {sign}{change:.2}%"),
        Style::default().fg(color),
    )
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
