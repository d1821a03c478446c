use ratatui::style::Color;

use crate::ui::theme::Theme;

/// Bare fill bar. The fill saturates at 0..=100% regardless of the raw
/// value; callers append whatever label fits.
#[must_use]
pub fn fill_bar(percent: f64, width: usize) -> String {
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64) as usize).min(width);
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Fill bar labelled with the raw value: a 130% drawdown reads as a full
/// bar labelled `130.0%`.
#[must_use]
pub fn percentage_bar(percent: f64, width: usize) -> String {
    format!("{} {percent:.1}%", fill_bar(percent, width))
}

/// Escalating color for a used-up allowance: calm below 70%, warning
/// below 90%, alarming past that.
#[must_use]
pub fn bar_color(percent: f64, theme: &Theme) -> Color {
    if percent < 70.0 {
        theme.positive
    } else if percent < 90.0 {
        theme.warning
    } else {
        theme.negative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_half_full() {
        assert_eq!(percentage_bar(50.0, 10), "█████░░░░░ 50.0%");
    }

    #[test]
    fn bar_fill_saturates_but_label_does_not() {
        let bar = percentage_bar(130.0, 10);
        assert!(bar.starts_with(&"█".repeat(10)));
        assert!(bar.ends_with("130.0%"));
    }

    #[test]
    fn negative_progress_renders_empty() {
        assert_eq!(percentage_bar(-5.0, 4), "░░░░ -5.0%");
    }

    #[test]
    fn colors_escalate_with_usage() {
        let theme = Theme::default();
        assert_eq!(bar_color(10.0, &theme), theme.positive);
        assert_eq!(bar_color(75.0, &theme), theme.warning);
        assert_eq!(bar_color(95.0, &theme), theme.negative);
    }
}
