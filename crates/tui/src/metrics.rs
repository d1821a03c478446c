//! Pure display derivations. Everything here is stateless: raw backend
//! numbers in, render-ready values out. The backend owns all real
//! computation; these helpers only reshape it and keep division-by-zero
//! from ever reaching the screen.

use api_types::stats::RiskMetric;

/// Derived account performance. P&L is never persisted client-side; it is
/// recomputed from the two balances on every render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Performance {
    pub pl: f64,
    pub growth_pct: f64,
}

/// `growth_pct` short-circuits to 0 when the initial balance is not
/// positive, so no NaN or infinity can reach formatting.
#[must_use]
pub fn performance(initial_balance: f64, balance: f64) -> Performance {
    let pl = balance - initial_balance;
    let growth_pct = if initial_balance > 0.0 {
        pl / initial_balance * 100.0
    } else {
        0.0
    };
    Performance { pl, growth_pct }
}

/// Y-axis bounds for the balance curve: `[min, max]` padded by 2% of the
/// range on both ends. `None` means there is nothing to chart and the
/// caller renders an "insufficient data" placeholder instead.
#[must_use]
pub fn chart_domain(balances: &[f64]) -> Option<(f64, f64)> {
    let first = *balances.first()?;
    let (min, max) = balances
        .iter()
        .fold((first, first), |(lo, hi), &b| (lo.min(b), hi.max(b)));
    let buffer = (max - min) * 0.02;
    Some((min - buffer, max + buffer))
}

/// A trade counts as a win when its profit is non-negative.
#[must_use]
pub fn is_win(profit: f64) -> bool {
    profit >= 0.0
}

/// Three-way account-status filter. `All` is the unfiltered view; the
/// other two partition the list by the `active` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl StatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::All => "All",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::All,
            Self::All => Self::Active,
        }
    }

    pub fn matches(self, active: bool) -> bool {
        match self {
            Self::Active => active,
            Self::Inactive => !active,
            Self::All => true,
        }
    }
}

/// Consistency-rule bar as it should be drawn, or `None` when the account
/// carries no consistency rule at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyView {
    /// Bar fill percentage.
    pub percent: f64,
    pub label: String,
}

/// While an account sits in drawdown the consistency figure is meaningless
/// and the backend's raw progress must not be shown: the bar collapses to
/// zero with a fixed label.
#[must_use]
pub fn consistency_view(metric: &RiskMetric) -> Option<ConsistencyView> {
    if metric.consistency_rule_percent <= 0.0 {
        return None;
    }
    if metric.is_in_drawdown {
        return Some(ConsistencyView {
            percent: 0.0,
            label: "En Drawdown".to_string(),
        });
    }
    Some(ConsistencyView {
        percent: metric.consistency_progress,
        label: format!("{:.1}%", metric.consistency_progress),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(rule: f64, progress: f64, in_drawdown: bool) -> RiskMetric {
        RiskMetric {
            account_alias: "FTMO-1".to_string(),
            current_balance: 51_200.0,
            drawdown_limit_price: 48_500.0,
            drawdown_progress: 42.0,
            is_trailing: true,
            max_drawdown_percent: 10.0,
            consistency_rule_percent: rule,
            consistency_progress: progress,
            highest_daily_profit: 1_200.0,
            profit_target_for_consistency: 2_400.0,
            is_in_drawdown: in_drawdown,
        }
    }

    #[test]
    fn zero_initial_balance_never_divides() {
        let perf = performance(0.0, 5_000.0);
        assert_eq!(perf.growth_pct, 0.0);
        assert!(perf.growth_pct.is_finite());

        let perf = performance(0.0, -5_000.0);
        assert_eq!(perf.growth_pct, 0.0);
    }

    #[test]
    fn winning_account_gains() {
        let perf = performance(10_000.0, 11_500.0);
        assert_eq!(perf.pl, 1_500.0);
        assert_eq!(format!("{:.2}%", perf.growth_pct), "15.00%");
    }

    #[test]
    fn losing_account_loses() {
        let perf = performance(10_000.0, 8_700.0);
        assert_eq!(perf.pl, -1_300.0);
        assert_eq!(format!("{:.2}%", perf.growth_pct), "-13.00%");
    }

    #[test]
    fn breakeven_trades_count_as_wins() {
        assert!(is_win(0.0));
        assert!(is_win(12.5));
        assert!(!is_win(-0.01));
    }

    #[test]
    fn chart_domain_pads_two_percent_of_range() {
        let (min, max) = chart_domain(&[100.0, 110.0, 90.0]).unwrap();
        assert!((min - 89.6).abs() < 1e-9);
        assert!((max - 110.4).abs() < 1e-9);
    }

    #[test]
    fn chart_domain_empty_means_no_chart() {
        assert_eq!(chart_domain(&[]), None);
    }

    #[test]
    fn chart_domain_flat_series_collapses() {
        assert_eq!(chart_domain(&[250.0]), Some((250.0, 250.0)));
    }

    #[test]
    fn consistency_hidden_without_rule() {
        assert_eq!(consistency_view(&metric(0.0, 80.0, false)), None);
    }

    #[test]
    fn drawdown_overrides_consistency_progress() {
        let view = consistency_view(&metric(25.0, 80.0, true)).unwrap();
        assert_eq!(view.percent, 0.0);
        assert_eq!(view.label, "En Drawdown");
    }

    #[test]
    fn consistency_shows_raw_progress_otherwise() {
        let view = consistency_view(&metric(25.0, 80.0, false)).unwrap();
        assert_eq!(view.percent, 80.0);
        assert_eq!(view.label, "80.0%");
    }

    #[test]
    fn status_filter_partition_is_disjoint_and_covering() {
        let flags = [true, false, true];
        let count = |f: StatusFilter| flags.iter().filter(|&&a| f.matches(a)).count();

        assert_eq!(count(StatusFilter::Active), 2);
        assert_eq!(count(StatusFilter::Inactive), 1);
        assert_eq!(count(StatusFilter::All), 3);
        assert_eq!(
            count(StatusFilter::Active) + count(StatusFilter::Inactive),
            count(StatusFilter::All)
        );
        for &a in &flags {
            assert!(StatusFilter::Active.matches(a) != StatusFilter::Inactive.matches(a));
        }
    }

    #[test]
    fn status_filter_cycles_through_all_three() {
        let f = StatusFilter::default();
        assert_eq!(f, StatusFilter::Active);
        assert_eq!(f.next(), StatusFilter::Inactive);
        assert_eq!(f.next().next(), StatusFilter::All);
        assert_eq!(f.next().next().next(), StatusFilter::Active);
    }
}
