use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Direction of a filled order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Uppercase form, as the platform reports order types.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

/// Lifecycle stage of a prop-firm account.
///
/// Evaluation phases carry a profit target; funded and personal accounts do
/// not, and the backend stores their `target_percent` as 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "Phase 1")]
    Phase1,
    #[serde(rename = "Phase 2")]
    Phase2,
    Funded,
    Personal,
}

impl AccountType {
    pub const ALL: [Self; 4] = [Self::Phase1, Self::Phase2, Self::Funded, Self::Personal];

    /// Canonical string used on the wire and in the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phase1 => "Phase 1",
            Self::Phase2 => "Phase 2",
            Self::Funded => "Funded",
            Self::Personal => "Personal",
        }
    }

    /// Whether this stage has a meaningful profit target.
    pub fn has_profit_target(self) -> bool {
        matches!(self, Self::Phase1 | Self::Phase2)
    }
}

/// Error body returned by the backend on failed requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

pub mod account {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Account {
        pub id: i64,
        pub prop_firm: String,
        pub alias: String,
        pub login_id: i64,
        pub account_type: AccountType,
        pub active: bool,
        /// Technical server name, matching `server::Server::name`.
        pub server: String,
        pub initial_balance: f64,
        pub balance: f64,
        /// Risk per trade as a percentage of balance.
        pub risk_per_trade: f64,
        /// Profit target percentage; 0 outside evaluation phases.
        pub target_percent: f64,
        pub investment: f64,
    }

    /// Create payload. All numerics are typed; the client validates ranges
    /// before submitting.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AccountCreate {
        pub login_id: i64,
        pub password: String,
        pub server: String,
        pub alias: String,
        pub prop_firm: String,
        pub account_type: AccountType,
        pub initial_balance: f64,
        pub risk_per_trade: f64,
        pub target_percent: f64,
        pub investment: f64,
        pub trailing_drawdown: bool,
        /// Daily loss limit percentage; 0 disables the rule.
        pub daily_drawdown_limit: f64,
        /// Max drawdown percentage; 0 disables the rule.
        pub max_drawdown_limit: f64,
        /// Consistency rule percentage; 0 disables the rule.
        pub consistency_rule: f64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub alias: String,
        pub active: bool,
    }
}

pub mod server {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Server {
        pub id: i64,
        /// Technical identifier as the trading platform knows it.
        pub name: String,
        /// Display name shown in pickers.
        pub alias: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ServerCreate {
        pub name: String,
        pub alias: String,
    }
}

pub mod trade {
    use super::*;

    /// A closed trade. Immutable once fetched; the journal never edits
    /// trades client-side.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Trade {
        pub id: i64,
        pub ticket: i64,
        pub account_alias: String,
        pub symbol: String,
        #[serde(rename = "type")]
        pub side: TradeSide,
        pub profit: f64,
        /// Naive timestamps in the platform's server time.
        pub open_time: Option<NaiveDateTime>,
        pub close_time: NaiveDateTime,
        pub commission: f64,
        pub swap: f64,
        pub comment: Option<String>,
    }
}

pub mod stats {
    use super::*;

    /// Server-computed dashboard aggregate. Replaced wholesale on every
    /// selection change; every field is required so a missing one is a
    /// contract violation, not a silent zero.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct DashboardStats {
        pub total_balance: f64,
        pub total_pl: f64,
        pub active_accounts: i64,
        /// Win percentage over the scoped trades, 0-100.
        pub win_rate: f64,
        pub recent_trades: Vec<RecentTrade>,
        pub balance_curve: Vec<BalancePoint>,
        pub best_trade: f64,
        pub worst_trade: f64,
        pub average_win: f64,
        pub average_loss: f64,
        pub highest_profitable_day: f64,
        pub total_trades_count: i64,
        pub profit_factor: f64,
        pub average_rrr: f64,
        pub sharpe_ratio: f64,
        pub z_score: f64,
        pub risk_metrics: Vec<RiskMetric>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct RecentTrade {
        pub id: i64,
        pub symbol: String,
        #[serde(rename = "type")]
        pub side: TradeSide,
        pub profit: f64,
        pub close_time: NaiveDateTime,
        pub account_alias: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BalancePoint {
        pub date: NaiveDate,
        pub balance: f64,
    }

    /// Per-account rule evaluation computed by the backend.
    ///
    /// Progress fields are percentages and arrive pre-clamped; the client
    /// renders them as received.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct RiskMetric {
        pub account_alias: String,
        pub current_balance: f64,
        /// Balance at which the account fails its drawdown rule.
        pub drawdown_limit_price: f64,
        pub drawdown_progress: f64,
        pub is_trailing: bool,
        pub max_drawdown_percent: f64,
        /// 0 when the account has no consistency rule.
        pub consistency_rule_percent: f64,
        pub consistency_progress: f64,
        pub highest_daily_profit: f64,
        pub profit_target_for_consistency: f64,
        pub is_in_drawdown: bool,
    }
}

pub mod calendar {
    use super::*;

    /// Month aggregate for the trading calendar.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct MonthlyStats {
        pub month_total_profit: f64,
        pub month_win_rate: f64,
        pub total_trades: i64,
        /// One entry per day with at least one trade; absent days traded
        /// nothing.
        pub days: Vec<DailyStat>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct DailyStat {
        pub date: NaiveDate,
        pub profit: f64,
        pub trades_count: i64,
        pub wins: i64,
    }
}

pub mod sync {
    use super::*;

    /// Result of a platform synchronization pass.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SyncReport {
        pub new_trades_added: i64,
    }
}
