use api_types::{
    ErrorResponse,
    account::{Account, AccountCreate, AccountUpdate},
    calendar::MonthlyStats,
    server::{Server, ServerCreate},
    stats::DashboardStats,
    sync::SyncReport,
    trade::Trade,
};
use chrono::NaiveDate;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::{AppError, Result};

/// Per-request failures, surfaced inside the UI rather than aborting the
/// app. The backend has no auth, so there is no unauthorized variant.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation rejected: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport: {0}")]
    Transport(reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|err| AppError::BaseUrl(err.to_string()))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub async fn accounts(&self) -> std::result::Result<Vec<Account>, ClientError> {
        let res = self
            .http
            .get(self.endpoint("accounts/")?)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::parse(res).await
    }

    pub async fn create_account(
        &self,
        payload: &AccountCreate,
    ) -> std::result::Result<(), ClientError> {
        let res = self
            .http
            .post(self.endpoint("accounts/")?)
            .json(payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::expect_ok(res).await
    }

    pub async fn update_account(
        &self,
        id: i64,
        payload: &AccountUpdate,
    ) -> std::result::Result<(), ClientError> {
        let res = self
            .http
            .patch(self.endpoint(&format!("accounts/{id}"))?)
            .json(payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::expect_ok(res).await
    }

    pub async fn delete_account(&self, id: i64) -> std::result::Result<(), ClientError> {
        let res = self
            .http
            .delete(self.endpoint(&format!("accounts/{id}"))?)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::expect_ok(res).await
    }

    pub async fn servers(&self) -> std::result::Result<Vec<Server>, ClientError> {
        let res = self
            .http
            .get(self.endpoint("servers/")?)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::parse(res).await
    }

    pub async fn create_server(
        &self,
        payload: &ServerCreate,
    ) -> std::result::Result<(), ClientError> {
        let res = self
            .http
            .post(self.endpoint("servers/")?)
            .json(payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::expect_ok(res).await
    }

    pub async fn delete_server(&self, id: i64) -> std::result::Result<(), ClientError> {
        let res = self
            .http
            .delete(self.endpoint(&format!("servers/{id}"))?)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::expect_ok(res).await
    }

    pub async fn sync_all(&self) -> std::result::Result<SyncReport, ClientError> {
        let res = self
            .http
            .post(self.endpoint("sync-all")?)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::parse(res).await
    }

    /// Dashboard aggregate, optionally scoped to one account.
    pub async fn dashboard_stats(
        &self,
        account_id: Option<i64>,
    ) -> std::result::Result<DashboardStats, ClientError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(id) = account_id {
            params.push(("account_id", id.to_string()));
        }
        let res = self
            .http
            .get(self.endpoint("dashboard-stats")?)
            .query(&params)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::parse(res).await
    }

    /// Calendar aggregate for one month, optionally scoped to one account.
    pub async fn calendar_stats(
        &self,
        year: i32,
        month: u32,
        account_id: Option<i64>,
    ) -> std::result::Result<MonthlyStats, ClientError> {
        let mut params: Vec<(&str, String)> =
            vec![("year", year.to_string()), ("month", month.to_string())];
        if let Some(id) = account_id {
            params.push(("account_id", id.to_string()));
        }
        let res = self
            .http
            .get(self.endpoint("calendar-stats")?)
            .query(&params)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::parse(res).await
    }

    /// Trades closed on the given day.
    pub async fn trades_on(&self, date: NaiveDate) -> std::result::Result<Vec<Trade>, ClientError> {
        let res = self
            .http
            .get(self.endpoint("trades/")?)
            .query(&[("trade_date", date.format("%Y-%m-%d").to_string())])
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::parse(res).await
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    async fn parse<T: DeserializeOwned>(res: Response) -> std::result::Result<T, ClientError> {
        if res.status().is_success() {
            return res.json::<T>().await.map_err(ClientError::Transport);
        }
        Err(Self::error_for(res).await)
    }

    /// Writes whose response body the UI ignores; only the status matters.
    async fn expect_ok(res: Response) -> std::result::Result<(), ClientError> {
        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for(res).await)
    }

    async fn error_for(res: Response) -> ClientError {
        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.detail)
            .unwrap_or_else(|_| "unknown error".to_string());

        match status.as_u16() {
            404 => ClientError::NotFound,
            409 => ClientError::Conflict(body),
            400 | 422 => ClientError::Validation(body),
            _ => ClientError::Server(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use api_types::{AccountType, TradeSide};
    use axum::{
        Json, Router,
        extract::{RawQuery, State},
        http::StatusCode,
        routing::{delete, get, patch, post},
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    #[derive(Default)]
    struct Captured {
        body: Mutex<Option<Value>>,
        query: Mutex<Option<String>>,
    }

    async fn spawn(router: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    async fn client_for(router: Router) -> Client {
        let addr = spawn(router).await;
        Client::new(&format!("http://{addr}")).unwrap()
    }

    fn account_json() -> Value {
        json!({
            "id": 7,
            "prop_firm": "FTMO",
            "alias": "FTMO 50k",
            "login_id": 10012,
            "account_type": "Phase 1",
            "active": true,
            "server": "FTMO-Server",
            "initial_balance": 50000.0,
            "balance": 51200.0,
            "risk_per_trade": 1.0,
            "target_percent": 8.0,
            "investment": 350.0
        })
    }

    fn trade_json() -> Value {
        json!({
            "id": 41,
            "ticket": 900412,
            "account_alias": "FTMO 50k",
            "symbol": "XAUUSD",
            "type": "SELL",
            "profit": -85.25,
            "open_time": null,
            "close_time": "2026-08-21T14:03:05",
            "commission": -3.5,
            "swap": 0.0,
            "comment": "tp hit"
        })
    }

    #[tokio::test]
    async fn typed_lists_round_trip() {
        let router = Router::new()
            .route("/accounts/", get(|| async { Json(json!([account_json()])) }))
            .route(
                "/servers/",
                get(|| async { Json(json!([{"id": 1, "name": "FTMO-Server", "alias": "FTMO"}])) }),
            )
            .route("/trades/", get(|| async { Json(json!([trade_json()])) }));
        let client = client_for(router).await;

        let accounts = client.accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_type, AccountType::Phase1);
        assert_eq!(accounts[0].login_id, 10012);

        let servers = client.servers().await.unwrap();
        assert_eq!(servers[0].alias, "FTMO");

        let date = NaiveDate::from_ymd_opt(2026, 8, 21).unwrap();
        let trades = client.trades_on(date).await.unwrap();
        assert_eq!(trades[0].side, TradeSide::Sell);
        assert_eq!(trades[0].open_time, None);
        assert_eq!(trades[0].close_time.date(), date);
        assert_eq!(trades[0].comment.as_deref(), Some("tp hit"));
    }

    #[tokio::test]
    async fn create_account_posts_the_full_payload() {
        let captured = Arc::new(Captured::default());
        let router = Router::new()
            .route(
                "/accounts/",
                post(
                    |State(cap): State<Arc<Captured>>, Json(body): Json<Value>| async move {
                        *cap.body.lock().unwrap() = Some(body);
                        StatusCode::CREATED
                    },
                ),
            )
            .with_state(captured.clone());
        let client = client_for(router).await;

        let payload = AccountCreate {
            login_id: 10012,
            password: "secret".to_string(),
            server: "FTMO-Server".to_string(),
            alias: "FTMO 50k".to_string(),
            prop_firm: "FTMO".to_string(),
            account_type: AccountType::Phase1,
            initial_balance: 50_000.0,
            risk_per_trade: 1.0,
            target_percent: 8.0,
            investment: 350.0,
            trailing_drawdown: true,
            daily_drawdown_limit: 5.0,
            max_drawdown_limit: 10.0,
            consistency_rule: 25.0,
        };
        client.create_account(&payload).await.unwrap();

        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["login_id"], 10012);
        assert_eq!(body["account_type"], "Phase 1");
        assert_eq!(body["server"], "FTMO-Server");
        assert_eq!(body["trailing_drawdown"], true);
        assert_eq!(body["consistency_rule"], 25.0);
    }

    #[tokio::test]
    async fn missing_records_map_to_not_found() {
        let router = Router::new().route(
            "/accounts/{id}",
            delete(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"detail": "Account not found"})),
                )
            }),
        );
        let client = client_for(router).await;

        let err = client.delete_account(99).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound));
    }

    #[tokio::test]
    async fn validation_detail_passes_through() {
        let router = Router::new()
            .route(
                "/servers/",
                post(|| async {
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({"detail": "name already registered"})),
                    )
                }),
            )
            .route(
                "/accounts/{id}",
                patch(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"detail": "alias must not be empty"})),
                    )
                }),
            );
        let client = client_for(router).await;

        let payload = ServerCreate {
            name: "FTMO-Server".to_string(),
            alias: "FTMO".to_string(),
        };
        let err = client.create_server(&payload).await.unwrap_err();
        let ClientError::Validation(detail) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(detail, "name already registered");

        let update = AccountUpdate {
            alias: String::new(),
            active: true,
        };
        let err = client.update_account(7, &update).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_creates_conflict() {
        let router = Router::new().route(
            "/accounts/",
            post(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({"detail": "login 10012 already exists"})),
                )
            }),
        );
        let client = client_for(router).await;

        let payload = AccountCreate {
            login_id: 10012,
            password: "secret".to_string(),
            server: "FTMO-Server".to_string(),
            alias: "FTMO 50k".to_string(),
            prop_firm: "FTMO".to_string(),
            account_type: AccountType::Funded,
            initial_balance: 50_000.0,
            risk_per_trade: 1.0,
            target_percent: 0.0,
            investment: 350.0,
            trailing_drawdown: false,
            daily_drawdown_limit: 0.0,
            max_drawdown_limit: 0.0,
            consistency_rule: 0.0,
        };
        let err = client.create_account(&payload).await.unwrap_err();
        let ClientError::Conflict(detail) = err else {
            panic!("expected conflict, got {err:?}");
        };
        assert!(detail.contains("10012"));
    }

    #[tokio::test]
    async fn opaque_errors_still_map() {
        let router = Router::new().route(
            "/sync-all",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = client_for(router).await;

        let err = client.sync_all().await.unwrap_err();
        let ClientError::Server(detail) = err else {
            panic!("expected server error, got {err:?}");
        };
        assert_eq!(detail, "unknown error");
    }

    fn dashboard_json() -> Value {
        json!({
            "total_balance": 51200.0,
            "total_pl": 1200.0,
            "active_accounts": 1,
            "win_rate": 62.5,
            "recent_trades": [],
            "balance_curve": [{"date": "2026-08-20", "balance": 51200.0}],
            "best_trade": 400.0,
            "worst_trade": -210.0,
            "average_win": 150.0,
            "average_loss": -90.0,
            "highest_profitable_day": 520.0,
            "total_trades_count": 48,
            "profit_factor": 1.6,
            "average_rrr": 1.2,
            "sharpe_ratio": 1.4,
            "z_score": 0.3,
            "risk_metrics": []
        })
    }

    #[tokio::test]
    async fn dashboard_scope_is_optional() {
        let captured = Arc::new(Captured::default());
        let router = Router::new()
            .route(
                "/dashboard-stats",
                get(
                    |State(cap): State<Arc<Captured>>, RawQuery(query): RawQuery| async move {
                        *cap.query.lock().unwrap() = Some(query.unwrap_or_default());
                        Json(dashboard_json())
                    },
                ),
            )
            .with_state(captured.clone());
        let client = client_for(router).await;

        let stats = client.dashboard_stats(None).await.unwrap();
        assert_eq!(stats.total_trades_count, 48);
        assert_eq!(captured.query.lock().unwrap().clone().unwrap(), "");

        client.dashboard_stats(Some(7)).await.unwrap();
        assert_eq!(
            captured.query.lock().unwrap().clone().unwrap(),
            "account_id=7"
        );
    }

    #[tokio::test]
    async fn calendar_requests_name_the_month() {
        let captured = Arc::new(Captured::default());
        let router = Router::new()
            .route(
                "/calendar-stats",
                get(
                    |State(cap): State<Arc<Captured>>, RawQuery(query): RawQuery| async move {
                        *cap.query.lock().unwrap() = Some(query.unwrap_or_default());
                        Json(json!({
                            "month_total_profit": 310.0,
                            "month_win_rate": 58.0,
                            "total_trades": 21,
                            "days": [
                                {"date": "2026-08-03", "profit": 120.0, "trades_count": 3, "wins": 2}
                            ]
                        }))
                    },
                ),
            )
            .with_state(captured.clone());
        let client = client_for(router).await;

        let stats = client.calendar_stats(2026, 8, None).await.unwrap();
        assert_eq!(stats.days.len(), 1);
        assert_eq!(
            captured.query.lock().unwrap().clone().unwrap(),
            "year=2026&month=8"
        );

        client.calendar_stats(2026, 8, Some(7)).await.unwrap();
        assert_eq!(
            captured.query.lock().unwrap().clone().unwrap(),
            "year=2026&month=8&account_id=7"
        );
    }

    #[tokio::test]
    async fn day_queries_use_iso_dates() {
        let captured = Arc::new(Captured::default());
        let router = Router::new()
            .route(
                "/trades/",
                get(
                    |State(cap): State<Arc<Captured>>, RawQuery(query): RawQuery| async move {
                        *cap.query.lock().unwrap() = Some(query.unwrap_or_default());
                        Json(json!([]))
                    },
                ),
            )
            .with_state(captured.clone());
        let client = client_for(router).await;

        let date = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        client.trades_on(date).await.unwrap();
        assert_eq!(
            captured.query.lock().unwrap().clone().unwrap(),
            "trade_date=2026-08-02"
        );
    }

    #[tokio::test]
    async fn sync_returns_the_report() {
        let router = Router::new().route(
            "/sync-all",
            post(|| async { Json(json!({"new_trades_added": 3})) }),
        );
        let client = client_for(router).await;

        let report = client.sync_all().await.unwrap();
        assert_eq!(report.new_trades_added, 3);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        // Port 9 (discard) refuses connections on loopback.
        let client = Client::new("http://127.0.0.1:9").unwrap();
        let err = client.accounts().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
