use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, Days, Local, NaiveDate};
use crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    calendar,
    client::{Client, ClientError},
    config::AppConfig,
    error::{AppError, Result},
    forms::{AccountForm, EditAccountForm, ServerForm},
    metrics::StatusFilter,
    ui,
    ui::keymap::AppAction,
};

use api_types::{
    account::{Account, AccountCreate, AccountUpdate},
    calendar::MonthlyStats,
    server::{Server, ServerCreate},
    stats::DashboardStats,
    sync::SyncReport,
    trade::Trade,
};

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Accounts,
    Trades,
    Calendar,
    Servers,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Accounts => "Accounts",
            Self::Trades => "Trades",
            Self::Calendar => "Calendar",
            Self::Servers => "Servers",
        }
    }
}

/// What the dashboard and calendar aggregate over: everything, or a
/// single account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountScope {
    #[default]
    All,
    One(i64),
}

impl AccountScope {
    pub fn account_id(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::One(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    AccountCreate,
    AccountUpdate,
    AccountDelete,
    ServerCreate,
    ServerDelete,
}

impl WriteKind {
    fn success_message(self) -> &'static str {
        match self {
            Self::AccountCreate => "Account created.",
            Self::AccountUpdate => "Account updated.",
            Self::AccountDelete => "Account deleted.",
            Self::ServerCreate => "Server created.",
            Self::ServerDelete => "Server deleted.",
        }
    }

    fn owner(self) -> Section {
        match self {
            Self::AccountCreate | Self::AccountUpdate | Self::AccountDelete => Section::Accounts,
            Self::ServerCreate | Self::ServerDelete => Section::Servers,
        }
    }
}

/// Completed background request. Fetch variants carry the generation the
/// request was spawned under; `apply_event` drops anything stale.
#[derive(Debug)]
pub enum AppEvent {
    Dashboard {
        generation: u64,
        result: std::result::Result<DashboardStats, ClientError>,
    },
    Accounts {
        generation: u64,
        result: std::result::Result<Vec<Account>, ClientError>,
    },
    Trades {
        generation: u64,
        result: std::result::Result<Vec<Trade>, ClientError>,
    },
    Calendar {
        generation: u64,
        result: std::result::Result<MonthlyStats, ClientError>,
    },
    Servers {
        generation: u64,
        result: std::result::Result<Vec<Server>, ClientError>,
    },
    Write {
        kind: WriteKind,
        result: std::result::Result<(), ClientError>,
    },
    Sync {
        result: std::result::Result<SyncReport, ClientError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct AppState {
    pub section: Section,
    pub base_url: String,
    pub scope: AccountScope,
    pub dashboard: DashboardState,
    pub accounts: AccountsState,
    pub trades: TradesState,
    pub calendar: CalendarState,
    pub servers: ServersState,
    pub toast: Option<ToastState>,
    pub last_refresh: Option<DateTime<Local>>,
    pub connected: bool,
    pub sync_in_flight: bool,
}

impl AppState {
    pub fn scope_label(&self) -> String {
        match self.scope {
            AccountScope::All => "All accounts".to_string(),
            AccountScope::One(id) => self
                .accounts
                .items
                .iter()
                .find(|account| account.id == id)
                .map_or_else(|| format!("#{id}"), |account| account.alias.clone()),
        }
    }
}

pub struct App {
    client: Client,
    pub state: AppState,
    should_quit: bool,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let state = AppState {
            section: Section::Dashboard,
            base_url: config.base_url,
            scope: AccountScope::All,
            dashboard: DashboardState::default(),
            accounts: AccountsState::default(),
            trades: TradesState::default(),
            calendar: CalendarState::default(),
            servers: ServersState::default(),
            toast: None,
            last_refresh: None,
            connected: true,
            sync_in_flight: false,
        };

        Ok(Self {
            client,
            state,
            should_quit: false,
            tx,
            rx,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let mut tick = tokio::time::interval(Duration::from_millis(200));
        self.refresh_section();

        while !self.should_quit {
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            tokio::select! {
                _ = tick.tick() => {
                    while event::poll(Duration::ZERO)? {
                        match event::read()? {
                            Event::Key(key) => self.handle_key(key),
                            Event::Resize(_, _) => {}
                            _ => {}
                        }
                    }
                    self.expire_toast();
                }
                Some(event) = self.rx.recv() => {
                    self.apply_event(event);
                    // Batch whatever else already arrived before redrawing.
                    while let Ok(event) = self.rx.try_recv() {
                        self.apply_event(event);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let action = ui::keymap::map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }
        if self.handle_modal_key(action) {
            return;
        }
        self.handle_browse_key(action);
    }

    /// Forms, confirmation popups and the trade detail see keys before any
    /// global shortcut. Returns true when the key was consumed.
    fn handle_modal_key(&mut self, action: AppAction) -> bool {
        match self.state.section {
            Section::Accounts => self.handle_accounts_modal(action),
            Section::Servers => self.handle_servers_modal(action),
            Section::Trades => self.handle_trades_modal(action),
            _ => false,
        }
    }

    fn handle_accounts_modal(&mut self, action: AppAction) -> bool {
        match &mut self.state.accounts.mode {
            AccountsMode::List => false,
            AccountsMode::Create(form) => {
                match action {
                    AppAction::Cancel => self.state.accounts.mode = AccountsMode::List,
                    AppAction::NextField => form.next_field(),
                    AppAction::Backspace => form.backspace(),
                    AppAction::Left => form.cycle_left(&self.state.servers.items),
                    AppAction::Right => form.cycle_right(&self.state.servers.items),
                    AppAction::Input(ch) => form.input(ch, &self.state.servers.items),
                    AppAction::Submit => match form.build(&self.state.servers.items) {
                        Ok(payload) => {
                            self.state.accounts.mode = AccountsMode::List;
                            self.spawn_account_create(payload);
                        }
                        Err(message) => form.error = Some(message),
                    },
                    _ => {}
                }
                true
            }
            AccountsMode::Edit(form) => {
                match action {
                    AppAction::Cancel => self.state.accounts.mode = AccountsMode::List,
                    AppAction::NextField => form.next_field(),
                    AppAction::Backspace => form.backspace(),
                    AppAction::Left | AppAction::Right => form.toggle(),
                    AppAction::Input(ch) => form.input(ch),
                    AppAction::Submit => match form.build() {
                        Ok(update) => {
                            let id = form.id;
                            self.state.accounts.mode = AccountsMode::List;
                            self.spawn_account_update(id, update);
                        }
                        Err(message) => form.error = Some(message),
                    },
                    _ => {}
                }
                true
            }
            AccountsMode::ConfirmDelete(pending) => {
                match action {
                    AppAction::Submit | AppAction::Input('y' | 'Y') => {
                        let id = pending.id;
                        self.state.accounts.mode = AccountsMode::List;
                        self.spawn_account_delete(id);
                    }
                    AppAction::Cancel | AppAction::Input('n' | 'N') => {
                        self.state.accounts.mode = AccountsMode::List;
                    }
                    _ => {}
                }
                true
            }
        }
    }

    fn handle_servers_modal(&mut self, action: AppAction) -> bool {
        match &mut self.state.servers.mode {
            ServersMode::List => false,
            ServersMode::Create(form) => {
                match action {
                    AppAction::Cancel => self.state.servers.mode = ServersMode::List,
                    AppAction::NextField => form.next_field(),
                    AppAction::Backspace => form.backspace(),
                    AppAction::Input(ch) => form.input(ch),
                    AppAction::Submit => match form.build() {
                        Ok(payload) => {
                            self.state.servers.mode = ServersMode::List;
                            self.spawn_server_create(payload);
                        }
                        Err(message) => form.error = Some(message),
                    },
                    _ => {}
                }
                true
            }
            ServersMode::ConfirmDelete(pending) => {
                match action {
                    AppAction::Submit | AppAction::Input('y' | 'Y') => {
                        let id = pending.id;
                        self.state.servers.mode = ServersMode::List;
                        self.spawn_server_delete(id);
                    }
                    AppAction::Cancel | AppAction::Input('n' | 'N') => {
                        self.state.servers.mode = ServersMode::List;
                    }
                    _ => {}
                }
                true
            }
        }
    }

    fn handle_trades_modal(&mut self, action: AppAction) -> bool {
        if self.state.trades.mode != TradesMode::Detail {
            return false;
        }
        match action {
            AppAction::Cancel | AppAction::Input('b' | 'B') => {
                self.state.trades.mode = TradesMode::List;
            }
            AppAction::Input('q' | 'Q') => self.should_quit = true,
            AppAction::Up | AppAction::Input('k' | 'K') => self.state.trades.select_prev(),
            AppAction::Down | AppAction::Input('j' | 'J') => self.state.trades.select_next(),
            _ => {}
        }
        true
    }

    fn handle_browse_key(&mut self, action: AppAction) {
        match action {
            AppAction::Input(ch) => self.handle_shortcut(ch.to_ascii_lowercase()),
            AppAction::Up => match self.state.section {
                Section::Accounts => self.state.accounts.select_prev(),
                Section::Trades => self.state.trades.select_prev(),
                Section::Servers => self.state.servers.select_prev(),
                _ => {}
            },
            AppAction::Down => match self.state.section {
                Section::Accounts => self.state.accounts.select_next(),
                Section::Trades => self.state.trades.select_next(),
                Section::Servers => self.state.servers.select_next(),
                _ => {}
            },
            AppAction::Submit => match self.state.section {
                Section::Accounts => self.open_account_edit(),
                Section::Trades => self.open_trade_detail(),
                _ => {}
            },
            AppAction::Cancel => self.state.toast = None,
            _ => {}
        }
    }

    fn handle_shortcut(&mut self, ch: char) {
        match ch {
            'q' => self.should_quit = true,
            'd' => self.switch_section(Section::Dashboard),
            'a' => self.switch_section(Section::Accounts),
            't' => self.switch_section(Section::Trades),
            'c' => self.switch_section(Section::Calendar),
            's' => self.switch_section(Section::Servers),
            'r' => self.refresh_section(),
            'u' => self.start_sync(),
            '[' => self.cycle_scope(false),
            ']' => self.cycle_scope(true),
            _ => self.handle_section_shortcut(ch),
        }
    }

    fn handle_section_shortcut(&mut self, ch: char) {
        match self.state.section {
            Section::Dashboard => {}
            Section::Accounts => match ch {
                'j' => self.state.accounts.select_next(),
                'k' => self.state.accounts.select_prev(),
                'f' => {
                    self.state.accounts.filter = self.state.accounts.filter.next();
                    self.state.accounts.selected = 0;
                }
                'n' => self.open_account_create(),
                'e' => self.open_account_edit(),
                'x' => self.request_account_delete(),
                _ => {}
            },
            Section::Trades => match ch {
                'j' => self.state.trades.select_next(),
                'k' => self.state.trades.select_prev(),
                'p' => self.shift_trade_date(false),
                'n' => self.shift_trade_date(true),
                'g' => self.goto_today(),
                _ => {}
            },
            Section::Calendar => match ch {
                'p' => self.shift_month(false),
                'n' => self.shift_month(true),
                _ => {}
            },
            Section::Servers => match ch {
                'j' => self.state.servers.select_next(),
                'k' => self.state.servers.select_prev(),
                'n' => self.state.servers.mode = ServersMode::Create(ServerForm::default()),
                'x' => self.request_server_delete(),
                _ => {}
            },
        }
    }

    fn switch_section(&mut self, section: Section) {
        self.state.section = section;
        self.refresh_section();
    }

    /// Every section re-fetches its data when entered or refreshed; stale
    /// copies are never shown as current.
    fn refresh_section(&mut self) {
        match self.state.section {
            Section::Dashboard => {
                self.spawn_dashboard_fetch();
                // The scope selector needs the account list.
                self.spawn_accounts_fetch();
            }
            Section::Accounts => self.spawn_accounts_fetch(),
            Section::Trades => self.spawn_trades_fetch(),
            Section::Calendar => self.spawn_calendar_fetch(),
            Section::Servers => self.spawn_servers_fetch(),
        }
    }

    fn open_account_create(&mut self) {
        self.state.accounts.mode = AccountsMode::Create(AccountForm::default());
        // The server picker needs a fresh list.
        self.spawn_servers_fetch();
    }

    fn open_account_edit(&mut self) {
        let Some(form) = self
            .state
            .accounts
            .selected_account()
            .map(EditAccountForm::for_account)
        else {
            return;
        };
        self.state.accounts.mode = AccountsMode::Edit(form);
    }

    fn request_account_delete(&mut self) {
        let Some(pending) = self.state.accounts.selected_account().map(|account| {
            PendingDelete {
                id: account.id,
                alias: account.alias.clone(),
            }
        }) else {
            return;
        };
        self.state.accounts.mode = AccountsMode::ConfirmDelete(pending);
    }

    fn request_server_delete(&mut self) {
        let Some(pending) = self.state.servers.selected_server().map(|server| {
            PendingDelete {
                id: server.id,
                alias: server.alias.clone(),
            }
        }) else {
            return;
        };
        self.state.servers.mode = ServersMode::ConfirmDelete(pending);
    }

    fn open_trade_detail(&mut self) {
        if !self.state.trades.items.is_empty() {
            self.state.trades.mode = TradesMode::Detail;
        }
    }

    fn shift_trade_date(&mut self, forward: bool) {
        let shifted = if forward {
            self.state.trades.date.checked_add_days(Days::new(1))
        } else {
            self.state.trades.date.checked_sub_days(Days::new(1))
        };
        if let Some(date) = shifted {
            self.state.trades.date = date;
            self.spawn_trades_fetch();
        }
    }

    fn goto_today(&mut self) {
        self.state.trades.date = Local::now().date_naive();
        self.spawn_trades_fetch();
    }

    fn shift_month(&mut self, forward: bool) {
        self.state.calendar.anchor = if forward {
            calendar::next_month(self.state.calendar.anchor)
        } else {
            calendar::prev_month(self.state.calendar.anchor)
        };
        self.spawn_calendar_fetch();
    }

    /// Cycles All -> each account -> All, refetching the visible view.
    fn cycle_scope(&mut self, forward: bool) {
        if !matches!(self.state.section, Section::Dashboard | Section::Calendar) {
            return;
        }
        let ids: Vec<i64> = self.state.accounts.items.iter().map(|a| a.id).collect();
        if ids.is_empty() {
            return;
        }

        let len = ids.len() + 1;
        let current = match self.state.scope {
            AccountScope::All => 0,
            AccountScope::One(id) => {
                ids.iter().position(|x| *x == id).map_or(0, |idx| idx + 1)
            }
        };
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        let scope = if next == 0 {
            AccountScope::All
        } else {
            AccountScope::One(ids[next - 1])
        };

        if scope != self.state.scope {
            self.state.scope = scope;
            match self.state.section {
                Section::Dashboard => self.spawn_dashboard_fetch(),
                Section::Calendar => self.spawn_calendar_fetch(),
                _ => {}
            }
        }
    }

    fn start_sync(&mut self) {
        if self.state.sync_in_flight {
            return;
        }
        self.state.sync_in_flight = true;
        self.toast("Syncing accounts...", ToastLevel::Info);

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.sync_all().await;
            let _ = tx.send(AppEvent::Sync { result });
        });
    }

    fn spawn_dashboard_fetch(&mut self) {
        self.state.dashboard.loading = true;
        self.state.dashboard.generation += 1;
        let generation = self.state.dashboard.generation;
        let account_id = self.state.scope.account_id();
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.dashboard_stats(account_id).await;
            let _ = tx.send(AppEvent::Dashboard { generation, result });
        });
    }

    fn spawn_accounts_fetch(&mut self) {
        self.state.accounts.loading = true;
        self.state.accounts.generation += 1;
        let generation = self.state.accounts.generation;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.accounts().await;
            let _ = tx.send(AppEvent::Accounts { generation, result });
        });
    }

    fn spawn_trades_fetch(&mut self) {
        self.state.trades.loading = true;
        self.state.trades.generation += 1;
        let generation = self.state.trades.generation;
        let date = self.state.trades.date;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.trades_on(date).await;
            let _ = tx.send(AppEvent::Trades { generation, result });
        });
    }

    fn spawn_calendar_fetch(&mut self) {
        self.state.calendar.loading = true;
        self.state.calendar.generation += 1;
        let generation = self.state.calendar.generation;
        let anchor = self.state.calendar.anchor;
        let account_id = self.state.scope.account_id();
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client
                .calendar_stats(anchor.year(), anchor.month(), account_id)
                .await;
            let _ = tx.send(AppEvent::Calendar { generation, result });
        });
    }

    fn spawn_servers_fetch(&mut self) {
        self.state.servers.loading = true;
        self.state.servers.generation += 1;
        let generation = self.state.servers.generation;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.servers().await;
            let _ = tx.send(AppEvent::Servers { generation, result });
        });
    }

    fn spawn_account_create(&self, payload: AccountCreate) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.create_account(&payload).await;
            let _ = tx.send(AppEvent::Write {
                kind: WriteKind::AccountCreate,
                result,
            });
        });
    }

    fn spawn_account_update(&self, id: i64, update: AccountUpdate) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.update_account(id, &update).await;
            let _ = tx.send(AppEvent::Write {
                kind: WriteKind::AccountUpdate,
                result,
            });
        });
    }

    fn spawn_account_delete(&self, id: i64) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.delete_account(id).await;
            let _ = tx.send(AppEvent::Write {
                kind: WriteKind::AccountDelete,
                result,
            });
        });
    }

    fn spawn_server_create(&self, payload: ServerCreate) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.create_server(&payload).await;
            let _ = tx.send(AppEvent::Write {
                kind: WriteKind::ServerCreate,
                result,
            });
        });
    }

    fn spawn_server_delete(&self, id: i64) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.delete_server(id).await;
            let _ = tx.send(AppEvent::Write {
                kind: WriteKind::ServerDelete,
                result,
            });
        });
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Dashboard { generation, result } => {
                if generation != self.state.dashboard.generation {
                    tracing::debug!(generation, "dropping stale dashboard response");
                    return;
                }
                self.state.dashboard.loading = false;
                match result {
                    Ok(stats) => {
                        self.state.dashboard.stats = Some(stats);
                        self.state.dashboard.error = None;
                        self.note_success();
                    }
                    Err(err) => {
                        self.state.dashboard.error = Some(request_error_message(&err));
                        self.note_failure(&err);
                    }
                }
            }
            AppEvent::Accounts { generation, result } => {
                if generation != self.state.accounts.generation {
                    tracing::debug!(generation, "dropping stale accounts response");
                    return;
                }
                self.state.accounts.loading = false;
                match result {
                    Ok(items) => {
                        self.state.accounts.items = items;
                        self.state.accounts.error = None;
                        self.state.accounts.clamp_selection();
                        self.ensure_scope_valid();
                        self.note_success();
                    }
                    Err(err) => {
                        self.state.accounts.error = Some(request_error_message(&err));
                        self.note_failure(&err);
                    }
                }
            }
            AppEvent::Trades { generation, result } => {
                if generation != self.state.trades.generation {
                    tracing::debug!(generation, "dropping stale trades response");
                    return;
                }
                self.state.trades.loading = false;
                match result {
                    Ok(items) => {
                        self.state.trades.items = items;
                        self.state.trades.error = None;
                        self.state.trades.clamp_selection();
                        if self.state.trades.items.is_empty() {
                            self.state.trades.mode = TradesMode::List;
                        }
                        self.note_success();
                    }
                    Err(err) => {
                        self.state.trades.error = Some(request_error_message(&err));
                        self.note_failure(&err);
                    }
                }
            }
            AppEvent::Calendar { generation, result } => {
                if generation != self.state.calendar.generation {
                    tracing::debug!(generation, "dropping stale calendar response");
                    return;
                }
                self.state.calendar.loading = false;
                match result {
                    Ok(data) => {
                        self.state.calendar.data = Some(data);
                        self.state.calendar.error = None;
                        self.note_success();
                    }
                    Err(err) => {
                        self.state.calendar.error = Some(request_error_message(&err));
                        self.note_failure(&err);
                    }
                }
            }
            AppEvent::Servers { generation, result } => {
                if generation != self.state.servers.generation {
                    tracing::debug!(generation, "dropping stale servers response");
                    return;
                }
                self.state.servers.loading = false;
                match result {
                    Ok(items) => {
                        self.state.servers.items = items;
                        self.state.servers.error = None;
                        self.state.servers.clamp_selection();
                        if let AccountsMode::Create(form) = &mut self.state.accounts.mode {
                            if form.server_idx >= self.state.servers.items.len() {
                                form.server_idx = 0;
                            }
                        }
                        self.note_success();
                    }
                    Err(err) => {
                        self.state.servers.error = Some(request_error_message(&err));
                        self.note_failure(&err);
                    }
                }
            }
            AppEvent::Write { kind, result } => match result {
                Ok(()) => {
                    self.note_success();
                    self.toast(kind.success_message(), ToastLevel::Success);
                    match kind.owner() {
                        Section::Accounts => self.spawn_accounts_fetch(),
                        Section::Servers => self.spawn_servers_fetch(),
                        _ => {}
                    }
                }
                Err(err) => {
                    self.note_failure(&err);
                    self.toast(request_error_message(&err), ToastLevel::Error);
                }
            },
            AppEvent::Sync { result } => {
                self.state.sync_in_flight = false;
                match result {
                    Ok(report) => {
                        self.note_success();
                        self.toast(
                            format!("Sync complete: {} new trades", report.new_trades_added),
                            ToastLevel::Success,
                        );
                        self.refresh_section();
                        // Balances moved; the scope selector list did too.
                        if self.state.section != Section::Accounts {
                            self.spawn_accounts_fetch();
                        }
                    }
                    Err(err) => {
                        self.note_failure(&err);
                        self.toast(request_error_message(&err), ToastLevel::Error);
                    }
                }
            }
        }
    }

    /// Drops the scope back to All when the scoped account no longer
    /// exists, refetching whatever view it was filtering.
    fn ensure_scope_valid(&mut self) {
        let AccountScope::One(id) = self.state.scope else {
            return;
        };
        if self.state.accounts.items.iter().any(|a| a.id == id) {
            return;
        }
        self.state.scope = AccountScope::All;
        match self.state.section {
            Section::Dashboard => self.spawn_dashboard_fetch(),
            Section::Calendar => self.spawn_calendar_fetch(),
            _ => {}
        }
    }

    fn note_success(&mut self) {
        self.state.connected = true;
        self.state.last_refresh = Some(Local::now());
    }

    fn note_failure(&mut self, err: &ClientError) {
        self.state.connected = false;
        tracing::warn!(error = %err, "backend request failed");
    }

    fn toast(&mut self, message: impl Into<String>, level: ToastLevel) {
        self.state.toast = Some(ToastState {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn expire_toast(&mut self) {
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= Instant::now())
        {
            self.state.toast = None;
        }
    }
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub stats: Option<DashboardStats>,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

#[derive(Debug, Default)]
pub enum AccountsMode {
    #[default]
    List,
    Create(AccountForm),
    Edit(EditAccountForm),
    ConfirmDelete(PendingDelete),
}

#[derive(Debug, Default)]
pub struct AccountsState {
    pub items: Vec<Account>,
    pub filter: StatusFilter,
    pub selected: usize,
    pub mode: AccountsMode,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

impl AccountsState {
    /// Accounts surviving the status filter, in backend order.
    pub fn visible(&self) -> Vec<&Account> {
        self.items
            .iter()
            .filter(|account| self.filter.matches(account.active))
            .collect()
    }

    pub fn selected_account(&self) -> Option<&Account> {
        self.visible().get(self.selected).copied()
    }

    fn select_next(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = if len == 0 {
            0
        } else {
            self.selected.min(len - 1)
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TradesMode {
    #[default]
    List,
    Detail,
}

#[derive(Debug)]
pub struct TradesState {
    pub date: NaiveDate,
    pub items: Vec<Trade>,
    pub selected: usize,
    pub mode: TradesMode,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

impl Default for TradesState {
    fn default() -> Self {
        Self {
            date: Local::now().date_naive(),
            items: Vec::new(),
            selected: 0,
            mode: TradesMode::List,
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

impl TradesState {
    pub fn selected_trade(&self) -> Option<&Trade> {
        self.items.get(self.selected)
    }

    fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1).min(self.items.len() - 1);
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        self.selected = if self.items.is_empty() {
            0
        } else {
            self.selected.min(self.items.len() - 1)
        };
    }
}

#[derive(Debug)]
pub struct CalendarState {
    pub anchor: NaiveDate,
    pub data: Option<MonthlyStats>,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

impl Default for CalendarState {
    fn default() -> Self {
        Self {
            anchor: calendar::month_anchor(Local::now().date_naive()),
            data: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

#[derive(Debug, Default)]
pub enum ServersMode {
    #[default]
    List,
    Create(ServerForm),
    ConfirmDelete(PendingDelete),
}

#[derive(Debug, Default)]
pub struct ServersState {
    pub items: Vec<Server>,
    pub selected: usize,
    pub mode: ServersMode,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

impl ServersState {
    pub fn selected_server(&self) -> Option<&Server> {
        self.items.get(self.selected)
    }

    fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1).min(self.items.len() - 1);
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        self.selected = if self.items.is_empty() {
            0
        } else {
            self.selected.min(self.items.len() - 1)
        };
    }
}

#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub id: i64,
    pub alias: String,
}

fn request_error_message(err: &ClientError) -> String {
    match err {
        ClientError::NotFound => "Not found. The record may already be gone.".to_string(),
        ClientError::Conflict(message) => format!("Conflict: {message}"),
        ClientError::Validation(message) => format!("Validation failed: {message}"),
        ClientError::Server(message) => format!("Server error: {message}"),
        ClientError::Transport(err) => format!("Backend unreachable: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use api_types::AccountType;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::{delete, get},
    };
    use crossterm::event::{KeyCode, KeyModifiers};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    #[derive(Default)]
    struct Stub {
        account_lists: AtomicUsize,
        account_deletes: AtomicUsize,
        server_lists: AtomicUsize,
    }

    async fn list_accounts(State(stub): State<Arc<Stub>>) -> Json<Value> {
        stub.account_lists.fetch_add(1, Ordering::SeqCst);
        Json(json!([{
            "id": 7,
            "prop_firm": "FTMO",
            "alias": "FTMO 50k",
            "login_id": 10012,
            "account_type": "Funded",
            "active": true,
            "server": "FTMO-Server",
            "initial_balance": 50000.0,
            "balance": 51200.0,
            "risk_per_trade": 1.0,
            "target_percent": 0.0,
            "investment": 350.0
        }]))
    }

    async fn delete_account(State(stub): State<Arc<Stub>>, Path(_id): Path<i64>) -> StatusCode {
        stub.account_deletes.fetch_add(1, Ordering::SeqCst);
        StatusCode::NO_CONTENT
    }

    async fn list_servers(State(stub): State<Arc<Stub>>) -> Json<Value> {
        stub.server_lists.fetch_add(1, Ordering::SeqCst);
        Json(json!([{"id": 1, "name": "FTMO-Server", "alias": "FTMO"}]))
    }

    async fn spawn_stub() -> (SocketAddr, Arc<Stub>) {
        let stub = Arc::new(Stub::default());
        let router = Router::new()
            .route("/accounts/", get(list_accounts))
            .route("/accounts/{id}", delete(delete_account))
            .route("/servers/", get(list_servers))
            .with_state(stub.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (addr, stub)
    }

    fn test_app(base_url: &str) -> App {
        let config = AppConfig {
            base_url: base_url.to_string(),
            log_file: None,
            log_level: "info".to_string(),
        };
        App::new(config).unwrap()
    }

    fn account(id: i64, alias: &str, active: bool) -> Account {
        Account {
            id,
            prop_firm: "FTMO".to_string(),
            alias: alias.to_string(),
            login_id: 10012,
            account_type: AccountType::Funded,
            active,
            server: "FTMO-Server".to_string(),
            initial_balance: 50_000.0,
            balance: 51_200.0,
            risk_per_trade: 1.0,
            target_percent: 0.0,
            investment: 350.0,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn cancelled_delete_never_calls_the_backend() {
        let (addr, stub) = spawn_stub().await;
        let mut app = test_app(&format!("http://{addr}"));
        app.state.section = Section::Accounts;
        app.state.accounts.items = vec![account(7, "FTMO 50k", true)];

        app.handle_key(key(KeyCode::Char('x')));
        assert!(matches!(
            app.state.accounts.mode,
            AccountsMode::ConfirmDelete(_)
        ));

        app.handle_key(key(KeyCode::Esc));
        assert!(matches!(app.state.accounts.mode, AccountsMode::List));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stub.account_deletes.load(Ordering::SeqCst), 0);
        assert_eq!(app.state.accounts.items.len(), 1);
    }

    #[tokio::test]
    async fn confirmed_delete_fires_once_then_refreshes() {
        let (addr, stub) = spawn_stub().await;
        let mut app = test_app(&format!("http://{addr}"));
        app.state.section = Section::Accounts;
        app.state.accounts.items = vec![account(7, "FTMO 50k", true)];

        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('y')));

        // Delete completion first, then the list refetch it triggers.
        let event = app.rx.recv().await.unwrap();
        app.apply_event(event);
        let event = app.rx.recv().await.unwrap();
        app.apply_event(event);

        assert_eq!(stub.account_deletes.load(Ordering::SeqCst), 1);
        assert_eq!(stub.account_lists.load(Ordering::SeqCst), 1);
        assert!(matches!(app.state.accounts.mode, AccountsMode::List));
        assert_eq!(app.state.accounts.items.len(), 1);
        let toast = app.state.toast.as_ref().unwrap();
        assert_eq!(toast.level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn stale_fetch_results_are_dropped() {
        let mut app = test_app("http://127.0.0.1:9");
        app.state.section = Section::Accounts;
        app.state.accounts.generation = 2;
        app.state.accounts.loading = true;

        app.apply_event(AppEvent::Accounts {
            generation: 1,
            result: Ok(vec![account(1, "stale", true)]),
        });
        assert!(app.state.accounts.items.is_empty());
        assert!(app.state.accounts.loading);

        app.apply_event(AppEvent::Accounts {
            generation: 2,
            result: Ok(vec![account(2, "fresh", true)]),
        });
        assert_eq!(app.state.accounts.items.len(), 1);
        assert_eq!(app.state.accounts.items[0].alias, "fresh");
        assert!(!app.state.accounts.loading);
    }

    #[tokio::test]
    async fn scope_resets_when_the_account_disappears() {
        let mut app = test_app("http://127.0.0.1:9");
        app.state.section = Section::Accounts;
        app.state.scope = AccountScope::One(99);

        app.apply_event(AppEvent::Accounts {
            generation: 0,
            result: Ok(vec![account(7, "FTMO 50k", true)]),
        });
        assert_eq!(app.state.scope, AccountScope::All);
    }

    #[tokio::test]
    async fn write_failures_surface_an_alert() {
        let mut app = test_app("http://127.0.0.1:9");
        app.apply_event(AppEvent::Write {
            kind: WriteKind::AccountCreate,
            result: Err(ClientError::Validation("alias already in use".to_string())),
        });

        let toast = app.state.toast.as_ref().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert!(toast.message.contains("alias already in use"));
        assert!(!app.state.connected);
    }

    #[tokio::test]
    async fn sync_completion_reports_new_trades() {
        let (addr, _stub) = spawn_stub().await;
        let mut app = test_app(&format!("http://{addr}"));
        app.state.section = Section::Accounts;
        app.state.sync_in_flight = true;

        app.apply_event(AppEvent::Sync {
            result: Ok(SyncReport {
                new_trades_added: 12,
            }),
        });

        assert!(!app.state.sync_in_flight);
        let toast = app.state.toast.as_ref().unwrap();
        assert_eq!(toast.level, ToastLevel::Success);
        assert!(toast.message.contains("12"));
    }

    #[tokio::test]
    async fn entering_create_mode_loads_the_server_picker() {
        let (addr, stub) = spawn_stub().await;
        let mut app = test_app(&format!("http://{addr}"));
        app.state.section = Section::Accounts;

        app.handle_key(key(KeyCode::Char('n')));
        assert!(matches!(app.state.accounts.mode, AccountsMode::Create(_)));

        let event = app.rx.recv().await.unwrap();
        app.apply_event(event);
        assert_eq!(stub.server_lists.load(Ordering::SeqCst), 1);
        assert_eq!(app.state.servers.items.len(), 1);
    }

    #[tokio::test]
    async fn form_keys_are_captured_before_shortcuts() {
        let (addr, _stub) = spawn_stub().await;
        let mut app = test_app(&format!("http://{addr}"));
        app.state.section = Section::Accounts;

        app.handle_key(key(KeyCode::Char('n')));
        app.handle_key(key(KeyCode::Char('1')));
        app.handle_key(key(KeyCode::Char('0')));
        let AccountsMode::Create(form) = &app.state.accounts.mode else {
            panic!("expected create mode");
        };
        assert_eq!(form.login_id, "10");

        // 'q' types into the focused field instead of quitting.
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
    }
}
