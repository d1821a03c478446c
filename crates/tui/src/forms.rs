//! Typed drafts behind the create/edit screens. Buffers hold raw keyboard
//! input; `build` parses and range-checks everything locally and nothing is
//! POSTed until it succeeds.

use api_types::{
    AccountType,
    account::{Account, AccountCreate, AccountUpdate},
    server::{Server, ServerCreate},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    LoginId,
    Password,
    Server,
    Alias,
    PropFirm,
    AccountType,
    InitialBalance,
    RiskPerTrade,
    TargetPercent,
    Investment,
    TrailingDrawdown,
    DailyDrawdownLimit,
    MaxDrawdownLimit,
    ConsistencyRule,
}

impl AccountField {
    pub const ORDER: [Self; 14] = [
        Self::LoginId,
        Self::Password,
        Self::Server,
        Self::Alias,
        Self::PropFirm,
        Self::AccountType,
        Self::InitialBalance,
        Self::RiskPerTrade,
        Self::TargetPercent,
        Self::Investment,
        Self::TrailingDrawdown,
        Self::DailyDrawdownLimit,
        Self::MaxDrawdownLimit,
        Self::ConsistencyRule,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::LoginId => "Login id",
            Self::Password => "Password",
            Self::Server => "Server",
            Self::Alias => "Alias",
            Self::PropFirm => "Prop firm",
            Self::AccountType => "Account type",
            Self::InitialBalance => "Initial balance",
            Self::RiskPerTrade => "Risk per trade %",
            Self::TargetPercent => "Profit target %",
            Self::Investment => "Investment",
            Self::TrailingDrawdown => "Trailing drawdown",
            Self::DailyDrawdownLimit => "Daily drawdown %",
            Self::MaxDrawdownLimit => "Max drawdown %",
            Self::ConsistencyRule => "Consistency rule %",
        }
    }

    /// Pickers cycle with Left/Right (or space) instead of taking text.
    pub fn is_picker(self) -> bool {
        matches!(
            self,
            Self::Server | Self::AccountType | Self::TrailingDrawdown
        )
    }

    fn next(self) -> Self {
        let idx = Self::ORDER
            .iter()
            .position(|f| *f == self)
            .unwrap_or_default();
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }
}

/// Draft for a new account. Numeric buffers stay strings while typing;
/// `build` turns them into the typed payload.
#[derive(Debug, Clone)]
pub struct AccountForm {
    pub focus: AccountField,
    pub login_id: String,
    pub password: String,
    pub server_idx: usize,
    pub alias: String,
    pub prop_firm: String,
    pub account_type: AccountType,
    pub initial_balance: String,
    pub risk_per_trade: String,
    pub target_percent: String,
    pub investment: String,
    pub trailing_drawdown: bool,
    pub daily_drawdown_limit: String,
    pub max_drawdown_limit: String,
    pub consistency_rule: String,
    pub error: Option<String>,
}

impl Default for AccountForm {
    fn default() -> Self {
        Self {
            focus: AccountField::LoginId,
            login_id: String::new(),
            password: String::new(),
            server_idx: 0,
            alias: String::new(),
            prop_firm: String::new(),
            account_type: AccountType::Phase1,
            initial_balance: String::new(),
            risk_per_trade: "1.0".to_string(),
            target_percent: "8.0".to_string(),
            investment: String::new(),
            trailing_drawdown: false,
            daily_drawdown_limit: String::new(),
            max_drawdown_limit: String::new(),
            consistency_rule: String::new(),
            error: None,
        }
    }
}

impl AccountForm {
    /// Advances focus, skipping the profit target outside evaluation
    /// phases (the backend stores it as 0 there).
    pub fn next_field(&mut self) {
        let mut field = self.focus.next();
        if field == AccountField::TargetPercent && !self.account_type.has_profit_target() {
            field = field.next();
        }
        self.focus = field;
    }

    pub fn input(&mut self, ch: char, servers: &[Server]) {
        match self.focus {
            AccountField::LoginId => {
                if ch.is_ascii_digit() {
                    self.login_id.push(ch);
                }
            }
            AccountField::Password => self.password.push(ch),
            AccountField::Alias => self.alias.push(ch),
            AccountField::PropFirm => self.prop_firm.push(ch),
            AccountField::Server | AccountField::AccountType => {
                if ch == ' ' {
                    self.cycle_right(servers);
                }
            }
            AccountField::TrailingDrawdown => {
                if ch == ' ' {
                    self.trailing_drawdown = !self.trailing_drawdown;
                }
            }
            _ => {
                if let Some(buffer) = self.numeric_buffer_mut() {
                    if ch.is_ascii_digit() || ch == '.' {
                        buffer.push(ch);
                    }
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            AccountField::LoginId => {
                self.login_id.pop();
            }
            AccountField::Password => {
                self.password.pop();
            }
            AccountField::Alias => {
                self.alias.pop();
            }
            AccountField::PropFirm => {
                self.prop_firm.pop();
            }
            AccountField::Server | AccountField::AccountType | AccountField::TrailingDrawdown => {}
            _ => {
                if let Some(buffer) = self.numeric_buffer_mut() {
                    buffer.pop();
                }
            }
        }
    }

    pub fn cycle_left(&mut self, servers: &[Server]) {
        match self.focus {
            AccountField::Server => {
                if !servers.is_empty() {
                    self.server_idx = (self.server_idx + servers.len() - 1) % servers.len();
                    self.autofill_prop_firm(servers);
                }
            }
            AccountField::AccountType => {
                let idx = type_index(self.account_type);
                let len = AccountType::ALL.len();
                self.set_account_type(AccountType::ALL[(idx + len - 1) % len]);
            }
            AccountField::TrailingDrawdown => self.trailing_drawdown = !self.trailing_drawdown,
            _ => {}
        }
    }

    pub fn cycle_right(&mut self, servers: &[Server]) {
        match self.focus {
            AccountField::Server => {
                if !servers.is_empty() {
                    self.server_idx = (self.server_idx + 1) % servers.len();
                    self.autofill_prop_firm(servers);
                }
            }
            AccountField::AccountType => {
                let idx = type_index(self.account_type);
                self.set_account_type(AccountType::ALL[(idx + 1) % AccountType::ALL.len()]);
            }
            AccountField::TrailingDrawdown => self.trailing_drawdown = !self.trailing_drawdown,
            _ => {}
        }
    }

    pub fn selected_server<'a>(&self, servers: &'a [Server]) -> Option<&'a Server> {
        servers.get(self.server_idx)
    }

    fn autofill_prop_firm(&mut self, servers: &[Server]) {
        if let Some(server) = servers.get(self.server_idx) {
            self.prop_firm = server.alias.clone();
        }
    }

    fn set_account_type(&mut self, account_type: AccountType) {
        self.account_type = account_type;
        if !account_type.has_profit_target() {
            self.target_percent = "0".to_string();
        }
    }

    fn numeric_buffer_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            AccountField::InitialBalance => Some(&mut self.initial_balance),
            AccountField::RiskPerTrade => Some(&mut self.risk_per_trade),
            AccountField::TargetPercent => Some(&mut self.target_percent),
            AccountField::Investment => Some(&mut self.investment),
            AccountField::DailyDrawdownLimit => Some(&mut self.daily_drawdown_limit),
            AccountField::MaxDrawdownLimit => Some(&mut self.max_drawdown_limit),
            AccountField::ConsistencyRule => Some(&mut self.consistency_rule),
            _ => None,
        }
    }

    pub fn build(&self, servers: &[Server]) -> Result<AccountCreate, String> {
        let server = self
            .selected_server(servers)
            .ok_or_else(|| "Select a server first.".to_string())?;

        let login_id = self
            .login_id
            .trim()
            .parse::<i64>()
            .map_err(|_| "Login id must be a positive whole number.".to_string())?;
        if login_id <= 0 {
            return Err("Login id must be a positive whole number.".to_string());
        }

        let password = self.password.trim();
        if password.is_empty() {
            return Err("Password is required.".to_string());
        }
        let alias = self.alias.trim();
        if alias.is_empty() {
            return Err("Alias is required.".to_string());
        }
        let prop_firm = match self.prop_firm.trim() {
            "" => server.alias.clone(),
            firm => firm.to_string(),
        };

        let initial_balance = parse_amount("Initial balance", &self.initial_balance)?;
        let risk_per_trade = parse_percent("Risk per trade", &self.risk_per_trade)?;
        let target_percent = if self.account_type.has_profit_target() {
            parse_percent("Profit target", &self.target_percent)?
        } else {
            0.0
        };
        let investment = parse_amount_or_zero("Investment", &self.investment)?;
        // Blank rule fields submit as 0, the backend's "rule disabled".
        let daily_drawdown_limit =
            parse_percent_or_zero("Daily drawdown limit", &self.daily_drawdown_limit)?;
        let max_drawdown_limit =
            parse_percent_or_zero("Max drawdown limit", &self.max_drawdown_limit)?;
        let consistency_rule = parse_percent_or_zero("Consistency rule", &self.consistency_rule)?;

        Ok(AccountCreate {
            login_id,
            password: password.to_string(),
            server: server.name.clone(),
            alias: alias.to_string(),
            prop_firm,
            account_type: self.account_type,
            initial_balance,
            risk_per_trade,
            target_percent,
            investment,
            trailing_drawdown: self.trailing_drawdown,
            daily_drawdown_limit,
            max_drawdown_limit,
            consistency_rule,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Alias,
    Active,
}

/// Edit draft: the backend only accepts alias and active here.
#[derive(Debug, Clone)]
pub struct EditAccountForm {
    pub id: i64,
    pub focus: EditField,
    pub alias: String,
    pub active: bool,
    pub error: Option<String>,
}

impl EditAccountForm {
    pub fn for_account(account: &Account) -> Self {
        Self {
            id: account.id,
            focus: EditField::Alias,
            alias: account.alias.clone(),
            active: account.active,
            error: None,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            EditField::Alias => EditField::Active,
            EditField::Active => EditField::Alias,
        };
    }

    pub fn input(&mut self, ch: char) {
        match self.focus {
            EditField::Alias => self.alias.push(ch),
            EditField::Active => {
                if ch == ' ' {
                    self.active = !self.active;
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        if self.focus == EditField::Alias {
            self.alias.pop();
        }
    }

    pub fn toggle(&mut self) {
        if self.focus == EditField::Active {
            self.active = !self.active;
        }
    }

    pub fn build(&self) -> Result<AccountUpdate, String> {
        let alias = self.alias.trim();
        if alias.is_empty() {
            return Err("Alias is required.".to_string());
        }
        Ok(AccountUpdate {
            alias: alias.to_string(),
            active: self.active,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerField {
    Name,
    Alias,
}

#[derive(Debug, Clone, Default)]
pub struct ServerForm {
    pub name: String,
    pub alias: String,
    pub error: Option<String>,
    focus_alias: bool,
}

impl ServerForm {
    pub fn focus(&self) -> ServerField {
        if self.focus_alias {
            ServerField::Alias
        } else {
            ServerField::Name
        }
    }

    pub fn next_field(&mut self) {
        self.focus_alias = !self.focus_alias;
    }

    pub fn input(&mut self, ch: char) {
        if self.focus_alias {
            self.alias.push(ch);
        } else {
            self.name.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.focus_alias {
            self.alias.pop();
        } else {
            self.name.pop();
        }
    }

    pub fn build(&self) -> Result<ServerCreate, String> {
        let name = self.name.trim();
        let alias = self.alias.trim();
        if name.is_empty() || alias.is_empty() {
            return Err("Name and alias are required.".to_string());
        }
        Ok(ServerCreate {
            name: name.to_string(),
            alias: alias.to_string(),
        })
    }
}

fn type_index(account_type: AccountType) -> usize {
    AccountType::ALL
        .iter()
        .position(|t| *t == account_type)
        .unwrap_or_default()
}

fn parse_amount(label: &str, raw: &str) -> Result<f64, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("{label} must be a number."))?;
    if value < 0.0 {
        return Err(format!("{label} cannot be negative."));
    }
    Ok(value)
}

fn parse_amount_or_zero(label: &str, raw: &str) -> Result<f64, String> {
    if raw.trim().is_empty() {
        return Ok(0.0);
    }
    parse_amount(label, raw)
}

fn parse_percent(label: &str, raw: &str) -> Result<f64, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("{label} must be a number."))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{label} must be between 0 and 100."));
    }
    Ok(value)
}

fn parse_percent_or_zero(label: &str, raw: &str) -> Result<f64, String> {
    if raw.trim().is_empty() {
        return Ok(0.0);
    }
    parse_percent(label, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn servers() -> Vec<Server> {
        vec![
            Server {
                id: 1,
                name: "FTMO-Server".to_string(),
                alias: "FTMO".to_string(),
            },
            Server {
                id: 2,
                name: "MFF-Server2".to_string(),
                alias: "MyForexFunds".to_string(),
            },
        ]
    }

    fn filled_form() -> AccountForm {
        AccountForm {
            login_id: "10012".to_string(),
            password: "secret".to_string(),
            alias: "FTMO 50k".to_string(),
            initial_balance: "50000".to_string(),
            investment: "350".to_string(),
            daily_drawdown_limit: "5".to_string(),
            max_drawdown_limit: "10".to_string(),
            consistency_rule: "25".to_string(),
            ..AccountForm::default()
        }
    }

    #[test]
    fn build_produces_typed_payload() {
        let payload = filled_form().build(&servers()).unwrap();
        assert_eq!(payload.login_id, 10012);
        assert_eq!(payload.server, "FTMO-Server");
        assert_eq!(payload.prop_firm, "FTMO");
        assert_eq!(payload.account_type, AccountType::Phase1);
        assert_eq!(payload.initial_balance, 50_000.0);
        assert_eq!(payload.risk_per_trade, 1.0);
        assert_eq!(payload.target_percent, 8.0);
        assert_eq!(payload.daily_drawdown_limit, 5.0);
        assert_eq!(payload.consistency_rule, 25.0);
        assert!(!payload.trailing_drawdown);
    }

    #[test]
    fn non_numeric_login_is_rejected_locally() {
        let mut form = filled_form();
        form.login_id = "abc".to_string();
        let err = form.build(&servers()).unwrap_err();
        assert!(err.contains("Login id"));
    }

    #[test]
    fn out_of_range_percent_is_rejected() {
        let mut form = filled_form();
        form.risk_per_trade = "150".to_string();
        let err = form.build(&servers()).unwrap_err();
        assert!(err.contains("between 0 and 100"));
    }

    #[test]
    fn blank_rule_fields_submit_as_zero() {
        let mut form = filled_form();
        form.daily_drawdown_limit.clear();
        form.max_drawdown_limit.clear();
        form.consistency_rule.clear();
        let payload = form.build(&servers()).unwrap();
        assert_eq!(payload.daily_drawdown_limit, 0.0);
        assert_eq!(payload.max_drawdown_limit, 0.0);
        assert_eq!(payload.consistency_rule, 0.0);
    }

    #[test]
    fn funded_accounts_force_zero_target() {
        let mut form = filled_form();
        form.focus = AccountField::AccountType;
        // Phase 1 -> Phase 2 -> Funded
        form.cycle_right(&servers());
        form.cycle_right(&servers());
        assert_eq!(form.account_type, AccountType::Funded);
        assert_eq!(form.target_percent, "0");
        let payload = form.build(&servers()).unwrap();
        assert_eq!(payload.target_percent, 0.0);
    }

    #[test]
    fn focus_skips_target_outside_evaluation_phases() {
        let mut form = filled_form();
        form.focus = AccountField::AccountType;
        form.cycle_right(&servers());
        form.cycle_right(&servers());
        form.focus = AccountField::RiskPerTrade;
        form.next_field();
        assert_eq!(form.focus, AccountField::Investment);
    }

    #[test]
    fn cycling_server_autofills_prop_firm() {
        let mut form = filled_form();
        form.focus = AccountField::Server;
        form.cycle_right(&servers());
        assert_eq!(form.server_idx, 1);
        assert_eq!(form.prop_firm, "MyForexFunds");
        let payload = form.build(&servers()).unwrap();
        assert_eq!(payload.server, "MFF-Server2");
    }

    #[test]
    fn empty_prop_firm_falls_back_to_server_alias() {
        let mut form = filled_form();
        form.prop_firm.clear();
        let payload = form.build(&servers()).unwrap();
        assert_eq!(payload.prop_firm, "FTMO");
    }

    #[test]
    fn numeric_fields_ignore_letters() {
        let mut form = AccountForm::default();
        form.focus = AccountField::InitialBalance;
        for ch in "5a0.b5".chars() {
            form.input(ch, &servers());
        }
        assert_eq!(form.initial_balance, "50.5");

        form.focus = AccountField::LoginId;
        for ch in "1x2.3".chars() {
            form.input(ch, &servers());
        }
        assert_eq!(form.login_id, "123");
    }

    #[test]
    fn build_without_servers_fails() {
        let err = filled_form().build(&[]).unwrap_err();
        assert!(err.contains("server"));
    }

    #[test]
    fn server_form_requires_both_fields() {
        let form = ServerForm {
            name: "FTMO-Server".to_string(),
            ..ServerForm::default()
        };
        assert!(form.build().is_err());

        let form = ServerForm {
            name: "FTMO-Server".to_string(),
            alias: "FTMO".to_string(),
            ..ServerForm::default()
        };
        let payload = form.build().unwrap();
        assert_eq!(payload.name, "FTMO-Server");
        assert_eq!(payload.alias, "FTMO");
    }

    #[test]
    fn edit_form_requires_alias() {
        let account = Account {
            id: 7,
            prop_firm: "FTMO".to_string(),
            alias: "FTMO 50k".to_string(),
            login_id: 10012,
            account_type: AccountType::Funded,
            active: true,
            server: "FTMO-Server".to_string(),
            initial_balance: 50_000.0,
            balance: 51_200.0,
            risk_per_trade: 1.0,
            target_percent: 0.0,
            investment: 350.0,
        };
        let mut form = EditAccountForm::for_account(&account);
        assert_eq!(form.alias, "FTMO 50k");

        form.alias = "  ".to_string();
        assert!(form.build().is_err());

        form.alias = "FTMO Funded".to_string();
        form.toggle(); // focus on alias, no-op
        form.next_field();
        form.toggle();
        let update = form.build().unwrap();
        assert_eq!(update.alias, "FTMO Funded");
        assert!(!update.active);
    }
}
