/// Decimal precision for money amounts
pub const MONEY_DECIMAL_PRECISION: u32 = 2;

/// Penalty charged on an emergency withdrawal, as a fraction of the amount
pub const DEFAULT_WITHDRAWAL_PENALTY_RATE: &str = "0.015";

/// Calendar months a goal's next deposit is pushed back after a withdrawal
pub const DEFAULT_WITHDRAWAL_DELAY_MONTHS: u32 = 2;

/// Lifetime of an unconfirmed withdrawal plan, in seconds
pub const DEFAULT_PLAN_TTL_SECS: i64 = 900;

/// Description of the transaction that records an account's opening balance
pub const OPENING_BALANCE_DESCRIPTION: &str = "Opening balance";

/// Setting keys stored by the settings repository
pub mod setting_keys {
    pub const HOME_ACCOUNT_ID: &str = "home_account_id";
    pub const WITHDRAWAL_SOURCE_GOAL_ID: &str = "withdrawal_source_goal_id";
    pub const WITHDRAWAL_PENALTY_RATE: &str = "withdrawal_penalty_rate";
    pub const WITHDRAWAL_DELAY_MONTHS: &str = "withdrawal_delay_months";
    pub const PLAN_TTL_SECS: &str = "plan_ttl_secs";
}
