//! Simulation configuration.

use crate::error::{PulseError, PulseResult};
use chrono::{DateTime, Utc};

/// Environment variable holding the PostHog project API key.
pub const API_KEY_VAR: &str = "POSTHOG_API_KEY";

/// Environment variable overriding the ingestion host.
pub const HOST_VAR: &str = "POSTHOG_HOST";

/// EU cloud ingestion host.
pub const DEFAULT_HOST: &str = "https://eu.i.posthog.com";

/// Longest trailing window accepted, one leap year.
pub const MAX_WINDOW_HOURS: u32 = 24 * 366;

/// Oldest join date accepted for the returning pool, ten years back.
pub const MAX_JOIN_DAYS_AGO: u32 = 3660;

/// How many new users sign up during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewUserCount {
    Fixed(u32),
    /// Drawn uniformly from the inclusive range at the start of the run.
    Between(u32, u32),
}

/// Probabilities and thresholds that shape simulated behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorTable {
    /// Chance a new signup finishes onboarding
    pub onboarding_probability: f64,

    /// Chance an onboarded signup reaches first value (creates a dashboard)
    pub first_value_probability: f64,

    /// Onboarding duration bounds in seconds (inclusive)
    pub onboarding_seconds: (u32, u32),

    /// Widgets on the first dashboard
    pub dashboard_widgets: u32,

    /// Users who joined fewer than this many days ago count as recent
    pub recent_days: u32,

    /// Login probability for recent users
    pub recent_login_probability: f64,

    /// Login probability for everyone else
    pub stale_login_probability: f64,

    /// Oldest simulated join date, in days before the window end
    pub max_join_days_ago: u32,

    /// Share of the returning pool on the pro plan
    pub pro_share: f64,

    /// Activity steps for an active returning user (inclusive)
    pub min_actions: u32,
    pub max_actions: u32,

    /// Chance a free-tier activity step hits the paywall
    pub paywall_probability: f64,

    /// Chance a paywall view converts into a subscription
    pub conversion_probability: f64,

    /// Monthly recurring revenue reported on conversion
    pub conversion_mrr: u32,
}

impl Default for BehaviorTable {
    fn default() -> Self {
        Self {
            onboarding_probability: 0.8,
            first_value_probability: 0.5,
            onboarding_seconds: (60, 300),
            dashboard_widgets: 3,
            recent_days: 7,
            recent_login_probability: 0.6,
            stale_login_probability: 0.2,
            max_join_days_ago: 60,
            pro_share: 0.1,
            min_actions: 3,
            max_actions: 10,
            paywall_probability: 0.1,
            conversion_probability: 0.02,
            conversion_mrr: 29,
        }
    }
}

impl BehaviorTable {
    /// Login probability on the retention curve.
    pub fn login_probability(&self, join_days_ago: u32) -> f64 {
        if join_days_ago < self.recent_days {
            self.recent_login_probability
        } else {
            self.stale_login_probability
        }
    }

    fn validate(&self) -> PulseResult<()> {
        let probabilities = [
            ("onboarding_probability", self.onboarding_probability),
            ("first_value_probability", self.first_value_probability),
            ("recent_login_probability", self.recent_login_probability),
            ("stale_login_probability", self.stale_login_probability),
            ("pro_share", self.pro_share),
            ("paywall_probability", self.paywall_probability),
            ("conversion_probability", self.conversion_probability),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(PulseError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        if self.min_actions > self.max_actions {
            return Err(PulseError::InvalidConfig(format!(
                "min_actions ({}) exceeds max_actions ({})",
                self.min_actions, self.max_actions
            )));
        }
        if self.onboarding_seconds.0 > self.onboarding_seconds.1 {
            return Err(PulseError::InvalidConfig(
                "onboarding_seconds lower bound exceeds upper bound".to_string(),
            ));
        }
        if self.max_join_days_ago == 0 {
            return Err(PulseError::InvalidConfig(
                "max_join_days_ago must be at least 1".to_string(),
            ));
        }
        if self.max_join_days_ago > MAX_JOIN_DAYS_AGO {
            return Err(PulseError::InvalidConfig(format!(
                "max_join_days_ago must be at most {}, got {}",
                MAX_JOIN_DAYS_AGO, self.max_join_days_ago
            )));
        }
        Ok(())
    }
}

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// PostHog project API key (not needed for dry runs)
    pub api_key: Option<String>,

    /// Ingestion host, without trailing path
    pub host: String,

    /// Length of the trailing window events are spread over
    pub window_hours: u32,

    /// End of the window (None = now)
    pub window_end: Option<DateTime<Utc>>,

    /// New signups this run
    pub new_users: NewUserCount,

    /// Size of the returning-user pool
    pub returning_pool_size: u32,

    /// Events per ingestion request
    pub batch_size: usize,

    /// Per-request timeout for the ingestion client
    pub request_timeout_secs: u64,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    pub behavior: BehaviorTable,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            host: DEFAULT_HOST.to_string(),
            window_hours: 24,
            window_end: None,
            new_users: NewUserCount::Between(5, 12),
            returning_pool_size: 50,
            batch_size: 100,
            request_timeout_secs: 30,
            seed: None,
            behavior: BehaviorTable::default(),
        }
    }
}

impl SimConfig {
    /// Defaults plus the process environment.
    pub fn from_env() -> PulseResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults plus whatever `lookup` returns for the known variables.
    ///
    /// Fails with [`PulseError::MissingApiKey`] when the key is absent or blank.
    pub fn from_lookup<F>(lookup: F) -> PulseResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PulseError::MissingApiKey(API_KEY_VAR.to_string()))?;

        let mut config = Self {
            api_key: Some(api_key),
            ..Default::default()
        };
        if let Some(host) = lookup(HOST_VAR).filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        Ok(config)
    }

    /// Config for a run that never touches the network.
    pub fn dry_run() -> Self {
        Self::default()
    }

    /// Small deterministic run, handy for tests and demos.
    pub fn quick(seed: u64) -> Self {
        Self {
            new_users: NewUserCount::Fixed(3),
            returning_pool_size: 10,
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn api_key(&self) -> PulseResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| PulseError::MissingApiKey(API_KEY_VAR.to_string()))
    }

    pub fn validate(&self) -> PulseResult<()> {
        if self.window_hours == 0 {
            return Err(PulseError::InvalidConfig(
                "window_hours must be positive".to_string(),
            ));
        }
        if self.window_hours > MAX_WINDOW_HOURS {
            return Err(PulseError::InvalidConfig(format!(
                "window_hours must be at most {}, got {}",
                MAX_WINDOW_HOURS, self.window_hours
            )));
        }
        if self.batch_size == 0 {
            return Err(PulseError::InvalidConfig(
                "batch_size must be positive".to_string(),
            ));
        }
        if let NewUserCount::Between(low, high) = self.new_users {
            if low > high {
                return Err(PulseError::InvalidConfig(format!(
                    "new user range {}..={} is empty",
                    low, high
                )));
            }
        }
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            return Err(PulseError::InvalidConfig(format!(
                "host must be an http(s) URL, got {:?}",
                self.host
            )));
        }
        self.behavior.validate()
    }
}

/// Masks an API key for console output, keeping only its ends.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
