//! Simulated user identities.

use super::config::BehaviorTable;
use super::window::TimeWindow;
use crate::dice::Dice;
use std::fmt;

/// Length of the random disambiguator in new-user identifiers.
const SUFFIX_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plan {
    Free,
    Pro,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A simulated user for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub identifier: String,
    pub join_days_ago: u32,
    pub plan: Plan,
}

impl Persona {
    pub fn is_pro(&self) -> bool {
        self.plan == Plan::Pro
    }
}

/// Fresh signup joining inside the window: `user_<date>_<hex>_free`.
pub fn new_user(window: &TimeWindow, dice: &mut impl Dice) -> Persona {
    let plan = Plan::Free;
    let identifier = format!(
        "user_{}_{}_{}",
        window.date_token(0),
        dice.hex_suffix(SUFFIX_LEN),
        plan
    );
    Persona {
        identifier,
        join_days_ago: 0,
        plan,
    }
}

/// Member `index` of the returning pool: `user_<join date>_<index>_<plan>`.
///
/// Recency and plan are drawn once here, so the persona stays fixed for the run.
pub fn returning_user(
    index: u32,
    window: &TimeWindow,
    behavior: &BehaviorTable,
    dice: &mut impl Dice,
) -> Persona {
    let join_days_ago = dice.range(1, behavior.max_join_days_ago);
    let plan = if dice.chance(behavior.pro_share) {
        Plan::Pro
    } else {
        Plan::Free
    };
    let identifier = format!("user_{}_{}_{}", window.date_token(join_days_ago), index, plan);
    Persona {
        identifier,
        join_days_ago,
        plan,
    }
}
