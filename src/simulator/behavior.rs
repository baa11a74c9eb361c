//! Per-user behavior: signup funnel, retention gate and the activity loop.
//!
//! Functions here only decide which events a persona produces. They return
//! the events in emission order and leave capturing to the runner.

use super::config::BehaviorTable;
use super::identity::{Persona, Plan};
use super::window::TimeWindow;
use crate::dice::Dice;
use crate::event::Event;

pub const USER_SIGNED_UP: &str = "user_signed_up";
pub const ONBOARDING_COMPLETED: &str = "onboarding_completed";
pub const DASHBOARD_CREATED: &str = "dashboard_created";
pub const PAYWALL_VIEWED: &str = "paywall_viewed";
pub const SUBSCRIPTION_STARTED: &str = "subscription_started";

/// Events a pro user picks from on each activity step.
pub const PRO_EVENTS: [&str; 4] = [
    "report_export_pdf",
    "advanced_filter",
    "team_invite",
    "dashboard_viewed",
];

/// Events a free user picks from when the paywall is not hit.
pub const FREE_EVENTS: [&str; 3] = ["dashboard_viewed", "settings_viewed", "basic_filter"];

/// Whether the activity loop keeps going after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The user converted and leaves to pay; nothing else is emitted for them.
    StopEarly,
}

/// What a returning user did during the window.
#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    /// Did not log in; no events.
    Churned,
    Active { events: Vec<Event>, converted: bool },
}

impl Visit {
    pub fn events(&self) -> &[Event] {
        match self {
            Visit::Churned => &[],
            Visit::Active { events, .. } => events,
        }
    }

    pub fn into_events(self) -> Vec<Event> {
        match self {
            Visit::Churned => Vec::new(),
            Visit::Active { events, .. } => events,
        }
    }
}

/// Funnel for a brand new user: signup, then maybe onboarding, then maybe first value.
pub fn simulate_signup(
    persona: &Persona,
    window: &TimeWindow,
    table: &BehaviorTable,
    dice: &mut impl Dice,
) -> Vec<Event> {
    let mut events = Vec::with_capacity(3);

    events.push(
        Event::new(&persona.identifier, USER_SIGNED_UP, window.random_timestamp(dice))
            .with("plan", persona.plan.as_str())
            .with("source", "ads"),
    );

    if !dice.chance(table.onboarding_probability) {
        return events;
    }
    let (min_secs, max_secs) = table.onboarding_seconds;
    let time_taken = dice.range(min_secs, max_secs);
    events.push(
        Event::new(&persona.identifier, ONBOARDING_COMPLETED, window.random_timestamp(dice))
            .with("time_taken", time_taken),
    );

    if dice.chance(table.first_value_probability) {
        events.push(
            Event::new(&persona.identifier, DASHBOARD_CREATED, window.random_timestamp(dice))
                .with("widgets", table.dashboard_widgets),
        );
    }

    events
}

/// A returning user's day: retention gate, then `min_actions..=max_actions` steps.
///
/// The bound counts steps, not events: a conversion on the last step adds
/// `subscription_started` after the paywall view, so a converting user can
/// emit `max_actions + 1` events.
pub fn simulate_returning(
    persona: &Persona,
    window: &TimeWindow,
    table: &BehaviorTable,
    dice: &mut impl Dice,
) -> Visit {
    if !dice.chance(table.login_probability(persona.join_days_ago)) {
        return Visit::Churned;
    }

    let actions = dice.range(table.min_actions, table.max_actions);
    let mut events = Vec::with_capacity(actions as usize + 1);
    let mut converted = false;

    for _ in 0..actions {
        if activity_step(persona, window, table, dice, &mut events) == Step::StopEarly {
            converted = true;
            break;
        }
    }

    Visit::Active { events, converted }
}

/// One activity step. Appends one event, or two when a paywall view converts.
pub fn activity_step(
    persona: &Persona,
    window: &TimeWindow,
    table: &BehaviorTable,
    dice: &mut impl Dice,
    events: &mut Vec<Event>,
) -> Step {
    match persona.plan {
        Plan::Pro => {
            let name = *dice.pick(&PRO_EVENTS);
            events.push(
                Event::new(&persona.identifier, name, window.random_timestamp(dice))
                    .with("plan", Plan::Pro.as_str()),
            );
            Step::Continue
        }
        Plan::Free if dice.chance(table.paywall_probability) => {
            events.push(
                Event::new(&persona.identifier, PAYWALL_VIEWED, window.random_timestamp(dice))
                    .with("trigger", "feature_lock"),
            );
            if !dice.chance(table.conversion_probability) {
                return Step::Continue;
            }
            events.push(
                Event::new(&persona.identifier, SUBSCRIPTION_STARTED, window.random_timestamp(dice))
                    .with("mrr", table.conversion_mrr)
                    .with("plan", Plan::Pro.as_str()),
            );
            Step::StopEarly
        }
        Plan::Free => {
            let name = *dice.pick(&FREE_EVENTS);
            events.push(
                Event::new(&persona.identifier, name, window.random_timestamp(dice))
                    .with("plan", Plan::Free.as_str()),
            );
            Step::Continue
        }
    }
}
