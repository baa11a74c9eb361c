//! Runs one simulated day and hands every event to the ingestion client.

use super::behavior::{simulate_returning, simulate_signup, Visit};
use super::config::{NewUserCount, SimConfig};
use super::identity::{new_user, returning_user};
use super::report::RunSummary;
use super::window::TimeWindow;
use crate::dice::{Dice, RngDice};
use crate::error::PulseResult;
use crate::ingest::Ingest;
use chrono::{SecondsFormat, Utc};
use tracing::{debug, error, info};

/// Run a simulation over the configured window with the configured seed.
pub fn run_simulation(config: &SimConfig, ingest: &mut impl Ingest) -> PulseResult<RunSummary> {
    config.validate()?;
    let end = config.window_end.unwrap_or_else(Utc::now);
    let window = TimeWindow::trailing(end, config.window_hours);
    let mut dice = RngDice::from_seed_option(config.seed);
    simulate(config, &window, &mut dice, ingest)
}

/// Core run loop: new signups, then the returning pool, then a single flush.
///
/// Configuration is validated before any randomness is drawn or event captured.
pub fn simulate(
    config: &SimConfig,
    window: &TimeWindow,
    dice: &mut impl Dice,
    ingest: &mut impl Ingest,
) -> PulseResult<RunSummary> {
    config.validate()?;

    info!(
        "Simulating window {} -> {}",
        window.start().to_rfc3339_opts(SecondsFormat::Secs, true),
        window.end().to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    let mut summary = RunSummary {
        window_start: Some(window.start()),
        window_end: Some(window.end()),
        ..Default::default()
    };
    let behavior = &config.behavior;

    let new_users = match config.new_users {
        NewUserCount::Fixed(n) => n,
        NewUserCount::Between(low, high) => dice.range(low, high),
    };

    for _ in 0..new_users {
        let persona = new_user(window, dice);
        let events = simulate_signup(&persona, window, behavior, dice);
        summary.record_signup(&events);
        for event in events {
            ingest.capture(event);
        }
        info!("New user signed up: {}", persona.identifier);
    }

    for index in 0..config.returning_pool_size {
        let persona = returning_user(index, window, behavior, dice);
        let visit = simulate_returning(&persona, window, behavior, dice);
        summary.record_visit(&visit);

        match &visit {
            Visit::Churned => debug!(user = %persona.identifier, "churned for today"),
            Visit::Active { events, converted } => {
                debug!(user = %persona.identifier, events = events.len(), "active");
                if *converted {
                    info!("Conversion! {} just subscribed", persona.identifier);
                }
            }
        }

        for event in visit.into_events() {
            ingest.capture(event);
        }
    }

    match ingest.flush() {
        Ok(report) => {
            summary.batches_sent = report.batches;
            info!(
                "Flushed {} events in {} batch(es)",
                report.events, report.batches
            );
            Ok(summary)
        }
        Err(err) => {
            error!("Flush failed: {}", err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::FixedDice;
    use crate::error::PulseError;
    use crate::ingest::MemoryIngest;
    use crate::simulator::behavior::{DASHBOARD_CREATED, ONBOARDING_COMPLETED, USER_SIGNED_UP};
    use chrono::TimeZone;

    fn window() -> TimeWindow {
        TimeWindow::trailing(Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap(), 24)
    }

    fn config(new_users: u32, pool: u32) -> SimConfig {
        SimConfig {
            new_users: NewUserCount::Fixed(new_users),
            returning_pool_size: pool,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_lucky_signup_emits_funnel_in_order() {
        let mut ingest = MemoryIngest::new();
        let summary = simulate(&config(1, 0), &window(), &mut FixedDice::lucky(), &mut ingest).unwrap();

        let names: Vec<&str> = ingest.captured.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(names, vec![USER_SIGNED_UP, ONBOARDING_COMPLETED, DASHBOARD_CREATED]);
        assert_eq!(summary.new_users, 1);
        assert_eq!(summary.events_captured, 3);
    }

    #[test]
    fn test_unlucky_returning_pool_is_silent() {
        let mut config = config(0, 5);
        config.behavior.max_join_days_ago = 60;
        let mut dice = FixedDice {
            gates_pass: false,
            range_high: true,
        };
        let mut ingest = MemoryIngest::new();
        let summary = simulate(&config, &window(), &mut dice, &mut ingest).unwrap();

        assert!(ingest.captured.is_empty());
        assert_eq!(summary.returning_churned, 5);
        assert_eq!(ingest.flush_count(), 1);
    }

    #[test]
    fn test_flush_once_after_all_captures() {
        let mut ingest = MemoryIngest::new();
        let mut dice = RngDice::seeded(12345);
        let summary = simulate(&config(8, 50), &window(), &mut dice, &mut ingest).unwrap();

        assert_eq!(ingest.flushes, vec![ingest.captured.len()]);
        assert_eq!(summary.events_captured, ingest.captured.len() as u64);
        assert_eq!(ingest.pending(), 0);
    }

    #[test]
    fn test_all_timestamps_within_window() {
        let w = window();
        let mut ingest = MemoryIngest::new();
        let mut dice = RngDice::seeded(777);
        simulate(&config(12, 50), &w, &mut dice, &mut ingest).unwrap();

        assert!(!ingest.captured.is_empty());
        assert!(ingest.captured.iter().all(|e| w.contains(e.timestamp)));
    }

    #[test]
    fn test_flush_failure_fails_the_run() {
        let mut ingest = MemoryIngest::failing();
        let mut dice = RngDice::seeded(1);
        let err = simulate(&config(2, 5), &window(), &mut dice, &mut ingest).unwrap_err();
        assert!(matches!(err, PulseError::Transport(_)));
        assert_eq!(ingest.flush_count(), 1);
    }

    #[test]
    fn test_invalid_config_captures_nothing() {
        let mut config = config(3, 3);
        config.behavior.min_actions = 20;
        let mut ingest = MemoryIngest::new();
        let err = simulate(&config, &window(), &mut FixedDice::lucky(), &mut ingest).unwrap_err();

        assert!(err.is_config());
        assert!(ingest.captured.is_empty());
        assert_eq!(ingest.flush_count(), 0);
    }

    #[test]
    fn test_random_new_user_count_within_range() {
        let config = SimConfig {
            returning_pool_size: 0,
            ..Default::default()
        };
        for seed in 0..20 {
            let mut ingest = MemoryIngest::new();
            let mut dice = RngDice::seeded(seed);
            let summary = simulate(&config, &window(), &mut dice, &mut ingest).unwrap();
            assert!((5..=12).contains(&summary.new_users));
        }
    }

    #[test]
    fn test_oversized_window_is_a_config_error() {
        let config = SimConfig {
            window_hours: u32::MAX,
            new_users: NewUserCount::Fixed(1),
            returning_pool_size: 0,
            ..Default::default()
        };
        let mut ingest = MemoryIngest::new();
        let err = run_simulation(&config, &mut ingest).unwrap_err();

        assert!(matches!(err, PulseError::InvalidConfig(_)));
        assert_eq!(err.exit_code(), 2);
        assert!(ingest.captured.is_empty());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = |seed| {
            let config = SimConfig {
                window_end: Some(Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap()),
                ..SimConfig::quick(seed)
            };
            let mut ingest = MemoryIngest::new();
            run_simulation(&config, &mut ingest).unwrap();
            ingest
                .captured
                .into_iter()
                .map(|e| (e.distinct_id, e.event, e.timestamp))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }
}
