//! Time management: convert clock parameters to search deadlines.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use shakmaty::Color;

use crate::search::control::SearchControl;

/// Default allowance for GUI and transport latency.
pub const DEFAULT_MOVE_OVERHEAD: Duration = Duration::from_millis(25);

/// Upper bound on the base share of the clock spent on one move.
const MAX_THINK_MS: f64 = 5_000.0;
/// Expected number of moves the remaining time has to cover.
const MOVES_TO_GO: f64 = 40.0;

/// Soft and hard limits for `go movetime`: both equal the move time minus
/// the overhead, and never below 1 ms.
pub fn fixed_move_time(movetime: Duration, overhead: Duration) -> (Duration, Duration) {
    let limit = movetime.saturating_sub(overhead).max(Duration::from_millis(1));
    (limit, limit)
}

/// Soft and hard limits from the remaining clock and increment.
///
/// | Step | Value |
/// |------|-------|
/// | think | `min(5000, remaining / 40)`, plus `0.8 * inc` when `remaining > 2 * inc` |
/// | min think | `min(50, remaining / 4)` |
/// | soft | `ceil(max(min think, think)) - overhead` |
/// | extension | `soft * pct` clamped to `25..=500`; pct is 0.1 / 0.2 / 0.3 below 5 s / 30 s / otherwise |
/// | hard | `min(soft + extension, remaining - max(50, remaining / 20))`, then at least `soft + 10` |
pub fn clock_limits(
    remaining: Duration,
    increment: Duration,
    overhead: Duration,
) -> (Duration, Duration) {
    let remaining_ms = remaining.as_millis() as i64;
    let inc_ms = increment.as_millis() as i64;

    let mut think = (remaining_ms as f64 / MOVES_TO_GO).min(MAX_THINK_MS);
    if remaining_ms > inc_ms * 2 {
        think += inc_ms as f64 * 0.8;
    }
    let min_think = (remaining_ms as f64 * 0.25).min(50.0);
    let soft = (min_think.max(think).ceil() as i64 - overhead.as_millis() as i64).max(1);

    let pct = if remaining_ms < 5_000 {
        0.1
    } else if remaining_ms < 30_000 {
        0.2
    } else {
        0.3
    };
    let extension = ((soft as f64 * pct) as i64).clamp(25, 500);
    let safety = (remaining_ms / 20).max(50);
    let hard = (soft + extension).min(remaining_ms - safety).max(soft + 10);

    (
        Duration::from_millis(soft as u64),
        Duration::from_millis(hard as u64),
    )
}

/// Build a [`SearchControl`] from UCI `go` parameters and the side to move.
///
/// Priority order:
/// 1. `infinite` -> no deadlines
/// 2. `movetime` -> [`fixed_move_time`]
/// 3. clock for the side to move -> [`clock_limits`]
/// 4. `depth` only / bare `go` -> no deadlines
#[allow(clippy::too_many_arguments)]
pub fn limits_from_go(
    wtime: Option<Duration>,
    btime: Option<Duration>,
    winc: Option<Duration>,
    binc: Option<Duration>,
    movetime: Option<Duration>,
    infinite: bool,
    side: Color,
    overhead: Duration,
    stopped: Arc<AtomicBool>,
) -> SearchControl {
    let (remaining, increment) = match side {
        Color::White => (wtime, winc),
        Color::Black => (btime, binc),
    };

    if infinite {
        return SearchControl::new_infinite(stopped);
    }

    if let Some(mt) = movetime {
        let (soft, hard) = fixed_move_time(mt, overhead);
        return SearchControl::new_timed(stopped, soft, hard);
    }

    if let Some(rem) = remaining {
        let (soft, hard) = clock_limits(rem, increment.unwrap_or(Duration::ZERO), overhead);
        return SearchControl::new_timed(stopped, soft, hard);
    }

    SearchControl::new_infinite(stopped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn flag() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn movetime_subtracts_overhead() {
        assert_eq!(fixed_move_time(ms(1_000), ms(25)), (ms(975), ms(975)));
        assert_eq!(fixed_move_time(ms(10), ms(25)), (ms(1), ms(1)));
    }

    #[test]
    fn comfortable_clock_with_increment() {
        // think = min(5000, 7500) + 1600 = 6600, soft = 6575,
        // extension = 30% capped at 500.
        let (soft, hard) = clock_limits(ms(300_000), ms(2_000), ms(25));
        assert_eq!(soft, ms(6_575));
        assert_eq!(hard, ms(7_075));
    }

    #[test]
    fn increment_ignored_when_clock_below_twice_increment() {
        let (with_guard, _) = clock_limits(ms(100), ms(1_000), ms(25));
        // min think = 25, minus overhead, floored at 1 ms.
        assert_eq!(with_guard, ms(1));
    }

    #[test]
    fn low_clock_uses_minimum_extension() {
        // think = 50, soft = 25, extension = max(2, 25) = 25.
        let (soft, hard) = clock_limits(ms(2_000), Duration::ZERO, ms(25));
        assert_eq!(soft, ms(25));
        assert_eq!(hard, ms(50));
    }

    #[test]
    fn medium_clock_uses_twenty_percent() {
        // think = 500, soft = 475, extension = 95.
        let (soft, hard) = clock_limits(ms(20_000), Duration::ZERO, ms(25));
        assert_eq!(soft, ms(475));
        assert_eq!(hard, ms(570));
    }

    #[test]
    fn hard_stays_ten_above_soft_even_past_safety_buffer() {
        let (soft, hard) = clock_limits(ms(40), Duration::ZERO, Duration::ZERO);
        assert_eq!(soft, ms(10));
        assert_eq!(hard, ms(20));
    }

    #[test]
    fn hard_never_below_soft() {
        for remaining in [0, 30, 500, 4_999, 29_999, 60_000, 3_600_000] {
            for inc in [0, 100, 5_000] {
                let (soft, hard) = clock_limits(ms(remaining), ms(inc), ms(25));
                assert!(soft >= ms(1));
                assert!(hard >= soft + ms(10), "remaining={remaining} inc={inc}");
            }
        }
    }

    #[test]
    fn limits_from_go_infinite() {
        let control = limits_from_go(
            None, None, None, None, None, true, Color::White, DEFAULT_MOVE_OVERHEAD, flag(),
        );
        assert_eq!(control.soft_limit(), None);
        assert!(!control.should_stop_iterating());
    }

    #[test]
    fn limits_from_go_movetime() {
        let control = limits_from_go(
            None, None, None, None, Some(ms(5_000)), false, Color::White, DEFAULT_MOVE_OVERHEAD,
            flag(),
        );
        assert_eq!(control.soft_limit(), Some(ms(4_975)));
        assert_eq!(control.hard_limit(), Some(ms(4_975)));
    }

    #[test]
    fn limits_from_go_picks_side_to_move_clock() {
        let control = limits_from_go(
            Some(ms(300_000)), Some(ms(2_000)), None, None, None, false, Color::Black,
            DEFAULT_MOVE_OVERHEAD, flag(),
        );
        assert_eq!(control.soft_limit(), Some(ms(25)));
    }

    #[test]
    fn limits_from_go_depth_only() {
        let control = limits_from_go(
            None, None, None, None, None, false, Color::White, DEFAULT_MOVE_OVERHEAD, flag(),
        );
        assert_eq!(control.hard_limit(), None);
    }
}
