//! Property tests for the task runner's cadence guarantees and the
//! uplink parser's totality.

use proptest::prelude::*;

use cansat_container::app::commands::Command;
use cansat_container::app::parser;
use cansat_container::runner::TaskRunner;

/// Poll times built from positive increments, so they are strictly
/// increasing and start anywhere in the first interval.
fn poll_times(max_gap_ms: u64, len: usize) -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1..=max_gap_ms, 1..len).prop_map(|gaps| {
        gaps.iter()
            .scan(0u64, |t, gap| {
                *t += gap;
                Some(*t)
            })
            .collect()
    })
}

proptest! {
    /// With no poll gap exceeding the interval, a gated task fires on
    /// every grid point: exactly floor(elapsed / interval) + 1 times.
    #[test]
    fn dense_polling_fires_once_per_interval(
        interval in 10u64..1000,
        times in poll_times(1, 200),
    ) {
        // Scale unit gaps up to at most one interval.
        let times: Vec<u64> = times.iter().map(|t| t * interval).collect();

        let mut fires = 0u64;
        let mut runner: TaskRunner<u64> = TaskRunner::new();
        runner.periodic("gated", interval, |_, count, _| *count += 1);

        for &now in &times {
            runner.run_once(now, &mut fires);
        }

        let first = times[0];
        let last = *times.last().unwrap();
        prop_assert_eq!(fires, (last - first) / interval + 1);
    }

    /// However sparse or bursty the polling, a gated task never fires
    /// more than once per elapsed interval (no catch-up flooding) and
    /// always fires at least once.
    #[test]
    fn sparse_polling_never_floods(
        interval in 10u64..1000,
        times in poll_times(5000, 100),
    ) {
        let mut fires = 0u64;
        let mut runner: TaskRunner<u64> = TaskRunner::new();
        runner.periodic("gated", interval, |_, count, _| *count += 1);

        for &now in &times {
            runner.run_once(now, &mut fires);
        }

        let elapsed = *times.last().unwrap() - times[0];
        prop_assert!(fires >= 1);
        prop_assert!(
            fires <= elapsed / interval + 1,
            "{} fires over {} ms at interval {}",
            fires, elapsed, interval
        );
    }

    /// A one-shot fires exactly once, never before its due time, and
    /// on the first poll at or past it.
    #[test]
    fn one_shot_fires_exactly_once_and_never_early(
        start in 0u64..10_000,
        delay in 0u64..5_000,
        times in poll_times(500, 100),
    ) {
        let times: Vec<u64> = times.iter().map(|t| start + t).collect();
        let due = start + delay;

        let mut fired_at: Vec<u64> = Vec::new();
        let mut runner: TaskRunner<Vec<u64>> = TaskRunner::new();
        runner.schedule_after("once", start, delay, |now, log, _| log.push(now));

        for &now in &times {
            runner.run_once(now, &mut fired_at);
        }

        let first_due_poll = times.iter().copied().find(|&t| t >= due);
        match first_due_poll {
            Some(t) => prop_assert_eq!(&fired_at, &vec![t]),
            None => prop_assert!(fired_at.is_empty()),
        }
        prop_assert_eq!(runner.pending_deferred(), usize::from(fired_at.is_empty()));
    }

    /// The parser is total: any input maps to some command, without
    /// panicking.
    #[test]
    fn parser_never_panics(line in ".{0,300}") {
        let _ = parser::parse(1057, &line);
    }

    /// Anything not addressed to this team parses as invalid, whatever
    /// the verb.
    #[test]
    fn wrong_team_is_always_invalid(
        team in 0u16..=9999,
        verb in "[A-Z]{1,8}",
        arg in "[A-Z0-9:.]{0,12}",
    ) {
        prop_assume!(team != 1057);
        let line = format!("CMD,{team},{verb},{arg}");
        prop_assert_eq!(parser::parse(1057, &line), Command::Invalid);
    }
}
