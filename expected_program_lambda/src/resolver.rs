use bm_store::{ScheduleStore, StoreError};
use thiserror::Error;
use types::{ScheduledProgram, millis};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no schedule found for stream {0}")]
    ScheduleNotFound(String),

    #[error(
        "no program in stream {stream_id}'s schedule covers loop position {position_sec}s"
    )]
    ProgramNotFound {
        stream_id: String,
        position_sec: f64,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Find the expected program for a segment of a looping stream.
///
/// The loop length is the `End_Time` of the schedule's last entry; the
/// segment's position within the loop is its relative start time modulo the
/// loop length, computed in integer milliseconds so repeated loops cannot
/// drift. A segment that straddles a program boundary resolves to the
/// earlier program: segments are short relative to programs, so the
/// earliest overlapping entry wins.
///
/// The returned program carries `Segment_Start_Time_In_Loop` for the reuse
/// lookup downstream.
///
/// # Errors
/// `ScheduleNotFound` when the stream has no schedule, `ProgramNotFound`
/// when no entry overlaps the segment's loop window. Both are fatal for the
/// segment: without an expected program no check has meaning.
pub async fn resolve<S: ScheduleStore>(
    store: &S,
    stream_id: &str,
    segment_start_sec: f64,
    duration_sec: f64,
) -> Result<ScheduledProgram, ResolveError> {
    let latest = store
        .latest_entry(stream_id)
        .await?
        .ok_or_else(|| ResolveError::ScheduleNotFound(stream_id.to_string()))?;

    let loop_ms = millis::from_seconds(latest.end_time);
    if loop_ms <= 0 {
        return Err(ResolveError::ScheduleNotFound(stream_id.to_string()));
    }

    let position_ms = millis::position_in_loop(
        millis::from_seconds(segment_start_sec),
        loop_ms,
    );
    let position_sec = millis::to_seconds(position_ms);

    tracing::info!(
        "Loop length: {}s, segment start time in loop: {}s",
        latest.end_time,
        position_sec
    );

    let upper_ms = position_ms + millis::from_seconds(duration_sec);

    let mut program = store
        .entries_starting_before(stream_id, upper_ms)
        .await?
        .into_iter()
        .find(|entry| millis::from_seconds(entry.end_time) > position_ms)
        .ok_or_else(|| ResolveError::ProgramNotFound {
            stream_id: stream_id.to_string(),
            position_sec,
        })?;

    program.segment_start_time_in_loop = Some(position_sec);

    tracing::info!(
        "Found program {} ({} - {}) for video segment",
        program.event_id,
        program.start_time,
        program.end_time
    );

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeScheduleStore {
        entries: Vec<ScheduledProgram>,
    }

    impl FakeScheduleStore {
        fn new(mut entries: Vec<ScheduledProgram>) -> Self {
            entries.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
            Self { entries }
        }
    }

    impl ScheduleStore for FakeScheduleStore {
        async fn latest_entry(
            &self,
            stream_id: &str,
        ) -> Result<Option<ScheduledProgram>, StoreError> {
            Ok(self
                .entries
                .iter()
                .filter(|entry| entry.stream_id == stream_id)
                .next_back()
                .cloned())
        }

        async fn entries_starting_before(
            &self,
            stream_id: &str,
            upper_ms: i64,
        ) -> Result<Vec<ScheduledProgram>, StoreError> {
            Ok(self
                .entries
                .iter()
                .filter(|entry| {
                    entry.stream_id == stream_id
                        && millis::from_seconds(entry.start_time) <= upper_ms
                })
                .cloned()
                .collect())
        }
    }

    fn program(start: f64, end: f64, event_id: &str) -> ScheduledProgram {
        ScheduledProgram {
            stream_id: "test_1".to_string(),
            start_time: start,
            end_time: end,
            event_id: event_id.to_string(),
            event_title: None,
            event_type: None,
            team_info: None,
            sports_type: None,
            station_logo: None,
            segment_start_time_in_loop: None,
        }
    }

    /// Three-program schedule with a 150s loop.
    fn looping_schedule() -> FakeScheduleStore {
        FakeScheduleStore::new(vec![
            program(0.0, 60.0, "SIM-PROG1"),
            program(60.0, 90.0, "SIM-PROG2"),
            program(90.0, 150.0, "SIM-PROG3"),
        ])
    }

    #[tokio::test]
    async fn resolves_each_program_in_first_loop() {
        let store = looping_schedule();

        for (start, expected) in [
            (0.0, "SIM-PROG1"),
            (60.0, "SIM-PROG2"),
            (80.0, "SIM-PROG2"),
            (90.0, "SIM-PROG3"),
        ] {
            let found =
                resolve(&store, "test_1", start, 6.0).await.unwrap();
            assert_eq!(found.event_id, expected, "segment at {start}");
        }
    }

    #[tokio::test]
    async fn straddling_segment_resolves_to_earlier_program() {
        let store = looping_schedule();

        let found = resolve(&store, "test_1", 59.0, 6.0).await.unwrap();
        assert_eq!(found.event_id, "SIM-PROG1");
    }

    #[tokio::test]
    async fn wraps_at_loop_boundary_and_beyond() {
        let store = looping_schedule();

        // segment starting exactly at the loop end wraps to the start
        let found = resolve(&store, "test_1", 150.0, 6.0).await.unwrap();
        assert_eq!(found.event_id, "SIM-PROG1");
        assert_eq!(found.segment_start_time_in_loop, Some(0.0));

        // one loop in: 220 mod 150 = 70
        let found = resolve(&store, "test_1", 220.0, 6.0).await.unwrap();
        assert_eq!(found.event_id, "SIM-PROG2");
        assert_eq!(found.segment_start_time_in_loop, Some(70.0));

        // two loops in
        let found = resolve(&store, "test_1", 330.0, 6.0).await.unwrap();
        assert_eq!(found.event_id, "SIM-PROG1");
    }

    #[tokio::test]
    async fn loop_shifted_lookups_resolve_to_same_program() {
        let store = looping_schedule();

        let base = resolve(&store, "test_1", 70.3, 6.0).await.unwrap();
        for loops in 1..=3 {
            let t = 70.3 + 150.0 * f64::from(loops);
            let shifted = resolve(&store, "test_1", t, 6.0).await.unwrap();
            assert_eq!(shifted.event_id, base.event_id);
            assert_eq!(
                shifted.segment_start_time_in_loop,
                base.segment_start_time_in_loop
            );
        }
    }

    #[tokio::test]
    async fn loop_position_is_always_in_range() {
        let store = looping_schedule();

        for start in [0.0, 149.999, 150.0, 150.001, 12_345.678] {
            let found =
                resolve(&store, "test_1", start, 6.0).await.unwrap();
            let position = found.segment_start_time_in_loop.unwrap();
            assert!(
                (0.0..150.0).contains(&position),
                "start={start} position={position}"
            );
        }
    }

    #[tokio::test]
    async fn missing_schedule_is_fatal() {
        let store = FakeScheduleStore::new(Vec::new());

        let err = resolve(&store, "test_1", 10.0, 6.0).await.unwrap_err();
        assert!(matches!(err, ResolveError::ScheduleNotFound(_)));
    }

    #[tokio::test]
    async fn uncovered_loop_position_is_fatal() {
        // schedule that only covers [50, 150)
        let store =
            FakeScheduleStore::new(vec![program(50.0, 150.0, "SIM-PROG1")]);

        let err = resolve(&store, "test_1", 10.0, 5.0).await.unwrap_err();
        assert!(matches!(err, ResolveError::ProgramNotFound { .. }));
    }
}
