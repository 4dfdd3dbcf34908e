#![allow(unused_imports)]

pub use gcmd_test_utils::builders;
pub use gcmd_test_utils::fake_backend::{FakeBackend, FakeScript, Interval, Tracker};
pub use gcmd_test_utils::recorder::{Call, RecordingHandlers};
pub use gcmd_test_utils::{init_tracing, with_timeout};

/// No two intervals overlap: each one starts no earlier than the previous
/// one (by start time) ended.
#[allow(dead_code)]
pub fn assert_serialized(mut intervals: Vec<(std::time::Instant, std::time::Instant)>) {
    intervals.sort_by_key(|(start, _)| *start);
    for pair in intervals.windows(2) {
        let (_, prev_end) = pair[0];
        let (next_start, _) = pair[1];
        assert!(
            next_start >= prev_end,
            "invocations overlapped: next started {:?} before previous ended",
            prev_end - next_start
        );
    }
}
