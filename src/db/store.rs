use chrono::NaiveDate;
use futures::future::BoxFuture;

use crate::db::schema::{Availability, Meeting, Participant, Recorded};

/// Persistence seen by the meeting lifecycle. Every method that changes a
/// meeting's `done` flag must do so atomically with its check, so exactly one
/// caller observes the transition.
pub trait MeetingStore: Send + Sync {
    /// The most recently created meeting for the thread, open or not.
    fn latest_meeting<'a>(&'a self, thread_id: &'a str) -> BoxFuture<'a, anyhow::Result<Option<Meeting>>>;

    /// Creates an open meeting; `None` if the thread already has one open.
    fn insert_meeting<'a>(&'a self, thread_id: &'a str, topic: &'a str, num_participants: i32) -> BoxFuture<'a, anyhow::Result<Option<Meeting>>>;

    /// Inserts or overwrites the participant's dates, closing the meeting when
    /// the response count reaches `num_participants`.
    fn record_availability<'a>(&'a self, id_meeting: i32, participant: &'a Participant, dates: &'a [NaiveDate]) -> BoxFuture<'a, anyhow::Result<Recorded>>;

    /// Marks the meeting done; false if it already was.
    fn close_meeting(&self, id_meeting: i32) -> BoxFuture<'_, anyhow::Result<bool>>;

    fn availabilities(&self, id_meeting: i32) -> BoxFuture<'_, anyhow::Result<Vec<Availability>>>;

    fn count_availabilities(&self, id_meeting: i32) -> BoxFuture<'_, anyhow::Result<i64>>;
}
