use chrono::NaiveDate;
use evlog::meta;
use thiserror::Error;

use crate::db::schema::{quorum_reached, Meeting, Participant, Recorded};
use crate::db::store::MeetingStore;
use crate::meeting::aggregate::aggregate;
use crate::meeting::select::{best_day, day_label};
use crate::runtime::get_logger;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("thread {0} already has an open meeting")]
    AlreadyOpen(String),
    #[error("meeting {0} is closed")]
    Closed(i32),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// What a meeting's responses add up to at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub responses: i64,
    pub expected: i32,
    /// False while the meeting is still collecting responses.
    pub closed: bool,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    NoResponses,
    /// Responses exist but none of their dates are today or later.
    NoDayWorks,
    Best {
        date: NaiveDate,
        label: String,
        names: Vec<String>,
        everyone: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Pending { responses: i64, expected: i32 },
    /// This response reached quorum and closed the meeting.
    Completed(Summary),
}

/// Drives meetings from open to closed on top of a [`MeetingStore`].
pub struct Scheduler<S> {
    store: S,
}

impl<S: MeetingStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn latest_meeting(&self, thread_id: &str) -> anyhow::Result<Option<Meeting>> {
        self.store.latest_meeting(thread_id).await
    }

    /// The thread's latest meeting, only while it is still open.
    pub async fn current_meeting(&self, thread_id: &str) -> anyhow::Result<Option<Meeting>> {
        Ok(self.latest_meeting(thread_id).await?.filter(|m| !m.done))
    }

    pub async fn start(&self, thread_id: &str, topic: &str, expected: i32) -> Result<Meeting, LifecycleError> {
        let meeting = match self.store.insert_meeting(thread_id, topic, expected).await? {
            None => return Err(LifecycleError::AlreadyOpen(thread_id.to_owned())),
            Some(v) => v,
        };

        get_logger().info("Meeting started.", meta! {
            "ThreadID" => thread_id,
            "MeetingID" => meeting.id,
            "Expected" => expected,
        });

        Ok(meeting)
    }

    pub async fn record_response(
        &self,
        meeting: &Meeting,
        participant: &Participant,
        dates: &[NaiveDate],
        today: NaiveDate,
    ) -> Result<Response, LifecycleError> {
        if meeting.done {
            return Err(LifecycleError::Closed(meeting.id));
        }

        let (responses, closed) = match self.store.record_availability(meeting.id, participant, dates).await? {
            Recorded::Rejected => return Err(LifecycleError::Closed(meeting.id)),
            Recorded::Accepted { responses, closed } => (responses, closed),
        };

        get_logger().info("Response recorded.", meta! {
            "MeetingID" => meeting.id,
            "UserIdent" => participant.ident,
            "Dates" => dates.len(),
            "Responses" => responses,
            "Expected" => meeting.num_participants,
        });

        if !closed {
            return Ok(Response::Pending { responses, expected: meeting.num_participants });
        }

        get_logger().info("Meeting closed by quorum.", meta! {
            "MeetingID" => meeting.id,
            "ThreadID" => meeting.thread_id,
        });

        Ok(Response::Completed(self.summarize(meeting, true, today).await?))
    }

    pub async fn is_complete(&self, meeting: &Meeting) -> anyhow::Result<bool> {
        let responses = self.store.count_availabilities(meeting.id).await?;
        Ok(quorum_reached(responses, meeting.num_participants))
    }

    /// Closes the meeting without a result. Returns false if it was already
    /// closed by someone else.
    pub async fn cancel(&self, meeting: &Meeting, actor: &Participant) -> anyhow::Result<bool> {
        let closed = self.store.close_meeting(meeting.id).await?;

        if closed {
            get_logger().info("Meeting canceled.", meta! {
                "MeetingID" => meeting.id,
                "ThreadID" => meeting.thread_id,
                "By" => actor.ident,
            });
        }

        Ok(closed)
    }

    /// Closes the meeting and computes its final result. `None` means another
    /// caller already closed it and owns the announcement.
    pub async fn close(&self, meeting: &Meeting, today: NaiveDate) -> anyhow::Result<Option<Summary>> {
        if !self.store.close_meeting(meeting.id).await? {
            return Ok(None);
        }

        get_logger().info("Meeting closed.", meta! {
            "MeetingID" => meeting.id,
            "ThreadID" => meeting.thread_id,
        });

        Ok(Some(self.summarize(meeting, true, today).await?))
    }

    /// A preview of the current result without changing the meeting.
    pub async fn status(&self, meeting: &Meeting, today: NaiveDate) -> anyhow::Result<Summary> {
        self.summarize(meeting, meeting.done, today).await
    }

    async fn summarize(&self, meeting: &Meeting, closed: bool, today: NaiveDate) -> anyhow::Result<Summary> {
        let availabilities = self.store.availabilities(meeting.id).await?;

        let outcome = if availabilities.is_empty() {
            Outcome::NoResponses
        } else {
            let tally = aggregate(&availabilities, today);
            match best_day(&tally) {
                None => Outcome::NoDayWorks,
                Some(best) => Outcome::Best {
                    date: best.date,
                    label: day_label(best.date, today),
                    everyone: best.participants.len() as i64 == meeting.num_participants as i64,
                    names: best.participants.iter().map(|a| a.user_name.clone()).collect(),
                },
            }
        };

        Ok(Summary {
            responses: availabilities.len() as i64,
            expected: meeting.num_participants,
            closed,
            outcome,
        })
    }
}
