use chrono::{NaiveDate, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::Mutex;

use crate::db::schema::{quorum_reached, Availability, Meeting, Participant, Recorded};
use crate::db::store::MeetingStore;

/// Store held entirely in memory behind one lock, so each operation is
/// atomic the same way a Postgres transaction is.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    meetings: Vec<Meeting>,
    availabilities: Vec<Availability>,
}

impl State {
    fn latest(&self, thread_id: &str) -> Option<&Meeting> {
        self.meetings.iter()
            .filter(|m| m.thread_id == thread_id)
            .max_by_key(|m| (m.time_created, m.id))
    }

    fn count(&self, id_meeting: i32) -> i64 {
        self.availabilities.iter().filter(|a| a.id_meeting == id_meeting).count() as i64
    }
}

impl MemoryStore {
    pub async fn meeting(&self, id_meeting: i32) -> Option<Meeting> {
        self.state.lock().await.meetings.iter().find(|m| m.id == id_meeting).cloned()
    }
}

impl MeetingStore for MemoryStore {
    fn latest_meeting<'a>(&'a self, thread_id: &'a str) -> BoxFuture<'a, anyhow::Result<Option<Meeting>>> {
        async move {
            Ok(self.state.lock().await.latest(thread_id).cloned())
        }.boxed()
    }

    fn insert_meeting<'a>(&'a self, thread_id: &'a str, topic: &'a str, num_participants: i32) -> BoxFuture<'a, anyhow::Result<Option<Meeting>>> {
        async move {
            let mut state = self.state.lock().await;
            if let Some(latest) = state.latest(thread_id) {
                if !latest.done {
                    return Ok(None);
                }
            }

            let meeting = Meeting {
                id: state.meetings.len() as i32 + 1,
                thread_id: thread_id.to_owned(),
                time_created: Utc::now(),
                topic: topic.to_owned(),
                done: false,
                num_participants,
            };
            state.meetings.push(meeting.clone());

            Ok(Some(meeting))
        }.boxed()
    }

    fn record_availability<'a>(&'a self, id_meeting: i32, participant: &'a Participant, dates: &'a [NaiveDate]) -> BoxFuture<'a, anyhow::Result<Recorded>> {
        async move {
            let mut state = self.state.lock().await;

            let (done, num_participants) = match state.meetings.iter().find(|m| m.id == id_meeting) {
                None => return Err(anyhow::Error::msg(format!("meeting {} does not exist", id_meeting))),
                Some(m) => (m.done, m.num_participants),
            };
            if done {
                return Ok(Recorded::Rejected);
            }

            let row = Availability {
                id_meeting,
                user_ident: participant.ident.clone(),
                user_name: participant.name.clone(),
                dates: dates.to_vec(),
            };
            let existing = state.availabilities.iter()
                .position(|a| a.id_meeting == id_meeting && a.user_ident == participant.ident);
            match existing {
                Some(i) => state.availabilities[i] = row,
                None => state.availabilities.push(row),
            }

            let responses = state.count(id_meeting);
            let closed = quorum_reached(responses, num_participants);
            if closed {
                for m in state.meetings.iter_mut().filter(|m| m.id == id_meeting) {
                    m.done = true;
                }
            }

            Ok(Recorded::Accepted { responses, closed })
        }.boxed()
    }

    fn close_meeting(&self, id_meeting: i32) -> BoxFuture<'_, anyhow::Result<bool>> {
        async move {
            let mut state = self.state.lock().await;
            match state.meetings.iter_mut().find(|m| m.id == id_meeting && !m.done) {
                None => Ok(false),
                Some(m) => {
                    m.done = true;
                    Ok(true)
                }
            }
        }.boxed()
    }

    fn availabilities(&self, id_meeting: i32) -> BoxFuture<'_, anyhow::Result<Vec<Availability>>> {
        async move {
            let state = self.state.lock().await;
            Ok(state.availabilities.iter().filter(|a| a.id_meeting == id_meeting).cloned().collect())
        }.boxed()
    }

    fn count_availabilities(&self, id_meeting: i32) -> BoxFuture<'_, anyhow::Result<i64>> {
        async move {
            Ok(self.state.lock().await.count(id_meeting))
        }.boxed()
    }
}
