use chrono::{DateTime, NaiveDate, Utc};

pub const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS meeting (
        id               SERIAL PRIMARY KEY,
        thread_id        TEXT NOT NULL,
        time_created     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        topic            TEXT NOT NULL DEFAULT '',
        done             BOOLEAN NOT NULL DEFAULT FALSE,
        num_participants INTEGER NOT NULL
    );",
    "CREATE INDEX IF NOT EXISTS meeting_thread_created ON meeting (thread_id, time_created DESC);",
    "CREATE TABLE IF NOT EXISTS availability (
        id           SERIAL PRIMARY KEY,
        id_meeting   INTEGER NOT NULL REFERENCES meeting (id),
        user_ident   TEXT NOT NULL,
        user_name    TEXT NOT NULL,
        dates        DATE[] NOT NULL,
        time_updated TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (id_meeting, user_ident)
    );",
];

/// A meeting closes once this many responses are in. Responses at or past
/// the expected participant count reach quorum.
pub fn quorum_reached(responses: i64, num_participants: i32) -> bool {
    responses >= num_participants as i64
}

/// One polling round for a chat thread.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Meeting {
    pub id: i32,
    pub thread_id: String,
    pub time_created: DateTime<Utc>,
    pub topic: String,
    pub done: bool,
    pub num_participants: i32,
}

/// A participant's response within one meeting. The name is kept as it was
/// at submission time.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Availability {
    pub id_meeting: i32,
    pub user_ident: String,
    pub user_name: String,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Participant {
    pub ident: String,
    pub name: String,
}

/// Result of writing an availability under the meeting's row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// The meeting was already done; nothing was written.
    Rejected,
    Accepted {
        responses: i64,
        /// True only for the one submission that flipped the meeting to done.
        closed: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quorum_at_expected_count() {
        assert!(!quorum_reached(1, 2));
        assert!(quorum_reached(2, 2));
        assert!(quorum_reached(3, 2));
        assert!(quorum_reached(0, 0));
    }

    #[test]
    fn identifier_columns_are_unbounded() {
        for statement in CREATE_TABLES {
            assert!(!statement.contains("VARCHAR"), "bounded column in: {}", statement);
        }
    }
}
