use chrono::NaiveDate;
use sqlx::{PgPool, query, query_as, query_scalar};
use tokio_stream::StreamExt;

use crate::db::schema::{quorum_reached, Availability, Meeting, Participant, Recorded};

pub async fn get_latest_meeting(conn: &PgPool, thread_id: &str) -> anyhow::Result<Option<Meeting>> {
    let r = query_as::<_, Meeting>(
        "SELECT * FROM meeting WHERE thread_id=$1 ORDER BY time_created DESC, id DESC LIMIT 1;")
        .bind(thread_id)
        .fetch_optional(conn)
        .await?;

    Ok(r)
}

/// Inserts a new open meeting unless the thread's latest meeting is still
/// open, in which case nothing is written and `None` is returned.
pub async fn add_meeting(
    conn: &PgPool,
    thread_id: &str,
    topic: &str,
    num_participants: i32,
) -> anyhow::Result<Option<Meeting>> {
    let mut tx = conn.begin().await?;

    // Serializes concurrent starts for the same thread until commit.
    query("SELECT pg_advisory_xact_lock(hashtext($1));")
        .bind(thread_id)
        .execute(&mut *tx)
        .await?;

    let latest = query_scalar::<_, bool>(
        "SELECT done FROM meeting WHERE thread_id=$1 ORDER BY time_created DESC, id DESC LIMIT 1;")
        .bind(thread_id)
        .fetch_optional(&mut *tx)
        .await?;

    if latest == Some(false) {
        tx.rollback().await?;
        return Ok(None);
    }

    let r = query_as::<_, Meeting>(
        "INSERT INTO meeting (time_created, thread_id, topic, done, num_participants)
         VALUES (NOW(), $1, $2, FALSE, $3)
         RETURNING *;")
        .bind(thread_id)
        .bind(topic)
        .bind(num_participants)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(r))
}

/// Upserts a participant's dates and, in the same transaction, closes the
/// meeting if this response reaches quorum.
pub async fn record_availability(
    conn: &PgPool,
    id_meeting: i32,
    participant: &Participant,
    dates: &[NaiveDate],
) -> anyhow::Result<Recorded> {
    let mut tx = conn.begin().await?;

    let meeting = query_as::<_, Meeting>("SELECT * FROM meeting WHERE id=$1 FOR UPDATE;")
        .bind(id_meeting)
        .fetch_optional(&mut *tx)
        .await?;

    let meeting = match meeting {
        None => return Err(anyhow::Error::msg(format!("meeting {} does not exist", id_meeting))),
        Some(v) => v,
    };

    if meeting.done {
        tx.rollback().await?;
        return Ok(Recorded::Rejected);
    }

    query(
        "INSERT INTO availability (id_meeting, user_ident, user_name, dates, time_updated)
         VALUES ($1, $2, $3, $4, NOW())
         ON CONFLICT (id_meeting, user_ident) DO UPDATE
         SET user_name=EXCLUDED.user_name, dates=EXCLUDED.dates, time_updated=NOW();")
        .bind(id_meeting)
        .bind(&participant.ident)
        .bind(&participant.name)
        .bind(dates)
        .execute(&mut *tx)
        .await?;

    let responses = query_scalar::<_, i64>("SELECT COUNT(*) FROM availability WHERE id_meeting=$1;")
        .bind(id_meeting)
        .fetch_one(&mut *tx)
        .await?;

    let closed = quorum_reached(responses, meeting.num_participants);
    if closed {
        query("UPDATE meeting SET done=TRUE WHERE id=$1;")
            .bind(id_meeting)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(Recorded::Accepted { responses, closed })
}

pub async fn close_meeting(conn: &PgPool, id_meeting: i32) -> anyhow::Result<bool> {
    let r = query("UPDATE meeting SET done=TRUE WHERE id=$1 AND done=FALSE;")
        .bind(id_meeting)
        .execute(conn)
        .await?;

    Ok(r.rows_affected() > 0)
}

pub async fn list_availabilities(conn: &PgPool, id_meeting: i32) -> anyhow::Result<Vec<Availability>> {
    let mut stream = query_as::<_, Availability>(
        "SELECT id_meeting, user_ident, user_name, dates FROM availability WHERE id_meeting=$1 ORDER BY id;")
        .bind(id_meeting)
        .fetch(conn);

    let mut result = Vec::new();
    while let Some(row) = stream.try_next().await? {
        result.push(row);
    }

    Ok(result)
}

pub async fn count_availabilities(conn: &PgPool, id_meeting: i32) -> anyhow::Result<i64> {
    let r = query_scalar::<_, i64>("SELECT COUNT(*) FROM availability WHERE id_meeting=$1;")
        .bind(id_meeting)
        .fetch_one(conn)
        .await?;

    Ok(r)
}
