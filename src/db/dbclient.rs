use chrono::NaiveDate;
use futures::future::BoxFuture;
use futures::FutureExt;
use evlog::meta;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::db::model;
use crate::db::schema::{Availability, Meeting, Participant, Recorded, CREATE_TABLES};
use crate::db::store::MeetingStore;
use crate::runtime::get_logger;

pub struct DBClient {
    conn: PgPool,
}

impl DBClient {
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let conn = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;

        for statement in CREATE_TABLES {
            sqlx::query(statement).execute(&conn).await?;
        }

        get_logger().debug("Database schema ensured.", meta! {
            "Statements" => CREATE_TABLES.len(),
        });

        Ok(Self { conn })
    }
}

impl MeetingStore for DBClient {
    fn latest_meeting<'a>(&'a self, thread_id: &'a str) -> BoxFuture<'a, anyhow::Result<Option<Meeting>>> {
        model::get_latest_meeting(&self.conn, thread_id).boxed()
    }

    fn insert_meeting<'a>(&'a self, thread_id: &'a str, topic: &'a str, num_participants: i32) -> BoxFuture<'a, anyhow::Result<Option<Meeting>>> {
        model::add_meeting(&self.conn, thread_id, topic, num_participants).boxed()
    }

    fn record_availability<'a>(&'a self, id_meeting: i32, participant: &'a Participant, dates: &'a [NaiveDate]) -> BoxFuture<'a, anyhow::Result<Recorded>> {
        model::record_availability(&self.conn, id_meeting, participant, dates).boxed()
    }

    fn close_meeting(&self, id_meeting: i32) -> BoxFuture<'_, anyhow::Result<bool>> {
        model::close_meeting(&self.conn, id_meeting).boxed()
    }

    fn availabilities(&self, id_meeting: i32) -> BoxFuture<'_, anyhow::Result<Vec<Availability>>> {
        model::list_availabilities(&self.conn, id_meeting).boxed()
    }

    fn count_availabilities(&self, id_meeting: i32) -> BoxFuture<'_, anyhow::Result<i64>> {
        model::count_availabilities(&self.conn, id_meeting).boxed()
    }
}
