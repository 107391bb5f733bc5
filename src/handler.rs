use chrono::NaiveDate;
use evlog::meta;

use crate::commands::{parse_mention, Command, Invocation};
use crate::config::BotConfig;
use crate::db::schema::Meeting;
use crate::db::store::MeetingStore;
use crate::event::{Event, Mention, Submission, ThreadEvent};
use crate::meeting::{LifecycleError, Outcome, Response, Scheduler, Summary};
use crate::reply::{poll_form, status_text, Reply};
use crate::runtime::get_logger;

/// Decides what each inbound event does to the meeting lifecycle and which
/// reply goes back.
pub struct BotHandler<S> {
    scheduler: Scheduler<S>,
    config: BotConfig,
}

impl<S: MeetingStore> BotHandler<S> {
    pub fn new(store: S, config: BotConfig) -> Self {
        Self {
            scheduler: Scheduler::new(store),
            config,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub async fn handle(&self, event: Event, today: NaiveDate) -> anyhow::Result<Option<Reply>> {
        match event {
            Event::Mention(mention) => self.mentioned(mention, today).await.map(Some),
            Event::Submission(submission) => self.submitted(submission, today).await.map(Some),
            Event::ThreadEvent(event) => Ok(self.thread_changed(event)),
            Event::Unknown => Ok(None),
        }
    }

    async fn mentioned(&self, mention: Mention, today: NaiveDate) -> anyhow::Result<Reply> {
        let handle = &self.config.handle;

        if !mention.bot_in_thread {
            return Ok(Reply::to_all(format!(
                "Hi! I can help find times to meet. Type /add {}", handle
            )));
        }

        let invocation = parse_mention(&mention.text, handle);
        let meeting = self.scheduler.current_meeting(&mention.thread_id).await?;

        let meeting = match meeting {
            Some(v) => v,
            None => return self.mentioned_without_meeting(&mention, invocation, today).await,
        };

        match invocation {
            Invocation::Known(Command::Done) => {
                match self.scheduler.close(&meeting, today).await? {
                    Some(summary) => Ok(self.announce(&meeting, &summary)),
                    None => Ok(Reply::to_sender("That poll already closed.")),
                }
            }
            Invocation::Known(Command::Cancel) => {
                // Someone else may have closed it since it was read.
                if !self.scheduler.cancel(&meeting, &mention.sender).await? {
                    return Ok(Reply::to_sender("That poll already closed."));
                }
                Ok(Reply::to_all(format!(
                    "Canceled by {}. Type {} to start again", mention.sender.name, handle
                )))
            }
            Invocation::Known(Command::Weekday) | Invocation::Empty | Invocation::Unknown(_) => {
                self.in_progress(&meeting, today).await
            }
        }
    }

    async fn mentioned_without_meeting(&self, mention: &Mention, invocation: Invocation, today: NaiveDate) -> anyhow::Result<Reply> {
        let handle = &self.config.handle;

        match invocation {
            Invocation::Empty => Ok(Reply::to_sender(format!(
                "Type {} weekday to find a day to meet", handle
            ))),
            Invocation::Known(Command::Weekday) => {
                match self.scheduler.start(&mention.thread_id, &mention.topic, mention.human_participants).await {
                    Ok(_) => Ok(Reply::poll(poll_form(&mention.thread_id, &mention.topic, today, &self.config))),
                    Err(LifecycleError::AlreadyOpen(_)) => {
                        // Lost a race with another start for the same thread.
                        match self.scheduler.current_meeting(&mention.thread_id).await? {
                            Some(meeting) => self.in_progress(&meeting, today).await,
                            None => Ok(Reply::to_sender("Someone just started a poll here. Try again in a moment.")),
                        }
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Invocation::Known(_) | Invocation::Unknown(_) => {
                get_logger().debug("Unrecognized command.", meta! {
                    "ThreadID" => mention.thread_id,
                    "Text" => mention.text,
                });
                Ok(Reply::to_sender(format!(
                    "I only know about weekday meetings so far... Type {} weekday to find a day to meet", handle
                )))
            }
        }
    }

    async fn submitted(&self, submission: Submission, today: NaiveDate) -> anyhow::Result<Reply> {
        let meeting = match self.scheduler.latest_meeting(&submission.thread_id).await? {
            None => return Ok(Reply::to_sender("I can't find that meeting. My bad.")),
            Some(v) => v,
        };

        let response = self.scheduler
            .record_response(&meeting, &submission.user, &submission.dates, today)
            .await;

        match response {
            Ok(Response::Pending { responses, expected }) => Ok(Reply::to_sender(format!(
                "Thanks. {}/{} have responded so far", responses, expected
            ))),
            Ok(Response::Completed(summary)) => Ok(self.announce(&meeting, &summary)),
            Err(LifecycleError::Closed(id)) => {
                get_logger().info("Stale submission.", meta! {
                    "ThreadID" => submission.thread_id,
                    "MeetingID" => id,
                    "UserIdent" => submission.user.ident,
                });
                Ok(Reply::to_sender(format!(
                    "Sorry, too late! That poll already closed. Type {} weekday to start a new one", self.config.handle
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn thread_changed(&self, event: ThreadEvent) -> Option<Reply> {
        if !event.added_me {
            return None;
        }

        get_logger().info("Added to thread.", meta! {
            "ThreadID" => event.thread_id,
        });

        Some(Reply::to_sender(format!(
            "Hi! Thanks for adding me! To poll everyone for free days, type {} weekday", self.config.handle
        )))
    }

    /// Broadcasts the final result. Only the caller that closed the meeting
    /// gets here.
    fn announce(&self, meeting: &Meeting, summary: &Summary) -> Reply {
        match &summary.outcome {
            Outcome::Best { date, names, .. } => {
                get_logger().info("Result announced.", meta! {
                    "MeetingID" => meeting.id,
                    "ThreadID" => meeting.thread_id,
                    "Date" => date,
                    "Participants" => names.len(),
                });
            }
            Outcome::NoResponses | Outcome::NoDayWorks => {
                get_logger().info("Meeting closed without a day.", meta! {
                    "MeetingID" => meeting.id,
                    "ThreadID" => meeting.thread_id,
                });
            }
        }

        Reply::to_all(status_text(summary))
    }

    async fn in_progress(&self, meeting: &Meeting, today: NaiveDate) -> anyhow::Result<Reply> {
        // A poll with nobody to wait for (no people in the thread) is done
        // as soon as anyone looks at it.
        if self.scheduler.is_complete(meeting).await? {
            if let Some(summary) = self.scheduler.close(meeting, today).await? {
                return Ok(self.announce(meeting, &summary));
            }
        }

        let summary = self.scheduler.status(meeting, today).await?;

        Ok(Reply::to_sender(format!(
            "{}/{} have responded. {}. Type {} done or nevermind to announce result or stop poll",
            summary.responses, summary.expected, status_text(&summary), self.config.handle
        )))
    }
}
