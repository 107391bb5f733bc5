//! Inbound bot invocations as the chat platform posts them, and their
//! classification into the events the bot reacts to.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::db::schema::Participant;

pub const ADDED: &str = "ADDED";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub ident: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreadParticipant {
    pub user: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Thread {
    pub thread_id: String,
    pub topic: String,
    pub participants: Vec<ThreadParticipant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Message {
    pub text: String,
    pub sender: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MentionPayload {
    pub thread: Thread,
    pub message: Message,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormSelect {
    pub options: Vec<FormOption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormItem {
    pub select: FormSelect,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmittedForm {
    pub thread_id: String,
    pub items: Vec<FormItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub user: User,
    pub form: SubmittedForm,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreadChange {
    #[serde(rename = "type")]
    pub kind: String,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Delivery {
    pub thread: Thread,
    pub event: ThreadChange,
}

/// One webhook request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BotInvocation {
    pub bot: User,
    pub mention: Option<MentionPayload>,
    pub submission: Option<SubmissionPayload>,
    pub delivery: Option<Delivery>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub thread_id: String,
    pub topic: String,
    pub sender: Participant,
    pub text: String,
    /// Whether the bot itself is a member of the thread.
    pub bot_in_thread: bool,
    /// Thread members that are people rather than bots.
    pub human_participants: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub thread_id: String,
    pub user: Participant,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadEvent {
    pub thread_id: String,
    /// The bot is one of the users just added.
    pub added_me: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Mention(Mention),
    Submission(Submission),
    ThreadEvent(ThreadEvent),
    Unknown,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field: {0}")]
    Missing(&'static str),
    #[error("invalid date '{0}'; expected YYYY-MM-DD")]
    Date(String),
}

impl User {
    fn participant(&self) -> Participant {
        Participant {
            ident: self.ident.clone(),
            name: self.name.clone(),
        }
    }
}

impl BotInvocation {
    pub fn parse(body: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn classify(self) -> Result<Event, PayloadError> {
        let bot = self.bot;

        if let Some(mention) = self.mention {
            if mention.thread.thread_id.is_empty() {
                return Err(PayloadError::Missing("mention.thread.threadId"));
            }

            let bot_in_thread = mention.thread.participants.iter().any(|p| p.user.ident == bot.ident);
            let human_participants = mention.thread.participants.iter()
                .filter(|p| p.user.ident.starts_with("user:"))
                .count() as i32;

            return Ok(Event::Mention(Mention {
                thread_id: mention.thread.thread_id,
                topic: mention.thread.topic,
                sender: mention.message.sender.participant(),
                text: mention.message.text,
                bot_in_thread,
                human_participants,
            }));
        }

        if let Some(submission) = self.submission {
            if submission.form.thread_id.is_empty() {
                return Err(PayloadError::Missing("submission.form.threadId"));
            }
            if submission.user.ident.is_empty() {
                return Err(PayloadError::Missing("submission.user.ident"));
            }

            let item = match submission.form.items.first() {
                None => return Err(PayloadError::Missing("submission.form.items")),
                Some(v) => v,
            };

            let mut dates = Vec::new();
            for opt in item.select.options.iter().filter(|o| o.selected) {
                match NaiveDate::parse_from_str(&opt.value, "%Y-%m-%d") {
                    Ok(v) => dates.push(v),
                    Err(_) => return Err(PayloadError::Date(opt.value.clone())),
                }
            }

            return Ok(Event::Submission(Submission {
                thread_id: submission.form.thread_id,
                user: submission.user.participant(),
                dates,
            }));
        }

        if let Some(delivery) = self.delivery {
            if delivery.event.kind == ADDED {
                return Ok(Event::ThreadEvent(ThreadEvent {
                    added_me: delivery.event.users.iter().any(|u| u.ident == bot.ident),
                    thread_id: delivery.thread.thread_id,
                }));
            }
        }

        Ok(Event::Unknown)
    }
}
