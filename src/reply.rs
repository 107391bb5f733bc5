//! Outbound reply payloads and the text the bot answers with.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::config::BotConfig;
use crate::meeting::{Outcome, Summary};
use crate::support::names::{is_are, join_names};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyMessage {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSelect {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub label: String,
    pub multiple: bool,
    pub options: Vec<DateOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormItem {
    pub select: DateSelect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub action: &'static str,
    pub thread_id: String,
    pub label: String,
    pub items: Vec<FormItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<ReplyMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<Form>,
    /// Broadcast to the whole thread rather than only the sender.
    pub all_participants: bool,
}

impl Reply {
    pub fn to_sender<S: Into<String>>(text: S) -> Self {
        Self {
            message: Some(ReplyMessage { text: text.into() }),
            form: None,
            all_participants: false,
        }
    }

    pub fn to_all<S: Into<String>>(text: S) -> Self {
        Self {
            all_participants: true,
            ..Self::to_sender(text)
        }
    }

    pub fn poll(form: Form) -> Self {
        Self {
            message: None,
            form: Some(form),
            all_participants: true,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.text.as_str())
    }
}

/// Dates offered in the picker: `poll_days` calendar days from `today`,
/// skipping weekends when configured.
pub fn date_options(today: NaiveDate, config: &BotConfig) -> Vec<DateOption> {
    (0..config.poll_days as i64)
        .map(|i| today + Duration::days(i))
        .filter(|d| !config.weekdays_only || !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|d| DateOption {
            value: d.format("%Y-%m-%d").to_string(),
            label: d.format("%a %-m/%-d").to_string(),
        })
        .collect()
}

pub fn poll_form(thread_id: &str, topic: &str, today: NaiveDate, config: &BotConfig) -> Form {
    Form {
        action: "meeting",
        thread_id: thread_id.to_owned(),
        label: format!("Finding a day for \"{}\"", topic),
        items: vec![FormItem {
            select: DateSelect {
                kind: "DATE",
                label: "What days work for you?".to_owned(),
                multiple: true,
                options: date_options(today, config),
            },
        }],
    }
}

/// One line describing where a meeting stands.
pub fn status_text(summary: &Summary) -> String {
    let so_far = if summary.closed { "" } else { " so far" };

    match &summary.outcome {
        Outcome::NoResponses => "No one has responded yet".to_owned(),
        Outcome::NoDayWorks => format!("No upcoming day works{}", so_far),
        Outcome::Best { label, names, everyone, .. } => {
            let who = if *everyone && names.len() > 1 {
                "Everyone is".to_owned()
            } else {
                format!("{} {}", join_names(names), is_are(names.len()))
            };
            format!("{} is best{}. {} free", label, so_far, who)
        }
    }
}
