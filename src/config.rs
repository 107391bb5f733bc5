use std::env;
use std::net::SocketAddr;

use anyhow::Context;

const DEFAULT_PORT: u16 = 5000;

/// Settings read from `SCHED_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind: SocketAddr,
    pub bot: BotConfig,
}

/// The parts of the configuration the dispatcher needs.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Literal mention handle, e.g. `@sched`.
    pub handle: String,
    /// Number of calendar days offered in the date picker, starting today.
    pub poll_days: u32,
    pub weekdays_only: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            handle: "@sched".to_owned(),
            poll_days: 7,
            weekdays_only: true,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("SCHED_DATABASE_URL").context("expected SCHED_DATABASE_URL")?;

        let bind = match env::var("SCHED_BIND") {
            Ok(v) => v.parse::<SocketAddr>().with_context(|| format!("SCHED_BIND '{}' is not a socket address", v))?,
            Err(_) => {
                let port = match env::var("PORT") {
                    Ok(v) => v.parse::<u16>().with_context(|| format!("PORT '{}' is invalid", v))?,
                    Err(_) => DEFAULT_PORT,
                };
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let defaults = BotConfig::default();

        let handle = env::var("SCHED_HANDLE").unwrap_or(defaults.handle);
        if handle.trim().is_empty() {
            anyhow::bail!("SCHED_HANDLE must not be empty");
        }

        let poll_days = match env::var("SCHED_POLL_DAYS") {
            Ok(v) => v.parse::<u32>().with_context(|| format!("SCHED_POLL_DAYS '{}' is invalid", v))?,
            Err(_) => defaults.poll_days,
        };
        if poll_days == 0 || poll_days > 31 {
            anyhow::bail!("SCHED_POLL_DAYS must be between 1 and 31; got {}", poll_days);
        }

        let weekdays_only = match env::var("SCHED_WEEKDAYS_ONLY") {
            Ok(v) => parse_bool(&v).with_context(|| format!("SCHED_WEEKDAYS_ONLY '{}' is invalid", v))?,
            Err(_) => defaults.weekdays_only,
        };

        Ok(Self {
            database_url,
            bind,
            bot: BotConfig {
                handle: handle.trim().to_owned(),
                poll_days,
                weekdays_only,
            },
        })
    }
}

fn parse_bool(v: &str) -> anyhow::Result<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::Error::msg("expected true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_bool;

    #[test]
    fn parses_bool_spellings() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool(" yes ").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}
