use std::sync::Arc;

use evlog::{LogEventConsolePrinter, Logger, meta};

use crate::config::Config;
use crate::db::dbclient::DBClient;
use crate::handler::BotHandler;
use crate::runtime::{get_logger, set_logger};

mod commands;
mod config;
mod db;
mod event;
mod handler;
mod meeting;
mod reply;
mod runtime;
mod server;
mod support;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let mut logger = Logger::default();
    logger.register(LogEventConsolePrinter::default());
    set_logger(logger);

    let config = Config::from_env().expect("invalid configuration");

    let db_client = DBClient::new(&config.database_url).await
        .expect("failed to connect to database");

    let handler = Arc::new(BotHandler::new(db_client, config.bot.clone()));
    let app = server::build_router(handler);

    let listener = tokio::net::TcpListener::bind(config.bind).await
        .unwrap_or_else(|e| {
            get_logger().error_with_err("Failed to bind listener.", &e, None);
            panic!("{}", e)
        });

    get_logger().info("Listening for invocations.", meta! {
        "Address" => config.bind,
        "Handle" => config.bot.handle,
    });

    if let Err(e) = axum::serve(listener, app).await {
        get_logger().error_with_err("Server error.", e, None);
    }
}
