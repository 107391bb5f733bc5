use evlog::Logger;
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<Logger> = OnceCell::new();

pub fn set_logger(logger: Logger) {
    if LOGGER.set(logger).is_err() {
        panic!("logger was already initialized");
    }
}

/// The process logger; falls back to a bare logger when `set_logger` was
/// never called, as in unit tests.
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(Logger::default)
}
