use slog;
use slog_async;
use slog_term;

/// Root logger writing to the terminal.
///
/// Everything else in the engine takes a `parent_log` and
/// derives its own child logger from it.
pub fn terminal_logger() -> slog::Logger {
    use slog::Drain;

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    slog::Logger::root(drain, o!("dftd_version" => env!("CARGO_PKG_VERSION")))
}

/// Root logger that throws everything away; for tests and tools
/// that want to stay quiet.
pub fn discard_logger() -> slog::Logger {
    let drain = slog::Discard;
    slog::Logger::root(drain, o!("dftd_version" => env!("CARGO_PKG_VERSION")))
}
