use std::process::ExitCode;

use env_logger::{Builder, Env};
use log::error;

fn main() -> ExitCode {
    // RUST_LOG управляет уровнем (дефолт — info); микросекундные метки
    // времени, чтобы в debug-выводе была видна латентность запросов.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    match ChronoDB::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Печатаем всю цепочку контекстов (open → mmap → заголовок).
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
