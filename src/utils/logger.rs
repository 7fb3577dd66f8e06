use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins; otherwise our own events at `level` and sqlx only when
/// a statement is slow.
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("invoices_etl={},sqlx=warn,info", level)))
}

pub fn init_cli_logger(verbose: bool) {
    let filter = default_filter(if verbose { "debug" } else { "info" });

    // compact 格式會在訊息前列出 job{kind=...} span
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(default_filter("info"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .with_span_list(false), // 只保留目前的 job span，方便日誌系統依 kind 分類
        )
        .init();
}
