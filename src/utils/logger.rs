use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter_for(level: &str, verbose: bool) -> EnvFilter {
    let default = if verbose {
        "f1bet=debug,tower_http=debug,info".to_string()
    } else {
        format!("f1bet={},tower_http=info", level)
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

// 結構化輸出，方便集中收集
fn json_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true),
    )
}

fn compact_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact(),
    )
}

pub fn init_logger(level: &str, json: bool, verbose: bool) {
    let filter = filter_for(level, verbose);

    if json {
        json_subscriber(filter).init();
    } else {
        compact_subscriber(filter).init();
    }
}
