//! Process setup: `.env` loading and tracing subscribers.

/// Loads `.env` from the working directory, else from its parent (the workspace root when
/// started from the crate directory).
pub fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        return;
    }
    let parent_env = std::env::current_dir()
        .ok()
        .and_then(|cwd| cwd.parent().map(|p| p.join(".env")))
        .filter(|p| p.is_file());
    if let Some(path) = parent_env {
        let _ = dotenv::from_path(path);
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("info,unitflow_server=debug,unitflow=debug")
    })
}

/// Logs to stdout, filtered by `RUST_LOG` (default `info,unitflow_server=debug`,
/// `unitflow=debug` for engine events). When `LOG_FILE` is set, the same events are also
/// appended there as plain text.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(env_filter());
    let registry = tracing_subscriber::registry().with(stdout_layer);

    match std::env::var("LOG_FILE") {
        Ok(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_filter(env_filter());
            registry.with(file_layer).try_init()?;
            tracing::info!(path = %path, "logging to file");
        }
        Err(_) => registry.try_init()?,
    }
    Ok(())
}
