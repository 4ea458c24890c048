use tracing::Level;
use tracing_subscriber::FmtSubscriber;

// Initializer for logger; `verbosity` is -q (negative) / -v (positive) count
pub fn init(verbosity: i8) -> anyhow::Result<()> {
    let level = match verbosity {
        i8::MIN..=-1 => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("failed to set up the global logger: {e}"))
}
