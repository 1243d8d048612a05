use {
    crate::config::Config,
    std::io::IsTerminal,
    time::macros::format_description,
    tracing::{Level, Metadata},
    tracing_subscriber::{
        EnvFilter,
        Layer,
        fmt::{time::UtcTime, writer::MakeWriterExt},
        prelude::*,
        util::SubscriberInitExt,
    },
};

/// Initializes the global tracing subscriber and installs the panic hook.
/// `env_filter` has similar syntax to env_logger. It is documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn initialize(config: &Config) {
    set_tracing_subscriber(config);
    crate::panic_hook::install();
}

/// Whether an event at `level` is written to stderr rather than stdout.
fn goes_to_stderr(stderr_threshold: Option<Level>, level: &Level) -> bool {
    // More verbose levels compare greater, `ERROR` is the smallest.
    stderr_threshold.is_some_and(|threshold| *level <= threshold)
}

fn set_tracing_subscriber(config: &Config) {
    // The JSON and text layers have different types so the shared part of the
    // setup lives in a macro.
    macro_rules! fmt_layer {
        ($stderr_threshold:expr) => {{
            let stderr_threshold = $stderr_threshold;
            tracing_subscriber::fmt::layer()
                .with_writer(
                    MakeWriterExt::with_filter(std::io::stderr, move |meta: &Metadata<'_>| {
                        goes_to_stderr(stderr_threshold, meta.level())
                    })
                    .or_else(std::io::stdout),
                )
                .with_timer(UtcTime::new(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
                )))
        }};
    }

    let env_filter = EnvFilter::new(&config.env_filter);

    if config.use_json_format {
        tracing_subscriber::registry()
            .with(
                fmt_layer!(config.stderr_threshold)
                    .json()
                    .with_filter(env_filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt_layer!(config.stderr_threshold)
                    .with_ansi(std::io::stdout().is_terminal())
                    .with_filter(env_filter),
            )
            .init();
    }
    tracing::debug!(json = config.use_json_format, "initialized logging");
}
