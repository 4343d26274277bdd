use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Directive, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Builds the log filter from a `RUST_LOG` value. Unset or unparsable values
/// log at INFO.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    let info: Directive = LevelFilter::INFO.into();
    match rust_log.map(EnvFilter::try_new) {
        Some(Ok(filter)) => filter,
        Some(Err(err)) => {
            eprintln!("Ignoring {} ({err}), logging at INFO", EnvFilter::DEFAULT_ENV);
            EnvFilter::default().add_directive(info)
        }
        None => EnvFilter::default().add_directive(info),
    }
}

/// Sends logs to stderr, filtered by `RUST_LOG`.
pub fn init_logger() -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(rust_log.as_deref()))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("parcel_access=loud")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }

    #[test]
    fn test_filter_honours_rust_log() {
        assert_eq!(
            log_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }
}
