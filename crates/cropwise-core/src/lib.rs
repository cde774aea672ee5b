pub mod app;
pub mod config;
pub mod error;

pub use app::{Advice, App};
pub use config::{Config, ValidationResult};
pub use error::{AppError, ConfigError};

use anyhow::Result;

/// Initialize logging to stderr, keeping stdout for command output.
/// `RUST_LOG` overrides the default `info` level.
pub fn init() -> Result<()> {
    init_with_writer(std::io::stderr)
}

pub fn init_with_writer<W>(writer: W) -> Result<()>
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Cropwise core initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'w> MakeWriter<'w> for Captured {
        type Writer = Captured;

        fn make_writer(&'w self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_logs_go_to_configured_writer() {
        let captured = Captured::default();
        init_with_writer(captured.clone()).unwrap();

        tracing::warn!("reference table reloaded");

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("reference table reloaded"));
    }
}
