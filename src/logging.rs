//! Logger setup and component-scoped log handles.
//!
//! Log records go through the `log` facade. Instead of sharing one implicit
//! logger, every component receives a [`Logger`] handle at construction time.
//! The handle carries the component's name as the record target, so the
//! output of e.g. the disk cache reads as `[genrify::Cache]` and can be
//! filtered with `RUST_LOG=genrify::Cache=debug`.

use std::{io::Write, sync::Arc};

use log::LevelFilter;

/// Root target shared by every component logger.
pub const ROOT: &str = "genrify";

/// A cheap, cloneable handle naming the component that emits a record.
#[derive(Debug, Clone)]
pub struct Logger {
    target: Arc<str>,
}

impl Logger {
    /// Creates a logger named after the crate.
    pub fn root() -> Self {
        Self {
            target: Arc::from(ROOT),
        }
    }

    /// Derives a child logger, e.g. `genrify` -> `genrify::Cache`.
    pub fn sub(&self, name: &str) -> Self {
        Self {
            target: Arc::from(format!("{}::{}", self.target, name)),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::root()
    }
}

/// Installs the global `env_logger` backend.
///
/// Records of this crate are shown from `info` upwards (`debug` when
/// `verbose` is set), dependencies only from `warn`. `RUST_LOG` overrides
/// both. Each line looks like:
///
/// ```text
/// 2024.05.01 12:00:00:123	DEBUG	[genrify::SpotifyClient]	GET /me/tracks?limit=50
/// ```
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module(ROOT, level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{}\t{}\t[{}]\t{}",
                chrono::Local::now().format("%Y.%m.%d %H:%M:%S:%3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}
