//! Line formatter for miner logs.
//!
//! Text lines follow the Python SDK's `bt.logging` layout, with the level
//! centred in its column:
//!
//! ```text
//! 2024-01-15 10:30:45.123 |   INFO   | Connected to subtensor network: finney
//! 2024-01-15 10:30:45.480 |  DEBUG   | nova_miner::chain: Connecting to subtensor
//! ```
//!
//! Events from the miner itself carry no target prefix; events from library
//! modules are prefixed with their module path.

use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

use super::LOG_TARGET;

const LEVEL_WIDTH: usize = 8;

/// Layout of one log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// `timestamp | LEVEL | message`
    Timestamped,
    /// `[LEVEL] message`
    Compact,
}

/// Event formatter for the text and compact log formats.
#[derive(Debug, Clone, Copy)]
pub struct MinerFormatter {
    style: LineStyle,
}

impl MinerFormatter {
    pub fn new(style: LineStyle) -> Self {
        Self { style }
    }

    pub fn timestamped() -> Self {
        Self::new(LineStyle::Timestamped)
    }

    pub fn compact() -> Self {
        Self::new(LineStyle::Compact)
    }
}

impl<S, N> FormatEvent<S, N> for MinerFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        match self.style {
            LineStyle::Timestamped => write!(
                writer,
                "{} | {:^width$} | ",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                meta.level().as_str(),
                width = LEVEL_WIDTH
            )?,
            LineStyle::Compact => write!(writer, "[{}] ", meta.level())?,
        }

        if meta.target() != LOG_TARGET {
            write!(writer, "{}: ", meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
