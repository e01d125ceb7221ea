use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use colored::*;
use indicatif::ProgressStyle;
use scopr_common::log::{PRINT_TARGET, SUCCESS_TARGET};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{self as fmt_layer, FmtContext, FormatEvent};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub const LOG_FILE: &str = "scopr.log";

const PRINT_FIELD: &str = "raw_msg";

pub struct ScoprFormatter;

impl<S, N> FormatEvent<S, N> for ScoprFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() == PRINT_TARGET {
            let mut raw = RawMessage::default();
            event.record(&mut raw);
            return writeln!(writer, "{}", raw.0);
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            if meta.target() == SUCCESS_TARGET {
                ("[+]", |s| s.green().bold())
            } else {
                match *meta.level() {
                    Level::TRACE => ("[ ]", |s| s.dimmed()),
                    Level::DEBUG => ("[?]", |s| s.blue()),
                    Level::INFO => ("[>]", |s| s.bright_black()),
                    Level::WARN => ("[*]", |s| s.yellow().bold()),
                    Level::ERROR => ("[-]", |s| s.red().bold()),
                }
            };

        write!(writer, "{} ", color_func(symbol.into()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[derive(Default)]
struct RawMessage(String);

impl Visit for RawMessage {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == PRINT_FIELD {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == PRINT_FIELD {
            self.0 = format!("{value:?}");
        }
    }
}

/// Default filter when `RUST_LOG` is unset.
fn default_directive(verbose: u8, quiet: u8) -> String {
    const CRATES: [&str; 3] = ["scopr_cli", "scopr_core", "scopr_common"];

    if quiet > 0 {
        return format!("warn,{PRINT_TARGET}=info");
    }
    let level = match verbose {
        0 => return "info".to_string(),
        1 => "debug",
        _ => "trace",
    };
    let mut directive = String::from("info");
    for krate in CRATES {
        directive.push_str(&format!(",{krate}={level}"));
    }
    directive
}

/// Installs the global subscriber: symbol-prefixed console output that keeps
/// clear of span spinners, plus a plain copy of every log line in `log_file`.
pub fn init_logging(verbose: u8, quiet: u8, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let spinner_style = ProgressStyle::with_template("{spinner:.blue} {span_name} {msg}")?
        .tick_strings(&["▁▁▁", "▁▂▁", "▂▄▂", "▄▆▄", "▆█▆", "▄▆▄", "▂▄▂", "▁▂▁"]);
    let indicatif_layer = IndicatifLayer::new().with_progress_style(spinner_style);

    let console_layer = fmt_layer::layer()
        .event_format(ScoprFormatter)
        .with_writer(indicatif_layer.get_stderr_writer());

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            let layer = fmt_layer::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file))
                .with_filter(filter_fn(|meta| meta.target() != PRINT_TARGET));
            Some(layer)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .with(indicatif_layer)
        .try_init()
        .context("installing the log subscriber")?;

    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
