//! Test-only helpers: a process-wide tracing subscriber and readable panics.
//!
//! Call [`setup`] at the top of a test, or annotate it with
//! `#[weft_testhelpers::test]`. The `WEFT_LOG` environment variable takes a
//! target filter such as `weft_core=debug,weft_json=trace`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use weft_testhelpers_macros::test;

use std::sync::LazyLock;
use std::time::Instant;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Frames from the harness and the panic machinery.
const NOISE: &[&str] = &[
    "test::run_test",
    "test::__rust_begin_short_backtrace",
    "std::panicking::",
    "std::panic::",
    "core::panicking::",
    "std::sys::",
    "std::thread::Builder::spawn_unchecked_",
    "core::ops::function::FnOnce::call_once",
    "tokio::runtime::",
    "__pthread",
];

struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let _ = *START_TIME;

    color_backtrace::BacktracePrinter::new()
        .verbosity(color_backtrace::Verbosity::Full)
        .add_frame_filter(Box::new(|frames| {
            frames.retain(|frame| match &frame.name {
                Some(name) => !NOISE.iter().any(|prefix| name.starts_with(prefix)),
                None => true,
            })
        }))
        .install(Box::new(termcolor::StandardStream::stderr(
            termcolor::ColorChoice::Auto,
        )));

    let filter = std::env::var("WEFT_LOG")
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(tracing::Level::DEBUG));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_timer(Uptime)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .ok();
});

/// Installs the tracing subscriber and panic printer once per process.
///
/// Safe to call from every test; only the first call does anything.
pub fn setup() {
    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}
