//! Tracing installation and panic forwarding.
//!
//! Library code only emits `tracing` events. Hosts that do not install their
//! own subscriber can call [`install_tracing`] to get a console subscriber
//! filtered by `RUST_LOG`, and [`install_panic_hook`] to route panics through
//! the same pipeline.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, PanicHookInfo};
use std::sync::Once;
use std::thread;

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";
const MAX_PANIC_LINES: usize = 8;
const PANIC_TARGET: &str = "brook::panic";

static PANIC_HOOK_INSTALLED: Once = Once::new();
static TRACING_INSTALLED: Once = Once::new();

/// Installs a console subscriber (idempotent).
///
/// The filter is read from `RUST_LOG` and defaults to `info`. If another
/// global subscriber is already set, this does nothing.
pub fn install_tracing() {
    TRACING_INSTALLED.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let console = fmt::layer()
            .event_format(PanicAwareFormatter)
            .with_writer(std::io::stderr)
            .with_filter(filter);

        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("a global subscriber was already installed");
        }
    });
}

/// Forwards panics to `tracing::error!` before running the previous hook
/// (idempotent).
pub fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            forward_panic(info);
            previous(info);
        }));
    });
}

fn forward_panic(info: &PanicHookInfo<'_>) {
    let message = panic_message(info.payload());
    let thread_name = thread::current().name().unwrap_or("unnamed").to_string();
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_default();
    let backtrace = Backtrace::force_capture().to_string();

    tracing::error!(
        target: PANIC_TARGET,
        message = %message,
        thread = %thread_name,
        location = %location,
        backtrace = %backtrace
    );
}

/// Extracts the message of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

// ============================================================================
// Console Output Formatter
// ============================================================================

#[derive(Clone, Copy, Default)]
struct PanicAwareFormatter;

impl<S, N> FormatEvent<S, N> for PanicAwareFormatter
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let target = event.metadata().target();

        if target == PANIC_TARGET {
            // Render panic with truncated backtrace
            let mut visitor = PanicFieldVisitor::default();
            event.record(&mut visitor);

            let msg = visitor.message.as_deref().unwrap_or("panic");
            write!(writer, "PANIC: {msg}")?;
            if let Some(location) = visitor.location.as_deref() {
                write!(writer, " at {location}")?;
            }

            if let Some(bt) = visitor.backtrace.as_deref() {
                writeln!(writer)?;
                write!(writer, "Stack:")?;
                for line in bt.lines().take(MAX_PANIC_LINES) {
                    write!(writer, "\n  {line}")?;
                }
                if bt.lines().count() > MAX_PANIC_LINES {
                    write!(writer, "\n  ... (truncated)")?;
                }
            }
            writeln!(writer)
        } else {
            let level = event.metadata().level();
            write!(writer, "{level} {target}: ")?;
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            writeln!(writer)
        }
    }
}

#[derive(Default)]
struct PanicFieldVisitor {
    message: Option<String>,
    location: Option<String>,
    backtrace: Option<String>,
}

impl tracing::field::Visit for PanicFieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let value = format!("{value:?}");
        match field.name() {
            "message" => self.message = Some(value),
            "location" => self.location = Some(value),
            "backtrace" => self.backtrace = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        let value = Some(value.to_string());
        match field.name() {
            "message" => self.message = value,
            "location" => self.location = value,
            "backtrace" => self.backtrace = value,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_messages_are_extracted() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "Unknown panic");
    }

    #[test]
    fn installers_are_idempotent() {
        install_tracing();
        install_tracing();
        install_panic_hook();
        install_panic_hook();
    }
}
