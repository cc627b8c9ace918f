// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::{Args, ValueEnum};
use miette::{GraphicalTheme, MietteHandlerOpts};
use owo_colors::{OwoColorize, Style, style};
use std::{env::VarError, fmt};
use testsieve_metadata::MismatchReason;
use testsieve_runner::selector::SelectedTests;
use tracing::{Event, Level, Subscriber, level_filters::LevelFilter, warn};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Log lines with this target are printed without an `error:`/`warning:` heading.
pub(crate) const NO_HEADING_TARGET: &str = "testsieve::no_heading";

/// The environment variable holding the log filter, e.g. `debug` or `testsieve_runner=debug`.
const LOG_ENV: &str = "TESTSIEVE_LOG";

#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub(crate) struct OutputOpts {
    /// Verbose output
    #[arg(long, short, global = true, env = "TESTSIEVE_VERBOSE")]
    pub(crate) verbose: bool,

    /// Produce color output: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        global = true,
        value_name = "WHEN",
        env = "TESTSIEVE_COLOR"
    )]
    pub(crate) color: Color,
}

impl OutputOpts {
    pub(crate) fn init(self) -> OutputContext {
        let OutputOpts { verbose, color } = self;
        init_logging(color, std::env::var(LOG_ENV));
        OutputContext { verbose, color }
    }
}

/// Output settings, resolved once logging is initialized.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    pub(crate) verbose: bool,
    pub(crate) color: Color,
}

impl OutputContext {
    /// Returns styles for messages printed to stderr.
    pub fn stderr_styles(&self) -> StderrStyles {
        let mut styles = StderrStyles::default();
        if self.color.should_colorize(supports_color::Stream::Stderr) {
            styles.colorize();
        }
        styles
    }
}

/// When to produce color output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[must_use]
pub enum Color {
    /// Colorize if the stream supports it.
    #[default]
    Auto,
    /// Always colorize.
    Always,
    /// Never colorize.
    Never,
}

impl Color {
    pub(crate) fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

static INIT_LOGGER: std::sync::Once = std::sync::Once::new();

fn init_logging(color: Color, log_env: Result<String, VarError>) {
    let colorize = color.should_colorize(supports_color::Stream::Stderr);

    INIT_LOGGER.call_once(|| {
        let (targets, invalid) = log_targets(log_env);

        let mut styles = HeadingStyles::default();
        if colorize {
            styles.colorize();
        }
        let layer = tracing_subscriber::fmt::layer()
            .event_format(HeadingFormatter { styles })
            .with_writer(std::io::stderr)
            .with_filter(targets);
        tracing_subscriber::registry().with(layer).init();

        if let Some(invalid) = invalid {
            warn!("ignoring {LOG_ENV}: {invalid}");
        }

        install_miette_hook(colorize);
    });
}

/// Parses the log filter, returning the default `info` filter and the reason if it is invalid.
fn log_targets(log_env: Result<String, VarError>) -> (Targets, Option<String>) {
    let default = || Targets::new().with_default(LevelFilter::INFO);
    match log_env {
        Ok(value) if value.is_empty() => (default(), None),
        Ok(value) => match value.parse::<Targets>() {
            Ok(targets) => (targets, None),
            Err(err) => (default(), Some(format!("invalid filter `{value}`: {err}"))),
        },
        Err(VarError::NotPresent) => (default(), None),
        Err(VarError::NotUnicode(_)) => (default(), Some("value is not valid UTF-8".to_owned())),
    }
}

fn install_miette_hook(colorize: bool) {
    let unicode = supports_unicode::on(supports_unicode::Stream::Stderr);
    // Only fails if a hook was already installed.
    let _ = miette::set_hook(Box::new(move |_| {
        let mut theme = match (colorize, unicode) {
            (true, true) => GraphicalTheme::unicode(),
            (true, false) => GraphicalTheme::ascii(),
            (false, true) => GraphicalTheme::unicode_nocolor(),
            (false, false) => GraphicalTheme::none(),
        };
        // Match the heading printed by the log formatter.
        theme.characters.error = "error:".into();
        Box::new(MietteHandlerOpts::new().graphical_theme(theme).build())
    }));
}

/// Prints `error: `, `warning: ` and similar headings before log messages.
///
/// Info messages are printed as is: they're the normal chatter of a run.
struct HeadingFormatter {
    styles: HeadingStyles,
}

impl<S, N> FormatEvent<S, N> for HeadingFormatter
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
        let metadata = event.metadata();
        if metadata.target() != NO_HEADING_TARGET
            && let Some((heading, style)) = self.styles.heading(*metadata.level())
        {
            write!(writer, "{}: ", heading.style(style))?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[derive(Debug, Default)]
struct HeadingStyles {
    error: Style,
    warning: Style,
    debug: Style,
}

impl HeadingStyles {
    fn colorize(&mut self) {
        self.error = style().red().bold();
        self.warning = style().yellow().bold();
        self.debug = style().dimmed();
    }

    fn heading(&self, level: Level) -> Option<(&'static str, Style)> {
        match level {
            Level::ERROR => Some(("error", self.error)),
            Level::WARN => Some(("warning", self.warning)),
            Level::INFO => None,
            Level::DEBUG => Some(("debug", self.debug)),
            Level::TRACE => Some(("trace", self.debug)),
        }
    }
}

/// Styles for messages printed to stderr.
#[derive(Debug, Default)]
pub struct StderrStyles {
    pub(crate) bold: Style,
    pub(crate) selected: Style,
    pub(crate) skipped: Style,
}

impl StderrStyles {
    fn colorize(&mut self) {
        self.bold = style().bold();
        self.selected = style().green().bold();
        self.skipped = style().yellow().bold();
    }
}

/// Formats the one-line summary printed to stderr after a selection, e.g.
/// `selected 3 of 7 tests (2 blocklisted, 2 not in allowlist)`.
pub(crate) fn selection_summary(selected: &SelectedTests<'_>, styles: &StderrStyles) -> String {
    let mut blocklisted = 0;
    let mut not_allowlisted = 0;
    for (_, reason) in selected.skipped() {
        match reason {
            MismatchReason::Blocklisted => blocklisted += 1,
            MismatchReason::NotAllowlisted => not_allowlisted += 1,
            _ => {}
        }
    }

    let total = selected.selected_count() + selected.skipped_count();
    let noun = if total == 1 { "test" } else { "tests" };
    let line = format!(
        "selected {} of {total} {noun}",
        selected.selected_count().style(styles.selected),
    );

    let mut reasons = Vec::new();
    if blocklisted > 0 {
        let count = blocklisted.style(styles.skipped);
        reasons.push(format!("{count} blocklisted"));
    }
    if not_allowlisted > 0 {
        let count = not_allowlisted.style(styles.skipped);
        reasons.push(format!("{count} not in allowlist"));
    }
    if reasons.is_empty() {
        line
    } else {
        format!("{line} ({})", reasons.join(", "))
    }
}
