// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts, selection_summary},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use testsieve_metadata::TestSieveExitCode;
use testsieve_runner::{
    config::{DefaultConfigWarnings, FilterConfig},
    selector::TestSelector,
    test_list::{OutputFormat, SerializableFormat, read_test_list},
};
use tracing::info;

/// Select tests using declarative allowlist and blocklist rules.
#[derive(Debug, Parser)]
#[command(version, max_term_width = 100)]
pub struct TestSieveApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl TestSieveApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, writing results to `stdout`.
    pub fn exec(self, output: OutputContext, stdout: &mut dyn Write) -> Result<i32> {
        self.command.exec(output, stdout)
    }
}

#[derive(Debug, Args)]
struct ConfigOpts {
    /// Filter config file (TOML, or JSON if the extension is .json)
    #[arg(long, short = 'c', value_name = "PATH", env = "TESTSIEVE_CONFIG")]
    config: Utf8PathBuf,
}

impl ConfigOpts {
    fn make_config(&self) -> Result<FilterConfig> {
        Ok(FilterConfig::from_path(
            self.config.clone(),
            &mut DefaultConfigWarnings,
        )?)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a filter config for errors
    ///
    /// Every rule is validated, but files referenced by rules are not read.
    Validate {
        #[clap(flatten)]
        config_opts: ConfigOpts,
    },

    /// Select tests from a list
    ///
    /// Reads a JSON list of tests and prints the ones selected by the filter config. Use
    /// --message-format json to get machine-readable output.
    Select {
        #[clap(flatten)]
        config_opts: ConfigOpts,

        /// JSON file listing the tests to select from
        #[arg(long, value_name = "PATH")]
        tests: Utf8PathBuf,

        /// Output format
        #[arg(
            short = 'T',
            long,
            value_enum,
            default_value_t,
            help_heading = "OUTPUT OPTIONS",
            value_name = "FMT"
        )]
        message_format: MessageFormatOpts,

        /// Exit with a non-zero code if no tests are selected
        #[arg(long)]
        fail_if_empty: bool,
    },

    /// Print a filter config as JSON, after parsing and validation
    ShowConfig {
        #[clap(flatten)]
        config_opts: ConfigOpts,
    },
}

impl Command {
    fn exec(self, output: OutputContext, stdout: &mut dyn Write) -> Result<i32> {
        match self {
            Self::Validate { config_opts } => {
                let config = config_opts.make_config()?;
                let spec = config.specification();
                writeln!(
                    stdout,
                    "{}: {} allowlist and {} blocklist rules are valid",
                    config.config_file(),
                    spec.allowlist.len(),
                    spec.blocklist.len(),
                )
                .and_then(|()| stdout.flush())
                .map_err(|err| ExpectedError::WriteOutputError { err })?;
            }
            Self::Select {
                config_opts,
                tests,
                message_format,
                fail_if_empty,
            } => {
                let config = config_opts.make_config()?;
                let selector = TestSelector::from_config(&config)?;
                let tests = read_test_list(&tests)?;
                let selected = selector.select(&tests);

                let colorize = output.color.should_colorize(supports_color::Stream::Stdout);
                let output_format = message_format.to_output_format(output.verbose);
                selected.write(output_format, &mut *stdout, colorize)?;
                stdout
                    .flush()
                    .map_err(|err| ExpectedError::WriteOutputError { err })?;

                // Verbose human output already ends with a count.
                if !matches!(output_format, OutputFormat::Human { verbose: true }) {
                    info!("{}", selection_summary(&selected, &output.stderr_styles()));
                }
                if fail_if_empty && selected.selected_count() == 0 {
                    return Err(ExpectedError::NoTestsSelected);
                }
            }
            Self::ShowConfig { config_opts } => {
                let config = config_opts.make_config()?;
                SerializableFormat::JsonPretty
                    .to_writer(config.specification(), &mut *stdout)
                    .map_err(|err| ExpectedError::WriteJsonError { err })?;
                writeln!(stdout)
                    .and_then(|()| stdout.flush())
                    .map_err(|err| ExpectedError::WriteOutputError { err })?;
            }
        }
        Ok(TestSieveExitCode::OK)
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum MessageFormatOpts {
    #[default]
    Human,
    Json,
    JsonPretty,
}

impl MessageFormatOpts {
    fn to_output_format(self, verbose: bool) -> OutputFormat {
        match self {
            Self::Human => OutputFormat::Human { verbose },
            Self::Json => OutputFormat::Serializable(SerializableFormat::Json),
            Self::JsonPretty => OutputFormat::Serializable(SerializableFormat::JsonPretty),
        }
    }
}
