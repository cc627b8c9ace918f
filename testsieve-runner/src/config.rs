// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading filter specifications from config files.

use crate::errors::{ConfigParseError, ConfigParseErrorKind};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use std::collections::BTreeSet;
use testsieve_filtering::{FilterContext, FilterSpecification};
use tracing::{debug, warn};

/// Trait for handling configuration warnings.
///
/// This allows for different warning handling strategies, such as logging warnings (the default
/// behavior) or collecting them for testing purposes.
pub trait ConfigWarnings {
    /// Handle unknown configuration keys found in a config file.
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);
}

/// Default implementation of [`ConfigWarnings`] that logs warnings using the tracing crate.
pub struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let mut unknown_str = String::new();
        if let [single] = unknown.iter().collect::<Vec<_>>().as_slice() {
            // Print this on the same line.
            unknown_str.push_str("key: ");
            unknown_str.push_str(single);
        } else {
            unknown_str.push_str("keys:\n");
            for ignored_key in unknown {
                unknown_str.push('\n');
                unknown_str.push_str("  - ");
                unknown_str.push_str(ignored_key);
            }
        }

        warn!(
            "in config file {config_file}, ignoring unknown configuration {unknown_str}"
        );
    }
}

/// A filter specification loaded from a config file.
///
/// Every rule in the specification has been validated.
#[derive(Clone, Debug)]
pub struct FilterConfig {
    config_file: Utf8PathBuf,
    spec: FilterSpecification,
}

impl FilterConfig {
    /// Reads and validates a filter specification from `config_file`.
    ///
    /// Files ending in `.json` are read as JSON, and all other files are read as TOML. Unknown
    /// top-level keys are reported to `warnings`.
    pub fn from_path(
        config_file: impl Into<Utf8PathBuf>,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigParseError> {
        let config_file = config_file.into();
        let builder = Config::builder().add_source(File::new(
            config_file.as_str(),
            file_format(&config_file),
        ));

        let (spec, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;
        if !unknown.is_empty() {
            warnings.unknown_config_keys(&config_file, &unknown);
        }

        spec.validate()
            .map_err(|error| ConfigParseError::new(&config_file, error.into()))?;
        debug!(
            "loaded {} allowlist and {} blocklist rules from {config_file}",
            spec.allowlist.len(),
            spec.blocklist.len(),
        );

        Ok(Self { config_file, spec })
    }

    /// Returns the path this config was loaded from.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the validated filter specification.
    pub fn specification(&self) -> &FilterSpecification {
        &self.spec
    }

    /// Returns the context to compile rules with. Relative `file` paths in rules are resolved
    /// against the directory containing the config file.
    pub fn filter_context(&self) -> FilterContext {
        match self.config_file.parent() {
            Some(dir) if !dir.as_str().is_empty() => FilterContext::with_base_dir(dir),
            _ => FilterContext::new(),
        }
    }

    /// This returns a tuple of (specification, ignored paths).
    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(FilterSpecification, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let spec: FilterSpecification =
            serde_path_to_error::deserialize(ignored_de).map_err(|error| {
                // serde_path_to_error already reports the key, so drop it from the config error.
                let path = error.path().clone();
                let config_error = error.into_inner();
                let error = match config_error {
                    ConfigError::At { error, .. } => *error,
                    other => other,
                };
                ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                    path, error,
                )))
            })?;

        Ok((spec, ignored))
    }
}

fn file_format(config_file: &Utf8Path) -> FileFormat {
    match config_file.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
        _ => FileFormat::Toml,
    }
}
