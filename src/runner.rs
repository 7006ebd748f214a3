use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::loader::{self, LoaderOptions, Source};
use crate::prefs::{PreferenceError, PreferenceStore, Theme};
use crate::state::Controller;
use crate::transform::SortKey;

#[derive(Clone, Debug)]
pub struct Options {
    pub source: String,
    pub timeout_seconds: u64,
    pub sort: SortKey,
    pub expand_all: bool,
    pub theme: Option<Theme>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source: loader::DEFAULT_SOURCE.to_string(),
            timeout_seconds: loader::DEFAULT_TIMEOUT_SECONDS,
            sort: SortKey::Date,
            expand_all: false,
            theme: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no certificate source provided")]
    EmptySource,

    #[error("invalid timeout {value}, expected positive integer")]
    InvalidTimeout { value: u64 },

    #[error("failed to save theme preference: {source}")]
    Preferences {
        #[source]
        source: PreferenceError,
    },
}

/// Library entry point: loads the document once and hands back a controller
/// primed with the requested initial view.
pub struct Runner {
    options: Options,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.source.trim().is_empty() {
            return Err(RunnerError::EmptySource);
        }
        if options.timeout_seconds == 0 {
            return Err(RunnerError::InvalidTimeout {
                value: options.timeout_seconds,
            });
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn source(&self) -> Source {
        Source::parse(&self.options.source)
    }

    /// Runs the load. A failed load is not an error here: it leaves the
    /// controller in the failed phase, which renders as the error view.
    pub async fn run(&self, store: Box<dyn PreferenceStore>) -> Result<Controller, RunnerError> {
        let mut controller = Controller::new(store);
        if let Some(theme) = self.options.theme {
            if controller.state().theme != theme {
                controller
                    .set_theme(theme)
                    .map_err(|e| RunnerError::Preferences { source: e })?;
            }
        }

        let loader_options = LoaderOptions {
            timeout: Duration::from_secs(self.options.timeout_seconds),
        };
        let source = self.source();
        debug!(source = source.as_str(), "loading certificates");
        let outcome = loader::load(&source, &loader_options).await;
        controller.finish_load(outcome);

        controller.select_sort(self.options.sort);
        if self.options.expand_all {
            controller.toggle_expansion();
        }
        Ok(controller)
    }
}
