use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{SupervisorConfig, TaskError, TaskSpec};

/// Builder for TaskSpec with fluent API
#[derive(Clone, Debug)]
pub struct TaskSpecBuilder {
    name: Arc<str>,
    timeout: Duration,
}

impl TaskSpecBuilder {
    /// Creates a new builder with the given task name and the default config timeout
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            timeout: SupervisorConfig::default().default_timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build TaskSpec from an async closure
    pub fn build<T, F, Fut>(self, f: F) -> TaskSpec<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        TaskSpec::new(self.name, self.timeout, f)
    }

    /// Build TaskSpec from a blocking closure
    pub fn build_blocking<T, F>(self, f: F) -> TaskSpec<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Result<T, TaskError> + Send + 'static,
    {
        TaskSpec::blocking(self.name, self.timeout, f)
    }
}

impl TaskSpec<()> {
    /// Creates a builder for constructing TaskSpec with fluent API
    pub fn builder(name: impl Into<Arc<str>>) -> TaskSpecBuilder {
        TaskSpecBuilder::new(name)
    }
}
