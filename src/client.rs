//! The top-level client.

use std::sync::Arc;

use crate::clients::HttpClient;
use crate::config::ConstructorConfig;
use crate::modules::autocomplete::Autocomplete;
use crate::modules::browse::Browse;
use crate::modules::catalog::Catalog;
use crate::modules::quizzes::Quizzes;
use crate::modules::recommendations::Recommendations;
use crate::modules::search::Search;
use crate::modules::tasks::Tasks;
use crate::modules::tracker::Tracker;

/// Client for the Constructor.io API.
///
/// Owns one instance of every module, all sharing the same immutable
/// configuration. Catalog, tasks and tracking are only available when
/// [`ConstructorConfigBuilder::enable_catalog_and_tracking`](crate::ConstructorConfigBuilder::enable_catalog_and_tracking)
/// is left on.
///
/// # Example
///
/// ```rust
/// use constructorio::{ApiKey, ConstructorConfig, ConstructorIO};
///
/// let client = ConstructorIO::new(
///     ConstructorConfig::builder()
///         .api_key(ApiKey::new("key-abc").unwrap())
///         .build()
///         .unwrap(),
/// );
/// assert_eq!(client.config().api_key().as_ref(), "key-abc");
/// assert!(client.tracker().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct ConstructorIO {
    config: Arc<ConstructorConfig>,
    search: Search,
    browse: Browse,
    autocomplete: Autocomplete,
    recommendations: Recommendations,
    quizzes: Quizzes,
    catalog: Option<Catalog>,
    tasks: Option<Tasks>,
    tracker: Option<Tracker>,
}

// Verify ConstructorIO is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConstructorIO>();
};

impl ConstructorIO {
    /// Creates a client from a validated configuration.
    #[must_use]
    pub fn new(config: ConstructorConfig) -> Self {
        let config = Arc::new(config);
        let client = HttpClient::new(Arc::clone(&config));
        let management = config.enable_catalog_and_tracking();

        tracing::debug!(
            service_url = %config.service_url(),
            catalog_and_tracking = management,
            "Creating Constructor.io client"
        );

        Self {
            search: Search::new(client.clone()),
            browse: Browse::new(client.clone()),
            autocomplete: Autocomplete::new(client.clone()),
            recommendations: Recommendations::new(client.clone()),
            quizzes: Quizzes::new(client.clone()),
            catalog: management.then(|| Catalog::new(client.clone())),
            tasks: management.then(|| Tasks::new(client.clone())),
            tracker: management.then(|| Tracker::new(client)),
            config,
        }
    }

    /// Returns the configuration shared by every module.
    #[must_use]
    pub fn config(&self) -> &ConstructorConfig {
        &self.config
    }

    /// Search module.
    #[must_use]
    pub const fn search(&self) -> &Search {
        &self.search
    }

    /// Browse module.
    #[must_use]
    pub const fn browse(&self) -> &Browse {
        &self.browse
    }

    /// Autocomplete module.
    #[must_use]
    pub const fn autocomplete(&self) -> &Autocomplete {
        &self.autocomplete
    }

    /// Recommendations module.
    #[must_use]
    pub const fn recommendations(&self) -> &Recommendations {
        &self.recommendations
    }

    /// Quizzes module.
    #[must_use]
    pub const fn quizzes(&self) -> &Quizzes {
        &self.quizzes
    }

    /// Catalog module, when enabled.
    #[must_use]
    pub const fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    /// Tasks module, when enabled.
    #[must_use]
    pub const fn tasks(&self) -> Option<&Tasks> {
        self.tasks.as_ref()
    }

    /// Tracker module, when enabled.
    #[must_use]
    pub const fn tracker(&self) -> Option<&Tracker> {
        self.tracker.as_ref()
    }
}
