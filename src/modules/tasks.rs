//! Background task status. Every call requires an API token.

use serde::Deserialize;
use serde_json::Value;

use crate::clients::{AuthMode, HttpClient};
use crate::config::NetworkParameters;
use crate::encoding::encode_path_segment;
use crate::error::{ConstructorError, ValidationError};
use crate::modules::{get_normalized, identity_params, require_string};
use crate::normalize::ResponseShape;

/// Parameters for [`Tasks::get_all_tasks`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TasksParameters {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// `num_results_per_page`.
    #[serde(alias = "num_results_per_page", alias = "resultsPerPage")]
    pub num_results_per_page: Option<u32>,
    /// Earliest creation date, `YYYY-MM-DD` (`start_date`).
    #[serde(alias = "start_date")]
    pub start_date: Option<String>,
    /// Latest creation date, `YYYY-MM-DD` (`end_date`).
    #[serde(alias = "end_date")]
    pub end_date: Option<String>,
    /// Task status, e.g. `QUEUED`, `DONE`, `FAILED`.
    pub status: Option<String>,
    /// Task type, e.g. `ingestion`.
    #[serde(rename = "type")]
    pub task_type: Option<String>,
}

/// Tasks module.
#[derive(Clone, Debug)]
pub struct Tasks {
    client: HttpClient,
}

impl Tasks {
    pub(crate) const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Builds the URL listing tasks.
    #[must_use]
    pub fn create_all_tasks_url(&self, parameters: &TasksParameters) -> String {
        let config = self.client.config();
        let mut params = identity_params(config, None);
        params.insert_opt("num_results_per_page", parameters.num_results_per_page);
        params.insert_opt("page", parameters.page);
        params.insert_opt("start_date", parameters.start_date.clone());
        params.insert_opt("end_date", parameters.end_date.clone());
        params.insert_opt("status", parameters.status.clone());
        params.insert_opt("type", parameters.task_type.clone());
        params.insert_timestamp();
        params.to_url(&config.service_url().join("v1/tasks"))
    }

    /// Builds the URL for a single task.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `id` is blank.
    pub fn create_task_url(&self, id: &str) -> Result<String, ValidationError> {
        let id = require_string(id, "id")?;
        let config = self.client.config();
        let mut params = identity_params(config, None);
        params.insert_timestamp();
        Ok(params.to_url(
            &config
                .service_url()
                .join(&format!("v1/tasks/{}", encode_path_segment(id))),
        ))
    }

    /// Lists tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if no API token is configured or on
    /// HTTP failure.
    pub async fn get_all_tasks(
        &self,
        parameters: &TasksParameters,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.client.require_token()?;
        let url = self.create_all_tasks_url(parameters);
        get_normalized(&self.client, url, AuthMode::Token, None, network, "getAllTasks", ResponseShape::Any)
            .await
    }

    /// Retrieves one task.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `id` is blank, no API token is
    /// configured, or on HTTP failure.
    pub async fn get_task(
        &self,
        id: &str,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_task_url(id)?;
        self.client.require_token()?;
        get_normalized(&self.client, url, AuthMode::Token, None, network, "getTask", ResponseShape::Any)
            .await
    }
}
