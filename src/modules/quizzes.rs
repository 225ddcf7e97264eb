//! Quiz questions and results, served from the quizzes service URL.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::clients::{AuthMode, HttpClient};
use crate::config::NetworkParameters;
use crate::encoding::{encode_path_segment, QueryParams};
use crate::error::{ConstructorError, ValidationError};
use crate::modules::{get_normalized, identity_params, merge_fmt_options, require_string, Filters};
use crate::normalize::ResponseShape;
use crate::user::UserContext;

/// Parameters for quiz requests.
///
/// `answers` holds one entry per answered question; each entry lists the
/// selected option ids and is sent as `a=<id>,<id>`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizParameters {
    /// Answers to the questions asked so far.
    pub answers: Option<Vec<Vec<String>>>,
    /// Pins the quiz version (`quiz_version_id`).
    #[serde(alias = "quiz_version_id")]
    pub quiz_version_id: Option<String>,
    /// Groups requests of one quiz run (`quiz_session_id`).
    #[serde(alias = "quiz_session_id")]
    pub quiz_session_id: Option<String>,
    /// Index section.
    pub section: Option<String>,
    /// Page number for results, 1-based.
    pub page: Option<u32>,
    /// `num_results_per_page` for results.
    #[serde(alias = "num_results_per_page", alias = "numResultsPerPage")]
    pub results_per_page: Option<u32>,
    /// Facet filters for results.
    pub filters: Option<Filters>,
    /// `fmt_options[<name>]`.
    #[serde(alias = "fmt_options")]
    pub fmt_options: Option<Map<String, Value>>,
    /// `fmt_options[hidden_fields]`.
    #[serde(alias = "hidden_fields")]
    pub hidden_fields: Option<Vec<String>>,
}

/// Quizzes module.
#[derive(Clone, Debug)]
pub struct Quizzes {
    client: HttpClient,
}

impl Quizzes {
    pub(crate) const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn build_url(
        &self,
        quiz_id: &str,
        endpoint: &str,
        parameters: &QuizParameters,
        user: Option<&UserContext>,
        require_answers: bool,
    ) -> Result<String, ValidationError> {
        let quiz_id = require_string(quiz_id, "quizId")?;
        let answers = parameters
            .answers
            .as_ref()
            .filter(|answers| !answers.is_empty());
        if require_answers && answers.is_none() {
            return Err(ValidationError::required("answers", "array"));
        }

        let config = self.client.config();
        let mut params: QueryParams = identity_params(config, user);
        params.insert_opt("section", parameters.section.clone());
        params.insert_opt("quiz_version_id", parameters.quiz_version_id.clone());
        params.insert_opt("quiz_session_id", parameters.quiz_session_id.clone());
        if let Some(answers) = answers {
            let joined: Vec<String> = answers.iter().map(|selected| selected.join(",")).collect();
            params.insert("a", joined);
        }
        params.insert_opt("page", parameters.page);
        params.insert_opt("num_results_per_page", parameters.results_per_page);
        params.insert_opt("filters", parameters.filters.clone());
        params.insert_opt(
            "fmt_options",
            merge_fmt_options(
                parameters.fmt_options.as_ref(),
                parameters.hidden_fields.as_deref(),
                None,
            ),
        );
        params.insert_timestamp();

        let base = config.quizzes_service_url().join(&format!(
            "v1/quizzes/{}/{endpoint}",
            encode_path_segment(quiz_id)
        ));
        Ok(params.to_url(&base))
    }

    /// Builds the URL for the next quiz question.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `quiz_id` is blank.
    pub fn create_quiz_next_question_url(
        &self,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: Option<&UserContext>,
    ) -> Result<String, ValidationError> {
        self.build_url(quiz_id, "questions", parameters, user, false)
    }

    /// Builds the URL for quiz results.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `quiz_id` is blank or `answers` is
    /// absent or empty.
    pub fn create_quiz_results_url(
        &self,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: Option<&UserContext>,
    ) -> Result<String, ValidationError> {
        self.build_url(quiz_id, "results", parameters, user, true)
    }

    /// Builds the URL for the quiz results page configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `quiz_id` is blank.
    pub fn create_quiz_results_config_url(
        &self,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: Option<&UserContext>,
    ) -> Result<String, ValidationError> {
        self.build_url(quiz_id, "results_config", parameters, user, false)
    }

    /// Retrieves the next question for the given answers.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on validation failure, HTTP failure, or a
    /// body without `quiz_version_id`.
    pub async fn get_quiz_next_question(
        &self,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_quiz_next_question_url(quiz_id, parameters, user)?;
        self.fetch(url, user, network, "getQuizNextQuestion").await
    }

    /// Retrieves the results for a completed quiz.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on validation failure, HTTP failure, or a
    /// body without `quiz_version_id`.
    pub async fn get_quiz_results(
        &self,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_quiz_results_url(quiz_id, parameters, user)?;
        self.fetch(url, user, network, "getQuizResults").await
    }

    /// Retrieves the results page configuration of a quiz.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] on validation failure, HTTP failure, or a
    /// body without `quiz_version_id`.
    pub async fn get_quiz_results_config(
        &self,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let url = self.create_quiz_results_config_url(quiz_id, parameters, user)?;
        self.fetch(url, user, network, "getQuizResultsConfig").await
    }

    async fn fetch(
        &self,
        url: String,
        user: Option<&UserContext>,
        network: Option<&NetworkParameters>,
        operation: &'static str,
    ) -> Result<Value, ConstructorError> {
        get_normalized(
            &self.client,
            url,
            AuthMode::KeyOnly,
            user,
            network,
            operation,
            ResponseShape::Quiz,
        )
        .await
    }
}
