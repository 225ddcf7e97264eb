//! Bulk catalog uploads as CSV files.

use serde_json::Value;

use super::Catalog;
use crate::clients::{AuthMode, FilePart, HttpError, HttpMethod, HttpRequest};
use crate::config::NetworkParameters;
use crate::encoding::QueryParams;
use crate::error::{ConstructorError, ValidationError};
use crate::modules::require_string;

/// CSV files and options for a bulk catalog upload.
///
/// At least one of `items`, `variations` or `item_groups` must be present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogFiles {
    /// Index section the files are loaded into.
    pub section: String,
    /// Address notified when the ingestion task fails.
    pub notification_email: Option<String>,
    /// Process the upload even if it would invalidate a large share of the
    /// catalog.
    pub force: Option<bool>,
    /// Contents of `items.csv`.
    pub items: Option<Vec<u8>>,
    /// Contents of `variations.csv`.
    pub variations: Option<Vec<u8>>,
    /// Contents of `item_groups.csv`.
    pub item_groups: Option<Vec<u8>>,
}

impl CatalogFiles {
    /// Upload targeting `section` with no files attached yet.
    #[must_use]
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            ..Self::default()
        }
    }

    fn parts(&self) -> Vec<FilePart> {
        [
            ("items", &self.items),
            ("variations", &self.variations),
            ("item_groups", &self.item_groups),
        ]
        .into_iter()
        .filter_map(|(name, contents)| {
            contents.as_ref().map(|contents| FilePart {
                field_name: name.to_string(),
                file_name: format!("{name}.csv"),
                contents: contents.clone(),
            })
        })
        .collect()
    }
}

impl Catalog {
    /// Replaces the whole catalog of a section (`PUT /v1/catalog`).
    ///
    /// Items missing from the upload are removed.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `section` is blank, no file is
    /// attached, no API token is configured, or on HTTP failure.
    pub async fn replace_catalog(
        &self,
        files: &CatalogFiles,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.upload(HttpMethod::Put, files, false, network).await
    }

    /// Adds or updates the uploaded entities (`PATCH /v1/catalog`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `section` is blank, no file is
    /// attached, no API token is configured, or on HTTP failure.
    pub async fn update_catalog(
        &self,
        files: &CatalogFiles,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.upload(HttpMethod::Patch, files, false, network).await
    }

    /// Applies the uploaded files as a delta
    /// (`PATCH /v1/catalog?patch_delta=true`).
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError`] if `section` is blank, no file is
    /// attached, no API token is configured, or on HTTP failure.
    pub async fn patch_catalog(
        &self,
        files: &CatalogFiles,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        self.upload(HttpMethod::Patch, files, true, network).await
    }

    async fn upload(
        &self,
        method: HttpMethod,
        files: &CatalogFiles,
        patch_delta: bool,
        network: Option<&NetworkParameters>,
    ) -> Result<Value, ConstructorError> {
        let section = require_string(&files.section, "section")?;
        let parts = files.parts();
        if parts.is_empty() {
            return Err(ValidationError::required("files", "object").into());
        }
        self.client.require_token()?;

        let mut query = QueryParams::new();
        query.insert("section", section);
        query.insert_opt("notification_email", files.notification_email.clone());
        query.insert_opt("force", files.force);
        if patch_delta {
            query.insert("patch_delta", true);
        }
        let url = self.create_catalog_url("v1/catalog", &query, false)?;

        let request = HttpRequest::builder(method, url)
            .auth(AuthMode::Token)
            .multipart(parts)
            .build()
            .map_err(HttpError::from)?;

        tracing::debug!(
            method = %method,
            section,
            patch_delta,
            "Uploading catalog files"
        );
        let response = self.client.dispatch(request, None, network).await?;
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::catalog;
    use super::*;
    use crate::clients::RequestBody;
    use crate::test_support::{query_value, MockFetcher, MockReply};
    use serde_json::json;
    use std::sync::Arc;

    fn items_only() -> CatalogFiles {
        CatalogFiles {
            items: Some(b"id,item_name\nsku-1,Red Shoe\n".to_vec()),
            ..CatalogFiles::new("Products")
        }
    }

    #[tokio::test]
    async fn test_replace_catalog_sends_multipart() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.push(MockReply::json(200, json!({"task_id": 7})));
        let body = catalog(fetcher.clone())
            .replace_catalog(&items_only(), None)
            .await
            .unwrap();
        assert_eq!(body["task_id"], 7);

        let request = &fetcher.requests()[0];
        assert_eq!(request.method, HttpMethod::Put);
        assert!(request.url.starts_with("https://ac.cnstrc.com/v1/catalog?"));
        assert_eq!(query_value(&request.url, "section").as_deref(), Some("Products"));
        assert!(query_value(&request.url, "_dt").is_none());
        assert!(!request.headers.contains_key("content-type"));

        match &request.body {
            Some(RequestBody::Multipart(parts)) => {
                assert_eq!(parts.len(), 1);
                assert_eq!(parts[0].field_name, "items");
                assert_eq!(parts[0].file_name, "items.csv");
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_patch_catalog_sets_delta_flag() {
        let fetcher = Arc::new(MockFetcher::new());
        let files = CatalogFiles {
            variations: Some(b"id,item_id\nv-1,sku-1\n".to_vec()),
            item_groups: Some(b"id,name\ng-1,Shoes\n".to_vec()),
            ..CatalogFiles::new("Products")
        };
        catalog(fetcher.clone())
            .patch_catalog(&files, None)
            .await
            .unwrap();

        let request = &fetcher.requests()[0];
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(query_value(&request.url, "patch_delta").as_deref(), Some("true"));
        match &request.body {
            Some(RequestBody::Multipart(parts)) => {
                let names: Vec<_> = parts.iter().map(|p| p.field_name.as_str()).collect();
                assert_eq!(names, ["variations", "item_groups"]);
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_catalog_has_no_delta_flag() {
        let fetcher = Arc::new(MockFetcher::new());
        catalog(fetcher.clone())
            .update_catalog(&items_only(), None)
            .await
            .unwrap();
        assert!(query_value(&fetcher.last_url(), "patch_delta").is_none());
    }

    #[tokio::test]
    async fn test_upload_validation() {
        let fetcher = Arc::new(MockFetcher::new());
        let catalog = catalog(fetcher.clone());

        let err = catalog
            .replace_catalog(&CatalogFiles::new("Products"), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "files is a required parameter of type object");

        let err = catalog
            .replace_catalog(
                &CatalogFiles {
                    section: String::new(),
                    ..items_only()
                },
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "section is a required parameter of type string");
        assert_eq!(fetcher.calls(), 0);
    }
}
