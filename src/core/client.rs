//! Async client for the translation service
//!
//! One client instance owns its transport and immutable configuration;
//! clones share both, and independent calls are safe to issue concurrently.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslatorError};
use crate::core::models::{
    BatchJobState, BatchSubmissionRequest, DocumentStatus, TranslateOptions, TranslateResult,
};
use crate::core::operation::BatchOperation;
use crate::core::paging::{Page, PageCursor, PageFetcher, Paginator};
use crate::core::transport::{HttpRequest, HttpResponse, Pipeline, ReqwestTransport, Transport};

/// Decode a 200 response body; any other status is a request failure with
/// the raw body preserved for diagnostics
pub(crate) fn decode_success<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    match response.status {
        200 => serde_json::from_slice(&response.body).map_err(|e| TranslatorError::DecodeError {
            message: e.to_string(),
        }),
        status => {
            warn!("request failed with status {}", status);
            Err(TranslatorError::RequestFailed {
                status,
                body: response.body_string(),
            })
        }
    }
}

/// Accept a 202 batch-submit response and extract its Operation-Location
pub(crate) fn expect_accepted(response: HttpResponse) -> Result<String> {
    match response.status {
        202 => response
            .header("Operation-Location")
            .map(str::to_string)
            .ok_or(TranslatorError::MissingOperationLocation),
        status => {
            warn!("batch submit rejected with status {}", status);
            Err(TranslatorError::RequestFailed {
                status,
                body: response.body_string(),
            })
        }
    }
}

/// One input text as the service expects it on the wire
#[derive(Serialize)]
struct TranslateItem<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

/// Page envelope used by the list routes
#[derive(Deserialize)]
struct ListResponse<T> {
    value: Vec<T>,
    #[serde(rename = "@nextLink", default)]
    next_link: Option<String>,
}

/// The client for the translation service
#[derive(Clone)]
pub struct TranslatorClient {
    pipeline: Pipeline,
    base: Url,
}

impl TranslatorClient {
    /// Create a client with the real HTTP transport.
    ///
    /// Fails fast on invalid configuration; credentials are not checked
    /// against the service until the first request.
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new(config.timeout_ms)?);
        Self::with_transport(config, transport)
    }

    /// Create a client over an injected transport
    pub fn with_transport(config: TranslatorConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        let mut endpoint = config.endpoint.clone();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let base = Url::parse(&endpoint).map_err(|e| TranslatorError::ConfigError {
            message: format!("endpoint is not a valid URL: {e}"),
        })?;

        let pipeline = Pipeline::new(&config, transport);
        Ok(Self { pipeline, base })
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(TranslatorConfig::from_env()?)
    }

    fn route(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| TranslatorError::InvalidArgument {
                message: format!("cannot build route {path}: {e}"),
            })
    }

    /// Translate the given texts into the target language of `options`.
    ///
    /// The result has exactly one entry per input text, in input order.
    pub async fn translate<S: AsRef<str>>(
        &self,
        texts: &[S],
        options: &TranslateOptions,
    ) -> Result<Vec<TranslateResult>> {
        if texts.is_empty() {
            return Err(TranslatorError::InvalidArgument {
                message: "at least one input text is required".to_string(),
            });
        }
        if options.to.is_empty() {
            return Err(TranslatorError::InvalidArgument {
                message: "target language is required".to_string(),
            });
        }

        let mut url = self.route("translate")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("to", &options.to);
            if let Some(from) = &options.from {
                query.append_pair("from", from);
            }
            if let Some(category) = &options.category {
                query.append_pair("category", category);
            }
            if let Some(text_type) = &options.text_type {
                query.append_pair("textType", &text_type.to_string());
            }
            if let Some(action) = &options.profanity_action {
                query.append_pair("profanityAction", &action.to_string());
            }
            if let Some(alignment) = options.include_alignment {
                query.append_pair("includeAlignment", &alignment.to_string());
            }
            if let Some(sentence_length) = options.include_sentence_length {
                query.append_pair("includeSentenceLength", &sentence_length.to_string());
            }
        }

        let body: Vec<TranslateItem<'_>> = texts
            .iter()
            .map(|text| TranslateItem {
                text: text.as_ref(),
            })
            .collect();

        let request = HttpRequest::post_json(url, &body)?;
        let response = self.pipeline.send(request).await?;
        decode_success(response)
    }

    /// Submit a batch translation job.
    ///
    /// Succeeds only on a 202 carrying an `Operation-Location` header; the
    /// returned handle polls that location for job state.
    pub async fn begin_batch_translation(
        &self,
        request: &BatchSubmissionRequest,
    ) -> Result<BatchOperation> {
        if request.inputs.is_empty() {
            return Err(TranslatorError::InvalidArgument {
                message: "at least one batch input is required".to_string(),
            });
        }
        for input in &request.inputs {
            if input.targets.is_empty() {
                return Err(TranslatorError::InvalidArgument {
                    message: "each batch input needs at least one target".to_string(),
                });
            }
        }

        let url = self.route("batches")?;
        let http = HttpRequest::post_json(url, request)?;
        let response = self.pipeline.send(http).await?;

        let location = expect_accepted(response)?;
        let location = Url::parse(&location).map_err(|e| TranslatorError::DecodeError {
            message: format!("Operation-Location is not a valid URL: {e}"),
        })?;

        info!("batch job accepted, polling at {}", location);
        Ok(BatchOperation::new(self.pipeline.clone(), location))
    }

    /// Rebuild a batch operation handle from a saved operation location
    pub fn resume_batch_operation(&self, location: &str) -> Result<BatchOperation> {
        if location.is_empty() {
            return Err(TranslatorError::InvalidArgument {
                message: "operation location is required".to_string(),
            });
        }
        let location = Url::parse(location).map_err(|e| TranslatorError::InvalidArgument {
            message: format!("operation location is not a valid URL: {e}"),
        })?;
        Ok(BatchOperation::new(self.pipeline.clone(), location))
    }

    /// Fetch the state of a batch job by its id
    pub async fn job_state(&self, job_id: &str) -> Result<BatchJobState> {
        if job_id.is_empty() {
            return Err(TranslatorError::InvalidArgument {
                message: "job id is required".to_string(),
            });
        }
        let url = self.route(&format!("batches/{job_id}"))?;
        let response = self.pipeline.send(HttpRequest::get(url)).await?;
        decode_success(response)
    }

    /// Page through every batch job known to the service
    pub fn list_jobs(&self) -> Result<Paginator<ListFetcher<BatchJobState>>> {
        let route = self.route("batches")?;
        Ok(Paginator::new(ListFetcher::new(
            self.pipeline.clone(),
            route,
        )))
    }

    /// Page through the per-document statuses of one batch job
    pub fn list_documents(&self, job_id: &str) -> Result<Paginator<ListFetcher<DocumentStatus>>> {
        if job_id.is_empty() {
            return Err(TranslatorError::InvalidArgument {
                message: "job id is required".to_string(),
            });
        }
        let route = self.route(&format!("batches/{job_id}/documents"))?;
        Ok(Paginator::new(ListFetcher::new(
            self.pipeline.clone(),
            route,
        )))
    }
}

/// Fetches pages of a list route on behalf of a [`Paginator`]
pub struct ListFetcher<T> {
    pipeline: Pipeline,
    route: Url,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ListFetcher<T> {
    fn new(pipeline: Pipeline, route: Url) -> Self {
        Self {
            pipeline,
            route,
            _marker: PhantomData,
        }
    }

    async fn fetch(&self, url: Url) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.pipeline.send(HttpRequest::get(url)).await?;
        let list: ListResponse<T> = decode_success(response)?;
        Ok(Page {
            items: list.value,
            continuation: list.next_link,
        })
    }
}

#[async_trait]
impl<T> PageFetcher for ListFetcher<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    type Item = T;

    async fn first_page(&self) -> Result<Page<T>> {
        self.fetch(self.route.clone()).await
    }

    async fn next_page(&self, cursor: PageCursor) -> Result<Page<T>> {
        let mut url = self.route.clone();
        // the service expects the literal `$skip`/`$top` key names
        url.set_query(Some(&format!("$skip={}&$top={}", cursor.skip, cursor.top)));
        self.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Credential;
    use crate::core::models::{
        BatchInput, JobStatus, SourceInput, StorageSource, TargetInput,
    };
    use crate::core::operation::PollOptions;
    use crate::core::transport::mock::MockTransport;

    fn client_with(transport: Arc<MockTransport>) -> TranslatorClient {
        let config = TranslatorConfig::new(Credential::SubscriptionKey {
            key: "test-key".to_string(),
            region: "westus".to_string(),
        })
        .with_endpoint("https://host");
        TranslatorClient::with_transport(config, transport).unwrap()
    }

    fn submission() -> BatchSubmissionRequest {
        BatchSubmissionRequest::new(vec![BatchInput::new(
            SourceInput::new("https://host/source")
                .with_language("en")
                .with_storage_source(StorageSource::AzureBlob),
            vec![TargetInput::new("https://host/target", "it")],
        )])
    }

    #[tokio::test]
    async fn translate_yields_one_result_per_input() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(
            200,
            vec![],
            r#"[
                {"detectedLanguage": {"language": "en", "score": 0.98},
                 "translations": [{"text": "Ciao", "to": "it"}]},
                {"detectedLanguage": {"language": "en", "score": 1.0},
                 "translations": [{"text": "Mondo", "to": "it"}]}
            ]"#,
        );

        let client = client_with(transport.clone());
        let options = TranslateOptions::new("it").with_from("en");
        let results = client.translate(&["Hello", "World"], &options).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].translations[0].text, "Ciao");
        assert_eq!(results[1].translations[0].text, "Mondo");
        assert_eq!(
            results[0].detected_language.as_ref().unwrap().language,
            "en"
        );

        let sent = &transport.requests()[0];
        assert_eq!(sent.url.path(), "/translate");
        let query: Vec<_> = sent.url.query_pairs().collect();
        assert!(query.iter().any(|(k, v)| k == "to" && v == "it"));
        assert!(query.iter().any(|(k, v)| k == "from" && v == "en"));
        assert!(query
            .iter()
            .any(|(k, v)| k == "api-version" && v == "3.0"));

        let body: serde_json::Value =
            serde_json::from_slice(sent.body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!([{"Text": "Hello"}, {"Text": "World"}])
        );
    }

    #[tokio::test]
    async fn translate_rejects_empty_input() {
        let client = client_with(Arc::new(MockTransport::new()));

        let empty: [&str; 0] = [];
        let err = client
            .translate(&empty, &TranslateOptions::new("it"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslatorError::InvalidArgument { .. }));

        let err = client
            .translate(&["Hello"], &TranslateOptions::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslatorError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn translate_maps_malformed_body_to_decode_error() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(200, vec![], "{not json");

        let client = client_with(transport);
        let err = client
            .translate(&["Hello"], &TranslateOptions::new("it"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslatorError::DecodeError { .. }));
    }

    #[tokio::test]
    async fn submit_returns_handle_on_accepted() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(
            202,
            vec![(
                "Operation-Location".to_string(),
                "https://host/batches/abc123".to_string(),
            )],
            "",
        );

        let client = client_with(transport.clone());
        let operation = client.begin_batch_translation(&submission()).await.unwrap();
        assert_eq!(operation.location(), "https://host/batches/abc123");

        let sent = &transport.requests()[0];
        assert_eq!(sent.url.path(), "/batches");
        let body: serde_json::Value =
            serde_json::from_slice(sent.body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body["inputs"][0]["source"]["sourceUrl"],
            "https://host/source"
        );
        assert_eq!(body["inputs"][0]["targets"][0]["language"], "it");
    }

    #[tokio::test]
    async fn submit_fails_without_operation_location() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(202, vec![], "");

        let client = client_with(transport);
        let err = client
            .begin_batch_translation(&submission())
            .await
            .unwrap_err();
        assert!(matches!(err, TranslatorError::MissingOperationLocation));
    }

    #[tokio::test]
    async fn submit_surfaces_rejection_with_body() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(400, vec![], r#"{"error": "bad container"}"#);

        let client = client_with(transport);
        let err = client
            .begin_batch_translation(&submission())
            .await
            .unwrap_err();
        match err {
            TranslatorError::RequestFailed { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("bad container"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn submit_rejects_empty_inputs_before_any_request() {
        let transport = Arc::new(MockTransport::new());
        let client = client_with(transport.clone());

        let err = client
            .begin_batch_translation(&BatchSubmissionRequest::new(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslatorError::InvalidArgument { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn job_state_requires_an_id() {
        let client = client_with(Arc::new(MockTransport::new()));
        let err = client.job_state("").await.unwrap_err();
        assert!(matches!(err, TranslatorError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn job_state_hits_the_job_route() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(
            200,
            vec![],
            r#"{
                "id": "abc123",
                "createdDateTimeUtc": "2021-02-02T11:59:59Z",
                "lastActionDateTimeUtc": "2021-02-02T12:00:00Z",
                "status": "Running",
                "summary": {
                    "total": 2, "failed": 0, "success": 1,
                    "inProgress": 1, "notYetStarted": 0, "cancelled": 0
                }
            }"#,
        );

        let client = client_with(transport.clone());
        let state = client.job_state("abc123").await.unwrap();
        assert_eq!(state.status, JobStatus::Running);
        assert_eq!(state.summary.in_progress, 1);
        assert_eq!(transport.requests()[0].url.path(), "/batches/abc123");
    }

    #[tokio::test]
    async fn list_jobs_pages_through_continuation_links() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(
            200,
            vec![],
            r#"{
                "value": [{
                    "id": "job-1",
                    "createdDateTimeUtc": "2021-02-02T11:00:00Z",
                    "lastActionDateTimeUtc": "2021-02-02T11:30:00Z",
                    "status": "Succeeded",
                    "summary": {"total": 1, "failed": 0, "success": 1,
                                "inProgress": 0, "notYetStarted": 0, "cancelled": 0}
                }],
                "@nextLink": "https://host/batches?$skip=1&$top=1"
            }"#,
        );
        transport.push_response(
            200,
            vec![],
            r#"{
                "value": [{
                    "id": "job-2",
                    "createdDateTimeUtc": "2021-02-02T12:00:00Z",
                    "lastActionDateTimeUtc": "2021-02-02T12:30:00Z",
                    "status": "Failed",
                    "summary": {"total": 1, "failed": 1, "success": 0,
                                "inProgress": 0, "notYetStarted": 0, "cancelled": 0}
                }]
            }"#,
        );

        let client = client_with(transport.clone());
        let jobs = client.list_jobs().unwrap().collect_all().await.unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, "job-1");
        assert_eq!(jobs[1].id, "job-2");

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].url.path(), "/batches");
        // the second fetch carries the cursor from the continuation link
        assert!(sent[1].url.query().unwrap().contains("$skip=1"));
        assert!(sent[1].url.query().unwrap().contains("$top=1"));
    }

    #[tokio::test]
    async fn list_documents_hits_the_documents_route() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(
            200,
            vec![],
            r#"{
                "value": [{
                    "id": "doc-1",
                    "path": "https://host/target/readme.txt",
                    "createdDateTimeUtc": "2021-02-02T11:00:00Z",
                    "lastActionDateTimeUtc": "2021-02-02T11:05:00Z",
                    "status": "Succeeded",
                    "to": "it",
                    "progress": 1.0
                }]
            }"#,
        );

        let client = client_with(transport.clone());
        let docs = client
            .list_documents("abc123")
            .unwrap()
            .collect_all()
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].to, "it");
        assert_eq!(
            transport.requests()[0].url.path(),
            "/batches/abc123/documents"
        );

        assert!(matches!(
            client.list_documents(""),
            Err(TranslatorError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn submit_then_wait_end_to_end() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(
            202,
            vec![(
                "Operation-Location".to_string(),
                "https://host/batches/abc123".to_string(),
            )],
            "",
        );
        transport.push_response(
            200,
            vec![],
            r#"{
                "id": "abc123",
                "createdDateTimeUtc": "2021-02-02T11:59:59Z",
                "lastActionDateTimeUtc": "2021-02-02T12:05:00Z",
                "status": "Succeeded",
                "summary": {"total": 1, "failed": 0, "success": 1,
                            "inProgress": 0, "notYetStarted": 0, "cancelled": 0}
            }"#,
        );

        let client = client_with(transport.clone());
        let operation = client.begin_batch_translation(&submission()).await.unwrap();
        let state = operation
            .wait_for_completion(&PollOptions::default())
            .await
            .unwrap();

        assert_eq!(state.status, JobStatus::Succeeded);
        assert_eq!(state.summary.total, 1);
        assert_eq!(state.summary.success, 1);

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].url.path(), "/batches/abc123");
    }
}
