use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::chat::{split_paragraphs, ChatMessage};

/// The GTSearch service endpoint
pub const SEARCH_ENDPOINT: &str = "https://tsearch-c7q4.onrender.com/tsearch/search";

#[derive(Serialize)]
struct SearchRequest<'a> {
    search_query: &'a str,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search service responded with status {0}")]
    Status(StatusCode),
}

/// Result of one search, with every failure collapsed into one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Answer(Vec<String>),
    Failed,
}

impl SearchOutcome {
    pub fn into_message(self) -> ChatMessage {
        match self {
            SearchOutcome::Answer(paragraphs) => ChatMessage::bot(paragraphs),
            SearchOutcome::Failed => ChatMessage::failure(),
        }
    }
}

impl From<Result<Vec<String>, SearchError>> for SearchOutcome {
    fn from(result: Result<Vec<String>, SearchError>) -> Self {
        match result {
            Ok(paragraphs) => SearchOutcome::Answer(paragraphs),
            Err(e) => {
                tracing::warn!(error = %e, "search failed");
                SearchOutcome::Failed
            }
        }
    }
}

#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: String,
}

impl SearchClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Use a preconfigured reqwest client (proxy, TLS or timeout settings)
    pub fn with_client(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    /// POST the query and return the answer's paragraphs.
    ///
    /// A non-success status is an error without looking at the body.
    pub async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let request = SearchRequest { search_query: query };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let body = response.text().await?;
        let paragraphs = split_paragraphs(&body);
        tracing::debug!(bytes = body.len(), paragraphs = paragraphs.len(), "search answered");
        Ok(paragraphs)
    }

    /// Run a search and fold any error into [`SearchOutcome::Failed`]
    pub async fn dispatch(self, query: String) -> SearchOutcome {
        self.search(&query).await.into()
    }
}
