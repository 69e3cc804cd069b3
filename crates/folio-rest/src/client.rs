//! Firestore REST HTTP client.

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};
use url::Url;

use folio_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use folio_core::{CollectionName, DocumentPath, Result};

use crate::config::FirestoreOptions;
use crate::endpoints::ErrorResponse;

/// HTTP client for the Firestore REST API.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    options: FirestoreOptions,
}

impl RestClient {
    /// Create a new client for the given connection options.
    pub fn new(options: FirestoreOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_reqwest)?;

        Ok(Self { client, options })
    }

    /// Returns the options this client is configured with.
    pub fn options(&self) -> &FirestoreOptions {
        &self.options
    }

    /// Full resource name of a document.
    pub fn document_name(&self, path: &DocumentPath) -> String {
        format!(
            "{}/{}/{}",
            self.options.documents_root(),
            path.collection(),
            path.id()
        )
    }

    /// Parse a full resource name back into a document path.
    pub fn parse_document_name(&self, name: &str, collection: &CollectionName) -> Result<DocumentPath> {
        let mut parts = name.rsplitn(3, '/');
        let id = parts.next().unwrap_or_default();
        let named_collection = parts.next().unwrap_or_default();

        if named_collection != collection.as_str() {
            return Err(InvalidInputError::DocumentPath {
                value: name.to_string(),
                reason: format!("expected a document in '{}'", collection),
            }
            .into());
        }

        DocumentPath::parse(format!("{}/{}", named_collection, id))
    }

    fn base_url(&self) -> Result<Url> {
        let mut url = self.options.base_url.as_url().clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::from(InvalidInputError::StoreUrl {
                    value: self.options.base_url.to_string(),
                    reason: "cannot be a base URL".to_string(),
                })
            })?;
            segments
                .pop_if_empty()
                .extend(["v1", "projects", self.options.project_id.as_str()])
                .extend(["databases", self.options.database.as_str()]);
        }
        Ok(url)
    }

    /// URL of a single document.
    pub fn document_url(&self, path: &DocumentPath) -> Result<Url> {
        let mut url = self.base_url()?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(["documents", path.collection().as_str(), path.id().as_str()]);
        }
        Ok(url)
    }

    /// URL of a documents-level method such as `runQuery` or `commit`.
    pub fn method_url(&self, method: &str) -> Result<Url> {
        let mut url = self.base_url()?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&format!("documents:{}", method));
        }
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(key) = &self.options.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(token) = &self.options.bearer_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        request
    }

    /// Make a GET request.
    #[instrument(skip(self), fields(%url))]
    pub async fn get<R>(&self, url: Url) -> Result<R>
    where
        R: DeserializeOwned,
    {
        debug!("Firestore GET");
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Make a POST request with a JSON body.
    #[instrument(skip(self, body), fields(%url))]
    pub async fn post<B, R>(&self, url: Url, body: &B) -> Result<R>
    where
        B: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        debug!("Firestore POST");
        trace!(?body, "request body");

        let response = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Handle a response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(%status, "Firestore response");

        if status.is_success() {
            response.json::<R>().await.map_err(map_reqwest)
        } else {
            Err(Error::Protocol(self.parse_error_response(response).await))
        }
    }

    /// Parse a Firestore error response.
    async fn parse_error_response(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.error.status, body.error.message),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}

fn map_reqwest(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FirebaseConfig;

    fn client() -> RestClient {
        let config = FirebaseConfig::from_lookup(|key| {
            (key == "FIREBASE_PROJECT_ID").then(|| "portfolio".to_string())
        });
        RestClient::new(FirestoreOptions::production(&config).unwrap()).unwrap()
    }

    #[test]
    fn builds_document_url() {
        let path = DocumentPath::parse("caseStudies/bravado-health").unwrap();
        assert_eq!(
            client().document_url(&path).unwrap().as_str(),
            "https://firestore.googleapis.com/v1/projects/portfolio/databases/(default)/documents/caseStudies/bravado-health"
        );
    }

    #[test]
    fn builds_method_url() {
        assert_eq!(
            client().method_url("runQuery").unwrap().as_str(),
            "https://firestore.googleapis.com/v1/projects/portfolio/databases/(default)/documents:runQuery"
        );
    }

    #[test]
    fn escapes_ids_in_urls() {
        let path = DocumentPath::parse("caseStudies/a b?").unwrap();
        let url = client().document_url(&path).unwrap();
        assert!(url.as_str().ends_with("/caseStudies/a%20b%3F"));
    }

    #[test]
    fn parses_document_names() {
        let c = client();
        let collection = CollectionName::new("caseStudies").unwrap();
        let name = "projects/portfolio/databases/(default)/documents/caseStudies/x1";
        let path = c.parse_document_name(name, &collection).unwrap();
        assert_eq!(path.id().as_str(), "x1");

        let other = CollectionName::new("posts").unwrap();
        assert!(c.parse_document_name(name, &other).is_err());
    }
}
