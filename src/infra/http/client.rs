use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, Method, header::AUTHORIZATION};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::application::repos::{AdminApi, ApiError, CategorySource, ServerQuery};
use crate::domain::content::ContentKind;
use crate::infra::telemetry::{HTTP_REQUEST_FAILURES_TOTAL, HTTP_REQUEST_MS, HTTP_REQUESTS_TOTAL};

/// `reqwest` implementation of [`AdminApi`] rooted at `{base}/api/admin`.
#[derive(Clone, Debug)]
pub struct AdminClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl AdminClient {
    pub fn new(base: Url, token: Option<String>) -> Result<Self, ApiError> {
        if base.cannot_be_a_base() {
            return Err(ApiError::Url(format!("`{base}` cannot be used as a base url")));
        }
        let http = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self { http, base, token })
    }

    pub fn user_agent() -> &'static str {
        concat!("hackerthink-admin/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(format!("`{}` cannot be used as a base url", self.base)))?
            .pop_if_empty()
            .extend(["api", "admin"])
            .extend(segments);
        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        collection: &'static str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let method_label = method.as_str().to_string();
        let path = url.path().to_string();
        let started = Instant::now();

        let mut request = self.http.request(method, url);
        if let Some(token) = self.token.as_deref() {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body.as_ref() {
            request = request.json(body);
        }

        let outcome = async {
            let response = request.send().await.map_err(ApiError::transport)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(ApiError::transport)?;
            if !status.is_success() {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }
            decode_body(&bytes)
        }
        .await;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        counter!(HTTP_REQUESTS_TOTAL, "method" => method_label.clone(), "collection" => collection)
            .increment(1);
        histogram!(HTTP_REQUEST_MS, "method" => method_label.clone(), "collection" => collection)
            .record(elapsed_ms);

        match &outcome {
            Ok(_) => debug!(method = %method_label, %path, elapsed_ms, "admin api request"),
            Err(err) => {
                counter!(
                    HTTP_REQUEST_FAILURES_TOTAL,
                    "method" => method_label.clone(),
                    "collection" => collection
                )
                .increment(1);
                warn!(method = %method_label, %path, error = %err, "admin api request failed");
            }
        }
        outcome
    }
}

/// Empty bodies (e.g. `204 No Content`) decode to `null`.
fn decode_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(ApiError::decode)
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn fetch_collection(
        &self,
        kind: ContentKind,
        query: &ServerQuery,
    ) -> Result<Value, ApiError> {
        let mut url = self.endpoint(&[kind.collection()])?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        self.execute(Method::GET, url, kind.collection(), None).await
    }

    async fn patch_item(&self, kind: ContentKind, id: &str, patch: Value) -> Result<(), ApiError> {
        let url = self.endpoint(&[kind.collection(), id])?;
        self.execute(Method::PATCH, url, kind.collection(), Some(patch))
            .await
            .map(drop)
    }

    async fn replace_item(
        &self,
        kind: ContentKind,
        id: &str,
        record: Value,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(&[kind.collection(), id])?;
        self.execute(Method::PUT, url, kind.collection(), Some(record)).await
    }

    async fn toggle_publish(&self, kind: ContentKind, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&[kind.collection(), id, "publish"])?;
        self.execute(Method::POST, url, kind.collection(), None)
            .await
            .map(drop)
    }

    async fn delete_item(&self, kind: ContentKind, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&[kind.collection(), id])?;
        self.execute(Method::DELETE, url, kind.collection(), None)
            .await
            .map(drop)
    }

    async fn fetch_categories(&self, source: CategorySource) -> Result<Value, ApiError> {
        let url = self.endpoint(source.segments())?;
        self.execute(Method::GET, url, "categories", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> AdminClient {
        AdminClient::new(Url::parse(base).expect("url"), None).expect("client")
    }

    #[test]
    fn endpoints_nest_under_admin_prefix() {
        let url = client("http://localhost:3000").endpoint(&["news", "7"]).expect("url");
        assert_eq!(url.as_str(), "http://localhost:3000/api/admin/news/7");
    }

    #[test]
    fn base_paths_are_preserved() {
        let url = client("https://example.com/cms/")
            .endpoint(&["taxonomy", "categories"])
            .expect("url");
        assert_eq!(url.as_str(), "https://example.com/cms/api/admin/taxonomy/categories");
    }

    #[test]
    fn ids_are_percent_encoded() {
        let url = client("http://localhost:3000")
            .endpoint(&["interviews", "a/b c"])
            .expect("url");
        assert_eq!(url.path(), "/api/admin/interviews/a%2Fb%20c");
    }

    #[test]
    fn empty_bodies_decode_to_null() {
        assert_eq!(decode_body(b"").expect("empty"), Value::Null);
        assert_eq!(decode_body(b" \n").expect("blank"), Value::Null);
        assert!(matches!(decode_body(b"{oops"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn opaque_urls_are_rejected() {
        let base = Url::parse("mailto:admin@example.com").expect("url");
        assert!(matches!(AdminClient::new(base, None), Err(ApiError::Url(_))));
    }
}
