//! `reqwest`-backed implementation of [`TodoApi`]

use super::{ApiConfig, TodoApi};
use crate::error::{ApiError, ApiResult};
use crate::types::{NewTodo, PatchBody, Todo, TodoId, TodoListResponse};
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

/// HTTP client for the remote todo collection
///
/// Every request carries the configured headers. Any non-2xx response is an
/// [`ApiError::Status`].
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    config: ApiConfig,
    headers: HeaderMap,
}

impl HttpTodoApi {
    /// Build a client from `config`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfig`] if the base URL does not parse, a
    /// header name or value is invalid, or the underlying client cannot be
    /// built.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidConfig(format!("base URL {}: {e}", config.base_url)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidConfig(format!("header name {name}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidConfig(format!("header {name}: {e}")))?;
            headers.insert(header_name, header_value);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            config,
            headers,
        })
    }

    /// Client for the default local server
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfig`] if the HTTP client cannot be built.
    pub fn local() -> ApiResult<Self> {
        Self::new(ApiConfig::default())
    }

    /// The configuration this client was built from
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        tracing::debug!(%method, %url, "Sending API request");
        self.client.request(method, url).headers(self.headers.clone())
    }

    async fn send(request: RequestBuilder) -> ApiResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), %message, "API request rejected");
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ApiResult<T> {
        Self::send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
    }
}

impl TodoApi for HttpTodoApi {
    fn list(&self) -> BoxFuture<'_, ApiResult<Vec<Todo>>> {
        let request = self.request(Method::GET, self.config.collection_url());
        async move {
            let response: TodoListResponse = Self::send_json(request).await?;
            Ok(response.todo_list)
        }
        .boxed()
    }

    fn create(&self, todo: NewTodo) -> BoxFuture<'_, ApiResult<Todo>> {
        let request = self
            .request(Method::POST, self.config.collection_url())
            .json(&todo);
        Self::send_json(request).boxed()
    }

    fn update(&self, id: TodoId, body: PatchBody) -> BoxFuture<'_, ApiResult<Todo>> {
        let request = self
            .request(Method::PATCH, self.config.item_url(id))
            .json(&body);
        Self::send_json(request).boxed()
    }

    fn delete(&self, id: TodoId) -> BoxFuture<'_, ApiResult<()>> {
        let request = self.request(Method::DELETE, self.config.item_url(id));
        async move {
            Self::send(request).await?;
            Ok(())
        }
        .boxed()
    }
}
