use crate::response::{ApiError, Block, DataSource, ErrorCode, List, NotionId, Page};
use reqwest::{
    header::{self, HeaderMap, HeaderValue, InvalidHeaderValue},
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::ops::Not;
use thiserror::Error;

pub const NOTION_API: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2025-09-03";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("auth token is not a valid header value")]
    InvalidToken(#[from] InvalidHeaderValue),

    #[error("invalid request URL {url}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    #[error("failed to parse JSON for request {url}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("{url} responded with {status}: {code}: {message}")]
    Rejected {
        url: String,
        status: StatusCode,
        code: ErrorCode,
        message: String,
    },
}

mod request {
    use super::FetchError;
    use reqwest::{header::HeaderMap, Body, Method, Request, Url};
    use serde::Serialize;

    pub(crate) struct RequestBuilder {
        request: Request,
    }

    impl RequestBuilder {
        pub(crate) fn new(method: Method, url: &str) -> Result<Self, FetchError> {
            let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
                url: url.to_string(),
                source,
            })?;

            Ok(Self {
                request: Request::new(method, parsed),
            })
        }

        pub(crate) fn headers(self, headers: &HeaderMap) -> Self {
            let mut request = self.request;

            request
                .headers_mut()
                .extend(headers.iter().map(|(key, value)| (key.clone(), value.clone())));

            Self { request }
        }

        pub(crate) fn json<T>(self, json: &T) -> Result<Self, FetchError>
        where
            T: Serialize,
        {
            let mut request = self.request;

            let body = request.body_mut();

            *body = Some(Body::from(
                serde_json::to_vec(json).map_err(FetchError::Encode)?,
            ));

            Ok(Self { request })
        }

        pub(crate) fn build(self) -> Request {
            self.request
        }
    }
}
use request::RequestBuilder;

/// A fully described call against the Notion API
///
/// Every resource operation is its own type so what comes back is decided by what was asked
/// for.
pub trait Request {
    type Response: DeserializeOwned;

    fn method(&self) -> Method;

    /// Path relative to the API root, without a leading slash
    fn path(&self) -> String;

    fn body(&self) -> Option<&QueryBody> {
        None
    }
}

pub struct PageRequest {
    id: NotionId,
}

impl PageRequest {
    pub fn new(id: NotionId) -> Self {
        PageRequest { id }
    }
}

impl Request for PageRequest {
    type Response = Page;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("pages/{}", self.id)
    }
}

pub struct BlockRequest {
    id: NotionId,
}

impl BlockRequest {
    pub fn new(id: NotionId) -> Self {
        BlockRequest { id }
    }

    pub fn children(self) -> BlockChildrenRequest {
        BlockChildrenRequest { id: self.id }
    }
}

impl Request for BlockRequest {
    type Response = Block;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("blocks/{}", self.id)
    }
}

pub struct BlockChildrenRequest {
    id: NotionId,
}

impl Request for BlockChildrenRequest {
    type Response = List<Block>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("blocks/{}/children", self.id)
    }
}

pub struct DataSourceRequest {
    id: NotionId,
}

impl DataSourceRequest {
    pub fn new(id: NotionId) -> Self {
        DataSourceRequest { id }
    }

    /// Turns this into a query. With neither a filter nor sorts no body is sent at all.
    pub fn query(self, filter: Option<Filter>, sorts: Option<Vec<Sort>>) -> DataSourceQuery {
        let body = (filter.is_some() || sorts.is_some()).then(|| QueryBody {
            filter: filter.map(|filter| filter.0),
            sorts,
        });

        DataSourceQuery { id: self.id, body }
    }
}

impl Request for DataSourceRequest {
    type Response = DataSource;

    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> String {
        format!("data_sources/{}", self.id)
    }
}

pub struct DataSourceQuery {
    id: NotionId,
    body: Option<QueryBody>,
}

impl Request for DataSourceQuery {
    type Response = List<Page>;

    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        format!("data_sources/{}/query", self.id)
    }

    fn body(&self) -> Option<&QueryBody> {
        self.body.as_ref()
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct QueryBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorts: Option<Vec<Sort>>,
}

// As defined in https://developers.notion.com/reference/filter-data-source-entries
#[derive(Debug, Clone, PartialEq)]
pub struct Filter(Value);

impl Filter {
    pub fn new(filter: Value) -> Self {
        Filter(filter)
    }

    pub fn checkbox_equals(property: &str, equals: bool) -> Self {
        Filter(json!({
            "property": property,
            "checkbox": { "equals": equals },
        }))
    }
}

// As defined in https://developers.notion.com/reference/sort-data-source-entries
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Sort {
    pub property: String,
    pub direction: Direction,
}

impl Sort {
    pub fn ascending(property: &str) -> Self {
        Sort {
            property: property.to_string(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(property: &str) -> Self {
        Sort {
            property: property.to_string(),
            direction: Direction::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

/// Authenticated access to the Notion API
///
/// Immutable once built, share it behind an `Arc`.
#[derive(Clone)]
pub struct NotionClient {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl NotionClient {
    pub fn new(auth_token: &str) -> Result<Self, FetchError> {
        Self::with_base_url(auth_token, NOTION_API)
    }

    pub fn with_base_url(auth_token: &str, base_url: &str) -> Result<Self, FetchError> {
        let mut authorization = HeaderValue::try_from(format!("Bearer {}", auth_token))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, authorization);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        Ok(NotionClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    fn build_request<R>(&self, url: &str, request: &R) -> Result<RequestBuilder, FetchError>
    where
        R: Request,
    {
        let builder = RequestBuilder::new(request.method(), url)?.headers(&self.headers);

        match request.body() {
            Some(body) => builder.json(body),
            None => Ok(builder),
        }
    }

    pub async fn fetch<R>(&self, request: &R) -> Result<R::Response, FetchError>
    where
        R: Request,
    {
        let url = format!("{}/{}", self.base_url, request.path());
        log::debug!("{} {}", request.method(), url);

        let built = self.build_request(&url, request)?.build();

        let response = match self.client.execute(built).await {
            Ok(response) => response,
            Err(source) => return Err(FetchError::Transport { url, source }),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(source) => return Err(FetchError::Transport { url, source }),
        };

        if status.is_success().not() {
            let (code, message) = match serde_json::from_str::<ApiError>(&text) {
                Ok(error) => (error.code, error.message),
                Err(_) => (ErrorCode::Unknown, text),
            };

            return Err(FetchError::Rejected {
                url,
                status,
                code,
                message,
            });
        }

        serde_json::from_str(&text).map_err(|source| FetchError::Decode { url, source })
    }

    /// Every direct child of a block, which for a page is its content
    pub async fn get_block_children(&self, id: NotionId) -> Result<Vec<Block>, FetchError> {
        let list = self.fetch(&BlockRequest::new(id).children()).await?;
        Ok(truncated(list))
    }

    pub async fn query_data_source(
        &self,
        id: NotionId,
        filter: Option<Filter>,
        sorts: Option<Vec<Sort>>,
    ) -> Result<Vec<Page>, FetchError> {
        let list = self
            .fetch(&DataSourceRequest::new(id).query(filter, sorts))
            .await?;
        Ok(truncated(list))
    }
}

// Only the first page of results is ever read
fn truncated<T>(list: List<T>) -> Vec<T> {
    if list.has_more {
        log::warn!(
            "Only the first {} results were returned, the rest were not fetched",
            list.results.len()
        );
    }

    list.results
}
