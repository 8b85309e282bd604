use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use crate::api::{ContentApi, PageRef, PageSpec};
use crate::block::Block;
use crate::config::NotionConfig;
use crate::error::ApiError;
use crate::wire::{AppendChildrenRequest, ArchiveRequest, CreatePageRequest, wire_blocks};

/// Notion REST implementation of [`ContentApi`].
pub struct NotionClient {
    client: Client,
    token: String,
    base_url: String,
    version: String,
}

#[derive(Deserialize)]
struct PageResponse {
    id: String,
    url: Option<String>,
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::from_config(token, &NotionConfig::default())
    }

    pub fn from_config(token: impl Into<String>, config: &NotionConfig) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            version: config.version.clone(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .header("Content-Type", "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(status.as_u16(), &body));
        }
        Ok(response)
    }
}

#[async_trait]
impl ContentApi for NotionClient {
    async fn create_page(&self, page: &PageSpec, children: &[Block]) -> Result<PageRef, ApiError> {
        let body = CreatePageRequest::new(
            &page.parent_id,
            &page.title,
            page.icon.as_deref(),
            children,
        );
        debug!(title = %page.title, blocks = children.len(), "creating page");

        let response = self
            .send(self.request(reqwest::Method::POST, "pages").json(&body))
            .await?;
        let page: PageResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(PageRef {
            id: page.id,
            url: page.url,
        })
    }

    async fn append_children(&self, page_id: &str, children: &[Block]) -> Result<(), ApiError> {
        let body = AppendChildrenRequest {
            children: wire_blocks(children),
        };
        debug!(page_id, blocks = children.len(), "appending blocks");

        self.send(
            self.request(reqwest::Method::PATCH, &format!("blocks/{page_id}/children"))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn archive_page(&self, page_id: &str) -> Result<(), ApiError> {
        debug!(page_id, "archiving page");

        self.send(
            self.request(reqwest::Method::PATCH, &format!("pages/{page_id}"))
                .json(&ArchiveRequest { archived: true }),
        )
        .await?;
        Ok(())
    }
}
