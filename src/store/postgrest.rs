//! PostgREST（Supabase REST）收藏存储
//!
//! - list:   `GET    /rest/v1/<table>?select=*&order=created_at.desc`
//! - create: `POST   /rest/v1/<table>`，`Prefer: return=representation` 取回新行
//! - update: `PATCH  /rest/v1/<table>?id=eq.<id>`
//! - delete: `DELETE /rest/v1/<table>?id=eq.<id>`
//!
//! 鉴权：`apikey` 与 `Authorization: Bearer` 同为 anon key。
//! 非 2xx 响应取 JSON 中的 `message` 作为错误消息，取不到时用通用消息。

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use crate::core::error::{StoreFailure, StoreOp};
use crate::store::{sort_newest_first, PostStore, SavedPost, DEFAULT_TABLE};

#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl std::fmt::Debug for PostgrestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestStore")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct PostgrestError {
    message: Option<String>,
}

impl PostgrestStore {
    /// base_url 为项目地址（如 `https://<project>.supabase.co`）
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// 发送请求；网络错误与非 2xx 统一转为 StoreFailure
    async fn send(&self, op: StoreOp, req: RequestBuilder) -> Result<Response, StoreFailure> {
        let response = self.authed(req).send().await.map_err(|e| {
            tracing::warn!(op = op.as_str(), error = %e, "PostgREST request failed");
            StoreFailure::from_backend(op, None)
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PostgrestError>(&body)
            .ok()
            .and_then(|e| e.message);
        tracing::warn!(op = op.as_str(), status = status.as_u16(), "PostgREST returned error");
        Err(StoreFailure::from_backend(op, message))
    }

    async fn rows(op: StoreOp, response: Response) -> Result<Vec<SavedPost>, StoreFailure> {
        response.json::<Vec<SavedPost>>().await.map_err(|e| {
            tracing::warn!(op = op.as_str(), error = %e, "PostgREST response not decodable");
            StoreFailure::from_backend(op, None)
        })
    }
}

#[async_trait]
impl PostStore for PostgrestStore {
    async fn list(&self) -> Result<Vec<SavedPost>, StoreFailure> {
        let req = self
            .client
            .get(self.endpoint())
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let response = self.send(StoreOp::List, req).await?;
        let mut posts = Self::rows(StoreOp::List, response).await?;
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn create(&self, content: &str) -> Result<SavedPost, StoreFailure> {
        let req = self
            .client
            .post(self.endpoint())
            .header("Prefer", "return=representation")
            .json(&json!([{ "content": content }]));
        let response = self.send(StoreOp::Create, req).await?;
        Self::rows(StoreOp::Create, response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreFailure::from_backend(StoreOp::Create, None))
    }

    async fn update(&self, id: &str, content: &str) -> Result<(), StoreFailure> {
        let req = self
            .client
            .patch(self.endpoint())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&json!({ "content": content }));
        let response = self.send(StoreOp::Update, req).await?;
        if Self::rows(StoreOp::Update, response).await?.is_empty() {
            return Err(StoreFailure::new(StoreOp::Update, format!("Tweet not found: {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreFailure> {
        let req = self
            .client
            .delete(self.endpoint())
            .query(&[("id", format!("eq.{}", id))]);
        self.send(StoreOp::Delete, req).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgrest"
    }
}
