//! `RealtimeApi` over reqwest

use async_trait::async_trait;
use parking_lot::RwLock;
use pulse_common::ApiConfig;
use pulse_core::{
    ApiResult, DomainError, LikeState, MessageId, MessageReactions, PostId, ReadReceiptSet,
    RealtimeApi, RoomId,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::responses::{LikeResponse, ReactionsResponse, ReadsResponse, UnreadCountResponse};
use crate::error::{error_message, status_error, transport_error};

/// HTTP collaborator client
///
/// The bearer token is swapped by the connection manager whenever the session changes.
pub struct HttpApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DomainError::InternalError(format!("http client: {e}")))?;
        Ok(Self::with_client(http, &config.base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        not_found: impl FnOnce() -> DomainError + Send,
    ) -> ApiResult<Response> {
        let response = builder.send().await.map_err(|e| transport_error(&e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::debug!(status = status.as_u16(), error = %message, "HTTP request failed");
        Err(status_error(status, message, not_found))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        not_found: impl FnOnce() -> DomainError + Send,
    ) -> ApiResult<T> {
        self.send(builder, not_found)
            .await?
            .json::<T>()
            .await
            .map_err(|e| DomainError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.base_url)
            .field("authorized", &self.token.read().is_some())
            .finish()
    }
}

fn internal(what: &'static str) -> impl FnOnce() -> DomainError + Send {
    move || DomainError::InternalError(format!("{what} endpoint not found"))
}

fn message_not_found(message_id: &MessageId) -> impl FnOnce() -> DomainError + Send {
    let message_id = message_id.clone();
    move || DomainError::MessageNotFound(message_id)
}

#[async_trait]
impl RealtimeApi for HttpApiClient {
    fn authorize(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    async fn health(&self) -> ApiResult<()> {
        self.send(self.request(Method::GET, "/api/health"), internal("health"))
            .await
            .map(drop)
    }

    async fn unread_notification_count(&self) -> ApiResult<u64> {
        let response: UnreadCountResponse = self
            .fetch(
                self.request(Method::GET, "/api/notifications/unread-count"),
                internal("notification count"),
            )
            .await?;
        Ok(response.unread_count)
    }

    async fn unread_room_count(&self) -> ApiResult<u64> {
        let response: UnreadCountResponse = self
            .fetch(
                self.request(Method::GET, "/api/rooms/unread-count"),
                internal("room count"),
            )
            .await?;
        Ok(response.unread_count)
    }

    async fn message_reactions(&self, message_id: &MessageId) -> ApiResult<MessageReactions> {
        let path = format!("/api/messages/{message_id}/reactions");
        let response: ReactionsResponse = self
            .fetch(self.request(Method::GET, &path), message_not_found(message_id))
            .await?;
        Ok(response.into_inner())
    }

    async fn message_reads(&self, message_id: &MessageId) -> ApiResult<ReadReceiptSet> {
        let path = format!("/api/messages/{message_id}/reads");
        let response: ReadsResponse = self
            .fetch(self.request(Method::GET, &path), message_not_found(message_id))
            .await?;
        Ok(response.into_inner())
    }

    async fn add_reaction(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
        content: &str,
    ) -> ApiResult<()> {
        if content.trim().is_empty() {
            return Err(DomainError::EmptyReaction);
        }
        let path = format!("/api/messages/{message_id}/reactions");
        let request = self
            .request(Method::POST, &path)
            .json(&json!({ "roomId": room_id, "content": content }));
        self.send(request, message_not_found(message_id)).await.map(drop)
    }

    async fn remove_reaction(&self, message_id: &MessageId, room_id: &RoomId) -> ApiResult<()> {
        let path = format!("/api/messages/{message_id}/reactions");
        let request = self
            .request(Method::DELETE, &path)
            .query(&[("roomId", room_id.as_str())]);
        self.send(request, message_not_found(message_id)).await.map(drop)
    }

    async fn mark_message_read(&self, message_id: &MessageId, room_id: &RoomId) -> ApiResult<()> {
        let path = format!("/api/messages/{message_id}/read");
        let request = self
            .request(Method::POST, &path)
            .json(&json!({ "roomId": room_id }));
        self.send(request, message_not_found(message_id)).await.map(drop)
    }

    async fn delete_message(&self, message_id: &MessageId, room_id: &RoomId) -> ApiResult<()> {
        let path = format!("/api/messages/{message_id}");
        let request = self
            .request(Method::DELETE, &path)
            .query(&[("roomId", room_id.as_str())]);
        self.send(request, message_not_found(message_id)).await.map(drop)
    }

    async fn set_post_like(&self, post_id: &PostId, liked: bool) -> ApiResult<LikeState> {
        let path = format!("/api/posts/{post_id}/like");
        let method = if liked { Method::POST } else { Method::DELETE };
        let not_found = {
            let post_id = post_id.clone();
            move || DomainError::PostNotFound(post_id)
        };

        let response: LikeResponse = self.fetch(self.request(method, &path), not_found).await?;
        Ok(LikeState::new(post_id.clone(), response.liked, response.count))
    }
}
