use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::comment::{Comment, NewComment};
use crate::domain::ticket::{CustomField, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::TicketingService;

/// Zendesk REST client. All calls authenticate with `{email}/token` plus
/// the API token as Basic auth; URLs are templated by subdomain.
pub struct ZendeskClient {
    http: Client,
    subdomain: String,
    email: String,
    token: String,
}

impl ZendeskClient {
    pub fn new(subdomain: String, email: String, token: String) -> Self {
        Self {
            http: Client::new(),
            subdomain,
            email,
            token,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("https://{}.zendesk.com/api/v2/{}", self.subdomain, path)
    }

    fn auth_username(&self) -> String {
        format!("{}/token", self.email)
    }

    async fn ensure_success(response: Response, what: &str) -> AppResult<Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Ticketing(format!(
                "Zendesk responded with {status} on {what}: {body}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl TicketingService for ZendeskClient {
    async fn show_ticket(&self, ticket_id: u64) -> AppResult<Ticket> {
        let url = self.api_url(&format!("tickets/{ticket_id}.json"));
        debug!("apiURL {url}");

        let response = self
            .http
            .get(&url)
            .basic_auth(self.auth_username(), Some(&self.token))
            .send()
            .await
            .map_err(|err| AppError::Ticketing(format!("failed to call Zendesk: {err}")))?;

        if response.status() != StatusCode::OK {
            return Err(AppError::Ticketing(
                "ticket data weren't fetched".to_string(),
            ));
        }

        let payload: ShowTicketResponse = response.json().await.map_err(|err| {
            AppError::Ticketing(format!("failed to parse ticket response: {err}"))
        })?;
        Ok(payload.ticket)
    }

    async fn list_comments(&self, ticket_id: u64) -> AppResult<Vec<Comment>> {
        let url = self.api_url(&format!("tickets/{ticket_id}/comments.json"));
        debug!("apiURL {url}");

        let response = self
            .http
            .get(&url)
            .query(&[("sort_order", "desc")])
            .basic_auth(self.auth_username(), Some(&self.token))
            .send()
            .await
            .map_err(|err| AppError::Ticketing(format!("failed to call Zendesk: {err}")))?;

        let response = Self::ensure_success(response, "comment listing").await?;
        let payload: ListCommentsResponse = response.json().await.map_err(|err| {
            AppError::Ticketing(format!("failed to parse comments response: {err}"))
        })?;
        Ok(payload.comments)
    }

    async fn update_ticket_fields(
        &self,
        ticket_id: u64,
        fields: Vec<CustomField>,
    ) -> AppResult<()> {
        let url = self.api_url(&format!("tickets/{ticket_id}.json"));
        debug!("apiURL {url}");

        let request_body = TicketUpdateRequest {
            ticket: TicketFields {
                custom_fields: fields,
            },
        };
        let response = self
            .http
            .put(&url)
            .basic_auth(self.auth_username(), Some(&self.token))
            .json(&request_body)
            .send()
            .await
            .map_err(|err| AppError::Ticketing(format!("failed to call Zendesk: {err}")))?;

        Self::ensure_success(response, "ticket update").await?;
        Ok(())
    }

    async fn create_comment(&self, ticket_id: u64, comment: NewComment) -> AppResult<()> {
        let url = self.api_url(&format!("tickets/{ticket_id}.json"));
        debug!("apiURL {url}");

        let request_body = CommentCreateRequest {
            ticket: TicketComment { comment },
        };
        let response = self
            .http
            .put(&url)
            .basic_auth(self.auth_username(), Some(&self.token))
            .json(&request_body)
            .send()
            .await
            .map_err(|err| AppError::Ticketing(format!("failed to call Zendesk: {err}")))?;

        Self::ensure_success(response, "comment creation").await?;
        Ok(())
    }

    async fn create_upload(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
        let url = self.api_url("uploads.json");
        debug!("apiURL {url}");

        let response = self
            .http
            .post(&url)
            .query(&[("filename", file_name)])
            .header(CONTENT_TYPE, "application/binary")
            .basic_auth(self.auth_username(), Some(&self.token))
            .body(bytes)
            .send()
            .await
            .map_err(|err| AppError::Ticketing(format!("failed to call Zendesk: {err}")))?;

        if response.status() != StatusCode::CREATED {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Ticketing(format!(
                "upload of {file_name} was not created: {status}: {body}"
            )));
        }

        let payload: CreateUploadResponse = response.json().await.map_err(|err| {
            AppError::Ticketing(format!("failed to parse upload response: {err}"))
        })?;
        Ok(payload.upload.token)
    }

    async fn download_attachment(&self, content_url: &str) -> AppResult<Vec<u8>> {
        let response = self
            .http
            .get(content_url)
            .basic_auth(self.auth_username(), Some(&self.token))
            .send()
            .await
            .map_err(|err| AppError::Ticketing(format!("failed to call Zendesk: {err}")))?;

        let response = Self::ensure_success(response, "attachment download").await?;
        let bytes = response.bytes().await.map_err(|err| {
            AppError::Ticketing(format!("failed to read attachment body: {err}"))
        })?;
        Ok(bytes.to_vec())
    }
}

#[derive(Serialize)]
struct TicketUpdateRequest {
    ticket: TicketFields,
}

#[derive(Serialize)]
struct TicketFields {
    custom_fields: Vec<CustomField>,
}

#[derive(Serialize)]
struct CommentCreateRequest {
    ticket: TicketComment,
}

#[derive(Serialize)]
struct TicketComment {
    comment: NewComment,
}

#[derive(Deserialize)]
struct ShowTicketResponse {
    ticket: Ticket,
}

#[derive(Deserialize)]
struct ListCommentsResponse {
    comments: Vec<Comment>,
}

#[derive(Deserialize)]
struct CreateUploadResponse {
    upload: UploadToken,
}

#[derive(Deserialize)]
struct UploadToken {
    token: String,
}
