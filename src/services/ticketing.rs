use async_trait::async_trait;

use crate::domain::comment::{Comment, NewComment};
use crate::domain::ticket::{CustomField, Ticket};
use crate::error::AppResult;

/// The narrow capability set the workflows need from the ticketing API.
#[async_trait]
pub trait TicketingService: Send + Sync {
    async fn show_ticket(&self, ticket_id: u64) -> AppResult<Ticket>;

    /// Comments on a ticket, newest first.
    async fn list_comments(&self, ticket_id: u64) -> AppResult<Vec<Comment>>;

    async fn update_ticket_fields(
        &self,
        ticket_id: u64,
        fields: Vec<CustomField>,
    ) -> AppResult<()>;

    async fn create_comment(&self, ticket_id: u64, comment: NewComment) -> AppResult<()>;

    /// Uploads a file and returns the one-time upload token that attaches
    /// it to a subsequent comment.
    async fn create_upload(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String>;

    async fn download_attachment(&self, content_url: &str) -> AppResult<Vec<u8>>;
}
