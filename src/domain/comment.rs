use serde::{Deserialize, Serialize};

/// A full ticket comment as returned by the comments listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub author_id: u64,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub html_body: String,
    pub public: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub file_name: String,
    pub content_url: String,
}

/// Payload for appending a comment to a ticket. Exactly one of `body`
/// and `html_body` is set; `uploads` is omitted from the wire format
/// entirely when no upload token was collected.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub author_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploads: Option<Vec<String>>,
}

impl NewComment {
    pub fn plain(author_id: u64, body: String, public: bool) -> Self {
        Self {
            author_id,
            body: Some(body),
            html_body: None,
            public,
            uploads: None,
        }
    }

    pub fn html(author_id: u64, html_body: String, public: bool) -> Self {
        Self {
            author_id,
            body: None,
            html_body: Some(html_body),
            public,
            uploads: None,
        }
    }
}
