use serde::{Deserialize, Deserializer};

/// Inbound webhook payload as forwarded by the gateway mapping template:
/// a `detail` envelope wrapping the ticketing system's ticket event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub detail: Option<EventDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDetail {
    pub ticket_event: Option<TicketEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketEvent {
    pub ticket: EventTicket,
    pub comment: Option<EventComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventTicket {
    pub id: u64,
}

/// The comment as carried by the event. This is a partial view: the
/// command workflow re-fetches the full comment through the API.
#[derive(Debug, Clone, Deserialize)]
pub struct EventComment {
    pub id: u64,
    pub author: EventAuthor,
    #[serde(default)]
    pub body: String,
    #[serde(deserialize_with = "bool_from_flag")]
    pub is_public: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventAuthor {
    pub id: u64,
}

impl WebhookEvent {
    pub fn ticket_event(&self) -> Option<&TicketEvent> {
        self.detail.as_ref().and_then(|detail| detail.ticket_event.as_ref())
    }
}

/// The trigger template renders booleans as the strings `"true"` and
/// `"false"`; directly-delivered events carry real booleans. Accept both.
fn bool_from_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(value) => value == "true",
    })
}
