use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::domain::comment::{Attachment, NewComment};
use crate::domain::event::{EventComment, WebhookEvent};
use crate::domain::language::detect_language;
use crate::domain::ticket::{CustomField, language_field_value};
use crate::error::{AppError, AppResult};
use crate::services::AUTO_SOURCE_LANGUAGE;

/// Language incoming comments are translated into, and the source
/// language of outgoing replies.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Marker that turns an internal note into a translation command.
pub const TRANSLATE_COMMAND: &str = "#translate";

/// What one webhook invocation did.
#[derive(Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A foreign public comment was translated and posted as an internal
    /// note, with the detected source language recorded on the ticket.
    TranslatedIncoming { source_language: String },
    /// An agent note was translated and posted publicly, attaching the
    /// given number of copied uploads.
    TranslatedReply { uploads: usize },
    Skipped(SkipReason),
}

#[derive(Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoComment,
    AlreadyTargetLanguage,
    NotACommand,
    NoStoredLanguage,
    CommentNotFound,
}

/// Entry point for one webhook invocation. Classifies the event and runs
/// the matching workflow. Callers decide what to do with a failure; the
/// workflow itself never swallows one.
pub async fn handle_event(ctx: &AppContext, event: WebhookEvent) -> AppResult<WebhookOutcome> {
    let Some(ticket_event) = event.ticket_event() else {
        return Err(AppError::Event(
            "event does not contain a ticket event".to_string(),
        ));
    };

    let ticket_id = ticket_event.ticket.id;
    info!("Ticket ID: {ticket_id}");

    let Some(comment) = ticket_event.comment.as_ref() else {
        warn!("the event for ticket {ticket_id} doesn't contain any comment to handle");
        return Ok(WebhookOutcome::Skipped(SkipReason::NoComment));
    };
    info!("Comment ID: {}", comment.id);

    if comment.is_public {
        handle_public_comment(ctx, ticket_id, comment).await
    } else {
        handle_internal_note(ctx, ticket_id, comment).await
    }
}

/// A new public comment: detect its language and, when foreign, post the
/// translation as an internal note, recording the source language on the
/// ticket's language field first.
async fn handle_public_comment(
    ctx: &AppContext,
    ticket_id: u64,
    comment: &EventComment,
) -> AppResult<WebhookOutcome> {
    let detection = detect_language(&comment.body);
    debug!("language detection: {detection:?}");
    if let Some(detected) = &detection {
        if detected.reliable && detected.code == DEFAULT_LANGUAGE {
            return Ok(WebhookOutcome::Skipped(SkipReason::AlreadyTargetLanguage));
        }
    }

    let translation = ctx
        .translator
        .translate(&comment.body, AUTO_SOURCE_LANGUAGE, DEFAULT_LANGUAGE)
        .await?;
    if translation.source_language == DEFAULT_LANGUAGE {
        return Ok(WebhookOutcome::Skipped(SkipReason::AlreadyTargetLanguage));
    }

    ctx.ticketing
        .update_ticket_fields(
            ticket_id,
            vec![CustomField {
                id: ctx.config.ticket_lang_field_id,
                value: Some(language_field_value(&translation.source_language)),
            }],
        )
        .await?;

    ctx.ticketing
        .create_comment(
            ticket_id,
            NewComment::plain(comment.author.id, translation.text, false),
        )
        .await?;

    Ok(WebhookOutcome::TranslatedIncoming {
        source_language: translation.source_language,
    })
}

/// A new internal note: when it starts with the `#translate` command,
/// translate the full note into the ticket's stored language and post it
/// publicly, copying the attachments across.
async fn handle_internal_note(
    ctx: &AppContext,
    ticket_id: u64,
    comment: &EventComment,
) -> AppResult<WebhookOutcome> {
    if !comment.body.starts_with(TRANSLATE_COMMAND) {
        debug!("internal note doesn't contain {TRANSLATE_COMMAND}");
        return Ok(WebhookOutcome::Skipped(SkipReason::NotACommand));
    }

    let ticket = ctx.ticketing.show_ticket(ticket_id).await?;
    let stored = ticket
        .stored_language(ctx.config.ticket_lang_field_id)
        .map(str::to_string);
    let target_language = match stored {
        Some(code) if code != DEFAULT_LANGUAGE => code,
        other => {
            debug!("translation language {other:?}");
            return Ok(WebhookOutcome::Skipped(SkipReason::NoStoredLanguage));
        }
    };

    // The event carries a partial comment; re-read the full one from the
    // comment listing (newest first).
    let comments = ctx.ticketing.list_comments(ticket_id).await?;
    let Some(full_comment) = comments.into_iter().find(|candidate| candidate.id == comment.id)
    else {
        warn!("the comment wasn't found");
        return Ok(WebhookOutcome::Skipped(SkipReason::CommentNotFound));
    };

    let normalized = escape_html(&full_comment.html_body.replacen(TRANSLATE_COMMAND, "", 1));
    debug!("comment {}", full_comment.html_body);
    debug!("normalized {normalized}");

    let translation = ctx
        .translator
        .translate(&normalized, DEFAULT_LANGUAGE, &target_language)
        .await?;

    let mut tokens = Vec::new();
    for attachment in &full_comment.attachments {
        match copy_attachment(ctx, full_comment.id, attachment).await {
            Ok(token) => tokens.push(token),
            Err(error) => {
                warn!("error while copying attachment {}: {error}", attachment.id);
            }
        }
    }

    let mut translated_comment = NewComment::html(comment.author.id, translation.text, true);
    let uploads = tokens.len();
    if !tokens.is_empty() {
        translated_comment.uploads = Some(tokens);
    }

    ctx.ticketing
        .create_comment(ticket_id, translated_comment)
        .await?;

    Ok(WebhookOutcome::TranslatedReply { uploads })
}

/// Proxies one attachment: download its bytes into a uniquely named temp
/// file, upload the file under the original name, and return the upload
/// token. The temp file is removed only after a successful upload.
async fn copy_attachment(
    ctx: &AppContext,
    comment_id: u64,
    attachment: &Attachment,
) -> AppResult<String> {
    info!(
        "Downloading file {} for attachment {}...",
        attachment.file_name, attachment.id
    );
    let bytes = ctx
        .ticketing
        .download_attachment(&attachment.content_url)
        .await?;

    let path = temp_file_path(comment_id, attachment.id);
    tokio::fs::write(&path, &bytes).await?;

    info!("Uploading file {}...", attachment.file_name);
    let payload = tokio::fs::read(&path).await?;
    let token = ctx
        .ticketing
        .create_upload(&attachment.file_name, payload)
        .await?;

    tokio::fs::remove_file(&path).await?;
    Ok(token)
}

fn temp_file_path(comment_id: u64, attachment_id: u64) -> PathBuf {
    std::env::temp_dir().join(format!(
        "zendesk_comment_file_{comment_id}_{attachment_id}"
    ))
}

/// Escapes the characters Zendesk rejects in HTML comment bodies.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::config::AppConfig;
    use crate::domain::comment::Comment;
    use crate::domain::event::{EventAuthor, EventDetail, EventTicket, TicketEvent};
    use crate::domain::ticket::Ticket;
    use crate::error::AppError;
    use crate::services::{TicketingService, Translation, TranslationService};

    const LANG_FIELD_ID: u64 = 360011234;

    fn test_config() -> AppConfig {
        AppConfig {
            subdomain: "support-acme".to_string(),
            email: "agent@acme.example".to_string(),
            access_token_param_key: "/zendesk/access-token".to_string(),
            ticket_lang_field_id: LANG_FIELD_ID,
        }
    }

    struct FakeTicketing {
        ticket: Ticket,
        comments: Vec<Comment>,
        calls: Mutex<Vec<&'static str>>,
        updated_fields: Mutex<Vec<(u64, Vec<CustomField>)>>,
        created_comments: Mutex<Vec<(u64, NewComment)>>,
    }

    impl FakeTicketing {
        fn new(ticket: Ticket, comments: Vec<Comment>) -> Self {
            Self {
                ticket,
                comments,
                calls: Mutex::new(Vec::new()),
                updated_fields: Mutex::new(Vec::new()),
                created_comments: Mutex::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self::new(
                Ticket {
                    id: 42,
                    custom_fields: Vec::new(),
                },
                Vec::new(),
            )
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn created_comments(&self) -> Vec<(u64, NewComment)> {
            self.created_comments.lock().unwrap().clone()
        }

        fn updated_fields(&self) -> Vec<(u64, Vec<CustomField>)> {
            self.updated_fields.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TicketingService for FakeTicketing {
        async fn show_ticket(&self, _ticket_id: u64) -> AppResult<Ticket> {
            self.calls.lock().unwrap().push("show_ticket");
            Ok(self.ticket.clone())
        }

        async fn list_comments(&self, _ticket_id: u64) -> AppResult<Vec<Comment>> {
            self.calls.lock().unwrap().push("list_comments");
            Ok(self.comments.clone())
        }

        async fn update_ticket_fields(
            &self,
            ticket_id: u64,
            fields: Vec<CustomField>,
        ) -> AppResult<()> {
            self.calls.lock().unwrap().push("update_ticket_fields");
            self.updated_fields.lock().unwrap().push((ticket_id, fields));
            Ok(())
        }

        async fn create_comment(&self, ticket_id: u64, comment: NewComment) -> AppResult<()> {
            self.calls.lock().unwrap().push("create_comment");
            self.created_comments.lock().unwrap().push((ticket_id, comment));
            Ok(())
        }

        async fn create_upload(&self, file_name: &str, _bytes: Vec<u8>) -> AppResult<String> {
            self.calls.lock().unwrap().push("create_upload");
            Ok(format!("token-{file_name}"))
        }

        async fn download_attachment(&self, content_url: &str) -> AppResult<Vec<u8>> {
            self.calls.lock().unwrap().push("download_attachment");
            if content_url.contains("broken") {
                return Err(AppError::Ticketing("download failed".to_string()));
            }
            Ok(b"file bytes".to_vec())
        }
    }

    struct FakeTranslator {
        source_language: String,
        requests: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeTranslator {
        fn resolving_source(source_language: &str) -> Self {
            Self {
                source_language: source_language.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(String, String, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TranslationService for FakeTranslator {
        async fn translate(
            &self,
            text: &str,
            source_language: &str,
            target_language: &str,
        ) -> AppResult<Translation> {
            self.requests.lock().unwrap().push((
                text.to_string(),
                source_language.to_string(),
                target_language.to_string(),
            ));
            Ok(Translation {
                text: format!("[{target_language}] {text}"),
                source_language: self.source_language.clone(),
                target_language: target_language.to_string(),
            })
        }
    }

    fn context(ticketing: Arc<FakeTicketing>, translator: Arc<FakeTranslator>) -> AppContext {
        AppContext::new(test_config(), ticketing, translator)
    }

    fn event(ticket_id: u64, comment: Option<EventComment>) -> WebhookEvent {
        WebhookEvent {
            detail: Some(EventDetail {
                ticket_event: Some(TicketEvent {
                    ticket: EventTicket { id: ticket_id },
                    comment,
                }),
            }),
        }
    }

    fn public_comment(id: u64, body: &str) -> EventComment {
        EventComment {
            id,
            author: EventAuthor { id: 900 },
            body: body.to_string(),
            is_public: true,
        }
    }

    fn internal_note(id: u64, body: &str) -> EventComment {
        EventComment {
            id,
            author: EventAuthor { id: 900 },
            body: body.to_string(),
            is_public: false,
        }
    }

    const RUSSIAN_BODY: &str =
        "Здравствуйте, подскажите пожалуйста, где мой заказ? Прошло уже две недели с оплаты.";

    #[tokio::test]
    async fn posts_internal_translation_for_foreign_public_comment() {
        let ticketing = Arc::new(FakeTicketing::empty());
        let translator = Arc::new(FakeTranslator::resolving_source("ru"));
        let ctx = context(ticketing.clone(), translator.clone());

        let outcome = handle_event(&ctx, event(42, Some(public_comment(501, RUSSIAN_BODY))))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::TranslatedIncoming {
                source_language: "ru".to_string()
            }
        );
        assert_eq!(
            translator.requests(),
            vec![(RUSSIAN_BODY.to_string(), "auto".to_string(), "en".to_string())]
        );

        // The language field is persisted before the comment is posted.
        assert_eq!(
            ticketing.calls(),
            vec!["update_ticket_fields", "create_comment"]
        );

        let updates = ticketing.updated_fields();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, 42);
        assert_eq!(updates[0].1[0].id, LANG_FIELD_ID);
        assert_eq!(updates[0].1[0].value.as_deref(), Some("lang-ru"));

        let comments = ticketing.created_comments();
        assert_eq!(comments.len(), 1);
        let (ticket_id, posted) = &comments[0];
        assert_eq!(*ticket_id, 42);
        assert_eq!(posted.author_id, 900);
        assert_eq!(posted.body.as_deref(), Some(format!("[en] {RUSSIAN_BODY}").as_str()));
        assert!(posted.html_body.is_none());
        assert!(!posted.public);
    }

    #[tokio::test]
    async fn skips_public_comment_already_in_target_language() {
        let ticketing = Arc::new(FakeTicketing::empty());
        let translator = Arc::new(FakeTranslator::resolving_source("en"));
        let ctx = context(ticketing.clone(), translator.clone());

        let body = "Hello, I would like to ask about the status of my recent order. \
                    It has been two weeks and nothing arrived yet.";
        let outcome = handle_event(&ctx, event(42, Some(public_comment(501, body))))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Skipped(SkipReason::AlreadyTargetLanguage)
        );
        assert!(translator.requests().is_empty());
        assert!(ticketing.calls().is_empty());
    }

    #[tokio::test]
    async fn skips_when_translation_resolves_source_as_target() {
        let ticketing = Arc::new(FakeTicketing::empty());
        // Detection sees Spanish, but the translation service resolves the
        // source as English, so the translation is a no-op.
        let translator = Arc::new(FakeTranslator::resolving_source("en"));
        let ctx = context(ticketing.clone(), translator.clone());

        let body = "¿Dónde está mi pedido? Necesito ayuda con el envío, por favor.";
        let outcome = handle_event(&ctx, event(42, Some(public_comment(501, body))))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Skipped(SkipReason::AlreadyTargetLanguage)
        );
        assert_eq!(translator.requests().len(), 1);
        assert!(ticketing.calls().is_empty());
    }

    #[tokio::test]
    async fn ignores_internal_note_without_command() {
        let ticketing = Arc::new(FakeTicketing::empty());
        let translator = Arc::new(FakeTranslator::resolving_source("de"));
        let ctx = context(ticketing.clone(), translator.clone());

        let outcome = handle_event(
            &ctx,
            event(42, Some(internal_note(501, "just an ordinary note"))),
        )
        .await
        .unwrap();

        assert_eq!(outcome, WebhookOutcome::Skipped(SkipReason::NotACommand));
        assert!(ticketing.calls().is_empty());
        assert!(translator.requests().is_empty());
    }

    fn ticket_with_language(code: &str) -> Ticket {
        Ticket {
            id: 42,
            custom_fields: vec![CustomField {
                id: LANG_FIELD_ID,
                value: Some(language_field_value(code)),
            }],
        }
    }

    fn full_comment(id: u64, html_body: &str, attachments: Vec<Attachment>) -> Comment {
        Comment {
            id,
            author_id: 900,
            body: String::new(),
            html_body: html_body.to_string(),
            public: false,
            attachments,
        }
    }

    fn attachment(id: u64, file_name: &str, content_url: &str) -> Attachment {
        Attachment {
            id,
            file_name: file_name.to_string(),
            content_url: content_url.to_string(),
        }
    }

    #[tokio::test]
    async fn command_posts_public_translation_with_surviving_uploads() {
        let attachments = vec![
            attachment(1, "a.png", "https://files.example/a.png"),
            attachment(2, "b.pdf", "https://files.example/broken/b.pdf"),
            attachment(3, "c.txt", "https://files.example/c.txt"),
        ];
        let ticketing = Arc::new(FakeTicketing::new(
            ticket_with_language("de"),
            vec![
                full_comment(601, "#translate <b>Hello</b>", attachments),
                full_comment(600, "older comment", Vec::new()),
            ],
        ));
        let translator = Arc::new(FakeTranslator::resolving_source("en"));
        let ctx = context(ticketing.clone(), translator.clone());

        let outcome = handle_event(&ctx, event(42, Some(internal_note(601, "#translate"))))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::TranslatedReply { uploads: 2 });

        // Marker stripped, then HTML-escaped, then translated en -> de.
        assert_eq!(
            translator.requests(),
            vec![(
                " &lt;b&gt;Hello&lt;/b&gt;".to_string(),
                "en".to_string(),
                "de".to_string()
            )]
        );

        let comments = ticketing.created_comments();
        assert_eq!(comments.len(), 1);
        let (ticket_id, posted) = &comments[0];
        assert_eq!(*ticket_id, 42);
        assert!(posted.public);
        assert_eq!(posted.author_id, 900);
        assert_eq!(
            posted.html_body.as_deref(),
            Some("[de]  &lt;b&gt;Hello&lt;/b&gt;")
        );
        // The broken attachment is skipped; the surviving tokens keep
        // their relative order.
        assert_eq!(
            posted.uploads,
            Some(vec!["token-a.png".to_string(), "token-c.txt".to_string()])
        );
    }

    #[tokio::test]
    async fn command_posts_comment_without_uploads_field_when_no_attachments() {
        let ticketing = Arc::new(FakeTicketing::new(
            ticket_with_language("fr"),
            vec![full_comment(602, "#translate merci beaucoup", Vec::new())],
        ));
        let translator = Arc::new(FakeTranslator::resolving_source("en"));
        let ctx = context(ticketing.clone(), translator.clone());

        let outcome = handle_event(&ctx, event(42, Some(internal_note(602, "#translate"))))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::TranslatedReply { uploads: 0 });
        let comments = ticketing.created_comments();
        assert_eq!(comments[0].1.uploads, None);
    }

    #[tokio::test]
    async fn command_skips_when_no_language_stored() {
        let ticketing = Arc::new(FakeTicketing::empty());
        let translator = Arc::new(FakeTranslator::resolving_source("en"));
        let ctx = context(ticketing.clone(), translator.clone());

        let outcome = handle_event(&ctx, event(42, Some(internal_note(601, "#translate"))))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::Skipped(SkipReason::NoStoredLanguage));
        assert_eq!(ticketing.calls(), vec!["show_ticket"]);
        assert!(translator.requests().is_empty());
    }

    #[tokio::test]
    async fn command_skips_when_stored_language_is_default() {
        let ticketing = Arc::new(FakeTicketing::new(ticket_with_language("en"), Vec::new()));
        let translator = Arc::new(FakeTranslator::resolving_source("en"));
        let ctx = context(ticketing.clone(), translator.clone());

        let outcome = handle_event(&ctx, event(42, Some(internal_note(601, "#translate"))))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::Skipped(SkipReason::NoStoredLanguage));
        assert_eq!(ticketing.calls(), vec!["show_ticket"]);
    }

    #[tokio::test]
    async fn command_warns_when_full_comment_is_missing() {
        let ticketing = Arc::new(FakeTicketing::new(
            ticket_with_language("de"),
            vec![full_comment(600, "some other comment", Vec::new())],
        ));
        let translator = Arc::new(FakeTranslator::resolving_source("en"));
        let ctx = context(ticketing.clone(), translator.clone());

        let outcome = handle_event(&ctx, event(42, Some(internal_note(601, "#translate"))))
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::Skipped(SkipReason::CommentNotFound));
        assert_eq!(
            ticketing.calls(),
            vec!["show_ticket", "list_comments"]
        );
        assert!(translator.requests().is_empty());
    }

    #[tokio::test]
    async fn skips_event_without_comment() {
        let ticketing = Arc::new(FakeTicketing::empty());
        let translator = Arc::new(FakeTranslator::resolving_source("en"));
        let ctx = context(ticketing.clone(), translator.clone());

        let outcome = handle_event(&ctx, event(42, None)).await.unwrap();

        assert_eq!(outcome, WebhookOutcome::Skipped(SkipReason::NoComment));
        assert!(ticketing.calls().is_empty());
        assert!(translator.requests().is_empty());
    }

    #[tokio::test]
    async fn rejects_event_without_ticket_event() {
        let ticketing = Arc::new(FakeTicketing::empty());
        let translator = Arc::new(FakeTranslator::resolving_source("en"));
        let ctx = context(ticketing.clone(), translator.clone());

        let result = handle_event(&ctx, WebhookEvent { detail: None }).await;

        assert!(matches!(result, Err(AppError::Event(_))));
        assert!(ticketing.calls().is_empty());
    }

    #[test]
    fn escapes_html_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn temp_file_name_includes_comment_and_attachment_ids() {
        let path = temp_file_path(601, 3);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name, "zendesk_comment_file_601_3");
    }
}
