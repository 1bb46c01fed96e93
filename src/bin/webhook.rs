use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::{error, info};

use zendesk_translate::config::AppConfig;
use zendesk_translate::context::AppContext;
use zendesk_translate::domain::event::WebhookEvent;
use zendesk_translate::error::{AppError, AppResult};
use zendesk_translate::infra::ssm::SsmParameterStore;
use zendesk_translate::infra::translate::AwsTranslate;
use zendesk_translate::infra::zendesk::ZendeskClient;
use zendesk_translate::logging::init_tracing;
use zendesk_translate::services::{SecretStore, TranslationService};
use zendesk_translate::workflow::webhook;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let secrets = Arc::new(SsmParameterStore::new().await);
    let translator: Arc<dyn TranslationService> = Arc::new(AwsTranslate::new().await);

    run(service_fn(move |event: LambdaEvent<WebhookEvent>| {
        let secrets = Arc::clone(&secrets);
        let translator = Arc::clone(&translator);
        async move {
            // Workflow failures are logged and swallowed here at the edge:
            // the webhook sender receives no error signal.
            if let Err(error) = process(event.payload, secrets, translator).await {
                error!("webhook handling failed: {error}");
            }
            Ok::<(), Error>(())
        }
    }))
    .await
}

async fn process(
    event: WebhookEvent,
    secrets: Arc<SsmParameterStore>,
    translator: Arc<dyn TranslationService>,
) -> AppResult<()> {
    let config = AppConfig::from_env()?;

    // The access token is re-fetched every invocation, never cached.
    let token = secrets
        .fetch(&config.access_token_param_key, true)
        .await?
        .ok_or_else(|| {
            AppError::SecretStore("Zendesk access token wasn't found".to_string())
        })?;

    let ticketing = Arc::new(ZendeskClient::new(
        config.subdomain.clone(),
        config.email.clone(),
        token,
    ));
    let ctx = AppContext::new(config, ticketing, translator);

    let outcome = webhook::handle_event(&ctx, event).await?;
    info!("webhook handled: {outcome:?}");
    Ok(())
}
