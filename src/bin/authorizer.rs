use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::error;

use zendesk_translate::config::AuthConfig;
use zendesk_translate::infra::ssm::SsmParameterStore;
use zendesk_translate::logging::init_tracing;
use zendesk_translate::workflow::authorizer::{self, AuthorizerRequest, AuthorizerResponse};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let secrets = Arc::new(SsmParameterStore::new().await);

    run(service_fn(move |event: LambdaEvent<AuthorizerRequest>| {
        let secrets = Arc::clone(&secrets);
        async move { handle(event, secrets).await }
    }))
    .await
}

/// Every failure — misconfiguration included — is answered with the bare
/// `Unauthorized` string the gateway expects; no detail leaks to the caller.
async fn handle(
    event: LambdaEvent<AuthorizerRequest>,
    secrets: Arc<SsmParameterStore>,
) -> Result<AuthorizerResponse, Error> {
    let config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!("authorizer misconfigured: {error}");
            return Err(Error::from("Unauthorized"));
        }
    };

    match authorizer::authorize(&config, secrets.as_ref(), &event.payload).await {
        Ok(response) => Ok(response),
        Err(error) => {
            error!("authorization failed: {error}");
            Err(Error::from("Unauthorized"))
        }
    }
}
