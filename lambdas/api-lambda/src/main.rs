use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use lambda_http::{run, service_fn, tracing, Error, Request};
use profile_auth_shared::config::Config;
use profile_auth_shared::s3::S3ObjectStore;
use profile_auth_shared::users::DynamoRecordStore;
use profile_auth_shared::AppState;
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env()?;

    // Initialize AWS clients once at startup
    let sdk_config = config.load_aws_config().await;
    let objects = S3ObjectStore::new(S3Client::new(&sdk_config), config.bucket_name.clone());
    let records = DynamoRecordStore::new(DynamoClient::new(&sdk_config), config.table_name.clone());

    tracing::info!(
        "Starting with bucket {} and table {}",
        config.bucket_name,
        config.table_name
    );

    let state = AppState::new(config, Arc::new(objects), Arc::new(records));

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
