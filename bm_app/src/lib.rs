use aws_config::{BehaviorVersion, meta::region::RegionProviderChain};
use figment::{Figment, providers::Env};

/// Built by each pipeline stage from its extracted config plus the shared
/// AWS configuration; typically wraps the stage's store clients.
pub trait ContextProvider<Config> {
    fn new(
        config: Config,
        aws_config: aws_config::SdkConfig,
    ) -> impl Future<Output = Self>;
}

/// Install the JSON tracing subscriber used by every stage.
///
/// CloudWatch records ingestion time and the function name, so timestamps
/// and targets are dropped from the log lines; the level can be overridden
/// with `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_current_span(false)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .init();
}

/// Initialize tracing, extract the stage config from environment variables,
/// load the AWS configuration, and build the stage context.
///
/// # Errors
/// If the stage config cannot be extracted from the environment.
pub async fn create_app_context<'a, A, Config: serde::Deserialize<'a>>()
-> Result<A, figment::Error>
where
    A: ContextProvider<Config>,
{
    init_tracing();

    let figment = Figment::new().merge(Env::raw());
    let config: Config = figment.extract()?;

    let region_provider =
        RegionProviderChain::default_provider().or_else("us-east-1");
    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await;

    Ok(A::new(config, aws_config).await)
}
