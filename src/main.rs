use gridfs_transfer::{Config, TransferError, connect, read_file, upload_file};
use mimalloc::MiMalloc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        uri = %cfg.redacted_uri(),
        database = %cfg.database,
        bucket = %cfg.bucket,
        duplicate_policy = ?cfg.duplicate_policy,
        loglevel = %cfg.loglevel
    );

    if let Err(e) = run(&cfg).await {
        error!(error = %e, "transfer failed");
        return Err(e.into());
    }
    Ok(())
}

async fn run(cfg: &Config) -> Result<(), TransferError> {
    let (Some(path), Some(name)) = (cfg.upload_path.as_ref(), cfg.upload_name.as_deref()) else {
        return Err(TransferError::InvalidConfig(
            "upload_path and upload_name are required".into(),
        ));
    };

    let fs = connect(cfg).await?;
    upload_file(&fs, path, name, cfg.duplicate_policy).await?;

    let data = read_file(&fs, name).await?;
    info!(filename = name, bytes = data.len(), "round trip complete");
    Ok(())
}
