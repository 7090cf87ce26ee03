use crate::config::Config;
use crate::error::{IsRetryable, TransferError};
use crate::store::GridFsNamespace;
use backon::{ExponentialBuilder, Retryable};
use mongodb::Client;
use mongodb::bson::doc;
use mongodb::error::Error as MongoError;
use mongodb::options::{ClientOptions, Tls, TlsOptions};
use std::time::Duration;
use tracing::{error, info, warn};

fn connect_retry_policy(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(max_times)
        .with_jitter()
}

/// Open an authenticated TLS session to the cluster and return its GridFS namespace.
///
/// The session is verified with a `ping` before the handle is returned, so
/// rejected credentials, unreachable hosts and certificate failures all
/// surface here as [`TransferError::ConnectionFailed`].
pub async fn connect(cfg: &Config) -> Result<GridFsNamespace, TransferError> {
    cfg.validate()?;

    let client = (|| async { open_session(cfg).await })
        .retry(connect_retry_policy(cfg.retry_max_times))
        .when(|e: &MongoError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!(
                cluster = %cfg.cluster_host,
                "connect retrying after error {}, sleeping {:?}", err, dur
            );
        })
        .await
        .map_err(|e| {
            error!(uri = %cfg.redacted_uri(), error = %e, "failed to connect");
            TransferError::ConnectionFailed(e.to_string())
        })?;

    info!(
        cluster = %cfg.cluster_host,
        database = %cfg.database,
        bucket = %cfg.bucket,
        "connected"
    );
    Ok(GridFsNamespace::new(
        client,
        &cfg.database,
        &cfg.bucket,
        cfg.chunk_size_bytes,
    ))
}

async fn open_session(cfg: &Config) -> Result<Client, MongoError> {
    let mut options = ClientOptions::parse(cfg.connection_uri()).await?;
    options.app_name = Some(cfg.app_name.clone());
    options.connect_timeout = Some(cfg.connect_timeout());
    options.server_selection_timeout = Some(cfg.server_selection_timeout());
    if let Some(ca_file) = cfg.ca_file.as_ref() {
        options.tls = Some(Tls::Enabled(
            TlsOptions::builder().ca_file_path(ca_file.clone()).build(),
        ));
    }

    let client = Client::with_options(options)?;
    client
        .database(&cfg.database)
        .run_command(doc! { "ping": 1 })
        .await?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_config_fails_before_any_network_call() {
        let cfg = Config::default();
        let err = connect(&cfg).await.err().expect("empty config must not connect");
        assert!(matches!(err, TransferError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn unresolvable_cluster_yields_connection_failed() {
        let cfg = Config {
            username: "alice".to_string(),
            password: "secret".to_string(),
            cluster_host: "nonexistent-cluster.invalid".to_string(),
            retry_max_times: 0,
            ..Config::default()
        };

        let err = connect(&cfg)
            .await
            .err()
            .expect("unresolvable cluster must not yield a handle");
        assert!(matches!(err, TransferError::ConnectionFailed(_)));
    }
}
