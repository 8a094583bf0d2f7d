use std::sync::Arc;

use insight_core::config::AppConfig;
use insight_core::{ArtifactPaths, ArtifactStore, InsightService};
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub service: Arc<InsightService>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("artifact warm-up task failed: {0}")]
    Warmup(#[source] tokio::task::JoinError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        artifacts_dir = %config.artifacts.dir.display(),
        "starting application bootstrap"
    );

    let store = ArtifactStore::new(ArtifactPaths::from_config(&config.artifacts));
    let service = Arc::new(InsightService::new(store, config.recommend.clone()));

    // first access loads every artifact group; failures stay cached as degraded features
    let warm = Arc::clone(&service);
    let statuses = tokio::task::spawn_blocking(move || warm.availability())
        .await
        .map_err(BootstrapError::Warmup)?;
    for status in &statuses {
        if status.ready {
            info!(
                event_name = "system.bootstrap.feature_ready",
                correlation_id = "bootstrap",
                feature = %status.feature,
                detail = %status.detail,
                "feature ready"
            );
        } else {
            warn!(
                event_name = "system.bootstrap.feature_degraded",
                correlation_id = "bootstrap",
                feature = %status.feature,
                detail = %status.detail,
                "feature unavailable, serving in degraded mode"
            );
        }
    }

    Ok(Application { config, service })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use insight_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use insight_core::DomainError;
    use tempfile::TempDir;

    use crate::bootstrap::{bootstrap_with_config, Application};

    async fn bootstrap(artifacts_dir: &Path) -> Application {
        let config = AppConfig::load(options(artifacts_dir)).expect("config should load");
        bootstrap_with_config(config).await.expect("bootstrap should succeed")
    }

    fn options(artifacts_dir: &Path) -> LoadOptions {
        LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            overrides: ConfigOverrides {
                artifacts_dir: Some(artifacts_dir.to_path_buf()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_serves_both_features_from_fixtures() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("../core/tests/fixtures");
        let app = bootstrap(&fixtures).await;

        assert!(app.service.availability().iter().all(|status| status.ready));
        let assignment =
            app.service.classify(325.0, 1, 765322.0).expect("reference input classifies");
        assert_eq!(assignment.cluster_index, 1);
    }

    #[tokio::test]
    async fn bootstrap_succeeds_in_degraded_mode_without_artifacts() {
        let empty = TempDir::new().expect("tempdir");
        let app = bootstrap(empty.path()).await;

        assert!(app.service.availability().iter().all(|status| !status.ready));
        assert!(matches!(
            app.service.recommend("anything", 5),
            Err(DomainError::ModelUnavailable { .. })
        ));
    }
}
