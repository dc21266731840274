//! Best-effort batch installation.
//!
//! Every resolved identity is installed independently: presence check,
//! download to a staging area, validate + extract, write the record,
//! then an atomic rename into the final location. A failure is recorded
//! in that identity's outcome and the batch carries on.

use crate::error::{InstallError, Result};
use crate::extract::extract_package;
use crate::fetch::ArtifactFetcher;
use crate::layout::{DestinationMode, StoreLayout};
use crate::record::InstalledPackageRecord;
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use nupack_core::PackageIdentity;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One identity to install and where its bytes come from.
#[derive(Debug, Clone)]
pub struct InstallItem {
    /// The package to materialize.
    pub identity: PackageIdentity,
    /// Source name the artifact downloads from.
    pub source: String,
    /// Package description, carried into the outcome.
    pub description: Option<String>,
}

/// How one identity ended up.
#[derive(Debug)]
pub enum InstallState {
    /// Extracted in this run.
    Installed(InstalledPackageRecord),
    /// A completed install was already present; nothing was transferred.
    AlreadyInstalled,
    /// This identity failed; siblings were still attempted.
    Failed(InstallError),
}

/// Per-identity outcome.
#[derive(Debug)]
pub struct PackageOutcome {
    /// The package this outcome describes.
    pub identity: PackageIdentity,
    /// Source name the artifact was (or would have been) fetched from.
    pub source: String,
    /// Package description.
    pub description: Option<String>,
    /// What happened.
    pub state: InstallState,
}

impl PackageOutcome {
    /// Whether this identity is materialized on disk now.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(
            self.state,
            InstallState::Installed(_) | InstallState::AlreadyInstalled
        )
    }
}

/// Result of one batch install.
#[derive(Debug)]
pub struct BatchResult {
    /// Per-identity outcomes, in input order.
    pub outcomes: Vec<PackageOutcome>,
}

impl BatchResult {
    /// Best-effort batches succeed only when every identity is present.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(PackageOutcome::is_present)
    }

    /// The outcomes that failed.
    #[must_use]
    pub fn failures(&self) -> Vec<&PackageOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_present())
            .collect()
    }
}

/// Installer configuration.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Concurrent downloads/extractions.
    pub max_concurrent: usize,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

/// Materializes resolved identities into the package store.
pub struct Installer<F: ArtifactFetcher> {
    fetcher: Arc<F>,
    layout: StoreLayout,
    config: InstallerConfig,
}

impl<F: ArtifactFetcher> std::fmt::Debug for Installer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("layout", &self.layout)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<F: ArtifactFetcher> Installer<F> {
    /// Create an installer.
    #[must_use]
    pub fn new(fetcher: Arc<F>, layout: StoreLayout, config: InstallerConfig) -> Self {
        Self {
            fetcher,
            layout,
            config,
        }
    }

    /// The layout this installer writes through.
    #[must_use]
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Install every item, best-effort, bounded concurrency.
    pub async fn install_all(
        &self,
        items: Vec<InstallItem>,
        mode: &DestinationMode,
        cancel: &CancellationToken,
    ) -> BatchResult {
        let total = items.len();
        let mut outcomes: Vec<Option<PackageOutcome>> = Vec::new();
        outcomes.resize_with(total, || None);

        let mut pending = items.into_iter().enumerate().collect::<Vec<_>>();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.config.max_concurrent && !pending.is_empty() {
                let (index, item) = pending.pop().expect("pending is non-empty");
                let cancel = cancel.clone();
                in_flight.push(async move {
                    let state = tokio::select! {
                        () = cancel.cancelled() => InstallState::Failed(InstallError::Cancelled),
                        state = self.install_one(&item, mode) => state,
                    };
                    (index, item, state)
                });
            }

            let Some((index, item, state)) = in_flight.next().await else {
                break;
            };
            outcomes[index] = Some(PackageOutcome {
                identity: item.identity,
                source: item.source,
                description: item.description,
                state,
            });
        }

        let outcomes: Vec<PackageOutcome> = outcomes
            .into_iter()
            .map(|o| o.expect("every item produced an outcome"))
            .collect();

        let result = BatchResult { outcomes };
        info!(
            total,
            failed = result.failures().len(),
            "batch install finished"
        );
        result
    }

    /// Install a single identity, reporting the outcome instead of
    /// failing the batch.
    async fn install_one(&self, item: &InstallItem, mode: &DestinationMode) -> InstallState {
        let final_dir = self.layout.package_dir(mode, &item.identity);
        if self.layout.is_installed(mode, &item.identity) {
            debug!(package = %item.identity, "already present, skipping");
            return InstallState::AlreadyInstalled;
        }

        match self.download_and_extract(item, &final_dir).await {
            Ok(record) => InstallState::Installed(record),
            Err(InstallError::Cancelled) => InstallState::Failed(InstallError::Cancelled),
            Err(err) => {
                warn!(package = %item.identity, %err, "install failed");
                InstallState::Failed(err)
            }
        }
    }

    async fn download_and_extract(
        &self,
        item: &InstallItem,
        final_dir: &Path,
    ) -> Result<InstalledPackageRecord> {
        let parent = final_dir
            .parent()
            .ok_or_else(|| InstallError::Extraction {
                path: final_dir.to_path_buf(),
                message: "destination has no parent directory".into(),
            })?;
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| InstallError::io(parent, &e))?;

        // Staging lives next to the final directory so the rename below
        // stays on one filesystem.
        let staging = tempfile::Builder::new()
            .prefix(".nupack-staging-")
            .tempdir_in(parent)
            .map_err(|e| InstallError::io(parent, &e))?;

        let package = item.identity.to_string();
        let archive_path = staging.path().join("package.nupkg");
        self.fetcher
            .download(&item.source, &item.identity, &archive_path)
            .await?;

        let content_hash = hash_file(&archive_path).await?;
        let extract_dir = staging.path().join("content");
        let summary = extract_package(&package, &archive_path, &extract_dir).await?;

        let record = InstalledPackageRecord {
            identity: item.identity.clone(),
            source: item.source.clone(),
            install_path: final_dir.to_path_buf(),
            file_count: summary.files,
            content_hash,
            installed_at: Utc::now(),
        };
        record.save(&extract_dir)?;

        // The record is inside the staged directory: the rename publishes
        // content and record together, or not at all.
        match tokio::fs::rename(&extract_dir, final_dir).await {
            Ok(()) => {
                info!(package = %item.identity, files = summary.files, "installed");
                Ok(record)
            }
            Err(_) if self.layout_has_record(final_dir) => {
                // A concurrent install of the same identity won the race.
                debug!(package = %item.identity, "lost install race, already present");
                Ok(record)
            }
            Err(e) => Err(InstallError::io(final_dir, &e)),
        }
    }

    fn layout_has_record(&self, final_dir: &Path) -> bool {
        final_dir.join(crate::record::RECORD_FILE).is_file()
    }
}

/// SHA-256 of a file, lowercase hex.
async fn hash_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| InstallError::io(path, &e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let read = file
            .read(&mut buffer)
            .await
            .map_err(|e| InstallError::io(path, &e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
