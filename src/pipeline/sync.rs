// src/pipeline/sync.rs

//! Fetch-and-replace cycle.
//!
//! For every file linked from the listing page the mirror decides whether
//! to skip it, archive the current copy and replace it, or download it for
//! the first time. New content is streamed into a staging file first, so a
//! failed download never disturbs the current copy.

use std::fmt;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, ContentDigest, FileFingerprint, HttpValidators, Link};
use crate::pipeline::archive::archive_if_present;
use crate::pipeline::detect::{digest_file, is_changed};
use crate::pipeline::shutdown::Shutdown;
use crate::services::{Download, Fetcher, LinkExtractor};
use crate::storage::{FingerprintStore, LocalStorage};

/// What happened to one file during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No local copy existed; the file was downloaded.
    Downloaded { size: u64 },
    /// The previous copy was archived and replaced.
    Replaced { size: u64, archived_to: PathBuf },
    /// Remote content matches the last download; nothing was touched.
    Unchanged,
    /// An unfingerprinted local copy matched the remote content and was kept.
    Adopted { size: u64 },
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloaded { size } => write!(f, "downloaded ({size} bytes)"),
            Self::Replaced { size, archived_to } => write!(
                f,
                "replaced ({size} bytes), previous version archived to {}",
                archived_to.display()
            ),
            Self::Unchanged => f.write_str("up to date, download skipped"),
            Self::Adopted { size } => write!(f, "local copy kept ({size} bytes)"),
        }
    }
}

/// Result of processing one file.
#[derive(Debug)]
pub struct FileReport {
    pub name: String,
    pub url: Url,
    pub result: Result<SyncOutcome>,
}

/// Per-file results of one cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub files: Vec<FileReport>,
    /// Shutdown interrupted the cycle before every link was processed.
    pub cancelled: bool,
}

impl CycleReport {
    fn count(&self, pred: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.files
            .iter()
            .filter(|f| f.result.as_ref().is_ok_and(&pred))
            .count()
    }

    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Downloaded { .. }))
    }

    pub fn replaced(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Replaced { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Unchanged | SyncOutcome::Adopted { .. }))
    }

    /// Files whose processing failed, cancellations excluded.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| matches!(&f.result, Err(e) if !e.is_cancelled()))
    }

    pub fn outcome(&self, name: &str) -> Option<&Result<SyncOutcome>> {
        self.files.iter().find(|f| f.name == name).map(|f| &f.result)
    }

    pub fn log_summary(&self) {
        log::info!(
            "Cycle finished: {} downloaded, {} replaced, {} unchanged, {} failed{}",
            self.downloaded(),
            self.replaced(),
            self.unchanged(),
            self.failures().count(),
            if self.cancelled { " (cancelled)" } else { "" }
        );
    }
}

/// Mirrors the listing page into local storage.
pub struct Mirror<F> {
    fetcher: F,
    extractor: LinkExtractor,
    page_url: Url,
    storage: LocalStorage,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl<F: Fetcher> Mirror<F> {
    pub fn new(fetcher: F, extractor: LinkExtractor, page_url: Url, storage: LocalStorage) -> Self {
        Self {
            fetcher,
            extractor,
            page_url,
            storage,
            today: local_today,
        }
    }

    /// Build a mirror from the configuration.
    pub fn from_config(config: &Config, fetcher: F) -> Result<Self> {
        Ok(Self::new(
            fetcher,
            LinkExtractor::from_config(&config.source)?,
            config.source.page_url()?,
            LocalStorage::from_config(&config.paths),
        ))
    }

    /// Replace the calendar used to name archive folders.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch the listing page and extract the candidate links.
    pub async fn fetch_links(&self, shutdown: &Shutdown) -> Result<Vec<Link>> {
        let html = shutdown
            .run_until(self.fetcher.fetch_page(&self.page_url))
            .await?;
        Ok(self.extractor.extract(&html))
    }

    /// Run one full cycle: page fetch, link extraction, then every file in turn.
    ///
    /// Errors for a single file are recorded in the report and never stop
    /// the cycle. Only a failed page fetch fails the cycle as a whole.
    pub async fn run_cycle(
        &self,
        store: &mut FingerprintStore,
        shutdown: &Shutdown,
    ) -> Result<CycleReport> {
        let links = self.fetch_links(shutdown).await?;
        log::info!("Found {} files on {}", links.len(), self.page_url);

        self.storage.ensure_dirs().await?;

        let mut report = CycleReport::default();
        for link in links {
            if shutdown.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let result = self.sync_file(&link, store, shutdown).await;
            match &result {
                Ok(outcome) => log::info!("{}: {}", link.file_name, outcome),
                Err(AppError::Cancelled) => {
                    log::warn!("{}: interrupted by shutdown", link.file_name);
                    report.cancelled = true;
                }
                Err(e) => log::error!("{}: {}", link.file_name, e),
            }

            report.files.push(FileReport {
                name: link.file_name,
                url: link.url,
                result,
            });
            if report.cancelled {
                break;
            }
        }

        if report.cancelled {
            log::warn!("Shutdown requested, skipping the rest of the cycle");
        }
        Ok(report)
    }

    /// Bring one file up to date.
    ///
    /// The fingerprint of `link.file_name` is only written when new content
    /// is in place (or an existing copy was adopted).
    pub async fn sync_file(
        &self,
        link: &Link,
        store: &mut FingerprintStore,
        shutdown: &Shutdown,
    ) -> Result<SyncOutcome> {
        let name = link.file_name.as_str();
        let target = self.storage.target_path(name);
        let local_exists = self.storage.has_file(name).await?;
        let fingerprint = store.get(name).cloned();

        // The local copy still holds what was last downloaded.
        let intact = match (&fingerprint, local_exists) {
            (Some(fp), true) => {
                let changed = is_changed(&target, fp).await?;
                if changed {
                    log::warn!("{name}: local copy differs from its last download");
                }
                !changed
            }
            _ => false,
        };
        let validators = fingerprint
            .as_ref()
            .filter(|_| intact)
            .map(|fp| &fp.validators)
            .filter(|v| !v.is_empty());

        let download = shutdown
            .run_until(
                self.fetcher
                    .download(&link.url, &self.storage.staging_path(name), validators),
            )
            .await;

        let (size, received) = match download {
            Ok(Download::NotModified) => return Ok(SyncOutcome::Unchanged),
            Ok(Download::Fetched { size, validators }) => (size, validators),
            Err(e) => {
                self.storage.discard_staging(name).await;
                return Err(e);
            }
        };

        let baseline = if intact { fingerprint.map(|fp| fp.digest) } else { None };
        let result = self
            .settle(name, local_exists, baseline, size, received, store)
            .await;
        if result.is_err() {
            self.storage.discard_staging(name).await;
        }
        result
    }

    /// Decide what to do with a completed staging file.
    async fn settle(
        &self,
        name: &str,
        local_exists: bool,
        baseline: Option<ContentDigest>,
        size: u64,
        validators: HttpValidators,
        store: &mut FingerprintStore,
    ) -> Result<SyncOutcome> {
        let target = self.storage.target_path(name);
        let (digest, _) = digest_file(&self.storage.staging_path(name)).await?;

        if local_exists {
            let local_digest = match baseline {
                Some(d) => d,
                None => digest_file(&target).await?.0,
            };
            if local_digest == digest {
                self.storage.discard_staging(name).await;
                if baseline.is_some() {
                    return Ok(SyncOutcome::Unchanged);
                }
                store.set(
                    name,
                    FileFingerprint::new(name, size, digest).with_validators(validators),
                );
                return Ok(SyncOutcome::Adopted { size });
            }
        }

        let archived_to = self.install(name, local_exists).await?;
        store.set(
            name,
            FileFingerprint::new(name, size, digest).with_validators(validators),
        );

        Ok(match archived_to {
            Some(archived_to) => SyncOutcome::Replaced { size, archived_to },
            None => SyncOutcome::Downloaded { size },
        })
    }

    /// Archive the current copy (if any) and promote the staging file.
    ///
    /// When the promotion fails the archived copy is moved back, so the
    /// working directory never ends up without a version of `name`.
    async fn install(&self, name: &str, local_exists: bool) -> Result<Option<PathBuf>> {
        let target = self.storage.target_path(name);
        let archived_to = if local_exists {
            archive_if_present(&target, self.storage.archive_dir(), (self.today)()).await?
        } else {
            None
        };

        if let Err(e) = self.storage.promote(name).await {
            if let Some(archived) = &archived_to {
                match tokio::fs::rename(archived, &target).await {
                    Ok(()) => log::warn!("{name}: promotion failed, previous copy restored"),
                    Err(restore) => log::error!(
                        "{name}: promotion failed and {} could not be restored: {}",
                        archived.display(),
                        restore
                    ),
                }
            }
            return Err(e);
        }
        Ok(archived_to)
    }
}
