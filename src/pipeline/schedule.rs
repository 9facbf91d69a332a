// src/pipeline/schedule.rs

//! Scheduler loop: one cycle per interval until shutdown.

use std::time::Duration;

use chrono::Local;

use crate::error::AppError;
use crate::pipeline::shutdown::Shutdown;
use crate::pipeline::sync::Mirror;
use crate::services::Fetcher;
use crate::storage::FingerprintStore;

/// Run cycles back to back, pausing `interval` after each one completes.
///
/// Cycle errors are logged and never end the loop; only `shutdown` does.
/// Returns the number of cycles started.
pub async fn run_scheduler<F: Fetcher>(
    mirror: &Mirror<F>,
    store: &mut FingerprintStore,
    interval: Duration,
    shutdown: &Shutdown,
) -> usize {
    let mut cycles = 0;

    while !shutdown.is_cancelled() {
        cycles += 1;
        log::info!(
            "Cycle {} starting at {}",
            cycles,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        match mirror.run_cycle(store, shutdown).await {
            Ok(report) => report.log_summary(),
            Err(AppError::Cancelled) => log::warn!("Cycle {} cancelled", cycles),
            Err(e) => log::error!("Crawl/download cycle failed: {}", e),
        }

        if shutdown.is_cancelled() {
            break;
        }

        log::info!("Next cycle in {}s", interval.as_secs());
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.cancelled() => break,
        }
    }

    log::info!(
        "Scheduler stopped after {} cycles, {} files tracked",
        cycles,
        store.len()
    );
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::shutdown::shutdown_channel;
    use crate::pipeline::testing::{BASE_URL, MockRemote, PAGE};
    use crate::services::LinkExtractor;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;
    use url::Url;

    fn mirror(root: &std::path::Path, remote: MockRemote) -> Mirror<MockRemote> {
        let base = Url::parse(BASE_URL).unwrap();
        Mirror::new(
            remote,
            LinkExtractor::new(base.clone(), vec![".ke0".into(), ".ke1".into()]).unwrap(),
            base.join(PAGE).unwrap(),
            LocalStorage::new(root.join("DownloadedFiles"), root.join("archives")),
        )
    }

    #[tokio::test]
    async fn test_runs_until_shutdown() {
        let tmp = TempDir::new().unwrap();
        let remote = MockRemote::new();
        remote.put_with_etag("a.ke0", b"alpha", "\"1\"");
        let mirror = mirror(tmp.path(), remote);
        let mut store = FingerprintStore::new();
        let (trigger, shutdown) = shutdown_channel();

        let (cycles, ()) = tokio::join!(
            run_scheduler(&mirror, &mut store, Duration::from_millis(5), &shutdown),
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                trigger.trigger();
            }
        );

        assert!(cycles >= 2);
        assert!(store.get("a.ke0").is_some());
        // Only the first cycle transfers the body.
        assert_eq!(mirror.fetcher().transfers(), vec!["a.ke0"]);
    }

    #[tokio::test]
    async fn test_page_errors_do_not_stop_the_loop() {
        let tmp = TempDir::new().unwrap();
        let remote = MockRemote::new();
        remote.page_down(true);
        let mirror = mirror(tmp.path(), remote);
        let mut store = FingerprintStore::new();
        let (trigger, shutdown) = shutdown_channel();

        let (cycles, ()) = tokio::join!(
            run_scheduler(&mirror, &mut store, Duration::from_millis(5), &shutdown),
            async {
                tokio::time::sleep(Duration::from_millis(60)).await;
                trigger.trigger();
            }
        );

        assert!(cycles >= 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_long_interval_is_interrupted() {
        let tmp = TempDir::new().unwrap();
        let mirror = mirror(tmp.path(), MockRemote::new());
        let mut store = FingerprintStore::new();
        let (trigger, shutdown) = shutdown_channel();

        let (cycles, ()) = tokio::join!(
            run_scheduler(&mirror, &mut store, Duration::from_secs(3600), &shutdown),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                trigger.trigger();
            }
        );

        assert_eq!(cycles, 1);
    }
}
