//! Worker pool driving the cleaning and splitting phases.
//!
//! A fixed number of workers pull units of work from a shared queue, so each
//! unit is consumed by exactly one worker. Every worker builds its own store
//! handle from the injected factory; the persistent store is the only shared
//! mutable resource, and its per-fingerprint upsert makes the final counts
//! independent of worker interleaving.
//!
//! A failure on a single unit is logged with its identifier and skipped;
//! the shard keeps going. Only transient store contention is retried.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::models::Article;
use crate::normalize::{normalize, NormalizeOptions};
use crate::segment::SentenceSplitter;
use crate::storage::{RepositoryFactory, SharedCorpusRepository};
use crate::utils::retry::{with_retry_if, RetryConfig};

/// Worker-pool configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of workers.
    pub workers: usize,

    /// Channel buffer size between the feeder and the workers.
    pub channel_buffer_size: usize,

    /// Rows pulled per page when feeding from a store table.
    pub page_size: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            channel_buffer_size: 1000,
            page_size: 5000,
        }
    }
}

/// Pipeline statistics (thread-safe).
#[derive(Debug, Default)]
pub struct PipelineStats {
    /// Units fed into the queue.
    pub total_units: AtomicU64,

    /// Units processed without error.
    pub success_count: AtomicU64,

    /// Units skipped after a per-unit failure.
    pub failed_count: AtomicU64,

    /// Texts observed into the store (one unit can produce several).
    pub observed_count: AtomicU64,
}

impl PipelineStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record_success(&self) {
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failed_count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_observed(&self, n: u64) {
        self.observed_count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_units: self.total_units.load(Ordering::Relaxed),
            success_count: self.success_count.load(Ordering::Relaxed),
            failed_count: self.failed_count.load(Ordering::Relaxed),
            observed_count: self.observed_count.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of pipeline statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    pub total_units: u64,
    pub success_count: u64,
    pub failed_count: u64,
    pub observed_count: u64,
}

/// The worker pool over the dedup store.
pub struct Pipeline {
    config: PipelineConfig,
    retry: RetryConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            retry: RetryConfig::default(),
        }
    }

    /// Clean every stored article at paragraph granularity and observe the
    /// canonical units.
    pub async fn clean_articles(
        &self,
        factory: RepositoryFactory,
        opts: NormalizeOptions,
    ) -> Result<StatsSnapshot> {
        let ids = factory()?.article_ids()?;
        let stats = PipelineStats::new();
        stats.total_units.store(ids.len() as u64, Ordering::Relaxed);

        tracing::info!(
            articles = ids.len(),
            workers = self.config.workers,
            "cleaning articles"
        );

        let (tx, rx) = mpsc::channel::<i64>(self.config.channel_buffer_size);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let mut handles = Vec::with_capacity(self.config.workers);
        for worker_id in 0..self.config.workers {
            let rx = Arc::clone(&rx);
            let factory = Arc::clone(&factory);
            let stats = Arc::clone(&stats);
            let retry = self.retry.clone();
            let handle: JoinHandle<()> = tokio::spawn(async move {
                let repo = match factory() {
                    Ok(repo) => repo,
                    Err(e) => {
                        tracing::error!(worker_id, error = %e, "failed to open store handle");
                        return;
                    }
                };
                loop {
                    let id = { rx.lock().await.recv().await };
                    let Some(id) = id else { break };
                    match clean_one_article(&repo, id, &opts, &retry).await {
                        Ok(observed) => {
                            stats.record_success();
                            stats.record_observed(observed);
                        }
                        Err(e) => {
                            stats.record_failure();
                            tracing::warn!(article_id = id, error = %e, "article skipped");
                        }
                    }
                }
            });
            handles.push(handle);
        }

        for id in ids {
            if tx.send(id).await.is_err() {
                tracing::error!("work channel closed early");
                break;
            }
        }
        drop(tx);

        for handle in handles {
            let _ = handle.await;
        }

        let snapshot = stats.snapshot();
        tracing::info!(
            success = snapshot.success_count,
            failed = snapshot.failed_count,
            observed = snapshot.observed_count,
            "article cleaning completed"
        );
        Ok(snapshot)
    }

    /// Split every stored article into raw sentences and observe them into
    /// the raw-sentence layer, before any destructive cleaning.
    pub async fn split_sentences(
        &self,
        factory: RepositoryFactory,
        splitter: Arc<dyn SentenceSplitter>,
    ) -> Result<StatsSnapshot> {
        let ids = factory()?.article_ids()?;
        let stats = PipelineStats::new();
        stats.total_units.store(ids.len() as u64, Ordering::Relaxed);

        tracing::info!(
            articles = ids.len(),
            workers = self.config.workers,
            "splitting sentences"
        );

        let (tx, rx) = mpsc::channel::<i64>(self.config.channel_buffer_size);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let mut handles = Vec::with_capacity(self.config.workers);
        for worker_id in 0..self.config.workers {
            let rx = Arc::clone(&rx);
            let factory = Arc::clone(&factory);
            let splitter = Arc::clone(&splitter);
            let stats = Arc::clone(&stats);
            let retry = self.retry.clone();
            let handle: JoinHandle<()> = tokio::spawn(async move {
                let repo = match factory() {
                    Ok(repo) => repo,
                    Err(e) => {
                        tracing::error!(worker_id, error = %e, "failed to open store handle");
                        return;
                    }
                };
                loop {
                    let id = { rx.lock().await.recv().await };
                    let Some(id) = id else { break };
                    match split_one_article(&repo, id, splitter.as_ref(), &retry).await {
                        Ok(observed) => {
                            stats.record_success();
                            stats.record_observed(observed);
                        }
                        Err(e) => {
                            stats.record_failure();
                            tracing::warn!(article_id = id, error = %e, "article skipped");
                        }
                    }
                }
            });
            handles.push(handle);
        }

        for id in ids {
            if tx.send(id).await.is_err() {
                tracing::error!("work channel closed early");
                break;
            }
        }
        drop(tx);

        for handle in handles {
            let _ = handle.await;
        }

        let snapshot = stats.snapshot();
        tracing::info!(
            success = snapshot.success_count,
            failed = snapshot.failed_count,
            observed = snapshot.observed_count,
            "sentence splitting completed"
        );
        Ok(snapshot)
    }

    /// Normalize every stored raw sentence and observe the result into the
    /// canonical layer.
    pub async fn clean_sentences(
        &self,
        factory: RepositoryFactory,
        opts: NormalizeOptions,
    ) -> Result<StatsSnapshot> {
        let feeder_repo = factory()?;
        let stats = PipelineStats::new();

        tracing::info!(workers = self.config.workers, "cleaning raw sentences");

        let (tx, rx) = mpsc::channel::<String>(self.config.channel_buffer_size);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let mut handles = Vec::with_capacity(self.config.workers);
        for worker_id in 0..self.config.workers {
            let rx = Arc::clone(&rx);
            let factory = Arc::clone(&factory);
            let stats = Arc::clone(&stats);
            let retry = self.retry.clone();
            let handle: JoinHandle<()> = tokio::spawn(async move {
                let repo = match factory() {
                    Ok(repo) => repo,
                    Err(e) => {
                        tracing::error!(worker_id, error = %e, "failed to open store handle");
                        return;
                    }
                };
                loop {
                    let sentence = { rx.lock().await.recv().await };
                    let Some(sentence) = sentence else { break };
                    let cleaned = normalize(&sentence, &opts);
                    match observe_canonical_with_retry(&repo, &cleaned, &retry).await {
                        Ok(()) => {
                            stats.record_success();
                            if !cleaned.is_empty() {
                                stats.record_observed(1);
                            }
                        }
                        Err(e) => {
                            stats.record_failure();
                            tracing::warn!(error = %e, "sentence skipped");
                        }
                    }
                }
            });
            handles.push(handle);
        }

        let mut offset = 0u64;
        loop {
            let page = feeder_repo.raw_sentence_page(self.config.page_size, offset)?;
            if page.is_empty() {
                break;
            }
            offset += page.len() as u64;
            stats
                .total_units
                .fetch_add(page.len() as u64, Ordering::Relaxed);
            for sentence in page {
                if tx.send(sentence).await.is_err() {
                    tracing::error!("work channel closed early");
                    break;
                }
            }
        }
        drop(tx);

        for handle in handles {
            let _ = handle.await;
        }

        let snapshot = stats.snapshot();
        tracing::info!(
            success = snapshot.success_count,
            failed = snapshot.failed_count,
            observed = snapshot.observed_count,
            "sentence cleaning completed"
        );
        Ok(snapshot)
    }
}

async fn load_article(repo: &SharedCorpusRepository, id: i64) -> Result<Article> {
    repo.get_article(id)?
        .ok_or_else(|| Error::other(format!("article {id} vanished from the store")))
}

async fn clean_one_article(
    repo: &SharedCorpusRepository,
    id: i64,
    opts: &NormalizeOptions,
    retry: &RetryConfig,
) -> Result<u64> {
    let article = load_article(repo, id).await?;
    let mut observed = 0;
    for unit in article.units() {
        let cleaned = normalize(&unit.text, opts);
        observe_canonical_with_retry(repo, &cleaned, retry).await?;
        if !cleaned.is_empty() {
            observed += 1;
        }
    }
    Ok(observed)
}

async fn split_one_article(
    repo: &SharedCorpusRepository,
    id: i64,
    splitter: &dyn SentenceSplitter,
    retry: &RetryConfig,
) -> Result<u64> {
    let article = load_article(repo, id).await?;
    let mut observed = 0;
    for seed in article.raw_sentence_seeds() {
        observe_raw_with_retry(repo, &seed, retry).await?;
        observed += 1;
    }
    for field in article.splittable_fields() {
        for sentence in splitter.split(field) {
            observe_raw_with_retry(repo, &sentence, retry).await?;
            observed += 1;
        }
    }
    Ok(observed)
}

async fn observe_canonical_with_retry(
    repo: &SharedCorpusRepository,
    text: &str,
    retry: &RetryConfig,
) -> Result<()> {
    with_retry_if(retry, || async { repo.observe_canonical(text) }, Error::is_contention).await
}

async fn observe_raw_with_retry(
    repo: &SharedCorpusRepository,
    text: &str,
    retry: &RetryConfig,
) -> Result<()> {
    with_retry_if(retry, || async { repo.observe_raw_sentence(text) }, Error::is_contention).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;
    use crate::segment::RuleSplitter;
    use crate::storage::mock_factory;

    fn seed_articles(factory: &RepositoryFactory, n: usize) {
        let repo = factory().unwrap();
        for i in 0..n {
            let article = Article {
                source: "diepresse".to_string(),
                url: Some(format!("https://a.at/{i}")),
                headline: Some("Gleiche Schlagzeile".to_string()),
                lead_paragraph: Some("Der erste Absatz bleibt gleich.".to_string()),
                body: Some("Ein Satz. Noch ein Satz.\n\nZweiter Absatz.".to_string()),
                ..Default::default()
            };
            repo.insert_article(&article).unwrap();
        }
    }

    #[tokio::test]
    async fn test_clean_articles_counts_duplicates() {
        let factory = mock_factory();
        seed_articles(&factory, 3);

        let pipeline = Pipeline::new(PipelineConfig {
            workers: 2,
            ..Default::default()
        });
        let snapshot = pipeline
            .clean_articles(Arc::clone(&factory), NormalizeOptions::default())
            .await
            .unwrap();

        assert_eq!(snapshot.total_units, 3);
        assert_eq!(snapshot.success_count, 3);
        assert_eq!(snapshot.failed_count, 0);

        // All three articles share identical units, so every canonical
        // record carries count 3 regardless of worker interleaving.
        let repo = factory().unwrap();
        let headline = normalize(" Gleiche Schlagzeile", &NormalizeOptions::default());
        let record = repo
            .get_canonical_unit(&fingerprint(&headline))
            .unwrap()
            .unwrap();
        assert_eq!(record.count, 3);
    }

    #[tokio::test]
    async fn test_split_sentences_fills_raw_layer() {
        let factory = mock_factory();
        seed_articles(&factory, 2);

        let pipeline = Pipeline::new(PipelineConfig::default());
        let snapshot = pipeline
            .split_sentences(Arc::clone(&factory), Arc::new(RuleSplitter::new()))
            .await
            .unwrap();
        assert_eq!(snapshot.success_count, 2);

        let repo = factory().unwrap();
        // Headline seed is stored verbatim, unnormalized.
        let record = repo
            .get_raw_sentence(&fingerprint("Gleiche Schlagzeile"))
            .unwrap()
            .unwrap();
        assert_eq!(record.count, 2);
        let sentence = repo
            .get_raw_sentence(&fingerprint("Ein Satz."))
            .unwrap()
            .unwrap();
        assert_eq!(sentence.count, 2);
    }

    #[tokio::test]
    async fn test_clean_sentences_feeds_canonical_layer() {
        let factory = mock_factory();
        {
            let repo = factory().unwrap();
            repo.observe_raw_sentence("Amazon prüft „weitere Konsequenzen“.")
                .unwrap();
            repo.observe_raw_sentence("Nur Symbole: ∙∙∙").unwrap();
        }

        let pipeline = Pipeline::new(PipelineConfig::default());
        let opts = NormalizeOptions::corpus_defaults();
        let snapshot = pipeline
            .clean_sentences(Arc::clone(&factory), opts)
            .await
            .unwrap();

        assert_eq!(snapshot.total_units, 2);
        assert_eq!(snapshot.success_count, 2);

        let repo = factory().unwrap();
        let cleaned = normalize("Amazon prüft „weitere Konsequenzen“.", &opts);
        assert!(repo
            .get_canonical_unit(&fingerprint(&cleaned))
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_empty_units_are_not_observed() {
        let factory = mock_factory();
        {
            let repo = factory().unwrap();
            let article = Article {
                source: "krone".to_string(),
                url: Some("https://k.at/1".to_string()),
                body: Some("∙∙∙".to_string()),
                ..Default::default()
            };
            repo.insert_article(&article).unwrap();
        }

        let pipeline = Pipeline::new(PipelineConfig::default());
        let snapshot = pipeline
            .clean_articles(Arc::clone(&factory), NormalizeOptions::default())
            .await
            .unwrap();
        assert_eq!(snapshot.success_count, 1);
        assert_eq!(snapshot.observed_count, 0);
        assert_eq!(factory().unwrap().stats().unwrap().canonical_units, 0);
    }
}
