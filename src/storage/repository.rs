//! Repository pattern for the dedup/counting store.
//!
//! The store is the only shared mutable resource in the pipeline. Its
//! contract is per-fingerprint atomicity: `observe` is a single
//! insert-or-increment that never loses an update, regardless of how many
//! workers race on the same text. The SQLite implementation gets this from a
//! one-statement upsert under WAL; the mock gets it from a write lock.
//!
//! Each worker constructs its own repository handle (see
//! [`RepositoryFactory`]); nothing here is a process-wide singleton.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::fingerprint::fingerprint;
use crate::models::{
    token_count, Article, CanonicalTextRecord, RawSentenceRecord, StoreStats,
};

// ============================================================================
// Repository Trait
// ============================================================================

/// Persistent store for articles and the two parallel dedup layers.
///
/// `raw_sentences` is keyed by the fingerprint of the unnormalized text,
/// `canonical_units` by the fingerprint of the normalized text. The two
/// tables are independent; there is no foreign key between them.
pub trait CorpusRepository: Send + Sync {
    /// Insert an article, deduplicated by its URL hash. Returns `false` when
    /// the article was already present.
    fn insert_article(&self, article: &Article) -> Result<bool>;

    /// All stored article row ids, for sharding across workers.
    fn article_ids(&self) -> Result<Vec<i64>>;

    fn get_article(&self, id: i64) -> Result<Option<Article>>;

    /// Atomic insert-or-increment on the raw-sentence table.
    fn upsert_raw_sentence(&self, fingerprint: &str, text: &str) -> Result<()>;

    /// Atomic insert-or-increment on the canonical-unit table. The stored
    /// text and token count are immutable after first insert; later
    /// observations only increment the counter.
    fn upsert_canonical_unit(&self, fingerprint: &str, text: &str, token_count: u32) -> Result<()>;

    fn get_raw_sentence(&self, fingerprint: &str) -> Result<Option<RawSentenceRecord>>;

    fn get_canonical_unit(&self, fingerprint: &str) -> Result<Option<CanonicalTextRecord>>;

    /// One page of raw-sentence texts in fingerprint order.
    fn raw_sentence_page(&self, limit: u64, offset: u64) -> Result<Vec<String>>;

    /// Number of canonical units at or above the token threshold.
    fn canonical_count(&self, min_tokens: u32) -> Result<u64>;

    /// One page of canonical texts at or above the token threshold, in
    /// fingerprint order. Fingerprint order makes export pagination
    /// deterministic across stores built under different worker
    /// interleavings.
    fn canonical_page(&self, min_tokens: u32, limit: u64, offset: u64) -> Result<Vec<String>>;

    fn stats(&self) -> Result<StoreStats>;

    /// Delete all rows of both dedup tables, and optionally the articles.
    fn reset(&self, include_articles: bool) -> Result<()>;

    /// Observe an unnormalized sentence: fingerprint it and
    /// insert-or-increment. Empty input is a no-op.
    fn observe_raw_sentence(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.upsert_raw_sentence(&fingerprint(text), text)
    }

    /// Observe a canonical text unit: fingerprint it, derive the token
    /// count, and insert-or-increment. Empty input is a no-op.
    fn observe_canonical(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.upsert_canonical_unit(&fingerprint(text), text, token_count(text))
    }
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite-backed store.
///
/// WAL journaling lets one writer proceed alongside readers; the busy
/// timeout plus the caller's bounded retry cover writer-writer contention
/// between worker connections.
pub struct SqliteCorpusRepository {
    conn: Mutex<Connection>,
}

impl SqliteCorpusRepository {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;
        tracing::debug!(path = %path.display(), "SQLite corpus store opened");
        Ok(repo)
    }

    /// In-memory store (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;
        Ok(repo)
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY,
                source TEXT NOT NULL,
                article_id TEXT,
                url TEXT,
                url_hash TEXT NOT NULL UNIQUE,
                section TEXT,
                premium INTEGER NOT NULL DEFAULT 0,
                date_published TEXT,
                description TEXT,
                headline TEXT,
                pretitle TEXT,
                lead_paragraph TEXT,
                body TEXT,
                author TEXT,
                ingested_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_articles_source ON articles(source);

            CREATE TABLE IF NOT EXISTS raw_sentences (
                fingerprint TEXT NOT NULL UNIQUE,
                text TEXT NOT NULL,
                count INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS canonical_units (
                fingerprint TEXT NOT NULL UNIQUE,
                text TEXT NOT NULL,
                token_count INTEGER NOT NULL DEFAULT 0,
                count INTEGER NOT NULL DEFAULT 1
            );

            CREATE INDEX IF NOT EXISTS idx_canonical_token_count
                ON canonical_units(token_count);
            "#,
        )?;
        Ok(())
    }

    fn row_to_article(row: &rusqlite::Row<'_>) -> rusqlite::Result<Article> {
        Ok(Article {
            source: row.get("source")?,
            article_id: row.get("article_id")?,
            url: row.get("url")?,
            section: row.get("section")?,
            premium: row.get::<_, i64>("premium")? != 0,
            date_published: row.get("date_published")?,
            description: row.get("description")?,
            headline: row.get("headline")?,
            pretitle: row.get("pretitle")?,
            lead_paragraph: row.get("lead_paragraph")?,
            body: row.get("body")?,
            author: row.get("author")?,
            ingested_at: row
                .get::<_, String>("ingested_at")?
                .parse()
                .unwrap_or_default(),
        })
    }
}

impl CorpusRepository for SqliteCorpusRepository {
    fn insert_article(&self, article: &Article) -> Result<bool> {
        let key = article
            .dedup_key()
            .ok_or_else(|| Error::other("article has neither url nor source:article_id"))?;
        let url_hash = fingerprint(&key);
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            r#"
            INSERT OR IGNORE INTO articles
                (source, article_id, url, url_hash, section, premium,
                 date_published, description, headline, pretitle,
                 lead_paragraph, body, author, ingested_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                article.source,
                article.article_id,
                article.url,
                url_hash,
                article.section,
                article.premium as i64,
                article.date_published,
                article.description,
                article.headline,
                article.pretitle,
                article.lead_paragraph,
                article.body,
                article.author,
                article.ingested_at.to_rfc3339(),
            ],
        )?;
        Ok(changed > 0)
    }

    fn article_ids(&self) -> Result<Vec<i64>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM articles ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let conn = self.conn.lock().unwrap();
        let article = conn
            .query_row(
                "SELECT * FROM articles WHERE id = ?1",
                params![id],
                Self::row_to_article,
            )
            .optional()?;
        Ok(article)
    }

    fn upsert_raw_sentence(&self, fingerprint: &str, text: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO raw_sentences (fingerprint, text, count)
            VALUES (?1, ?2, 1)
            ON CONFLICT(fingerprint) DO UPDATE SET count = count + 1
            "#,
            params![fingerprint, text],
        )?;
        Ok(())
    }

    fn upsert_canonical_unit(&self, fingerprint: &str, text: &str, token_count: u32) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO canonical_units (fingerprint, text, token_count, count)
            VALUES (?1, ?2, ?3, 1)
            ON CONFLICT(fingerprint) DO UPDATE SET count = count + 1
            "#,
            params![fingerprint, text, token_count],
        )?;
        Ok(())
    }

    fn get_raw_sentence(&self, fp: &str) -> Result<Option<RawSentenceRecord>> {
        let conn = self.conn.lock().unwrap();
        let record = conn
            .query_row(
                "SELECT fingerprint, text, count FROM raw_sentences WHERE fingerprint = ?1",
                params![fp],
                |row| {
                    Ok(RawSentenceRecord {
                        fingerprint: row.get(0)?,
                        text: row.get(1)?,
                        count: row.get::<_, i64>(2)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn get_canonical_unit(&self, fp: &str) -> Result<Option<CanonicalTextRecord>> {
        let conn = self.conn.lock().unwrap();
        let record = conn
            .query_row(
                "SELECT fingerprint, text, token_count, count
                 FROM canonical_units WHERE fingerprint = ?1",
                params![fp],
                |row| {
                    Ok(CanonicalTextRecord {
                        fingerprint: row.get(0)?,
                        text: row.get(1)?,
                        token_count: row.get::<_, i64>(2)? as u32,
                        count: row.get::<_, i64>(3)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn raw_sentence_page(&self, limit: u64, offset: u64) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT text FROM raw_sentences ORDER BY fingerprint LIMIT ?1 OFFSET ?2",
        )?;
        let texts = stmt
            .query_map(params![limit as i64, offset as i64], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(texts)
    }

    fn canonical_count(&self, min_tokens: u32) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM canonical_units WHERE token_count >= ?1",
            params![min_tokens],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn canonical_page(&self, min_tokens: u32, limit: u64, offset: u64) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT text FROM canonical_units WHERE token_count >= ?1
             ORDER BY fingerprint LIMIT ?2 OFFSET ?3",
        )?;
        let texts = stmt
            .query_map(params![min_tokens, limit as i64, offset as i64], |row| {
                row.get(0)
            })?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(texts)
    }

    fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().unwrap();
        let articles: i64 = conn.query_row("SELECT COUNT(*) FROM articles", [], |r| r.get(0))?;
        let (raw_sentences, raw_observations): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(count), 0) FROM raw_sentences",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let (canonical_units, canonical_observations): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(count), 0) FROM canonical_units",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(StoreStats {
            articles: articles as u64,
            raw_sentences: raw_sentences as u64,
            raw_observations: raw_observations as u64,
            canonical_units: canonical_units as u64,
            canonical_observations: canonical_observations as u64,
        })
    }

    fn reset(&self, include_articles: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM raw_sentences", [])?;
        conn.execute("DELETE FROM canonical_units", [])?;
        if include_articles {
            conn.execute("DELETE FROM articles", [])?;
        }
        Ok(())
    }
}

// ============================================================================
// Mock Implementation (for testing)
// ============================================================================

/// In-memory store without database dependencies.
#[derive(Default)]
pub struct MockCorpusRepository {
    articles: RwLock<Vec<Article>>,
    article_keys: RwLock<HashMap<String, usize>>,
    raw_sentences: RwLock<HashMap<String, RawSentenceRecord>>,
    canonical_units: RwLock<HashMap<String, CanonicalTextRecord>>,
}

impl MockCorpusRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CorpusRepository for MockCorpusRepository {
    fn insert_article(&self, article: &Article) -> Result<bool> {
        let key = article
            .dedup_key()
            .ok_or_else(|| Error::other("article has neither url nor source:article_id"))?;
        let url_hash = fingerprint(&key);
        let mut keys = self.article_keys.write().unwrap();
        if keys.contains_key(&url_hash) {
            return Ok(false);
        }
        let mut articles = self.articles.write().unwrap();
        articles.push(article.clone());
        keys.insert(url_hash, articles.len() - 1);
        Ok(true)
    }

    fn article_ids(&self) -> Result<Vec<i64>> {
        let len = self.articles.read().unwrap().len();
        Ok((1..=len as i64).collect())
    }

    fn get_article(&self, id: i64) -> Result<Option<Article>> {
        if id < 1 {
            return Ok(None);
        }
        Ok(self.articles.read().unwrap().get((id - 1) as usize).cloned())
    }

    fn upsert_raw_sentence(&self, fingerprint: &str, text: &str) -> Result<()> {
        let mut table = self.raw_sentences.write().unwrap();
        table
            .entry(fingerprint.to_string())
            .and_modify(|r| r.count += 1)
            .or_insert_with(|| RawSentenceRecord {
                fingerprint: fingerprint.to_string(),
                text: text.to_string(),
                count: 1,
            });
        Ok(())
    }

    fn upsert_canonical_unit(&self, fingerprint: &str, text: &str, token_count: u32) -> Result<()> {
        let mut table = self.canonical_units.write().unwrap();
        table
            .entry(fingerprint.to_string())
            .and_modify(|r| r.count += 1)
            .or_insert_with(|| CanonicalTextRecord {
                fingerprint: fingerprint.to_string(),
                text: text.to_string(),
                token_count,
                count: 1,
            });
        Ok(())
    }

    fn get_raw_sentence(&self, fp: &str) -> Result<Option<RawSentenceRecord>> {
        Ok(self.raw_sentences.read().unwrap().get(fp).cloned())
    }

    fn get_canonical_unit(&self, fp: &str) -> Result<Option<CanonicalTextRecord>> {
        Ok(self.canonical_units.read().unwrap().get(fp).cloned())
    }

    fn raw_sentence_page(&self, limit: u64, offset: u64) -> Result<Vec<String>> {
        let table = self.raw_sentences.read().unwrap();
        let mut fingerprints: Vec<&String> = table.keys().collect();
        fingerprints.sort();
        Ok(fingerprints
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|fp| table[fp].text.clone())
            .collect())
    }

    fn canonical_count(&self, min_tokens: u32) -> Result<u64> {
        Ok(self
            .canonical_units
            .read()
            .unwrap()
            .values()
            .filter(|r| r.token_count >= min_tokens)
            .count() as u64)
    }

    fn canonical_page(&self, min_tokens: u32, limit: u64, offset: u64) -> Result<Vec<String>> {
        let table = self.canonical_units.read().unwrap();
        let mut selected: Vec<&CanonicalTextRecord> = table
            .values()
            .filter(|r| r.token_count >= min_tokens)
            .collect();
        selected.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));
        Ok(selected
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|r| r.text.clone())
            .collect())
    }

    fn stats(&self) -> Result<StoreStats> {
        let raw = self.raw_sentences.read().unwrap();
        let canonical = self.canonical_units.read().unwrap();
        Ok(StoreStats {
            articles: self.articles.read().unwrap().len() as u64,
            raw_sentences: raw.len() as u64,
            raw_observations: raw.values().map(|r| r.count).sum(),
            canonical_units: canonical.len() as u64,
            canonical_observations: canonical.values().map(|r| r.count).sum(),
        })
    }

    fn reset(&self, include_articles: bool) -> Result<()> {
        self.raw_sentences.write().unwrap().clear();
        self.canonical_units.write().unwrap().clear();
        if include_articles {
            self.articles.write().unwrap().clear();
            self.article_keys.write().unwrap().clear();
        }
        Ok(())
    }
}

// ============================================================================
// Shared Repository Types
// ============================================================================

/// Thread-safe shared store handle.
pub type SharedCorpusRepository = Arc<dyn CorpusRepository>;

/// Constructor handed to the worker pool so every worker can build its own
/// store handle. No connection is shared across workers.
pub type RepositoryFactory = Arc<dyn Fn() -> Result<SharedCorpusRepository> + Send + Sync>;

/// Factory opening one SQLite connection per call against the same file.
pub fn sqlite_factory(path: impl AsRef<Path>) -> RepositoryFactory {
    let path = path.as_ref().to_path_buf();
    Arc::new(move || {
        let repo = SqliteCorpusRepository::new(&path)?;
        Ok(Arc::new(repo) as SharedCorpusRepository)
    })
}

/// Factory handing out clones of one shared mock (for tests).
pub fn mock_factory() -> RepositoryFactory {
    let repo: SharedCorpusRepository = Arc::new(MockCorpusRepository::new());
    Arc::new(move || Ok(Arc::clone(&repo)))
}
