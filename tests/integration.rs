//! End-to-end pipeline test: ingest, clean, split, clean sentences, export

mod common;

use std::sync::Arc;

use siebwerk::corpus::{export, ExportOptions};
use siebwerk::encoding::{load_is_miscoded, repair_article};
use siebwerk::fingerprint::fingerprint;
use siebwerk::models::Article;
use siebwerk::normalize::{normalize, NormalizeOptions};
use siebwerk::pipeline::{Pipeline, PipelineConfig};
use siebwerk::segment::RuleSplitter;
use siebwerk::storage::sqlite_factory;

fn sample_load() -> Vec<Article> {
    vec![
        Article {
            url: Some("https://a.at/1".to_string()),
            headline: Some("Amazon prÃ¼ft â€žweitere Konsequenzenâ€œ".to_string()),
            body: Some(
                "Die Demokrat*innen stimmten zu. Der EU-Beitritt bleibt offen.\n\nLaut Dr. Maier ist die Entscheidung noch nicht gefallen."
                    .to_string(),
            ),
            ..common::create_test_article()
        },
        // Exact duplicate URL of the first article.
        Article {
            url: Some("https://a.at/1".to_string()),
            ..common::create_test_article()
        },
        Article {
            url: Some("https://a.at/2".to_string()),
            headline: Some("SchÃ¶nes Wetter am Wochenende".to_string()),
            body: Some(
                "Die Demokrat*innen stimmten zu. Am Sonntag wird es sonnig bei 25 Grad."
                    .to_string(),
            ),
            ..common::create_test_article()
        },
    ]
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let factory = sqlite_factory(dir.path().join("store.db"));

    // Ingest with encoding repair. The load carries mojibake, so every
    // article gets the repair pass.
    let mut articles = sample_load();
    assert!(load_is_miscoded(&articles));
    for article in &mut articles {
        assert_eq!(repair_article(article), 0);
    }
    assert!(!load_is_miscoded(&articles));
    assert_eq!(
        articles[0].headline.as_deref(),
        Some("Amazon prüft „weitere Konsequenzen“")
    );

    let repo = factory().unwrap();
    let mut inserted = 0;
    for article in &articles {
        if repo.insert_article(article).unwrap() {
            inserted += 1;
        }
    }
    assert_eq!(inserted, 2);

    // Clean at paragraph granularity.
    let pipeline = Pipeline::new(PipelineConfig {
        workers: 2,
        ..Default::default()
    });
    let opts = NormalizeOptions::corpus_defaults();
    let snapshot = pipeline
        .clean_articles(Arc::clone(&factory), opts)
        .await
        .unwrap();
    assert_eq!(snapshot.total_units, 2);
    assert_eq!(snapshot.failed_count, 0);

    // The two articles share a sentence but not a paragraph, so at this
    // granularity each headline unit is unique.
    let headline = normalize("Innenpolitik Amazon prüft „weitere Konsequenzen“", &opts);
    let record = repo.get_canonical_unit(&fingerprint(&headline)).unwrap().unwrap();
    assert_eq!(record.count, 1);
    assert!(record.text.contains("Amazon prüft weitere Konsequenzen"));

    // Split into raw sentences. The shared sentence now collapses.
    let snapshot = pipeline
        .split_sentences(Arc::clone(&factory), Arc::new(RuleSplitter::new()))
        .await
        .unwrap();
    assert_eq!(snapshot.failed_count, 0);
    let shared = repo
        .get_raw_sentence(&fingerprint("Die Demokrat*innen stimmten zu."))
        .unwrap()
        .unwrap();
    assert_eq!(shared.count, 2);
    // "Dr." did not end the sentence.
    assert!(repo
        .get_raw_sentence(&fingerprint(
            "Laut Dr. Maier ist die Entscheidung noch nicht gefallen."
        ))
        .unwrap()
        .is_some());

    // Clean the raw sentences into canonical units. The raw layer already
    // collapsed the shared sentence into one row, so it is cleaned and
    // observed once; its repetition count lives in the raw record above.
    let before = repo.stats().unwrap().canonical_units;
    let snapshot = pipeline
        .clean_sentences(Arc::clone(&factory), opts)
        .await
        .unwrap();
    assert_eq!(snapshot.failed_count, 0);
    let cleaned_shared = repo
        .get_canonical_unit(&fingerprint("Die Demokrat_innen stimmten zu"))
        .unwrap()
        .unwrap();
    assert_eq!(cleaned_shared.count, 1);
    assert!(repo.stats().unwrap().canonical_units > before);

    // Export and check determinism.
    let path_a = dir.path().join("corpus-a.txt");
    let path_b = dir.path().join("corpus-b.txt");
    let export_opts = ExportOptions {
        min_tokens: 4,
        batch_size: 3,
        ..Default::default()
    };
    let summary = export(&repo, &export_opts, &path_a).unwrap();
    assert!(summary.lines_written > 0);
    export(&repo, &export_opts, &path_b).unwrap();
    assert_eq!(
        std::fs::read(&path_a).unwrap(),
        std::fs::read(&path_b).unwrap()
    );

    let content = std::fs::read_to_string(&path_a).unwrap();
    assert!(content.contains("Die Demokrat_innen stimmten zu"));
    assert!(content.contains("EU Beitritt"));
    // Raw text never leaks into the corpus.
    assert!(!content.contains('*'));
    assert!(!content.contains('„'));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reset_keeps_articles_unless_asked() {
    let dir = tempfile::tempdir().unwrap();
    let factory = sqlite_factory(dir.path().join("store.db"));
    let repo = factory().unwrap();
    repo.insert_article(&common::create_test_article()).unwrap();

    let pipeline = Pipeline::new(PipelineConfig::default());
    pipeline
        .clean_articles(Arc::clone(&factory), NormalizeOptions::corpus_defaults())
        .await
        .unwrap();
    assert!(repo.stats().unwrap().canonical_units > 0);

    repo.reset(false).unwrap();
    let stats = repo.stats().unwrap();
    assert_eq!(stats.canonical_units, 0);
    assert_eq!(stats.articles, 1);

    // Cleaning again rebuilds the dedup layer from the kept articles.
    pipeline
        .clean_articles(Arc::clone(&factory), NormalizeOptions::corpus_defaults())
        .await
        .unwrap();
    assert!(repo.stats().unwrap().canonical_units > 0);
}
