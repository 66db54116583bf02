//! Common test utilities

use siebwerk::models::Article;

/// Create a test article with default values
pub fn create_test_article() -> Article {
    Article {
        source: "diepresse".to_string(),
        article_id: Some("5472183".to_string()),
        url: Some("https://www.diepresse.com/5472183/testartikel".to_string()),
        section: Some("politik".to_string()),
        headline: Some("Regierung einigt sich auf Budget".to_string()),
        pretitle: Some("Innenpolitik".to_string()),
        lead_paragraph: Some(
            "Nach langen Verhandlungen steht das Budget für das kommende Jahr.".to_string(),
        ),
        description: Some("Die Eckpunkte des Budgets im Überblick.".to_string()),
        body: Some(
            "Die Koalition hat sich am Dienstag geeinigt. Das Budget umfasst 12 Milliarden Euro.\n\nDie Opposition kritisiert den Beschluss. Eine Sondersitzung ist geplant.".to_string(),
        ),
        ..Default::default()
    }
}

/// Create an article with a specific URL (distinct dedup key)
#[allow(dead_code)]
pub fn create_article_with_url(url: &str) -> Article {
    Article {
        url: Some(url.to_string()),
        ..create_test_article()
    }
}
