//! News portal scrapers
//!
//! The portal is flaky enough that these routes use the retrying client.
//! The latest-news route fetches three fixed category pages concurrently
//! and merges them in category order.

use futures::future::try_join_all;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::client::UpstreamClient;
use crate::config::UpstreamConfig;
use crate::error::{AppError, Result};
use crate::registry::{handler_fn, ParamSpec, RouteDescriptor};
use crate::response::FeatureReply;

const CATEGORIES: &[&str] = &["terkini", "politik", "ekonomi"];

pub fn routes(client: Arc<UpstreamClient>, upstreams: &UpstreamConfig) -> Vec<RouteDescriptor> {
    let base = upstreams.news.trim_end_matches('/').to_string();

    let latest_client = client.clone();
    let latest_base = base.clone();
    let latest = RouteDescriptor::new(
        "/api/news/latest",
        "Latest News",
        "news",
        "Merged headlines from the main category pages",
        handler_fn(move |_input| {
            let client = latest_client.clone();
            let base = latest_base.clone();
            async move {
                let articles = fetch_latest(&client, &base).await?;
                Ok(FeatureReply::Json(Value::Array(articles)))
            }
        }),
    )
    .tags(&["news", "scraper"]);

    let headline = RouteDescriptor::new(
        "/api/news/headline",
        "Category Headlines",
        "news",
        "Headlines from a single category page",
        handler_fn(move |input| {
            let client = client.clone();
            let base = base.clone();
            async move {
                let category = input
                    .str("category")
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(CATEGORIES[0])
                    .to_lowercase();
                let articles = fetch_category(&client, &base, &category).await?;
                Ok(FeatureReply::Json(Value::Array(articles)))
            }
        }),
    )
    .tags(&["news", "scraper"])
    .example("category=politik")
    .params(vec![ParamSpec::string("category", "Category page to scrape")
        .optional()
        .max_length(30)
        .example("politik")]);

    vec![latest, headline]
}

async fn fetch_latest(client: &UpstreamClient, base: &str) -> Result<Vec<Value>> {
    let urls: Vec<String> = CATEGORIES
        .iter()
        .map(|category| format!("{}/{}", base, category))
        .collect();
    let pages = try_join_all(urls.iter().map(|url| client.get_text_with_retry(url))).await?;

    let mut articles = Vec::new();
    for (category, html) in CATEGORIES.iter().zip(pages.iter()) {
        articles.extend(parse_articles(html, category));
    }
    debug!(count = articles.len(), "Merged news articles");

    if articles.is_empty() {
        return Err(AppError::EmptyResult("No news articles found".to_string()));
    }
    Ok(articles)
}

async fn fetch_category(client: &UpstreamClient, base: &str, category: &str) -> Result<Vec<Value>> {
    if !CATEGORIES.contains(&category) {
        return Err(AppError::Validation(format!(
            "Category parameter must be one of: {}",
            CATEGORIES.join(", ")
        )));
    }

    let html = client
        .get_text_with_retry(&format!("{}/{}", base, category))
        .await?;
    let articles = parse_articles(&html, category);

    if articles.is_empty() {
        return Err(AppError::EmptyResult(format!(
            "No news articles found for '{}'",
            category
        )));
    }
    Ok(articles)
}

fn parse_articles(html: &str, category: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let card_selector = Selector::parse("div.card__post").unwrap();
    let title_selector = Selector::parse("h2 a, h5 a").unwrap();
    let img_selector = Selector::parse("img").unwrap();
    let time_selector = Selector::parse("span.text-secondary, span.time").unwrap();

    let mut articles = Vec::new();
    for card in document.select(&card_selector) {
        let title_el = match card.select(&title_selector).next() {
            Some(el) => el,
            None => continue,
        };
        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let url = title_el.value().attr("href").map(String::from);
        let image = card
            .select(&img_selector)
            .next()
            .and_then(|e| e.value().attr("data-src").or_else(|| e.value().attr("src")))
            .map(String::from);
        let time = card
            .select(&time_selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        articles.push(json!({
            "title": title,
            "url": url,
            "image": image,
            "time": time,
            "category": category,
        }));
    }
    articles
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_FIXTURE: &str = r#"
        <div class="card__post">
          <img class="lazyload" data-src="https://img.example/1.jpg" src="placeholder.gif">
          <h2><a href="https://news.example/politik/one">Headline One</a></h2>
          <span class="text-secondary">1 jam lalu</span>
        </div>
        <div class="card__post">
          <img src="https://img.example/2.jpg">
          <h5><a href="https://news.example/politik/two">Headline Two</a></h5>
        </div>
    "#;

    #[test]
    fn test_parse_articles() {
        let articles = parse_articles(PAGE_FIXTURE, "politik");
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0]["title"], "Headline One");
        assert_eq!(articles[0]["image"], "https://img.example/1.jpg");
        assert_eq!(articles[0]["time"], "1 jam lalu");
        assert_eq!(articles[0]["category"], "politik");
        assert_eq!(articles[1]["title"], "Headline Two");
        assert!(articles[1]["time"].is_null());
    }

    #[test]
    fn test_parse_articles_empty_page() {
        assert!(parse_articles("<html></html>", "terkini").is_empty());
    }

    #[test]
    fn test_categories_are_fixed() {
        assert_eq!(CATEGORIES.len(), 3);
    }
}
