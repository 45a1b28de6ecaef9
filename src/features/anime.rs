//! Anime listing scrapers (selector-based HTML traversal)

use scraper::{Html, Selector};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::client::UpstreamClient;
use crate::config::UpstreamConfig;
use crate::error::{AppError, Result};
use crate::registry::{handler_fn, ParamSpec, RouteDescriptor};
use crate::response::FeatureReply;

pub fn routes(client: Arc<UpstreamClient>, upstreams: &UpstreamConfig) -> Vec<RouteDescriptor> {
    let base = upstreams.anime.trim_end_matches('/').to_string();

    let ongoing_client = client.clone();
    let ongoing_base = base.clone();
    let ongoing = RouteDescriptor::new(
        "/api/anime/ongoing",
        "Ongoing Anime",
        "anime",
        "List currently airing anime from the listing page",
        handler_fn(move |_input| {
            let client = ongoing_client.clone();
            let base = ongoing_base.clone();
            async move {
                let entries = fetch_ongoing(&client, &base).await?;
                Ok(FeatureReply::Json(Value::Array(entries)))
            }
        }),
    )
    .tags(&["anime", "scraper"]);

    let search = RouteDescriptor::new(
        "/api/anime/search",
        "Anime Search",
        "anime",
        "Search anime by title",
        handler_fn(move |input| {
            let client = client.clone();
            let base = base.clone();
            async move {
                let query = input.required_str("query")?.to_string();
                let entries = fetch_search(&client, &base, &query).await?;
                Ok(FeatureReply::Json(Value::Array(entries)))
            }
        }),
    )
    .tags(&["anime", "scraper", "search"])
    .example("query=one piece")
    .params(vec![ParamSpec::string("query", "Title to search for")
        .max_length(100)
        .example("one piece")]);

    vec![ongoing, search]
}

async fn fetch_ongoing(client: &UpstreamClient, base: &str) -> Result<Vec<Value>> {
    let html = client.get_text(&format!("{}/ongoing-anime/", base)).await?;
    let entries = parse_ongoing(&html, base);
    debug!(count = entries.len(), "Parsed ongoing anime listing");

    if entries.is_empty() {
        return Err(AppError::EmptyResult("No ongoing anime found".to_string()));
    }
    Ok(entries)
}

async fn fetch_search(client: &UpstreamClient, base: &str, query: &str) -> Result<Vec<Value>> {
    let url = format!(
        "{}/?s={}&post_type=anime",
        base,
        urlencode(query)
    );
    let html = client.get_text(&url).await?;
    let entries = parse_search(&html);
    debug!(query = %query, count = entries.len(), "Parsed anime search results");

    if entries.is_empty() {
        return Err(AppError::EmptyResult(format!(
            "No anime found for '{}'",
            query
        )));
    }
    Ok(entries)
}

fn parse_ongoing(html: &str, base: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse("div.venz ul li").unwrap();
    let title_selector = Selector::parse("h2.jdlflm").unwrap();
    let episode_selector = Selector::parse("div.epz").unwrap();
    let link_selector = Selector::parse("a").unwrap();
    let img_selector = Selector::parse("img").unwrap();

    let mut entries = Vec::new();
    for item in document.select(&item_selector) {
        let title = item
            .select(&title_selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());
        let title = match title {
            Some(t) => t,
            None => continue,
        };

        let episode = item
            .select(&episode_selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string());
        let url = item
            .select(&link_selector)
            .next()
            .and_then(|e| e.value().attr("href"))
            .map(|href| absolute_url(href, base));
        let thumbnail = item
            .select(&img_selector)
            .next()
            .and_then(|e| e.value().attr("src"))
            .map(String::from);

        entries.push(json!({
            "title": title,
            "episode": episode,
            "thumbnail": thumbnail,
            "url": url,
        }));
    }
    entries
}

fn parse_search(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse("ul.chivsrc li").unwrap();
    let title_selector = Selector::parse("h2 a").unwrap();
    let img_selector = Selector::parse("img").unwrap();
    let meta_selector = Selector::parse("div.set").unwrap();

    let mut entries = Vec::new();
    for item in document.select(&item_selector) {
        let title_el = match item.select(&title_selector).next() {
            Some(el) => el,
            None => continue,
        };
        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }
        let url = title_el.value().attr("href").map(String::from);
        let thumbnail = item
            .select(&img_selector)
            .next()
            .and_then(|e| e.value().attr("src"))
            .map(String::from);

        // The meta rows are "Genres : ...", "Status : ...", "Rating : ..."
        let mut genres = None;
        let mut status = None;
        let mut rating = None;
        for meta in item.select(&meta_selector) {
            let text = meta.text().collect::<String>();
            if let Some((label, value)) = text.split_once(':') {
                let value = value.trim().to_string();
                if value.is_empty() {
                    continue;
                }
                match label.trim().to_lowercase().as_str() {
                    "genres" => genres = Some(value),
                    "status" => status = Some(value),
                    "rating" => rating = Some(value),
                    _ => {}
                }
            }
        }

        entries.push(json!({
            "title": title,
            "url": url,
            "thumbnail": thumbnail,
            "genres": genres,
            "status": status,
            "rating": rating,
        }));
    }
    entries
}

fn absolute_url(href: &str, base: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", base, href)
    }
}

fn urlencode(s: &str) -> String {
    serde_urlencoded::to_string([("s", s)])
        .unwrap_or_default()
        .trim_start_matches("s=")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONGOING_FIXTURE: &str = r#"
        <div class="venz"><ul>
          <li>
            <div class="thumb"><a href="/anime/alpha/"><img src="https://img.example/a.jpg"></a></div>
            <h2 class="jdlflm">Alpha Adventure</h2>
            <div class="epz">Episode 8</div>
          </li>
          <li>
            <div class="thumb"><a href="https://other.example/anime/beta/"><img src="https://img.example/b.jpg"></a></div>
            <h2 class="jdlflm">Beta Blade</h2>
          </li>
        </ul></div>
    "#;

    #[test]
    fn test_parse_ongoing() {
        let entries = parse_ongoing(ONGOING_FIXTURE, "https://site.example");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["title"], "Alpha Adventure");
        assert_eq!(entries[0]["episode"], "Episode 8");
        assert_eq!(entries[0]["url"], "https://site.example/anime/alpha/");
        assert_eq!(entries[1]["title"], "Beta Blade");
        // Missing episode stays null rather than failing the whole parse
        assert!(entries[1]["episode"].is_null());
        assert_eq!(entries[1]["url"], "https://other.example/anime/beta/");
    }

    #[test]
    fn test_parse_ongoing_empty_page() {
        assert!(parse_ongoing("<html><body></body></html>", "https://site.example").is_empty());
    }

    #[test]
    fn test_parse_search() {
        let html = r#"
            <ul class="chivsrc">
              <li>
                <img src="https://img.example/c.jpg">
                <h2><a href="https://site.example/anime/gamma/">Gamma Gate</a></h2>
                <div class="set">Genres : Action, Fantasy</div>
                <div class="set">Status : Ongoing</div>
                <div class="set">Rating : 8.41</div>
              </li>
            </ul>
        "#;
        let entries = parse_search(html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["title"], "Gamma Gate");
        assert_eq!(entries[0]["genres"], "Action, Fantasy");
        assert_eq!(entries[0]["status"], "Ongoing");
        assert_eq!(entries[0]["rating"], "8.41");
    }

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("one piece"), "one+piece");
    }
}
