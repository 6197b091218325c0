use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::{NewsClient, get_json};

pub const BASE_URL: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    api_key: String,
    page_size: usize,
    http: Client,
}

impl NewsApiClient {
    pub fn new(api_key: String, page_size: usize, http: Client) -> Self {
        Self { api_key, page_size, http }
    }

    fn request(&self, query: &str) -> RequestBuilder {
        let page_size = self.page_size.to_string();
        self.http.get(BASE_URL).query(&[
            ("q", query),
            ("apiKey", self.api_key.as_str()),
            ("pageSize", page_size.as_str()),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSource {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: ArticleSource,
    pub title: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsPayload {
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[async_trait]
impl NewsClient for NewsApiClient {
    async fn fetch_news(&self, query: &str) -> Result<NewsPayload> {
        get_json(self.request(query), "NewsAPI").await
    }
}
