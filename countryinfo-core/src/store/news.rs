use std::{collections::HashSet, sync::Arc};

use super::collect_batch;
use crate::{
    cache::{FreshnessPolicy, JsonCache},
    client::{NewsClient, newsapi::Article},
    error::CollectError,
    model::{Location, NewsItem},
};

impl From<Article> for NewsItem {
    fn from(article: Article) -> Self {
        NewsItem {
            source: article.source.name,
            title: article.title.unwrap_or_default(),
            url: article.url,
            url_to_image: article.url_to_image,
            description: article.description,
            content: article.content,
            published_at: article.published_at,
        }
    }
}

/// Recent news per capital, at most `limit` items each.
#[derive(Debug, Clone)]
pub struct NewsStore {
    client: Arc<dyn NewsClient>,
    cache: JsonCache,
    policy: FreshnessPolicy,
    limit: usize,
}

impl NewsStore {
    pub fn new(
        client: Arc<dyn NewsClient>,
        cache: JsonCache,
        policy: FreshnessPolicy,
        limit: usize,
    ) -> Self {
        Self { client, cache, policy, limit }
    }

    /// Cached news for `location`. `Some(vec![])` means the source had nothing.
    pub async fn read(&self, location: &Location) -> Option<Vec<NewsItem>> {
        self.cache.get(&location.cache_key()).await.map(|entry| entry.value)
    }

    #[tracing::instrument(name = "collect_news", skip_all, fields(locations = locations.len()))]
    pub async fn collect(&self, locations: &HashSet<Location>) -> Result<(), CollectError> {
        let client = &self.client;
        let limit = self.limit;

        collect_batch(
            "news",
            &self.cache,
            self.policy,
            locations.iter().cloned(),
            Location::cache_key,
            move |location: Location| async move {
                let payload = client.fetch_news(&location.capital).await?;
                let items: Vec<NewsItem> =
                    payload.articles.into_iter().take(limit).map(NewsItem::from).collect();
                Ok::<_, anyhow::Error>(items)
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fakes::{FakeNews, article};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn moscow() -> Location {
        Location::new("Moscow", "RU")
    }

    #[tokio::test]
    async fn keeps_at_most_limit_items_in_order() {
        let dir = TempDir::new().unwrap();
        let client = FakeNews {
            by_query: HashMap::from([(
                "Moscow".to_string(),
                vec![article("a"), article("b"), article("c"), article("d")],
            )]),
            fail: false,
        };
        let store =
            NewsStore::new(Arc::new(client), JsonCache::new(dir.path()), FreshnessPolicy::default(), 3);

        assert!(store.read(&moscow()).await.is_none());
        store.collect(&HashSet::from([moscow()])).await.unwrap();

        let news = store.read(&moscow()).await.expect("news cached");
        let titles: Vec<_> = news.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
        assert_eq!(news[0].source, "Example News");
    }

    #[tokio::test]
    async fn empty_result_is_cached_as_empty_list() {
        let dir = TempDir::new().unwrap();
        let store = NewsStore::new(
            Arc::new(FakeNews::default()),
            JsonCache::new(dir.path()),
            FreshnessPolicy::default(),
            3,
        );

        store.collect(&HashSet::from([moscow()])).await.unwrap();
        assert_eq!(store.read(&moscow()).await, Some(vec![]));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_no_entry() {
        let dir = TempDir::new().unwrap();
        let store = NewsStore::new(
            Arc::new(FakeNews { by_query: HashMap::new(), fail: true }),
            JsonCache::new(dir.path()),
            FreshnessPolicy::default(),
            3,
        );

        let err = store.collect(&HashSet::from([moscow()])).await.unwrap_err();
        assert_eq!(err.source_name, "news");
        assert!(store.read(&moscow()).await.is_none());
    }
}
