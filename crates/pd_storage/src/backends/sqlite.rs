use async_trait::async_trait;
use pd_core::{
    Article, ArticleCache, ArticleType, AuthorPayout, Error, PayoutLine, PayoutRate, Result,
    SourceRef,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::{Path, PathBuf};
use tracing::debug;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        content TEXT NOT NULL,
        author TEXT NOT NULL,
        published_at TEXT NOT NULL,
        url TEXT,
        url_to_image TEXT,
        source_id TEXT,
        source_name TEXT NOT NULL,
        kind TEXT NOT NULL,
        position INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payouts (
        author TEXT PRIMARY KEY,
        article_count INTEGER NOT NULL,
        total_payout REAL NOT NULL,
        lines TEXT NOT NULL,
        position INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rates (
        id INTEGER PRIMARY KEY CHECK (id = 0),
        news_rate REAL NOT NULL,
        blog_rate REAL NOT NULL
    )
    "#,
    // Add future migrations here
];

/// SQLite-backed cache. Three logical stores, schema established
/// idempotently on open.
pub struct SqliteCache {
    pool: SqlitePool,
    db_path: PathBuf,
}

fn db_err(e: sqlx::Error) -> Error {
    Error::Storage(e.to_string())
}

fn kind_from_column(raw: &str) -> Result<ArticleType> {
    match raw {
        "news" => Ok(ArticleType::News),
        "blog" => Ok(ArticleType::Blog),
        other => Err(Error::Storage(format!("unknown article kind: {}", other))),
    }
}

impl SqliteCache {
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(db_err)?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("migration {} failed: {}", i, e)))?;
        }
        debug!("💾 sqlite cache ready at {}", db_path.display());

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl ArticleCache for SqliteCache {
    async fn save_articles(&self, articles: &[Article]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query("DELETE FROM articles")
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for (position, article) in articles.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO articles
                (id, title, description, content, author, published_at,
                 url, url_to_image, source_id, source_name, kind, position)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&article.id)
            .bind(&article.title)
            .bind(&article.description)
            .bind(&article.content)
            .bind(&article.author)
            .bind(&article.published_at)
            .bind(article.url.as_deref())
            .bind(article.url_to_image.as_deref())
            .bind(article.source.id.as_deref())
            .bind(&article.source.name)
            .bind(article.kind.as_str())
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)
    }

    async fn get_articles(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query("SELECT * FROM articles ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut articles = Vec::with_capacity(rows.len());
        for row in rows {
            articles.push(Article {
                id: row.get("id"),
                title: row.get("title"),
                description: row.get("description"),
                content: row.get("content"),
                author: row.get("author"),
                published_at: row.get("published_at"),
                url: row.get("url"),
                url_to_image: row.get("url_to_image"),
                source: SourceRef {
                    id: row.get("source_id"),
                    name: row.get("source_name"),
                },
                kind: kind_from_column(row.get::<String, _>("kind").as_str())?,
            });
        }
        Ok(articles)
    }

    async fn save_payouts(&self, payouts: &[AuthorPayout]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query("DELETE FROM payouts")
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for (position, payout) in payouts.iter().enumerate() {
            let lines = serde_json::to_string(&payout.articles)?;
            sqlx::query(
                r#"
                INSERT INTO payouts (author, article_count, total_payout, lines, position)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&payout.author)
            .bind(payout.article_count as i64)
            .bind(payout.total_payout)
            .bind(lines)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)
    }

    async fn get_payouts(&self) -> Result<Vec<AuthorPayout>> {
        let rows = sqlx::query("SELECT * FROM payouts ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut payouts = Vec::with_capacity(rows.len());
        for row in rows {
            let lines: Vec<PayoutLine> = serde_json::from_str(row.get::<String, _>("lines").as_str())?;
            payouts.push(AuthorPayout {
                author: row.get("author"),
                article_count: row.get::<i64, _>("article_count") as usize,
                total_payout: row.get("total_payout"),
                articles: lines,
            });
        }
        Ok(payouts)
    }

    async fn save_rates(&self, rates: &PayoutRate) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO rates (id, news_rate, blog_rate)
            VALUES (0, ?, ?)
            "#,
        )
        .bind(rates.news_rate)
        .bind(rates.blog_rate)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_rates(&self) -> Result<Option<PayoutRate>> {
        let row = sqlx::query("SELECT news_rate, blog_rate FROM rates WHERE id = 0")
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(|row| PayoutRate {
            news_rate: row.get("news_rate"),
            blog_rate: row.get("blog_rate"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, author: &str, kind: ArticleType) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Story {}", id),
            description: "desc".to_string(),
            content: "body".to_string(),
            author: author.to_string(),
            published_at: "2024-05-01T12:00:00Z".to_string(),
            url: Some(format!("https://example.com/{}", id)),
            url_to_image: None,
            source: SourceRef {
                id: Some("wire".to_string()),
                name: "Test Wire".to_string(),
            },
            kind,
        }
    }

    #[tokio::test]
    async fn articles_roundtrip_in_saved_order() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SqliteCache::open(&dir.path().join("cache.db")).await.unwrap();

        let saved = vec![
            article("b", "Bob", ArticleType::Blog),
            article("a", "Alice", ArticleType::News),
        ];
        cache.save_articles(&saved).await.unwrap();

        let loaded = cache.get_articles().await.unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn save_articles_replaces_full_contents() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SqliteCache::open(&dir.path().join("cache.db")).await.unwrap();

        cache
            .save_articles(&[article("a", "Alice", ArticleType::News)])
            .await
            .unwrap();
        cache
            .save_articles(&[article("b", "Bob", ArticleType::Blog)])
            .await
            .unwrap();

        let loaded = cache.get_articles().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "b");
    }

    #[tokio::test]
    async fn payouts_and_rates_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("cache.db");

        {
            let cache = SqliteCache::open(&db).await.unwrap();
            cache
                .save_payouts(&[AuthorPayout {
                    author: "Alice".to_string(),
                    article_count: 1,
                    total_payout: 50.0,
                    articles: vec![PayoutLine {
                        id: "a".to_string(),
                        title: "Story a".to_string(),
                        kind: ArticleType::News,
                        published_at: "2024-05-01T12:00:00Z".to_string(),
                        rate: 50.0,
                    }],
                }])
                .await
                .unwrap();
            cache
                .save_rates(&PayoutRate {
                    news_rate: 50.0,
                    blog_rate: 100.0,
                })
                .await
                .unwrap();
        }

        let cache = SqliteCache::open(&db).await.unwrap();
        let payouts = cache.get_payouts().await.unwrap();
        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].author, "Alice");
        assert_eq!(payouts[0].articles.len(), 1);

        let rates = cache.get_rates().await.unwrap().unwrap();
        assert_eq!(rates.news_rate, 50.0);
    }
}
