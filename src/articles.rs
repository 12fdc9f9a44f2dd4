use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

use crate::config::StorageConfig;
use crate::error::ToolError;

/// One normalized news search result.
///
/// Missing or `null` fields read as `""`, both from the API and from stores
/// written with `null` descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(rename = "publishedAt", default, deserialize_with = "null_as_empty")]
    pub published_at: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Article {
    /// Render as a numbered listing block.
    pub fn to_block(&self, index: usize) -> String {
        format!(
            "Article {}:\nTitle: {}\nDescription: {}\nURL: {}\nPublished: {}\n",
            index, self.title, self.description, self.url, self.published_at
        )
    }
}

/// Listing of every stored article in store order, `None` when empty.
pub fn format_all(articles: &[Article]) -> Option<String> {
    if articles.is_empty() {
        return None;
    }

    let blocks: Vec<String> = articles
        .iter()
        .enumerate()
        .map(|(i, article)| article.to_block(i + 1))
        .collect();
    Some(blocks.join("\n"))
}

/// JSON-array-backed list of articles, in fetch order across all calls.
///
/// Every read and read-modify-write cycle holds the store lock, and batches
/// are written to a sibling temp file that is renamed over the store.
pub struct ArticleStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ArticleStore {
    pub fn new(storage: &StorageConfig) -> Self {
        Self::at(storage.articles_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Initialize the store to an empty array if absent. Idempotent.
    pub fn ensure_exists(&self) -> Result<(), ToolError> {
        let _guard = self.guard();
        self.ensure_exists_locked()
    }

    fn ensure_exists_locked(&self) -> Result<(), ToolError> {
        if self.path.exists() {
            return Ok(());
        }
        // Default permissions; rewrites carry them over
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ToolError::storage(parent, e))?;
        }
        fs::write(&self.path, "[]").map_err(|e| ToolError::storage(&self.path, e))?;
        log::debug!("ArticleStore: created {}", self.path.display());
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<Article>, ToolError> {
        let _guard = self.guard();
        self.ensure_exists_locked()?;
        self.read_locked()
    }

    /// Append `batch` to the end of the stored sequence. Returns the new total.
    pub fn append_batch(&self, batch: &[Article]) -> Result<usize, ToolError> {
        let _guard = self.guard();
        self.ensure_exists_locked()?;

        let mut stored = self.read_locked()?;
        stored.extend_from_slice(batch);
        self.write_locked(&stored)?;

        log::debug!(
            "ArticleStore: appended {} article(s), {} total",
            batch.len(),
            stored.len()
        );
        Ok(stored.len())
    }

    fn read_locked(&self) -> Result<Vec<Article>, ToolError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| ToolError::storage(&self.path, e))?;
        serde_json::from_str(&content).map_err(|source| ToolError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_locked(&self, articles: &[Article]) -> Result<(), ToolError> {
        let json = serde_json::to_string_pretty(articles).map_err(ToolError::Encode)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| ToolError::storage(&dir, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| ToolError::storage(&dir, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| ToolError::storage(tmp.path(), e))?;
        if let Ok(meta) = fs::metadata(&self.path) {
            fs::set_permissions(tmp.path(), meta.permissions())
                .map_err(|e| ToolError::storage(tmp.path(), e))?;
        }
        tmp.persist(&self.path)
            .map_err(|e| ToolError::storage(&self.path, e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            description: format!("about {}", title),
            url: format!("https://example.com/{}", title),
            published_at: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    fn store(dir: &TempDir) -> ArticleStore {
        ArticleStore::at(dir.path().join("news_articles.json"))
    }

    #[test]
    fn test_ensure_exists_writes_empty_array() {
        let dir = TempDir::new().unwrap();
        let articles = store(&dir);

        articles.ensure_exists().unwrap();
        assert_eq!(fs::read_to_string(articles.path()).unwrap(), "[]");
        articles.ensure_exists().unwrap();
        assert_eq!(fs::read_to_string(articles.path()).unwrap(), "[]");
        assert!(articles.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_batches_accumulate_in_call_order() {
        let dir = TempDir::new().unwrap();
        let articles = store(&dir);

        let first = vec![article("a"), article("b"), article("c")];
        let second = vec![article("a"), article("d")];
        assert_eq!(articles.append_batch(&first).unwrap(), 3);
        assert_eq!(articles.append_batch(&second).unwrap(), 5);

        let titles: Vec<String> = articles
            .read_all()
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["a", "b", "c", "a", "d"]);
    }

    #[test]
    fn test_file_uses_published_at_key_and_indentation() {
        let dir = TempDir::new().unwrap();
        let articles = store(&dir);

        articles.append_batch(&[article("x")]).unwrap();
        let raw = fs::read_to_string(articles.path()).unwrap();
        assert!(raw.contains("\n  {\n    \"title\": \"x\","));
        assert!(raw.contains("\"publishedAt\": \"2024-05-01T12:00:00Z\""));
        assert!(!raw.contains("published_at"));
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let dir = TempDir::new().unwrap();
        let articles = store(&dir);
        fs::write(
            articles.path(),
            r#"[{"title": "T", "url": "U", "publishedAt": "P"}]"#,
        )
        .unwrap();

        let stored = articles.read_all().unwrap();
        assert_eq!(stored[0].description, "");
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let articles = store(&dir);
        fs::write(
            articles.path(),
            r#"[{"title": "T", "description": null, "url": "U", "publishedAt": "P"},
                {"title": null, "description": "D", "url": null, "publishedAt": null}]"#,
        )
        .unwrap();

        let stored = articles.read_all().unwrap();
        assert_eq!(stored[0].description, "");
        assert_eq!(stored[1].title, "");
        assert_eq!(stored[1].url, "");
        assert_eq!(stored[1].published_at, "");
        assert_eq!(
            format_all(&stored[..1]).unwrap(),
            "Article 1:\nTitle: T\nDescription: \nURL: U\nPublished: P\n"
        );

        // Appending rewrites the nulls as empty strings
        articles.append_batch(&[article("next")]).unwrap();
        let raw = fs::read_to_string(articles.path()).unwrap();
        assert!(!raw.contains("null"));
        assert_eq!(articles.read_all().unwrap().len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_append_keeps_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let articles = store(&dir);
        articles.ensure_exists().unwrap();
        fs::set_permissions(articles.path(), fs::Permissions::from_mode(0o644)).unwrap();

        articles.append_batch(&[article("a")]).unwrap();
        articles.append_batch(&[article("b")]).unwrap();

        let mode = fs::metadata(articles.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_store_uses_default_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let sibling = dir.path().join("plain.txt");
        fs::write(&sibling, "").unwrap();
        let articles = store(&dir);

        articles.append_batch(&[article("a")]).unwrap();

        let expected = fs::metadata(&sibling).unwrap().permissions().mode() & 0o777;
        let mode = fs::metadata(articles.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, expected);
    }

    #[test]
    fn test_corrupt_store_is_reported_and_left_alone() {
        let dir = TempDir::new().unwrap();
        let articles = store(&dir);
        fs::write(articles.path(), "{not json").unwrap();

        let err = articles.append_batch(&[article("a")]).unwrap_err();
        assert!(matches!(err, ToolError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(articles.path()).unwrap(), "{not json");
    }

    #[test]
    fn test_format_all_empty() {
        assert_eq!(format_all(&[]), None);
    }

    #[test]
    fn test_format_single_article() {
        let one = Article {
            title: "T".to_string(),
            description: "D".to_string(),
            url: "U".to_string(),
            published_at: "P".to_string(),
        };
        assert_eq!(
            format_all(&[one]).unwrap(),
            "Article 1:\nTitle: T\nDescription: D\nURL: U\nPublished: P\n"
        );
    }

    #[test]
    fn test_format_blocks_are_numbered_and_separated_by_blank_line() {
        let listing = format_all(&[article("first"), article("second")]).unwrap();
        let blocks: Vec<&str> = listing.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("Article 1:\nTitle: first\n"));
        assert!(blocks[1].starts_with("Article 2:\nTitle: second\n"));
    }
}
