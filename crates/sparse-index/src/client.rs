//! SparseIndexClient: a `MetadataClient` backed by an HTTP sparse index.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use resolver_core::{DependencyEdge, MetadataClient, PackageIdentity, PlatformTag, Version};
use tracing::{debug, error, trace};
use url::Url;

use crate::entry::{parse_entries, IndexEntry};
use crate::error::IndexError;
use crate::path::index_path;

pub const CRATES_IO_INDEX: &str = "https://index.crates.io/";

/// Cache TTL: 3 minutes
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3 * 60);

pub const DEFAULT_CACHE_CAPACITY: u64 = 1000;

#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub index_url: Url,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl IndexOptions {
    pub fn new(index_url: &str) -> Result<Self, IndexError> {
        Ok(Self {
            index_url: Url::parse(index_url)?,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        })
    }
}

/// Fetches index files over HTTP and keeps parsed entries in an in-process
/// TTL cache. Nothing is written to disk.
#[derive(Clone)]
pub struct SparseIndexClient {
    http: reqwest::Client,
    index_url: Url,
    cache: Cache<String, Arc<Vec<IndexEntry>>>,
}

impl std::fmt::Debug for SparseIndexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseIndexClient")
            .field("index_url", &self.index_url.as_str())
            .field("cached", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl SparseIndexClient {
    pub fn new(http: reqwest::Client, options: IndexOptions) -> Self {
        let mut index_url = options.index_url;
        if !index_url.path().ends_with('/') {
            let path = format!("{}/", index_url.path());
            index_url.set_path(&path);
        }
        let cache = Cache::builder()
            .time_to_live(options.cache_ttl)
            .max_capacity(options.cache_capacity)
            .build();
        Self {
            http,
            index_url,
            cache,
        }
    }

    pub fn index_url(&self) -> &Url {
        &self.index_url
    }

    /// Full URL of a package's index file.
    pub fn entry_url(&self, package_name: &str) -> Result<Url, IndexError> {
        Ok(self.index_url.join(&index_path(package_name)?)?)
    }

    /// Every entry of a package's index file, `None` if the registry does not
    /// know the package.
    ///
    /// Concurrent calls for the same package share a single request.
    pub async fn fetch_entries(
        &self,
        package_name: &str,
    ) -> Result<Option<Arc<Vec<IndexEntry>>>, Arc<IndexError>> {
        let url = self.entry_url(package_name)?;
        let cache_key = package_name.to_ascii_lowercase();

        match self
            .cache
            .try_get_with(cache_key, self.download(package_name, url))
            .await
        {
            Ok(entries) => Ok(Some(entries)),
            Err(e) if matches!(*e, IndexError::NotFound(_)) => {
                debug!("index has no package '{}'", package_name);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn download(
        &self,
        package_name: &str,
        url: Url,
    ) -> Result<Arc<Vec<IndexEntry>>, IndexError> {
        debug!("cache miss for '{}', fetching {}", package_name, url);

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            return Err(IndexError::NotFound(package_name.to_string()));
        }
        if !status.is_success() {
            return Err(IndexError::Status {
                name: package_name.to_string(),
                status: status.as_u16(),
            });
        }

        let text = resp.text().await?;
        let entries = parse_entries(&text);
        trace!("parsed {} entries for '{}'", entries.len(), package_name);
        Ok(Arc::new(entries))
    }

    async fn entries_or_log(&self, package_name: &str) -> Option<Arc<Vec<IndexEntry>>> {
        match self.fetch_entries(package_name).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to fetch index for '{}': {}", package_name, e);
                None
            }
        }
    }
}

#[async_trait]
impl MetadataClient for SparseIndexClient {
    async fn resolve_dependencies(
        &self,
        identity: &PackageIdentity,
        platform: &PlatformTag,
    ) -> Option<Vec<DependencyEdge>> {
        let entries = self.entries_or_log(&identity.id).await?;
        let entry = entries
            .iter()
            .find(|entry| entry.version().is_ok_and(|v| v == identity.version))?;

        match entry.dependency_edges(platform) {
            Ok(edges) => Some(edges),
            Err(e) => {
                error!("Unusable index entry for {}: {}", identity, e);
                None
            }
        }
    }

    /// Non-yanked versions, oldest first.
    async fn available_versions(&self, id: &str, _platform: &PlatformTag) -> Option<Vec<Version>> {
        let entries = self.entries_or_log(id).await?;
        let versions = entries
            .iter()
            .filter(|entry| !entry.yanked)
            .filter_map(|entry| entry.version().ok())
            .collect();
        Some(versions)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    const SERDE_INDEX: &str = concat!(
        r#"{"name":"serde","vers":"1.0.199","deps":[],"cksum":"00","features":{},"yanked":true}"#,
        "\n",
        r#"{"name":"serde","vers":"1.0.200","deps":[{"name":"serde_derive","req":"^1","features":[],"optional":false,"default_features":true,"target":"x86_64-unknown-linux-gnu","kind":"normal"},{"name":"itoa","req":"^1.0.1","features":[],"optional":false,"default_features":true,"target":null,"kind":"normal"}],"cksum":"01","features":{},"yanked":false}"#,
        "\n",
    );

    /// Answers every connection with one slow HTTP response; counts connections.
    async fn serve(status_line: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut request = [0u8; 4096];
                    let _ = socket.read(&mut request).await;
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    let response = format!(
                        "{status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        (format!("http://{addr}/"), connections)
    }

    fn client(index_url: &str) -> SparseIndexClient {
        let _ = rustls::crypto::ring::default_provider().install_default();
        SparseIndexClient::new(reqwest::Client::new(), IndexOptions::new(index_url).unwrap())
    }

    #[test]
    fn test_entry_url_joins_index_path() {
        let client = client(CRATES_IO_INDEX);
        assert_eq!(
            client.entry_url("serde").unwrap().as_str(),
            "https://index.crates.io/se/rd/serde"
        );
    }

    #[test]
    fn test_index_url_gains_trailing_slash() {
        let client = client("https://registry.example.com/api/v1/index");
        assert_eq!(
            client.entry_url("log").unwrap().as_str(),
            "https://registry.example.com/api/v1/index/3/l/log"
        );
    }

    #[test]
    fn test_entry_url_rejects_non_registry_name() {
        let client = client(CRATES_IO_INDEX);
        assert!(matches!(
            client.entry_url("aéb"),
            Err(IndexError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn test_non_ascii_name_reads_as_not_found() {
        let client = client(CRATES_IO_INDEX);
        let identity = PackageIdentity::new("aéb", Version::new(1, 0, 0));

        let edges = client
            .resolve_dependencies(&identity, &PlatformTag::new("any"))
            .await;
        assert!(edges.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_request() {
        let (index_url, connections) = serve("HTTP/1.1 200 OK", SERDE_INDEX).await;
        let client = client(&index_url);

        let (a, b, c, d) = tokio::join!(
            client.fetch_entries("serde"),
            client.fetch_entries("serde"),
            client.fetch_entries("Serde"),
            client.fetch_entries("serde"),
        );

        for entries in [a, b, c, d] {
            assert_eq!(entries.unwrap().unwrap().len(), 2);
        }
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_index_entries_become_platform_edges() {
        let (index_url, _) = serve("HTTP/1.1 200 OK", SERDE_INDEX).await;
        let client = client(&index_url);
        let identity = PackageIdentity::new("serde", Version::new(1, 0, 200));

        let linux = client
            .resolve_dependencies(&identity, &PlatformTag::new("x86_64-unknown-linux-gnu"))
            .await
            .unwrap();
        let targets: Vec<&str> = linux.iter().map(|e| e.to_id.as_str()).collect();
        assert_eq!(targets, vec!["serde_derive", "itoa"]);

        let windows = client
            .resolve_dependencies(&identity, &PlatformTag::new("x86_64-pc-windows-msvc"))
            .await
            .unwrap();
        assert_eq!(windows.len(), 1);

        let versions = client
            .available_versions("serde", &PlatformTag::new("any"))
            .await
            .unwrap();
        assert_eq!(versions, vec![Version::new(1, 0, 200)]);
    }

    #[tokio::test]
    async fn test_missing_package_is_none() {
        let (index_url, _) = serve("HTTP/1.1 404 Not Found", "").await;
        let client = client(&index_url);

        assert!(client.fetch_entries("ghost").await.unwrap().is_none());
        let identity = PackageIdentity::new("ghost", Version::new(1, 0, 0));
        assert!(client
            .resolve_dependencies(&identity, &PlatformTag::new("any"))
            .await
            .is_none());
    }

    #[test]
    fn test_options_reject_invalid_url() {
        assert!(matches!(
            IndexOptions::new("not a url"),
            Err(IndexError::Url(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_registry_reads_as_not_found() {
        let client = client("http://127.0.0.1:9/");
        let identity = PackageIdentity::new("serde", Version::new(1, 0, 0));

        let edges = client
            .resolve_dependencies(&identity, &PlatformTag::new("any"))
            .await;
        assert!(edges.is_none());
        assert!(client
            .available_versions("serde", &PlatformTag::new("any"))
            .await
            .is_none());
    }
}
