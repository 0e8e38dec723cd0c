use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    Error, Result,
    cache::{Cache, CacheBackend},
};

use super::Catalog;

/// Where a planner session gets its catalog from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human readable origin, also used as the cache key
    fn describe(&self) -> String;

    async fn load(&self) -> Result<Catalog>;
}

/// Catalog JSON document on local disk
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Catalog> {
        tracing::debug!("Reading catalog from {}", self.path.display());
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            Error::DataSourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        Catalog::from_slice(&bytes)
    }
}

/// A `/courses` endpoint served by the planner server
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("ku-planner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn load(&self) -> Result<Catalog> {
        tracing::debug!("Fetching catalog from {}", self.url);
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                Error::DataSourceUnavailable(format!("{}: {}", self.url, e))
            } else {
                Error::Http(e)
            }
        })?;

        if !response.status().is_success() {
            return Err(Error::DataSourceUnavailable(format!(
                "{}: HTTP {}",
                self.url,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        Catalog::from_slice(&bytes)
    }
}

/// Serves a catalog from cache, falling back to the wrapped source
pub struct CachedSource<S: CatalogSource, C: CacheBackend> {
    inner: S,
    cache: C,
    ttl: Duration,
}

impl<S: CatalogSource, C: CacheBackend> CachedSource<S, C> {
    pub const fn new(inner: S, cache: C, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn cache_key(&self) -> String {
        format!("catalog:{}", self.inner.describe())
    }
}

#[async_trait]
impl<S: CatalogSource, C: CacheBackend> CatalogSource for CachedSource<S, C> {
    fn describe(&self) -> String {
        self.inner.describe()
    }

    async fn load(&self) -> Result<Catalog> {
        let key = self.cache_key();

        match self.cache.get::<Catalog>(&key).await {
            Ok(Some(catalog)) => {
                tracing::debug!("Catalog cache hit: {}", key);
                return Ok(catalog);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Catalog cache read failed, ignoring: {}", e),
        }

        let catalog = self.inner.load().await?;
        if let Err(e) = self.cache.set(&key, &catalog, self.ttl).await {
            tracing::warn!("Failed to cache catalog {}: {}", key, e);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use tempfile::NamedTempFile;

    use super::*;
    use crate::{cache::memory::MemoryCache, catalog::tests::sample_catalog};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        async fn load(&self) -> Result<Catalog> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample_catalog())
        }
    }

    /// Answer one connection per canned response, in order
    async fn serve(responses: Vec<(&'static str, String)>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });

        format!("http://{addr}/courses")
    }

    #[tokio::test]
    async fn http_source_maps_status_and_body_errors() {
        let valid = serde_json::to_string(&sample_catalog()).unwrap();
        let url = serve(vec![
            ("500 Internal Server Error", "{}".to_string()),
            ("200 OK", "{ not a catalog".to_string()),
            ("200 OK", valid),
        ])
        .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let source = HttpSource::with_client(client, url);

        assert!(matches!(
            source.load().await,
            Err(Error::DataSourceUnavailable(_))
        ));
        assert!(matches!(source.load().await, Err(Error::MalformedData(_))));
        assert_eq!(source.load().await.unwrap(), sample_catalog());
    }

    #[test]
    fn file_source_reads_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&sample_catalog()).unwrap().as_bytes())
            .unwrap();

        let source = FileSource::new(file.path());
        let catalog = tokio_test::block_on(source.load()).unwrap();
        assert_eq!(catalog, sample_catalog());
    }

    #[tokio::test]
    async fn file_source_reports_missing_and_malformed() {
        let missing = FileSource::new("/no/such/ku_courses.json");
        assert!(matches!(
            missing.load().await,
            Err(Error::DataSourceUnavailable(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[{\"courseCode\": 1}]").unwrap();
        assert!(matches!(
            FileSource::new(file.path()).load().await,
            Err(Error::MalformedData(_))
        ));
    }

    #[tokio::test]
    async fn cached_source_loads_inner_once() {
        let source = CachedSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            MemoryCache::default(),
            Duration::from_secs(60),
        );

        let first = source.load().await.unwrap();
        let second = source.load().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
        assert!(
            source
                .cache
                .entries
                .lock()
                .unwrap()
                .contains_key("catalog:counting")
        );
    }
}
