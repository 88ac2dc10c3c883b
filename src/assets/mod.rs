//! Tileset and graphic loading with per-id request coalescing.

pub mod file_access;
pub mod grp;
pub mod tileset;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use ahash::AHashMap;
use async_trait::async_trait;
use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub use file_access::{DirectoryReader, FileAccess, FileReader};
pub use grp::{Frame, Grp};
pub use tileset::{MegatileFormat, Tileset, TilesetFiles};

/// Error type returned by asset providers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Source of raw asset bytes: a directory, an archive, a network store...
#[async_trait]
pub trait AssetProvider: Send + Sync {
    /// The four files of tileset `id` (0-7)
    async fn tileset(&self, id: u16) -> Result<TilesetFiles, BoxError>;

    /// GRP graphic used to draw unit type `id`
    async fn unit(&self, id: u16) -> Result<Bytes, BoxError>;

    /// GRP graphic used to draw sprite type `id`
    async fn sprite(&self, id: u16) -> Result<Bytes, BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Tileset,
    Unit,
    Sprite,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tileset => "tileset",
            Self::Unit => "unit",
            Self::Sprite => "sprite",
        })
    }
}

/// A failed asset load. Clonable so that every waiter receives it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to load {kind} {id}: {source}")]
pub struct AssetError {
    pub kind: AssetKind,
    pub id: u16,
    #[source]
    source: Arc<dyn std::error::Error + Send + Sync>,
}

impl AssetError {
    pub fn new(kind: AssetKind, id: u16, source: BoxError) -> Self {
        Self { kind, id, source: Arc::from(source) }
    }

    /// The provider or decoding error behind this failure
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.source
    }
}

type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<T>, AssetError>>>;
type FetchMap<T> = Mutex<AHashMap<u16, SharedFetch<T>>>;

/// Memoizes decoded assets by id.
///
/// Concurrent requests for an id that is still loading await the same
/// in-flight fetch. A failed fetch is reported to everyone waiting on it
/// and then forgotten, so a later request for that id tries again.
pub struct AssetCache {
    provider: Arc<dyn AssetProvider>,
    tilesets: FetchMap<Tileset>,
    units: FetchMap<Grp>,
    sprites: FetchMap<Grp>,
}

impl AssetCache {
    pub fn new(provider: impl AssetProvider + 'static) -> Self {
        Self::from_arc(Arc::new(provider))
    }

    pub fn from_arc(provider: Arc<dyn AssetProvider>) -> Self {
        Self {
            provider,
            tilesets: Mutex::new(AHashMap::new()),
            units: Mutex::new(AHashMap::new()),
            sprites: Mutex::new(AHashMap::new()),
        }
    }

    pub async fn tileset(&self, id: u16) -> Result<Arc<Tileset>, AssetError> {
        self.fetch(AssetKind::Tileset, &self.tilesets, id, move |provider| async move {
            let files = provider.tileset(id).await?;
            Ok::<_, BoxError>(Tileset::new(id, files)?)
        })
        .await
    }

    pub async fn unit(&self, id: u16) -> Result<Arc<Grp>, AssetError> {
        self.fetch(AssetKind::Unit, &self.units, id, move |provider| async move {
            let data = provider.unit(id).await?;
            Ok::<_, BoxError>(Grp::new(data)?)
        })
        .await
    }

    pub async fn sprite(&self, id: u16) -> Result<Arc<Grp>, AssetError> {
        self.fetch(AssetKind::Sprite, &self.sprites, id, move |provider| async move {
            let data = provider.sprite(id).await?;
            Ok::<_, BoxError>(Grp::new(data)?)
        })
        .await
    }

    async fn fetch<T, F, Fut>(
        &self,
        kind: AssetKind,
        map: &FetchMap<T>,
        id: u16,
        load: F,
    ) -> Result<Arc<T>, AssetError>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Arc<dyn AssetProvider>) -> Fut,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        let fetch = {
            let mut map = map.lock().await;
            map.entry(id)
                .or_insert_with(|| {
                    debug!(%kind, id, "fetching asset");
                    load(self.provider.clone())
                        .map(move |result| match result {
                            Ok(value) => Ok(Arc::new(value)),
                            Err(e) => {
                                warn!(%kind, id, error = %e, "asset fetch failed");
                                Err(AssetError::new(kind, id, e))
                            }
                        })
                        .boxed()
                        .shared()
                })
                .clone()
        };

        let result = fetch.clone().await;
        if result.is_err() {
            let mut map = map.lock().await;
            if map.get(&id).is_some_and(|current| current.ptr_eq(&fetch)) {
                map.remove(&id);
            }
        }
        result
    }
}

impl fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetCache").finish_non_exhaustive()
    }
}
