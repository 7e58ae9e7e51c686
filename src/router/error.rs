use thiserror::Error;

/// Errors surfaced by the cache router.
///
/// A failed network fetch only becomes `Unreachable` after the cached
/// fallback (where the policy allows one) has also come up empty; there
/// is no retry, a single failed attempt is final for that request.
#[derive(Error, Debug)]
pub enum FetchError {
    /// A precache fetch failed during install. Nothing was written; the
    /// previous namespaces stay in effect.
    #[error("Precache fetch failed during install: {url}")]
    Install {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The network fetch failed and no cached fallback existed.
    #[error("Network fetch failed with no cached fallback: {url}")]
    Unreachable {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The cache store itself failed (I/O, corrupt namespace file).
    #[error("Cache store error")]
    Store(#[from] anyhow::Error),
}
