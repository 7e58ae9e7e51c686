use anyhow::anyhow;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::policy::{RoutePolicy, RouteTable};
use crate::store::{CacheStore, CachedResponse, Request};

use super::error::FetchError;
use super::origin::Origin;

/// Where an answered request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Network,
    StaticCache,
    DynamicCache,
}

impl std::fmt::Display for ServedFrom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServedFrom::Network => write!(f, "network"),
            ServedFrom::StaticCache => write!(f, "static cache"),
            ServedFrom::DynamicCache => write!(f, "dynamic cache"),
        }
    }
}

/// A routed response plus its provenance, so callers can tell a live
/// answer from an offline fallback.
#[derive(Debug, Clone)]
pub struct RoutedResponse {
    pub response: CachedResponse,
    pub served_from: ServedFrom,
}

/// The cache router: owns the static and dynamic namespaces and decides,
/// per request, whether to answer from cache or network and whether to
/// populate cache.
pub struct CacheRouter<S> {
    store: S,
    origin: Box<dyn Origin>,
    table: RouteTable,
    static_namespace: String,
    dynamic_namespace: String,
}

impl<S: CacheStore> CacheRouter<S> {
    pub fn new(
        store: S,
        origin: Box<dyn Origin>,
        table: RouteTable,
        static_namespace: impl Into<String>,
        dynamic_namespace: impl Into<String>,
    ) -> Self {
        Self {
            store,
            origin,
            table,
            static_namespace: static_namespace.into(),
            dynamic_namespace: dynamic_namespace.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Populate the static namespace from the precache manifest.
    ///
    /// All-or-nothing: every manifest URL is fetched first, and a single
    /// failure (transport error or non-success status) aborts the install
    /// before anything is written, leaving the previous precache intact.
    /// Returns the number of entries written.
    pub async fn install(&self, manifest: &[String]) -> Result<usize, FetchError> {
        let fetches = manifest.iter().map(|url| async move {
            let request = Request::get(url.clone());
            let result = self.origin.fetch(&request).await;
            (url, request, result)
        });

        let mut staged = Vec::with_capacity(manifest.len());
        for (url, request, result) in join_all(fetches).await {
            let fetched = result.map_err(|source| FetchError::Install {
                url: url.clone(),
                source,
            })?;
            if !fetched.is_success() {
                return Err(FetchError::Install {
                    url: url.clone(),
                    source: anyhow!("precache fetch returned status {}", fetched.status),
                });
            }
            staged.push((request.cache_key(), fetched.into_cached()));
        }

        for (key, response) in &staged {
            self.store.put(&self.static_namespace, key, response)?;
        }
        info!(
            count = staged.len(),
            namespace = %self.static_namespace,
            "Precache installed"
        );
        Ok(staged.len())
    }

    /// Version rollover: delete every namespace that is not one of the two
    /// current names. Returns the deleted names.
    pub fn activate(&self) -> Result<Vec<String>, FetchError> {
        let mut deleted = Vec::new();
        for name in self.store.namespaces()? {
            if name != self.static_namespace && name != self.dynamic_namespace {
                self.store.remove_namespace(&name)?;
                deleted.push(name);
            }
        }
        if !deleted.is_empty() {
            info!(pruned = ?deleted, "Stale cache namespaces removed");
        }
        Ok(deleted)
    }

    /// Route one request. Non-GET requests pass straight through to the
    /// origin and never touch either namespace.
    pub async fn handle(&self, request: &Request) -> Result<RoutedResponse, FetchError> {
        if !request.method.is_get() {
            let fetched = self.origin.fetch(request).await.map_err(|source| {
                FetchError::Unreachable {
                    url: request.url.clone(),
                    source,
                }
            })?;
            return Ok(RoutedResponse {
                response: fetched.into_cached(),
                served_from: ServedFrom::Network,
            });
        }

        let policy = self.table.classify(request.path());
        debug!(url = %request.url, ?policy, "Routing request");
        match policy {
            RoutePolicy::CacheFirst => self.cache_first(request).await,
            // Bypass never populates the cache but still gets the
            // last-known dynamic entry when the network is down.
            RoutePolicy::Bypass => self.network_first(request, false).await,
            RoutePolicy::NetworkFirst => self.network_first(request, true).await,
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<RoutedResponse, FetchError> {
        let key = request.cache_key();
        if let Some(hit) = self.store.get(&self.static_namespace, &key)? {
            debug!(url = %request.url, "Static cache hit");
            return Ok(RoutedResponse {
                response: hit,
                served_from: ServedFrom::StaticCache,
            });
        }

        // Cache miss: fetch once, result not persisted. A failure here
        // surfaces unchanged, there is no fallback for static assets.
        let fetched = self.origin.fetch(request).await.map_err(|source| {
            FetchError::Unreachable {
                url: request.url.clone(),
                source,
            }
        })?;
        Ok(RoutedResponse {
            response: fetched.into_cached(),
            served_from: ServedFrom::Network,
        })
    }

    async fn network_first(
        &self,
        request: &Request,
        cache_ok: bool,
    ) -> Result<RoutedResponse, FetchError> {
        let key = request.cache_key();
        match self.origin.fetch(request).await {
            Ok(fetched) => {
                let response = fetched.into_cached();
                // Only clean 200s are worth keeping; error pages and
                // redirects must never shadow a real resource.
                if cache_ok && response.status == 200 {
                    self.store.put(&self.dynamic_namespace, &key, &response)?;
                }
                Ok(RoutedResponse {
                    response,
                    served_from: ServedFrom::Network,
                })
            }
            Err(source) => {
                if let Some(entry) = self.store.get(&self.dynamic_namespace, &key)? {
                    warn!(url = %request.url, "Network fetch failed, serving cached copy");
                    return Ok(RoutedResponse {
                        response: entry,
                        served_from: ServedFrom::DynamicCache,
                    });
                }
                Err(FetchError::Unreachable {
                    url: request.url.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::router::origin::FetchedResponse;
    use crate::store::{MemoryStore, Method};

    const STATIC_NS: &str = "todobox-static-v2";
    const DYNAMIC_NS: &str = "todobox-v2";

    /// Scripted origin: URL -> (status, body). Unscripted URLs behave
    /// like a connection failure, as does the whole origin when taken
    /// offline. Counts every call so tests can assert "no network hit".
    struct FakeOrigin {
        responses: Mutex<HashMap<String, (u16, &'static str)>>,
        offline: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeOrigin {
        fn new(responses: &[(&str, u16, &'static str)]) -> Self {
            let map = responses
                .iter()
                .map(|(url, status, body)| (url.to_string(), (*status, *body)))
                .collect();
            Self {
                responses: Mutex::new(map),
                offline: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Origin for FakeOrigin {
        async fn fetch(&self, request: &Request) -> anyhow::Result<FetchedResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                anyhow::bail!("simulated offline");
            }
            let responses = self.responses.lock().unwrap();
            match responses.get(&request.url) {
                Some((status, body)) => Ok(FetchedResponse {
                    status: *status,
                    content_type: Some("text/html".into()),
                    body: body.as_bytes().to_vec(),
                }),
                None => anyhow::bail!("simulated connection refused"),
            }
        }
    }

    fn router(origin: FakeOrigin) -> (CacheRouter<MemoryStore>, &'static FakeOrigin) {
        // Leak the origin so tests can keep poking it after the router
        // takes ownership of the boxed trait object.
        let origin: &'static FakeOrigin = Box::leak(Box::new(origin));
        let router = CacheRouter::new(
            MemoryStore::new(),
            Box::new(OriginRef(origin)),
            RouteTable::todobox_defaults(),
            STATIC_NS,
            DYNAMIC_NS,
        );
        (router, origin)
    }

    struct OriginRef(&'static FakeOrigin);

    #[async_trait]
    impl Origin for OriginRef {
        async fn fetch(&self, request: &Request) -> anyhow::Result<FetchedResponse> {
            self.0.fetch(request).await
        }
    }

    fn entry(body: &str) -> CachedResponse {
        CachedResponse::new(200, Some("text/html".into()), body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_excluded_route_never_served_from_static() {
        let (router, origin) = router(FakeOrigin::new(&[("/dashboard", 200, "fresh")]));
        // A stale static entry exists for the excluded route.
        router
            .store()
            .put(STATIC_NS, "GET /dashboard", &entry("stale"))
            .unwrap();

        let routed = router.handle(&Request::get("/dashboard")).await.unwrap();
        assert_eq!(routed.served_from, ServedFrom::Network);
        assert_eq!(routed.response.text(), "fresh");

        // Offline with no dynamic entry: the static copy still must not
        // be served; the failure propagates.
        origin.set_offline(true);
        let err = router.handle(&Request::get("/dashboard")).await;
        assert!(matches!(err, Err(FetchError::Unreachable { .. })));

        // Bypass never populated the dynamic namespace either.
        assert_eq!(router.store().entry_count(DYNAMIC_NS), 0);
    }

    #[tokio::test]
    async fn test_excluded_route_falls_back_to_dynamic_entry() {
        let (router, origin) = router(FakeOrigin::new(&[]));
        router
            .store()
            .put(DYNAMIC_NS, "GET /dashboard", &entry("last known"))
            .unwrap();

        origin.set_offline(true);
        let routed = router.handle(&Request::get("/dashboard")).await.unwrap();
        assert_eq!(routed.served_from, ServedFrom::DynamicCache);
        assert_eq!(routed.response.text(), "last known");
    }

    #[tokio::test]
    async fn test_static_asset_served_from_cache_without_network() {
        let manifest = vec!["/static/manifest.json".to_string()];
        let (router, origin) = router(FakeOrigin::new(&[(
            "/static/manifest.json",
            200,
            "{\"name\":\"TodoBox\"}",
        )]));

        router.install(&manifest).await.unwrap();
        let after_install = origin.calls();

        let routed = router
            .handle(&Request::get("/static/manifest.json"))
            .await
            .unwrap();
        assert_eq!(routed.served_from, ServedFrom::StaticCache);
        assert_eq!(origin.calls(), after_install, "cache hit must not fetch");
    }

    #[tokio::test]
    async fn test_static_miss_fetches_but_does_not_persist() {
        let (router, origin) = router(FakeOrigin::new(&[("/static/app.css", 200, "body{}")]));

        let routed = router.handle(&Request::get("/static/app.css")).await.unwrap();
        assert_eq!(routed.served_from, ServedFrom::Network);
        assert_eq!(origin.calls(), 1);
        assert_eq!(router.store().entry_count(STATIC_NS), 0);

        // Still a miss next time: fetched again.
        router.handle(&Request::get("/static/app.css")).await.unwrap();
        assert_eq!(origin.calls(), 2);
    }

    #[tokio::test]
    async fn test_dynamic_200_served_again_when_offline() {
        let (router, origin) = router(FakeOrigin::new(&[("/undone?tab=kiv", 200, "kiv list")]));

        let live = router.handle(&Request::get("/undone?tab=kiv")).await.unwrap();
        assert_eq!(live.served_from, ServedFrom::Network);

        origin.set_offline(true);
        let cached = router.handle(&Request::get("/undone?tab=kiv")).await.unwrap();
        assert_eq!(cached.served_from, ServedFrom::DynamicCache);
        assert_eq!(cached.response.text(), "kiv list");
    }

    #[tokio::test]
    async fn test_non_200_not_written_to_any_namespace() {
        let (router, _origin) = router(FakeOrigin::new(&[
            ("/missing", 404, "not found"),
            ("/today/list", 302, "redirect"),
        ]));

        let routed = router.handle(&Request::get("/missing")).await.unwrap();
        assert_eq!(routed.response.status, 404);
        router.handle(&Request::get("/today/list")).await.unwrap();

        assert_eq!(router.store().entry_count(DYNAMIC_NS), 0);
        assert_eq!(router.store().entry_count(STATIC_NS), 0);
    }

    #[tokio::test]
    async fn test_activate_prunes_only_stale_namespaces() {
        let (router, _origin) = router(FakeOrigin::new(&[]));
        let seed = entry("x");
        router.store().put("todobox-v1", "GET /", &seed).unwrap();
        router.store().put(STATIC_NS, "GET /", &seed).unwrap();
        router.store().put(DYNAMIC_NS, "GET /", &seed).unwrap();

        let deleted = router.activate().unwrap();
        assert_eq!(deleted, vec!["todobox-v1".to_string()]);

        let mut remaining = router.store().namespaces().unwrap();
        remaining.sort();
        assert_eq!(remaining, vec![STATIC_NS, DYNAMIC_NS]);
    }

    #[tokio::test]
    async fn test_post_passes_through_untouched() {
        let (router, origin) = router(FakeOrigin::new(&[("/add", 200, "ok")]));

        let routed = router
            .handle(&Request::new(Method::Post, "/add"))
            .await
            .unwrap();
        assert_eq!(routed.served_from, ServedFrom::Network);
        assert_eq!(origin.calls(), 1);
        assert_eq!(router.store().entry_count(STATIC_NS), 0);
        assert_eq!(router.store().entry_count(DYNAMIC_NS), 0);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let manifest = vec![
            "/".to_string(),
            "/static/manifest.json".to_string(),
            "/static/assets/icons/icon-192x192.png".to_string(),
        ];
        // The icon is not scripted, so its fetch fails.
        let (router, _origin) = router(FakeOrigin::new(&[
            ("/", 200, "shell"),
            ("/static/manifest.json", 200, "{}"),
        ]));

        let err = router.install(&manifest).await;
        assert!(matches!(err, Err(FetchError::Install { .. })));
        assert_eq!(router.store().entry_count(STATIC_NS), 0, "no partial precache");
    }

    #[tokio::test]
    async fn test_install_rejects_error_status() {
        let manifest = vec!["/".to_string(), "/dashboard".to_string()];
        let (router, _origin) = router(FakeOrigin::new(&[
            ("/", 200, "shell"),
            ("/dashboard", 500, "boom"),
        ]));

        let err = router.install(&manifest).await;
        assert!(matches!(err, Err(FetchError::Install { .. })));
        assert_eq!(router.store().entry_count(STATIC_NS), 0);
    }

    #[tokio::test]
    async fn test_install_then_activate_rollover() {
        let manifest = vec!["/".to_string(), "/static/manifest.json".to_string()];
        let (router, _origin) = router(FakeOrigin::new(&[
            ("/", 200, "shell"),
            ("/static/manifest.json", 200, "{}"),
        ]));
        // Leftover namespaces from a previous deploy.
        router
            .store()
            .put("todobox-v1", "GET /", &entry("old"))
            .unwrap();
        router
            .store()
            .put("todobox-static-v1", "GET /", &entry("old"))
            .unwrap();

        let count = router.install(&manifest).await.unwrap();
        assert_eq!(count, 2);
        let mut deleted = router.activate().unwrap();
        deleted.sort();
        assert_eq!(deleted, vec!["todobox-static-v1", "todobox-v1"]);

        let routed = router
            .handle(&Request::get("/static/manifest.json"))
            .await
            .unwrap();
        assert_eq!(routed.served_from, ServedFrom::StaticCache);
        assert_eq!(routed.response.text(), "{}");
    }
}
