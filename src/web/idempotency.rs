use crate::utils::error::F1BetError;
use crate::web::error::ApiError;
use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

const MAX_CACHED_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    expires_at: Instant,
}

impl CachedResponse {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    fn replay(&self) -> Response {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
    }
}

/// `Idempotency-Key` value plus the exact request body.
type CacheKey = (String, Bytes);

/// Successful responses keyed by `Idempotency-Key` and request body, kept for a fixed TTL.
#[derive(Debug, Clone)]
pub struct IdempotencyCache {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<CacheKey, CachedResponse>>>,
}

impl IdempotencyCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CachedResponse>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        let now = Instant::now();
        let mut entries = self.lock();
        // 順便清掉過期項目
        entries.retain(|_, cached| !cached.is_expired(now));
        entries.get(key).cloned()
    }

    fn put(&self, key: CacheKey, status: StatusCode, headers: HeaderMap, body: Bytes) {
        let cached = CachedResponse {
            status,
            headers,
            body,
            expires_at: Instant::now() + self.ttl,
        };
        self.lock().insert(key, cached);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Replays the cached response for a repeated key and body; only 2xx responses are stored.
/// The same key with another body reaches the service.
pub async fn replay_idempotent(
    State(cache): State<IdempotencyCache>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .headers()
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let Some(key) = key else {
        return next.run(request).await;
    };

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_CACHED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return ApiError(F1BetError::invalid_argument(format!(
                "Unreadable request body: {}",
                err
            )))
            .into_response();
        }
    };
    let cache_key = (key, body.clone());

    if let Some(cached) = cache.get(&cache_key) {
        tracing::debug!("Replaying cached response for idempotency key {}", cache_key.0);
        return cached.replay();
    }

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;
    if !response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    match to_bytes(body, MAX_CACHED_BODY_BYTES).await {
        Ok(bytes) => {
            cache.put(cache_key, parts.status, parts.headers.clone(), bytes.clone());
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            tracing::error!(
                "Failed to buffer response for idempotency key {}: {}",
                cache_key.0,
                err
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, body: &'static [u8]) -> CacheKey {
        (name.to_string(), Bytes::from_static(body))
    }

    #[test]
    fn test_entries_expire() {
        let cache = IdempotencyCache::new(Duration::from_millis(0));
        cache.put(
            key("k", b"{}"),
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from_static(b"{}"),
        );

        assert!(cache.get(&key("k", b"{}")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entry_is_replayed() {
        let cache = IdempotencyCache::new(Duration::from_secs(60));
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        cache.put(
            key("k", b"{\"userId\":\"a\"}"),
            StatusCode::CREATED,
            headers,
            Bytes::from_static(b"{\"ok\":true}"),
        );

        assert!(cache.get(&key("k", b"{\"userId\":\"b\"}")).is_none());

        let replayed = cache.get(&key("k", b"{\"userId\":\"a\"}")).unwrap().replay();
        assert_eq!(replayed.status(), StatusCode::CREATED);
        assert_eq!(replayed.headers()["content-type"], "application/json");
        assert_eq!(cache.len(), 1);
    }
}
