//! Per-request correlation context.

use std::time::Instant;

/// Correlation data threaded explicitly through the dispatch call chain.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    started_at: Instant,
}

impl RequestContext {
    #[must_use]
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            started_at: Instant::now(),
        }
    }

    /// Use the caller's correlation id, or generate one if absent or blank.
    #[must_use]
    pub fn from_header(request_id: Option<&str>) -> Self {
        match request_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Self::new(id),
            None => Self::generate(),
        }
    }

    /// Fresh context with a random id (UUIDv4, 32 hex chars, no dashes).
    #[must_use]
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Whole milliseconds since the request arrived.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_simple_uuid() {
        let ctx = RequestContext::generate();
        assert_eq!(ctx.request_id().len(), 32);
        assert!(ctx.request_id().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_from_header() {
        assert_eq!(RequestContext::from_header(Some("abc-123")).request_id(), "abc-123");
        assert_eq!(RequestContext::from_header(Some("   ")).request_id().len(), 32);
        assert_eq!(RequestContext::from_header(None).request_id().len(), 32);
    }
}
