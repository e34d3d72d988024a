use async_trait::async_trait;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("route tracing failed: {0}")]
pub struct TraceError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl TraceError {
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self(source.into())
    }
}

/// Network-layer route tracing, consumed as a black box: an ordered list of
/// intermediate addresses towards a destination, possibly empty. The call may
/// be slow and must be awaited off any latency-critical path. Implementations
/// are OS-specific and owned by the host.
#[async_trait]
pub trait RouteTracer: Send + Sync {
    async fn trace(&self, destination: IpAddr) -> Result<Vec<IpAddr>, TraceError>;
}
