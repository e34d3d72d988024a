use crate::coordinate::{Coordinate, RayPoints};
use crate::service::{GeoService, LocationError};
use crate::trace::TraceError;

use smallvec::smallvec;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Full-route state of one connection. Terminal states are never left:
/// a route is computed at most once per connection and never invalidated.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteState {
    Pending,
    Ready(Arc<[Coordinate]>),
    Failed,
}

#[derive(Error, Debug)]
enum RouteError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// Geolocation data derived for one connection: the remote coordinate, the
/// two-point ray, and the traced multi-hop route. A connection's remote
/// address is immutable for its lifetime, so both derived fields are
/// computed at most once.
pub struct ConnectionGeo {
    service: Arc<GeoService>,
    remote: IpAddr,
    remote_coordinate: OnceLock<Option<Coordinate>>,
    route_started: AtomicBool,
    route_tx: Arc<watch::Sender<RouteState>>,
    route_task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionGeo {
    pub fn new(service: Arc<GeoService>, remote: IpAddr) -> Self {
        let (route_tx, _route_rx) = watch::channel(RouteState::Pending);
        Self {
            service,
            remote: remote.to_canonical(),
            remote_coordinate: OnceLock::new(),
            route_started: AtomicBool::new(false),
            route_tx: Arc::new(route_tx),
            route_task: Mutex::new(None),
        }
    }

    pub fn remote(&self) -> IpAddr {
        self.remote
    }

    /// `None` when the remote address has no geolocation (missing database,
    /// no matching range, or the unknown sentinel).
    pub fn remote_coordinate(&self) -> Option<Coordinate> {
        *self.remote_coordinate.get_or_init(|| {
            self.service
                .lookup(self.remote)
                .ok()
                .filter(|point| !point.is_unknown())
        })
    }

    /// Straight line from this machine to the remote endpoint. Synchronous:
    /// returns `None` until the current location has been cached by a
    /// `GeoService::current_location` call.
    pub fn ray(&self) -> Option<RayPoints> {
        let origin = self.service.cached_location()?;
        let remote = self.remote_coordinate()?;
        Some(smallvec![origin, remote])
    }

    /// Current route state; the first access starts the background
    /// computation. Single-flight: concurrent or repeated accesses while
    /// the result is pending never start a second computation.
    pub fn full_route(&self) -> RouteState {
        if !self.route_started.swap(true, Ordering::AcqRel) {
            let task = self.spawn_route_computation();
            *self.route_task.lock().unwrap() = Some(task);
        }
        self.route_tx.borrow().clone()
    }

    /// Observe route completion. The `Pending -> Ready | Failed` edge is
    /// published exactly once.
    pub fn watch_route(&self) -> watch::Receiver<RouteState> {
        self.route_tx.subscribe()
    }

    fn spawn_route_computation(&self) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        let route_tx = Arc::clone(&self.route_tx);
        let remote = self.remote;
        tokio::spawn(async move {
            let state = match assemble_route(&service, remote).await {
                Ok(points) => RouteState::Ready(points.into()),
                Err(error) => {
                    log::warn!("route computation for {remote} failed: {error}");
                    RouteState::Failed
                }
            };
            route_tx.send_replace(state);
        })
    }
}

impl Drop for ConnectionGeo {
    fn drop(&mut self) {
        if let Some(task) = self.route_task.get_mut().unwrap().take() {
            task.abort();
        }
    }
}

async fn assemble_route(
    service: &GeoService,
    remote: IpAddr,
) -> Result<Vec<Coordinate>, RouteError> {
    let origin = service.current_location().await?;
    let hops = service.tracer().trace(remote).await?;
    let mut points = Vec::with_capacity(hops.len() + 1);
    points.push(origin);
    points.extend(
        hops.into_iter()
            .filter_map(|hop| service.lookup(hop).ok())
            .filter(|point| !point.is_unknown()),
    );
    Ok(points)
}
