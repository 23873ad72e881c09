use std::sync::Arc;

use tokio::sync::watch;

use envmon_core::cycle::CycleOutput;
use envmon_core::thresholds::ThresholdBands;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Latest cycle output, `None` until the first refresh completes.
pub type LatestOutput = watch::Receiver<Option<Arc<CycleOutput>>>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable. Handlers only ever read: the refresher task is the
/// single writer of the cycle state behind `latest`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    pub latest: LatestOutput,
    /// Bands the refresher evaluates against.
    pub bands: Arc<ThresholdBands>,
}

impl AppState {
    /// Snapshot of the newest cycle output, if any.
    pub fn current(&self) -> Option<Arc<CycleOutput>> {
        self.latest.borrow().clone()
    }
}
