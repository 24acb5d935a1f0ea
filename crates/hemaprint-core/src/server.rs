//! Download server

use crate::config::ScreeningConfig;
use crate::workflow::ScreeningWorkflow;
use hemaprint_client::PredictionClient;
use hemaprint_session::SessionContext;
use hemaprint_store::{EphemeralStore, StoreError, SweepReport, SystemClock};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

/// Open the configured store on the wall clock
///
/// # Errors
/// Returns error if the storage backend cannot be opened
pub fn open_store(config: &ScreeningConfig) -> Result<EphemeralStore, StoreError> {
    let backend = config.storage.open()?;
    Ok(EphemeralStore::new(backend, Arc::new(SystemClock)))
}

/// Open the session context, running the startup sweep
///
/// # Errors
/// Returns error if the storage backend cannot be opened
pub fn open_session(config: &ScreeningConfig) -> Result<SessionContext, StoreError> {
    let context = SessionContext::open(open_store(config)?, config.session);
    let SweepReport {
        scanned,
        expired,
        corrupt,
    } = context.startup_sweep();
    tracing::info!(
        backend = ?config.storage.backend,
        scanned,
        expired,
        corrupt,
        "session store opened"
    );
    Ok(context)
}

/// Open the session and build a workflow whose share links point at the
/// configured public origin
///
/// # Errors
/// Returns error if the storage backend cannot be opened
pub fn open_workflow<C: PredictionClient>(
    config: &ScreeningConfig,
    client: Arc<C>,
) -> Result<ScreeningWorkflow<C>, StoreError> {
    Ok(ScreeningWorkflow::new(client, open_session(config)?)
        .with_public_url(config.server.public_url.clone()))
}

/// Serve the download route until `shutdown` resolves
///
/// Returns the bound address once the listener is up, along with the
/// server future to drive.
///
/// # Errors
/// Returns error if the address cannot be bound
pub fn bind(
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = ()>), warp::Error> {
    let routes = hemaprint_export::download_route().with(warp::trace::request());
    let (bound, server) = warp::serve(routes).try_bind_with_graceful_shutdown(addr, shutdown)?;
    tracing::info!(addr = %bound, "download server listening");
    Ok((bound, server))
}
