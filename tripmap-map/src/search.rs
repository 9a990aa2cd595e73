//! Adapts callback-style backend searches to futures.

use log::debug;
use tokio::sync::oneshot;
use tripmap_core::provider::{RouteBackend, RouteRequest, SearchPayload, SearchStatus};

/// Status reported when a backend drops its callback without calling it.
const DROPPED_STATUS: &str = "dropped";

/// Run one search on `backend` and wait for its callback.
///
/// Each call owns its own completion channel, so concurrent searches never
/// see each other's results. Dropping the returned future discards the
/// result when it arrives.
pub async fn search_route(
    backend: &dyn RouteBackend,
    request: RouteRequest,
) -> (SearchStatus, SearchPayload) {
    let (sender, receiver) = oneshot::channel();
    backend.search(
        request,
        Box::new(move |status, payload| {
            if sender.send((status, payload)).is_err() {
                debug!("search result discarded: the caller stopped waiting");
            }
        }),
    );
    receiver.await.unwrap_or_else(|_| {
        (
            SearchStatus::Other(DROPPED_STATUS.to_owned()),
            SearchPayload::Diagnostic("backend dropped the search without completing".to_owned()),
        )
    })
}
