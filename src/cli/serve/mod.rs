//! `sheaf serve`: the HTTP front door for bundles.
//!
//! Requests are mapped from absolute URLs back to `~/` virtual paths and
//! answered from the collection's cache. Handling runs on a small rayon
//! pool so one slow build never blocks other requests.

mod lifecycle;
mod response;

pub use lifecycle::{is_shutdown, setup_shutdown_handler};
pub use response::{Reply, bundle_reply};

use crate::{collection::BundleCollection, config::SheafConfig, debug, log};
use anyhow::{Context, Result};
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Worker threads handling requests.
const REQUEST_THREADS: usize = 4;

/// Bind, then serve until Ctrl+C.
pub fn serve(config: &SheafConfig, collection: BundleCollection) -> Result<()> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_server(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    for bundle in collection.registered_bundles() {
        debug!("serve"; "{} ({})", bundle.path(), bundle.type_name());
    }

    run_request_loop(&server, Arc::new(collection))
}

fn run_request_loop(server: &Server, collection: Arc<BundleCollection>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        let collection = Arc::clone(&collection);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &collection) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, collection: &BundleCollection) -> Result<()> {
    if is_shutdown() {
        return response::send(request, Reply::unavailable());
    }

    let reply = bundle_reply(collection, request.url());
    debug!("serve"; "{} {} -> {}", request.method(), request.url(), reply.status);
    response::send(request, reply)
}
