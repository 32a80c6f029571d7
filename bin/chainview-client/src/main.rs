//! Chainview client
//!
//! Follows the most recent epochs of a chain through its GraphQL query
//! service and logs every refresh.

mod args;
mod errors;
mod helpers;

use std::{sync::Arc, time::Duration};

use chainview_common::logging;
use chainview_config::Config;
use chainview_epochs::EpochStore;
use chainview_primitives::prelude::*;
use chainview_query::GraphQlClient;
use chainview_status::{
    worker::{latest_blocks_worker, network_info_worker},
    StatusChannel,
};
use tokio::runtime::Handle;
use tracing::*;

use crate::{args::Args, helpers::get_config};

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    if let Err(e) = main_inner(args) {
        eprintln!("FATAL ERROR: {e}");

        return Err(e);
    }

    Ok(())
}

fn main_inner(args: Args) -> anyhow::Result<()> {
    // Start runtime for async IO tasks.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("chainview-rt")
        .build()
        .expect("init: build rt");
    let handle = runtime.handle();

    // Init the logging before we do anything else.
    init_logging(handle);

    let config = get_config(&args)?;

    let client = Arc::new(GraphQlClient::new(
        config.client.graphql_url.clone(),
        Duration::from_millis(config.client.request_timeout_ms),
    )?);
    info!(url = %client.url(), "using query service");

    let status = StatusChannel::new(initial_network_info(&config));

    handle.spawn(network_info_worker(
        client.clone(),
        status.clone(),
        Duration::from_millis(config.status.network_info_poll_ms),
    ));
    handle.spawn(latest_blocks_worker(
        client.clone(),
        status.clone(),
        config.status.latest_blocks_limit,
        Duration::from_millis(config.status.latest_blocks_poll_ms),
    ));

    let store = EpochStore::new(client, status);
    let res = runtime.block_on(run(store, args.browse_page, config.epochs.per_page));

    {
        let _g = handle.enter();
        logging::finalize();
    }

    res
}

/// Network info used until the first poll lands.
fn initial_network_info(config: &Config) -> NetworkInfo {
    NetworkInfo {
        slots_per_epoch: config.network.slots_per_epoch,
        slot_duration_ms: config.network.slot_duration_ms,
        ..Default::default()
    }
}

async fn run(
    store: EpochStore<GraphQlClient>,
    browse_page: Option<u64>,
    per_page: u64,
) -> anyhow::Result<()> {
    store.start_polling_latest_epochs();

    if let Some(page) = browse_page {
        if store.browse_epochs(page, per_page).await {
            log_overviews("browsed", &store.browsed_epochs());
        } else {
            warn!(%page, %per_page, "could not browse epochs");
        }
    }

    if store.is_loading_latest_epochs_first_time() {
        info!("waiting for the latest epochs");
    }

    let mut updates = store.subscribe_latest_epochs();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            res = updates.changed() => {
                if res.is_err() {
                    break;
                }
                log_overviews("latest", &store.latest_epochs());
            }
            res = &mut ctrl_c => {
                res?;
                info!("got interrupt, shutting down");
                break;
            }
        }
    }

    store.stop_polling_latest_epochs();
    Ok(())
}

fn log_overviews(set: &str, epochs: &[EpochOverview]) {
    for epoch in epochs {
        info!(
            %set,
            number = %epoch.number,
            started_at = %epoch.started_at,
            last_block_at = %epoch.last_block_at,
            blocks = %epoch.blocks_count,
            txs = %epoch.transactions_count,
            output = %epoch.output,
            slots = %epoch.slots_count,
            progress = %format!("{:.2}%", epoch.percentage),
            "epoch"
        );
    }
}

/// Sets up the logging system given a handle to a runtime context to possibly
/// start the OTLP output on.
fn init_logging(rt: &Handle) {
    let mut lconfig = logging::LoggerConfig::with_base_name("chainview-client");

    // Set the OpenTelemetry URL if set.
    let otlp_url = logging::get_otlp_url_from_env();
    if let Some(url) = &otlp_url {
        lconfig.set_otlp_url(url.clone());
    }

    {
        // The OTLP exporter needs a runtime context to start in.
        let _g = rt.enter();
        logging::init(lconfig);
    }

    // Have to log this after we start the logging formally.
    if let Some(url) = &otlp_url {
        info!(%url, "using OpenTelemetry tracing output");
    }
}
