/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod config;
mod consoles;
mod http;

use crate::config::ServerConfig;
use clap::Parser;
use console_streamer::ConsoleStreamer;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const COMPONENT: &str = "server";

#[derive(Debug, Parser)]
#[command(name = "console-streamer-server")]
#[command(about = "Serves console snapshots and push streams over HTTP")]
struct Args {
    /// json5 configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides `console_streamer.update_interval_ms`
    #[arg(long, value_name = "MS")]
    update_interval_ms: Option<u64>,

    /// Overrides `http.bind_address`
    #[arg(long, value_name = "ADDR")]
    bind_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    consoles::mark_process_start();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .with_overrides(args.update_interval_ms, args.bind_address);

    info!(
        event = "server_config_loaded",
        component = COMPONENT,
        config_file = ?args.config,
        update_interval_ms = config.console_streamer.update_interval_ms,
        message_queue_size = config.console_streamer.message_queue_size,
        bind_address = config.http.bind_address.as_str(),
        "configuration loaded"
    );

    let streamer = Arc::new(ConsoleStreamer::new(
        "console-streamer-server",
        config.console_streamer.clone(),
        Arc::new(consoles::builtin_providers()),
    ));

    let listener = TcpListener::bind(config.http.bind_address.as_str()).await?;
    info!(
        event = "server_listening",
        component = COMPONENT,
        streamer = streamer.name(),
        local_addr = %listener.local_addr()?,
        "listening"
    );

    axum::serve(listener, http::router(streamer.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let deactivated = streamer.shutdown();
    info!(
        event = "server_stopped",
        component = COMPONENT,
        deactivated,
        "server stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(
            event = "server_signal_failed",
            component = COMPONENT,
            err = %err,
            "unable to listen for ctrl-c; shutting down"
        );
    }
}
