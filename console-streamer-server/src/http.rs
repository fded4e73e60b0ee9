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

//! HTTP management surface over a [`ConsoleStreamer`].

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use console_streamer::{ConsoleStreamer, ConsoleStreamerError, OptionSet};
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::task::{self, JoinError};
use tracing::{debug, error};

const COMPONENT: &str = "http";
const EVENT_REQUEST_FAILED: &str = "http_request_failed";
const EVENT_STREAM_OPEN: &str = "http_stream_open";

pub type AppState = Arc<ConsoleStreamer>;

pub fn router(streamer: AppState) -> Router {
    Router::new()
        .route("/consoles", get(list_consoles))
        .route("/consoles/{id}", get(get_snapshot).delete(deactivate))
        .route("/consoles/{id}/peek", get(peek_snapshot))
        .route("/consoles/{id}/stream", get(stream_console))
        .route("/consoles/{id}/options", put(update_options))
        .with_state(streamer)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
}

#[derive(Debug)]
pub enum AppError {
    Streamer(ConsoleStreamerError),
    Internal(String),
}

impl From<ConsoleStreamerError> for AppError {
    fn from(err: ConsoleStreamerError) -> Self {
        AppError::Streamer(err)
    }
}

impl From<JoinError> for AppError {
    fn from(err: JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Streamer(err) => write!(f, "{err}"),
            AppError::Internal(message) => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match &self {
            AppError::Streamer(ConsoleStreamerError::Scheduler { .. }) => "SCHEDULER_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        };
        error!(
            event = EVENT_REQUEST_FAILED,
            component = COMPONENT,
            code,
            err = %self,
            "request failed"
        );
        let body = ErrorResponse {
            code: code.to_string(),
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Query-string values are passed to providers as JSON strings.
fn query_options(query: HashMap<String, String>) -> OptionSet {
    query
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

fn json_text(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

// Registry calls take shard locks and provider calls block, so every handler
// runs them off the async workers.
async fn list_consoles(State(streamer): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let keys = task::spawn_blocking(move || streamer.active_keys()).await?;
    Ok(Json(keys))
}

async fn get_snapshot(
    State(streamer): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let options = query_options(query);
    let snapshot =
        task::spawn_blocking(move || streamer.get_snapshot(&id, options)).await??;
    Ok(json_text(snapshot))
}

async fn peek_snapshot(
    State(streamer): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let options = query_options(query);
    let snapshot = task::spawn_blocking(move || streamer.peek_snapshot(&id, options)).await?;
    Ok(json_text(snapshot))
}

async fn stream_console(
    State(streamer): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let options = query_options(query);
    let key = id.clone();
    let stream = task::spawn_blocking(move || streamer.get_stream(&key, options)).await??;

    debug!(
        event = EVENT_STREAM_OPEN,
        component = COMPONENT,
        key = id.as_str(),
        "server-sent event stream opened"
    );

    let events = stream
        .into_stream()
        .map(|payload| Ok(Event::default().data(payload)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn presence_status(present: bool) -> StatusCode {
    if present {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn update_options(
    State(streamer): State<AppState>,
    Path(id): Path<String>,
    Json(options): Json<OptionSet>,
) -> Result<StatusCode, AppError> {
    let updated = task::spawn_blocking(move || streamer.update_options(&id, options)).await?;
    Ok(presence_status(updated))
}

async fn deactivate(
    State(streamer): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = task::spawn_blocking(move || streamer.deactivate(&id)).await?;
    Ok(presence_status(removed))
}
