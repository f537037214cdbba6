//! Route handlers.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, RawQuery, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use url::form_urlencoded;

use crate::config::{HEADER_CONSENT_ROLES, NONCE_PARAM};
use crate::error_handling::ClassificationError;
use crate::gate::{LookupResponse, RenderDecisionBody};
use crate::request::{DeliveryMode, RequestContext, VisitorRoles};

use super::types::{AppState, DiagnosticsResponse, ErrorResponse};

/// Builds the engine's view of an HTTP request.
///
/// Query parameters are read first; form parameters from a POST body
/// override them.
fn request_context(
    delivery: DeliveryMode,
    addr: SocketAddr,
    headers: &HeaderMap,
    query: Option<&str>,
    form: Option<&[u8]>,
) -> RequestContext {
    let mut ctx = RequestContext::new(delivery).with_remote_addr(addr.ip().to_string());
    for (name, value) in headers {
        match value.to_str() {
            Ok(value) => ctx = ctx.with_header(name.as_str(), value),
            Err(_) => log::debug!("Skipping non-ASCII header {}", name),
        }
    }
    if let Some(roles) = ctx.header(HEADER_CONSENT_ROLES).map(VisitorRoles::parse) {
        ctx.roles = roles;
    }

    let params = query
        .map(str::as_bytes)
        .into_iter()
        .chain(form)
        .flat_map(form_urlencoded::parse);
    for (name, value) in params {
        ctx.set_query_param(name, value);
    }
    ctx
}

/// Wraps a JSON body and attaches the cookies queued by the engine.
fn respond<T: serde::Serialize>(status: StatusCode, body: T, ctx: &RequestContext) -> Response {
    let mut response = (status, Json(body)).into_response();
    for cookie in ctx.response_cookies() {
        match HeaderValue::from_str(&cookie.header_value()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => log::warn!("Dropping unencodable cookie {}: {}", cookie.name, e),
        }
    }
    response
}

fn classification_failure(e: ClassificationError) -> Response {
    log::error!("Jurisdiction configuration error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            success: false,
            message: e.to_string(),
        }),
    )
        .into_response()
}

/// Client-initiated location lookup (`GET|POST /geolocation-lookup`)
pub async fn lookup_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let form = (method == Method::POST).then_some(body.as_ref());
    let mut ctx = request_context(
        DeliveryMode::Asynchronous,
        addr,
        &headers,
        query.as_deref(),
        form,
    );

    let nonce = match ctx.query_param(NONCE_PARAM) {
        Some(nonce) => nonce,
        None => {
            return respond(
                StatusCode::BAD_REQUEST,
                LookupResponse::error("Invalid Request"),
                &ctx,
            )
        }
    };
    if !state.nonce.verify(nonce) {
        return respond(
            StatusCode::FORBIDDEN,
            LookupResponse::error("Unauthorized"),
            &ctx,
        );
    }

    match state.gate.lookup_data(&mut ctx).await {
        Ok(data) => respond(StatusCode::OK, LookupResponse::ok(data), &ctx),
        Err(e) => classification_failure(e),
    }
}

/// Render-time decision for the host (`GET /render-decision`)
pub async fn render_decision_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let mut ctx = request_context(
        DeliveryMode::Synchronous,
        addr,
        &headers,
        query.as_deref(),
        None,
    );

    match state.gate.render_decision(&mut ctx).await {
        Ok(decision) => {
            let policy = state.gate.policy();
            let body = RenderDecisionBody::new(
                decision,
                policy.hide_privacy_settings_link,
                ctx.debug_messages().to_vec(),
            );
            respond(StatusCode::OK, body, &ctx)
        }
        Err(e) => classification_failure(e),
    }
}

/// Database state and the requester's location (`GET /diagnostics`)
pub async fn diagnostics_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let policy = state.gate.policy();
    let mut ctx = request_context(
        policy.delivery_mode(),
        addr,
        &headers,
        query.as_deref(),
        None,
    );
    let location = state.gate.location_display_name(&mut ctx).await;

    let body = DiagnosticsResponse {
        database: state.gate.locations().database().state(),
        geolocation_enabled: policy.geolocation_enabled,
        async_mode: policy.async_mode(),
        location_debug: policy.location_debug,
        location,
    };
    respond(StatusCode::OK, body, &ctx)
}
