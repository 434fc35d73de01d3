use crate::auth::claims::AuthUser;
use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts},
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::TypedHeader;
use headers::UserAgent;
use std::{net::SocketAddr, time::Instant};

/// Access log written once the response is ready: method, path, status,
/// latency, peer IP, user id (0 when anonymous) and user-agent. Server errors
/// log at `warn`. CORS preflight `OPTIONS` requests are not logged.
///
/// Needs the router to be served with `into_make_service_with_connect_info`.
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let user_id = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_or(0, |AuthUser(claims)| claims.sub);
    let user_agent = TypedHeader::<UserAgent>::from_request_parts(&mut parts, &())
        .await
        .map_or_else(|_| "unknown".to_owned(), |TypedHeader(ua)| ua.to_string());
    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();

    let started = Instant::now();
    let response = next.run(Request::from_parts(parts, body)).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::warn!(
            %method,
            %path,
            status,
            elapsed_ms,
            ip = %addr.ip(),
            user = user_id,
            user_agent = %user_agent,
            "request failed"
        );
    } else {
        tracing::info!(
            %method,
            %path,
            status,
            elapsed_ms,
            ip = %addr.ip(),
            user = user_id,
            user_agent = %user_agent,
            "request served"
        );
    }
    response
}
