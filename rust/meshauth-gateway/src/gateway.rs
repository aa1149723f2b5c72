use std::{fmt::Display, sync::Arc};

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use meshauth_core::resolver::PeerResolver;
use meshauth_core::tracing::initialize_tracing;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use url::Url;

use crate::handlers::identify_route;

/// The REST routes served by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayRoute {
    Identify,
}

impl GatewayRoute {
    pub fn api_version(&self) -> &str {
        "v0"
    }

    pub fn to_fragment(&self) -> &str {
        match self {
            GatewayRoute::Identify => "identify",
        }
    }
}

impl Display for GatewayRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/api/{}/{}", self.api_version(), self.to_fragment())
    }
}

/// The gateway's [Router], with `resolver` as the shared state every
/// [crate::PeerAuthority] resolves against
pub fn gateway_router(resolver: Arc<PeerResolver>) -> Router {
    Router::new()
        .route(&GatewayRoute::Identify.to_string(), get(identify_route))
        .with_state(resolver)
}

pub async fn start_gateway(
    listener: TcpListener,
    resolver: PeerResolver,
    cors_origin: Option<Url>,
) -> Result<()> {
    initialize_tracing(None);

    let mut cors = CorsLayer::new();

    if let Some(cors_origin) = cors_origin {
        cors = cors
            .allow_origin(
                cors_origin
                    .origin()
                    .unicode_serialization()
                    .as_str()
                    .parse::<HeaderValue>()?,
            )
            .allow_headers(Any)
            .allow_methods(vec![
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::PUT,
                Method::DELETE,
            ]);
    }

    let app = gateway_router(Arc::new(resolver))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("Peer gateway listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
