use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use crate::auth::PeerAddr;
use crate::errors::ApiError;
use crate::state::AppState;

/// Query string of a dyndns2 update
#[derive(Debug, Default, Deserialize)]
pub struct UpdateParams {
    pub hostname: Option<String>,
    pub myip: Option<String>,
}

/// `GET /nic/update?hostname=<name>&myip=<list>`
///
/// An absent parameter is treated like an empty one.
pub async fn nic_update(
    State(state): State<AppState>,
    Extension(peer): Extension<PeerAddr>,
    Query(params): Query<UpdateParams>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let hostname = params.hostname.unwrap_or_default();
    let myip = params.myip.unwrap_or_default();

    info!(
        "Received update request: hostname={}, myip={}, from {}",
        hostname, myip, peer
    );

    state.service.update(&hostname, &myip).await?;

    Ok((StatusCode::OK, "Record(s) updated"))
}
