use crate::error::HarvestError;
use crate::models::{ErrorResponse, HarvestReport, VideoRequest};
use crate::services::harvest_service;
use crate::AppState;
use log::{error, info};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};

#[get("/health")]
pub fn health() -> &'static str {
    "ok"
}

#[post("/get_videos", format = "json", data = "<request>")]
pub async fn get_videos(
    state: &State<AppState>,
    request: Json<VideoRequest>,
) -> Result<Json<HarvestReport>, ErrorResponse> {
    let request = request.into_inner();
    info!(
        "Harvest request: '{}' ({} videos)",
        request.search_query, request.no_of_results
    );

    match harvest_service::harvest_videos(
        &state.harvester,
        &state.sink,
        &request.search_query,
        request.no_of_results,
    )
    .await
    {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            error!("Harvest request failed: {e}");
            let (status, kind) = match &e {
                HarvestError::InvalidCount(_) => (Status::BadRequest, "Invalid request"),
                HarvestError::Search(_) => (Status::BadGateway, "Search failed"),
            };
            Err(ErrorResponse::new(status, kind, e.to_string()))
        }
    }
}
