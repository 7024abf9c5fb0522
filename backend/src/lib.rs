pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::services::harvest_service::Harvester;
use crate::services::storage::CsvSink;
use rocket::{routes, Build, Rocket};

pub struct AppState {
    pub harvester: Harvester,
    pub sink: CsvSink,
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/", routes![api::video::health, api::video::get_videos])
}
