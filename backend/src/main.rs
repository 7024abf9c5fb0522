use anyhow::anyhow;
use video_harvest::build_rocket;
use video_harvest::config::{create_app_state, init_logger, load_environment, AppConfig};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    load_environment();
    init_logger();

    let config = AppConfig::from_env()?;
    let state = create_app_state(&config)?;

    build_rocket(state)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed to launch: {e}"))?;
    Ok(())
}
