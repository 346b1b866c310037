use std::fs::File;

use dotenvy::dotenv;
use log::*;
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};

use catalog_stager::catalog::Catalog;
use catalog_stager::config::Config;
use catalog_stager::error::Result;
use catalog_stager::guidebox::{GuideboxClient, HttpTransport, ResponseCache};
use catalog_stager::stage::Stager;

fn init_logging(config: &Config) -> Result<()> {
    CombinedLogger::init(vec![
        TermLogger::new(
            config.log_level,
            simplelog::Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Debug,
            simplelog::Config::default(),
            File::create(&config.log_file)?,
        ),
    ])?;
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = Config::from_env()?;
    init_logging(&config)?;
    info!("Staging {} catalog at {}", config.environment, config.database_url);

    let mut catalog = Catalog::connect(&config.database_url)?;

    let settings = &config.guidebox;
    let client = GuideboxClient::new(
        HttpTransport::new(settings)?,
        ResponseCache::new(&settings.cache_dir),
        &settings.base_url,
        settings.retry,
    );

    let report = Stager::new(&client, &mut catalog, config.stage.clone())
        .run()
        .await?;
    info!("Staging finished: {}", report);
    debug!("{}", serde_json::to_string(&report)?);

    Ok(())
}
