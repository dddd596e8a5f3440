use anyhow::Context;

use spotmap::{config::ViewerConfig, SpotmapApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::from_env().context("invalid viewer configuration")?;
    let app = SpotmapApp::new(config).context("failed to initialise viewer")?;
    app.run().context("viewer exited with an error")?;
    Ok(())
}
