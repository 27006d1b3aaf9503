use dropsend_core::Config;

// mimalloc as the global allocator, as in the container images this runs in.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = dropsend_api::setup::initialize_app(config.clone()).await?;

    dropsend_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
