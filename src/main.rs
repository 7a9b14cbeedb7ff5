use tom_notifier_bell::application::{self, ApplicationEnv};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    {
        // Ignore error because .env file is not required
        // as long as env variables are set.
        let _ = dotenvy::dotenv();
    }

    let env = ApplicationEnv::parse()?;

    application::setup_tracing(&env)?;

    tracing::info!("creating state");
    let state = application::create_state(&env)?;

    tracing::info!("starting");
    application::run(state).await?;

    tracing::info!("closed");

    Ok(())
}
