use std::sync::Arc;

use business_onboarding::business::OnboardingPage;
use business_onboarding::cli::{Cli, SessionEnd};
use business_onboarding::config::AppConfig;
use business_onboarding::error;
use business_onboarding::routes::{BusinessRouteState, business_routes};
use business_onboarding::store::{BusinessStore, LibSqlStore};
use business_onboarding::wizard::FormData;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "serve".to_string());
    let config = AppConfig::from_env()?;

    eprintln!("Business Onboarding v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());

    // ── Database ─────────────────────────────────────────────────────────
    let (store, owner_id) = open_store(&config).await?;

    match mode.as_str() {
        "serve" => {
            let app = business_routes(BusinessRouteState { store });
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
            eprintln!("   REST API: http://0.0.0.0:{}/api/businesses", config.port);
            tracing::info!(port = config.port, "Onboarding API server started");
            axum::serve(listener, app).await?;
        }
        "wizard" => {
            let page = OnboardingPage::mount(store, Some(owner_id), FormData::new()).await?;
            eprintln!("   Commands: :back, :jump <n>, :quit\n");
            let mut cli = Cli::new(&page, BufReader::new(tokio::io::stdin()), tokio::io::stdout());
            match cli.run().await? {
                SessionEnd::Completed => tracing::info!("Onboarding session completed"),
                SessionEnd::Quit => eprintln!("Bye."),
            }
        }
        other => {
            eprintln!("Unknown mode: {other}");
            eprintln!("  usage: business-onboarding [serve|wizard]");
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Open the database and make sure at least one owner exists.
async fn open_store(config: &AppConfig) -> error::Result<(Arc<dyn BusinessStore>, String)> {
    let store: Arc<dyn BusinessStore> = Arc::new(LibSqlStore::new_local(&config.db_path).await?);

    let owner_id = match store.first_owner_id().await? {
        Some(id) => id,
        None => {
            let owner = store
                .create_owner(&config.owner_name, config.owner_email.as_deref())
                .await?;
            eprintln!("   Seeded owner: {}", owner.name);
            owner.id
        }
    };
    Ok((store, owner_id))
}
