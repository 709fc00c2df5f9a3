use dotenvy::dotenv;
use finagro_ledger::{
    config::{database, seed},
    core::{report, seed as seeding},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the seed catalogue
    let catalogue = seed::load_default_config()
        .inspect_err(|e| error!("Failed to load seed catalogue: {}", e))?;

    // 4. Open the store and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to open database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed categories and fields (no-op when already present)
    seeding::seed_catalogue(&db, &catalogue)
        .await
        .inspect(|_| info!("Seed catalogue applied."))
        .inspect_err(|e| error!("Failed to seed catalogue: {}", e))?;

    // 6. Report where each ownership group stands
    let ownership = report::generate_ownership_report(&db, &catalogue.owner_groups).await?;
    for group in &ownership.groups {
        info!(
            group = %group.group,
            fields = group.field_count,
            revenue = group.total_revenue,
            expense = group.total_expense,
            balance = group.balance,
            "Ownership balance"
        );
    }

    Ok(())
}
