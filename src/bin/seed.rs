//! Seed script for development — provisions the admin account and sample incidents.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). `SEED_ADMIN_USERNAME` and
//! `SEED_ADMIN_PASSWORD` override the default credentials.

use chrono::{Duration, DurationRound, Utc};
use odwatch::db::IncidentStore;
use odwatch::errors::AppError;
use odwatch::models::incident::CreateIncident;
use odwatch::models::user::CreateUser;
use sqlx::PgPool;

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "Test123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = odwatch::db::create_pool(&db_url, 5).await?;

    // Run migrations first
    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("=== odwatch Seed Script ===");

    seed_admin_user(&pool).await?;
    seed_sample_incidents(&pool).await?;

    println!("\n=== Seed complete! ===");
    Ok(())
}

async fn seed_admin_user(pool: &PgPool) -> anyhow::Result<()> {
    let username = std::env::var("SEED_ADMIN_USERNAME")
        .unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string());
    let password = std::env::var("SEED_ADMIN_PASSWORD")
        .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());

    odwatch::services::auth::upsert_user(
        pool,
        &CreateUser {
            username: username.clone(),
            password,
        },
    )
    .await?;

    println!("[done] Admin account ready: {username}");
    Ok(())
}

async fn seed_sample_incidents(pool: &PgPool) -> anyhow::Result<()> {
    match pool.earliest().await {
        Ok(_) => {
            println!("[skip] Incidents already present");
            return Ok(());
        }
        Err(AppError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let base = Utc::now().duration_trunc(Duration::hours(1))?;
    let samples = [
        (40, "Central Station", 1, Some(2), false, Some("40.7527, -73.9772")),
        (33, "Riverside Park", 2, Some(3), false, None),
        (21, "Shelter on 5th", 1, Some(1), true, None),
        (12, "Library annex", 1, None, false, Some("40.7532, -73.9822")),
        (5, "Bus terminal", 3, Some(4), false, None),
        (1, "Central Station", 1, Some(1), false, Some("40.7527, -73.9772")),
    ];

    for (days_ago, location, affected, narcan, fatal, coords) in samples {
        let input = CreateIncident {
            occurred_at: base - Duration::days(days_ago),
            location: location.to_string(),
            number_affected: affected,
            narcan_doses_administered: narcan,
            report_text: format!("Sample report at {location}"),
            fatal_incident: fatal,
            coordinates: coords.map(str::to_string),
        };
        odwatch::services::incident::create(pool, &input).await?;
    }

    println!("[done] Inserted {} sample incidents", samples.len());
    Ok(())
}
