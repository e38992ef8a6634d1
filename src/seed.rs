use sqlx::PgPool;
use tracing::info;

const THERAPEUTIC_AREAS: &[&str] = &[
    "Immunology and Dermatology",
    "Oncology",
    "Neurology",
    "Cardiology",
    "Respiratory",
];

const REGIONS: &[&str] = &[
    "North America",
    "Europe",
    "Asia Pacific",
    "Latin America",
    "Middle East and Africa",
    "Turkey",
];

/// Ensures the canonical lookup names exist. Safe to re-run on every start:
/// missing names are inserted, existing rows (including extras added through
/// the API) are left alone.
pub async fn seed_reference_data(db: &PgPool) -> anyhow::Result<()> {
    for name in THERAPEUTIC_AREAS {
        sqlx::query("INSERT INTO therapeutic_areas (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(db)
            .await?;
    }
    for name in REGIONS {
        sqlx::query("INSERT INTO regions (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(db)
            .await?;
    }
    info!("reference data seeded");
    Ok(())
}
