//! Development fixtures: a couple of regions, apps, and keywords to measure.

use sqlx::PgPool;

use crate::DbError;

struct SeedApp {
    name: &'static str,
    package_id: &'static str,
    region: &'static str,
    keywords: &'static [&'static str],
}

const SEED_REGIONS: &[(&str, &str, &str)] = &[
    ("mx", "Mexico", "hl=es-ES&gl=MX"),
    ("us", "United States", "hl=en-US&gl=US"),
];

const SEED_APPS: &[SeedApp] = &[
    SeedApp {
        name: "Lucky Slots",
        package_id: "com.example.luckyslots",
        region: "mx",
        keywords: &["tragamonedas", "casino gratis", "slots"],
    },
    SeedApp {
        name: "Daily Budget",
        package_id: "com.example.dailybudget",
        region: "us",
        keywords: &["budget planner", "expense tracker"],
    },
];

/// Inserts development fixtures, skipping anything already present.
///
/// All inserts run inside a single transaction; if any operation fails the
/// entire batch is rolled back. Returns the number of apps processed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_dev_data(pool: &PgPool) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    for (code, name, attributes) in SEED_REGIONS {
        sqlx::query(
            "INSERT INTO regions (code, name, store_link_attributes) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (code) DO NOTHING",
        )
        .bind(code)
        .bind(name)
        .bind(attributes)
        .execute(&mut *tx)
        .await?;
    }

    let mut count = 0usize;
    for app in SEED_APPS {
        let app_id: i64 = sqlx::query_scalar(
            "INSERT INTO apps (name, package_id, region_code, is_active) \
             VALUES ($1, $2, $3, true) \
             ON CONFLICT (package_id) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id",
        )
        .bind(app.name)
        .bind(app.package_id)
        .bind(app.region)
        .fetch_one(&mut *tx)
        .await?;

        for keyword in app.keywords {
            let keyword_id: i64 = sqlx::query_scalar(
                "INSERT INTO keywords (name, region_code) \
                 VALUES ($1, $2) \
                 ON CONFLICT (name, region_code) DO UPDATE SET name = EXCLUDED.name \
                 RETURNING id",
            )
            .bind(keyword)
            .bind(app.region)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO app_keywords (app_id, keyword_id) \
                 VALUES ($1, $2) \
                 ON CONFLICT (app_id, keyword_id) DO NOTHING",
            )
            .bind(app_id)
            .bind(keyword_id)
            .execute(&mut *tx)
            .await?;
        }

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
