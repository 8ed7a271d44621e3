//! Admin API over seeded in-memory stores
//!
//! ```text
//! cargo run --example admin_api
//! curl 'http://127.0.0.1:3000/products?search%5Bname%5D=pro&order%5Bprice%5D=desc&length=5'
//! curl -X POST http://127.0.0.1:3000/users -H 'content-type: application/json' \
//!      -d '{"user": {"name": "Eve", "email": "eve@storefront.test", "profile": "client"}}'
//! ```
//!
//! Set `ADMIN_CONFIG` to load allow-lists from a YAML file instead of the
//! built-in defaults, and `RUST_LOG` to tune logging.

use chrono::{Duration, TimeZone};
use storefront::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,tower_http=debug")),
        )
        .init();

    let config = match std::env::var("ADMIN_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            AdminConfig::from_yaml_file(&path)?
        }
        Err(_) => AdminConfig::default_config(),
    };

    let requirements = InMemoryStore::new();
    let low = requirements.insert(SystemRequirement::new(
        "Basic".to_string(),
        "Windows 10".to_string(),
        "50GB".to_string(),
        "Intel i3".to_string(),
        "8GB".to_string(),
        "GTX 960".to_string(),
    ))?;
    let high = requirements.insert(SystemRequirement::new(
        "Ultra".to_string(),
        "Windows 11".to_string(),
        "150GB".to_string(),
        "Ryzen 7".to_string(),
        "32GB".to_string(),
        "RTX 4080".to_string(),
    ))?;

    let games = InMemoryStore::new();
    let launch = Utc
        .with_ymd_and_hms(2020, 11, 10, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let developers = ["Blizzard", "Valve", "FromSoftware", "Riot", "Bungie"];
    for (i, developer) in developers.iter().enumerate() {
        let mode = GameMode::ALL[i % GameMode::ALL.len()];
        let requirement = if i % 2 == 0 { low.id } else { high.id };
        games.insert(Game::new(
            mode,
            developer.to_string(),
            launch + Duration::days(90 * i as i64),
            requirement,
        ))?;
    }

    let products = InMemoryStore::new();
    let licenses = InMemoryStore::new();
    for (i, game) in games.list()?.iter().enumerate() {
        let status = if i % 4 == 3 {
            ProductStatus::Unavailable
        } else {
            ProductStatus::Available
        };
        products.insert(Product::new(
            format!("{} Pro Edition", game.developer),
            format!("Premium edition by {}", game.developer),
            19.9 + 10.0 * i as f64,
            status,
            i % 2 == 0,
            game.id,
        ))?;

        for n in 0..3 {
            let platform = Platform::ALL[(i + n) % Platform::ALL.len()];
            licenses.insert(License::new(
                format!("{}-{:04}", game.developer.to_uppercase(), n),
                platform,
                LicenseStatus::Available,
                game.id,
            ))?;
        }
    }

    let coupons = InMemoryStore::new();
    coupons.insert(Coupon::new(
        "Black Friday".to_string(),
        "BF2024".to_string(),
        CouponStatus::Active,
        25.0,
        1000,
        Utc::now() + Duration::days(30),
    ))?;
    coupons.insert(Coupon::new(
        "Summer Sale".to_string(),
        "SUMMER10".to_string(),
        CouponStatus::Inactive,
        10.0,
        500,
        Utc::now() - Duration::days(30),
    ))?;

    let users = InMemoryStore::new();
    users.insert(User::new(
        "Ada Admin".to_string(),
        "ada@storefront.test".to_string(),
        Profile::Admin,
    ))?;
    users.insert(User::new(
        "Carl Client".to_string(),
        "carl@storefront.test".to_string(),
        Profile::Client,
    ))?;

    tracing::info!(
        games = games.len()?,
        products = products.len()?,
        licenses = licenses.len()?,
        "Seeded catalogue"
    );

    ServerBuilder::new()
        .with_config(config)
        .restrict_delete(
            "system_requirements",
            ForeignKey::new("games", "system_requirement_id", games.clone()),
        )?
        .register("system_requirements", requirements)?
        .register("games", games)?
        .register("products", products)?
        .register("licenses", licenses)?
        .register("coupons", coupons)?
        .register("users", users)?
        .serve("127.0.0.1:3000")
        .await
}
