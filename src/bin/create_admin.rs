//! Bootstrap an administrator: creates the identity-provider account and an
//! approved `admin` profile for it.
//!
//! ```text
//! create-admin --email admin@example.com --password secret123 \
//!     --full-name "Site Admin" --phone 03000000000
//! ```

use assignpro_backend::auth::identity::{IdentityProvider, SupabaseIdentity};
use assignpro_backend::config::AppConfig;
use assignpro_backend::create_pool;
use assignpro_backend::db::profiles as profile_db;
use assignpro_backend::models::profiles::{NewProfile, Roles};
use clap::Parser;
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "create-admin", about = "Create an approved administrator account")]
struct Args {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    full_name: String,
    #[arg(long, default_value = "")]
    phone: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env()?;
    let db = create_pool(&config.database_url).await?;

    let email = args.email.trim().to_lowercase();
    if profile_db::get_profile_by_email(&db, &email).await?.is_some() {
        return Err(format!("A profile for {email} already exists").into());
    }

    let identity = SupabaseIdentity::new(&config.supabase);
    let user_id = identity.create_account(&email, &args.password).await?;

    let inserted = profile_db::insert_profile(
        &db,
        NewProfile {
            id: user_id,
            full_name: args.full_name,
            email,
            phone: args.phone,
            role: Roles::Admin,
            is_approved: true,
            payment_screenshot_url: None,
            father_name: None,
            city: None,
            qualification: None,
            job: None,
        },
    )
    .await;

    let profile = match inserted {
        Ok(profile) => profile,
        Err(e) => {
            if let Err(err) = identity.delete_account(user_id).await {
                tracing::warn!("Failed to remove account {user_id}: {err}");
            }
            return Err(e.into());
        }
    };

    tracing::info!("Created admin {} ({})", profile.id, profile.email);
    Ok(())
}
