use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, web};
use assignpro_backend::auth::identity::SupabaseIdentity;
use assignpro_backend::auth::jwks::JwksCache;
use assignpro_backend::auth::jwt::TokenVerifier;
use assignpro_backend::config::{AppConfig, StorageConfig};
use assignpro_backend::create_pool;
use assignpro_backend::handlers;
use assignpro_backend::live::LiveHub;
use assignpro_backend::storage::{BlobStore, LocalDiskStore, SupabaseStorage, local};
use assignpro_backend::workflow::Workflow;
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let db = create_pool(&config.database_url)
        .await
        .expect("Failed to connect to the database");
    tracing::info!("Connected to the database, migrations applied");

    let verifier = match &config.supabase.jwt_secret {
        Some(secret) => TokenVerifier::Secret(secret.clone()),
        None => {
            match config.supabase.project_ref() {
                Ok(project_ref) => {
                    tracing::info!("Verifying tokens against JWKS of project {project_ref}")
                }
                // Self-hosted instances serve the same JWKS path.
                Err(_) => tracing::info!("Verifying tokens against JWKS at {}", config.supabase.url),
            }
            TokenVerifier::Jwks(JwksCache::new(
                &config.supabase.url,
                &config.supabase.anon_key,
            ))
        }
    };

    let mut local_root: Option<PathBuf> = None;
    let blobs: Arc<dyn BlobStore> = match &config.storage {
        StorageConfig::Supabase { bucket } => {
            let service_key = config
                .supabase
                .service_key
                .as_deref()
                .expect("SUPABASE_SERVICE_KEY must be set");
            Arc::new(SupabaseStorage::new(&config.supabase, bucket, service_key))
        }
        StorageConfig::Local { root } => {
            std::fs::create_dir_all(root)?;
            local_root = Some(root.clone());
            Arc::new(LocalDiskStore::new(root.clone()))
        }
    };

    let workflow = Workflow::new(
        db.clone(),
        blobs,
        Arc::new(SupabaseIdentity::new(&config.supabase)),
        Arc::new(LiveHub::new()),
    )
    .with_policy(config.policy)
    .with_max_upload_bytes(config.max_upload_bytes);

    let db_data = web::Data::new(db);
    let verifier_data = web::Data::new(Arc::new(verifier));
    let workflow_data = web::Data::new(Arc::new(workflow));

    // Base64 inflates uploads by about a third.
    let json_limit = config.max_upload_bytes * 4 / 3 + 64 * 1024;

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let mut app = App::new()
            .wrap(cors)
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(db_data.clone())
            .app_data(verifier_data.clone())
            .app_data(workflow_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes));

        if let Some(root) = &local_root {
            app = app.service(Files::new(local::PUBLIC_PREFIX, root));
        }
        app
    })
    .bind(&bind_addr)?
    .run()
    .await
}
