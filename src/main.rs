use innerlight::auth::AuthClient;
use innerlight::config::SiteConfig;
use innerlight::routes;
use innerlight::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = SiteConfig::from_env().expect("invalid site configuration");

    // Missing credentials are non-fatal: pages still work, auth calls fail softly.
    let auth = AuthClient::initialize(
        config.supabase_url.as_deref(),
        config.supabase_anon_key.as_deref(),
        &config.site_origin,
    );

    let port = config.port;
    let preview_port = config.preview_port;
    tracing::info!(site_dir = %config.site_dir.display(), origin = %config.site_origin, "site configured");

    let app = routes::app(AppState::new(config, auth));

    if let Some(preview_port) = preview_port {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{preview_port}"))
            .await
            .expect("failed to bind preview port");
        let preview = app.clone();
        tokio::spawn(async move {
            tracing::info!(port = %preview_port, "preview listening");
            if let Err(e) = axum::serve(listener, preview).await {
                tracing::error!(error = %e, "preview server failed");
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "innerlight listening");
    axum::serve(listener, app).await.expect("server failed");
}
