use actix_middleware::Logging;
use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context};
use blog_service::config::{self, Config};
use blog_service::db::{BlogRepository, MemoryRepository, PgRepository};
use blog_service::services::BlogService;
use blog_service::{handlers, AppState};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: blog-service [serve | healthcheck | migrate | create-user <username> <password> | create-category <name> [slug] | create-tag <name> [slug] | tag-post <post_id> <tag_slug>]";

/// Blog Service
///
/// Server-rendered blog with category and tag listings and a post form for
/// signed-in authors.
///
/// # Routes
///
/// - `/blog/*` - post list, detail, category/tag filters, post creation
/// - `/accounts/*` - login and logout
/// - `/api/v1/health`, `/metrics` - operations
///
/// Without `DATABASE_URL` the service keeps everything in memory; with it,
/// PostgreSQL is used and migrations run at startup.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("serve");

    // Container healthchecks run before logging is set up
    if command == "healthcheck" {
        return healthcheck().await;
    }

    init_tracing(config::json_logs_from_env());

    let config = Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("failed to load configuration")?;

    match command {
        "serve" => serve(config).await,
        "migrate" => {
            let repo = connect_postgres(&config).await?;
            repo.migrate().await.context("failed to run migrations")?;
            tracing::info!("migrations applied");
            Ok(())
        }
        "create-user" => {
            let (username, password) = match &args[1..] {
                [username, password] => (username, password),
                _ => bail!(USAGE),
            };
            let state = AppState::new(config.clone(), Arc::new(connect_postgres(&config).await?))?;
            let user = state.accounts.register(username, password).await?;
            println!("created user {} ({})", user.username, user.id);
            Ok(())
        }
        "create-category" | "create-tag" => {
            let (name, slug) = match &args[1..] {
                [name] => (name, None),
                [name, slug] => (name, Some(slug.as_str())),
                _ => bail!(USAGE),
            };
            let blog = blog_service(&config).await?;
            if command == "create-category" {
                let category = blog.create_category(name, slug).await?;
                println!("created category {} ({})", category.name, category.url());
            } else {
                let tag = blog.create_tag(name, slug).await?;
                println!("created tag {} ({})", tag.name, tag.url());
            }
            Ok(())
        }
        "tag-post" => {
            let (post_id, tag_slug) = match &args[1..] {
                [post_id, tag_slug] => (post_id, tag_slug),
                _ => bail!(USAGE),
            };
            let post_id: i64 = post_id
                .parse()
                .with_context(|| format!("invalid post id '{}'", post_id))?;
            blog_service(&config).await?.add_tag(post_id, tag_slug).await?;
            println!("tagged post {} with '{}'", post_id, tag_slug);
            Ok(())
        }
        _ => bail!(USAGE),
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn healthcheck() -> anyhow::Result<()> {
    let port = std::env::var("BLOG_SERVICE_PORT").unwrap_or_else(|_| "8000".to_string());
    let url = format!("http://127.0.0.1:{}/api/v1/health", port);

    let resp = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("healthcheck request to {} failed", url))?;

    if !resp.status().is_success() {
        bail!("healthcheck HTTP status: {}", resp.status());
    }
    Ok(())
}

/// Administrative commands only make sense against a persistent store
async fn connect_postgres(config: &Config) -> anyhow::Result<PgRepository> {
    if config.database.url.is_none() {
        bail!("DATABASE_URL must be set for this command");
    }
    let repo = PgRepository::connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL")?;
    Ok(repo)
}

async fn blog_service(config: &Config) -> anyhow::Result<BlogService> {
    let repo = connect_postgres(config).await?;
    Ok(BlogService::new(
        Arc::new(repo),
        config.blog.uncategorized_label.clone(),
    ))
}

async fn open_repository(config: &Config) -> anyhow::Result<Arc<dyn BlogRepository>> {
    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL not set; using in-memory storage, data is lost on restart");
        return Ok(Arc::new(MemoryRepository::new()));
    }

    let repo = connect_postgres(config).await?;
    repo.migrate().await.context("failed to run migrations")?;
    Ok(Arc::new(repo))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let repo = open_repository(&config).await?;
    tracing::info!(storage = repo.backend(), "storage ready");

    let bind_address = config.bind_address();
    let workers = config.app.workers;
    let state = web::Data::new(AppState::new(config, repo)?);

    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(state.session_auth())
            .wrap(Logging)
            .wrap(TracingLogger::default())
            .configure(handlers::configure)
    })
    .workers(workers)
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("blog-service stopped");
    Ok(())
}
