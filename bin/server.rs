// Grade Registry - Web Server
// Shared-state REST API over one registry instance

use anyhow::{bail, Context, Result};
use grade_registry::api::{router, AppState};
use grade_registry::{load_folder, logging, Config, LoadOutcome, Registry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();
    logging::init(config.log_format);

    let folder = match &config.data_dir {
        Some(folder) => folder.clone(),
        None => bail!("no data folder: pass --data <folder> or set REGISTRY_DATA_DIR"),
    };

    let mut registry = Registry::new();
    match load_folder(&mut registry, &folder)
        .with_context(|| format!("loading {}", folder.display()))?
    {
        LoadOutcome::Loaded(counts) => tracing::info!(
            folder = %folder.display(),
            students = counts.students,
            courses = counts.courses,
            grades = counts.evaluations,
            "data loaded"
        ),
        LoadOutcome::Rejected(conflict) => bail!("{}: {}", folder.display(), conflict),
    }

    let app = router(AppState::new(registry, config.report_limit));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;

    tracing::info!(addr = %config.bind, "server listening");
    println!("🚀 Server running on http://{}", config.bind);
    println!("   API: http://{}/api/health", config.bind);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("server stopped")?;
    Ok(())
}
