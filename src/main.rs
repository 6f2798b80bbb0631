use todo_list::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("Todo List v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Store: {}", config.db_path.display());
    eprintln!("   Listening: http://{}\n", config.bind_addr);

    todo_list::serve(config).await?;
    Ok(())
}
