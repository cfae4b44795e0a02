#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = taskscribe_server::config::Config::from_env()?;
    taskscribe_server::web::start_web_server(config).await
}
