use tutor_scheduler::server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());

    server::run_server(&data_dir).await
}
