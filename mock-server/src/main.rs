use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let secret_key =
        std::env::var("MOCK_SECRET_KEY").unwrap_or_else(|_| "sk_test_mock_server".to_string());
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    paystack_mock_server::run(listener, &secret_key).await
}
