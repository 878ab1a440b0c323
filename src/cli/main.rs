mod session;

use ladder_rush_rust::config::SessionConfig;
use session::Session;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("program begin");
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = match args.first() {
        Some(path) => match SessionConfig::from_json_file(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(%path, error = %err, "bad config file");
                return;
            }
        },
        None => SessionConfig::from_env(),
    };

    match Session::new(config) {
        Ok(mut session) => session.start().await,
        Err(err) => tracing::error!(error = %err, "failed to create session"),
    }
    println!("program end");
}
