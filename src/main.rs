use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mahjong_env::app::EngineApp;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // -q, -d はログレベルの初期値のみ変更. RUST_LOGが指定されていればそちらを優先
    let level = if args.iter().any(|a| a == "-d") {
        "debug"
    } else if args.iter().any(|a| a == "-q") {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match EngineApp::new(args) {
        Ok(app) => {
            if let Err(e) = app.run() {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}
