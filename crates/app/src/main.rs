use clap::Parser;

mod cli;
mod commands;
mod error;
mod local_state;
mod settings;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let settings = match settings::Settings::new(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "walletwatch={level},client={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let client = match client::Client::new(settings.filemaker) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("failed to build client: {err}");
            eprintln!("{}", err.user_message());
            std::process::exit(2);
        }
    };

    if let Err(err) = commands::run(&client, cli.command, &settings.app.state_path).await {
        tracing::error!("{err}");
        eprintln!("{}", err.user_message());
        std::process::exit(1);
    }
}
