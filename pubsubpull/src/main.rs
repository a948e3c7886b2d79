#![warn(clippy::all, rust_2018_idioms)]

use std::{io, process::ExitCode};

use clap::Parser;
use pubsubpull::Args;
use pubsubpull_backend::{GrpcSubscriptionService, Puller, PullerConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Log to stderr; `RUST_LOG` overrides the default level.
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupted, stopping");
            ctrl_c_cancel.cancel();
        }
    });

    let result = async {
        let service = GrpcSubscriptionService::connect(args.emulator_project_id.clone()).await?;
        let mut puller = Puller::new(service, PullerConfig::from(&args), io::stdout().lock())?;
        puller.run(&cancel).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
