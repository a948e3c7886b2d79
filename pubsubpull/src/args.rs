use std::time::Duration;

use clap::Parser;
use pubsubpull_backend::{model::SubscriptionName, PullerConfig};

/// Pull messages from a Pub/Sub subscription and print them to stdout.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Subscription to pull from, either `projects/<project>/subscriptions/<id>` or a bare id.
    pub subscription: String,

    /// Acknowledge every printed message.
    #[arg(long)]
    pub ack: bool,

    /// Keep pulling until interrupted or a pull/acknowledge fails.
    #[arg(short, long)]
    pub follow: bool,

    /// Seconds to wait between pulls in follow mode.
    #[arg(short, long, default_value_t = 1)]
    pub interval: u64,

    /// Maximum number of messages per pull.
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_messages: u32,

    /// Return from a pull straight away when no messages are available.
    #[arg(long)]
    pub return_immediately: bool,

    /// Print the configuration to stderr and enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional override for the Pub/Sub Emulator project ID.
    #[arg(long)]
    pub emulator_project_id: Option<String>,
}

impl From<&Args> for PullerConfig {
    fn from(args: &Args) -> Self {
        Self {
            subscription: SubscriptionName(args.subscription.clone()),
            ack: args.ack,
            follow: args.follow,
            interval: Duration::from_secs(args.interval),
            max_messages: args.max_messages,
            return_immediately: args.return_immediately,
            verbose: args.verbose,
        }
    }
}
