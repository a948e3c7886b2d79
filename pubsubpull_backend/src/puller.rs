use std::{fmt, io::Write, time::Duration};

use tokio::{select, time::sleep};
use tokio_util::sync::CancellationToken;

use crate::{
    error::BackendError,
    model::{AcknowledgeRequest, PullRequest, ReceivedMessage, SubscriptionName},
    payload::format_line,
    service::SubscriptionService,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullerConfig {
    pub subscription: SubscriptionName,
    /// Acknowledge every printed message.
    pub ack: bool,
    /// Keep pulling until a pull or acknowledge fails.
    pub follow: bool,
    /// Delay between pulls in follow mode.
    pub interval: Duration,
    pub max_messages: u32,
    pub return_immediately: bool,
    pub verbose: bool,
}

impl PullerConfig {
    pub fn new(subscription: impl Into<String>) -> Self {
        Self {
            subscription: SubscriptionName(subscription.into()),
            ack: false,
            follow: false,
            interval: Duration::from_secs(1),
            max_messages: 1,
            return_immediately: false,
            verbose: false,
        }
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        if self.subscription.0.trim().is_empty() {
            return Err(BackendError::InvalidConfig(
                "subscription name must not be empty".to_string(),
            ));
        }
        if self.max_messages == 0 {
            return Err(BackendError::InvalidConfig(
                "max messages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn pull_request(&self) -> PullRequest {
        PullRequest {
            max_messages: self.max_messages,
            return_immediately: self.return_immediately,
        }
    }
}

impl fmt::Display for PullerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Puller")?;
        writeln!(f, "  subscription      : {}", self.subscription)?;
        writeln!(f, "  ack               : {}", self.ack)?;
        writeln!(f, "  follow            : {}", self.follow)?;
        writeln!(f, "  interval          : {}s", self.interval.as_secs())?;
        writeln!(f, "  max_messages      : {}", self.max_messages)?;
        writeln!(f, "  return_immediately: {}", self.return_immediately)?;
        writeln!(f, "  verbose           : {}", self.verbose)?;

        let pull_request = self.pull_request();
        writeln!(f, "  pull_request      :")?;
        writeln!(f, "    max_messages      : {}", pull_request.max_messages)?;
        write!(
            f,
            "    return_immediately: {}",
            pull_request.return_immediately
        )
    }
}

#[derive(Debug)]
enum PollState {
    Idle,
    Pulling,
    Processing(Vec<ReceivedMessage>),
    Sleeping,
    Terminated(Result<(), BackendError>),
}

impl PollState {
    fn name(&self) -> &'static str {
        match self {
            PollState::Idle => "idle",
            PollState::Pulling => "pulling",
            PollState::Processing(_) => "processing",
            PollState::Sleeping => "sleeping",
            PollState::Terminated(_) => "terminated",
        }
    }
}

/// Pulls from one subscription, prints every message to `out` and optionally
/// acknowledges it.
pub struct Puller<S, W> {
    service: S,
    config: PullerConfig,
    pull_request: PullRequest,
    out: W,
}

impl<S, W> Puller<S, W>
where
    S: SubscriptionService,
    W: Write,
{
    pub fn new(service: S, config: PullerConfig, out: W) -> Result<Self, BackendError> {
        config.validate()?;
        let pull_request = config.pull_request();

        Ok(Self {
            service,
            config,
            pull_request,
            out,
        })
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Runs a single cycle, or keeps cycling in follow mode until a cycle fails
    /// or `cancel` fires. Cancellation drops a pull that is still waiting on
    /// the server; a batch already being printed is finished first.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<(), BackendError> {
        if self.config.verbose {
            eprintln!("{}", self.config);
        }

        let mut state = PollState::Idle;

        loop {
            log::debug!("{}: {}", self.config.subscription, state.name());

            state = match state {
                PollState::Idle if cancel.is_cancelled() => PollState::Terminated(Ok(())),
                PollState::Idle => PollState::Pulling,
                PollState::Pulling => {
                    select! {
                        _ = cancel.cancelled() => PollState::Terminated(Ok(())),
                        pulled = self.pull() => match pulled {
                            Ok(messages) => PollState::Processing(messages),
                            Err(err) => PollState::Terminated(Err(err)),
                        },
                    }
                }
                PollState::Processing(messages) => match self.process(messages).await {
                    Err(err) => PollState::Terminated(Err(err)),
                    Ok(()) if self.config.follow => PollState::Sleeping,
                    Ok(()) => PollState::Terminated(Ok(())),
                },
                PollState::Sleeping => {
                    select! {
                        _ = cancel.cancelled() => PollState::Terminated(Ok(())),
                        _ = sleep(self.config.interval) => PollState::Idle,
                    }
                }
                PollState::Terminated(result) => return result,
            };
        }
    }

    async fn pull(&self) -> Result<Vec<ReceivedMessage>, BackendError> {
        let messages = self
            .service
            .pull(&self.config.subscription, &self.pull_request)
            .await
            .map_err(|source| BackendError::PullFailed {
                subscription: self.config.subscription.clone(),
                source,
            })?;

        log::debug!(
            "Pulled {} message(s) from {}",
            messages.len(),
            self.config.subscription
        );
        Ok(messages)
    }

    async fn process(&mut self, messages: Vec<ReceivedMessage>) -> Result<(), BackendError> {
        for received in messages {
            writeln!(self.out, "{}", format_line(&received))?;
            self.out.flush()?;

            if self.config.ack {
                self.acknowledge(&received.ack_id).await?;
            }
        }
        Ok(())
    }

    async fn acknowledge(&self, ack_id: &str) -> Result<(), BackendError> {
        self.service
            .acknowledge(
                &self.config.subscription,
                &AcknowledgeRequest::single(ack_id),
            )
            .await
            .map_err(|source| BackendError::AcknowledgeFailed {
                subscription: self.config.subscription.clone(),
                ack_id: ack_id.to_string(),
                source,
            })
    }
}
