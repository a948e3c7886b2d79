//! Drives the poll loop end to end against an in-memory subscription.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use google_cloud_gax::grpc::Status;
use pubsubpull_backend::{
    model::{AcknowledgeRequest, PullRequest, ReceivedMessage, SubscriptionName},
    BackendError, Puller, PullerConfig, SubscriptionService,
};
use tokio_util::sync::CancellationToken;

/// Serves queued batches in order, then fails every further pull.
#[derive(Clone, Default)]
struct FakeSubscription {
    batches: Arc<Mutex<VecDeque<Vec<ReceivedMessage>>>>,
    pulls: Arc<Mutex<Vec<PullRequest>>>,
    acked: Arc<Mutex<Vec<String>>>,
}

impl FakeSubscription {
    fn with_batches(batches: Vec<Vec<ReceivedMessage>>) -> Self {
        Self {
            batches: Arc::new(Mutex::new(batches.into())),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SubscriptionService for FakeSubscription {
    async fn pull(
        &self,
        _subscription: &SubscriptionName,
        request: &PullRequest,
    ) -> Result<Vec<ReceivedMessage>, Status> {
        self.pulls.lock().unwrap().push(*request);
        let mut batches = self.batches.lock().unwrap();
        match batches.pop_front() {
            Some(batch) => Ok(batch.into_iter().take(request.max_messages as usize).collect()),
            None => Err(Status::unavailable("subscription drained")),
        }
    }

    async fn acknowledge(
        &self,
        _subscription: &SubscriptionName,
        request: &AcknowledgeRequest,
    ) -> Result<(), Status> {
        self.acked
            .lock()
            .unwrap()
            .extend(request.ack_ids.iter().cloned());
        Ok(())
    }
}

fn received(json: &str) -> ReceivedMessage {
    serde_json::from_str(json).unwrap()
}

#[tokio::test(start_paused = true)]
async fn follow_drains_subscription_until_pull_fails() {
    let fake = FakeSubscription::with_batches(vec![
        vec![
            received(
                r#"{"ackId":"a1","message":{"data":"SGVsbG8=","messageId":"m1","publishTime":"2024-01-01T00:00:00Z"}}"#,
            ),
            received(
                r#"{"ackId":"a2","message":{"data":"V29ybGQ=","attributes":{"k":"v"},"messageId":"m2","publishTime":"2024-01-01T00:00:01Z"}}"#,
            ),
        ],
        vec![],
        vec![received(
            r#"{"ackId":"a3","message":{"data":"@@","messageId":"m3","publishTime":"2024-01-01T00:00:02Z"}}"#,
        )],
    ]);

    let config = PullerConfig {
        ack: true,
        follow: true,
        interval: Duration::from_secs(2),
        max_messages: 10,
        ..PullerConfig::new("projects/p/subscriptions/s")
    };
    let mut puller = Puller::new(fake.clone(), config, Vec::new()).unwrap();

    let err = puller.run(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, BackendError::PullFailed { .. }));

    let output = String::from_utf8(puller.output().clone()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "2024-01-01T00:00:00Z m1: {} Hello");
    assert_eq!(lines[1], r#"2024-01-01T00:00:01Z m2: {"k":"v"} World"#);
    assert!(lines[2].starts_with("2024-01-01T00:00:02Z m3: {} <undecodable payload"));

    assert_eq!(*fake.acked.lock().unwrap(), vec!["a1", "a2", "a3"]);

    let pulls = fake.pulls.lock().unwrap();
    assert_eq!(pulls.len(), 4);
    assert!(pulls.iter().all(|request| request.max_messages == 10));
}

#[tokio::test]
async fn single_shot_reads_without_acknowledging() {
    let fake = FakeSubscription::with_batches(vec![vec![received(
        r#"{"ackId":"a1","message":{"data":"SGVsbG8=","messageId":"m1"}}"#,
    )]]);

    let mut puller =
        Puller::new(fake.clone(), PullerConfig::new("projects/p/subscriptions/s"), Vec::new())
            .unwrap();
    puller.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        String::from_utf8(puller.output().clone()).unwrap(),
        "- m1: {} Hello\n"
    );
    assert!(fake.acked.lock().unwrap().is_empty());
    assert_eq!(fake.pulls.lock().unwrap().len(), 1);
}
