//! Kafka consumer implementation for the search sync ingest.
//!
//! Consumes Debezium change envelopes from the CDC topics and forwards them,
//! one message at a time and in partition order, to the orchestrator.

use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer as _, StreamConsumer},
    message::{BorrowedMessage, Message as KafkaMessage},
    Offset, TopicPartitionList,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, instrument};

use crate::consumer::envelope;
use crate::consumer::messages::{MessageOffset, SkipReason, StreamMessage};
use crate::errors::IngestError;
use crate::orchestrator::Consumer;

/// Kafka consumer for CDC topics.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topics: Vec<String>,
}

impl KafkaConsumer {
    /// Create a new Kafka consumer.
    ///
    /// Offsets are committed manually, only after the orchestrator has
    /// acknowledged a message.
    ///
    /// # Arguments
    ///
    /// * `brokers` - Kafka broker addresses (comma-separated)
    /// * `group_id` - Consumer group ID
    /// * `topics` - Topics carrying the change envelopes
    ///
    /// # Returns
    ///
    /// * `Ok(KafkaConsumer)` - A new consumer instance
    /// * `Err(IngestError)` - If consumer creation fails
    pub fn new(brokers: &str, group_id: &str, topics: Vec<String>) -> Result<Self, IngestError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| IngestError::kafka(e.to_string()))?;

        info!(
            brokers = %brokers,
            group_id = %group_id,
            topics = ?topics,
            "Created Kafka consumer"
        );

        Ok(Self { consumer, topics })
    }

    /// Commit the position just past `offset`.
    fn commit(&self, offset: &MessageOffset) -> Result<(), IngestError> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &offset.topic,
            offset.partition,
            Offset::Offset(offset.offset + 1),
        )?;
        self.consumer.commit(&tpl, CommitMode::Async)?;
        Ok(())
    }

    /// Turn one Kafka message into the stream message for the orchestrator.
    fn to_stream_message(msg: &BorrowedMessage<'_>) -> StreamMessage {
        let offset = MessageOffset::new(msg.topic(), msg.partition(), msg.offset());
        classify(msg.payload(), offset)
    }

    /// Commit or report one acknowledgment from the orchestrator.
    fn apply_ack(&self, offset: &MessageOffset, commit: bool, error: Option<&str>) {
        if !commit {
            error!(
                topic = %offset.topic,
                partition = offset.partition,
                offset = offset.offset,
                error = error.unwrap_or("Unknown error"),
                "Not committing offset due to processing failure"
            );
            return;
        }

        match self.commit(offset) {
            Ok(()) => debug!(
                topic = %offset.topic,
                partition = offset.partition,
                offset = offset.offset,
                "Committed offset"
            ),
            Err(e) => error!(
                topic = %offset.topic,
                partition = offset.partition,
                offset = offset.offset,
                error = %e,
                "Failed to commit offset after acknowledgment"
            ),
        }
    }
}

/// Classify a message value.
///
/// A missing or empty value is the tombstone Kafka keeps after a delete; it
/// never reaches the envelope decoder, which rejects empty input.
fn classify(payload: Option<&[u8]>, offset: MessageOffset) -> StreamMessage {
    let Some(payload) = payload.filter(|p| !p.is_empty()) else {
        return StreamMessage::Skipped {
            reason: SkipReason::Tombstone,
            offset,
        };
    };

    match envelope::decode(payload) {
        Ok(Some(event)) => StreamMessage::Event { event, offset },
        Ok(None) => StreamMessage::Skipped {
            reason: SkipReason::Tombstone,
            offset,
        },
        Err(e) => StreamMessage::Skipped {
            reason: SkipReason::Undecodable(e.to_string()),
            offset,
        },
    }
}

/// Acknowledgments already queued on `ack_receiver`, in arrival order.
fn pending_acks(
    ack_receiver: &mut mpsc::Receiver<StreamMessage>,
) -> Vec<(MessageOffset, bool, Option<String>)> {
    let mut acks = Vec::new();
    while let Ok(msg) = ack_receiver.try_recv() {
        if let StreamMessage::Acknowledgment {
            offset,
            commit,
            error,
        } = msg
        {
            acks.push((offset, commit, error));
        }
    }
    acks
}

#[async_trait]
impl Consumer for KafkaConsumer {
    fn subscribe(&self) -> Result<(), IngestError> {
        let topics: Vec<&str> = self.topics.iter().map(|s| s.as_str()).collect();
        self.consumer.subscribe(&topics)?;

        info!(topics = ?self.topics, "Subscribed to Kafka topics");
        Ok(())
    }

    /// Start consuming messages and send them through the channel.
    ///
    /// Every message, including tombstones and undecodable ones, is forwarded
    /// so that offsets are acknowledged in partition order.
    ///
    /// # Arguments
    ///
    /// * `sender` - Channel to send messages to
    /// * `ack_receiver` - Channel to receive acknowledgments from orchestrator
    /// * `shutdown` - Shutdown signal receiver
    #[instrument(skip(self, sender, ack_receiver, shutdown))]
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut ack_receiver: mpsc::Receiver<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        use futures::StreamExt;

        let mut message_stream = self.consumer.stream();

        loop {
            // Acknowledgments are drained before new messages are read.
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    for (offset, commit, error) in pending_acks(&mut ack_receiver) {
                        self.apply_ack(&offset, commit, error.as_deref());
                    }
                    // Forwarded but unacknowledged messages are re-read from the
                    // last committed offset on restart
                    let _ = sender.send(StreamMessage::End).await;
                    break;
                }
                ack_msg = ack_receiver.recv() => {
                    match ack_msg {
                        Some(StreamMessage::Acknowledgment { offset, commit, error }) => {
                            self.apply_ack(&offset, commit, error.as_deref());
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Acknowledgment channel closed");
                            break;
                        }
                        _ => {}
                    }
                }
                message = message_stream.next() => {
                    match message {
                        Some(Ok(msg)) => {
                            debug!(
                                topic = %msg.topic(),
                                partition = msg.partition(),
                                offset = msg.offset(),
                                "Received message from Kafka"
                            );
                            sender
                                .send(Self::to_stream_message(&msg))
                                .await
                                .map_err(|e| IngestError::channel(e.to_string()))?;
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Kafka error");
                            let _ = sender.send(StreamMessage::Error(e.to_string())).await;
                        }
                        None => {
                            info!("Kafka stream ended");
                            let _ = sender.send(StreamMessage::End).await;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(n: i64) -> MessageOffset {
        MessageOffset::new("cdc.public.events", 0, n)
    }

    #[test]
    fn test_missing_and_empty_values_are_tombstones() {
        for payload in [None, Some(&b""[..])] {
            match classify(payload, offset(4)) {
                StreamMessage::Skipped {
                    reason: SkipReason::Tombstone,
                    offset,
                } => assert_eq!(offset.offset, 4),
                other => panic!("expected tombstone, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_garbage_value_is_undecodable() {
        match classify(Some(b"\x00not json"), offset(5)) {
            StreamMessage::Skipped {
                reason: SkipReason::Undecodable(_),
                offset,
            } => assert_eq!(offset.offset, 5),
            other => panic!("expected undecodable, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_value_is_an_event() {
        let value = br#"{"payload":{"op":"d","before":{"id":42},"after":null,"source":{"table":"events"},"ts_ms":1}}"#;
        match classify(Some(value), offset(6)) {
            StreamMessage::Event { event, offset } => {
                assert_eq!(event.source_table, "events");
                assert_eq!(offset.offset, 6);
            }
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pending_acks_are_drained_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        for (n, commit) in [(1, true), (2, false)] {
            tx.send(StreamMessage::Acknowledgment {
                offset: offset(n),
                commit,
                error: (!commit).then(|| "index unavailable".to_string()),
            })
            .await
            .unwrap();
        }
        tx.send(StreamMessage::End).await.unwrap();

        let acks = pending_acks(&mut rx);

        assert_eq!(
            acks,
            vec![
                (offset(1), true, None),
                (offset(2), false, Some("index unavailable".to_string())),
            ]
        );
        assert!(pending_acks(&mut rx).is_empty());
    }
}
