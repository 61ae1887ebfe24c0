use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::broker::message::{AckMode, Message};
use crate::broker::subscription::Subscription;
use crate::client::Client;
use crate::protocol::{Command, Frame};

/// Capacity of each destination's inbound message queue. A `SEND` that finds
/// the queue full suspends the publishing client's read loop until the
/// dispatcher drains it.
pub(crate) const QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Default)]
struct BrokerState {
    clients: HashMap<u64, Client>,
    /// Destination -> subscriptions, in subscribe order. Fan-out walks this
    /// sequence, so delivery order across subscribers is deterministic.
    subscriptions: HashMap<String, Vec<Subscription>>,
    /// Destination -> inbound queue sender. An entry exists exactly while the
    /// destination has at least one subscription; dropping the sender is how
    /// the dispatcher task learns it should stop.
    queues: HashMap<String, mpsc::Sender<Message>>,
    /// (client id, subscription id) -> delivered-but-unacknowledged messages,
    /// oldest first. Subscription ids are client-scoped, hence the pair key.
    unacked: HashMap<(u64, u64), VecDeque<(String, Message)>>,
}

/// The process-wide pub/sub registry and fan-out dispatcher.
///
/// All maps live behind one mutex; nothing awaits while holding it. Queue
/// sends happen on senders cloned out of the lock, and frame writes go to
/// each client's unbounded outbound channel, so the critical sections stay
/// short.
#[derive(Debug, Default)]
pub struct Broker {
    state: Mutex<BrokerState>,
    client_count: AtomicU64,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next client id. Ids are unique for the server's
    /// lifetime and never reused.
    pub fn allocate_client_id(&self) -> u64 {
        self.client_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Registers a new client with the broker.
    pub fn register_client(&self, client: Client) {
        let mut state = self.state.lock().unwrap();
        debug!(client = client.id, addr = %client.remote_addr, "client registered");
        state.clients.insert(client.id, client);
    }

    /// Removes a client and everything it owns: its subscriptions, any
    /// destination queues left without subscribers, and its unacked entries.
    /// Dropping the client record closes its outbound channel, which shuts
    /// the socket down. Idempotent.
    pub fn remove_client(&self, client_id: u64) {
        let mut state = self.state.lock().unwrap();
        if state.clients.remove(&client_id).is_none() {
            return;
        }
        debug!(client = client_id, "client removed");

        let mut emptied = Vec::new();
        for (destination, subs) in state.subscriptions.iter_mut() {
            subs.retain(|s| s.client_id != client_id);
            if subs.is_empty() {
                emptied.push(destination.clone());
            }
        }
        for destination in emptied {
            state.subscriptions.remove(&destination);
            state.queues.remove(&destination);
        }
        state.unacked.retain(|(owner, _), _| *owner != client_id);
    }

    /// Subscribes a client to a destination. The first subscription to a
    /// destination creates its inbound queue and spawns the dispatcher task
    /// that fans queued messages out to subscribers.
    pub fn add_subscription(
        self: Arc<Self>,
        destination: &str,
        id: u64,
        client_id: u64,
        ack: AckMode,
    ) {
        let mut state = self.state.lock().unwrap();
        state
            .subscriptions
            .entry(destination.to_string())
            .or_default()
            .push(Subscription {
                id,
                client_id,
                destination: destination.to_string(),
                ack,
            });

        if !state.queues.contains_key(destination) {
            let (tx, mut rx) = mpsc::channel::<Message>(QUEUE_CAPACITY);
            state.queues.insert(destination.to_string(), tx);

            let broker = Arc::clone(&self);
            let destination = destination.to_string();
            tokio::spawn(async move {
                debug!(%destination, "dispatcher started");
                while let Some(message) = rx.recv().await {
                    broker.fan_out(&destination, message);
                }
                debug!(%destination, "dispatcher stopped");
            });
        }
    }

    /// Drops one subscription. When the destination is left without
    /// subscribers its queue sender is dropped too, which terminates the
    /// dispatcher task.
    pub fn remove_subscription(&self, client_id: u64, id: u64) {
        let mut state = self.state.lock().unwrap();
        let mut emptied = Vec::new();
        for (destination, subs) in state.subscriptions.iter_mut() {
            if let Some(pos) = subs
                .iter()
                .position(|s| s.client_id == client_id && s.id == id)
            {
                subs.remove(pos);
                if subs.is_empty() {
                    emptied.push(destination.clone());
                }
            }
        }
        for destination in emptied {
            state.subscriptions.remove(&destination);
            state.queues.remove(&destination);
        }
        state.unacked.remove(&(client_id, id));
    }

    /// Enqueues a message on its destination's inbound queue. Publication to
    /// a destination nobody subscribes to is a no-op. Suspends when the
    /// queue is full; that suspension is the publisher's backpressure.
    pub async fn publish(&self, message: Message) {
        let queue = {
            let state = self.state.lock().unwrap();
            state.queues.get(&message.destination).cloned()
        };
        match queue {
            Some(tx) => {
                if tx.send(message).await.is_err() {
                    debug!("destination closed while publishing; message dropped");
                }
            }
            None => debug!("no subscribers; message dropped"),
        }
    }

    /// Delivers one message to every current subscriber of `destination`
    /// except the sender. Called from the destination's dispatcher task, one
    /// message at a time, which is what preserves per-destination ordering.
    pub(crate) fn fan_out(&self, destination: &str, message: Message) {
        let mut state = self.state.lock().unwrap();
        let state = &mut *state;
        let Some(subs) = state.subscriptions.get(destination) else {
            return;
        };

        let mut snapshot = subs.clone();
        // The sender never hears its own publication. If it holds several
        // subscriptions to this destination only the first match is dropped.
        if let Some(pos) = snapshot.iter().position(|s| s.client_id == message.sender) {
            snapshot.remove(pos);
        }

        for sub in snapshot {
            let message_id = Uuid::new_v4().to_string();
            let frame = message_frame(&sub, &message, &message_id);
            // Record before writing so an immediate ACK finds the entry.
            if sub.ack != AckMode::Auto {
                state
                    .unacked
                    .entry((sub.client_id, sub.id))
                    .or_default()
                    .push_back((message_id, message.clone()));
            }
            if let Some(client) = state.clients.get(&sub.client_id) {
                if client.sender.send(frame).is_err() {
                    debug!(client = sub.client_id, "subscriber gone during fan-out");
                }
            }
        }
    }

    /// Removes delivered messages from the unacked table. For a `client`
    /// mode subscription the removal is cumulative: the named message and
    /// everything delivered before it on that subscription. For
    /// `client-individual` only the named message goes. `NACK` uses the same
    /// bookkeeping (this broker does not redeliver).
    pub fn acknowledge(&self, client_id: u64, message_id: &str) {
        let mut state = self.state.lock().unwrap();
        let state = &mut *state;

        let mut drained = None;
        for (key, queue) in state.unacked.iter_mut() {
            if key.0 != client_id {
                continue;
            }
            let Some(pos) = queue.iter().position(|(id, _)| id == message_id) else {
                continue;
            };
            let mode = state
                .subscriptions
                .values()
                .flatten()
                .find(|s| s.client_id == key.0 && s.id == key.1)
                .map(|s| s.ack)
                .unwrap_or(AckMode::ClientIndividual);
            if mode == AckMode::Client {
                queue.drain(..=pos);
            } else {
                queue.remove(pos);
            }
            if queue.is_empty() {
                drained = Some(*key);
            }
            break;
        }
        if let Some(key) = drained {
            state.unacked.remove(&key);
        }
    }

    pub fn is_registered(&self, client_id: u64) -> bool {
        self.state.lock().unwrap().clients.contains_key(&client_id)
    }

    /// Number of subscriptions currently attached to a destination.
    pub fn subscriber_count(&self, destination: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .get(destination)
            .map_or(0, Vec::len)
    }

    /// Whether the destination currently has a live inbound queue.
    pub fn has_destination(&self, destination: &str) -> bool {
        self.state.lock().unwrap().queues.contains_key(destination)
    }

    /// Number of delivered-but-unacknowledged messages on one subscription.
    pub fn unacked_count(&self, client_id: u64, subscription_id: u64) -> usize {
        self.state
            .lock()
            .unwrap()
            .unacked
            .get(&(client_id, subscription_id))
            .map_or(0, VecDeque::len)
    }
}

/// Builds the `MESSAGE` frame delivered to one subscriber.
fn message_frame(sub: &Subscription, message: &Message, message_id: &str) -> Frame {
    let mut frame = Frame::new(Command::Message)
        .header("subscription", sub.id.to_string())
        .header("destination", sub.destination.as_str());
    if !message.content_type.is_empty() {
        frame = frame.header("content-type", message.content_type.as_str());
    }
    if !message.content.is_empty() {
        frame = frame.header("content-length", message.content.len().to_string());
    }
    frame
        .header("message-id", message_id)
        .body(message.content.clone())
}
