//! Session broker: routes commands from connected parties to the poll store
//! and fans state changes out to everyone in the poll's group.
//!
//! Connections are delivery channels only. Voter identity travels inside the
//! messages; hosting is tied to the connection that created the poll.

pub mod handlers;

use crate::protocol::ServerMessage;
use crate::store::PollStore;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use tokio::sync::{mpsc, Mutex};

pub use handlers::handle_message;

/// A connected party and where it is listening
struct Party {
    outbox: mpsc::UnboundedSender<ServerMessage>,
    joined: Option<PollId>,
}

/// Parties and room membership. Guarded by one lock so that a store
/// mutation and its broadcast are observed in the same order by every member.
#[derive(Default)]
pub(crate) struct Sessions {
    parties: HashMap<ConnectionId, Party>,
    rooms: HashMap<PollId, HashSet<ConnectionId>>,
}

impl Sessions {
    /// Move a party into a poll's group, leaving any previous group
    pub(crate) fn join(&mut self, conn_id: &str, poll_id: &str) {
        self.leave(conn_id);
        if let Some(party) = self.parties.get_mut(conn_id) {
            party.joined = Some(poll_id.to_string());
            self.rooms
                .entry(poll_id.to_string())
                .or_default()
                .insert(conn_id.to_string());
        }
    }

    pub(crate) fn leave(&mut self, conn_id: &str) {
        let Some(poll_id) = self
            .parties
            .get_mut(conn_id)
            .and_then(|party| party.joined.take())
        else {
            return;
        };
        if let Some(room) = self.rooms.get_mut(&poll_id) {
            room.remove(conn_id);
            if room.is_empty() {
                self.rooms.remove(&poll_id);
            }
        }
    }

    pub(crate) fn is_member(&self, conn_id: &str, poll_id: &str) -> bool {
        self.rooms
            .get(poll_id)
            .is_some_and(|room| room.contains(conn_id))
    }

    /// Send a message to every member of a poll's group
    pub(crate) fn broadcast(&self, poll_id: &str, msg: &ServerMessage) {
        let Some(room) = self.rooms.get(poll_id) else {
            return;
        };
        for conn_id in room {
            if let Some(party) = self.parties.get(conn_id) {
                // A closed outbox means the connection is on its way out
                let _ = party.outbox.send(msg.clone());
            }
        }
    }

    /// Drop a poll's group entirely, returning how many parties were evicted
    pub(crate) fn disband(&mut self, poll_id: &str) -> usize {
        let Some(room) = self.rooms.remove(poll_id) else {
            return 0;
        };
        for conn_id in &room {
            if let Some(party) = self.parties.get_mut(conn_id) {
                party.joined = None;
            }
        }
        room.len()
    }
}

pub struct SessionBroker {
    pub(crate) store: PollStore,
    pub(crate) sessions: Mutex<Sessions>,
}

impl SessionBroker {
    pub fn new(store: PollStore) -> Self {
        Self {
            store,
            sessions: Mutex::new(Sessions::default()),
        }
    }

    pub fn store(&self) -> &PollStore {
        &self.store
    }

    /// Register a new connection. Everything addressed to it arrives on the
    /// returned receiver.
    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerMessage>) {
        let conn_id = ulid::Ulid::new().to_string();
        let (tx, rx) = mpsc::unbounded_channel();

        self.sessions.lock().await.parties.insert(
            conn_id.clone(),
            Party {
                outbox: tx,
                joined: None,
            },
        );
        tracing::debug!("Connection {} registered", conn_id);
        (conn_id, rx)
    }

    /// Forget a connection. Votes are keyed by voter id and stay put.
    pub async fn disconnect(&self, conn_id: &str) {
        let mut sessions = self.sessions.lock().await;
        sessions.leave(conn_id);
        sessions.parties.remove(conn_id);
        tracing::debug!("Connection {} removed", conn_id);
    }

    /// The poll a connection is currently listening to
    pub async fn joined_poll(&self, conn_id: &str) -> Option<PollId> {
        self.sessions
            .lock()
            .await
            .parties
            .get(conn_id)
            .and_then(|party| party.joined.clone())
    }

    /// Number of parties in a poll's group
    pub async fn member_count(&self, poll_id: &str) -> usize {
        self.sessions
            .lock()
            .await
            .rooms
            .get(poll_id)
            .map_or(0, |room| room.len())
    }

    pub async fn connection_count(&self) -> usize {
        self.sessions.lock().await.parties.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let broker = SessionBroker::new(PollStore::new());
        let (a, _rx_a) = broker.connect().await;
        let (b, _rx_b) = broker.connect().await;

        assert_ne!(a, b);
        assert_eq!(broker.connection_count().await, 2);

        broker.disconnect(&a).await;
        assert_eq!(broker.connection_count().await, 1);
        assert!(broker.joined_poll(&a).await.is_none());
    }

    #[tokio::test]
    async fn test_join_moves_between_rooms() {
        let broker = SessionBroker::new(PollStore::new());
        let (conn, _rx) = broker.connect().await;

        broker.sessions.lock().await.join(&conn, "aaaaaa");
        assert_eq!(broker.member_count("aaaaaa").await, 1);

        broker.sessions.lock().await.join(&conn, "bbbbbb");
        assert_eq!(broker.member_count("aaaaaa").await, 0);
        assert_eq!(broker.member_count("bbbbbb").await, 1);
        assert_eq!(broker.joined_poll(&conn).await.as_deref(), Some("bbbbbb"));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_only_the_room() {
        let broker = SessionBroker::new(PollStore::new());
        let (a, mut rx_a) = broker.connect().await;
        let (b, mut rx_b) = broker.connect().await;

        {
            let mut sessions = broker.sessions.lock().await;
            sessions.join(&a, "aaaaaa");
            sessions.join(&b, "bbbbbb");
            sessions.broadcast(
                "aaaaaa",
                &ServerMessage::PollEnded {
                    poll_id: "aaaaaa".to_string(),
                },
            );
        }

        assert!(matches!(
            rx_a.try_recv(),
            Ok(ServerMessage::PollEnded { .. })
        ));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_leaves_room() {
        let broker = SessionBroker::new(PollStore::new());
        let (conn, _rx) = broker.connect().await;
        broker.sessions.lock().await.join(&conn, "aaaaaa");

        broker.disconnect(&conn).await;
        assert_eq!(broker.member_count("aaaaaa").await, 0);
    }

    #[tokio::test]
    async fn test_disband_evicts_everyone() {
        let broker = SessionBroker::new(PollStore::new());
        let (a, _rx_a) = broker.connect().await;
        let (b, _rx_b) = broker.connect().await;

        let evicted = {
            let mut sessions = broker.sessions.lock().await;
            sessions.join(&a, "aaaaaa");
            sessions.join(&b, "aaaaaa");
            sessions.disband("aaaaaa")
        };

        assert_eq!(evicted, 2);
        assert!(broker.joined_poll(&a).await.is_none());
        assert!(broker.joined_poll(&b).await.is_none());
        assert_eq!(broker.member_count("aaaaaa").await, 0);
    }
}
