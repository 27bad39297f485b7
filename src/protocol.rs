use crate::error::PollError;
use crate::types::*;
use crate::visibility::PollView;
use serde::{Deserialize, Serialize};

/// Protocol version announced in the welcome message
pub const PROTOCOL_VERSION: &str = "1.0";

/// Commands a party can send. One canonical shape per command; transport
/// adapters normalize anything else before it reaches the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreatePoll {
        spec: PollSpec,
    },
    JoinPoll {
        poll_id: PollId,
        /// Persistent per-device id, used to restore the caller's own vote
        #[serde(default)]
        voter_id: Option<VoterId>,
    },
    SubmitVote {
        poll_id: PollId,
        voter_id: VoterId,
        #[serde(default)]
        voter_name: String,
        answer: Answer,
    },
    /// Any party may reveal
    RevealPoll {
        poll_id: PollId,
    },
    /// Host only
    EndPoll {
        poll_id: PollId,
    },
    PlayAgain {
        poll_id: PollId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        connection_id: ConnectionId,
        server_now: String,
    },
    PollCreated {
        poll_id: PollId,
    },
    /// Reply to a join, carrying the caller's own vote if any
    PollJoined {
        poll: PollView,
    },
    /// Broadcast to the poll's group after every state change
    PollUpdated {
        poll: PollView,
    },
    VoteAck {
        poll_id: PollId,
    },
    /// Terminal signal; the group is disbanded right after
    PollEnded {
        poll_id: PollId,
    },
    ReplayCreated {
        new_poll_id: PollId,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl From<PollError> for ServerMessage {
    fn from(e: PollError) -> Self {
        ServerMessage::Error {
            code: e.code().to_string(),
            msg: e.to_string(),
        }
    }
}
