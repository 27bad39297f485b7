//! Command dispatch
//!
//! Each handler runs with the session lock held, so a store mutation and the
//! broadcast that follows it form one step relative to other commands.
//! Failures are replied to the requesting party only and never broadcast.

use super::{SessionBroker, Sessions};
use crate::error::PollError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::types::*;
use crate::visibility::project;

/// Handle one command from `conn_id` and return the direct reply, if any
pub async fn handle_message(
    msg: ClientMessage,
    conn_id: &str,
    broker: &SessionBroker,
) -> Option<ServerMessage> {
    let mut sessions = broker.sessions.lock().await;

    match msg {
        ClientMessage::CreatePoll { spec } => {
            handle_create_poll(broker, &mut sessions, conn_id, spec).await
        }

        ClientMessage::JoinPoll { poll_id, voter_id } => {
            handle_join_poll(broker, &mut sessions, conn_id, poll_id, voter_id).await
        }

        ClientMessage::SubmitVote {
            poll_id,
            voter_id,
            voter_name,
            answer,
        } => handle_submit_vote(broker, &sessions, poll_id, voter_id, voter_name, answer).await,

        ClientMessage::RevealPoll { poll_id } => {
            handle_reveal_poll(broker, &sessions, poll_id).await
        }

        ClientMessage::EndPoll { poll_id } => {
            handle_end_poll(broker, &mut sessions, conn_id, poll_id).await
        }

        ClientMessage::PlayAgain { poll_id } => handle_play_again(broker, poll_id).await,
    }
}

async fn handle_create_poll(
    broker: &SessionBroker,
    sessions: &mut Sessions,
    conn_id: &str,
    spec: PollSpec,
) -> Option<ServerMessage> {
    tracing::info!(
        "Creating poll: question={:?}, kind={:?}, image={}",
        spec.question,
        spec.answer_kind,
        spec.question_image.is_some()
    );

    match broker.store.create(spec, conn_id).await {
        Ok(poll) => {
            // The creator hosts the poll and listens to it right away
            sessions.join(conn_id, &poll.id);
            tracing::info!("Poll {} created by {}", poll.id, conn_id);
            Some(ServerMessage::PollCreated { poll_id: poll.id })
        }
        Err(e) => {
            tracing::warn!("Poll creation rejected: {}", e);
            Some(e.into())
        }
    }
}

async fn handle_join_poll(
    broker: &SessionBroker,
    sessions: &mut Sessions,
    conn_id: &str,
    poll_id: PollId,
    voter_id: Option<VoterId>,
) -> Option<ServerMessage> {
    tracing::info!("Join request: poll={}, voter={:?}", poll_id, voter_id);

    match broker.store.get(&poll_id).await {
        Some(poll) => {
            sessions.join(conn_id, &poll.id);
            Some(ServerMessage::PollJoined {
                poll: project(&poll, voter_id.as_deref()),
            })
        }
        None => {
            tracing::warn!("Join for unknown poll {}", poll_id);
            Some(PollError::NotFound(poll_id).into())
        }
    }
}

async fn handle_submit_vote(
    broker: &SessionBroker,
    sessions: &Sessions,
    poll_id: PollId,
    voter_id: VoterId,
    voter_name: String,
    answer: Answer,
) -> Option<ServerMessage> {
    match broker
        .store
        .upsert_vote(&poll_id, &voter_id, &voter_name, answer)
        .await
    {
        Ok(poll) => {
            tracing::debug!(
                "Vote recorded: poll={}, voter={}, total={}",
                poll_id,
                voter_id,
                poll.votes.len()
            );
            sessions.broadcast(
                &poll_id,
                &ServerMessage::PollUpdated {
                    poll: project(&poll, None),
                },
            );
            Some(ServerMessage::VoteAck { poll_id })
        }
        Err(e) => {
            tracing::warn!("Vote dropped: poll={}, voter={}: {}", poll_id, voter_id, e);
            Some(e.into())
        }
    }
}

async fn handle_reveal_poll(
    broker: &SessionBroker,
    sessions: &Sessions,
    poll_id: PollId,
) -> Option<ServerMessage> {
    match broker.store.reveal(&poll_id).await {
        Ok(poll) => {
            tracing::info!("Poll {} revealed", poll_id);
            sessions.broadcast(
                &poll_id,
                &ServerMessage::PollUpdated {
                    poll: project(&poll, None),
                },
            );
            None
        }
        Err(e) => {
            tracing::warn!("Reveal ignored: {}", e);
            Some(e.into())
        }
    }
}

async fn handle_end_poll(
    broker: &SessionBroker,
    sessions: &mut Sessions,
    conn_id: &str,
    poll_id: PollId,
) -> Option<ServerMessage> {
    let Some(poll) = broker.store.get(&poll_id).await else {
        tracing::warn!("End ignored: poll {} not found", poll_id);
        return Some(PollError::NotFound(poll_id).into());
    };

    if poll.host_id != conn_id {
        tracing::warn!("End ignored: {} is not the host of poll {}", conn_id, poll_id);
        return Some(PollError::Unauthorized(poll_id).into());
    }

    broker.store.remove(&poll_id).await;

    let ended = ServerMessage::PollEnded {
        poll_id: poll_id.clone(),
    };
    let host_in_room = sessions.is_member(conn_id, &poll_id);
    sessions.broadcast(&poll_id, &ended);
    let evicted = sessions.disband(&poll_id);
    tracing::info!("Poll {} ended, {} parties evicted", poll_id, evicted);

    // A host listening elsewhere still learns the poll is gone
    (!host_in_room).then_some(ended)
}

async fn handle_play_again(broker: &SessionBroker, poll_id: PollId) -> Option<ServerMessage> {
    match broker.store.clone_poll(&poll_id).await {
        Ok(new_poll_id) => {
            tracing::info!("Poll {} replayed as {}", poll_id, new_poll_id);
            Some(ServerMessage::ReplayCreated { new_poll_id })
        }
        Err(e) => {
            tracing::warn!("Play again ignored: {}", e);
            Some(e.into())
        }
    }
}
