//! Externally visible projection of a poll.
//!
//! Every poll leaving the process goes through [`project`], whether it is a
//! broadcast, a join reply or an HTTP query. While a poll is waiting only the
//! set of voter ids is exposed; once revealed, every answer and name is.

use crate::aggregate::{aggregate_poll, PollResults};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// One vote as seen from outside. Answer and name are absent while waiting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteView {
    pub voter_id: VoterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollView {
    pub id: PollId,
    pub host_id: ConnectionId,
    pub host_name: String,
    pub question: String,
    pub question_image: Option<String>,
    pub answer_kind: AnswerKind,
    pub options: Vec<PollOption>,
    pub numeric_range: Option<NumericRange>,
    pub reveal_trigger: RevealTrigger,
    pub status: PollStatus,
    pub created_at: String,
    pub vote_count: usize,
    pub votes: Vec<VoteView>,
    /// The viewer's own vote, so a rejoining client can restore its state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub own_vote: Option<VoteRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<PollResults>,
}

/// Build the projection of `poll` that `viewer` is allowed to see.
///
/// `viewer` is the requesting voter id, if known. It only ever unlocks that
/// voter's own record; other voters stay hidden until reveal.
pub fn project(poll: &Poll, viewer: Option<&str>) -> PollView {
    let revealed = poll.is_revealed();

    let votes = poll
        .votes
        .iter()
        .map(|v| {
            if revealed {
                VoteView {
                    voter_id: v.voter_id.clone(),
                    voter_name: Some(v.voter_name.clone()),
                    answer: Some(v.answer.clone()),
                }
            } else {
                VoteView {
                    voter_id: v.voter_id.clone(),
                    voter_name: None,
                    answer: None,
                }
            }
        })
        .collect();

    let own_vote = viewer.and_then(|id| poll.vote_of(id)).cloned();
    let results = revealed.then(|| aggregate_poll(poll));

    PollView {
        id: poll.id.clone(),
        host_id: poll.host_id.clone(),
        host_name: poll.host_name.clone(),
        question: poll.question.clone(),
        question_image: poll.question_image.clone(),
        answer_kind: poll.answer_kind,
        options: poll.options.clone(),
        numeric_range: poll.numeric_range,
        reveal_trigger: poll.reveal_trigger,
        status: poll.status,
        created_at: poll.created_at.clone(),
        vote_count: poll.votes.len(),
        votes,
        own_vote,
        results,
    }
}
