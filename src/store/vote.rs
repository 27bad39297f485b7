use super::PollStore;
use crate::error::{PollError, PollResult};
use crate::types::*;

/// Check an answer against the poll's answer kind
fn validate_answer(poll: &Poll, answer: &Answer) -> PollResult<()> {
    match poll.answer_kind {
        AnswerKind::ChoiceList => {
            let text = answer
                .as_text()
                .ok_or_else(|| PollError::validation("Choice answers must be text"))?;
            if !poll.options.iter().any(|o| o.text == text) {
                return Err(PollError::validation(format!(
                    "'{}' is not one of the poll options",
                    text
                )));
            }
        }
        AnswerKind::NumericRange => {
            let value = answer
                .as_number()
                .filter(|n| n.is_finite())
                .ok_or_else(|| PollError::validation("Range answers must be numbers"))?;
            let range = poll.numeric_range.unwrap_or_default();
            if !range.contains(value) {
                return Err(PollError::validation(format!(
                    "{} is outside {}..={}",
                    value, range.min, range.max
                )));
            }
            let steps = (value - range.min) / range.step;
            if (steps - steps.round()).abs() > 1e-9 {
                return Err(PollError::validation(format!(
                    "{} is not on a step of {} from {}",
                    value, range.step, range.min
                )));
            }
        }
        AnswerKind::FreeText => {
            let text = answer
                .as_text()
                .ok_or_else(|| PollError::validation("Text answers must be text"))?;
            if text.trim().is_empty() {
                return Err(PollError::validation("Answer cannot be empty"));
            }
        }
    }
    Ok(())
}

/// Apply the automatic reveal rule after a vote landed
fn evaluate_reveal_trigger(poll: &mut Poll) {
    if let RevealTrigger::AfterCount { count } = poll.reveal_trigger {
        if poll.votes.len() >= count && poll.status == PollStatus::Waiting {
            tracing::info!(
                "Poll {} reached {} votes, revealing",
                poll.id,
                poll.votes.len()
            );
            poll.status = PollStatus::Revealed;
        }
    }
}

impl PollStore {
    /// Record a vote, replacing any earlier vote from the same voter in place.
    ///
    /// Revealed polls reject the vote without mutation.
    pub async fn upsert_vote(
        &self,
        poll_id: &str,
        voter_id: &str,
        voter_name: &str,
        answer: Answer,
    ) -> PollResult<Poll> {
        let mut polls = self.polls.write().await;
        let poll = polls
            .get_mut(poll_id)
            .ok_or_else(|| PollError::NotFound(poll_id.to_string()))?;

        if poll.is_revealed() {
            return Err(PollError::Closed(poll_id.to_string()));
        }
        if voter_id.trim().is_empty() {
            return Err(PollError::validation("Voter id cannot be empty"));
        }
        validate_answer(poll, &answer)?;

        let voter_name = match voter_name.trim() {
            "" => ANONYMOUS_VOTER.to_string(),
            name => name.to_string(),
        };
        let record = VoteRecord {
            voter_id: voter_id.to_string(),
            voter_name,
            answer,
        };

        match poll.votes.iter_mut().find(|v| v.voter_id == voter_id) {
            Some(existing) => *existing = record,
            None => poll.votes.push(record),
        }

        evaluate_reveal_trigger(poll);
        Ok(poll.clone())
    }
}
