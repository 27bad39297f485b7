use super::PollStore;
use crate::error::{PollError, PollResult};
use crate::types::*;
use std::collections::HashSet;

/// Random bytes per poll id (hex-encoded to 6 characters)
const POLL_ID_BYTES: usize = 3;

fn generate_poll_id() -> PollId {
    let bytes: [u8; POLL_ID_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Validate and normalize a create request before anything touches the registry
fn validate_spec(spec: PollSpec) -> PollResult<PollSpec> {
    let question = spec.question.trim().to_string();
    if question.is_empty() {
        return Err(PollError::validation("Question cannot be empty"));
    }

    if let RevealTrigger::AfterCount { count } = spec.reveal_trigger {
        if count < 2 {
            return Err(PollError::validation(
                "Reveal count must be at least 2 votes",
            ));
        }
    }

    let mut options = Vec::new();
    let mut numeric_range = None;

    match spec.answer_kind {
        AnswerKind::ChoiceList => {
            let mut seen = HashSet::new();
            for option in spec.options {
                let text = option.text.trim().to_string();
                if text.is_empty() {
                    return Err(PollError::validation("Options cannot be empty"));
                }
                if !seen.insert(text.clone()) {
                    return Err(PollError::validation(format!(
                        "Duplicate option: {}",
                        text
                    )));
                }
                options.push(PollOption {
                    text,
                    image: option.image,
                });
            }
            if options.len() < 2 {
                return Err(PollError::validation(
                    "A choice poll needs at least 2 options",
                ));
            }
        }
        AnswerKind::NumericRange => {
            let range = spec.numeric_range.unwrap_or_default();
            if !range.min.is_finite() || !range.max.is_finite() || !range.step.is_finite() {
                return Err(PollError::validation("Range bounds must be finite numbers"));
            }
            if range.min >= range.max {
                return Err(PollError::validation("Range minimum must be below maximum"));
            }
            if range.step <= 0.0 {
                return Err(PollError::validation("Range step must be positive"));
            }
            numeric_range = Some(range);
        }
        AnswerKind::FreeText => {}
    }

    Ok(PollSpec {
        question,
        question_image: spec.question_image,
        answer_kind: spec.answer_kind,
        options,
        numeric_range,
        reveal_trigger: spec.reveal_trigger,
        host_name: spec.host_name.trim().to_string(),
    })
}

impl PollStore {
    /// Create a new poll hosted by the given connection
    pub async fn create(&self, spec: PollSpec, host_id: &str) -> PollResult<Poll> {
        let spec = validate_spec(spec)?;

        let mut polls = self.polls.write().await;
        let mut id = generate_poll_id();
        while polls.contains_key(&id) {
            tracing::debug!("Poll id {} already live, regenerating", id);
            id = generate_poll_id();
        }

        let poll = Poll {
            id: id.clone(),
            host_id: host_id.to_string(),
            host_name: spec.host_name,
            question: spec.question,
            question_image: spec.question_image,
            answer_kind: spec.answer_kind,
            options: spec.options,
            numeric_range: spec.numeric_range,
            reveal_trigger: spec.reveal_trigger,
            votes: Vec::new(),
            status: PollStatus::Waiting,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        polls.insert(id, poll.clone());
        Ok(poll)
    }

    pub async fn get(&self, poll_id: &str) -> Option<Poll> {
        self.polls.read().await.get(poll_id).cloned()
    }

    /// Force a poll into the revealed state (idempotent)
    pub async fn reveal(&self, poll_id: &str) -> PollResult<Poll> {
        let mut polls = self.polls.write().await;
        let poll = polls
            .get_mut(poll_id)
            .ok_or_else(|| PollError::NotFound(poll_id.to_string()))?;
        poll.status = PollStatus::Revealed;
        Ok(poll.clone())
    }

    /// Delete a poll, returning the removed record if it existed
    pub async fn remove(&self, poll_id: &str) -> Option<Poll> {
        self.polls.write().await.remove(poll_id)
    }

    /// Start a fresh round with the same question under a new id
    pub async fn clone_poll(&self, poll_id: &str) -> PollResult<PollId> {
        let mut polls = self.polls.write().await;
        let original = polls
            .get(poll_id)
            .ok_or_else(|| PollError::NotFound(poll_id.to_string()))?;

        let mut id = generate_poll_id();
        while polls.contains_key(&id) {
            id = generate_poll_id();
        }

        let poll = Poll {
            id: id.clone(),
            votes: Vec::new(),
            status: PollStatus::Waiting,
            created_at: chrono::Utc::now().to_rfc3339(),
            ..original.clone()
        };

        polls.insert(id.clone(), poll);
        Ok(id)
    }
}
