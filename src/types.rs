use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type PollId = String;
pub type VoterId = String;
pub type ConnectionId = String;

/// Display name used when a voter submits a blank name
pub const ANONYMOUS_VOTER: &str = "Anonymous";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    ChoiceList,
    NumericRange,
    FreeText,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Waiting,
    Revealed,
}

/// When answers become visible to everyone in the poll
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RevealTrigger {
    Manual,
    AfterCount { count: usize },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for NumericRange {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 10.0,
            step: 1.0,
        }
    }
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A single entry of a choice-list poll
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollOption {
    pub text: String,
    /// Opaque image blob reference (usually a data URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A submitted answer: slider polls send numbers, everything else sends text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Answer {
    Number(f64),
    Text(String),
}

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            Answer::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Number(n) => Some(*n),
            Answer::Text(_) => None,
        }
    }

    /// Label used when tallying; numbers fall back to their literal form
    pub fn label(&self) -> String {
        match self {
            Answer::Text(s) => s.clone(),
            Answer::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteRecord {
    pub voter_id: VoterId,
    pub voter_name: String,
    pub answer: Answer,
}

/// Client-supplied description of a new poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSpec {
    pub question: String,
    #[serde(default)]
    pub question_image: Option<String>,
    pub answer_kind: AnswerKind,
    #[serde(default)]
    pub options: Vec<PollOption>,
    #[serde(default)]
    pub numeric_range: Option<NumericRange>,
    pub reveal_trigger: RevealTrigger,
    #[serde(default)]
    pub host_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub host_id: ConnectionId,
    pub host_name: String,
    pub question: String,
    pub question_image: Option<String>,
    pub answer_kind: AnswerKind,
    pub options: Vec<PollOption>,
    pub numeric_range: Option<NumericRange>,
    pub reveal_trigger: RevealTrigger,
    /// One record per voter, in order of first arrival
    pub votes: Vec<VoteRecord>,
    pub status: PollStatus,
    pub created_at: String,
}

impl Poll {
    pub fn vote_of(&self, voter_id: &str) -> Option<&VoteRecord> {
        self.votes.iter().find(|v| v.voter_id == voter_id)
    }

    pub fn is_revealed(&self) -> bool {
        self.status == PollStatus::Revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_trigger_wire_shape() {
        let json = serde_json::to_value(RevealTrigger::AfterCount { count: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "after_count", "count": 3}));

        let manual: RevealTrigger = serde_json::from_str(r#"{"type":"manual"}"#).unwrap();
        assert_eq!(manual, RevealTrigger::Manual);
    }

    #[test]
    fn test_answer_untagged() {
        let n: Answer = serde_json::from_str("7.5").unwrap();
        assert_eq!(n.as_number(), Some(7.5));

        let t: Answer = serde_json::from_str(r#""Pizza""#).unwrap();
        assert_eq!(t.as_text(), Some("Pizza"));
        assert_eq!(t.label(), "Pizza");
    }

    #[test]
    fn test_spec_defaults() {
        let spec: PollSpec = serde_json::from_str(
            r#"{"question":"How spicy?","answer_kind":"free_text","reveal_trigger":{"type":"manual"}}"#,
        )
        .unwrap();
        assert!(spec.options.is_empty());
        assert!(spec.numeric_range.is_none());
        assert!(spec.host_name.is_empty());
    }
}
