//! Result aggregation per answer kind.
//!
//! Pure functions over a vote list. Picking one winner out of a tie is left to
//! the caller; the full winner set is always exposed.

use crate::types::*;
use serde::{Deserialize, Serialize};

/// Count for one choice, with the names of the voters who picked it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tally {
    pub answer: String,
    pub count: u32,
    pub voters: Vec<String>,
}

/// A single voter's contribution, in arrival order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultEntry {
    pub voter_name: String,
    pub answer: Answer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PollResults {
    ChoiceList {
        tallies: Vec<Tally>,
        winners: Vec<String>,
        tie: bool,
        total_votes: u32,
    },
    NumericRange {
        /// None when nobody voted
        average: Option<f64>,
        count: u32,
        values: Vec<ResultEntry>,
    },
    FreeText {
        entries: Vec<ResultEntry>,
    },
}

impl PollResults {
    pub fn winners(&self) -> &[String] {
        match self {
            PollResults::ChoiceList { winners, .. } => winners,
            _ => &[],
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, PollResults::ChoiceList { tie: true, .. })
    }
}

pub fn aggregate(kind: AnswerKind, options: &[PollOption], votes: &[VoteRecord]) -> PollResults {
    match kind {
        AnswerKind::ChoiceList => tally_choices(options, votes),
        AnswerKind::NumericRange => average_numbers(votes),
        AnswerKind::FreeText => PollResults::FreeText {
            entries: entries(votes),
        },
    }
}

/// Aggregate a poll record using its own kind and options
pub fn aggregate_poll(poll: &Poll) -> PollResults {
    aggregate(poll.answer_kind, &poll.options, &poll.votes)
}

fn tally_choices(options: &[PollOption], votes: &[VoteRecord]) -> PollResults {
    let mut tallies: Vec<Tally> = options
        .iter()
        .map(|o| Tally {
            answer: o.text.clone(),
            count: 0,
            voters: Vec::new(),
        })
        .collect();

    for vote in votes {
        let label = vote.answer.label();
        // Answers outside the option list get their own bucket
        let idx = match tallies.iter().position(|t| t.answer == label) {
            Some(idx) => idx,
            None => {
                tallies.push(Tally {
                    answer: label,
                    count: 0,
                    voters: Vec::new(),
                });
                tallies.len() - 1
            }
        };
        tallies[idx].count += 1;
        tallies[idx].voters.push(vote.voter_name.clone());
    }

    let max = tallies.iter().map(|t| t.count).max().unwrap_or(0);
    let winners: Vec<String> = if max == 0 {
        Vec::new()
    } else {
        tallies
            .iter()
            .filter(|t| t.count == max)
            .map(|t| t.answer.clone())
            .collect()
    };

    PollResults::ChoiceList {
        tie: winners.len() > 1,
        winners,
        tallies,
        total_votes: votes.len() as u32,
    }
}

fn average_numbers(votes: &[VoteRecord]) -> PollResults {
    let numbers: Vec<f64> = votes.iter().filter_map(|v| v.answer.as_number()).collect();

    let average = if numbers.is_empty() {
        None
    } else {
        let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
        Some(round_one_decimal(mean))
    };

    PollResults::NumericRange {
        average,
        count: numbers.len() as u32,
        values: entries(votes),
    }
}

fn entries(votes: &[VoteRecord]) -> Vec<ResultEntry> {
    votes
        .iter()
        .map(|v| ResultEntry {
            voter_name: v.voter_name.clone(),
            answer: v.answer.clone(),
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
