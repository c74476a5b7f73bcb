// ============================================================
// Layer 3 - Dialogue Domain Types
// ============================================================
// A dialogue is an ordered list of utterances, and an
// utterance is an ordered list of token indices produced by
// some external tokenizer.
//
// Text form used on the command line:
//   "3 5 7 | 2 4 | 9"
//     turn 1: [3, 5, 7]
//     turn 2: [2, 4]
//     turn 3: [9]
// Tokens may be separated by spaces or commas.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DialogueParseError {
    #[error("turn {turn} is empty")]
    EmptyTurn { turn: usize },

    #[error("'{token}' in turn {turn} is not a token index")]
    BadToken { turn: usize, token: String },

    #[error("dialogue has no turns")]
    NoTurns,
}

/// One turn of a dialogue as token indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub tokens: Vec<usize>,
}

impl Utterance {
    pub fn new(tokens: Vec<usize>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A multi-turn dialogue, oldest turn first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    pub turns: Vec<Utterance>,
}

impl Dialogue {
    pub fn new(turns: Vec<Utterance>) -> Self {
        Self { turns }
    }

    /// Largest token index anywhere in the dialogue, if any.
    pub fn max_token(&self) -> Option<usize> {
        self.turns.iter().flat_map(|u| u.tokens.iter().copied()).max()
    }
}

impl FromStr for Dialogue {
    type Err = DialogueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(DialogueParseError::NoTurns);
        }

        let turns = s
            .split('|')
            .enumerate()
            .map(|(i, turn)| -> Result<Utterance, DialogueParseError> {
                let turn_no = i + 1;
                let tokens = turn
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|t| !t.is_empty())
                    .map(|t| {
                        t.parse::<usize>().map_err(|_| DialogueParseError::BadToken {
                            turn:  turn_no,
                            token: t.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if tokens.is_empty() {
                    return Err(DialogueParseError::EmptyTurn { turn: turn_no });
                }
                Ok(Utterance::new(tokens))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Dialogue::new(turns))
    }
}

impl fmt::Display for Dialogue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .turns
            .iter()
            .map(|u| {
                u.tokens
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        write!(f, "{}", rendered.join(" | "))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_turns_and_separators() {
        let d: Dialogue = "3 5 7 | 2,4 |9".parse().unwrap();
        assert_eq!(d.turns.len(), 3);
        assert_eq!(d.turns[0].tokens, vec![3, 5, 7]);
        assert_eq!(d.turns[1].tokens, vec![2, 4]);
        assert_eq!(d.turns[2].tokens, vec![9]);
        assert_eq!(d.max_token(), Some(9));
    }

    #[test]
    fn test_rejects_empty_turn() {
        let err = "1 2 || 3".parse::<Dialogue>().unwrap_err();
        assert_eq!(err, DialogueParseError::EmptyTurn { turn: 2 });
    }

    #[test]
    fn test_rejects_non_numeric_token() {
        let err = "1 two".parse::<Dialogue>().unwrap_err();
        assert_eq!(
            err,
            DialogueParseError::BadToken { turn: 1, token: "two".into() }
        );
    }

    #[test]
    fn test_rejects_blank_input() {
        assert_eq!("   ".parse::<Dialogue>(), Err(DialogueParseError::NoTurns));
    }

    #[test]
    fn test_display_matches_input_form() {
        let d: Dialogue = "1,2|3".parse().unwrap();
        assert_eq!(d.to_string(), "1 2 | 3");
    }
}
