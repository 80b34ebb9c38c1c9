//! Feedback hook for the Chess Master engine.
//!
//! The engine does not evaluate positions. It only forwards feedback
//! requests to a [`FeedbackProvider`]. The bundled [`CannedFeedback`]
//! provider picks one of five fixed remarks uniformly at random and
//! ignores both the position and the hint; a real evaluator can be
//! plugged in behind the same trait without touching the rules.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::types::Position;

/// Source of free-text commentary on a position.
pub trait FeedbackProvider: Send {
    /// Returns a remark about `position`, optionally guided by a user `hint`.
    fn request_feedback(&mut self, position: &Position, hint: Option<&str>) -> String;
}

/// The fixed remark catalog used by [`CannedFeedback`].
pub const CANNED_REMARKS: [&str; 5] = [
    "White seems to have a slight advantage in piece development.",
    "Black's pawn structure looks solid, providing good control of the center.",
    "Both players should focus on developing their minor pieces and castling soon.",
    "The current position looks fairly balanced. Look for opportunities to create weaknesses in your opponent's position.",
    "Consider controlling the center with your pawns and pieces to gain more space on the board.",
];

/// Picks a remark from [`CANNED_REMARKS`] uniformly at random.
#[derive(Debug)]
pub struct CannedFeedback {
    rng: StdRng,
}

impl Default for CannedFeedback {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl CannedFeedback {
    /// Deterministic provider, for reproducible sessions and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl FeedbackProvider for CannedFeedback {
    fn request_feedback(&mut self, _position: &Position, hint: Option<&str>) -> String {
        if let Some(hint) = hint {
            log::debug!("Ignoring feedback hint ({} chars)", hint.len());
        }
        CANNED_REMARKS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default()
            .to_string()
    }
}
