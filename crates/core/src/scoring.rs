//! Score percentage and feedback classification.

/// Percentage of `score` over `total`, rounded half up. Zero when `total` is zero.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score.min(total));
    let total = u64::from(total);
    // round(score * 100 / total) in integers: floor((200 * score + total) / (2 * total))
    let pct = (200 * score + total) / (2 * total);
    u8::try_from(pct.min(100)).unwrap_or(100)
}

//
// ─── TIERS ─────────────────────────────────────────────────────────────────────
//

/// Feedback bucket for a final percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreTier {
    Outstanding,
    Excellent,
    Good,
    Fair,
    Passing,
    NeedsPractice,
}

impl ScoreTier {
    /// Classify a percentage. Lower bounds are inclusive: 90 is `Outstanding`.
    #[must_use]
    pub fn classify(percentage: u8) -> Self {
        match percentage {
            90.. => ScoreTier::Outstanding,
            80..=89 => ScoreTier::Excellent,
            70..=79 => ScoreTier::Good,
            60..=69 => ScoreTier::Fair,
            50..=59 => ScoreTier::Passing,
            _ => ScoreTier::NeedsPractice,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ScoreTier::Outstanding => "Outstanding! You're a quiz master!",
            ScoreTier::Excellent => "Excellent work! Great knowledge!",
            ScoreTier::Good => "Good job! You did well!",
            ScoreTier::Fair => "Not bad! Room for improvement!",
            ScoreTier::Passing => "Keep studying! You can do better!",
            ScoreTier::NeedsPractice => "Don't give up! Practice makes perfect!",
        }
    }
}

/// Coarse three-way band presenters use for colouring a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    #[must_use]
    pub fn classify(percentage: u8) -> Self {
        match percentage {
            80.. => ScoreBand::High,
            60..=79 => ScoreBand::Medium,
            _ => ScoreBand::Low,
        }
    }
}

/// Final score together with its derived classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreReport {
    pub score: u32,
    pub total: u32,
    pub percentage: u8,
    pub tier: ScoreTier,
    pub band: ScoreBand,
}

impl ScoreReport {
    #[must_use]
    pub fn new(score: u32, total: u32) -> Self {
        let percentage = percentage(score, total);
        Self {
            score,
            total,
            percentage,
            tier: ScoreTier::classify(percentage),
            band: ScoreBand::classify(percentage),
        }
    }
}
