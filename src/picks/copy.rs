//! Canned presentation copy for published picks.
//!
//! Published titles and theses are deliberately vague teasers; the numeric
//! reasoning survives only inside the featured-analysis record. The random
//! source is injected so a seeded deck reproduces the same copy run to run.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::types::RiskLevel;

const CONSERVATIVE_TEASERS: [(&str, &str); 3] = [
    (
        "The banker of the day",
        "Our model flagged this one as close to a sure thing as today gets. The numbers are inside.",
    ),
    (
        "A quiet edge",
        "Nothing flashy here, just a market that has drifted out of line with the data.",
    ),
    (
        "Steady as it comes",
        "Low drama, high confidence. This is the pick we would build a slip around.",
    ),
];

const MODERATE_TEASERS: [(&str, &str); 3] = [
    (
        "Value where the crowd isn't looking",
        "The price says one thing, our model says another. That gap is the whole story.",
    ),
    (
        "A calculated swing",
        "Balanced risk, real upside. The full reasoning is in the featured breakdown.",
    ),
    (
        "The model likes this more than the market",
        "A mid-range price carrying more signal than it should. Worth a closer look.",
    ),
];

const AGGRESSIVE_TEASERS: [(&str, &str); 3] = [
    (
        "The long shot worth a second look",
        "High odds, but the data behind this one is louder than the price suggests.",
    ),
    (
        "For the brave",
        "A swing at a big number. Small stake territory, but the angle is genuine.",
    ),
    (
        "Today's lottery ticket",
        "The kind of price you only take when the model gives you a reason. It did.",
    ),
];

const CONSERVATIVE_ANALYSES: [&str; 3] = [
    "Every quality signal we track points the same way, and the price still clears our value bar.",
    "The market agrees with the model here; we are simply taking the cleanest expression of it.",
    "Short price, but earned. The underlying numbers justify the position comfortably.",
];

const MODERATE_ANALYSES: [&str; 3] = [
    "The model sees more probability here than the price implies. A measured stake is warranted.",
    "Signals lean our way without being conclusive. Classic middle-of-the-card value.",
    "Neither a banker nor a flier. The edge is modest but real, and the price compensates.",
];

const AGGRESSIVE_ANALYSES: [&str; 3] = [
    "An outsider position, taken with eyes open. The payout covers the risk several times over.",
    "The probability is against us, but the price is more against the bookmaker.",
    "A thin edge at a long price. Strictly a small-stakes angle.",
];

const FINAL_READINGS: [&str; 4] = [
    "Stake accordingly and treat this as one leg of a balanced day, not the whole slip.",
    "As always, the model informs; bankroll discipline decides.",
    "We like the position at this price. If the market moves against it, let it go.",
    "One pick, one price, one reason. That is all a good bet needs.",
];

pub struct CopyDeck {
    rng: StdRng,
}

impl CopyDeck {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Published (title, thesis) pair for a pick of the given tier.
    pub fn teaser(&mut self, risk: RiskLevel) -> (String, String) {
        let pool: &[(&str, &str)] = match risk {
            RiskLevel::Conservative => &CONSERVATIVE_TEASERS,
            RiskLevel::Moderate => &MODERATE_TEASERS,
            RiskLevel::Aggressive => &AGGRESSIVE_TEASERS,
        };
        let (title, thesis) = pool.choose(&mut self.rng).copied().unwrap_or(pool[0]);
        (title.to_string(), thesis.to_string())
    }

    pub fn model_analysis(&mut self, risk: RiskLevel) -> &'static str {
        let pool: &[&str] = match risk {
            RiskLevel::Conservative => &CONSERVATIVE_ANALYSES,
            RiskLevel::Moderate => &MODERATE_ANALYSES,
            RiskLevel::Aggressive => &AGGRESSIVE_ANALYSES,
        };
        pool.choose(&mut self.rng).copied().unwrap_or(pool[0])
    }

    pub fn final_reading(&mut self) -> &'static str {
        FINAL_READINGS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(FINAL_READINGS[0])
    }
}

impl Default for CopyDeck {
    fn default() -> Self {
        Self::new()
    }
}
