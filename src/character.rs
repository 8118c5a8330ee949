//! A named player: personality traits plus rating, record and opening taste.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::learning::{unix_timestamp, GameOutcome};
use crate::personality::{Personality, PlayingStyle};
use crate::quality::MoveQuality;

pub const DEFAULT_RATING: i32 = 1000;
const RATING_K_FACTOR: f32 = 32.0;

const BRILLIANT_TACTICAL_NUDGE: f32 = 0.01;
const MISTAKE_PATIENCE_NUDGE: f32 = 0.01;
const BLUNDER_RISK_DROP: f32 = 0.02;

const OPENING_BASELINE: f32 = 0.5;
const OPENING_SUCCESS_STEP: f32 = 0.05;
const OPENING_FAILURE_STEP: f32 = 0.03;
const FAVORITE_OPENINGS_LIMIT: usize = 5;

const ACCURACY_SMOOTHING: f32 = 0.9;

/// Lifetime results and move-quality tallies of a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub brilliant_moves: u32,
    pub good_moves: u32,
    pub mistakes: u32,
    pub blunders: u32,
    /// Smoothed review accuracy, in percent.
    pub average_accuracy: f32,
}

impl PerformanceMetrics {
    /// Win percentage over all recorded games.
    pub fn win_rate(&self) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins as f32 / self.games as f32 * 100.0
    }
}

/// A persistent, evolving player identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default = "default_rating")]
    pub rating: i32,
    #[serde(default)]
    pub metrics: PerformanceMetrics,
    #[serde(default)]
    pub opening_preferences: HashMap<String, f32>,
    #[serde(default)]
    pub favorite_openings: Vec<String>,
    #[serde(default)]
    pub move_patterns: HashMap<String, u32>,
    #[serde(default = "unix_timestamp")]
    pub created_at: u64,
    #[serde(default = "unix_timestamp")]
    pub updated_at: u64,
}

fn default_rating() -> i32 {
    DEFAULT_RATING
}

impl Character {
    pub fn new(name: &str) -> Self {
        let now = unix_timestamp();
        Self {
            name: name.to_string(),
            personality: Personality::neutral(),
            rating: DEFAULT_RATING,
            metrics: PerformanceMetrics::default(),
            opening_preferences: HashMap::new(),
            favorite_openings: Vec::new(),
            move_patterns: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality.clamped();
        self
    }

    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = rating;
        self
    }

    pub fn style(&self) -> PlayingStyle {
        self.personality.style()
    }

    /// Rating band label, from the standard ladder.
    pub fn strength_level(&self) -> &'static str {
        match self.rating {
            r if r >= 2400 => "Grandmaster",
            r if r >= 2200 => "International Master",
            r if r >= 2000 => "Expert",
            r if r >= 1800 => "Advanced",
            r if r >= 1600 => "Intermediate",
            r if r >= 1400 => "Developing",
            r if r >= 1200 => "Beginner",
            _ => "Novice",
        }
    }

    /// Fold one finished game into the rating and the score sheet.
    ///
    /// Uses the logistic expected score with a fixed K-factor; the delta is
    /// truncated toward zero before it is applied.
    pub fn update_rating(&mut self, opponent_rating: i32, outcome: GameOutcome) {
        let exponent = (opponent_rating - self.rating) as f32 / 400.0;
        let expected = 1.0 / (1.0 + 10f32.powf(exponent));
        let delta = RATING_K_FACTOR * (outcome.score() - expected);
        self.rating += delta as i32;

        self.metrics.games += 1;
        match outcome {
            GameOutcome::Win => self.metrics.wins += 1,
            GameOutcome::Draw => self.metrics.draws += 1,
            GameOutcome::Loss => self.metrics.losses += 1,
        }
        self.touch();
    }

    /// Track a played move: frequency, quality tallies, and the small trait
    /// drifts that come with standout moves.
    pub fn observe_move(&mut self, move_token: &str, quality: MoveQuality) {
        *self.move_patterns.entry(move_token.to_string()).or_insert(0) += 1;

        match quality {
            MoveQuality::Brilliant => {
                self.metrics.brilliant_moves += 1;
                self.personality.tactical += BRILLIANT_TACTICAL_NUDGE;
            }
            MoveQuality::Good => self.metrics.good_moves += 1,
            MoveQuality::Mistake => {
                self.metrics.mistakes += 1;
                self.personality.patience += MISTAKE_PATIENCE_NUDGE;
            }
            MoveQuality::Blunder => {
                self.metrics.blunders += 1;
                self.personality.risk_taking -= BLUNDER_RISK_DROP;
            }
            MoveQuality::Normal | MoveQuality::Inaccuracy => {}
        }
        self.personality = self.personality.clamped();
        self.touch();
    }

    /// Shift the taste for an opening and refresh the favorites list.
    /// Unseen openings start from a neutral 0.5.
    pub fn record_opening(&mut self, opening: &str, success: bool) {
        let preference = self
            .opening_preferences
            .entry(opening.to_string())
            .or_insert(OPENING_BASELINE);
        if success {
            *preference += OPENING_SUCCESS_STEP;
        } else {
            *preference -= OPENING_FAILURE_STEP;
        }
        *preference = preference.clamp(0.0, 1.0);

        let mut ranked: Vec<(&String, &f32)> = self.opening_preferences.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        self.favorite_openings = ranked
            .into_iter()
            .take(FAVORITE_OPENINGS_LIMIT)
            .map(|(name, _)| name.clone())
            .collect();
        self.touch();
    }

    /// Blend a reviewed game's accuracy (percent) into the running average.
    pub fn record_accuracy(&mut self, accuracy: f32) {
        if self.metrics.average_accuracy == 0.0 {
            self.metrics.average_accuracy = accuracy;
        } else {
            self.metrics.average_accuracy = ACCURACY_SMOOTHING * self.metrics.average_accuracy
                + (1.0 - ACCURACY_SMOOTHING) * accuracy;
        }
        self.touch();
    }

    /// Write the character as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = serde_json::to_string_pretty(self)?;
        std::fs::write(path, encoded)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let character: Character = serde_json::from_str(&contents)?;
        Ok(character)
    }

    fn touch(&mut self) {
        self.updated_at = unix_timestamp();
    }
}

impl std::fmt::Display for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (ELO: {}, Style: {}, Level: {})",
            self.name,
            self.rating,
            self.style(),
            self.strength_level()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character_defaults() {
        let character = Character::new("Morphy");

        assert_eq!(character.name, "Morphy");
        assert_eq!(character.rating, 1000);
        assert_eq!(character.personality, Personality::neutral());
        assert_eq!(character.metrics.games, 0);
        assert_eq!(character.strength_level(), "Novice");
        assert_eq!(character.style(), PlayingStyle::Balanced);
    }

    #[test]
    fn test_rating_moves_with_results() {
        // Beating an equal is worth half the K-factor
        let mut character = Character::new("Test");
        character.update_rating(1000, GameOutcome::Win);
        assert_eq!(character.rating, 1016);
        assert_eq!(character.metrics.wins, 1);

        // Losing to a much stronger player costs little
        let mut character = Character::new("Test");
        character.update_rating(1200, GameOutcome::Loss);
        assert_eq!(character.rating, 993);

        // Drawing up is worth a few points
        let mut character = Character::new("Test");
        character.update_rating(1200, GameOutcome::Draw);
        assert_eq!(character.rating, 1008);
        assert_eq!(character.metrics.games, 1);
        assert_eq!(character.metrics.draws, 1);
    }

    #[test]
    fn test_strength_ladder() {
        let mut character = Character::new("Ladder");
        let expectations = [
            (2500, "Grandmaster"),
            (2300, "International Master"),
            (2100, "Expert"),
            (1900, "Advanced"),
            (1700, "Intermediate"),
            (1500, "Developing"),
            (1250, "Beginner"),
            (900, "Novice"),
        ];
        for (rating, label) in expectations {
            character.rating = rating;
            assert_eq!(character.strength_level(), label);
        }
    }

    #[test]
    fn test_observed_moves_nudge_traits_and_tallies() {
        let mut character = Character::new("Drift");

        character.observe_move("d8h4", MoveQuality::Brilliant);
        assert!((character.personality.tactical - 0.51).abs() < 1e-6);
        assert_eq!(character.metrics.brilliant_moves, 1);

        character.observe_move("g1f3", MoveQuality::Mistake);
        assert!((character.personality.patience - 0.51).abs() < 1e-6);
        assert_eq!(character.metrics.mistakes, 1);

        character.observe_move("a1a2", MoveQuality::Blunder);
        assert!((character.personality.risk_taking - 0.48).abs() < 1e-6);
        assert_eq!(character.metrics.blunders, 1);

        // Good and Normal tally without drifting traits
        let before = character.personality;
        character.observe_move("e2e4", MoveQuality::Good);
        character.observe_move("d2d4", MoveQuality::Normal);
        assert_eq!(character.personality, before);
        assert_eq!(character.metrics.good_moves, 1);

        assert_eq!(character.move_patterns["e2e4"], 1);
    }

    #[test]
    fn test_trait_nudges_stay_clamped() {
        let mut character = Character::new("Clamped");
        for _ in 0..60 {
            character.observe_move("a1a2", MoveQuality::Blunder);
        }
        assert_eq!(character.personality.risk_taking, 0.0);

        for _ in 0..120 {
            character.observe_move("d8h4", MoveQuality::Brilliant);
        }
        assert_eq!(character.personality.tactical, 1.0);
    }

    #[test]
    fn test_opening_preferences_rank_favorites() {
        let mut character = Character::new("Openings");

        for _ in 0..3 {
            character.record_opening("Italian Game", true);
        }
        character.record_opening("Sicilian Defense", true);
        character.record_opening("King's Gambit", false);

        let italian = character.opening_preferences["Italian Game"];
        assert!((italian - 0.65).abs() < 1e-6);
        let gambit = character.opening_preferences["King's Gambit"];
        assert!((gambit - 0.47).abs() < 1e-6);

        assert_eq!(character.favorite_openings[0], "Italian Game");
        assert_eq!(character.favorite_openings[1], "Sicilian Defense");

        for name in ["A", "B", "C", "D"] {
            character.record_opening(name, true);
        }
        assert_eq!(character.favorite_openings.len(), 5);
        assert_eq!(character.favorite_openings[0], "Italian Game");
    }

    #[test]
    fn test_accuracy_smoothing() {
        let mut character = Character::new("Accuracy");

        character.record_accuracy(80.0);
        assert_eq!(character.metrics.average_accuracy, 80.0);

        character.record_accuracy(60.0);
        assert!((character.metrics.average_accuracy - 78.0).abs() < 1e-4);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("morphy.json");

        let mut character = Character::new("Morphy").with_rating(2000);
        character.record_opening("Evans Gambit", true);
        character.save(&path).expect("saved");

        let restored = Character::load(&path).expect("loaded");
        assert_eq!(restored.name, "Morphy");
        assert_eq!(restored.rating, 2000);
        assert_eq!(restored.favorite_openings, vec!["Evans Gambit".to_string()]);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let character: Character =
            serde_json::from_str(r#"{"name": "Sparse"}"#).expect("deserializable");

        assert_eq!(character.name, "Sparse");
        assert_eq!(character.rating, 1000);
        assert_eq!(character.personality, Personality::neutral());
        assert!(character.opening_preferences.is_empty());
    }
}
