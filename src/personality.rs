use serde::{Deserialize, Serialize};
use std::fmt;

/// Six-trait personality vector driving move scoring and selection.
///
/// Every trait lives in `[0.0, 1.0]`. Weighted scoring terms multiply by a
/// trait, so each term's maximum contribution is capped by construction.
/// Missing fields deserialize to 0.5, matching the neutral default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    pub aggression: f32,
    pub defensiveness: f32,
    pub risk_taking: f32,
    pub patience: f32,
    pub tactical: f32,
    pub positional: f32,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            defensiveness: 0.5,
            risk_taking: 0.5,
            patience: 0.5,
            tactical: 0.5,
            positional: 0.5,
        }
    }
}

impl Personality {
    /// All traits at 0.5 — the baseline used for move-quality classification.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Return a copy with every trait forced into `[0, 1]`. NaN traits reset
    /// to the neutral 0.5. Applied to every externally supplied vector.
    pub fn clamped(mut self) -> Self {
        self.aggression = clamp_trait(self.aggression);
        self.defensiveness = clamp_trait(self.defensiveness);
        self.risk_taking = clamp_trait(self.risk_taking);
        self.patience = clamp_trait(self.patience);
        self.tactical = clamp_trait(self.tactical);
        self.positional = clamp_trait(self.positional);
        self
    }

    /// Dominant playing style: the first trait above 0.7 in a fixed
    /// precedence order wins.
    pub fn style(&self) -> PlayingStyle {
        if self.aggression > 0.7 {
            PlayingStyle::Aggressive
        } else if self.defensiveness > 0.7 {
            PlayingStyle::Defensive
        } else if self.tactical > 0.7 {
            PlayingStyle::Tactical
        } else if self.positional > 0.7 {
            PlayingStyle::Positional
        } else if self.patience > 0.7 {
            PlayingStyle::Patient
        } else {
            PlayingStyle::Balanced
        }
    }
}

fn clamp_trait(value: f32) -> f32 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Human-readable style label derived from the trait vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayingStyle {
    Aggressive,
    Defensive,
    Tactical,
    Positional,
    Patient,
    Balanced,
}

impl fmt::Display for PlayingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayingStyle::Aggressive => "Aggressive",
            PlayingStyle::Defensive => "Defensive",
            PlayingStyle::Tactical => "Tactical",
            PlayingStyle::Positional => "Positional",
            PlayingStyle::Patient => "Patient",
            PlayingStyle::Balanced => "Balanced",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let p = Personality::default();
        assert_eq!(p, Personality::neutral());
        assert_eq!(p.aggression, 0.5);
        assert_eq!(p.risk_taking, 0.5);
        assert_eq!(p.style(), PlayingStyle::Balanced);
    }

    #[test]
    fn test_clamped_repairs_invalid_traits() {
        let p = Personality {
            aggression: 1.7,
            defensiveness: -0.3,
            risk_taking: f32::NAN,
            ..Personality::default()
        }
        .clamped();

        assert_eq!(p.aggression, 1.0);
        assert_eq!(p.defensiveness, 0.0);
        assert_eq!(p.risk_taking, 0.5);
        assert_eq!(p.patience, 0.5);
    }

    #[test]
    fn test_style_precedence() {
        let p = Personality {
            aggression: 0.8,
            tactical: 0.9,
            ..Personality::default()
        };
        // Aggression is checked before tactical
        assert_eq!(p.style(), PlayingStyle::Aggressive);

        let p = Personality {
            patience: 0.75,
            ..Personality::default()
        };
        assert_eq!(p.style(), PlayingStyle::Patient);
    }

    #[test]
    fn test_partial_json_fills_neutral_defaults() {
        let p: Personality = serde_json::from_str(r#"{"aggression": 0.9}"#).unwrap();
        assert_eq!(p.aggression, 0.9);
        assert_eq!(p.tactical, 0.5);
        assert_eq!(p.positional, 0.5);
    }
}
