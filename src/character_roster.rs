//! Disk-backed character collection.
//!
//! Each character lives in `<name>.json` inside the roster directory.
//! Opening a roster loads every readable file, skips the rest with a
//! warning, and seeds a default ladder of five characters when the
//! directory holds none.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::character::Character;
use crate::character_error;
use crate::errors::Result;

const MATCHING_TOLERANCE: i32 = 200;

const DEFAULT_ROSTER: [(&str, i32); 5] = [
    ("Rookie", 800),
    ("Student", 1200),
    ("Amateur", 1600),
    ("Professional", 2000),
    ("Master", 2400),
];

#[derive(Debug)]
pub struct CharacterRoster {
    directory: PathBuf,
    characters: BTreeMap<String, Character>,
}

impl CharacterRoster {
    /// Open (and create if needed) a roster directory.
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;

        let mut roster = Self {
            directory,
            characters: BTreeMap::new(),
        };
        roster.load_all()?;
        roster.ensure_defaults()?;
        Ok(roster)
    }

    fn load_all(&mut self) -> Result<()> {
        for entry in std::fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Character::load(&path) {
                Ok(character) => {
                    self.characters.insert(character.name.clone(), character);
                }
                Err(err) => {
                    log::warn!(
                        "skipping unreadable character file {}: {}",
                        path.display(),
                        err
                    );
                }
            }
        }
        Ok(())
    }

    fn ensure_defaults(&mut self) -> Result<()> {
        if !self.characters.is_empty() {
            return Ok(());
        }
        for (name, rating) in DEFAULT_ROSTER {
            self.create(name, rating)?;
        }
        log::info!("seeded {} default characters", DEFAULT_ROSTER.len());
        Ok(())
    }

    /// Create, persist and register a new character.
    pub fn create(&mut self, name: &str, rating: i32) -> Result<&Character> {
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(character_error!("invalid character name: {:?}", name));
        }
        if self.characters.contains_key(name) {
            return Err(character_error!("character '{}' already exists", name));
        }

        let character = Character::new(name).with_rating(rating);
        character.save(self.path_for(name))?;
        self.characters.insert(name.to_string(), character);
        Ok(&self.characters[name])
    }

    /// Replace the stored copy of a character and write it to disk.
    pub fn update(&mut self, character: Character) -> Result<()> {
        character.save(self.path_for(&character.name))?;
        self.characters.insert(character.name.clone(), character);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Character> {
        self.characters.get(name)
    }

    /// Mutable access to a loaded character. Changes stay in memory until
    /// [`CharacterRoster::persist`] or [`CharacterRoster::update`] runs.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.get_mut(name)
    }

    /// Write one character's current in-memory state to disk.
    pub fn persist(&self, name: &str) -> Result<()> {
        match self.characters.get(name) {
            Some(character) => character.save(self.path_for(name)),
            None => Err(character_error!("unknown character '{}'", name)),
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Characters ordered best rating first.
    pub fn by_rating(&self) -> Vec<&Character> {
        let mut ranked: Vec<&Character> = self.characters.values().collect();
        ranked.sort_by(|a, b| b.rating.cmp(&a.rating));
        ranked
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Remove a character and its file. Returns false when unknown.
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        if self.characters.remove(name).is_none() {
            return Ok(false);
        }
        let path = self.path_for(name);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(true)
    }

    /// The character rated closest to `rating`, preferring anyone within
    /// the matching tolerance. Falls back to the first roster entry.
    pub fn closest_match(&self, rating: i32) -> Option<&Character> {
        self.characters
            .values()
            .filter(|character| (character.rating - rating).abs() <= MATCHING_TOLERANCE)
            .min_by_key(|character| (character.rating - rating).abs())
            .or_else(|| self.characters.values().next())
    }

    /// Plain-text leaderboard, best rating first.
    pub fn leaderboard(&self) -> String {
        let mut lines = vec!["=== Character Leaderboard ===".to_string()];

        for (rank, character) in self.by_rating().iter().enumerate() {
            let metrics = &character.metrics;
            lines.push(format!(
                "{:2}. {:15} ELO: {:4}  Level: {:20}  W/L/D: {}/{}/{}  ({:.1}%)",
                rank + 1,
                character.name,
                character.rating,
                character.strength_level(),
                metrics.wins,
                metrics.losses,
                metrics.draws,
                metrics.win_rate()
            ));
        }

        lines.join("\n")
    }

    /// Write the leaderboard plus per-character details to a text file.
    pub fn export_statistics<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut report = String::new();
        report.push_str("Character Statistics Export\n");
        report.push_str(&"=".repeat(60));
        report.push_str("\n\n");
        report.push_str(&self.leaderboard());
        report.push_str("\n\n");
        report.push_str(&"=".repeat(60));
        report.push('\n');

        for character in self.by_rating() {
            report.push_str(&format!("\n--- {} ---\n", character.name));
            report.push_str(&format!("ELO: {}\n", character.rating));
            report.push_str(&format!("Level: {}\n", character.strength_level()));
            report.push_str(&format!("Playing Style: {}\n", character.style()));
            report.push_str(&format!("Games Played: {}\n", character.metrics.games));
            report.push_str(&format!("Win Rate: {:.1}%\n", character.metrics.win_rate()));
            report.push_str(&format!(
                "Brilliant Moves: {}\n",
                character.metrics.brilliant_moves
            ));
            report.push_str(&format!("Blunders: {}\n", character.metrics.blunders));
            if !character.favorite_openings.is_empty() {
                report.push_str(&format!(
                    "Favorite Openings: {}\n",
                    character.favorite_openings.join(", ")
                ));
            }
        }

        std::fs::write(path, report)?;
        Ok(())
    }

    /// Export every character into one JSON document.
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = serde_json::to_string_pretty(&self.characters)?;
        std::fs::write(path, encoded)?;
        Ok(())
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.json", name))
    }
}
