//! Line-delimited JSON protocol over standard streams.
//!
//! The hosting application writes one JSON request per line on stdin and
//! reads one JSON response per line from stdout. Diagnostics go to the `log`
//! facade (stderr in the bundled server binary), never stdout, so the stream
//! stays parseable. Every failure maps to an `{"error": ...}` response; the
//! process only stops on `quit` or end of input.

use std::io::{self, BufRead, Write};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use chess::Color;

use crate::character_roster::CharacterRoster;
use crate::errors::Result;
use crate::learning::GameOutcome;
use crate::personality::Personality;
use crate::protocol_error;
use crate::PersonaEngine;

#[derive(Debug, Deserialize)]
struct GetMoveRequest {
    fen: String,
    #[serde(default)]
    personality: Option<Personality>,
    #[serde(default)]
    character: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EvaluateMoveRequest {
    fen: String,
    #[serde(rename = "move")]
    token: String,
}

#[derive(Debug, Deserialize)]
struct ReviewGameRequest {
    #[serde(default)]
    start_fen: Option<String>,
    moves: MoveList,
}

#[derive(Debug, Deserialize)]
struct TrainRequest {
    #[serde(default, alias = "character_name")]
    character: Option<String>,
    moves: MoveList,
    result: GameOutcome,
    #[serde(default)]
    opponent_rating: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct GetCharacterRequest {
    name: String,
}

/// Move tokens, either as a plain array or as a JSON-encoded string of one
/// (the double-encoded form some host runtimes produce).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MoveList {
    Tokens(Vec<String>),
    Encoded(String),
}

impl MoveList {
    fn into_tokens(self) -> Result<Vec<String>> {
        match self {
            MoveList::Tokens(tokens) => Ok(tokens),
            MoveList::Encoded(raw) => serde_json::from_str(&raw)
                .map_err(|e| protocol_error!("moves is not a token array: {}", e)),
        }
    }
}

fn parse_request<T: DeserializeOwned>(request: Value) -> std::result::Result<T, Value> {
    serde_json::from_value(request).map_err(|e| json!({"error": format!("bad request: {}", e)}))
}

/// JSON request/response engine behind the server binary.
///
/// Owns a [`PersonaEngine`] and, optionally, a [`CharacterRoster`]. Commands:
/// `get_move`, `evaluate_move`, `review_game`, `train`, `get_character`,
/// `leaderboard`, `quit`. [`ProtocolEngine::handle_line`] answers one request
/// without touching any stream, so the protocol is testable in-process.
pub struct ProtocolEngine {
    engine: PersonaEngine,
    roster: Option<CharacterRoster>,
}

impl ProtocolEngine {
    pub fn new(engine: PersonaEngine) -> Self {
        Self {
            engine,
            roster: None,
        }
    }

    pub fn with_roster(engine: PersonaEngine, roster: CharacterRoster) -> Self {
        Self {
            engine,
            roster: Some(roster),
        }
    }

    pub fn engine(&self) -> &PersonaEngine {
        &self.engine
    }

    pub fn roster(&self) -> Option<&CharacterRoster> {
        self.roster.as_ref()
    }

    /// Answer a single request line. `None` means `quit` was received and the
    /// caller should stop reading.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let request: Value = match serde_json::from_str(line.trim()) {
            Ok(value) => value,
            Err(e) => {
                return Some(json!({"error": format!("malformed request: {}", e)}).to_string())
            }
        };
        let command = match request.get("command").and_then(Value::as_str) {
            Some(command) => command.to_string(),
            None => return Some(json!({"error": "missing command"}).to_string()),
        };

        let response = match command.as_str() {
            "quit" => return None,
            "get_move" => self.get_move(request),
            "evaluate_move" => self.evaluate_move(request),
            "review_game" => self.review_game(request),
            "train" => self.train(request),
            "get_character" => self.get_character(request),
            "leaderboard" => self.leaderboard(),
            _ => json!({"error": "Unknown command"}),
        };
        Some(response.to_string())
    }

    /// Main request loop over locked standard streams.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        log::info!("persona engine protocol started");
        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match self.handle_line(&line) {
                Some(response) => {
                    writeln!(stdout, "{response}")?;
                    stdout.flush()?;
                }
                None => break,
            }
        }
        log::info!("persona engine protocol stopped");
        Ok(())
    }

    fn get_move(&mut self, request: Value) -> Value {
        let request: GetMoveRequest = match parse_request(request) {
            Ok(request) => request,
            Err(response) => return response,
        };
        let personality =
            match self.resolve_personality(request.personality, request.character.as_deref()) {
                Ok(personality) => personality,
                Err(response) => return response,
            };
        match self.engine.select_move(&request.fen, &personality) {
            Ok(Some(token)) => json!({"move": token}),
            Ok(None) => json!({"move": "none"}),
            Err(e) => json!({"error": e.to_string()}),
        }
    }

    fn evaluate_move(&mut self, request: Value) -> Value {
        let request: EvaluateMoveRequest = match parse_request(request) {
            Ok(request) => request,
            Err(response) => return response,
        };
        match self.engine.classify_move(&request.fen, &request.token) {
            Ok(assessment) => json!({
                "score": assessment.score,
                "quality": assessment.quality,
                "comment": assessment.comment,
            }),
            Err(e) => json!({"error": e.to_string()}),
        }
    }

    fn review_game(&mut self, request: Value) -> Value {
        let request: ReviewGameRequest = match parse_request(request) {
            Ok(request) => request,
            Err(response) => return response,
        };
        let tokens = match request.moves.into_tokens() {
            Ok(tokens) => tokens,
            Err(e) => return json!({"error": e.to_string()}),
        };
        let review = match self
            .engine
            .review_game(request.start_fen.as_deref(), &tokens)
        {
            Ok(review) => review,
            Err(e) => return json!({"error": e.to_string()}),
        };

        let moves: Vec<Value> = review
            .moves
            .iter()
            .map(|reviewed| {
                json!({
                    "number": reviewed.number,
                    "side": if reviewed.side == Color::White { "white" } else { "black" },
                    "move": reviewed.token,
                    "quality": reviewed.assessment.quality,
                    "comment": reviewed.assessment.comment,
                    "gap": reviewed.assessment.gap,
                })
            })
            .collect();
        json!({
            "accuracy": review.accuracy,
            "counts": {
                "brilliant": review.tally.brilliant,
                "good": review.tally.good,
                "normal": review.tally.normal,
                "inaccuracies": review.tally.inaccuracies,
                "mistakes": review.tally.mistakes,
                "blunders": review.tally.blunders,
            },
            "moves": moves,
        })
    }

    fn train(&mut self, request: Value) -> Value {
        let request: TrainRequest = match parse_request(request) {
            Ok(request) => request,
            Err(response) => return response,
        };
        let tokens = match request.moves.into_tokens() {
            Ok(tokens) => tokens,
            Err(e) => return json!({"error": e.to_string()}),
        };
        let experience = match self.engine.experience_from_tokens(&tokens, request.result) {
            Ok(experience) => experience,
            Err(e) => return json!({"error": e.to_string()}),
        };

        match request.character {
            Some(name) => {
                let roster = match self.roster.as_mut() {
                    Some(roster) => roster,
                    None => return json!({"error": "no character roster configured"}),
                };
                let mut character = match roster.get(&name) {
                    Some(character) => character.clone(),
                    None => return json!({"error": format!("unknown character '{}'", name)}),
                };
                // With no opponent named, rate the game as played against an
                // equal.
                let opponent = request.opponent_rating.unwrap_or(character.rating);
                if let Err(e) = self
                    .engine
                    .update_from_game(&mut character, &experience, opponent)
                {
                    return json!({"error": e.to_string()});
                }
                let rating = character.rating;
                if let Err(e) = roster.update(character) {
                    return json!({"error": e.to_string()});
                }
                json!({"status": "ok", "rating": rating})
            }
            None => {
                self.engine.learn_from_game(&experience);
                json!({"status": "ok"})
            }
        }
    }

    fn get_character(&mut self, request: Value) -> Value {
        let request: GetCharacterRequest = match parse_request(request) {
            Ok(request) => request,
            Err(response) => return response,
        };
        let roster = match self.roster.as_ref() {
            Some(roster) => roster,
            None => return json!({"error": "no character roster configured"}),
        };
        match roster.get(&request.name) {
            Some(character) => json!({"character": character}),
            None => json!({"error": format!("unknown character '{}'", request.name)}),
        }
    }

    fn leaderboard(&self) -> Value {
        match self.roster.as_ref() {
            Some(roster) => json!({"leaderboard": roster.leaderboard()}),
            None => json!({"error": "no character roster configured"}),
        }
    }

    fn resolve_personality(
        &self,
        personality: Option<Personality>,
        character: Option<&str>,
    ) -> std::result::Result<Personality, Value> {
        if let Some(personality) = personality {
            return Ok(personality.clamped());
        }
        if let Some(name) = character {
            let roster = match self.roster.as_ref() {
                Some(roster) => roster,
                None => return Err(json!({"error": "no character roster configured"})),
            };
            return match roster.get(name) {
                Some(character) => Ok(character.personality),
                None => Err(json!({"error": format!("unknown character '{}'", name)})),
            };
        }
        Ok(Personality::neutral())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn protocol() -> ProtocolEngine {
        ProtocolEngine::new(PersonaEngine::with_seed(17))
    }

    fn respond(protocol: &mut ProtocolEngine, line: &str) -> Value {
        let response = protocol.handle_line(line).expect("not a quit command");
        serde_json::from_str(&response).expect("response is JSON")
    }

    #[test]
    fn test_unknown_command_is_reported() {
        let mut protocol = protocol();
        let response = respond(&mut protocol, r#"{"command": "dance"}"#);
        assert_eq!(response["error"], "Unknown command");
    }

    #[test]
    fn test_malformed_requests_are_reported() {
        let mut protocol = protocol();
        let response = respond(&mut protocol, "this is not json");
        assert!(response["error"].as_str().unwrap().contains("malformed"));

        let response = respond(&mut protocol, r#"{"fen": "abc"}"#);
        assert_eq!(response["error"], "missing command");
    }

    #[test]
    fn test_quit_stops_the_loop() {
        let mut protocol = protocol();
        assert!(protocol.handle_line(r#"{"command": "quit"}"#).is_none());
    }

    #[test]
    fn test_get_move_returns_a_token() {
        let mut protocol = protocol();
        let request = format!(r#"{{"command": "get_move", "fen": "{START_FEN}"}}"#);
        let response = respond(&mut protocol, &request);
        let token = response["move"].as_str().unwrap();
        assert_ne!(token, "none");
        assert!(token.len() >= 4);
    }

    #[test]
    fn test_get_move_on_terminal_position_is_none() {
        let mut protocol = protocol();
        let mated = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
        let request = format!(r#"{{"command": "get_move", "fen": "{mated}"}}"#);
        let response = respond(&mut protocol, &request);
        assert_eq!(response["move"], "none");
    }

    #[test]
    fn test_get_move_accepts_partial_personality() {
        let mut protocol = protocol();
        let request = format!(
            r#"{{"command": "get_move", "fen": "{START_FEN}", "personality": {{"aggression": 1.0}}}}"#
        );
        let response = respond(&mut protocol, &request);
        assert!(response["move"].as_str().is_some());
    }

    #[test]
    fn test_evaluate_move_reports_quality_and_comment() {
        let mut protocol = protocol();
        let request = format!(r#"{{"command": "evaluate_move", "fen": "{START_FEN}", "move": "e2e4"}}"#);
        let response = respond(&mut protocol, &request);
        assert!(response["score"].as_f64().is_some());
        assert_eq!(response["quality"], "good");
        assert!(response["comment"].as_str().unwrap().starts_with("Good"));
    }

    #[test]
    fn test_train_without_character_learns() {
        let mut protocol = protocol();
        let request =
            r#"{"command": "train", "moves": ["e2e4", "e7e5"], "result": "win"}"#.to_string();
        let response = respond(&mut protocol, &request);
        assert_eq!(response["status"], "ok");
        assert_eq!(protocol.engine().agent().games_learned(), 1);
    }

    #[test]
    fn test_train_accepts_double_encoded_moves() {
        let mut protocol = protocol();
        let request = r#"{"command": "train", "moves": "[\"d2d4\"]", "result": "draw"}"#;
        let response = respond(&mut protocol, request);
        assert_eq!(response["status"], "ok");
        assert_eq!(protocol.engine().agent().games_learned(), 1);
    }

    #[test]
    fn test_train_rejects_illegal_lines() {
        let mut protocol = protocol();
        let request = r#"{"command": "train", "moves": ["e2e4", "e2e4"], "result": "win"}"#;
        let response = respond(&mut protocol, request);
        assert!(response["error"].as_str().unwrap().contains("not legal"));
        assert_eq!(protocol.engine().agent().games_learned(), 0);
    }

    #[test]
    fn test_review_game_summarizes_moves() {
        let mut protocol = protocol();
        let request = r#"{"command": "review_game", "moves": ["f2f3", "e7e5", "g2g4", "d8h4"]}"#;
        let response = respond(&mut protocol, request);
        assert_eq!(response["moves"].as_array().unwrap().len(), 4);
        let last = &response["moves"][3];
        assert_eq!(last["move"], "d8h4");
        assert_eq!(last["quality"], "brilliant");
        assert_eq!(last["side"], "black");
    }

    #[test]
    fn test_roster_commands_and_character_training() {
        let dir = tempdir().expect("tempdir");
        let roster = CharacterRoster::open(dir.path()).expect("roster opens");
        let mut protocol = ProtocolEngine::with_roster(PersonaEngine::with_seed(4), roster);

        let response = respond(&mut protocol, r#"{"command": "get_character", "name": "Rookie"}"#);
        assert_eq!(response["character"]["name"], "Rookie");
        assert_eq!(response["character"]["rating"], 800);

        let response = respond(&mut protocol, r#"{"command": "leaderboard"}"#);
        assert!(response["leaderboard"]
            .as_str()
            .unwrap()
            .contains("Character Leaderboard"));

        let request = r#"{"command": "train", "character_name": "Rookie", "moves": ["e2e4"], "result": "win"}"#;
        let response = respond(&mut protocol, request);
        assert_eq!(response["status"], "ok");
        assert_eq!(response["rating"], 816);
        let rating = protocol.roster().unwrap().get("Rookie").unwrap().rating;
        assert_eq!(rating, 816);
    }

    #[test]
    fn test_get_move_with_unknown_character_errors() {
        let dir = tempdir().expect("tempdir");
        let roster = CharacterRoster::open(dir.path()).expect("roster opens");
        let mut protocol = ProtocolEngine::with_roster(PersonaEngine::with_seed(2), roster);

        let request = format!(
            r#"{{"command": "get_move", "fen": "{START_FEN}", "character": "Nobody"}}"#
        );
        let response = respond(&mut protocol, &request);
        assert!(response["error"].as_str().unwrap().contains("Nobody"));
    }
}
