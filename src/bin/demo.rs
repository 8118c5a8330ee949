use chess::{Board, BoardStatus, Color};
use chess_persona_engine::{
    position_key, Character, CharacterRoster, GameExperience, GameOutcome, MoveQuality,
    PersonaEngine, Personality,
};

fn main() {
    println!("Chess Persona Engine Demo");
    println!("=========================");

    // Seeded so the demo tells the same story every run
    let mut engine = PersonaEngine::with_seed(2024);

    let attacker = Personality {
        aggression: 0.9,
        defensiveness: 0.2,
        risk_taking: 0.8,
        patience: 0.2,
        tactical: 0.8,
        positional: 0.3,
    };
    let defender = Personality {
        aggression: 0.2,
        defensiveness: 0.9,
        risk_taking: 0.1,
        patience: 0.8,
        tactical: 0.4,
        positional: 0.9,
    };

    println!("\n=== Personality Self-Play ===");
    println!(
        "White plays {} chess, black plays {} chess",
        attacker.style(),
        defender.style()
    );

    let mut board = Board::default();
    let mut fullmove = 1u32;
    let mut tokens: Vec<String> = Vec::new();
    let mut white_moves: Vec<(String, String)> = Vec::new();
    let mut black_moves: Vec<(String, String)> = Vec::new();

    while tokens.len() < 60 && board.status() == BoardStatus::Ongoing {
        let personality = if board.side_to_move() == Color::White {
            &attacker
        } else {
            &defender
        };
        let chosen = match engine.select_on_board(&board, fullmove, personality) {
            Some(scored) => scored,
            None => break,
        };

        let token = chosen.mv.to_string();
        let record = (position_key(&board), token.clone());
        match board.side_to_move() {
            Color::White => white_moves.push(record),
            Color::Black => {
                black_moves.push(record);
                fullmove += 1;
            }
        }
        tokens.push(token);
        board = board.make_move_new(chosen.mv);
    }

    println!("Moves: {}", tokens.join(" "));
    let (white_outcome, black_outcome) = match board.status() {
        BoardStatus::Checkmate => match board.side_to_move() {
            Color::White => (GameOutcome::Loss, GameOutcome::Win),
            Color::Black => (GameOutcome::Win, GameOutcome::Loss),
        },
        _ => (GameOutcome::Draw, GameOutcome::Draw),
    };
    println!(
        "Result after {} plies: white {}, black {}",
        tokens.len(),
        white_outcome,
        black_outcome
    );

    println!("\n=== Game Review ===");
    let review = engine
        .review_game(None, &tokens)
        .expect("played moves are legal");
    println!(
        "Accuracy: {:.1}% over {} moves",
        review.accuracy,
        review.moves.len()
    );
    for reviewed in &review.moves {
        if matches!(
            reviewed.assessment.quality,
            MoveQuality::Brilliant
                | MoveQuality::Inaccuracy
                | MoveQuality::Mistake
                | MoveQuality::Blunder
        ) {
            let side = if reviewed.side == Color::White {
                "white"
            } else {
                "black"
            };
            println!(
                "  {:>3}. {} ({}): {} - {}",
                reviewed.number,
                reviewed.token,
                side,
                reviewed.assessment.quality,
                reviewed.assessment.comment
            );
        }
    }
    if let Some(worst) = review.worst() {
        println!(
            "Worst move: {} (gap {:.1})",
            worst.token, worst.assessment.gap
        );
    }

    println!("\n=== Character Development ===");
    let mut roster = CharacterRoster::open("demo_characters").expect("roster directory");
    let mut aggressor = match roster.get("Aggressor") {
        Some(character) => character.clone(),
        None => Character::new("Aggressor")
            .with_personality(attacker)
            .with_rating(1500),
    };
    let mut wall = match roster.get("Wall") {
        Some(character) => character.clone(),
        None => Character::new("Wall")
            .with_personality(defender)
            .with_rating(1500),
    };

    let aggressor_before = aggressor.rating;
    let wall_before = wall.rating;
    let white_experience = GameExperience {
        moves: white_moves,
        outcome: white_outcome,
    };
    let black_experience = GameExperience {
        moves: black_moves,
        outcome: black_outcome,
    };
    engine
        .update_from_game(&mut aggressor, &white_experience, wall_before)
        .expect("recorded moves replay cleanly");
    engine
        .update_from_game(&mut wall, &black_experience, aggressor_before)
        .expect("recorded moves replay cleanly");

    println!("{aggressor}");
    println!("{wall}");
    roster.update(aggressor).expect("character saves");
    roster.update(wall).expect("character saves");

    println!("\n{}", roster.leaderboard());

    println!("=== Learned Openings ===");
    let start_key = position_key(&Board::default());
    let known = engine
        .top_responses(&start_key, 3)
        .expect("start position parses");
    if known.is_empty() {
        println!("No opening values learned yet");
    } else {
        for (token, value) in known {
            println!("  {token}: {value:+.4}");
        }
    }
    let recalled = engine
        .choose_learned_move(&start_key, 0.0)
        .expect("start position parses");
    if let Some(token) = recalled {
        println!("Greedy recall from the start position: {token}");
    }

    let summary = engine.agent().summary();
    println!(
        "Knowledge: {} positions, {} moves, {:.0}% average success",
        summary.positions_learned,
        summary.moves_tracked,
        summary.average_success_rate * 100.0
    );

    println!("\nDemo complete. Characters were saved under demo_characters/.");
}
