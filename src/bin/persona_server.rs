use chess_persona_engine::{CharacterRoster, PersonaEngine, ProtocolEngine};
use clap::{Arg, Command};

/// JSON move server binary
///
/// Speaks the line-delimited JSON protocol on stdin/stdout so a hosting
/// application (GUI, web backend, another process) can ask for moves,
/// move grades, game reviews and character training without linking the
/// library. Diagnostics go to stderr; stdout carries only responses.
///
/// Usage:
/// 1. Build: `cargo build --release --bin persona_server`
/// 2. Spawn the binary from the host and write one request per line, e.g.
///    `{"command": "get_move", "fen": "...", "personality": {"aggression": 0.9}}`
/// 3. Send `{"command": "quit"}` to stop; learned state is saved on the way out.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let matches = Command::new("Persona Engine Server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Line-delimited JSON move server with personalities and learning")
        .arg(
            Arg::new("characters_dir")
                .short('c')
                .long("characters-dir")
                .value_name("DIR")
                .help("Directory holding character JSON files")
                .default_value("ai_characters"),
        )
        .arg(
            Arg::new("knowledge_file")
                .short('k')
                .long("knowledge-file")
                .value_name("FILE")
                .help("Learned value table, loaded on start and saved on quit")
                .default_value("persona_knowledge.bin"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .value_name("SEED")
                .help("Seed for reproducible move choice (thread RNG when absent)")
                .value_parser(clap::value_parser!(u64)),
        )
        .get_matches();

    let characters_dir = matches.get_one::<String>("characters_dir").unwrap();
    let knowledge_file = matches.get_one::<String>("knowledge_file").unwrap();

    let mut engine = match matches.get_one::<u64>("seed") {
        Some(&seed) => PersonaEngine::with_seed(seed),
        None => PersonaEngine::new(),
    };
    engine.load_knowledge(knowledge_file);
    log::info!(
        "knowledge loaded: {} positions from {} games",
        engine.agent().positions_known(),
        engine.agent().games_learned()
    );

    let roster = CharacterRoster::open(characters_dir)?;
    log::info!(
        "roster ready with {} characters in {}",
        roster.len(),
        characters_dir
    );

    let mut protocol = ProtocolEngine::with_roster(engine, roster);
    protocol.run()?;

    protocol.engine().save_knowledge(knowledge_file)?;
    log::info!("knowledge saved to {knowledge_file}");
    Ok(())
}
