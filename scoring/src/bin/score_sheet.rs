use std::path::PathBuf;

use clap::{Parser, Subcommand};
use database::SqliteStore;
use itertools::Itertools;
use scoring::{AppConfig, PreferenceStore, ScoreEngine, ThemeMode};
use types::{AddPlayerResult, Player, ScoreCategory, MAX_SELECTED_PLAYERS};

const MIN_PLAYERS: usize = 2;

#[derive(Parser, Debug)]
#[command(name = "score_sheet", about = "Keeps score sheets for board game nights")]
struct Params {
    /// Database url or file, overrides DATABASE_URL and the config file
    #[arg(short, long)]
    database: Option<String>,

    #[arg(short, long, default_value = "score_sheet.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List players
    Players {
        /// Include deleted players
        #[arg(long)]
        all: bool,
    },
    AddPlayer {
        name: String,
    },
    RenamePlayer {
        name: String,
        new_name: String,
    },
    DeletePlayer {
        name: String,
    },
    RestorePlayer {
        name: String,
    },
    /// Start a game for two to four players
    Start {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Set one category for a player in the current game
    Score {
        player: String,
        category: ScoreCategory,
        value: i64,
    },
    Status,
    Finish {
        /// Finish even if some players have no points
        #[arg(long)]
        force: bool,
    },
    Cancel {
        /// Cancel even if points were recorded
        #[arg(long)]
        force: bool,
    },
    History {
        #[arg(long)]
        json: bool,
    },
    DeleteGame {
        game_id: i64,
    },
    Theme {
        mode: ThemeMode,
    },
    Opacity {
        value: f32,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> CliResult {
    env_logger::init();
    let args = Params::parse();
    log::debug!("args: {args:?}");

    let config = AppConfig::load(&args.config)?;

    match args.command {
        Command::Theme { mode } => {
            let preferences = PreferenceStore::load(&config.preferences_path)?;
            preferences.set_theme_mode(mode)?;
            println!("Theme set to {mode}");
            return Ok(());
        }
        Command::Opacity { value } => {
            let preferences = PreferenceStore::load(&config.preferences_path)?;
            if preferences.set_background_opacity(value)? {
                println!("Background opacity set to {value}");
            } else {
                return Err(format!("Opacity must be between 0 and 1, got {value}").into());
            }
            return Ok(());
        }
        _ => {}
    }

    let store = SqliteStore::open(&config.database_config(args.database)).await?;
    let mut engine = ScoreEngine::start(store).await;

    match args.command {
        Command::Players { all } => {
            let players = if all {
                engine.all_players()
            } else {
                engine.active_players()
            };
            for player in players {
                println!("{player}");
            }
        }
        Command::AddPlayer { name } => {
            let result = engine.add_player(&name).await?;
            report_name_result(&name, result);
        }
        Command::RenamePlayer { name, new_name } => {
            let player = find_player(&engine.all_players(), &name)?;
            let result = engine.update_player_name(&player, &new_name).await?;
            report_name_result(&new_name, result);
        }
        Command::DeletePlayer { name } => {
            let player = find_player(&engine.active_players(), &name)?;
            engine.delete_player(&player).await?;
            println!("Deleted {}", player.name);
        }
        Command::RestorePlayer { name } => {
            let player = find_player(&engine.all_players(), &name)?;
            engine.restore_player(&player).await?;
            println!("Restored {}", player.name);
        }
        Command::Start { names } => {
            let players = players_for_game(&engine.active_players(), &names)?;
            for player in &players {
                if !engine.selection().contains(player.id) {
                    engine.toggle_player_selection(player);
                }
            }
            let game = engine.start_new_game().await?;
            println!(
                "Started game {} with {}",
                game.id,
                engine.selection().players().iter().map(|p| &p.name).join(", ")
            );
        }
        Command::Score {
            player,
            category,
            value,
        } => {
            let selected = engine.selection();
            let player = find_player(selected.players(), &player)?;
            let Some(entry) = engine
                .current_scores()
                .into_iter()
                .find(|e| e.player_id == player.id)
            else {
                return Err(format!("{} is not playing the current game", player.name).into());
            };
            let updated = engine.set_score(&entry, category, value).await?;
            if updated.get(category) as i64 != value {
                return Err(format!(
                    "{category} takes 0 to {}, got {value}",
                    category.max_value()
                )
                .into());
            }
            println!("{}: {category} {value}, total {}", player.name, updated.total());
        }
        Command::Status => print_status(&engine),
        Command::Finish { force } => {
            if engine.current_game_id().is_none() {
                println!("No game in progress");
            } else if !force && !engine.all_players_scored() {
                return Err("Not every player has scored yet, use --force to finish anyway".into());
            } else if let Some(game_id) = engine.finish_game().await? {
                println!("Finished game {game_id}");
            }
        }
        Command::Cancel { force } => {
            if engine.current_game_id().is_none() {
                println!("No game in progress");
            } else if !force && engine.has_any_scores() {
                return Err("Points were already recorded, use --force to discard them".into());
            } else if let Some(game_id) = engine.cancel_game().await? {
                println!("Cancelled game {game_id}");
            }
        }
        Command::History { json } => {
            let games = engine.history_mut().list_finished_games().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&games)?);
            } else if games.is_empty() {
                println!("No finished games");
            } else {
                for history in games {
                    println!(
                        "#{} {}: {} [{}]",
                        history.game.id,
                        history.game.started_at.format("%Y-%m-%d %H:%M"),
                        history.outcome(),
                        history
                            .scores
                            .iter()
                            .map(|s| format!("{} {}", s.player.name, s.total()))
                            .join(", ")
                    );
                }
            }
        }
        Command::DeleteGame { game_id } => {
            engine.history_mut().delete_finished_game(game_id).await?;
            println!("Deleted game {game_id}");
        }
        Command::Theme { .. } | Command::Opacity { .. } => {}
    }
    Ok(())
}

fn find_player(players: &[Player], name: &str) -> Result<Player, Box<dyn std::error::Error>> {
    players
        .iter()
        .find(|p| p.has_name(name.trim()))
        .cloned()
        .ok_or_else(|| format!("No player named '{}'", name.trim()).into())
}

/// Resolves the names given to `start` to distinct active players, two to four of them.
fn players_for_game(
    active: &[Player],
    names: &[String],
) -> Result<Vec<Player>, Box<dyn std::error::Error>> {
    let players: Vec<Player> = names
        .iter()
        .map(|name| find_player(active, name))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .unique_by(|p| p.id)
        .collect();
    if !(MIN_PLAYERS..=MAX_SELECTED_PLAYERS).contains(&players.len()) {
        return Err(format!(
            "A game needs {MIN_PLAYERS} to {MAX_SELECTED_PLAYERS} different players, got {}",
            players.len()
        )
        .into());
    }
    Ok(players)
}

fn report_name_result(name: &str, result: AddPlayerResult) {
    match result {
        AddPlayerResult::Success(player) => println!("Saved {} ({})", player.name, player.id),
        AddPlayerResult::AlreadyExists => println!("A player named '{}' already exists", name.trim()),
        AddPlayerResult::DeletedExists(player) => println!(
            "'{}' was deleted, restore it with: restore-player \"{}\"",
            player.name, player.name
        ),
    }
}

fn print_status<S: database::ScoreStore>(engine: &ScoreEngine<S>) {
    let Some(game_id) = engine.current_game_id() else {
        println!("No game in progress");
        return;
    };
    println!("Game {game_id}");
    println!(
        "{:<25} {}  total",
        "player",
        ScoreCategory::ALL.iter().map(|c| format!("{:>5}", c.tag())).join(" ")
    );

    let selection = engine.selection();
    for entry in engine.current_scores() {
        let name = selection
            .players()
            .iter()
            .find(|p| p.id == entry.player_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("player {}", entry.player_id));
        println!(
            "{:<25} {}  {:>5}",
            name,
            ScoreCategory::ALL
                .iter()
                .map(|c| format!("{:>5}", entry.get(*c)))
                .join(" "),
            entry.total()
        );
    }
}
