//! Server entry point: build a world, host it, run until interrupted.

use hexarchy_server::engine;
use hexarchy_server::{Command, ServerConfig, ServerError};
use hexarchy_core::{Game, GameSettings, MapGenConfig, MapGenerator, Player, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env();
    let settings = GameSettings::new("Hexarchy".to_string());
    settings.validate()?;

    let map = MapGenerator::new(
        settings.seed,
        MapGenConfig {
            width: settings.width,
            height: settings.height,
            ..MapGenConfig::default()
        },
    )
    .generate();

    let world = World::new(map, settings.player_count);
    let mut game = Game::new(world, settings.game_name.clone(), settings.player_count);
    // seats start as AI; a lobby layer swaps in transports as humans join
    for civ in 0..settings.player_count {
        game.seat_player(Player::ai(format!("Civ {}", civ), civ))
            .expect("fresh game has open seats");
    }
    game.start();

    info!(
        width = settings.width,
        height = settings.height,
        players = settings.player_count,
        "game hosted"
    );
    let (handle, task) = engine::spawn(game, config);

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    handle.send(Command::Shutdown).await?;
    task.await.expect("engine task completes");
    Ok(())
}
