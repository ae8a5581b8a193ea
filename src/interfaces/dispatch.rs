use crate::application::controller::Game;
use crate::error::Result;
use crate::interfaces::csv::command_reader::{Action, Command};
use crate::interfaces::json::response_writer::Response;
use serde::Serialize;
use tracing::debug;

fn to_value<T: Serialize>(value: T) -> Result<Option<serde_json::Value>> {
    Ok(Some(serde_json::to_value(value)?))
}

async fn run(game: &Game, command: &Command) -> Result<Option<serde_json::Value>> {
    let player = command.player_id();
    let tournament = command.tournament_id();
    match command.action {
        Action::Fund => to_value(game.fund(player, command.points()?).await?),
        Action::Take => game.take(player, command.points()?).await.map(|_| None),
        Action::Balance => to_value(game.balance(player).await?),
        Action::Announce => game
            .announce_tournament(tournament, command.points()?)
            .await
            .map(|_| None),
        Action::Join => game.join_tournament(tournament, player).await.map(|_| None),
        Action::Results => to_value(game.results(tournament).await?),
        Action::DeletePlayer => game.delete_player(player).await.map(|_| None),
        Action::DeleteTournament => game.delete_tournament(tournament).await.map(|_| None),
    }
}

/// Runs one command through the controller and shapes the outcome for the wire.
pub async fn execute(game: &Game, command: &Command) -> Response {
    match run(game, command).await {
        Ok(result) => Response::ok(command.action, 200, result),
        Err(err) => {
            debug!(action = ?command.action, %err, "command failed");
            Response::failed(command.action, &err)
        }
    }
}
