//! Capability checks read by the frontend. Missing flags count as false.

use crate::catalog::models::{Game, GameExecutable};

/// A game can be played when it is installed and not already running.
pub fn can_play_game(game: Option<&Game>) -> bool {
    match game {
        Some(game) => game.is_installed == Some(true) && game.is_running != Some(true),
        None => false,
    }
}

pub fn is_game_installed(game: Option<&Game>) -> bool {
    game.and_then(|g| g.is_installed).unwrap_or(false)
}

pub fn is_executable_running(executable: &GameExecutable) -> bool {
    executable.is_running.unwrap_or(false)
}

pub fn is_game_executable_installed(executable: &GameExecutable) -> bool {
    executable.is_installed.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(installed: Option<bool>, running: Option<bool>) -> Game {
        Game {
            is_installed: installed,
            is_running: running,
            ..Game::new("g1", "G")
        }
    }

    #[test]
    fn test_can_play_game() {
        assert!(!can_play_game(None));
        assert!(!can_play_game(Some(&game(Some(false), Some(false)))));
        assert!(!can_play_game(Some(&game(Some(true), Some(true)))));
        assert!(can_play_game(Some(&game(Some(true), Some(false)))));
        assert!(can_play_game(Some(&game(Some(true), None))));
        assert!(!can_play_game(Some(&game(None, None))));
    }

    #[test]
    fn test_game_installed_defaults_to_false() {
        assert!(!is_game_installed(None));
        assert!(!is_game_installed(Some(&game(None, None))));
        assert!(is_game_installed(Some(&game(Some(true), None))));
    }

    #[test]
    fn test_executable_flags_default_to_false() {
        let mut exe = GameExecutable::new("a.exe", "win32");
        assert!(!is_executable_running(&exe));
        assert!(!is_game_executable_installed(&exe));

        exe.is_running = Some(true);
        exe.is_installed = Some(true);
        assert!(is_executable_running(&exe));
        assert!(is_game_executable_installed(&exe));
    }
}
