//! The active list: games the user is currently working through
//!
//! All mutation goes through `&mut self`, and updates write into the stored
//! element, so every reader of the list observes a merge.

use std::collections::HashSet;

use uuid::Uuid;

use super::models::{ExecutablePatch, Game, GameExecutable, GamePatch};
use crate::utils::paths::normalize_path_id;

#[derive(Debug, Default)]
pub struct CatalogStore {
    games: Vec<Game>,
    selected_uid: Option<String>,
    /// Every uid handed out by this list, including removed ones
    issued_uids: HashSet<String>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Games on the active list, in insertion order.
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Add a game to the active list and return the uid of its entry.
    ///
    /// A game whose `id` is already listed is not added again; the existing
    /// entry's uid is returned instead.
    pub fn add_game_to_list(&mut self, mut game: Game) -> String {
        if let Some(existing) = self.games.iter().find(|g| g.id == game.id) {
            tracing::debug!("Game {} already on the active list, skipping", game.id);
            return existing.uid.clone().unwrap_or_default();
        }

        let uid = self.fresh_uid();
        tracing::debug!("Adding game {} ({}) as {}", game.id, game.name, uid);
        game.uid = Some(uid.clone());
        self.games.push(game);
        uid
    }

    fn fresh_uid(&mut self) -> String {
        loop {
            let uid = Uuid::new_v4().to_string();
            if self.issued_uids.insert(uid.clone()) {
                return uid;
            }
        }
    }

    /// Remove `game` from the active list by its uid.
    pub fn remove_game_from_list(&mut self, game: &Game) -> Option<Game> {
        let uid = game.uid.as_deref()?;
        self.remove_game_by_uid(uid)
    }

    /// Remove the entry with `uid`, clearing the selection if it pointed at it.
    /// Unknown uids are ignored.
    pub fn remove_game_by_uid(&mut self, uid: &str) -> Option<Game> {
        let index = self.index_of_uid(uid)?;
        let removed = self.games.remove(index);

        if self.selected_uid.as_deref() == Some(uid) {
            self.selected_uid = None;
        }

        tracing::debug!("Removed game {} ({}) from the active list", removed.id, uid);
        Some(removed)
    }

    /// Select an entry of the active list. Returns false for unknown uids.
    pub fn select_game(&mut self, uid: &str) -> bool {
        if self.index_of_uid(uid).is_none() {
            return false;
        }
        self.selected_uid = Some(uid.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_uid = None;
    }

    pub fn selected_game(&self) -> Option<&Game> {
        self.selected_uid
            .as_deref()
            .and_then(|uid| self.get_game_by_uid(uid))
    }

    pub fn get_game_by_uid(&self, uid: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.uid.as_deref() == Some(uid))
    }

    pub(crate) fn get_game_by_uid_mut(&mut self, uid: &str) -> Option<&mut Game> {
        self.games.iter_mut().find(|g| g.uid.as_deref() == Some(uid))
    }

    fn index_of_uid(&self, uid: &str) -> Option<usize> {
        self.games.iter().position(|g| g.uid.as_deref() == Some(uid))
    }

    /// Merge `patch` into the stored game with `uid`.
    pub fn update_game_by_uid(&mut self, uid: &str, patch: GamePatch) -> Option<&Game> {
        let game = self.get_game_by_uid_mut(uid)?;
        patch.apply_to(game);
        Some(game)
    }

    /// Merge `patch` into the executable called `exec_name` of the game with `uid`.
    pub fn update_executable_by_name(
        &mut self,
        uid: &str,
        exec_name: &str,
        patch: ExecutablePatch,
    ) -> Option<&GameExecutable> {
        let game = self.get_game_by_uid_mut(uid)?;
        let index = game.executables.iter().position(|e| e.name == exec_name)?;
        patch.apply_to(&mut game.executables[index]);
        game.refresh_aggregate_flags();
        Some(&game.executables[index])
    }

    /// First listed game with an executable whose name matches `exec_path`
    /// once separators are stripped.
    pub fn get_game_by_executable(&self, exec_path: &str) -> Option<&Game> {
        let index = self.index_of_executable(exec_path)?;
        Some(&self.games[index])
    }

    pub(crate) fn index_of_executable(&self, exec_path: &str) -> Option<usize> {
        let wanted = normalize_path_id(exec_path);
        self.games.iter().position(|g| {
            g.executables
                .iter()
                .any(|e| normalize_path_id(&e.name) == wanted)
        })
    }

    pub(crate) fn game_at_mut(&mut self, index: usize) -> Option<&mut Game> {
        self.games.get_mut(index)
    }
}

/// First executable of `game` whose name equals `name` exactly.
pub fn get_executable_by_name<'a>(game: Option<&'a Game>, name: &str) -> Option<&'a GameExecutable> {
    game?.executables.iter().find(|e| e.name == name)
}

/// First executable of `game` whose *name* matches `path` once separators
/// are stripped. The executable's `path` field is not consulted: the process
/// runner reports catalog names and filesystem paths interchangeably.
pub fn get_executable_by_path<'a>(game: Option<&'a Game>, path: &str) -> Option<&'a GameExecutable> {
    let index = executable_index_by_path(game?, path)?;
    game.map(|g| &g.executables[index])
}

pub(crate) fn executable_index_by_path(game: &Game, path: &str) -> Option<usize> {
    let wanted = normalize_path_id(path);
    game.executables
        .iter()
        .position(|e| normalize_path_id(&e.name) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_game(id: &str, exe: &str) -> Game {
        Game::new(id, format!("Game {id}")).with_executable(GameExecutable::new(exe, "win32"))
    }

    #[test]
    fn test_add_assigns_uid() {
        let mut store = CatalogStore::new();
        let uid = store.add_game_to_list(sample_game("g1", "a.exe"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.games()[0].uid.as_deref(), Some(uid.as_str()));
        assert_eq!(store.games()[0].executables[0].name, "a.exe");
    }

    #[test]
    fn test_duplicate_add_keeps_first_uid() {
        let mut store = CatalogStore::new();
        let first = store.add_game_to_list(sample_game("g1", "a.exe"));
        let second = store.add_game_to_list(sample_game("g1", "other.exe"));

        assert_eq!(store.len(), 1);
        assert_eq!(first, second);
        assert_eq!(store.games()[0].uid.as_deref(), Some(first.as_str()));
        assert_eq!(store.games()[0].executables[0].name, "a.exe");
    }

    #[test]
    fn test_supplied_uid_is_replaced() {
        let mut store = CatalogStore::new();
        let mut game = sample_game("g1", "a.exe");
        game.uid = Some("stale".to_string());

        let uid = store.add_game_to_list(game);
        assert_ne!(uid, "stale");
    }

    #[test]
    fn test_uids_are_unique() {
        let mut store = CatalogStore::new();
        let uids: HashSet<String> = (0..50)
            .map(|i| store.add_game_to_list(sample_game(&i.to_string(), "a.exe")))
            .collect();
        assert_eq!(uids.len(), 50);
    }

    #[test]
    fn test_removing_selected_game_clears_selection() {
        let mut store = CatalogStore::new();
        let uid = store.add_game_to_list(sample_game("g1", "a.exe"));
        assert!(store.select_game(&uid));

        let game = store.get_game_by_uid(&uid).cloned().unwrap();
        assert!(store.remove_game_from_list(&game).is_some());

        assert!(store.selected_game().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_removing_other_game_keeps_selection() {
        let mut store = CatalogStore::new();
        let selected = store.add_game_to_list(sample_game("g1", "a.exe"));
        let other = store.add_game_to_list(sample_game("g2", "b.exe"));
        store.select_game(&selected);

        store.remove_game_by_uid(&other);

        assert_eq!(
            store.selected_game().and_then(|g| g.uid.as_deref()),
            Some(selected.as_str())
        );
    }

    #[test]
    fn test_remove_unknown_uid_is_noop() {
        let mut store = CatalogStore::new();
        store.add_game_to_list(sample_game("g1", "a.exe"));

        assert!(store.remove_game_by_uid("missing").is_none());
        assert!(store.remove_game_from_list(&sample_game("g1", "a.exe")).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_select_unknown_uid_is_rejected() {
        let mut store = CatalogStore::new();
        assert!(!store.select_game("missing"));
        assert!(store.selected_game().is_none());
    }

    #[test]
    fn test_update_game_by_uid_is_visible() {
        let mut store = CatalogStore::new();
        let uid = store.add_game_to_list(sample_game("g1", "a.exe"));

        let patch = GamePatch {
            name: Some("New Name".to_string()),
            ..Default::default()
        };
        assert!(store.update_game_by_uid(&uid, patch).is_some());

        assert_eq!(store.get_game_by_uid(&uid).unwrap().name, "New Name");
    }

    #[test]
    fn test_update_unknown_game_returns_none() {
        let mut store = CatalogStore::new();
        assert!(store.update_game_by_uid("missing", GamePatch::default()).is_none());
    }

    #[test]
    fn test_update_executable_by_name_is_visible() {
        let mut store = CatalogStore::new();
        let uid = store.add_game_to_list(sample_game("g1", "folder/a.exe"));

        let patch = ExecutablePatch {
            path: Some(r"C:\games\g1\folder\a.exe".to_string()),
            is_installed: Some(true),
            ..Default::default()
        };
        store.update_executable_by_name(&uid, "folder/a.exe", patch).unwrap();

        let game = store.get_game_by_uid(&uid).unwrap();
        assert_eq!(game.executables[0].path.as_deref(), Some(r"C:\games\g1\folder\a.exe"));
        assert_eq!(game.executables[0].is_installed, Some(true));
        assert_eq!(game.is_installed, Some(true));

        assert!(store
            .update_executable_by_name(&uid, "folder\\a.exe", ExecutablePatch::default())
            .is_none());
    }

    #[test]
    fn test_executable_lookups() {
        let game = Game::new("g1", "G")
            .with_executable(GameExecutable::new("bin/game.exe", "win32"))
            .with_executable(GameExecutable::new("bin\\game.exe", "linux"));

        assert_eq!(get_executable_by_name(Some(&game), "bin\\game.exe").unwrap().os, "linux");
        assert!(get_executable_by_name(Some(&game), "game.exe").is_none());
        assert!(get_executable_by_name(None, "bin/game.exe").is_none());

        // First match wins across separator styles
        assert_eq!(get_executable_by_path(Some(&game), "bin\\game.exe").unwrap().os, "win32");
        assert!(get_executable_by_path(None, "bin/game.exe").is_none());
    }

    #[test]
    fn test_path_lookup_ignores_path_field() {
        let mut exe = GameExecutable::new("folder/game.exe", "win32");
        exe.path = Some("/somewhere/else/game.exe".to_string());
        let game = Game::new("g1", "G").with_executable(exe);

        assert!(get_executable_by_path(Some(&game), "/somewhere/else/game.exe").is_none());
        assert!(get_executable_by_path(Some(&game), "folder\\game.exe").is_some());
    }

    #[test]
    fn test_get_game_by_executable_returns_first_match() {
        let mut store = CatalogStore::new();
        store.add_game_to_list(sample_game("g1", "shared/run.exe"));
        store.add_game_to_list(sample_game("g2", "shared/run.exe"));

        let game = store.get_game_by_executable(r"shared\run.exe").unwrap();
        assert_eq!(game.id, "g1");
        assert!(store.get_game_by_executable("missing.exe").is_none());
    }
}
