//! Application state
//!
//! [`AppContext`] owns everything the commands reach for: the settings
//! database, the reference game list, the active list with its tracker, the
//! event bus, and the launch/install collaborators. It is built in the order
//! settings, game database, session, runner, and only then are the bus
//! subscriptions started.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::catalog::{get_executable_by_name, CatalogStore, Game, GameDatabase, GamePatch};
use crate::db::Database;
use crate::error::{QuestError, Result};
use crate::events::{handlers, AppEvent, EventBus, EventEmitter};
use crate::launcher::{parse_app_id, Installer, LaunchGateway, ProcessRunner, TokioProcessRunner};
use crate::settings::AppSettings;
use crate::tracker::{is_executable_running, is_game_executable_installed, ExecutionTracker, Resolution};

/// The active list and the tracker that annotates it
#[derive(Debug, Default)]
pub struct Session {
    pub store: CatalogStore,
    pub tracker: ExecutionTracker,
}

pub type SharedSession = Arc<Mutex<Session>>;

pub struct AppContext {
    database: Database,
    settings: RwLock<AppSettings>,
    games: GameDatabase,
    session: SharedSession,
    events: Arc<EventBus>,
    gateway: LaunchGateway,
    installer: Installer,
}

impl AppContext {
    /// Open the per-user database and wire every component.
    pub fn bootstrap() -> anyhow::Result<Self> {
        let database = Database::new().context("Failed to initialize database")?;
        Self::with_database(database).context("Failed to initialize application state")
    }

    /// Build the context on an already opened database, using the tokio runner.
    pub fn with_database(database: Database) -> Result<Self> {
        let settings = AppSettings::load(&database)?;
        let events = Arc::new(EventBus::new());
        let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner::new(
            settings.games_root(),
            events.clone(),
        ));
        Ok(Self::assemble(database, settings, events, runner))
    }

    /// Build the context with a caller-supplied runner.
    pub fn with_runner(
        database: Database,
        events: Arc<EventBus>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Result<Self> {
        let settings = AppSettings::load(&database)?;
        Ok(Self::assemble(database, settings, events, runner))
    }

    fn assemble(
        database: Database,
        settings: AppSettings,
        events: Arc<EventBus>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let games = GameDatabase::load_or_embedded(settings.game_db_path.as_deref().map(Path::new));
        let installer = Installer::new(settings.games_root(), settings.template_path());
        tracing::info!(
            "Game database has {} entries, games folder is {}",
            games.len(),
            settings.games_dir
        );

        Self {
            database,
            settings: RwLock::new(settings),
            games,
            session: Arc::new(Mutex::new(Session::default())),
            events,
            gateway: LaunchGateway::new(runner),
            installer,
        }
    }

    /// Subscribe the tracker to the bus. Call once, inside a tokio runtime.
    pub fn start_event_pump(&self) -> JoinHandle<()> {
        let emitter: Arc<dyn EventEmitter> = self.events.clone();
        let receiver = self.events.subscribe();
        tracing::debug!(
            "Event pump started ({} bus subscribers)",
            self.events.subscriber_count()
        );
        handlers::tracker::start_handler(self.session.clone(), emitter, receiver)
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn game_database(&self) -> &GameDatabase {
        &self.games
    }

    pub fn settings(&self) -> Result<AppSettings> {
        self.settings
            .read()
            .map(|s| s.clone())
            .map_err(|e| QuestError::lock(e.to_string()))
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Persist new settings. The games folder and template are read at
    /// startup, so changes to them take effect on the next launch.
    pub fn save_settings(&self, settings: AppSettings) -> Result<()> {
        settings.save(&self.database)?;
        let mut current = self
            .settings
            .write()
            .map_err(|e| QuestError::lock(e.to_string()))?;
        *current = settings;
        Ok(())
    }

    pub fn session(&self) -> Result<MutexGuard<'_, Session>> {
        self.session.lock().map_err(|e| QuestError::lock(e.to_string()))
    }

    /// Snapshot of the active list.
    pub fn list_games(&self) -> Result<Vec<Game>> {
        Ok(self.session()?.store.games().to_vec())
    }

    /// Copy game `game_id` from the game database onto the active list.
    pub fn add_game(&self, game_id: &str) -> Result<String> {
        let game = self
            .games
            .get(game_id)
            .cloned()
            .ok_or_else(|| QuestError::not_found("Game", game_id))?;
        self.add_game_to_list(game)
    }

    /// Put `game` on the active list, announcing it when it is new.
    pub fn add_game_to_list(&self, game: Game) -> Result<String> {
        let game_id = game.id.clone();
        let (uid, added) = {
            let mut session = self.session()?;
            let before = session.store.len();
            let uid = session.store.add_game_to_list(game);
            (uid, session.store.len() > before)
        };

        if added {
            self.events.emit(AppEvent::GameAdded {
                uid: uid.clone(),
                game_id,
            });
        }
        Ok(uid)
    }

    pub fn remove_game(&self, uid: &str) -> Result<Game> {
        let removed = self
            .session()?
            .store
            .remove_game_by_uid(uid)
            .ok_or_else(|| QuestError::not_found("Game", uid))?;

        self.events.emit(AppEvent::GameRemoved {
            uid: uid.to_string(),
            game_id: removed.id.clone(),
        });
        Ok(removed)
    }

    pub fn select_game(&self, uid: &str) -> Result<Game> {
        let mut session = self.session()?;
        if !session.store.select_game(uid) {
            return Err(QuestError::not_found("Game", uid));
        }
        session
            .store
            .selected_game()
            .cloned()
            .ok_or_else(|| QuestError::not_found("Game", uid))
    }

    pub fn update_game(&self, uid: &str, patch: GamePatch) -> Result<Game> {
        self.session()?
            .store
            .update_game_by_uid(uid, patch)
            .cloned()
            .ok_or_else(|| QuestError::not_found("Game", uid))
    }

    /// Launch executable `exec_name` of listed game `uid`.
    ///
    /// The executable must be installed and not already running. The result
    /// only says the runner accepted the request; the running flag follows
    /// from the runner's events.
    pub async fn play(&self, uid: &str, exec_name: &str) -> Result<String> {
        let (game, executable) = {
            let session = self.session()?;
            let game = session
                .store
                .get_game_by_uid(uid)
                .ok_or_else(|| QuestError::not_found("Game", uid))?;
            let executable = get_executable_by_name(Some(game), exec_name)
                .ok_or_else(|| QuestError::not_found("Executable", exec_name))?;

            if !is_game_executable_installed(executable) {
                return Err(QuestError::validation(format!("{} is not installed", exec_name)));
            }
            if is_executable_running(executable) {
                return Err(QuestError::validation(format!("{} is already running", exec_name)));
            }
            (game.clone(), executable.clone())
        };

        self.gateway
            .play(&game, &executable)
            .instrument(crate::operation_span!("play", uid = %uid, executable = %exec_name))
            .await
    }

    /// Stop whatever the runner dispatched for listed game `uid`.
    pub async fn stop(&self, uid: &str) -> Result<String> {
        let game_id = {
            let session = self.session()?;
            session
                .store
                .get_game_by_uid(uid)
                .map(|g| g.id.clone())
                .ok_or_else(|| QuestError::not_found("Game", uid))?
        };
        self.gateway.stop(parse_app_id(&game_id)?).await
    }

    /// Install a placeholder for executable `exec_name` of listed game `uid`
    /// and mark it installed.
    pub fn install(&self, uid: &str, exec_name: &str) -> Result<PathBuf> {
        let mut session = self.session()?;
        let game = session
            .store
            .get_game_by_uid(uid)
            .ok_or_else(|| QuestError::not_found("Game", uid))?;
        if get_executable_by_name(Some(game), exec_name).is_none() {
            return Err(QuestError::not_found("Executable", exec_name));
        }
        let app_id = parse_app_id(&game.id)?;

        let installed = self.installer.install(app_id, exec_name)?;

        let Session { store, tracker } = &mut *session;
        let resolution = tracker.mark_installed(store, uid, exec_name, Some(&installed));
        drop(session);

        if let Some(event) = resolution.to_event() {
            self.events.emit(event);
        }
        Ok(installed)
    }

    /// Scan the games folder and mark every listed executable found there.
    pub fn detect_installed(&self) -> Result<Vec<Resolution>> {
        let resolutions = {
            let mut session = self.session()?;
            let Session { store, tracker } = &mut *session;
            tracker.detect_installed(store, self.installer.games_root())
        };

        for event in resolutions.iter().filter_map(Resolution::to_event) {
            self.events.emit(event);
        }
        Ok(resolutions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GameExecutable;
    use crate::events::ProcessEventPayload;
    use crate::launcher::RunBackgroundProcessPayload;
    use crate::tracker::ExecutableState;
    use async_trait::async_trait;
    use std::fs;
    use tokio::time::{sleep, Duration};

    /// Runner that reports a start on the bus for every launch
    struct EchoRunner {
        events: Arc<EventBus>,
    }

    #[async_trait]
    impl ProcessRunner for EchoRunner {
        async fn launch(&self, request: RunBackgroundProcessPayload) -> Result<String> {
            self.events.emit(AppEvent::BackgroundProcessResult(ProcessEventPayload {
                app_id: request.app_id.to_string(),
                executable_name: request.executable_name.clone().unwrap_or_default(),
                full_executable_path: request.exec_path.clone(),
                pid: Some(4242),
                status: None,
                running: true,
                error: None,
            }));
            Ok("Executable launched".to_string())
        }

        async fn stop(&self, app_id: i64) -> Result<String> {
            self.events.emit(AppEvent::BackgroundProcessExited(ProcessEventPayload {
                app_id: app_id.to_string(),
                executable_name: "Game.exe".to_string(),
                full_executable_path: "folder/Game.exe".to_string(),
                pid: Some(4242),
                status: Some(0),
                running: false,
                error: None,
            }));
            Ok("Executable stopped successfully".to_string())
        }
    }

    fn context(dir: &Path) -> AppContext {
        let db = Database::open_in_memory().unwrap();
        let template = dir.join("template.exe");
        fs::write(&template, b"placeholder").unwrap();
        AppSettings {
            games_dir: dir.join("games").to_string_lossy().to_string(),
            template_executable: template.to_string_lossy().to_string(),
            game_db_path: None,
        }
        .save(&db)
        .unwrap();

        let events = Arc::new(EventBus::new());
        let runner = Arc::new(EchoRunner {
            events: events.clone(),
        });
        AppContext::with_runner(db, events, runner).unwrap()
    }

    fn quest() -> Game {
        Game::new("42", "Quest").with_executable(GameExecutable::new("folder/Game.exe", "win32"))
    }

    async fn wait_for<F: Fn(&Session) -> bool>(ctx: &AppContext, check: F) {
        for _ in 0..100 {
            let done = {
                let session = ctx.session().unwrap();
                check(&*session)
            };
            if done {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    #[test]
    fn test_add_game_from_database() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut rx = ctx.events().subscribe();

        let id = ctx.game_database().games()[0].id.clone();
        let uid = ctx.add_game(&id).unwrap();
        assert_eq!(ctx.add_game(&id).unwrap(), uid);
        assert_eq!(ctx.list_games().unwrap().len(), 1);

        // Only the first add is announced
        assert!(matches!(rx.try_recv().unwrap(), AppEvent::GameAdded { .. }));
        assert!(rx.try_recv().is_err());

        assert!(matches!(ctx.add_game("missing"), Err(QuestError::NotFound { .. })));
    }

    #[test]
    fn test_remove_and_select() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let uid = ctx.add_game_to_list(quest()).unwrap();

        assert_eq!(ctx.select_game(&uid).unwrap().id, "42");
        let removed = ctx.remove_game(&uid).unwrap();
        assert_eq!(removed.uid.as_deref(), Some(uid.as_str()));
        assert!(ctx.session().unwrap().store.selected_game().is_none());
        assert!(ctx.remove_game(&uid).is_err());
    }

    #[test]
    fn test_install_marks_executable() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let uid = ctx.add_game_to_list(quest()).unwrap();

        let path = ctx.install(&uid, "folder/Game.exe").unwrap();
        assert!(path.is_file());

        let session = ctx.session().unwrap();
        let game = session.store.get_game_by_uid(&uid).unwrap();
        assert_eq!(game.executables[0].is_installed, Some(true));
        assert_eq!(game.is_installed, Some(true));
    }

    #[test]
    fn test_detect_installed_finds_files() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let uid = ctx.add_game_to_list(quest()).unwrap();

        let folder = dir.path().join("games").join("42").join("folder");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("Game.exe"), b"x").unwrap();

        let found = ctx.detect_installed().unwrap();
        assert_eq!(
            found,
            vec![Resolution::Applied {
                uid,
                executable: "folder/Game.exe".to_string(),
                state: ExecutableState::InstalledIdle,
            }]
        );
        assert!(ctx.detect_installed().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_play_requires_install() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let uid = ctx.add_game_to_list(quest()).unwrap();

        let err = ctx.play(&uid, "folder/Game.exe").await.unwrap_err();
        assert!(matches!(err, QuestError::Validation(_)));
    }

    #[tokio::test]
    async fn test_play_and_stop_flow_through_tracker() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let _pump = ctx.start_event_pump();
        assert_eq!(ctx.events().subscriber_count(), 1);
        let uid = ctx.add_game_to_list(quest()).unwrap();
        ctx.install(&uid, "folder/Game.exe").unwrap();

        ctx.play(&uid, "folder/Game.exe").await.unwrap();
        let running_uid = uid.clone();
        wait_for(&ctx, move |s| {
            s.store.get_game_by_uid(&running_uid).and_then(|g| g.is_running) == Some(true)
        })
        .await;

        // A running executable cannot be launched twice
        assert!(ctx.play(&uid, "folder/Game.exe").await.is_err());

        ctx.stop(&uid).await.unwrap();
        let stopped_uid = uid.clone();
        wait_for(&ctx, move |s| {
            s.store.get_game_by_uid(&stopped_uid).and_then(|g| g.is_running) == Some(false)
        })
        .await;
        assert!(ctx.session().unwrap().tracker.sessions().is_empty());
    }

    #[test]
    fn test_save_settings_persists() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut settings = ctx.settings().unwrap();
        settings.game_db_path = Some("/tmp/list.json".to_string());

        ctx.save_settings(settings.clone()).unwrap();
        assert_eq!(AppSettings::load(ctx.database()).unwrap(), settings);
    }
}
