//! Game catalog: the reference database and the user's active list

pub mod database;
pub mod models;
pub mod store;

pub use database::GameDatabase;
pub use models::{ExecutablePatch, Game, GameExecutable, GamePatch};
pub use store::{get_executable_by_name, get_executable_by_path, CatalogStore};
