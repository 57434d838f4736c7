pub mod archive;
pub mod cli;
pub mod config;
pub mod controller;
pub mod database;
pub mod logging;
pub mod models;
pub mod ordering;
pub mod store;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use database::Database;
pub use models::{InsertPosition, Task};
pub use store::TaskStore;
pub use utils::Profile;
