//! Infrastructure configuration modules.

pub mod database;
pub mod ledger;
pub mod logging;
pub mod settings;
pub mod settlement;

pub use settings::Config;
