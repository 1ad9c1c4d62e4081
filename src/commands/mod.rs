//! CLI command implementations.

pub mod collect;
pub mod rates;
pub mod run;

pub use collect::CollectCommand;
pub use rates::RatesCommand;
pub use run::RunCommand;
