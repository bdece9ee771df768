pub mod clients;
pub mod traits;
pub mod types;
