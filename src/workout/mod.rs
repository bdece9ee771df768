pub mod builder;
pub mod dispatch;
pub mod sport;
pub mod steps;
pub mod tables;
