pub mod activities;
pub mod api;
pub mod body;
pub mod common;
pub mod completion;
pub mod devices;
pub mod gear;
pub mod goals;
pub mod health;
pub mod heart;
pub mod logout;
pub mod menstrual;
pub mod metrics;
pub mod status;
pub mod stress;
pub mod training_plans;
pub mod vitals;
pub mod workouts;
