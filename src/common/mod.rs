pub mod context;
pub mod error;
pub mod models;
pub mod state;
pub mod views;
