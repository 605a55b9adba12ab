pub mod catalog;
pub mod cmr;
pub mod common;
pub mod config;
pub mod convert;
pub mod routes;
pub mod validator;
