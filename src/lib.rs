pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod release;
pub mod report;
pub mod repository;
pub mod ui;
pub mod usecases;
pub mod validation;

pub use error::{ReleaseDroidError, Result};
