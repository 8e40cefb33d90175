pub mod api;
pub mod args;
pub mod commands;
mod config;
pub mod controller;
mod error;
pub mod model;
mod utils;
pub mod validator;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::Config;
pub use controller::{BillSubmissionController, NewBillContext};
pub use error::{Error, Failure, Result, StoreError};
