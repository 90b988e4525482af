#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "This crate contains the client side of a to-do list: form validation for the"]
#![doc = "login and registration pages, the REST client, the session token, the task store"]
#![doc = "and the board view model that front-ends render. The `taskboard` binary drives it"]
#![doc = "from the command line."]

pub mod auth;
pub mod backend;
pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;

pub use crate::board::Board;
pub use crate::error::AppError;
pub use crate::models::{Filter, Task, TaskPatch, TaskStatus};
