pub mod task;
pub mod user;

pub use task::{Filter, Task, TaskPatch, TaskStatus};
pub use user::{AuthSession, User};
