pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskPriority, TaskUpdate};
pub use user::{ChangePasswordRequest, PublicUser, UpdateProfileRequest};
