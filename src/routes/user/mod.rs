mod handler;
mod model;

pub use handler::{delete_user, list_users, login, register};
pub use model::{CreateUserResponse, DeleteUserRequest, DeleteUserResponse, LoginResponse};
