pub mod post;
pub mod user;

pub use post::{CommentEntity, PostEntity};
pub use user::{NewUser, Role, UserEntity};
