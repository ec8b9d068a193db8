mod service;
mod types;

pub use service::UserService;
pub use types::{
    Credentials, Flow, INCORRECT_PASSWORD, NewAccount, Outcome, Rejection, Session,
    USER_NOT_FOUND, UserContext, Users,
};
