mod auth;
mod contacts;
mod health_check;
mod users;

pub use auth::{confirm_email, login, refresh, request_email, signup};
pub use contacts::{
    create_contact, delete_contact, list_contacts, read_contact, update_contact,
    upcoming_birthdays,
};
pub use health_check::health_check;
pub use users::{current_user, update_avatar, UserResponse};
