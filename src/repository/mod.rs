/// Persistence layer
///
/// Plain repository functions over `PgPool`, one module per table, plus
/// the `AuthStore` and `ContactStore` traits the auth service and the
/// contact routes depend on so both can be tested without a database.

pub mod contacts;
mod store;
pub mod tokens;
pub mod users;

pub use store::{AuthStore, ContactStore, PgStore};
