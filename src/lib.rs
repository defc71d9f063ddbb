use std::env;

use diesel::{Connection, PgConnection};
use dotenvy::dotenv;

pub mod app;
pub mod console;
pub mod error;
pub mod models;
pub mod schema;
pub mod store;

/// Connection URL for the café database. `DATABASE_URL` wins when set
/// (which is how the tests connect); otherwise the URL is built from the
/// command-line arguments with an empty password.
pub fn database_url(dbname: &str, port: u16, user: &str) -> String {
    dotenv().ok();
    env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("postgres://{user}@localhost:{port}/{dbname}"))
}

pub fn establish_connection() -> PgConnection {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgConnection::establish(&database_url).unwrap()
}
