use anyhow::{anyhow, Context};
use clap::Parser;
use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

use cafe_cli::console::Console;
use cafe_cli::{app, database_url};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Text-menu front end for the café ordering database.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Name of the café database
    dbname: String,
    /// Port the database server listens on
    port: u16,
    /// Database user to connect as (the password is always empty)
    user: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let url = database_url(&cli.dbname, cli.port, &cli.user);
    println!("Connecting to database...");
    let mut conn = PgConnection::establish(&url)
        .with_context(|| format!("unable to connect to the database at {url}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| anyhow!("failed to run migrations: {err}"))?;
    info!(%url, "connected");
    println!("Done");

    println!();
    println!("*******************************************************");
    println!("              Cafe Ordering System");
    println!("*******************************************************");
    println!();

    let mut console = Console::stdio();
    app::run(&mut conn, &mut console)?;

    println!("Bye !");
    Ok(())
}
