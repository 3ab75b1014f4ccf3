use clap::Parser;
use db_bootstrap::{
    applied_versions, parse_db_url, tls_mode, DbBootstrapError, DirMigrator, PgPoolProvider,
    PoolProvider, SchemaMigrator,
};

enum Command {
    Up,
    Status,
}

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "Tally database migration tool")]
struct Args {
    /// Migration command to run: up | status
    command: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("db_bootstrap=info,sqlx=warn")
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let command = match args.command.as_str() {
        "up" => Command::Up,
        "status" => Command::Status,
        other => {
            eprintln!("Unknown command: {other}. Use: up | status");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(command).await {
        eprintln!("❌ Migration command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), DbBootstrapError> {
    // Unlike the backend bootstrap, the CLI has no placeholder mode: it
    // exists to reach a database, so a missing URL is fatal and local
    // hosts are connected to rather than skipped.
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            return Err(DbBootstrapError::config(
                "DATABASE_URL must be set for migration commands",
            ))
        }
    };

    let parsed = parse_db_url(&url)?;
    let migrator = DirMigrator::from_cwd()?;
    let db = PgPoolProvider::default()
        .connect(&url, tls_mode(&parsed))
        .await?;

    match command {
        Command::Up => {
            let report = migrator.apply(&db).await?;
            println!(
                "✅ up: {} defined, {} previously applied",
                report.defined, report.applied_before
            );
        }
        Command::Status => {
            let defined = migrator.load().await?;
            let applied = applied_versions(&db).await?;
            println!(
                "migrations dir={} defined={} applied={}",
                migrator.dir().display(),
                defined.migrations.len(),
                applied.len()
            );
            for migration in defined.migrations.iter() {
                let state = if applied.contains(&migration.version) {
                    "applied"
                } else {
                    "pending"
                };
                println!("  {} {} [{state}]", migration.version, migration.description);
            }
        }
    }

    Ok(())
}
