use actix_web::{web, App, HttpServer};
use backend::config::compose::{compose_config, render_report};
use backend::config::env::AppEnv;
use backend::infra::state::build_state;
use backend::middleware::request_trace::RequestTrace;
use backend::middleware::structured_logger::StructuredLogger;
use backend::middleware::trace_span::TraceSpan;
use backend::routes;
use db_bootstrap::{Db, DbBootstrap};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Local development reads .env; deployed environments set real vars.
    dotenvy::dotenv().ok();

    telemetry::init_tracing();

    let app_env = match AppEnv::from_env() {
        Ok(env) => env,
        Err(e) => {
            eprintln!("❌ Invalid environment configuration: {e}");
            std::process::exit(1);
        }
    };

    let config = compose_config(&app_env);
    tracing::info!(
        "config=composed env={} plugins={:?}",
        app_env.runtime_env.as_str(),
        config.applied
    );
    if config.report.is_some() {
        println!("{}", render_report(&config));
    }

    let bootstrap = match DbBootstrap::from_env() {
        Ok(bootstrap) => bootstrap,
        Err(e) => {
            eprintln!("❌ Invalid database configuration: {e}");
            std::process::exit(1);
        }
    };

    // Create application state using unified builder
    let app_state = match build_state().with_database(bootstrap).build().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    match app_state.db() {
        Db::Connected(_) => println!("✅ Database connected"),
        Db::Unavailable(reason) => {
            println!("⚠️ Database skipped ({})", reason.as_str());
        }
    }

    println!(
        "🚀 Starting Tally Backend on http://{}:{}",
        config.host, config.port
    );

    let host = config.host.clone();
    let port = config.port;

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
