use actix_web::web;

pub mod counter;
pub mod health;

/// Configure application routes, shared by `main.rs` and tests so both
/// exercise the same paths.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Counter routes: /api/counter
    cfg.service(web::scope("/api/counter").configure(counter::configure_routes));
}
