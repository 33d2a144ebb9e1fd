/*
 * Flock
 *
 * Creatures wander the window, keep away from its edges and from the mouse
 * pointer, dodge each other and flock with whoever they can see. Settings
 * can be tuned live from the control panel or loaded from a JSON file passed
 * as the first argument (or in FLOCK_CONFIG).
 *
 * Logging is controlled through RUST_LOG, e.g. RUST_LOG=flock=trace.
 */

use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    nannou::app(flock::app::model).update(flock::app::update).run();
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flock=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
