use tracing::info;

use interest_watch::utils::DynResult;

fn main() -> DynResult<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();
    info!("Starting InterestWatch");

    interest_watch::cli::run()
}
