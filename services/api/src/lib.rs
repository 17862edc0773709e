mod cli;
mod infra;
mod limiter;
mod quote;
mod routes;
mod server;

use scope_pricing::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
