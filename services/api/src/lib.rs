mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use imoveis_search::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
