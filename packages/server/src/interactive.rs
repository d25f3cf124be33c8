//! Interactive mode for the server.
//!
//! Prompts the user for the data directory, bind address, and port before
//! starting the server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::{ServerConfig, ServerError};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Prompts start from the values in the environment (see
/// [`ServerConfig::from_env`]) and the result is passed to
/// [`super::run_server`].
///
/// # Errors
///
/// Returns an error if data loading or the underlying server fails.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("Safe Bike Server");
    println!();

    let defaults = ServerConfig::from_env();

    let data_dir: String = Input::new()
        .with_prompt("Data directory")
        .default(defaults.data_dir.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| defaults.data_dir.display().to_string());

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(ServerConfig {
        data_dir: PathBuf::from(data_dir),
        bind_addr,
        port,
        ..defaults
    })
    .await
}
