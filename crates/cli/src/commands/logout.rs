use stockroom::Client;
use tracing::info;

use crate::{commands::error::AuthError, console::print_success_message};

pub async fn handle_logout(client: &Client) -> Result<(), AuthError> {
    client.auth().logout().await.map_err(AuthError::SignOut)?;
    info!("Credentials for the active profile cleared");

    print_success_message("✅ Signed out, stored credentials cleared");
    Ok(())
}
