use dialoguer::Password;
use stockroom::Client;

use crate::{commands::error::AuthError, console::print_success_message};

/// Prompts for the password and signs in, storing the returned credential pair.
pub async fn handle_login(email: &str, client: &Client) -> Result<(), AuthError> {
    let password = Password::new().with_prompt(format!("Password for {}", email)).interact()?;

    client.auth().login(email, &password).await.map_err(AuthError::SignIn)?;

    match client.session().claims() {
        Ok(Some(claims)) => print_success_message(&format!(
            "✅ Signed in as {} ({})",
            claims.sub.as_deref().unwrap_or(email),
            claims.role.as_deref().unwrap_or("no role")
        )),
        _ => print_success_message(&format!("✅ Signed in as {}", email)),
    }

    Ok(())
}
