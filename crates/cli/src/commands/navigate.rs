use stockroom::{Client, NavigationDecision};

use crate::{
    commands::error::NavigationError,
    console::{print_success_message, print_warn_message},
};

/// Runs the navigation guard for `route` and prints where the user would end up.
pub fn handle_navigate(route: &str, client: &Client) -> Result<(), NavigationError> {
    let destination = client.navigation().routes().resolve(route);

    match client.navigation().before_each(route)? {
        NavigationDecision::Allow => {
            let label = destination.title.or(destination.name).unwrap_or_default();
            print_success_message(&format!("✅ {} allowed {}", destination.path, label));
        }
        NavigationDecision::Redirect(redirect) => {
            print_warn_message(&format!(
                "↪ {} redirected to {} ({:?})",
                destination.path, redirect.to, redirect.reason
            ));
            if redirect.clear_credentials {
                print_warn_message("Stored credentials were cleared");
            }
        }
    }

    Ok(())
}
