use chrono::{DateTime, Utc};
use stockroom::Client;
use stockroom_core::{SessionError, TokenClaims};

use crate::{
    commands::error::AuthError,
    console::{print_error_message, print_table, print_warn_message},
};

fn format_timestamp(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))
        .map(|time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn claim_rows(claims: &TokenClaims, now: i64) -> Vec<Vec<String>> {
    let state = if claims.is_expired_at(now) { "expired" } else { "valid" };

    vec![
        vec!["Subject".to_string(), claims.sub.clone().unwrap_or_else(|| "-".to_string())],
        vec!["Role".to_string(), claims.role.clone().unwrap_or_else(|| "-".to_string())],
        vec!["Issued".to_string(), format_timestamp(claims.iat)],
        vec!["Expires".to_string(), format_timestamp(claims.exp)],
        vec!["Access token".to_string(), state.to_string()],
    ]
}

/// Shows the decoded claims of the stored access token.
pub fn handle_status(client: &Client) -> Result<(), AuthError> {
    let has_refresh_token = client.session().get_refresh_token()?.is_some();

    match client.session().claims() {
        Ok(Some(claims)) => {
            let mut rows = claim_rows(&claims, Utc::now().timestamp());
            rows.push(vec![
                "Refresh token".to_string(),
                if has_refresh_token { "stored" } else { "missing" }.to_string(),
            ]);
            print_table(vec!["Field", "Value"], rows, Some("Session"), None);
        }
        Ok(None) => print_warn_message("Not signed in. Run `stockroom login --email <email>`."),
        Err(SessionError::Claims(e)) => {
            print_error_message(&format!("❌ Stored access token can not be decoded: {}", e))
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
