use colored::Colorize;
use prettytable::{Cell, Row, Table, format};
use stockroom::SessionEvent;
use stockroom_core::navigation::{INSUFFICIENT_ROLE_NOTICE, SESSION_EXPIRED_NOTICE};
use tokio::sync::broadcast::Receiver;

pub fn print_error_message(error_message: &str) {
    println!("{}", error_message.red());
}

pub fn print_warn_message(error_message: &str) {
    println!("{}", error_message.yellow());
}

pub fn print_success_message(success_message: &str) {
    println!("{}", success_message.green());
}

pub fn print_table<T: AsRef<str>>(
    headers: Vec<T>,
    rows: Vec<Vec<String>>,
    title: Option<&str>,
    footer: Option<&str>,
) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

    let header_cells =
        headers.into_iter().map(|h| Cell::new(h.as_ref()).style_spec("Fb")).collect();
    table.add_row(Row::new(header_cells));

    for row_data in rows {
        let cells = row_data.into_iter().map(|cell| Cell::new(cell.as_ref())).collect();
        table.add_row(Row::new(cells));
    }

    if let Some(title_text) = title {
        println!("\n{}", title_text);
    }

    table.printstd();

    if let Some(footer_text) = footer {
        println!("\n{}", footer_text);
    }
}

/// Prints notices for the session events raised while a command ran.
pub fn print_session_events(events: &mut Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::Expired { reason, redirect_to } => {
                print_warn_message(SESSION_EXPIRED_NOTICE);
                if reason != SESSION_EXPIRED_NOTICE {
                    print_warn_message(&format!("Reason: {}", reason));
                }
                print_warn_message(&format!(
                    "Sign in again with `stockroom login --email <email>` (client route {})",
                    redirect_to
                ));
            }
            SessionEvent::AccessDenied { path, redirect_to } => {
                print_warn_message(&format!(
                    "{} ({} -> {})",
                    INSUFFICIENT_ROLE_NOTICE, path, redirect_to
                ));
            }
            SessionEvent::Refreshed => println!("{}", "Access token reissued".dimmed()),
            SessionEvent::SignedIn | SessionEvent::SignedOut => {}
        }
    }
}
