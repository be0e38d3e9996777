use serde_json::Value;
use stockroom::{Client, ClientConfig, SessionEvent, SessionManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new(&ClientConfig::default(), SessionManager::in_memory())?;
    let mut events = client.subscribe();

    match client.auth().login("admin@stockroom.test", "your_password").await {
        Ok(_) => println!("✅ Signed in"),
        Err(e) => println!("❌ Sign in failed: {}", e),
    }

    // an expired access token is reissued and the call replayed transparently
    match client.http().get::<Value>("orders").await {
        Ok(orders) => println!("✅ Orders: {}", orders),
        Err(e) => println!("❌ Failed to load orders: {}", e),
    }

    let decision = client.navigation().before_each("/admin/lots")?;
    println!("Navigation to /admin/lots: {:?}", decision);

    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::Expired { reason, redirect_to } => {
                println!("⚠️  {} (go to {})", reason, redirect_to)
            }
            other => println!("Session event: {:?}", other),
        }
    }

    Ok(())
}
