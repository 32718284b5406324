//! Minimal terminal client: connects to a server, joins a slot and
//! prints the room's message stream with ANSI colors.
//!
//! ```text
//! cargo run --example text_client -- <address> <slot-name> [password]
//! ```

use std::thread;
use std::time::Duration;

use apclient::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut args = std::env::args().skip(1);
    let address = args.next().unwrap_or_else(|| apclient::DEFAULT_ADDRESS.to_string());
    let slot = args.next().unwrap_or_else(|| "Player1".to_string());
    let password = args.next().unwrap_or_default();

    let uuid = apclient::uuid::persistent_uuid_for_host(None, &address);
    let mut client = ApClient::new(&uuid, "", &address);

    loop {
        for event in client.poll() {
            match event {
                ClientEvent::RoomInfo => {
                    println!("* room {} (server {})", client.seed(), client.server_version());
                    let _ = client.connect_slot(&slot, &password, 7, &["TextOnly".into()]);
                }
                ClientEvent::SlotConnected(_) => {
                    println!(
                        "* joined as slot {} on team {}",
                        client.player_number(),
                        client.team_number()
                    );
                }
                ClientEvent::SlotRefused(reasons) => {
                    eprintln!("* join refused: {}", reasons.join(", "));
                    return;
                }
                ClientEvent::PrintJson(args) => {
                    match client.render_json(&args.data, RenderFormat::Ansi) {
                        Ok(line) => println!("{line}"),
                        Err(error) => eprintln!("* render failed: {error}"),
                    }
                }
                ClientEvent::Print(text) => println!("{text}"),
                ClientEvent::ItemsReceived(items) => {
                    for item in items {
                        println!(
                            "* received {} from {} (#{})",
                            client.item_name(item.item, None),
                            client.player_alias(item.player),
                            item.index
                        );
                    }
                }
                _ => {}
            }
        }
        thread::sleep(Duration::from_millis(16));
    }
}
