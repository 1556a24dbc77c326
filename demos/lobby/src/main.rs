use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use bailiff::prelude::*;
use chrono::{TimeDelta, Utc};

// ---------------------------------------------------------------------------
// Host side: who exists, who is online
// ---------------------------------------------------------------------------

struct Roster(HashMap<&'static str, PlayerId>);

impl IdentityResolver for Roster {
    async fn resolve_key(&self, name: &str) -> Option<PlayerId> {
        self.0.get(name).copied()
    }

    async fn render_display_name(&self, player: PlayerId) -> String {
        self.0
            .iter()
            .find(|(_, id)| **id == player)
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| player.to_string())
    }
}

/// Who is in the lobby. Clones share the same set, so the host keeps one
/// handle while the hub holds another.
#[derive(Default, Clone)]
struct Lobby(Arc<Mutex<HashSet<PlayerId>>>);

impl Lobby {
    fn online(&self) -> std::sync::MutexGuard<'_, HashSet<PlayerId>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConnectionGateway for Lobby {
    fn is_connected(&self, player: PlayerId) -> bool {
        self.online().contains(&player)
    }

    async fn kick(&self, player: PlayerId, message: String) {
        self.online().remove(&player);
        eprintln!("kicked {player}:\n{message}\n");
    }
}

// ---------------------------------------------------------------------------
// Scripted lobby
// ---------------------------------------------------------------------------

type Hub = Bailiff<MemoryStore, Roster, Lobby>;

async fn connect(
    hub: &Hub,
    lobby: &Lobby,
    name: &str,
    player: PlayerId,
) -> Result<(), BailiffError> {
    match hub.on_pre_login(player).await {
        Decision::Reject { message, .. } => {
            eprintln!("{name} rejected:\n{message}\n");
        }
        _ => {
            lobby.online().insert(player);
            hub.on_join(player, false).await?;
            eprintln!("{name} joined");
        }
    }
    Ok(())
}

async fn disconnect(
    hub: &Hub,
    lobby: &Lobby,
    name: &str,
    player: PlayerId,
) -> Result<(), BailiffError> {
    lobby.online().remove(&player);
    hub.on_quit(player).await?;
    eprintln!("{name} left");
    Ok(())
}

fn chat(hub: &Hub, name: &str, player: PlayerId, text: &str) {
    match hub.is_muted(player) {
        Some(mute) => eprintln!("({name} is muted: {})", mute.reason),
        None => eprintln!("<{name}> {text}"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    bailiff::init_tracing();

    let (moderator, steve, griefer) = (PlayerId::random(), PlayerId::random(), PlayerId::random());
    let roster = Roster(HashMap::from([
        ("Moderator", moderator),
        ("Steve", steve),
        ("Griefer", griefer),
    ]));

    let lobby = Lobby::default();
    let hub: Hub = Hub::builder()
        .config(BailiffConfig::from_json(
            r#"{ "moderation": { "service": "core", "server_name": "Lobby",
                                 "appeal_link": "https://appeal.example" } }"#,
        )?)
        .build(MemoryStore::new(), roster, lobby.clone());

    for (name, id) in [("Moderator", moderator), ("Steve", steve), ("Griefer", griefer)] {
        connect(&hub, &lobby, name, id).await?;
    }

    chat(&hub, "Steve", steve, "hello!");
    hub.issue(Punishment::new(PunishmentKind::Mute, steve, Some(moderator), "spam", "core"))
        .await?;
    chat(&hub, "Steve", steve, "hello again!");

    hub.issue(
        Punishment::new(PunishmentKind::TempBan, griefer, Some(moderator), "griefing", "core")
            .with_expiry(Utc::now() + TimeDelta::days(7)),
    )
    .await?;
    disconnect(&hub, &lobby, "Griefer", griefer).await?;
    connect(&hub, &lobby, "Griefer", griefer).await?;

    hub.pardon("Griefer", Some(moderator)).await?;
    hub.unmute("Steve", Some(moderator)).await?;
    connect(&hub, &lobby, "Griefer", griefer).await?;
    chat(&hub, "Steve", steve, "thanks");

    {
        let _vanish = hub.begin_visibility_toggle(moderator);
        hub.on_quit(moderator).await?;
        hub.on_join(moderator, true).await?;
    }
    eprintln!(
        "moderator still has session {:?}",
        hub.sessions().current(moderator).map(|s| s.id)
    );

    eprintln!("{} players online", lobby.online().len());

    let closed = hub.shutdown().await?;
    tracing::info!(closed, "lobby closed");
    Ok(())
}
