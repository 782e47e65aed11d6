//! User messages and entering entities.
//!
//! Stateless translations, apart from the ping cap and the cosmetics map
//! that is only reported at the end of the replay.

use std::collections::BTreeMap;

use crate::core::entry::{kind, Entry};
use crate::core::property::{get_property, Entity};
use crate::core::world::World;
use crate::decoder::events::UserMessage;
use crate::engine::constants::{
    prop, CHAT_CHANNEL_ALL_CHAT, CLASS_PREFIX_ITEM, CLASS_WEARABLE_ITEM, MAX_PING_COUNT,
    STEAM_ID_OFFSET,
};
use crate::engine::slots::{resolve_slot, PlayerSlots};

// =============================================================================
// USER MESSAGES
// =============================================================================

/// Turns user messages into entries.
#[derive(Debug, Default)]
pub struct MessageHandler {
    pings: u32,
}

impl MessageHandler {
    /// Create a handler with no pings counted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pings seen so far, including dropped ones.
    pub fn ping_count(&self) -> u32 {
        self.pings
    }

    /// Translate one message. `None` for dropped pings.
    pub fn handle(&mut self, world: &World, time: i32, message: &UserMessage) -> Option<Entry> {
        let entry = match message {
            UserMessage::SpectatorPlayerUnitOrders { entindex, order_type } => Entry {
                slot: resolve_slot(world.entities.get(*entindex)),
                key: Some(order_type.to_string()),
                ..Entry::new(time, kind::ACTIONS)
            },
            UserMessage::LocationPing { player_id } => {
                self.pings = self.pings.saturating_add(1);
                if self.pings > MAX_PING_COUNT {
                    return None;
                }
                Entry {
                    slot: Some(*player_id),
                    ..Entry::new(time, kind::PINGS)
                }
            }
            UserMessage::ChatEvent { chat_type, value, playerid_1, playerid_2 } => Entry {
                player1: Some(*playerid_1),
                player2: Some(*playerid_2),
                value: Some(*value),
                ..Entry::new(time, chat_type.as_str())
            },
            UserMessage::ChatMessage { channel_type, source_player_id, message_text } => {
                let tag = if *channel_type == CHAT_CHANNEL_ALL_CHAT {
                    kind::CHAT.to_string()
                } else {
                    channel_type.to_string()
                };
                Entry {
                    slot: Some(*source_player_id),
                    key: Some(message_text.clone()),
                    ..Entry::new(time, tag)
                }
            }
            UserMessage::ChatWheel { player_id, chat_message_id } => Entry {
                slot: Some(*player_id),
                key: Some(chat_message_id.to_string()),
                ..Entry::new(time, kind::CHATWHEEL)
            },
            UserMessage::SayTextS1 { prefix, text } => Entry {
                unit: Some(prefix.clone()),
                key: Some(text.clone()),
                ..Entry::new(time, kind::CHAT)
            },
            UserMessage::SayTextS2 { entityindex, param1, param2 } => Entry {
                unit: Some(param1.clone()),
                key: Some(param2.clone()),
                slot: resolve_slot(world.entities.get(*entityindex)),
                ..Entry::new(time, kind::CHAT)
            },
        };
        Some(entry)
    }
}

// =============================================================================
// ENTERING ENTITIES
// =============================================================================

/// Cosmetics and neutral items observed as entities enter the world.
#[derive(Debug, Default)]
pub struct EnteredEntities {
    /// item definition index -> player slot
    cosmetics: BTreeMap<i32, i32>,
}

impl EnteredEntities {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cosmetics seen so far.
    pub fn cosmetics(&self) -> &BTreeMap<i32, i32> {
        &self.cosmetics
    }

    /// Inspect an entering entity; returns an entry for neutral items.
    pub fn on_entered(&mut self, entity: &Entity, time: i32, slots: &PlayerSlots) -> Option<Entry> {
        let class = entity.class_name.as_str();
        if class == CLASS_WEARABLE_ITEM {
            self.record_wearable(entity, slots);
            return None;
        }
        let item = class.strip_prefix(CLASS_PREFIX_ITEM)?;
        if item.starts_with("Tier") && item.ends_with("Token") {
            return Some(Entry {
                slot: resolve_slot(Some(entity)),
                key: Some(item.to_string()),
                ..Entry::new(time, kind::NEUTRAL_TOKEN)
            });
        }
        neutral_drop(entity, item, time)
    }

    fn record_wearable(&mut self, entity: &Entity, slots: &PlayerSlots) {
        let e = Some(entity);
        let account_id: Option<i32> = get_property(e, prop::ACCOUNT_ID, None);
        let definition: Option<i32> = get_property(e, prop::ITEM_DEFINITION_INDEX, None);
        if let (Some(account_id), Some(definition)) = (account_id, definition) {
            if account_id <= 0 {
                return;
            }
            if let Some(player_slot) = slots.player_slot_by_steam_id(STEAM_ID_OFFSET + account_id as i64) {
                self.cosmetics.insert(definition, player_slot);
            }
        }
    }
}

/// Neutral item drop, if the entity is flagged as one.
fn neutral_drop(entity: &Entity, item: &str, time: i32) -> Option<Entry> {
    let e = Some(entity);
    let active: Option<bool> = get_property(e, prop::NEUTRAL_ACTIVE_DROP, None);
    let passive: Option<bool> = get_property(e, prop::NEUTRAL_PASSIVE_DROP, None);
    let team: i32 = get_property(e, prop::NEUTRAL_DROP_TEAM, None).unwrap_or(0);
    let dropped = active.unwrap_or(false) || passive.unwrap_or(false);
    if team == 0 || !dropped {
        return None;
    }
    Some(Entry {
        slot: resolve_slot(e),
        key: Some(item.to_string()),
        is_neutral_active_drop: active,
        is_neutral_passive_drop: passive,
        ..Entry::new(time, kind::NEUTRAL_ITEM_HISTORY)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::property::array_index;
    use crate::engine::slots::InitOutcome;

    fn world() -> World {
        let mut world = World::new();
        world.entities.insert(Entity::new(5, 5, 1, "CDOTAPlayerController").with("m_nPlayerID", 6));
        world
    }

    #[test]
    fn test_actions_slot_from_entity() {
        let mut h = MessageHandler::new();
        let msg = UserMessage::SpectatorPlayerUnitOrders { entindex: 5, order_type: 4 };
        let e = h.handle(&world(), 12, &msg).unwrap();
        assert_eq!(e.kind, kind::ACTIONS);
        assert_eq!(e.slot, Some(3));
        assert_eq!(e.key.as_deref(), Some("4"));

        let unknown = UserMessage::SpectatorPlayerUnitOrders { entindex: 77, order_type: 1 };
        assert_eq!(h.handle(&world(), 12, &unknown).unwrap().slot, None);
    }

    #[test]
    fn test_pings_capped() {
        let mut h = MessageHandler::new();
        let w = world();
        let ping = UserMessage::LocationPing { player_id: 2 };
        for _ in 0..MAX_PING_COUNT {
            assert!(h.handle(&w, 0, &ping).is_some());
        }
        assert!(h.handle(&w, 0, &ping).is_none());
        assert_eq!(h.ping_count(), MAX_PING_COUNT + 1);
    }

    #[test]
    fn test_chat_channels() {
        let mut h = MessageHandler::new();
        let all = UserMessage::ChatMessage {
            channel_type: 11,
            source_player_id: 1,
            message_text: "gg".into(),
        };
        let e = h.handle(&world(), 0, &all).unwrap();
        assert_eq!(e.kind, "chat");
        assert_eq!(e.key.as_deref(), Some("gg"));
        assert_eq!(e.slot, Some(1));

        let team = UserMessage::ChatMessage {
            channel_type: 12,
            source_player_id: 1,
            message_text: "push".into(),
        };
        assert_eq!(h.handle(&world(), 0, &team).unwrap().kind, "12");
    }

    #[test]
    fn test_chat_event_and_say_text() {
        let mut h = MessageHandler::new();
        let ev = UserMessage::ChatEvent {
            chat_type: "CHAT_MESSAGE_RUNE_PICKUP".into(),
            value: 3,
            playerid_1: 4,
            playerid_2: -1,
        };
        let e = h.handle(&world(), 0, &ev).unwrap();
        assert_eq!(e.kind, "CHAT_MESSAGE_RUNE_PICKUP");
        assert_eq!((e.player1, e.player2, e.value), (Some(4), Some(-1), Some(3)));

        let s2 = UserMessage::SayTextS2 {
            entityindex: 5,
            param1: "Player".into(),
            param2: "hello".into(),
        };
        let e = h.handle(&world(), 0, &s2).unwrap();
        assert_eq!(e.unit.as_deref(), Some("Player"));
        assert_eq!(e.slot, Some(3));

        let wheel = UserMessage::ChatWheel { player_id: 2, chat_message_id: 71 };
        assert_eq!(h.handle(&world(), 0, &wheel).unwrap().key.as_deref(), Some("71"));
    }

    fn slots() -> PlayerSlots {
        let mut resource = Entity::new(2, 2, 10, "CDOTA_PlayerResource");
        for i in 0..10 {
            let idx = array_index(i);
            resource = resource
                .with(format!("m_vecPlayerData.{}.m_iPlayerTeam", idx), if i < 5 { 2 } else { 3 })
                .with(format!("m_vecPlayerData.{}.m_iPlayerSteamID", idx), STEAM_ID_OFFSET + 10 + i as i64)
                .with(format!("m_vecPlayerTeamData.{}.m_iTeamSlot", idx), (i % 5) as i32);
        }
        let mut slots = PlayerSlots::new();
        assert!(matches!(slots.initialize(&resource, 0), InitOutcome::Initialized(_)));
        slots
    }

    #[test]
    fn test_wearables_map_to_player_slot() {
        let slots = slots();
        let mut entered = EnteredEntities::new();
        let wearable = Entity::new(9, 9, 3, "CDOTAWearableItem")
            .with("m_iAccountID", 17)
            .with("m_iItemDefinitionIndex", 4242);
        assert!(entered.on_entered(&wearable, 0, &slots).is_none());
        let unknown = Entity::new(10, 10, 3, "CDOTAWearableItem")
            .with("m_iAccountID", 99)
            .with("m_iItemDefinitionIndex", 1);
        entered.on_entered(&unknown, 0, &slots);
        assert_eq!(entered.cosmetics().len(), 1);
        assert_eq!(entered.cosmetics().get(&4242), Some(&130));
    }

    #[test]
    fn test_neutral_token_and_drop() {
        let slots = slots();
        let mut entered = EnteredEntities::new();
        let token = Entity::new(11, 11, 4, "CDOTA_Item_Tier2Token").with("m_hOwnerEntity", 1);
        let e = entered.on_entered(&token, 600, &slots).unwrap();
        assert_eq!(e.kind, kind::NEUTRAL_TOKEN);
        assert_eq!(e.key.as_deref(), Some("Tier2Token"));

        let drop = Entity::new(12, 12, 4, "CDOTA_Item_TrustyShovel")
            .with("m_bIsNeutralActiveDrop", true)
            .with("m_nNeutralDropTeam", 2)
            .with("m_iPlayerOwnerID", 4);
        let e = entered.on_entered(&drop, 700, &slots).unwrap();
        assert_eq!(e.kind, kind::NEUTRAL_ITEM_HISTORY);
        assert_eq!(e.key.as_deref(), Some("TrustyShovel"));
        assert_eq!(e.slot, Some(2));
        assert_eq!(e.is_neutral_active_drop, Some(true));
        assert_eq!(e.is_neutral_passive_drop, None);

        let bought = Entity::new(13, 13, 4, "CDOTA_Item_Tango");
        assert!(entered.on_entered(&bought, 0, &slots).is_none());
        let hero = Entity::new(14, 14, 4, "CDOTA_Unit_Hero_Axe");
        assert!(entered.on_entered(&hero, 0, &slots).is_none());
    }
}
