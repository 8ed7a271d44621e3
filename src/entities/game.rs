//! Games sold through products

use crate::{impl_entity, impl_field_enum};
use chrono::{DateTime, Utc};
use uuid::Uuid;

impl_field_enum!(
    /// How a game is played
    GameMode {
        Pvp => "pvp",
        Pve => "pve",
        Both => "both",
    }
);

impl_entity!(
    Game,
    "game",
    "games",
    {
        mode: GameMode,
        developer: String,
        release_date: DateTime<Utc>,
        /// Hardware the game requires
        system_requirement_id: Uuid,
    }
);
