//! License keys handed out for games

use crate::{impl_entity, impl_field_enum};
use uuid::Uuid;

impl_field_enum!(
    /// Store front the key is redeemed on
    Platform {
        Steam => "steam",
        BattleNet => "battle_net",
        Origin => "origin",
    }
);

impl_field_enum!(
    LicenseStatus {
        Available => "available",
        InUse => "in_use",
        Inactive => "inactive",
    }
);

impl_entity!(
    License,
    "license",
    "licenses",
    {
        key: String,
        platform: Platform,
        status: LicenseStatus,
        game_id: Uuid,
    }
);
