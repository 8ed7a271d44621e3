//! Minimum hardware a game needs

use crate::impl_entity;

impl_entity!(
    SystemRequirement,
    "system_requirement",
    "system_requirements",
    {
        name: String,
        operational_system: String,
        storage: String,
        processor: String,
        memory: String,
        video_board: String,
    }
);
