//! Admin and client accounts
//!
//! Credentials live with the authentication layer and are not part of the
//! record.

use crate::{impl_entity, impl_field_enum};

impl_field_enum!(
    Profile {
        Admin => "admin",
        Client => "client",
    }
);

impl_entity!(
    User,
    "user",
    "users",
    {
        name: String,
        email: String,
        profile: Profile,
    }
);
