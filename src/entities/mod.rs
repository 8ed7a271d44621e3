//! Catalogue entities managed by the admin API

pub mod macros;

mod coupon;
mod game;
mod license;
mod product;
mod system_requirement;
mod user;

pub use coupon::{Coupon, CouponStatus};
pub use game::{Game, GameMode};
pub use license::{License, LicenseStatus, Platform};
pub use product::{Product, ProductStatus};
pub use system_requirement::SystemRequirement;
pub use user::{Profile, User};
