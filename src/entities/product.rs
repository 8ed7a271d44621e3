//! Products listed in the store

use crate::{impl_entity, impl_field_enum};
use uuid::Uuid;

impl_field_enum!(
    ProductStatus {
        Available => "available",
        Unavailable => "unavailable",
    }
);

impl_entity!(
    Product,
    "product",
    "products",
    {
        name: String,
        description: String,
        price: f64,
        status: ProductStatus,
        /// Shown on the storefront landing page
        featured: bool,
        /// The game (or other sellable item) behind this product
        productable_id: Uuid,
    }
);
