use crate::{impl_entity, impl_field_enum};
use chrono::{DateTime, Utc};

impl_field_enum!(
    CouponStatus {
        Active => "active",
        Inactive => "inactive",
    }
);

impl_entity!(
    Coupon,
    "coupon",
    "coupons",
    {
        name: String,
        code: String,
        status: CouponStatus,
        discount_value: f64,
        max_use: i64,
        due_date: DateTime<Utc>,
    }
);
