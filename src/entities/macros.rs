//! Macros for reducing boilerplate when defining entities
//!
//! These macros generate the repetitive struct definitions and trait
//! implementations needed for each catalogue entity and for the string
//! enums stored on them.

/// Define a string-valued enum attribute
///
/// Generates the enum, its serde representation, `Display`, `FromStr`-like
/// parsing and [`ToFieldValue`](crate::core::field::ToFieldValue), so the
/// attribute can be searched and ordered by its wire value.
///
/// # Example
///
/// ```rust,ignore
/// impl_field_enum!(Platform {
///     Steam => "steam",
///     BattleNet => "battle_net",
/// });
///
/// assert_eq!(Platform::BattleNet.as_str(), "battle_net");
/// ```
#[macro_export]
macro_rules! impl_field_enum {
    (
        $(#[$meta:meta])*
        $type:ident {
            $( $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $type {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $type {
            /// Every variant, in declaration order
            pub const ALL: &'static [$type] = &[ $( $type::$variant ),+ ];

            /// Wire value of this variant
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $type::$variant => $value, )+
                }
            }

            /// Parse a wire value
            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $( $value => Some($type::$variant), )+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $type {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::core::field::ToFieldValue for $type {
            fn to_field_value(&self) -> $crate::core::field::FieldValue {
                $crate::core::field::FieldValue::String(self.as_str().to_string())
            }
        }
    };
}

/// Complete macro to create an entity with automatic trait implementations
///
/// Injects `id`, `created_at` and `updated_at`, implements
/// [`Entity`](crate::core::entity::Entity) with attribute lookup for every
/// declared field, and generates `new()` and `touch()`.
///
/// # Example
///
/// ```rust,ignore
/// use storefront::prelude::*;
///
/// impl_entity!(
///     Coupon,
///     "coupon",
///     "coupons",
///     {
///         name: String,
///         code: String,
///         max_use: i64,
///     }
/// );
///
/// let coupon = Coupon::new("Black Friday".to_string(), "BF2024".to_string(), 100);
/// assert_eq!(coupon.field_value("code"), Some(FieldValue::String("BF2024".into())));
/// ```
#[macro_export]
macro_rules! impl_entity {
    (
        $type:ident,
        $singular:expr,
        $plural:expr,
        {
            $( $(#[$field_meta:meta])* $field:ident : $field_type:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Unique identifier for this entity
            pub id: ::uuid::Uuid,

            /// When this entity was created
            pub created_at: ::chrono::DateTime<::chrono::Utc>,

            /// When this entity was last updated
            pub updated_at: ::chrono::DateTime<::chrono::Utc>,

            $( $(#[$field_meta])* pub $field : $field_type, )*
        }

        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn attribute_names() -> &'static [&'static str] {
                &["id", "created_at", "updated_at", $( stringify!($field) ),*]
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                use $crate::core::field::ToFieldValue;

                match field {
                    "id" => Some(self.id.to_field_value()),
                    "created_at" => Some(self.created_at.to_field_value()),
                    "updated_at" => Some(self.updated_at.to_field_value()),
                    $( stringify!($field) => Some(self.$field.to_field_value()), )*
                    _ => None,
                }
            }
        }

        impl $type {
            /// Create a new instance of this entity
            #[allow(clippy::too_many_arguments)]
            pub fn new( $( $field: $field_type ),* ) -> Self {
                let now = ::chrono::Utc::now();
                Self {
                    id: ::uuid::Uuid::new_v4(),
                    created_at: now,
                    updated_at: now,
                    $( $field ),*
                }
            }

            /// Update the updated_at timestamp to now
            pub fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }
        }
    };
}
