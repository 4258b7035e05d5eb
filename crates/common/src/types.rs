use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a path segment or query value is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    kind: &'static str,
    input: String,
}

impl std::fmt::Display for IdParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid {} ID: {:?}", self.kind, self.input)
    }
}

impl std::error::Error for IdParseError {}

/// Declares a typed wrapper around a database `SERIAL` key.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wraps a raw database key.
            pub fn new(id: i32) -> Self {
                Self(id)
            }

            /// Returns the raw database key.
            pub fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self).map_err(|_| IdParseError {
                    kind: $kind,
                    input: s.to_string(),
                })
            }
        }
    };
}

id_type!(
    /// Identifier of a row in `users`.
    UserId,
    "user"
);

id_type!(
    /// Identifier of a row in `products`.
    ProductId,
    "product"
);

id_type!(
    /// Identifier of a row in `orders`, assigned by the database on insert.
    OrderId,
    "order"
);
