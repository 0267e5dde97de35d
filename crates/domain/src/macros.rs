//! Display/FromStr generation for lowercase status enums
//!
//! Status values are persisted as lowercase text columns, so every status
//! enum needs the same pair of conversions.
//!
//! # Example
//!
//! ```rust
//! use adpublish_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum DeliveryState {
//!     Queued,
//!     Delivering,
//!     Halted,
//! }
//!
//! impl_domain_status_conversions!(DeliveryState {
//!     Queued => "queued",
//!     Delivering => "delivering",
//!     Halted => "halted",
//! });
//!
//! assert_eq!(DeliveryState::Halted.to_string(), "halted");
//! assert_eq!("QUEUED".parse::<DeliveryState>(), Ok(DeliveryState::Queued));
//! ```

/// Implements `as_str`, `Display` and case-insensitive `FromStr` for a status
/// enum.
///
/// Each `$str` must be lowercase; parsing lowercases its input before
/// matching. Parse errors name the enum and the rejected input.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical lowercase name.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
