//! Macro for implementing Display and FromStr for status enums
//!
//! Status enums are persisted as lowercase text columns and exchanged as
//! lowercase strings with the calendar provider, so every one of them needs
//! the same pair of conversions.
//!
//! # Example
//!
//! ```rust
//! use lexsync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum LinkState {
//!     Pending,
//!     Linked,
//! }
//!
//! impl_domain_status_conversions!(LinkState {
//!     Pending => "pending",
//!     Linked => "linked",
//! });
//!
//! assert_eq!(LinkState::Linked.to_string(), "linked");
//! assert_eq!("PENDING".parse::<LinkState>(), Ok(LinkState::Pending));
//! ```

/// Implements `Display` and case-insensitive `FromStr` for a fieldless enum.
///
/// `FromStr::Err` is a `String` naming the enum and the rejected input.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical lowercase representation.
            pub fn as_str(&self) -> &'static str {
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

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
