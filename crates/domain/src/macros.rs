//! Display/FromStr for the small text-backed enums
//!
//! Roles and sale statuses are stored as lowercase text in SQLite and
//! accepted case-insensitively from the command line.
//!
//! ```rust
//! use fyxed_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum PayoutState {
//!     Draft,
//!     Settled,
//! }
//!
//! impl_domain_status_conversions!(PayoutState {
//!     Draft => "draft",
//!     Settled => "settled",
//! });
//!
//! assert_eq!(PayoutState::Settled.to_string(), "settled");
//! assert_eq!("DRAFT".parse::<PayoutState>(), Ok(PayoutState::Draft));
//! ```

/// Implements `Display` (lowercase text) and case-insensitive `FromStr`
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
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
