//! Display/FromStr derivation for small configuration enums.
//!
//! ```rust
//! use mes_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Email,
//!     LinkedIn,
//! }
//!
//! impl_domain_enum_conversions!(Channel {
//!     Email => "email",
//!     LinkedIn => "linkedin",
//! });
//!
//! assert_eq!(Channel::LinkedIn.to_string(), "linkedin");
//! assert_eq!(" EMAIL ".parse::<Channel>(), Ok(Channel::Email));
//! ```

/// Implements `Display` and `FromStr` for a fieldless enum.
///
/// Parsing trims surrounding whitespace and ignores ASCII case, so values read
/// from environment variables (`STRIPE_MODE=Live`) are accepted as written.
#[macro_export]
macro_rules! impl_domain_enum_conversions {
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

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
