//!
//! # Enum-String Normalization Module
//!
//! Primarily defines the [enumstr] macro and paired [EnumStr] trait,
//! mapping fieldless enums to and from the strings which represent them in text formats.
//!
//! Each variant has one canonical string, written on output,
//! and any number of synonyms, accepted on input.
//! Parsing is case-*insensitive*: `"INPUT"`, `"input"`, `"In"` and `"i"` can all name the same variant.
//! Every text boundary funnels through the single [EnumStr::normalize] function,
//! rather than each caller matching strings on its own.
//!
//! Example:
//!
//! ```rust
//! use arch21utils::{enumstr, EnumStr};
//!
//! enumstr!(
//!     /// # Light-Switch States
//!     LightSwitch {
//!         On: "ON" | "1",
//!         Off: "OFF" | "0",
//!     }
//! );
//!
//! assert_eq!(LightSwitch::normalize("on").unwrap(), LightSwitch::On);
//! assert_eq!(LightSwitch::Off.to_str(), "OFF");
//! ```
//!

// Crates.io
use thiserror::Error;

/// # Enum-String Normalization Error
///
/// Produced when a string names none of an enumeration's variants or synonyms.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {enum_name} \"{found}\", expected one of {expected}")]
pub struct EnumStrError {
    /// Name of the enumeration being parsed
    pub enum_name: &'static str,
    /// The offending input string
    pub found: String,
    /// Comma-separated canonical values
    pub expected: String,
}

///
/// # String-Enumeration Trait
///
/// Central methods:
/// * `to_str(&self) -> &'static str` converts the enum to its canonical string.
/// * `from_str(&str) -> Option<Self>` matches the canonical string or any synonym, ignoring case.
/// * `normalize(&str) -> Result<Self, EnumStrError>` is `from_str` with a descriptive error.
///
/// While [EnumStr] can be implemented by hand, its primary intent is
/// for implementation by the [enumstr] macro.
///
pub trait EnumStr: Sized + Copy + 'static {
    /// Enumeration name, used in error messages
    const NAME: &'static str;
    /// Convert to the canonical string value
    fn to_str(&self) -> &'static str;
    /// Match `txt` against canonical values and synonyms, case-insensitively
    fn from_str(txt: &str) -> Option<Self>;
    /// All variants, in declaration order
    fn variants() -> &'static [Self];

    /// Normalize `txt` into a variant, or describe why it cannot be.
    fn normalize(txt: &str) -> Result<Self, EnumStrError> {
        Self::from_str(txt.trim()).ok_or_else(|| EnumStrError {
            enum_name: Self::NAME,
            found: txt.to_string(),
            expected: Self::variants()
                .iter()
                .map(|v| v.to_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

///
/// # Enum-String Pairing Macro
///
/// Creates an `enum` which:
/// * (a) Pairs each variant with a canonical string and optional `|`-separated synonyms.
/// * (b) Implements [EnumStr] for conversions to and from those strings.
/// * (c) Implements [std::fmt::Display], writing the canonical string.
/// * (d) Implements `serde::{Serialize, Deserialize}` as strings, with deserialization routed through [EnumStr::normalize].
///
/// All variants are fieldless. Invoking crates must depend on `serde`.
///
#[macro_export]
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: literal $(| $alias: literal)* ),* $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $( #[doc=$strval]
                $variant ),*
        }
        impl $crate::EnumStr for $enum_name {
            const NAME: &'static str = stringify!($enum_name);
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval ),*
                }
            }
            fn from_str(txt: &str) -> Option<Self> {
                $(
                    if txt.eq_ignore_ascii_case($strval) $(|| txt.eq_ignore_ascii_case($alias))* {
                        return Some(Self::$variant);
                    }
                )*
                None
            }
            fn variants() -> &'static [Self] {
                &[$( Self::$variant ),*]
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(<Self as $crate::EnumStr>::to_str(self))
            }
        }
        impl ::serde::Serialize for $enum_name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(<Self as $crate::EnumStr>::to_str(self))
            }
        }
        impl<'de> ::serde::Deserialize<'de> for $enum_name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let txt = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                <Self as $crate::EnumStr>::normalize(&txt).map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }
    };
}
