//! Macros for defining typed ID types.

/// Macro to define a typed ID wrapping an opaque store-issued string.
///
/// This generates a newtype wrapper around `String` with:
/// - `new()` to wrap a string already known to be valid
/// - `parse()` for strict validation of untrusted input
/// - `as_str()` to borrow the underlying value
/// - `Display` and `FromStr` implementations
/// - `Serialize` and `Deserialize` implementations that validate on intake
/// - `Ord`, `Hash`, and other standard traits so IDs can key maps
///
/// # Example
///
/// ```ignore
/// define_id!(NodeId);
/// define_id!(TaskId);
///
/// let node_id: NodeId = "node-7a1f9c".parse()?;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        /// A typed ID for this object kind.
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Wraps a string already known to be a valid ID.
            ///
            /// Use [`parse`](Self::parse) for untrusted input.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Parses an ID from a string, rejecting empty input and
            /// whitespace or control characters.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                if s.is_empty() {
                    return Err($crate::IdError::Empty);
                }

                if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
                    return Err($crate::IdError::InvalidFormat {
                        message: "ID contains whitespace or control characters".to_string(),
                    });
                }

                Ok(Self(s.to_string()))
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}
