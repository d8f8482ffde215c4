//! `identifier!`: non-empty string newtypes for names that key lookups.

/// Declare a non-empty string identifier.
///
/// The type serializes as a plain string and refuses `""` on the way in,
/// through `try_new`, `TryFrom` and serde alike. `Borrow<str>` lets maps
/// keyed by the identifier be queried with `&str`.
macro_rules! identifier {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(into = "String", try_from = "String")]
        $vis struct $Name(String);

        impl $Name {
            const EMPTY: &'static str = concat!(stringify!($Name), " must not be empty");

            /// Wrap a value known to be non-empty.
            ///
            /// # Panics
            /// If `value` is empty.
            pub fn new(value: impl Into<String>) -> Self {
                match Self::try_new(value) {
                    Some(id) => id,
                    None => panic!("{}", Self::EMPTY),
                }
            }

            pub fn try_new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                (!value.is_empty()).then_some(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<$Name> for String {
            fn from(id: $Name) -> String {
                id.0
            }
        }

        impl TryFrom<String> for $Name {
            type Error = &'static str;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::try_new(value).ok_or(Self::EMPTY)
            }
        }

        impl TryFrom<&str> for $Name {
            type Error = &'static str;
            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::try_new(value).ok_or(Self::EMPTY)
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

pub(crate) use identifier;
