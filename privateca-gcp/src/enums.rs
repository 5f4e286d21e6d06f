//! String-valued API enums
//!
//! Values unknown to this crate are kept verbatim in `Unrecognized` so a newer
//! server never breaks a read, and they are sent back unchanged.

use std::fmt;
use std::str::FromStr;

use privateca_core::differ::{DiffInfo, Differ, FieldPath};
use privateca_core::field::Field;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// A value not known to this version of the crate
            Unrecognized(String),
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Unrecognized(s) => s,
                }
            }

            pub fn is_unrecognized(&self) -> bool {
                matches!(self, $name::Unrecognized(_))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s {
                    $($wire => $name::$variant,)+
                    other => $name::Unrecognized(other.to_string()),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                let Ok(value) = s.parse::<$name>();
                Ok(value)
            }
        }

        impl Field for $name {
            fn is_zero(&self) -> bool {
                self.as_str().is_empty()
            }

            fn render(&self) -> String {
                self.as_str().to_string()
            }

            fn compare(&self, actual: &Self, info: DiffInfo, path: &FieldPath, differ: &mut Differ) {
                if self != actual {
                    differ.push(path, Some(self.render()), Some(actual.render()), info);
                }
            }
        }
    };
}

string_enum! {
    /// Whether the CA signs its own certificate or is signed by another CA
    CertificateAuthorityType {
        SelfSigned => "SELF_SIGNED",
        Subordinate => "SUBORDINATE",
    }
}

string_enum! {
    Tier {
        Enterprise => "ENTERPRISE",
        Devops => "DEVOPS",
    }
}

string_enum! {
    /// Lifecycle state of a Certificate Authority
    State {
        Enabled => "ENABLED",
        Disabled => "DISABLED",
        Staged => "STAGED",
        AwaitingUserActivation => "AWAITING_USER_ACTIVATION",
        Deleted => "DELETED",
    }
}

string_enum! {
    /// Algorithm of a key managed by the service
    SignHashAlgorithm {
        RsaPss2048Sha256 => "RSA_PSS_2048_SHA256",
        RsaPss3072Sha256 => "RSA_PSS_3072_SHA256",
        RsaPss4096Sha256 => "RSA_PSS_4096_SHA256",
        RsaPkcs12048Sha256 => "RSA_PKCS1_2048_SHA256",
        RsaPkcs13072Sha256 => "RSA_PKCS1_3072_SHA256",
        RsaPkcs14096Sha256 => "RSA_PKCS1_4096_SHA256",
        EcP256Sha256 => "EC_P256_SHA256",
        EcP384Sha384 => "EC_P384_SHA384",
    }
}

string_enum! {
    KeyFormat {
        Pem => "PEM",
    }
}
