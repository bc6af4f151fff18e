// SPDX-License-Identifier: Apache-2.0
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id_newtype {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Builds an id from a string, typically assigned by the caller
            /// (join handler for actors, content loader for obstacles).
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! counter_id_newtype {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Builds an id from a raw integer minted by a monotonic
            /// counter. Callers are responsible for uniqueness.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw integer backing this id.
            #[must_use]
            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id_newtype!(
    ActorId,
    "Identifies a player or NPC actor, world-unique. Assigned as a string: \
     a player's at `/join`, an NPC's at world construction."
);
counter_id_newtype!(
    EffectId,
    "Identifies a live effect instance, world-unique. Minted by a monotonic \
     counter on the world, freshly for every spawn."
);
string_id_newtype!(
    EffectDefId,
    "Identifies an effect definition in the process-wide effect registry."
);
string_id_newtype!(
    GroundItemId,
    "Identifies a dropped item stack lying on the ground."
);
string_id_newtype!(ObstacleId, "Identifies a static collidable obstacle.");
