//! Platform snowflake ids, kept distinct so a user id can't be passed where a
//! guild id is expected.

use std::fmt;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// A guild ("server"). Guilds are the per-scope registration boundary.
    GuildId
);
snowflake!(
    /// A user, whether or not they are a member of the current guild.
    UserId
);
snowflake!(
    /// A text or voice channel.
    ChannelId
);
