//! Value objects - immutable types that represent domain concepts

mod color;
mod permissions;
mod snowflake;

pub use color::{Color, ColorParseError};
pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeParseError};
