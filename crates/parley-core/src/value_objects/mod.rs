//! Value objects - immutable domain primitives

mod snowflake;

pub use snowflake::{Snowflake, SnowflakeError, SnowflakeGenerator, SnowflakeParseError};
