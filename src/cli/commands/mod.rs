//! One module per subcommand, each exposing `execute`.

pub mod audit_cmd;
pub mod generate;
pub mod keygen;
pub mod serve;
pub mod strength;
pub mod token;
