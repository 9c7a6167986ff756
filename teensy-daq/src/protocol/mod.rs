//! Serial wire protocol: checksummed codec, number encoding and the command
//! vocabulary.

pub mod codec;
pub mod command;
pub mod mant_exp;

pub use codec::{Codec, LinkError, LinkResult};
pub use command::{Command, RunStatus};
pub use mant_exp::MantExp;
