//! Transaction intents, signing material and pipeline state
//!
//! Every chain pipeline consumes a body from [`intent`], resolves its signing
//! material through [`resolver`] and reports a [`SendResult`].

pub mod intent;
pub mod resolver;
pub mod types;

pub use intent::*;
pub use resolver::*;
pub use types::*;
