pub mod codec;
pub mod command;
pub mod framer;
pub mod inputs;
pub mod refresh;
pub mod schema;
pub mod state;

pub use codec::IspCodec;
pub use command::{Command, SetValue};
pub use framer::LineFramer;
pub use inputs::InputDirectory;
pub use refresh::{RefreshAction, RefreshCycle, RefreshState};
pub use schema::AttributeKey;
pub use state::{ParseOutcome, StateTable};
