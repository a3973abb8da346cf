//! SDI-12 sensor bus measurement sessions.

mod session;

pub use pedon_protocol::sdi12::MeasureVerb;
pub use session::{Sdi12Session, SessionState, RESPONSE_CAPACITY};
