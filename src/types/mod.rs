//! Response envelopes shared by handlers.

mod response;

pub use response::{ApiResponse, Created};
