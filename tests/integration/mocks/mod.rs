//! Mock implementations for testing purposes.
//!
//! Trait mocks are generated with `mockall`. The recording helpers in `recorders` capture what an
//! asynchronous pipeline delivered so tests can await it.

mod recorders;

#[allow(unused_imports)]
pub use clients::*;
#[allow(unused_imports)]
pub use recorders::*;
#[allow(unused_imports)]
pub use services::*;
