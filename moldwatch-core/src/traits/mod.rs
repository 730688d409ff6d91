//! Collaborator traits
//!
//! These traits define the interface between the indicator logic and the
//! pieces it treats as black boxes: the metric sink, the renderer, the
//! publish/subscribe transport and the system reset line.

pub mod sink;
pub mod system;
pub mod transport;

pub use sink::{DataSink, LiveStore, RenderTrigger};
pub use system::SystemControl;
pub use transport::{Delivery, Transport, TransportError};
