//! Domain layer: identifiers, identification results, catch entries,
//! the per-session state machine, and the event system.

pub mod assembler;
pub mod catch_entry;
pub mod catch_event;
pub mod catch_id;
pub mod event_bus;
pub mod fish;
pub mod image;
pub mod session;
pub mod session_id;
pub mod session_registry;

pub use assembler::{AssembleError, assemble};
pub use catch_entry::{CatchDetails, CatchDetailsDraft, CatchLogEntry};
pub use catch_event::CatchEvent;
pub use catch_id::CatchId;
pub use event_bus::EventBus;
pub use fish::{CANNOT_BE_ESTIMATED, FishIdentification};
pub use image::{ImageError, ImageUpload};
pub use session::{Generation, Resolution, Session, SessionSnapshot, View};
pub use session_id::SessionId;
pub use session_registry::{SessionHandle, SessionRegistry};
