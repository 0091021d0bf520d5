//! GameCube / Wii Video Interface timing emulation
//!
//! The VI owns the display timing registers, counts half-lines as the emulated beam moves, raises
//! display interrupts, and hands each field's external framebuffer to a video backend.

mod aspect;
pub mod interrupts;
pub mod mmio;
pub mod registers;
mod replay;
mod savestate;
mod timing;
pub mod traits;
mod vi;

pub use interrupts::InterruptCause;
pub use replay::RegisterSource;
pub use savestate::SaveStateError;
pub use vi::{FieldType, SI_POLL_HALF_LINES, ViState, VideoInterface};
