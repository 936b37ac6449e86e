//! Testing utilities and harness for Kite

pub mod producers;
pub mod recording;
pub mod testing;

pub use producers::*;
pub use recording::*;
pub use testing::*;

pub mod prelude {
    pub use crate::producers::*;
    pub use crate::recording::*;
    pub use crate::testing::*;
}
