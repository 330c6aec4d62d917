pub mod arena;
pub mod effect;
mod history;
mod position;
mod pseudo;
mod shogi;
pub mod verify;
pub mod zobrist;

pub use self::history::*;
pub use self::position::*;
pub use self::pseudo::*;
pub use self::shogi::*;
pub use self::verify::{Divergence, REPORT_OK};
