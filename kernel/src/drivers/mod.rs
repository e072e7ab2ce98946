// Chip-level drivers, board-independent.
//
// Pin assignments and bus wiring live in the firmware crate's board/
// module; these only see embedded-hal traits.

pub mod icnt86;
pub mod keys;
pub mod ssd1680;
