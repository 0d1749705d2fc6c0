//! Simulator serial framing protocol
//!
//! Device to host frames start with the `$` sigil followed by a one-byte
//! selector and are newline terminated. The bitmap frame (`$b`) is the only
//! one with a binary payload, whose length is taken from its header. Lines
//! without a sigil are free-form log output.
//!
//! | Frame  | Format                                   |
//! |--------|------------------------------------------|
//! | Bitmap | `$b<x>,<y>,<w>,<h>\n` + `w*h*2` raw bytes |
//! | Rect   | `$R<x>,<y>,<w>,<h>,<color>\n`             |
//! | GPIO   | `$G<pin>,<val>\n`                         |
//! | Motor  | `$M<target>,<current>,<dir>[,...]\n`      |
//! | Log    | anything else, up to `\n`                 |
//!
//! Host to device commands are `$I<pin>,<val>\n` and `$D<delta>\n`.

pub mod decoder;
pub mod encoder;

pub use decoder::{parse_text_frame, FrameDecoder, FrameOutcome};
pub use encoder::{encode_command, parse_command};

/// Frame start marker
pub const SIGIL: u8 = b'$';

/// Line and header terminator
pub const TERMINATOR: u8 = b'\n';

/// Binary bitmap selector
pub const BITMAP_SELECTOR: u8 = b'b';

/// Rectangle selector
pub const RECT_SELECTOR: char = 'R';

/// GPIO report selector
pub const GPIO_SELECTOR: char = 'G';

/// Motor telemetry selector
pub const MOTOR_SELECTOR: char = 'M';

/// GPIO input command selector
pub const GPIO_INPUT_SELECTOR: char = 'I';

/// Dial delta command selector
pub const DIAL_DELTA_SELECTOR: char = 'D';

/// Bytes per bitmap pixel (RGB565, big-endian)
pub const BYTES_PER_PIXEL: usize = 2;
