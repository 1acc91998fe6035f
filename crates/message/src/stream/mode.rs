//! Read/write capabilities derived from an `fopen`-style mode string.

use std::fs::OpenOptions;
use std::io;

/// Capabilities of a stream, derived once from the mode string of its resource.
///
/// | mode contains         | readable | writable |
/// |-----------------------|----------|----------|
/// | `r`                   | yes      | no       |
/// | `w`, `a`, `x` or `c`  | no       | yes      |
/// | `+`                   | yes      | yes      |
///
/// The `b` and `t` flags carry no capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessMode {
    readable: bool,
    writable: bool,
}

impl AccessMode {
    pub fn parse(mode: &str) -> Self {
        let plus = mode.contains('+');
        Self {
            readable: plus || mode.contains('r'),
            writable: plus || mode.contains(['w', 'a', 'x', 'c']),
        }
    }

    #[inline]
    pub fn is_readable(&self) -> bool {
        self.readable
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

/// Maps an `fopen` mode onto [`OpenOptions`].
pub(crate) fn open_options(mode: &str) -> io::Result<OpenOptions> {
    let plus = mode.contains('+');
    let mut options = OpenOptions::new();

    match mode.trim_end_matches(['b', 't', '+']).trim_start_matches(['b', 't']) {
        "r" => options.read(true).write(plus),
        "w" => options.write(true).read(plus).create(true).truncate(true),
        "a" => options.append(true).read(plus).create(true),
        "x" => options.write(true).read(plus).create_new(true),
        "c" => options.write(true).read(plus).create(true),
        _ => return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("invalid file mode {mode:?}"))),
    };

    Ok(options)
}
