use std::fmt;

/// Outcome of an upload as reported by the server that received it.
///
/// The discriminants are the numeric codes used on the wire of form-upload APIs; `5` is not
/// assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum UploadErrorCode {
    #[default]
    Ok = 0,
    /// Larger than the server-wide upload limit.
    IniSize = 1,
    /// Larger than the limit declared by the form.
    FormSize = 2,
    Partial = 3,
    NoFile = 4,
    NoTmpDir = 6,
    CantWrite = 7,
    /// Stopped by a server extension.
    Extension = 8,
}

impl UploadErrorCode {
    pub fn from_code(code: i64) -> Option<Self> {
        let code = match code {
            0 => Self::Ok,
            1 => Self::IniSize,
            2 => Self::FormSize,
            3 => Self::Partial,
            4 => Self::NoFile,
            6 => Self::NoTmpDir,
            7 => Self::CantWrite,
            8 => Self::Extension,
            _ => return None,
        };
        Some(code)
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Ok => "the file uploaded successfully",
            Self::IniSize => "the file exceeds the server upload size limit",
            Self::FormSize => "the file exceeds the size limit declared by the form",
            Self::Partial => "the file was only partially uploaded",
            Self::NoFile => "no file was uploaded",
            Self::NoTmpDir => "missing a temporary folder",
            Self::CantWrite => "failed to write the file to disk",
            Self::Extension => "a server extension stopped the upload",
        }
    }
}

impl fmt::Display for UploadErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}
