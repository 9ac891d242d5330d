/// ABI decoding error for contract return data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Return data shorter than one 32-byte word.
    ShortData(usize),
    /// Word does not fit the requested integer width.
    Overflow,
    /// Word is not a canonical `bool` (0 or 1).
    InvalidBool,
}

impl std::fmt::Display for AbiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShortData(len) => write!(f, "return data too short: {len} bytes"),
            Self::Overflow => write!(f, "value does not fit in target integer"),
            Self::InvalidBool => write!(f, "invalid bool encoding"),
        }
    }
}

impl std::error::Error for AbiError {}
