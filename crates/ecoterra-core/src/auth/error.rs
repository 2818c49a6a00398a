use thiserror::Error;

/// Gateway operation a failure belongs to; picks the generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Register,
    Logout,
    Restore,
    Status,
}

impl Operation {
    /// Localized message shown when the server gave nothing better.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Login => "Terjadi kesalahan saat login",
            Operation::Register => "Terjadi kesalahan saat registrasi",
            Operation::Logout => "Terjadi kesalahan saat logout",
            Operation::Restore | Operation::Status => "Gagal memuat status autentikasi",
        }
    }
}

/// Failure of an auth gateway operation.
///
/// `Display` is the user-facing message; the session store keeps nothing else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The server answered with an error; its message is surfaced verbatim.
    #[error("{0}")]
    Rejected(String),

    /// No answer from the server.
    #[error("{}", .0.failure_message())]
    Unreachable(Operation),

    /// The answer, or the persisted profile, lacked expected fields.
    #[error("{}", .0.failure_message())]
    Malformed(Operation),

    /// Local storage failed.
    #[error("{}", .0.failure_message())]
    Persistence(Operation),
}

impl AuthError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}
