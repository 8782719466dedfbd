use std::fmt;
use std::process::ExitCode;

/// Process exit statuses other than success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    General = 1,
    FailOn = 2,
    BadInput = 3,
    Oracle = 4,
    InvalidOutput = 5,
}

impl ExitKind {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// An error that already knows which exit status it maps to.
#[derive(Debug)]
pub struct Failure {
    pub kind: ExitKind,
    pub error: anyhow::Error,
}

impl Failure {
    pub fn new(kind: ExitKind, error: impl Into<anyhow::Error>) -> Self {
        Self {
            kind,
            error: error.into(),
        }
    }

    pub fn input(message: impl fmt::Display) -> Self {
        Self::new(ExitKind::BadInput, anyhow::anyhow!("{message}"))
    }

    /// Writes the message to stderr and returns the status.
    pub fn report(&self) -> ExitCode {
        match self.kind {
            ExitKind::FailOn => eprintln!("{:#}", self.error),
            _ => eprintln!("error: {:#}", self.error),
        }
        ExitCode::from(self.kind.code())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)
    }
}

pub type CliResult<T> = std::result::Result<T, Failure>;

/// Tags a fallible result with the exit status of its failure class.
pub trait ExitContext<T> {
    fn exit_with(self, kind: ExitKind) -> CliResult<T>;
}

impl<T, E> ExitContext<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn exit_with(self, kind: ExitKind) -> CliResult<T> {
        self.map_err(|err| Failure::new(kind, err))
    }
}
