//! UCI protocol errors.

/// Errors raised while parsing or executing UCI commands.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// `position` without `startpos` or `fen`.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// The FEN could not be parsed or describes an illegal setup.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The offending FEN.
        fen: String,
    },

    /// A move in the `moves` list is not legal in the position it applies to.
    #[error("invalid move: {uci_move}")]
    InvalidMove {
        /// The offending move in UCI notation.
        uci_move: String,
    },

    /// A `go` parameter was given without a value.
    #[error("missing value for go parameter {param}")]
    MissingGoValue {
        /// Parameter name.
        param: String,
    },

    /// A `go` parameter value is not a valid number.
    #[error("invalid value for go parameter {param}: {value}")]
    InvalidGoValue {
        /// Parameter name.
        param: String,
        /// The value that failed to parse.
        value: String,
    },

    /// `setoption` named an unknown option or carried a bad value.
    #[error("invalid option {name}: {value}")]
    InvalidOption {
        /// Option name as sent by the GUI.
        name: String,
        /// Option value as sent by the GUI.
        value: String,
    },

    /// Reading from stdin failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
