use thiserror::Error;

macro_rules! malformed_instruction {
    // Single string version
    ($msg:expr) => {
        $crate::Error::MalformedInstruction {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::MalformedInstruction {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

pub(crate) use malformed_instruction;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur while parsing Bril programs,
/// building control flow graphs, computing dominance information, and transforming functions
/// into or out of SSA form. Each variant provides specific context about the failure mode to
/// enable appropriate error handling.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::MalformedInstruction`] - An instruction record violates the IR invariants
/// - [`Error::JsonError`] - The input is not valid Bril JSON
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Analysis Errors
/// - [`Error::GraphError`] - CFG construction or lookup failure
/// - [`Error::AmbiguousImmediateDominator`] - Irreducible control flow broke the tree invariant
/// - [`Error::SsaError`] - SSA construction or destruction failure
///
/// # Examples
///
/// ```rust,no_run
/// use brilssa::{Error, ir::Program};
///
/// match Program::from_file("program.json".as_ref()) {
///     Ok(program) => println!("Loaded {} functions", program.functions.len()),
///     Err(Error::JsonError(e)) => eprintln!("Not a Bril program: {e}"),
///     Err(Error::MalformedInstruction { message, file, line }) => {
///         eprintln!("Malformed instruction: {message} ({file}:{line})");
///     }
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An instruction record violates the IR invariants.
    ///
    /// Raised when an instruction carries a `dest` without a `type`, or when a phi
    /// instruction's `labels` and `args` lists are missing or misaligned. The error
    /// includes the source location where the malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("MalformedInstruction - {file}:{line}: {message}")]
    MalformedInstruction {
        /// The message to be printed for the malformed instruction
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A block has more than one immediate-dominator candidate.
    ///
    /// The candidate-elimination rule yields exactly one immediate dominator for every
    /// non-entry block of a reducible CFG. Irreducible control flow can leave several
    /// candidates standing; the dominator tree records all of them as parent edges, and
    /// any accessor that assumes a true tree raises this error instead of guessing.
    #[error("Ambiguous immediate dominator for block '{block}': candidates {candidates:?}")]
    AmbiguousImmediateDominator {
        /// The block with multiple immediate-dominator candidates
        block: String,
        /// All surviving candidates, in block order
        candidates: Vec<String>,
    },

    /// CFG construction or lookup failure.
    ///
    /// Covers structural problems such as an empty function body, a branch target
    /// that names no block, or an internal name-index mismatch.
    #[error("{0}")]
    GraphError(String),

    /// SSA construction or destruction failure.
    ///
    /// Covers attempts to build SSA form from a function that already contains phi
    /// instructions, and internal invariant violations during renaming.
    #[error("{0}")]
    SsaError(String),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while reading program input
    /// or writing transformed output.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// JSON (de)serialization error from the Bril wire format.
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),
}
