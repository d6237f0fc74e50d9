//! Protoidl: a backtracking recursive-descent parser for a small RPC
//! interface-definition language.
//!
//! ```
//! let file = protoidl::parse(
//!     "message Req { id: uint64 }\n\
//!      message Resp { ok: bool }\n\
//!      method Lookup(Req) -> Resp;",
//! )
//! .unwrap();
//! assert_eq!(file.methods()[0].name, "Lookup");
//! ```

pub use crate::config::{DuplicatePolicy, ParseOptions, TrailingComma};
pub use crate::errors::{ErrorKind, IdlError, PResult, ParseDiagnostic, ParseError};
pub use crate::ir::{
    FieldDescriptor, FileDescriptor, MessageDescriptor, MessageRef, MessageRegistry,
    MethodDescriptor,
};
pub use crate::syntax::{parse, parse_file, IdlParser};

pub mod cli;
pub mod config;
pub mod errors;
pub mod ir;
pub mod syntax;
