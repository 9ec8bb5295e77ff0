//! # Pith
//!
//! An embeddable runtime for Pith, a small stack-based language whose
//! programs are trees of prototype dictionaries.
//!
//! ## Architecture
//!
//! ```text
//!  source text
//!      │
//!      ▼
//!  ┌────────┐  tokens   ┌────────┐  root slots +   ┌─────────────┐
//!  │ Lexer  │ ────────▶ │ Loader │ ──────────────▶ │   Runtime   │ ◀── host events
//!  └────────┘           └────────┘  dictionaries   └─────────────┘
//!                                                     │        │
//!                                               stack values  view tree
//! ```
//!
//! ```rust
//! use pith::{MemoryFileSystem, Runtime, Value};
//!
//! let mut runtime = Runtime::new(MemoryFileSystem::new());
//! runtime.load("x: 5 end\ny: x 2 + end").unwrap();
//! runtime.run_named_slot("y").unwrap();
//! assert_eq!(runtime.stack(), &[Value::Number(7.0)]);
//! ```

mod dictionary;
mod error;
mod filesystem;
mod gap_buffer;
mod interpreter;
mod lexer;
mod loader;
mod primitives;
mod runtime;
mod signal;
mod span;
mod stack;
mod token;
mod value;
pub mod view;

pub use dictionary::{Dictionary, Slot, find_dict, lookup};
pub use error::{ErrorKind, ExecutionResult, LexError, PithError};
pub use filesystem::{FileSystem, MemoryFileSystem};
pub use gap_buffer::GapBuffer;
pub use lexer::Lexer;
pub use loader::Loader;
pub use primitives::{PRIMITIVES, Primitive, PrimitiveContext, PrimitiveFunction};
pub use runtime::{DEFAULT_RUNTIME, Event, Runtime, RuntimeConfig};
pub use signal::{Signal, SignalRegistry};
pub use span::{Pos, Span};
pub use stack::{ExecutionState, ExecutionStateInfo};
pub use token::{Token, TokenKind};
pub use value::{Block, DictRef, SignalRef, Value, ViewRef, format_number};
pub use view::{Style, View, ViewKind};
