use std::path::PathBuf ;
use thiserror::Error ;

use crate::invoker::InvokerState ;



/// Boxed error produced by a library loader or symbol table.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static> ;

/// Outcome of every [`PluginInvoker`]( crate::PluginInvoker ) operation.
pub type OperationResult<T> = Result<T, InvokerError> ;

/// Failure reported by a backend entry point.
///
/// Codes and messages are defined by the backend. The invoker forwards the value
/// exactly as the entry point returned it.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
#[error( "[{code}] {message}" )]
pub struct EntryPointError {
	code: u32,
	message: String,
}

impl EntryPointError {
	/// Creates an entry point error.
	pub fn new( code: u32, message: impl Into<String> ) -> Self {
		Self { code, message: message.into() }
	}
	/// Backend defined error code.
	#[inline] pub fn code( &self ) -> u32 { self.code }
	/// Human readable context.
	#[inline] pub fn message( &self ) -> &str { &self.message }
}

/// Category of an [`InvokerError`].
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum ErrorKind {
	/// See [`InvokerError::LibraryLoad`].
	LibraryLoad,
	/// See [`InvokerError::SymbolResolution`].
	SymbolResolution,
	/// See [`InvokerError::IncompatibleAbi`].
	IncompatibleAbi,
	/// See [`InvokerError::UnsupportedOperation`].
	UnsupportedOperation,
	/// See [`InvokerError::InvalidState`].
	InvalidState,
	/// See [`InvokerError::InvalidArgument`].
	InvalidArgument,
	/// See [`InvokerError::EntryPoint`].
	EntryPoint,
}

/// Errors returned by [`PluginInvoker`]( crate::PluginInvoker ).
///
/// Loading problems and backend failures share this one type, so every operation
/// has the same result shape. Use [`InvokerError::kind`] to tell them apart.
#[derive( Error, Debug )]
pub enum InvokerError {
	/// The library could not be opened (missing file, incompatible binary, permission denied).
	#[error( "Failed to open library {}: {source}", path.display() )]
	LibraryLoad { path: PathBuf, #[source] source: BoxError },
	/// A required entry point is not exported by the library.
	#[error( "Missing symbol {symbol} in {}: {source}", path.display() )]
	SymbolResolution { symbol: &'static str, path: PathBuf, #[source] source: BoxError },
	/// The library was built against an incompatible ABI version.
	#[error(
		"Incompatible ABI version in {}: expected {}, found {}",
		path.display(), crate::abi::format_version( *expected ), crate::abi::format_version( *found )
	)]
	IncompatibleAbi { path: PathBuf, expected: u32, found: u32 },
	/// The operation is not compiled into this build.
	#[error( "Unsupported operation {operation}: {reason}" )]
	UnsupportedOperation { operation: &'static str, reason: &'static str },
	/// The invoker is not in the state the call requires.
	#[error( "Invoker {id} is {state}, expected {expected}" )]
	InvalidState { id: String, state: InvokerState, expected: InvokerState },
	/// An argument was rejected before reaching the entry point.
	#[error( "Invalid argument to {operation}: {reason}" )]
	InvalidArgument { operation: &'static str, reason: &'static str },
	/// The entry point itself reported a failure.
	#[error( "{symbol} failed: {source}" )]
	EntryPoint { symbol: &'static str, #[source] source: EntryPointError },
}

impl InvokerError {

	/// Category of this error.
	pub fn kind( &self ) -> ErrorKind {
		match self {
			Self::LibraryLoad { .. } => ErrorKind::LibraryLoad,
			Self::SymbolResolution { .. } => ErrorKind::SymbolResolution,
			Self::IncompatibleAbi { .. } => ErrorKind::IncompatibleAbi,
			Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
			Self::InvalidState { .. } => ErrorKind::InvalidState,
			Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
			Self::EntryPoint { .. } => ErrorKind::EntryPoint,
		}
	}

	/// The backend's own error, when the failure came from an entry point.
	pub fn entry_point_error( &self ) -> Option<&EntryPointError> {
		match self {
			Self::EntryPoint { source, .. } => Some( source ),
			_ => None,
		}
	}

	/// Consumes the error, returning the backend's own error if there is one.
	pub fn into_entry_point_error( self ) -> Option<EntryPointError> {
		match self {
			Self::EntryPoint { source, .. } => Some( source ),
			_ => None,
		}
	}

	/// Name of the symbol that could not be resolved.
	pub fn missing_symbol( &self ) -> Option<&'static str> {
		match self {
			Self::SymbolResolution { symbol, .. } => Some( *symbol ),
			_ => None,
		}
	}

}
