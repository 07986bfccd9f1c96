//! Library loaders and symbol tables.
//!
//! A [`LibraryLoader`] turns a path into an opened library; the library is a
//! [`SymbolTable`] that entry points are resolved from. [`DynamicLoader`] opens
//! shared objects through `libloading`. [`StaticLoader`] serves in-process
//! [`StaticLibrary`] tables, for hosts that link a backend statically.

use std::any::Any ;
use std::collections::HashMap ;
use std::mem::ManuallyDrop ;
use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use pipe_trait::Pipe ;
use thiserror::Error ;

use crate::abi::EntryPoint ;
use crate::context::{ FragmentHandle, FragmentKind, FragmentWrapper, ObjectId };
use crate::error::BoxError ;



/// A source of exported entry points.
pub trait SymbolTable {
	/// Looks up the entry point `E`.
	///
	/// # Errors
	/// Returns an error if the symbol is not exported.
	///
	/// # Safety
	/// If the symbol is found, it must have been exported with exactly the type
	/// `E::Signature`. Tables that cannot check this trust the exporter.
	unsafe fn resolve<E: EntryPoint>( &self ) -> Result<E::Signature, BoxError> ;
}

/// Opens libraries by path.
pub trait LibraryLoader {
	/// The opened library. Fragment handles keep it alive, so it must be
	/// shareable between threads.
	type Library: SymbolTable + Send + Sync + 'static ;

	/// Opens the library at `path`.
	///
	/// # Errors
	/// Returns an error if the library does not exist or cannot be loaded.
	///
	/// # Safety
	/// Opening a library may run arbitrary initialisation code inside it.
	unsafe fn open( &self, path: &Path ) -> Result<Self::Library, BoxError> ;
}

/// Loads shared libraries from the filesystem.
#[derive( Debug, Clone, Copy, Default )]
pub struct DynamicLoader ;

impl LibraryLoader for DynamicLoader {
	type Library = libloading::Library ;

	unsafe fn open( &self, path: &Path ) -> Result<Self::Library, BoxError> {
		unsafe { libloading::Library::new( path ) }.map_err( Into::into )
	}
}

impl SymbolTable for libloading::Library {
	unsafe fn resolve<E: EntryPoint>( &self ) -> Result<E::Signature, BoxError> {
		let symbol = unsafe { self.get::<E::Signature>( E::SYMBOL.as_bytes() )}?;
		// The pointer stays valid for as long as the library is loaded, which the
		// invoker guarantees by owning both.
		Ok( *symbol )
	}
}

/// Errors produced by [`StaticLibrary`] and [`StaticLoader`].
#[derive( Debug, Error )]
pub enum StaticSymbolError {
	/// No library was registered under the requested path.
	#[error( "No static library registered at {}", .0.display() )]
	NotRegistered( PathBuf ),
	/// The table has no entry under the requested symbol.
	#[error( "Symbol not found: {0}" )]
	NotFound( &'static str ),
	/// The entry exists but was registered with a different signature.
	#[error( "Symbol {0} was registered with a different signature" )]
	SignatureMismatch( &'static str ),
}

/// An in-process symbol table.
///
/// Entries are registered through their [`EntryPoint`] marker, so resolution can
/// check the signature instead of trusting it.
///
/// ```
/// use graph_link::{ StaticLibrary, SymbolTable };
/// use graph_link::abi::{ EntryPoint, GraphLinkAbiVersion, ABI_VERSION };
///
/// fn abi_version() -> u32 { ABI_VERSION }
///
/// let library = StaticLibrary::new().with::<GraphLinkAbiVersion>( abi_version );
/// assert!( library.contains( GraphLinkAbiVersion::SYMBOL ));
///
/// let resolved = unsafe { library.resolve::<GraphLinkAbiVersion>() }.unwrap();
/// assert_eq!( resolved(), ABI_VERSION );
/// ```
#[derive( Clone, Default )]
pub struct StaticLibrary {
	symbols: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl StaticLibrary {

	/// Creates an empty table.
	pub fn new() -> Self { Self::default() }

	/// Registers `entry_point` under `E`'s symbol, replacing any previous entry.
	pub fn with<E: EntryPoint>( mut self, entry_point: E::Signature ) -> Self {
		self.symbols.insert( E::SYMBOL, Arc::new( entry_point ));
		self
	}

	/// Removes the entry registered under `symbol`.
	pub fn without( mut self, symbol: &str ) -> Self {
		self.symbols.remove( symbol );
		self
	}

	/// Whether an entry is registered under `symbol`.
	pub fn contains( &self, symbol: &str ) -> bool { self.symbols.contains_key( symbol )}

	/// Number of registered entries.
	pub fn len( &self ) -> usize { self.symbols.len() }

	/// Whether the table is empty.
	pub fn is_empty( &self ) -> bool { self.symbols.is_empty() }

}

impl std::fmt::Debug for StaticLibrary {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		let mut symbols: Vec<&str> = self.symbols.keys().copied().collect();
		symbols.sort_unstable();
		f.debug_struct( "StaticLibrary" )
			.field( "symbols", &symbols )
			.finish()
	}
}

impl SymbolTable for StaticLibrary {
	unsafe fn resolve<E: EntryPoint>( &self ) -> Result<E::Signature, BoxError> {
		self.symbols
			.get( E::SYMBOL )
			.ok_or( StaticSymbolError::NotFound( E::SYMBOL ))?
			.downcast_ref::<E::Signature>()
			.copied()
			.ok_or( StaticSymbolError::SignatureMismatch( E::SYMBOL ))?
			.pipe( Ok )
	}
}

/// Serves [`StaticLibrary`] tables registered under filesystem-like paths.
#[derive( Debug, Clone, Default )]
pub struct StaticLoader {
	libraries: HashMap<PathBuf, StaticLibrary>,
}

impl StaticLoader {

	/// Creates a loader with no registered libraries.
	pub fn new() -> Self { Self::default() }

	/// Registers `library` under `path`.
	pub fn with_library( mut self, path: impl Into<PathBuf>, library: StaticLibrary ) -> Self {
		self.libraries.insert( path.into(), library );
		self
	}

}

impl LibraryLoader for StaticLoader {
	type Library = StaticLibrary ;

	unsafe fn open( &self, path: &Path ) -> Result<Self::Library, BoxError> {
		self.libraries
			.get( path )
			.cloned()
			.ok_or_else(|| StaticSymbolError::NotRegistered( path.to_path_buf() ).into() )
	}
}

/// An opened library together with its release policy.
pub(crate) struct LoadedLibrary<L> {
	library: ManuallyDrop<L>,
	unload_on_drop: bool,
}

impl<L> LoadedLibrary<L> {
	pub(crate) fn new( library: L, unload_on_drop: bool ) -> Self {
		Self { library: ManuallyDrop::new( library ), unload_on_drop }
	}
}

impl<L> Drop for LoadedLibrary<L> {
	fn drop( &mut self ) {
		if self.unload_on_drop {
			// SAFETY: `library` is never touched again after this point.
			unsafe { ManuallyDrop::drop( &mut self.library )}
		}
	}
}

impl<L> std::fmt::Debug for LoadedLibrary<L> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "LoadedLibrary" )
			.field( "unload_on_drop", &self.unload_on_drop )
			.finish_non_exhaustive()
	}
}

/// A fragment produced by a library, holding a share of that library.
///
/// The fragment's methods and drop glue live in the library, so the library
/// stays loaded until the last such handle is gone.
pub(crate) struct BoundFragment<L> {
	// Dropped before `_library`.
	fragment: FragmentHandle,
	_library: Arc<LoadedLibrary<L>>,
}

impl<L: Send + Sync + 'static> BoundFragment<L> {
	pub(crate) fn bind( fragment: FragmentHandle, library: &Arc<LoadedLibrary<L>> ) -> FragmentHandle {
		Arc::new( Self { fragment, _library: Arc::clone( library )})
	}
}

impl<L: Send + Sync + 'static> FragmentWrapper for BoundFragment<L> {
	fn object_id( &self ) -> ObjectId { self.fragment.object_id() }
	fn graph_name( &self ) -> &str { self.fragment.graph_name() }
	fn kind( &self ) -> FragmentKind { self.fragment.kind() }
	fn backend_handle( &self ) -> Option<&FragmentHandle> { Some( &self.fragment ) }
}

impl<L> std::fmt::Debug for BoundFragment<L> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		std::fmt::Debug::fmt( &self.fragment, f )
	}
}
