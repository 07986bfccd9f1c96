//! Symbol names and call signatures a backend library must export.
//!
//! Every entry point is described by a marker type implementing [`EntryPoint`],
//! which ties the exported symbol name to the exact function pointer type the
//! symbol is read as. Resolution is always done through the marker, so a call
//! site can never pick the wrong signature for a symbol.
//!
//! # Exporting entry points
//!
//! Entry points are plain Rust-ABI functions. The backend must be compiled with
//! the same toolchain and against the same version of this crate as the host.
//!
//! ```rust,ignore
//! use graph_link::{ CommSpec, StoreClient, Params, FragmentHandle, EntryPointError, ABI_VERSION };
//!
//! #[no_mangle]
//! pub fn GraphLinkAbiVersion() -> u32 { ABI_VERSION }
//!
//! #[no_mangle]
//! pub fn LoadGraph(
//! 	comm_spec: &CommSpec,
//! 	client: &mut dyn StoreClient,
//! 	graph_name: &str,
//! 	params: &Params,
//! ) -> Result<FragmentHandle, EntryPointError> {
//! 	/* ... */
//! }
//! ```
//!
//! ## Versioning
//!
//! Version format: `(major << 24) | (minor << 16) | patch`. Host and backend are
//! compatible when their major versions match.

use nonempty_collections::{ NEVec, nev };

use crate::context::{ CommSpec, FragmentHandle, ObjectId, Params, StoreClient };
use crate::error::EntryPointError ;



/// Current ABI version. Version 1.0.0 = `0x01000000`.
pub const ABI_VERSION: u32 = 0x01_00_0000 ;

/// Whether this build forwards the fragment conversion operations.
pub const EXPERIMENTAL_ENABLED: bool = cfg!( feature = "experimental" );

/// An exported function the invoker knows how to bind.
pub trait EntryPoint: 'static {
	/// Name the backend exports the function under.
	const SYMBOL: &'static str ;
	/// Function pointer type the symbol is read as.
	type Signature: Copy + Send + Sync + 'static ;
}

/// `fn( &CommSpec, &mut dyn StoreClient, graph_name, &Params ) -> Result<FragmentHandle, EntryPointError>`
pub type LoadGraphFn = fn( &CommSpec, &mut dyn StoreClient, &str, &Params ) -> Result<FragmentHandle, EntryPointError> ;

/// `fn( fragment_id, &CommSpec, &mut dyn StoreClient, graph_name, &Params ) -> Result<FragmentHandle, EntryPointError>`
pub type AddVerticesToGraphFn = fn( ObjectId, &CommSpec, &mut dyn StoreClient, &str, &Params ) -> Result<FragmentHandle, EntryPointError> ;

/// Same shape as [`AddVerticesToGraphFn`].
pub type AddEdgesToGraphFn = fn( ObjectId, &CommSpec, &mut dyn StoreClient, &str, &Params ) -> Result<FragmentHandle, EntryPointError> ;

/// `fn( &mut dyn StoreClient, &CommSpec, source, dst_graph_name ) -> Result<FragmentHandle, EntryPointError>`
pub type ToArrowFragmentFn = fn( &mut dyn StoreClient, &CommSpec, &FragmentHandle, &str ) -> Result<FragmentHandle, EntryPointError> ;

/// `fn( &CommSpec, source, dst_graph_name ) -> Result<FragmentHandle, EntryPointError>`
pub type ToDynamicFragmentFn = fn( &CommSpec, &FragmentHandle, &str ) -> Result<FragmentHandle, EntryPointError> ;

/// `fn() -> u32`
pub type AbiVersionFn = fn() -> u32 ;

macro_rules! entry_points {
	( $( $( #[$meta:meta] )* $name:ident = $signature:ty ; )* ) => { $(
		$( #[$meta] )*
		#[derive( Debug )]
		pub enum $name {}
		impl EntryPoint for $name {
			const SYMBOL: &'static str = stringify!( $name );
			type Signature = $signature ;
		}
	)* };
}

entry_points! {
	/// Loads a graph into a new fragment.
	LoadGraph = LoadGraphFn ;
	/// Adds vertices to an existing fragment.
	AddVerticesToGraph = AddVerticesToGraphFn ;
	/// Adds edges to an existing fragment.
	AddEdgesToGraph = AddEdgesToGraphFn ;
	/// Converts a fragment into an arrow property fragment.
	ToArrowFragment = ToArrowFragmentFn ;
	/// Converts a fragment into a dynamic property fragment.
	ToDynamicFragment = ToDynamicFragmentFn ;
	/// Reports the ABI version the backend was built against. Optional.
	GraphLinkAbiVersion = AbiVersionFn ;
}

/// Symbols a library must export for initialisation to succeed in this build,
/// in the order they are resolved.
pub fn required_symbols() -> NEVec<&'static str> {
	#[allow( unused_mut )]
	let mut symbols = nev![ LoadGraph::SYMBOL, AddVerticesToGraph::SYMBOL, AddEdgesToGraph::SYMBOL ];
	#[cfg( feature = "experimental" )] {
		symbols.push( ToArrowFragment::SYMBOL );
		symbols.push( ToDynamicFragment::SYMBOL );
	}
	symbols
}

/// Extract major version from ABI version.
#[inline]
pub const fn version_major( v: u32 ) -> u32 { ( v >> 24 ) & 0xFF }

/// Extract minor version from ABI version.
#[inline]
pub const fn version_minor( v: u32 ) -> u32 { ( v >> 16 ) & 0xFF }

/// Extract patch version from ABI version.
#[inline]
pub const fn version_patch( v: u32 ) -> u32 { v & 0xFFFF }

/// Versions are compatible if they have the same major version.
#[inline]
pub const fn versions_compatible( host: u32, plugin: u32 ) -> bool {
	version_major( host ) == version_major( plugin )
}

/// Format ABI version as string.
pub fn format_version( v: u32 ) -> String {
	format!( "{}.{}.{}", version_major( v ), version_minor( v ), version_patch( v ))
}
