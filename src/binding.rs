//! Resolved entry points.
//!
//! A [`Binding`] is an entry point resolved from a library, typed by its
//! [`EntryPoint`] marker. [`Bindings`] is the full set an invoker needs, resolved
//! together during initialisation and never changed afterwards.

use std::path::Path ;

use crate::abi::{
	self, EntryPoint, GraphLinkAbiVersion,
	LoadGraph, AddVerticesToGraph, AddEdgesToGraph,
};
#[cfg( feature = "experimental" )]
use crate::abi::{ ToArrowFragment, ToDynamicFragment };
use crate::context::{ CommSpec, FragmentHandle, ObjectId, Params, StoreClient };
use crate::error::{ EntryPointError, InvokerError };
use crate::library::SymbolTable ;



/// An entry point resolved to exactly one function.
pub(crate) struct Binding<E: EntryPoint> {
	entry_point: E::Signature,
}

impl<E: EntryPoint> Clone for Binding<E> {
	fn clone( &self ) -> Self { *self }
}
impl<E: EntryPoint> Copy for Binding<E> {}

impl<E: EntryPoint> Binding<E> {

	/// Resolves `E` from `library`.
	///
	/// # Safety
	/// See [`SymbolTable::resolve`].
	pub(crate) unsafe fn resolve<L: SymbolTable>( library: &L, path: &Path ) -> Result<Self, InvokerError> {
		match unsafe { library.resolve::<E>() } {
			Ok( entry_point ) => Ok( Self { entry_point }),
			Err( source ) => Err( InvokerError::SymbolResolution {
				symbol: E::SYMBOL,
				path: path.to_path_buf(),
				source,
			}),
		}
	}

	/// Symbol this binding was resolved from.
	#[inline] pub(crate) fn symbol( &self ) -> &'static str { E::SYMBOL }

}

impl<E: EntryPoint> std::fmt::Debug for Binding<E> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_tuple( "Binding" ).field( &E::SYMBOL ).finish()
	}
}

impl Binding<LoadGraph> {
	pub(crate) fn call(
		self,
		comm_spec: &CommSpec,
		client: &mut dyn StoreClient,
		graph_name: &str,
		params: &Params,
	) -> Result<FragmentHandle, EntryPointError> {
		( self.entry_point )( comm_spec, client, graph_name, params )
	}
}

impl Binding<AddVerticesToGraph> {
	pub(crate) fn call(
		self,
		fragment_id: ObjectId,
		comm_spec: &CommSpec,
		client: &mut dyn StoreClient,
		graph_name: &str,
		params: &Params,
	) -> Result<FragmentHandle, EntryPointError> {
		( self.entry_point )( fragment_id, comm_spec, client, graph_name, params )
	}
}

impl Binding<AddEdgesToGraph> {
	pub(crate) fn call(
		self,
		fragment_id: ObjectId,
		comm_spec: &CommSpec,
		client: &mut dyn StoreClient,
		graph_name: &str,
		params: &Params,
	) -> Result<FragmentHandle, EntryPointError> {
		( self.entry_point )( fragment_id, comm_spec, client, graph_name, params )
	}
}

#[cfg( feature = "experimental" )]
impl Binding<ToArrowFragment> {
	pub(crate) fn call(
		self,
		client: &mut dyn StoreClient,
		comm_spec: &CommSpec,
		wrapper_in: &FragmentHandle,
		dst_graph_name: &str,
	) -> Result<FragmentHandle, EntryPointError> {
		( self.entry_point )( client, comm_spec, wrapper_in, dst_graph_name )
	}
}

#[cfg( feature = "experimental" )]
impl Binding<ToDynamicFragment> {
	pub(crate) fn call(
		self,
		comm_spec: &CommSpec,
		wrapper_in: &FragmentHandle,
		dst_graph_name: &str,
	) -> Result<FragmentHandle, EntryPointError> {
		( self.entry_point )( comm_spec, wrapper_in, dst_graph_name )
	}
}

/// Every entry point an invoker dispatches to.
///
/// The conversion entry points only exist in `experimental` builds; other builds
/// never look them up.
#[derive( Debug, Clone, Copy )]
pub(crate) struct Bindings {
	pub(crate) load_graph: Binding<LoadGraph>,
	pub(crate) add_vertices_to_graph: Binding<AddVerticesToGraph>,
	pub(crate) add_edges_to_graph: Binding<AddEdgesToGraph>,
	#[cfg( feature = "experimental" )]
	pub(crate) to_arrow_fragment: Binding<ToArrowFragment>,
	#[cfg( feature = "experimental" )]
	pub(crate) to_dynamic_fragment: Binding<ToDynamicFragment>,
}

impl Bindings {

	/// Checks the library's ABI version and resolves every required entry point,
	/// stopping at the first one that is missing.
	///
	/// # Safety
	/// See [`SymbolTable::resolve`].
	pub(crate) unsafe fn resolve<L: SymbolTable>( library: &L, path: &Path ) -> Result<Self, InvokerError> {

		match unsafe { library.resolve::<GraphLinkAbiVersion>() } {
			Ok( abi_version ) => {
				let found = abi_version();
				if !abi::versions_compatible( abi::ABI_VERSION, found ) {
					return Err( InvokerError::IncompatibleAbi {
						path: path.to_path_buf(),
						expected: abi::ABI_VERSION,
						found,
					});
				}
			}
			Err( _ ) => tracing::debug!(
				path = %path.display(),
				"Library does not export {}, skipping ABI check", GraphLinkAbiVersion::SYMBOL
			),
		}

		// Field initialisers run in order, so `?` stops at the first missing symbol.
		Ok( Self {
			load_graph: unsafe { Binding::resolve( library, path )}?,
			add_vertices_to_graph: unsafe { Binding::resolve( library, path )}?,
			add_edges_to_graph: unsafe { Binding::resolve( library, path )}?,
			#[cfg( feature = "experimental" )]
			to_arrow_fragment: unsafe { Binding::resolve( library, path )}?,
			#[cfg( feature = "experimental" )]
			to_dynamic_fragment: unsafe { Binding::resolve( library, path )}?,
		})

	}

}
