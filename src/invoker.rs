//! The plugin invoker.
//!
//! A [`PluginInvoker`] owns one backend library and the entry points resolved
//! from it, and exposes one typed method per graph operation.

use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use itertools::Itertools ;

use crate::abi::{ self, EntryPoint, LoadGraph, AddVerticesToGraph, AddEdgesToGraph, ToArrowFragment, ToDynamicFragment };
use crate::binding::Bindings ;
use crate::context::{ CommSpec, FragmentHandle, ObjectId, Params, StoreClient };
use crate::error::{ EntryPointError, InvokerError, OperationResult };
use crate::library::{ BoundFragment, DynamicLoader, LibraryLoader, LoadedLibrary };

#[cfg( not( feature = "experimental" ))]
const EXPERIMENTAL_DISABLED: &str = "compiled without the `experimental` feature" ;



/// Lifecycle of a [`PluginInvoker`].
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum InvokerState {
	/// Constructed, [`PluginInvoker::init`] not called yet.
	Unready,
	/// Library opened and every required entry point resolved.
	Ready,
	/// Initialisation failed. Permanent.
	Failed,
}

impl std::fmt::Display for InvokerState {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		match self {
			Self::Unready => write!( f, "unready" ),
			Self::Ready => write!( f, "ready" ),
			Self::Failed => write!( f, "failed" ),
		}
	}
}

enum State<Lib> {
	Unready,
	Ready { bindings: Bindings, library: Arc<LoadedLibrary<Lib>> },
	Failed,
}

impl<Lib> State<Lib> {
	fn public( &self ) -> InvokerState {
		match self {
			Self::Unready => InvokerState::Unready,
			Self::Ready { .. } => InvokerState::Ready,
			Self::Failed => InvokerState::Failed,
		}
	}
}

/// Invokes graph operations exported by a separately compiled backend library.
///
/// The invoker is created with an identifier and a library path, and does nothing
/// until [`init`]( Self::init ) opens the library and resolves its entry points.
/// After that, every operation method forwards its arguments to the matching entry
/// point and returns exactly what the entry point produced.
///
/// # Concurrency
///
/// Operation methods take `&self` and the resolved entry points never change, so
/// the invoker itself may be shared between threads. Whether the backend tolerates
/// concurrent calls is up to the backend; callers must serialise calls it does not
/// support. In particular, vertices and edges must not be added to the same fragment
/// concurrently. Loading and mutation calls may be collective: every worker of the
/// communication context has to make the same call or the backend may block forever.
///
/// # Library lifetime
///
/// Every fragment handle returned by an operation holds a share of the library,
/// so the library is released once the invoker and all of those handles are
/// dropped. Use [`with_unload_on_drop`]( Self::with_unload_on_drop )`( false )`
/// to keep it mapped for the rest of the process instead.
///
/// # Example
///
/// ```
/// use std::sync::Arc ;
/// use graph_link::{
/// 	PluginInvoker, StaticLibrary, StaticLoader, CommSpec, StoreClient, Params,
/// 	FragmentHandle, FragmentWrapper, FragmentKind, ObjectId, EntryPointError,
/// };
/// use graph_link::abi::{ LoadGraph, AddVerticesToGraph, AddEdgesToGraph };
///
/// #[derive( Debug )]
/// struct Fragment( String );
/// impl FragmentWrapper for Fragment {
/// 	fn object_id( &self ) -> ObjectId { ObjectId::new( 1 ) }
/// 	fn graph_name( &self ) -> &str { &self.0 }
/// 	fn kind( &self ) -> FragmentKind { FragmentKind::ArrowProperty }
/// }
///
/// struct Client ;
/// impl StoreClient for Client {
/// 	fn ipc_socket( &self ) -> &str { "/tmp/store.sock" }
/// 	fn instance_id( &self ) -> u64 { 0 }
/// }
///
/// fn load( _: &CommSpec, _: &mut dyn StoreClient, name: &str, _: &Params ) -> Result<FragmentHandle, EntryPointError> {
/// 	Ok( Arc::new( Fragment( name.to_string() )))
/// }
/// fn extend( _: ObjectId, _: &CommSpec, _: &mut dyn StoreClient, name: &str, _: &Params ) -> Result<FragmentHandle, EntryPointError> {
/// 	Ok( Arc::new( Fragment( name.to_string() )))
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let library = StaticLibrary::new()
/// 	.with::<LoadGraph>( load )
/// 	.with::<AddVerticesToGraph>( extend )
/// 	.with::<AddEdgesToGraph>( extend );
/// # #[cfg( feature = "experimental" )]
/// # let library = library
/// # 	.with::<graph_link::abi::ToArrowFragment>(| _, _, f, _ | Ok( f.clone() ))
/// # 	.with::<graph_link::abi::ToDynamicFragment>(| _, f, _ | Ok( f.clone() ));
/// let loader = StaticLoader::new().with_library( "/opt/backend/libframe.so", library );
///
/// let mut invoker = PluginInvoker::with_loader( "frame", "/opt/backend/libframe.so", loader );
/// // SAFETY: static libraries check every signature.
/// unsafe { invoker.init() }?;
///
/// let fragment = invoker.load_graph( &CommSpec::single(), &mut Client, "g1", &Params::new() )?;
/// assert_eq!( fragment.graph_name(), "g1" );
/// # Ok(())
/// # }
/// ```
pub struct PluginInvoker<L: LibraryLoader = DynamicLoader> {
	id: String,
	lib_path: PathBuf,
	loader: L,
	unload_on_drop: bool,
	state: State<L::Library>,
}

impl PluginInvoker<DynamicLoader> {

	/// Creates an invoker for the shared library at `lib_path`.
	///
	/// Nothing is opened until [`init`]( Self::init ) is called.
	pub fn new( id: impl Into<String>, lib_path: impl Into<PathBuf> ) -> Self {
		Self::with_loader( id, lib_path, DynamicLoader )
	}

}

impl<L: LibraryLoader> PluginInvoker<L> {

	/// Creates an invoker that opens `lib_path` through `loader`.
	pub fn with_loader( id: impl Into<String>, lib_path: impl Into<PathBuf>, loader: L ) -> Self {
		Self {
			id: id.into(),
			lib_path: lib_path.into(),
			loader,
			unload_on_drop: true,
			state: State::Unready,
		}
	}

	/// Whether the library is released once the invoker and every fragment handle
	/// it returned are dropped. Defaults to `true`.
	///
	/// Takes effect when the library is opened by [`init`]( Self::init ).
	pub fn with_unload_on_drop( mut self, unload_on_drop: bool ) -> Self {
		self.unload_on_drop = unload_on_drop ;
		self
	}

	#[inline] pub fn id( &self ) -> &str { &self.id }
	#[inline] pub fn lib_path( &self ) -> &Path { &self.lib_path }
	#[inline] pub fn state( &self ) -> InvokerState { self.state.public() }
	#[inline] pub fn is_ready( &self ) -> bool { self.state() == InvokerState::Ready }

	/// Opens the library and resolves every required entry point.
	///
	/// Must be called exactly once, before any operation. On failure the invoker
	/// becomes permanently [`InvokerState::Failed`] and the library is released.
	///
	/// # Errors
	/// - [`InvokerError::InvalidState`] if `init` was already called.
	/// - [`InvokerError::LibraryLoad`] if the library cannot be opened. No symbol
	/// 	is looked up in that case.
	/// - [`InvokerError::IncompatibleAbi`] if the library reports an ABI version
	/// 	with a different major version.
	/// - [`InvokerError::SymbolResolution`] naming the first required symbol the
	/// 	library does not export.
	///
	/// # Safety
	/// - Opening the library runs its initialisation code.
	/// - Every symbol listed by [`required_symbols`]( crate::abi::required_symbols )
	/// 	that the library exports, and `GraphLinkAbiVersion` if it exports that, must
	/// 	have the signature declared in [`abi`]( crate::abi ). `GraphLinkAbiVersion`
	/// 	is called during `init`.
	/// - The library must not hand out values whose code lives in it other than
	/// 	through the returned fragment handles, which keep it loaded. Anything the
	/// 	backend stashes elsewhere (a thread, a global of the host) may outlive it.
	pub unsafe fn init( &mut self ) -> OperationResult<()> {

		if !matches!( self.state, State::Unready ) {
			return Err( self.invalid_state( InvokerState::Unready ));
		}

		tracing::debug!(
			id = %self.id,
			path = %self.lib_path.display(),
			symbols = %abi::required_symbols().into_iter().join( ", " ),
			"Initialising plugin invoker"
		);

		match unsafe { self.open_and_resolve() } {
			Ok( state ) => {
				self.state = state ;
				tracing::info!( "Loaded plugin {} from {}", self.id, self.lib_path.display() );
				Ok(())
			}
			Err( err ) => {
				self.state = State::Failed ;
				tracing::warn!( "Failed to load plugin {}: {}", self.id, err );
				Err( err )
			}
		}

	}

	unsafe fn open_and_resolve( &self ) -> OperationResult<State<L::Library>> {
		let library = unsafe { self.loader.open( &self.lib_path )}
			.map_err(| source | InvokerError::LibraryLoad { path: self.lib_path.clone(), source })?;
		let bindings = unsafe { Bindings::resolve( &library, &self.lib_path )}?;
		Ok( State::Ready { bindings, library: Arc::new( LoadedLibrary::new( library, self.unload_on_drop ))})
	}

	/// Loads `graph_name` into a new fragment.
	///
	/// # Errors
	/// [`InvokerError::InvalidState`] before a successful [`init`]( Self::init ),
	/// [`InvokerError::InvalidArgument`] for an empty graph name, and
	/// [`InvokerError::EntryPoint`] carrying the backend's own error.
	pub fn load_graph(
		&self,
		comm_spec: &CommSpec,
		client: &mut dyn StoreClient,
		graph_name: &str,
		params: &Params,
	) -> OperationResult<FragmentHandle> {
		let ( bindings, library ) = self.loaded()?;
		require_graph_name( LoadGraph::SYMBOL, graph_name )?;
		let binding = bindings.load_graph ;
		self.forward( binding.symbol(), graph_name, library, || binding.call( comm_spec, client, graph_name, params ))
	}

	/// Adds the vertices described by `params` to fragment `fragment_id`.
	///
	/// # Errors
	/// Same as [`load_graph`]( Self::load_graph ).
	pub fn add_vertices_to_graph(
		&self,
		fragment_id: ObjectId,
		comm_spec: &CommSpec,
		client: &mut dyn StoreClient,
		graph_name: &str,
		params: &Params,
	) -> OperationResult<FragmentHandle> {
		let ( bindings, library ) = self.loaded()?;
		require_graph_name( AddVerticesToGraph::SYMBOL, graph_name )?;
		let binding = bindings.add_vertices_to_graph ;
		self.forward( binding.symbol(), graph_name, library, || binding.call( fragment_id, comm_spec, client, graph_name, params ))
	}

	/// Adds the edges described by `params` to fragment `fragment_id`.
	///
	/// # Errors
	/// Same as [`load_graph`]( Self::load_graph ).
	pub fn add_edges_to_graph(
		&self,
		fragment_id: ObjectId,
		comm_spec: &CommSpec,
		client: &mut dyn StoreClient,
		graph_name: &str,
		params: &Params,
	) -> OperationResult<FragmentHandle> {
		let ( bindings, library ) = self.loaded()?;
		require_graph_name( AddEdgesToGraph::SYMBOL, graph_name )?;
		let binding = bindings.add_edges_to_graph ;
		self.forward( binding.symbol(), graph_name, library, || binding.call( fragment_id, comm_spec, client, graph_name, params ))
	}

	/// Converts `wrapper_in` into an arrow property fragment named `dst_graph_name`.
	///
	/// The backend receives the handle it originally produced and the destination
	/// name exactly as given.
	///
	/// # Errors
	/// [`InvokerError::InvalidState`] before a successful [`init`]( Self::init ), and
	/// [`InvokerError::EntryPoint`] carrying the backend's own error.
	#[cfg( feature = "experimental" )]
	pub fn to_arrow_fragment(
		&self,
		client: &mut dyn StoreClient,
		comm_spec: &CommSpec,
		wrapper_in: &FragmentHandle,
		dst_graph_name: &str,
	) -> OperationResult<FragmentHandle> {
		let ( bindings, library ) = self.loaded()?;
		let binding = bindings.to_arrow_fragment ;
		let wrapper_in = backend_handle( wrapper_in );
		self.forward( binding.symbol(), dst_graph_name, library, || binding.call( client, comm_spec, wrapper_in, dst_graph_name ))
	}

	/// Converts `wrapper_in` into an arrow property fragment named `dst_graph_name`.
	///
	/// # Errors
	/// Always [`InvokerError::UnsupportedOperation`]: this build was compiled without
	/// the `experimental` feature. The library is never touched.
	#[cfg( not( feature = "experimental" ))]
	pub fn to_arrow_fragment(
		&self,
		_client: &mut dyn StoreClient,
		_comm_spec: &CommSpec,
		_wrapper_in: &FragmentHandle,
		_dst_graph_name: &str,
	) -> OperationResult<FragmentHandle> {
		Err( self.unsupported( ToArrowFragment::SYMBOL ))
	}

	/// Converts `wrapper_in` into a dynamic property fragment named `dst_graph_name`.
	///
	/// # Errors
	/// Same as [`to_arrow_fragment`]( Self::to_arrow_fragment ).
	#[cfg( feature = "experimental" )]
	pub fn to_dynamic_fragment(
		&self,
		comm_spec: &CommSpec,
		wrapper_in: &FragmentHandle,
		dst_graph_name: &str,
	) -> OperationResult<FragmentHandle> {
		let ( bindings, library ) = self.loaded()?;
		let binding = bindings.to_dynamic_fragment ;
		let wrapper_in = backend_handle( wrapper_in );
		self.forward( binding.symbol(), dst_graph_name, library, || binding.call( comm_spec, wrapper_in, dst_graph_name ))
	}

	/// Converts `wrapper_in` into a dynamic property fragment named `dst_graph_name`.
	///
	/// # Errors
	/// Always [`InvokerError::UnsupportedOperation`]: this build was compiled without
	/// the `experimental` feature. The library is never touched.
	#[cfg( not( feature = "experimental" ))]
	pub fn to_dynamic_fragment(
		&self,
		_comm_spec: &CommSpec,
		_wrapper_in: &FragmentHandle,
		_dst_graph_name: &str,
	) -> OperationResult<FragmentHandle> {
		Err( self.unsupported( ToDynamicFragment::SYMBOL ))
	}

	fn loaded( &self ) -> OperationResult<( &Bindings, &Arc<LoadedLibrary<L::Library>> )> {
		match &self.state {
			State::Ready { bindings, library } => Ok(( bindings, library )),
			State::Unready | State::Failed => Err( self.invalid_state( InvokerState::Ready )),
		}
	}

	fn forward(
		&self,
		symbol: &'static str,
		graph_name: &str,
		library: &Arc<LoadedLibrary<L::Library>>,
		call: impl FnOnce() -> Result<FragmentHandle, EntryPointError>,
	) -> OperationResult<FragmentHandle> {
		tracing::debug!( id = %self.id, symbol, graph_name, "Forwarding call" );
		call()
			.map(| fragment | BoundFragment::bind( fragment, library ))
			.map_err(| source | InvokerError::EntryPoint { symbol, source })
	}

	fn invalid_state( &self, expected: InvokerState ) -> InvokerError {
		InvokerError::InvalidState { id: self.id.clone(), state: self.state(), expected }
	}

	#[cfg( not( feature = "experimental" ))]
	fn unsupported( &self, operation: &'static str ) -> InvokerError {
		tracing::debug!( id = %self.id, operation, "Rejecting conversion in a non-experimental build" );
		InvokerError::UnsupportedOperation { operation, reason: EXPERIMENTAL_DISABLED }
	}

}

impl<L: LibraryLoader> std::fmt::Debug for PluginInvoker<L> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "PluginInvoker" )
			.field( "id", &self.id )
			.field( "lib_path", &self.lib_path )
			.field( "unload_on_drop", &self.unload_on_drop )
			.field( "state", &self.state() )
			.finish_non_exhaustive()
	}
}

/// The handle a backend produced, unwrapped from the share of its library.
#[cfg( feature = "experimental" )]
fn backend_handle( handle: &FragmentHandle ) -> &FragmentHandle {
	handle.backend_handle().unwrap_or( handle )
}

fn require_graph_name( operation: &'static str, graph_name: &str ) -> OperationResult<()> {
	match graph_name.is_empty() {
		true => Err( InvokerError::InvalidArgument { operation, reason: "graph name must not be empty" }),
		false => Ok(()),
	}
}
