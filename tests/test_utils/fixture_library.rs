#[allow( dead_code )]
mod fixture_library {

	use std::path::{ Path, PathBuf };
	use std::sync::{ Arc, Mutex };
	use once_cell::sync::Lazy ;
	use graph_link::{
		BoxError, CommSpec, EntryPointError, FragmentHandle, FragmentKind, FragmentWrapper,
		LibraryLoader, ObjectId, Params, PluginInvoker, StaticLibrary, StaticLoader,
		StoreClient, SymbolTable, ABI_VERSION,
	};
	use graph_link::abi::{
		EntryPoint, GraphLinkAbiVersion, LoadGraph, AddVerticesToGraph, AddEdgesToGraph,
		ToArrowFragment, ToDynamicFragment,
	};

	pub const LIB_PATH: &str = "/opt/graph-link/fixtures/libgraph_backend.so" ;
	pub const IPC_SOCKET: &str = "/tmp/graph-link-fixture.sock" ;

	/// Graph name the fixture entry points refuse.
	pub const FAILING_GRAPH: &str = "refused-graph" ;
	pub const FAILURE_CODE: u32 = 3 ;
	pub const FAILURE_MESSAGE: &str = "fixture refused the graph" ;

	/// A call received by one of the fixture entry points.
	#[derive( Debug, Clone, PartialEq )]
	pub struct Call {
		pub symbol: &'static str,
		pub graph_name: String,
		pub fragment_id: Option<ObjectId>,
		pub worker_id: u32,
		pub ipc_socket: Option<String>,
		pub params: Option<Params>,
		/// For conversions, whether the source arrived as the handle the backend produced.
		pub source_is_backend_handle: Option<bool>,
	}

	static CALLS: Lazy<Mutex<Vec<Call>>> = Lazy::new(|| Mutex::new( Vec::new() ));

	fn record( call: Call ) {
		CALLS.lock().expect( "call log poisoned" ).push( call );
	}

	/// Calls received for `graph_name`. Tests run in parallel, so each test uses its own names.
	pub fn calls_for( graph_name: &str ) -> Vec<Call> {
		CALLS.lock().expect( "call log poisoned" )
			.iter()
			.filter(| call | call.graph_name == graph_name )
			.cloned()
			.collect()
	}

	pub struct TestClient { pub ipc_socket: String }

	impl TestClient {
		pub fn new() -> Self { Self { ipc_socket: IPC_SOCKET.to_string() }}
	}

	impl StoreClient for TestClient {
		fn ipc_socket( &self ) -> &str { &self.ipc_socket }
		fn instance_id( &self ) -> u64 { 1 }
	}

	#[derive( Debug )]
	pub struct TestFragment {
		pub id: ObjectId,
		pub name: String,
		pub kind: FragmentKind,
	}

	impl FragmentWrapper for TestFragment {
		fn object_id( &self ) -> ObjectId { self.id }
		fn graph_name( &self ) -> &str { &self.name }
		fn kind( &self ) -> FragmentKind { self.kind }
	}

	/// Object id the fixture assigns to a freshly loaded graph.
	pub fn object_id_for( graph_name: &str ) -> ObjectId {
		ObjectId::new( graph_name.bytes().fold( 17_u64, | acc, byte | acc.wrapping_mul( 31 ).wrapping_add( u64::from( byte ))))
	}

	pub fn offset( id: ObjectId, by: u64 ) -> ObjectId { ObjectId::new( u64::from( id ).wrapping_add( by ))}

	fn refused() -> EntryPointError { EntryPointError::new( FAILURE_CODE, FAILURE_MESSAGE ) }

	fn fragment( id: ObjectId, name: &str, kind: FragmentKind ) -> FragmentHandle {
		Arc::new( TestFragment { id, name: name.to_string(), kind })
	}

	pub fn load_graph(
		comm_spec: &CommSpec,
		client: &mut dyn StoreClient,
		graph_name: &str,
		params: &Params,
	) -> Result<FragmentHandle, EntryPointError> {
		record( Call {
			symbol: LoadGraph::SYMBOL,
			graph_name: graph_name.to_string(),
			fragment_id: None,
			worker_id: comm_spec.worker_id(),
			ipc_socket: Some( client.ipc_socket().to_string() ),
			params: Some( params.clone() ),
			source_is_backend_handle: None,
		});
		match graph_name == FAILING_GRAPH {
			true => Err( refused() ),
			false => Ok( fragment( object_id_for( graph_name ), graph_name, FragmentKind::ArrowProperty )),
		}
	}

	pub fn add_vertices_to_graph(
		fragment_id: ObjectId,
		comm_spec: &CommSpec,
		client: &mut dyn StoreClient,
		graph_name: &str,
		params: &Params,
	) -> Result<FragmentHandle, EntryPointError> {
		record( Call {
			symbol: AddVerticesToGraph::SYMBOL,
			graph_name: graph_name.to_string(),
			fragment_id: Some( fragment_id ),
			worker_id: comm_spec.worker_id(),
			ipc_socket: Some( client.ipc_socket().to_string() ),
			params: Some( params.clone() ),
			source_is_backend_handle: None,
		});
		match graph_name == FAILING_GRAPH {
			true => Err( refused() ),
			false => Ok( fragment( offset( fragment_id, 1 ), graph_name, FragmentKind::ArrowProperty )),
		}
	}

	pub fn add_edges_to_graph(
		fragment_id: ObjectId,
		comm_spec: &CommSpec,
		client: &mut dyn StoreClient,
		graph_name: &str,
		params: &Params,
	) -> Result<FragmentHandle, EntryPointError> {
		record( Call {
			symbol: AddEdgesToGraph::SYMBOL,
			graph_name: graph_name.to_string(),
			fragment_id: Some( fragment_id ),
			worker_id: comm_spec.worker_id(),
			ipc_socket: Some( client.ipc_socket().to_string() ),
			params: Some( params.clone() ),
			source_is_backend_handle: None,
		});
		match graph_name == FAILING_GRAPH {
			true => Err( refused() ),
			false => Ok( fragment( offset( fragment_id, 2 ), graph_name, FragmentKind::ArrowProperty )),
		}
	}

	pub fn to_arrow_fragment(
		client: &mut dyn StoreClient,
		comm_spec: &CommSpec,
		wrapper_in: &FragmentHandle,
		dst_graph_name: &str,
	) -> Result<FragmentHandle, EntryPointError> {
		record( Call {
			symbol: ToArrowFragment::SYMBOL,
			graph_name: dst_graph_name.to_string(),
			fragment_id: Some( wrapper_in.object_id() ),
			worker_id: comm_spec.worker_id(),
			ipc_socket: Some( client.ipc_socket().to_string() ),
			params: None,
			source_is_backend_handle: Some( wrapper_in.backend_handle().is_none() ),
		});
		match dst_graph_name == FAILING_GRAPH {
			true => Err( refused() ),
			false => Ok( fragment( offset( wrapper_in.object_id(), 100 ), dst_graph_name, FragmentKind::ArrowProperty )),
		}
	}

	pub fn to_dynamic_fragment(
		comm_spec: &CommSpec,
		wrapper_in: &FragmentHandle,
		dst_graph_name: &str,
	) -> Result<FragmentHandle, EntryPointError> {
		record( Call {
			symbol: ToDynamicFragment::SYMBOL,
			graph_name: dst_graph_name.to_string(),
			fragment_id: Some( wrapper_in.object_id() ),
			worker_id: comm_spec.worker_id(),
			ipc_socket: None,
			params: None,
			source_is_backend_handle: Some( wrapper_in.backend_handle().is_none() ),
		});
		match dst_graph_name == FAILING_GRAPH {
			true => Err( refused() ),
			false => Ok( fragment( offset( wrapper_in.object_id(), 200 ), dst_graph_name, FragmentKind::DynamicProperty )),
		}
	}

	pub fn abi_version() -> u32 { ABI_VERSION }

	pub fn next_major_abi_version() -> u32 { ABI_VERSION + ( 1 << 24 )}

	/// A library exporting every entry point plus the ABI version.
	pub fn full_library() -> StaticLibrary {
		StaticLibrary::new()
			.with::<GraphLinkAbiVersion>( abi_version )
			.with::<LoadGraph>( load_graph )
			.with::<AddVerticesToGraph>( add_vertices_to_graph )
			.with::<AddEdgesToGraph>( add_edges_to_graph )
			.with::<ToArrowFragment>( to_arrow_fragment )
			.with::<ToDynamicFragment>( to_dynamic_fragment )
	}

	pub fn loader( library: StaticLibrary ) -> StaticLoader {
		StaticLoader::new().with_library( LIB_PATH, library )
	}

	pub fn invoker( id: &str, library: StaticLibrary ) -> PluginInvoker<StaticLoader> {
		PluginInvoker::with_loader( id, LIB_PATH, loader( library ))
	}

	/// An initialised invoker backed by [`full_library`].
	pub fn ready_invoker() -> PluginInvoker<StaticLoader> {
		let mut invoker = invoker( "plugin-1", full_library() );
		unsafe { invoker.init() }.expect( "Failed to initialise fixture invoker" );
		invoker
	}

	/// Records every open and lookup made through it.
	#[derive( Clone, Default )]
	pub struct Journal {
		pub opened: Arc<Mutex<Vec<PathBuf>>>,
		pub resolved: Arc<Mutex<Vec<&'static str>>>,
	}

	impl Journal {
		pub fn opened( &self ) -> Vec<PathBuf> { self.opened.lock().expect( "journal poisoned" ).clone() }
		pub fn resolved( &self ) -> Vec<&'static str> { self.resolved.lock().expect( "journal poisoned" ).clone() }
	}

	pub struct JournalingLoader { pub inner: StaticLoader, pub journal: Journal }

	pub struct JournalingLibrary { inner: StaticLibrary, journal: Journal }

	impl LibraryLoader for JournalingLoader {
		type Library = JournalingLibrary ;
		unsafe fn open( &self, path: &Path ) -> Result<Self::Library, BoxError> {
			self.journal.opened.lock().expect( "journal poisoned" ).push( path.to_path_buf() );
			let inner = unsafe { self.inner.open( path )}?;
			Ok( JournalingLibrary { inner, journal: self.journal.clone() })
		}
	}

	impl SymbolTable for JournalingLibrary {
		unsafe fn resolve<E: EntryPoint>( &self ) -> Result<E::Signature, BoxError> {
			self.journal.resolved.lock().expect( "journal poisoned" ).push( E::SYMBOL );
			unsafe { self.inner.resolve::<E>() }
		}
	}

	/// An uninitialised invoker whose loader journals every open and lookup.
	pub fn journaling_invoker( id: &str, library: StaticLibrary ) -> ( PluginInvoker<JournalingLoader>, Journal ) {
		let journal = Journal::default();
		let loader = JournalingLoader { inner: loader( library ), journal: journal.clone() };
		( PluginInvoker::with_loader( id, LIB_PATH, loader ), journal )
	}

}
