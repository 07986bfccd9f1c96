//! A plugin invoker for graph construction backends living in shared libraries.
//!
//! Graph loading and fragment conversion are implemented by heavyweight backends
//! that depend on the build configuration, so hosts do not link them. Instead a
//! [`PluginInvoker`] opens the backend library at runtime, resolves a fixed set of
//! named entry points, and exposes each of them as a typed method returning an
//! [`OperationResult`].
//!
//! # Core Concepts
//!
//! - [`PluginInvoker`]: Owns one library and the entry points resolved from it.
//! 	Created [`InvokerState::Unready`]; [`PluginInvoker::init`] moves it to
//! 	[`InvokerState::Ready`] or, on the first error, permanently to
//! 	[`InvokerState::Failed`].
//!
//! - [`abi`]: The symbols a backend exports and their exact signatures. Each entry
//! 	point is a marker type implementing [`abi::EntryPoint`], so resolution can only
//! 	ever produce a function of the declared signature.
//!
//! - [`LibraryLoader`] / [`SymbolTable`]: Where entry points come from.
//! 	[`DynamicLoader`] opens shared objects; [`StaticLoader`] serves in-process
//! 	[`StaticLibrary`] tables for backends linked into the host.
//!
//! - [`InvokerError`]: One error type for every failure, from a library that does
//! 	not open to a backend reporting a failed load. [`InvokerError::kind`] tells
//! 	them apart.
//!
//! # Entry Points
//!
//! | Symbol | Method | Availability |
//! |---|---|---|
//! | `LoadGraph` | [`PluginInvoker::load_graph`] | always |
//! | `AddVerticesToGraph` | [`PluginInvoker::add_vertices_to_graph`] | always |
//! | `AddEdgesToGraph` | [`PluginInvoker::add_edges_to_graph`] | always |
//! | `ToArrowFragment` | [`PluginInvoker::to_arrow_fragment`] | `experimental` feature |
//! | `ToDynamicFragment` | [`PluginInvoker::to_dynamic_fragment`] | `experimental` feature |
//!
//! Without the `experimental` feature the conversion symbols are never looked up
//! and the conversion methods return [`InvokerError::UnsupportedOperation`].
//!
//! # Example
//!
//! ```no_run
//! use graph_link::{ PluginInvoker, CommSpec, FragmentWrapper, Params, StoreClient };
//!
//! # struct Client ;
//! # impl StoreClient for Client {
//! # 	fn ipc_socket( &self ) -> &str { "/tmp/store.sock" }
//! # 	fn instance_id( &self ) -> u64 { 0 }
//! # }
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut invoker = PluginInvoker::new( "property-graph-frame", "/opt/backend/libproperty_graph_frame.so" );
//!
//! // SAFETY: the backend is built against this version of graph_link.
//! unsafe { invoker.init() }?;
//!
//! let params = Params::new().with( "directed", true );
//! let fragment = invoker.load_graph( &CommSpec::single(), &mut Client, "g1", &params )?;
//! println!( "loaded {} as {}", fragment.graph_name(), fragment.object_id() );
//! # Ok(())
//! # }
//! ```

pub mod abi ;
mod binding ;
mod context ;
mod error ;
mod invoker ;
mod library ;

pub use abi::{ ABI_VERSION, EXPERIMENTAL_ENABLED, required_symbols };
pub use context::{ AttrValue, CommSpec, FragmentHandle, FragmentKind, FragmentWrapper, ObjectId, Params, StoreClient };
pub use error::{ BoxError, EntryPointError, ErrorKind, InvokerError, OperationResult };
pub use invoker::{ InvokerState, PluginInvoker };
pub use library::{ DynamicLoader, LibraryLoader, StaticLibrary, StaticLoader, StaticSymbolError, SymbolTable };
