//! Collaborator types passed through the plugin boundary.
//!
//! None of these are interpreted by the invoker. They exist so that entry point
//! signatures are concrete: the communication context, the object store client,
//! the parameter bag and the fragment wrapper are handed to the backend exactly
//! as the caller supplied them.

use std::collections::BTreeMap ;
use std::sync::Arc ;



/// Position of the current process within the set of cooperating workers.
///
/// The invoker assumes the communication context is already established (every
/// participating process has joined) by the time it is passed in.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub struct CommSpec {
	worker_id: u32,
	worker_num: u32,
	local_id: u32,
	local_num: u32,
}

impl CommSpec {

	/// Creates a communication context description.
	pub const fn new( worker_id: u32, worker_num: u32, local_id: u32, local_num: u32 ) -> Self {
		Self { worker_id, worker_num, local_id, local_num }
	}

	/// Context of a single process working alone.
	pub const fn single() -> Self { Self::new( 0, 1, 0, 1 )}

	#[inline] pub fn worker_id( &self ) -> u32 { self.worker_id }
	#[inline] pub fn worker_num( &self ) -> u32 { self.worker_num }
	#[inline] pub fn local_id( &self ) -> u32 { self.local_id }
	#[inline] pub fn local_num( &self ) -> u32 { self.local_num }

	/// Fragment id owned by this worker. Each worker owns exactly one fragment.
	#[inline] pub fn fid( &self ) -> u32 { self.worker_id }

	/// Total number of fragments.
	#[inline] pub fn fnum( &self ) -> u32 { self.worker_num }

	/// Whether this worker coordinates collective operations.
	#[inline] pub fn is_coordinator( &self ) -> bool { self.worker_id == 0 }

}

/// Identifier of an object held by the shared object store.
#[derive( Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash )]
pub struct ObjectId( u64 );

impl ObjectId {
	/// Creates an object identifier from its raw value.
	pub const fn new( id: u64 ) -> Self { Self( id )}
}

impl std::fmt::Display for ObjectId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		write!( f, "o{:016x}", self.0 )
	}
}

impl From<u64> for ObjectId {
	fn from( id: u64 ) -> Self { Self( id )}
}

impl From<ObjectId> for u64 {
	fn from( id: ObjectId ) -> Self { id.0 }
}

/// A connected client of the shared object store.
///
/// The invoker only borrows the client for the duration of a call and hands it
/// to the entry point. Connecting and disconnecting is the caller's business.
pub trait StoreClient: Send {
	/// Path of the IPC socket the client is connected through.
	fn ipc_socket( &self ) -> &str ;
	/// Identifier of the store instance serving this client.
	fn instance_id( &self ) -> u64 ;
}

/// Representation of a loaded fragment.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum FragmentKind {
	/// Immutable columnar property graph.
	ArrowProperty,
	/// Mutable property graph supporting in-place modification.
	DynamicProperty,
}

impl std::fmt::Display for FragmentKind {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		match self {
			Self::ArrowProperty => write!( f, "arrow property fragment" ),
			Self::DynamicProperty => write!( f, "dynamic property fragment" ),
		}
	}
}

/// A graph fragment produced by a backend.
///
/// Implemented by the backend; the invoker only moves handles around.
pub trait FragmentWrapper: Send + Sync + std::fmt::Debug {
	/// Object store id of the fragment group.
	fn object_id( &self ) -> ObjectId ;
	/// Name the graph was loaded or converted under.
	fn graph_name( &self ) -> &str ;
	/// Which representation backs this fragment.
	fn kind( &self ) -> FragmentKind ;
	/// The handle the backend itself returned, for handles the invoker wrapped
	/// to keep the backend library loaded. Backends leave this as `None`.
	#[doc( hidden )]
	fn backend_handle( &self ) -> Option<&FragmentHandle> { None }
}

/// Shared handle to a backend fragment.
///
/// The handle's code lives inside the library that produced it. Handles returned
/// by a [`PluginInvoker`]( crate::PluginInvoker ) hold a share of that library,
/// so it stays loaded for as long as any of them is alive.
pub type FragmentHandle = Arc<dyn FragmentWrapper> ;

/// A single value in a [`Params`] bag.
#[derive( Debug, Clone, PartialEq )]
pub enum AttrValue {
	Str( String ),
	Int( i64 ),
	Float( f64 ),
	Bool( bool ),
	Bytes( Vec<u8> ),
}

impl From<&str> for AttrValue { fn from( value: &str ) -> Self { Self::Str( value.to_string() )}}
impl From<String> for AttrValue { fn from( value: String ) -> Self { Self::Str( value )}}
impl From<i64> for AttrValue { fn from( value: i64 ) -> Self { Self::Int( value )}}
impl From<f64> for AttrValue { fn from( value: f64 ) -> Self { Self::Float( value )}}
impl From<bool> for AttrValue { fn from( value: bool ) -> Self { Self::Bool( value )}}
impl From<Vec<u8>> for AttrValue { fn from( value: Vec<u8> ) -> Self { Self::Bytes( value )}}

/// User supplied arguments of a graph operation.
///
/// Keys are kept sorted so that every worker iterates a bag in the same order.
///
/// ```
/// use graph_link::{ Params, AttrValue };
///
/// let params = Params::new()
/// 	.with( "directed", true )
/// 	.with( "vertex_label", "person" );
///
/// assert_eq!( params.get_bool( "directed" ), Some( true ));
/// assert_eq!( params.get_str( "vertex_label" ), Some( "person" ));
/// assert_eq!( params.get( "missing" ), None::<&AttrValue> );
/// ```
#[derive( Debug, Clone, Default, PartialEq )]
pub struct Params {
	entries: BTreeMap<String, AttrValue>,
}

impl Params {

	/// Creates an empty parameter bag.
	pub fn new() -> Self { Self::default() }

	/// Adds an entry, replacing any previous value under the same key.
	pub fn with( mut self, key: impl Into<String>, value: impl Into<AttrValue> ) -> Self {
		self.insert( key, value );
		self
	}

	/// Inserts an entry and returns the value it replaced.
	pub fn insert( &mut self, key: impl Into<String>, value: impl Into<AttrValue> ) -> Option<AttrValue> {
		self.entries.insert( key.into(), value.into() )
	}

	#[inline] pub fn get( &self, key: &str ) -> Option<&AttrValue> { self.entries.get( key )}
	#[inline] pub fn contains( &self, key: &str ) -> bool { self.entries.contains_key( key )}
	#[inline] pub fn len( &self ) -> usize { self.entries.len() }
	#[inline] pub fn is_empty( &self ) -> bool { self.entries.is_empty() }

	/// Iterates entries in key order.
	pub fn iter( &self ) -> impl Iterator<Item = ( &str, &AttrValue )> {
		self.entries.iter().map(|( key, value )| ( key.as_str(), value ))
	}

	pub fn get_str( &self, key: &str ) -> Option<&str> {
		match self.get( key ) { Some( AttrValue::Str( value )) => Some( value ), _ => None }
	}

	pub fn get_int( &self, key: &str ) -> Option<i64> {
		match self.get( key ) { Some( AttrValue::Int( value )) => Some( *value ), _ => None }
	}

	pub fn get_float( &self, key: &str ) -> Option<f64> {
		match self.get( key ) { Some( AttrValue::Float( value )) => Some( *value ), _ => None }
	}

	pub fn get_bool( &self, key: &str ) -> Option<bool> {
		match self.get( key ) { Some( AttrValue::Bool( value )) => Some( *value ), _ => None }
	}

	pub fn get_bytes( &self, key: &str ) -> Option<&[u8]> {
		match self.get( key ) { Some( AttrValue::Bytes( value )) => Some( value ), _ => None }
	}

}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<( K, V )> for Params {
	fn from_iter<T: IntoIterator<Item = ( K, V )>>( iter: T ) -> Self {
		Self { entries: iter.into_iter().map(|( key, value )| ( key.into(), value.into() )).collect() }
	}
}
