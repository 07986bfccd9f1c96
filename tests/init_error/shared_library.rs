//! Opens a real shared object that exports none of the entry points.

#[cfg( all( target_os = "linux", target_env = "gnu" ))]
#[test]
fn init_error_system_library_lacks_entry_points() {

	use graph_link::{ ErrorKind, InvokerState, PluginInvoker };

	let mut invoker = PluginInvoker::new( "plugin-1", "libc.so.6" );

	let err = unsafe { invoker.init() }.expect_err( "libc does not export LoadGraph" );
	assert_eq!( err.kind(), ErrorKind::SymbolResolution );
	assert_eq!( err.missing_symbol(), Some( "LoadGraph" ));
	assert_eq!( invoker.state(), InvokerState::Failed );

}
