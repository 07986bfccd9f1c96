use graph_link::{ CommSpec, EntryPointError, ErrorKind, InvokerError, Params };

use crate::fixture_library::{ self, TestClient, FAILING_GRAPH };

fn expected_error() -> EntryPointError {
	EntryPointError::new( fixture_library::FAILURE_CODE, fixture_library::FAILURE_MESSAGE )
}

#[test]
fn dispatch_error_load_graph() {

	let invoker = fixture_library::ready_invoker();

	match invoker.load_graph( &CommSpec::single(), &mut TestClient::new(), FAILING_GRAPH, &Params::new() ) {
		Err( InvokerError::EntryPoint { symbol, source }) => {
			assert_eq!( symbol, "LoadGraph" );
			assert_eq!( source, expected_error() );
		}
		other => panic!( "Expected EntryPoint error, found: {:?}", other ),
	}

}

#[test]
fn dispatch_error_add_vertices_and_edges() {

	let invoker = fixture_library::ready_invoker();
	let fragment_id = fixture_library::object_id_for( FAILING_GRAPH );

	let err = invoker.add_vertices_to_graph( fragment_id, &CommSpec::single(), &mut TestClient::new(), FAILING_GRAPH, &Params::new() )
		.expect_err( "Expected the entry point to fail" );
	assert_eq!( err.kind(), ErrorKind::EntryPoint );
	assert_eq!( err.entry_point_error(), Some( &expected_error() ));

	let err = invoker.add_edges_to_graph( fragment_id, &CommSpec::single(), &mut TestClient::new(), FAILING_GRAPH, &Params::new() )
		.expect_err( "Expected the entry point to fail" );
	assert_eq!( err.to_string(), format!( "AddEdgesToGraph failed: [{}] {}", fixture_library::FAILURE_CODE, fixture_library::FAILURE_MESSAGE ));
	assert_eq!( err.into_entry_point_error(), Some( expected_error() ));

}

#[test]
fn dispatch_error_leaves_invoker_ready() {

	let invoker = fixture_library::ready_invoker();

	assert!( invoker.load_graph( &CommSpec::single(), &mut TestClient::new(), FAILING_GRAPH, &Params::new() ).is_err() );
	assert!( invoker.is_ready() );
	invoker.load_graph( &CommSpec::single(), &mut TestClient::new(), "dispatch-error-recovered", &Params::new() )
		.expect( "Failed to load graph after a backend error" );

}
