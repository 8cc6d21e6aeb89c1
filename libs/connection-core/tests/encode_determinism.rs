use connection_core::{FilterOperator, RequestParameters};

fn sample() -> RequestParameters {
    RequestParameters::new()
        .filter("zone", FilterOperator::Eq, ["eu-west"])
        .filter("plan", FilterOperator::In, ["pro", "business"])
        .sort("name")
        .sort_desc("updated_at")
        .page(2)
        .per_page(25)
}

#[test]
fn encoding_twice_is_identical() {
    let params = sample();
    assert_eq!(params.encode(), params.encode());
    assert_eq!(params.clone().encode(), params.encode());
}

#[test]
fn encoding_follows_insertion_order() {
    let forward = RequestParameters::new()
        .filter("a", FilterOperator::Eq, ["1"])
        .filter("b", FilterOperator::Eq, ["2"])
        .sort("x")
        .sort("y");
    let reversed = RequestParameters::new()
        .filter("b", FilterOperator::Eq, ["2"])
        .filter("a", FilterOperator::Eq, ["1"])
        .sort("y")
        .sort("x");

    assert_eq!(forward.encode(), "a:eq=1&b:eq=2&sort=x&sort=y");
    assert_eq!(reversed.encode(), "b:eq=2&a:eq=1&sort=y&sort=x");
}

#[test]
fn full_query_string() {
    assert_eq!(
        sample().encode(),
        "zone:eq=eu-west&plan:in=pro,business&sort=name&sort=-updated_at&page=2&per_page=25"
    );
}

#[test]
fn zero_per_page_is_server_default() {
    let params = RequestParameters::new().page(1).per_page(0);
    assert_eq!(params.encode(), "page=1");
}
