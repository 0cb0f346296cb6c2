//! Input and output groups

use std::sync::Arc;

use depinject::{in_group, out_group, Container, ContainerOptions, ErrorKind, In, Out, Phase};

#[derive(Debug)]
struct Host(&'static str);
#[derive(Debug)]
struct Port(u16);
#[derive(Debug)]
struct Token(&'static str);
#[derive(Debug)]
struct Endpoint(String);

in_group! {
    struct Location {
        host: Arc<Host>,
        port: Arc<Port>,
        token: Option<Arc<Token>>,
    }
}

out_group! {
    struct Defaults {
        host: Arc<Host>,
        port: Arc<Port>,
    }
}

fn endpoint(location: In<Location>) -> Arc<Endpoint> {
    let auth = if location.token.is_some() { "auth@" } else { "" };
    Arc::new(Endpoint(format!("{auth}{}:{}", location.host.0, location.port.0)))
}

fn defaults() -> Out<Defaults> {
    Out(Defaults {
        host: Arc::new(Host("localhost")),
        port: Arc::new(Port(8080)),
    })
}

#[test]
fn input_group_is_assembled_from_members() {
    let mut container = Container::new(ContainerOptions::new().with_in_sentinel());
    container
        .supply(Host("example.org"))
        .unwrap()
        .supply(Port(443))
        .unwrap()
        .supply(Token("secret"))
        .unwrap()
        .provide(endpoint)
        .unwrap();

    assert_eq!(container.invoke::<Arc<Endpoint>>().unwrap().0, "auth@example.org:443");
    assert!(container
        .provider_ids()
        .iter()
        .any(|id| id.starts_with("in(") && id.contains("Location")));
}

#[test]
fn optional_group_member_may_be_missing() {
    let mut container = Container::new(ContainerOptions::new().with_in_sentinel());
    container
        .supply(Host("example.org"))
        .unwrap()
        .supply(Port(80))
        .unwrap()
        .provide(endpoint)
        .unwrap();

    assert_eq!(container.invoke::<Arc<Endpoint>>().unwrap().0, "example.org:80");
}

#[test]
fn input_group_is_expanded_once() {
    let mut container = Container::new(ContainerOptions::new().with_in_sentinel());
    container
        .supply(Host("example.org"))
        .unwrap()
        .supply(Port(80))
        .unwrap()
        .provide(endpoint)
        .unwrap()
        .provide(|location: In<Location>| Arc::new(location.port.0))
        .unwrap();

    let groups = container
        .provider_ids()
        .into_iter()
        .filter(|id| id.starts_with("in("))
        .count();
    assert_eq!(groups, 1);
    assert_eq!(container.invoke::<Arc<Endpoint>>().unwrap().0, "example.org:80");
    assert_eq!(*container.invoke::<Arc<u16>>().unwrap(), 80);
}

#[test]
fn input_group_can_be_invoked() {
    let mut container = Container::new(ContainerOptions::new().with_in_sentinel());
    container
        .supply(Host("direct"))
        .unwrap()
        .supply(Port(1))
        .unwrap();

    let location = container.invoke::<In<Location>>().unwrap();
    assert_eq!(location.host.0, "direct");
    assert!(location.token.is_none());
}

#[test]
fn input_group_needs_a_producer_without_expansion() {
    let mut container = Container::default();
    container
        .supply(Host("example.org"))
        .unwrap()
        .supply(Port(80))
        .unwrap()
        .provide(endpoint)
        .unwrap();

    let error = container.invoke::<Arc<Endpoint>>().unwrap_err();
    assert_eq!(error.phase, Phase::Build);
    assert!(matches!(error.kind, ErrorKind::MissingDependency { .. }));
}

#[test]
fn output_group_is_split_into_members() {
    let options = ContainerOptions::new().with_in_sentinel().with_out_sentinel();
    let mut container = Container::new(options);
    container.provide(defaults).unwrap().provide(endpoint).unwrap();

    assert_eq!(container.invoke::<Arc<Endpoint>>().unwrap().0, "localhost:8080");
    assert_eq!(container.invoke::<Arc<Port>>().unwrap().0, 8080);
}

#[test]
fn output_group_is_a_single_value_without_expansion() {
    let mut container = Container::default();
    container.provide(defaults).unwrap();

    let defaults = container.invoke::<Arc<Defaults>>().unwrap();
    assert_eq!(defaults.host.0, "localhost");

    let error = container.invoke::<Arc<Host>>().unwrap_err();
    assert!(matches!(error.kind, ErrorKind::MissingOutput(_)));
}

#[test]
fn failed_expansion_leaves_no_partial_state() {
    let mut container = Container::new(ContainerOptions::new().with_out_sentinel());
    container.supply(Port(1)).unwrap();

    // The split would register a second producer of Port
    let error = container.provide(defaults).unwrap_err();
    assert_eq!(error.phase, Phase::Provide);
    assert_eq!(container.provider_ids().len(), 1);

    assert_eq!(container.invoke::<Arc<Port>>().unwrap().0, 1);
    assert!(container.invoke::<Arc<Defaults>>().is_err());
}
