use std::{sync::Arc, thread};
use tenure::{
    Injectable, Lifetime, LifetimeSource, Resolver, Tag,
    Pooled, Scoped, Singleton, ThreadScoped, Transient
};

#[derive(Singleton)]
struct Config;

#[derive(Scoped)]
struct Session {}

#[derive(ThreadScoped)]
struct Buffer();

#[derive(Pooled)]
#[tenure(pool_size = 3)]
struct Parser;

#[derive(Transient)]
struct Handler {
    config: Arc<Config>,
    parser: Arc<Parser>,
}

#[derive(Transient)]
struct Wrapper(Arc<Handler>);

#[test]
fn it_derives_lifetime_tags() {
    assert_eq!(Config::TAG, Some(Tag::Singleton));
    assert_eq!(Session::TAG, Some(Tag::Scoped));
    assert_eq!(Buffer::TAG, Some(Tag::ThreadScoped));
    assert_eq!(Parser::TAG, Some(Tag::Pooled));
    assert_eq!(Handler::TAG, Some(Tag::Transient));
    assert_eq!(Handler::CAPABILITY, None);
}

#[test]
fn it_derives_pool_size() {
    assert_eq!(Parser::pool_size(), Some(3));
    assert_eq!(Config::pool_size(), None);
}

#[test]
fn it_derives_constructor_from_fields() {
    let constructors = Handler::constructors();

    assert_eq!(constructors.len(), 1);
    assert_eq!(constructors[0].arity(), 2);
    assert!(Config::constructors().is_empty());
}

#[test]
fn it_resolves_derived_types() {
    let mut builder = Resolver::builder();
    builder
        .register::<Config>()
        .register::<Session>()
        .register::<Buffer>()
        .register::<Parser>()
        .register::<Handler>()
        .register::<Wrapper>();
    let resolver = builder.build();

    let wrapper = resolver.get::<Wrapper>().unwrap();
    let handler = resolver.get::<Handler>().unwrap();

    assert!(!Arc::ptr_eq(&wrapper.0, &handler));
    assert!(Arc::ptr_eq(&wrapper.0.config, &handler.config));
    assert!(!Arc::ptr_eq(&wrapper.0.parser, &handler.parser));

    let descriptor = resolver.classify::<Parser>().unwrap();
    assert_eq!(descriptor.lifetime, Lifetime::Pooled);
    assert_eq!(descriptor.source, LifetimeSource::ImplementationTag);

    let sessions = thread::spawn(move || {
        resolver.scoped(|| {
            let a = resolver.get::<Session>().unwrap();
            let b = resolver.get::<Session>().unwrap();
            Arc::ptr_eq(&a, &b)
        })
    })
    .join()
    .unwrap();

    assert!(sessions);
}
