use std::{hint::black_box, sync::Arc};
use criterion::{criterion_group, criterion_main, Criterion};
use tenure::{bind, injectable, Constructor, Contract, Injectable, Lifetime, Resolver, Tag};

trait Repository: Send + Sync {
    fn len(&self) -> usize;
}

impl Contract for dyn Repository {
    const TAG: Option<Tag> = Some(Tag::Transient);
}

#[derive(Default)]
struct Users;

impl Repository for Users {
    fn len(&self) -> usize {
        1
    }
}

#[derive(Default)]
struct Settings;

#[derive(Default)]
struct Session;

#[derive(Default)]
struct Buffer;

injectable! {
    Singleton => Settings;
    Scoped => Session;
    Pooled => Buffer;
}

impl Injectable for Users {
    fn instantiate() -> Result<Self, tenure::Error> {
        Ok(Self)
    }
}

struct Service {
    _settings: Arc<Settings>,
    _users: Arc<dyn Repository>,
}

impl Injectable for Service {
    const CAPABILITY: Option<Lifetime> = Some(Lifetime::Transient);

    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|settings: Arc<Settings>, users: Arc<dyn Repository>| Ok(Self {
            _settings: settings,
            _users: users,
        }))]
    }
}

fn resolver() -> Resolver {
    let mut builder = Resolver::builder();
    builder
        .register::<Settings>()
        .register::<Session>()
        .register::<Buffer>()
        .register::<Service>();
    bind!(builder, dyn Repository => Users);
    builder.build()
}

fn benchmark(c: &mut Criterion) {
    let resolver = resolver();

    c.bench_function("singleton", |b| b.iter(|| {
        black_box(resolver.get::<Settings>().unwrap());
    }));
    c.bench_function("transient contract", |b| b.iter(|| {
        black_box(resolver.get::<dyn Repository>().unwrap().len());
    }));
    c.bench_function("transient with dependencies", |b| b.iter(|| {
        black_box(resolver.get::<Service>().unwrap());
    }));
    c.bench_function("scoped", |b| b.iter(|| {
        resolver.scoped(|| black_box(resolver.get::<Session>().unwrap()));
    }));
    c.bench_function("pooled get and put", |b| b.iter(|| {
        let buffer = resolver.get::<Buffer>().unwrap();
        black_box(resolver.put(buffer).unwrap());
    }));
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
