use std::{error::Error, sync::Arc};

use depinject::{in_group, out_group, Container, ContainerOptions, In, Out, Variadic};

trait Route: Send + Sync {
    fn path(&self) -> &'static str;
}

struct Health;
impl Route for Health {
    fn path(&self) -> &'static str {
        "/health"
    }
}
struct Users;
impl Route for Users {
    fn path(&self) -> &'static str {
        "/users"
    }
}

#[derive(Debug)]
struct Settings {
    port: u16,
}
#[derive(Debug)]
struct Pool {
    size: usize,
}
#[derive(Debug)]
struct Cache;

out_group! {
    struct Storage {
        pool: Arc<Pool>,
        cache: Arc<Cache>,
    }
}

in_group! {
    struct ServerDeps {
        settings: Arc<Settings>,
        pool: Arc<Pool>,
        cache: Option<Arc<Cache>>,
    }
}

#[derive(Debug)]
struct Server {
    port: u16,
    pool_size: usize,
    cached: bool,
    routes: Vec<&'static str>,
}

fn storage(settings: Arc<Settings>) -> Out<Storage> {
    Out(Storage {
        pool: Arc::new(Pool {
            size: settings.port as usize % 16,
        }),
        cache: Arc::new(Cache),
    })
}

fn server(deps: In<ServerDeps>, routes: Variadic<dyn Route>) -> Arc<Server> {
    Arc::new(Server {
        port: deps.settings.port,
        pool_size: deps.pool.size,
        cached: deps.cache.is_some(),
        routes: routes.iter().map(|route| route.path()).collect(),
    })
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut container = Container::new(ContainerOptions::all());
    container
        .implements::<Health, dyn Route>(|health| health as Arc<dyn Route>)
        .implements::<Users, dyn Route>(|users| users as Arc<dyn Route>)
        .supply(Settings { port: 8080 })?
        .supply(Health)?
        .supply(Users)?
        .provide(storage)?
        .provide(server)?;

    let server = container.invoke::<Arc<Server>>()?;
    println!("{server:?}");

    container.call(|pool: Arc<Pool>, cache: Option<Arc<Cache>>| {
        println!("pool of {} connections, cache {:?}", pool.size, cache)
    })?;

    println!("{}", container.dump());
    Ok(())
}
