use anyhow::Result;
use diesel::{
    Connection, PgConnection,
    connection::CacheSize,
    r2d2::{ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
};

#[derive(Debug, Default)]
struct DisablePreparedStatements;

impl CustomizeConnection<PgConnection, R2d2Error> for DisablePreparedStatements {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);
        Ok(())
    }
}

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

/// Builds the shared pool. `max_size` of `None` keeps the r2d2 default.
pub fn establish_connection(database_url: &str, max_size: Option<u32>) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let mut builder =
        Pool::builder().connection_customizer(Box::new(DisablePreparedStatements::default()));
    if let Some(max_size) = max_size {
        builder = builder.max_size(max_size);
    }
    let pool = builder.build(manager)?;
    Ok(pool)
}
