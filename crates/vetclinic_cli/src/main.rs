//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `vetclinic_core` wiring: open a
//!   store, seed the demo fixture, print collection counts.
//! - Keep output deterministic for quick local sanity checks.

use vetclinic_core::db::open_db_in_memory;
use vetclinic_core::{seed_demo_data, ClinicRepository, EntityKind, SqliteCollectionStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let store = SqliteCollectionStore::new(&conn);
    let mut repo = ClinicRepository::open(store)?;
    let seeded = seed_demo_data(&mut repo)?;

    println!("vetclinic_core version={}", vetclinic_core::core_version());
    println!("seeded_demo_data={seeded}");
    println!("users={}", repo.users().len());
    for kind in EntityKind::ALL {
        println!("{}={}", kind.collection_key(), repo.records(kind).len());
    }
    if seeded {
        println!("demo logins: vet1/password reception1/password headrec/password john.doe/password");
    }
    Ok(())
}
