//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskstore_core` linkage.
//! - Run one in-memory repository round trip for quick local sanity checks.

use taskstore_core::{Repository, Todo, UnitOfWork};

fn main() {
    println!("taskstore_core ping={}", taskstore_core::ping());
    println!("taskstore_core version={}", taskstore_core::core_version());

    let uow = match UnitOfWork::open_in_memory() {
        Ok(uow) => uow,
        Err(err) => {
            eprintln!("smoke failed: could not open session: {err}");
            std::process::exit(1);
        }
    };

    let repo = Repository::<Todo>::new(&uow);
    let mut todo = Todo::new("smoke check");
    let outcome = repo
        .add(&mut todo)
        .and_then(|id| repo.get(id))
        .map(|loaded| loaded.is_some());

    match outcome {
        Ok(true) => println!("smoke roundtrip=ok"),
        Ok(false) => {
            eprintln!("smoke failed: persisted row not found");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("smoke failed: {err}");
            std::process::exit(1);
        }
    }
}
