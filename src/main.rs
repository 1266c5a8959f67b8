//! Binary entry point that glues the persisted roster to the TUI: bring up
//! file logging, open the key-value store, hydrate (or seed) the student
//! list, and drive the Ratatui event loop until the user exits.
use student_records_manager::{data_dir, logging, run_app, App, KvStore, StudentStore};

/// Initialize logging and persistence, load the roster, and launch the
/// event loop. Returning a `Result` bubbles fatal initialization problems
/// (for example an unwritable data directory) up to the terminal instead of
/// crashing silently.
fn main() -> anyhow::Result<()> {
    let data_dir = data_dir()?;
    let _logger = logging::init_logging(&data_dir.join("logs"))?;

    let kv = KvStore::open_default()?;
    let store = StudentStore::load(kv)?;

    let mut app = App::new(store);
    run_app(&mut app)
}
