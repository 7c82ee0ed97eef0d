use std::panic::{self, AssertUnwindSafe};
use std::{env, fs, path::Path};

use uuid::Uuid;

/// Run `f` with a fresh directory that is removed afterwards, even if `f`
/// panics.
pub fn temp_dir<F>(f: F)
where
    F: FnOnce(&Path),
{
    let mut path = env::temp_dir();
    path.push(format!("slate-{}", Uuid::new_v4()));

    fs::create_dir(&path).unwrap();
    let result = panic::catch_unwind(AssertUnwindSafe(|| f(&path)));

    let _ = fs::remove_dir_all(&path);
    if let Err(payload) = result {
        panic::resume_unwind(payload);
    }
}
