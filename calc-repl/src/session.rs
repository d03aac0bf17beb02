//! Persistence of the history to a JSON file.

use calc_history::{backend::Cas, Calculator, Snapshot};
use crate::error::Error;
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Writes the history to `path`.
pub fn save_to(calc: &Calculator<Cas>, path: &Path) -> Result<(), Error> {
    let json = calc.serialize().to_json()?;
    fs::write(path, json).map_err(|err| Error::Io { path: path.to_path_buf(), err })
}

/// Replaces the history with the one saved at `path`.
pub fn load_from(calc: &mut Calculator<Cas>, path: &Path) -> Result<(), Error> {
    let json = fs::read_to_string(path).map_err(|err| Error::Io { path: path.to_path_buf(), err })?;
    calc.load(Snapshot::from_json(&json)?)?;
    Ok(())
}

/// Keeps a session file in step with the history.
///
/// Every change to the history marks the session dirty; [`Session::flush`] writes the file once
/// for however many changes happened since the last flush.
#[derive(Debug)]
pub struct Session {
    path: Option<PathBuf>,
    dirty: Rc<Cell<bool>>,
}

impl Session {
    pub fn attach(calc: &mut Calculator<Cas>, path: Option<PathBuf>) -> Self {
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        calc.tree_mut().subscribe(move |_| flag.set(true));
        let flag = Rc::clone(&dirty);
        calc.subscribe(move |_| flag.set(true));
        Self { path, dirty }
    }

    /// Loads the session file, if there is one. Returns true if a history was loaded.
    ///
    /// If the file cannot be loaded, the session is detached from it, so that later flushes
    /// leave the file as it is.
    pub fn restore(&mut self, calc: &mut Calculator<Cas>) -> Result<bool, Error> {
        let Some(path) = self.path.as_deref().filter(|path| path.exists()) else {
            return Ok(false);
        };
        if let Err(err) = load_from(calc, path) {
            self.path = None;
            return Err(err);
        }
        self.dirty.set(false);
        Ok(true)
    }

    /// Returns the file the session is saved to, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Saves the history if it changed since the last flush.
    pub fn flush(&self, calc: &Calculator<Cas>) -> Result<(), Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty.replace(false) {
            return Ok(());
        }

        tracing::debug!(path = %path.display(), "saving session");
        save_to(calc, path)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    /// A path in the temporary directory that no other test uses.
    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("calc-repl-{}-{}.json", std::process::id(), name))
    }

    #[test]
    fn round_trip() {
        let path = scratch("round-trip");
        let mut calc = Calculator::<Cas>::default();
        let session = Session::attach(&mut calc, Some(path.clone()));
        calc.save_new_expression("2").unwrap();
        calc.save_new_expression("$a0 * 3").unwrap();
        session.flush(&calc).unwrap();

        let mut restored = Calculator::<Cas>::default();
        let mut session = Session::attach(&mut restored, Some(path.clone()));
        assert!(session.restore(&mut restored).unwrap());
        assert_eq!(restored.tree().len(), 2);
        assert_eq!(session.path(), Some(path.as_path()));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unreadable_files_are_left_alone() {
        let path = scratch("unreadable");
        fs::write(&path, "{ not a history").unwrap();

        let mut calc = Calculator::<Cas>::default();
        let mut session = Session::attach(&mut calc, Some(path.clone()));
        assert!(matches!(session.restore(&mut calc), Err(Error::Snapshot(_))));
        assert_eq!(session.path(), None);

        calc.save_new_expression("1").unwrap();
        session.flush(&calc).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not a history");

        fs::remove_file(&path).unwrap();
    }
}
