//! # Curve Store
//!
//! Owns the in-memory response curve and keeps it in sync with the `graph`
//! field of the settings record.
//!
//! Loading never fails: a missing file, a missing `graph`, or a graph that
//! breaks the curve invariants all yield the default two-anchor curve.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{ControlPoint, Curve, CurveError};
use crate::error::Result;
use crate::settings::persist::PersistedRecord;

/// Curve persisted alongside the scalar settings.
#[derive(Debug, Clone)]
pub struct CurveStore {
    path: PathBuf,
    curve: Curve,
}

impl CurveStore {
    /// Opens the store backed by the settings record at `path`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use stick_cursor::curve::store::CurveStore;
    ///
    /// let store = CurveStore::open("config.json");
    /// println!("{} points", store.curve().len());
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let curve = load_curve(&path);
        Self { path, curve }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Reads the persisted curve without touching the in-memory copy.
    #[must_use]
    pub fn load(&self) -> Curve {
        load_curve(&self.path)
    }

    /// Replaces the in-memory curve with the persisted one.
    pub fn reload(&mut self) -> &Curve {
        self.curve = self.load();
        &self.curve
    }

    /// Persists `curve` into the record's `graph` field.
    ///
    /// The other fields of the record are preserved. No validation is done
    /// here.
    ///
    /// # Errors
    ///
    /// Returns error if the record cannot be written.
    pub fn save(&self, curve: &Curve) -> Result<()> {
        let mut record = PersistedRecord::load(&self.path);
        record.graph = Some(curve.to_pairs());
        record.save(&self.path)?;
        debug!("Saved {} curve points to {}", curve.len(), self.path.display());
        Ok(())
    }

    /// Persists the in-memory curve.
    pub fn persist(&self) -> Result<()> {
        self.save(&self.curve)
    }

    /// Inserts a point in x order. Duplicate x values are allowed.
    pub fn insert(&mut self, point: ControlPoint) -> &Curve {
        self.curve.insert(point);
        &self.curve
    }

    /// Inserts a point and returns its index.
    pub(crate) fn insert_point(&mut self, point: ControlPoint) -> usize {
        self.curve.insert(point)
    }

    /// Removes `point` if the curve keeps at least two points.
    ///
    /// # Errors
    ///
    /// [`CurveError::CannotRemove`] on a two-point curve; the curve is left
    /// unchanged for every error.
    pub fn remove(&mut self, point: ControlPoint) -> std::result::Result<(), CurveError> {
        self.curve.remove(point).map(|_| ())
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> std::result::Result<ControlPoint, CurveError> {
        self.curve.remove_at(index)
    }

    /// Replaces the in-memory curve.
    pub fn replace(&mut self, curve: Curve) {
        self.curve = curve;
    }
}

fn load_curve(path: &Path) -> Curve {
    let Some(pairs) = PersistedRecord::load(path).graph else {
        return Curve::default();
    };

    match Curve::from_pairs(&pairs) {
        Ok(curve) => curve,
        Err(e) => {
            warn!(
                "Stored curve in {} is unusable ({}), using default curve",
                path.display(),
                e
            );
            Curve::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{END_ANCHOR, START_ANCHOR};
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CurveStore {
        CurveStore::open(dir.path().join("config.json"))
    }

    #[test]
    fn test_missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.curve(), &Curve::default());
    }

    #[test]
    fn test_missing_graph_loads_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"key": "C", "multiplier": 0.7, "deadzone": 0.1}"#).unwrap();

        assert_eq!(CurveStore::open(&path).curve(), &Curve::default());
    }

    #[test]
    fn test_malformed_graph_loads_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        for graph in [
            r#"[[0, 0]]"#,
            r#"[[0, 0], [0.5, 0.5]]"#,
            r#"[[0.1, 0], [1, 1]]"#,
            r#""not a graph""#,
        ] {
            fs::write(&path, format!(r#"{{"graph": {}}}"#, graph)).unwrap();
            assert_eq!(
                CurveStore::open(&path).curve(),
                &Curve::default(),
                "graph {} should fall back",
                graph
            );
        }
    }

    #[test]
    fn test_unsorted_graph_is_sorted_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"graph": [[1, 1], [0.6, 0.4], [0, 0]]}"#).unwrap();

        let store = CurveStore::open(&path);
        assert_eq!(
            store.curve().points(),
            &[START_ANCHOR, ControlPoint::new(0.6, 0.4), END_ANCHOR]
        );
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert(ControlPoint::new(0.5, 0.2));
        store.insert(ControlPoint::new(0.8, 0.65));
        store.persist().unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.curve(), store.curve());
        assert_eq!(store.load(), *store.curve());
    }

    /// xorshift64, so the stored values use every mantissa bit.
    fn next_unit(state: &mut u64) -> f64 {
        *state ^= *state << 13;
        *state ^= *state >> 7;
        *state ^= *state << 17;
        (*state >> 11) as f64 / (1u64 << 53) as f64
    }

    #[test]
    fn test_round_trip_full_precision_points() {
        let dir = TempDir::new().unwrap();
        let mut state = 0x9e37_79b9_7f4a_7c15_u64;

        for _ in 0..200 {
            let mut store = store_in(&dir);
            store.replace(Curve::default());
            store.insert(ControlPoint::new(0.1 + 0.2, 1.0 / 3.0));
            for _ in 0..8 {
                let x = next_unit(&mut state);
                if x == 0.0 {
                    continue;
                }
                store.insert(ControlPoint::new(x, next_unit(&mut state)));
            }
            store.persist().unwrap();

            assert_eq!(store.load(), *store.curve());
        }
    }

    #[test]
    fn test_save_preserves_scalar_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"key": "K", "multiplier": 1.2, "deadzone": 0.15}"#).unwrap();

        let mut store = CurveStore::open(&path);
        store.insert(ControlPoint::new(0.3, 0.2));
        store.persist().unwrap();

        let record = PersistedRecord::load(&path);
        assert_eq!(record.key, "K");
        assert_eq!(record.multiplier, 1.2);
        assert_eq!(record.deadzone, 0.15);
        assert_eq!(record.graph, Some(vec![[0.0, 0.0], [0.3, 0.2], [1.0, 1.0]]));
    }

    #[test]
    fn test_remove_keeps_two_points() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        assert_eq!(store.remove(START_ANCHOR), Err(CurveError::CannotRemove));
        assert_eq!(store.remove(END_ANCHOR), Err(CurveError::CannotRemove));
        assert_eq!(store.curve().len(), 2);
    }

    #[test]
    fn test_insert_then_remove() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let point = ControlPoint::new(0.4, 0.3);

        assert_eq!(store.insert(point).len(), 3);
        assert!(store.remove(point).is_ok());
        assert_eq!(store.curve(), &Curve::default());
    }

    #[test]
    fn test_reload_discards_unsaved_edits() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert(ControlPoint::new(0.4, 0.3));

        assert_eq!(store.reload(), &Curve::default());
    }
}
