//! Test helpers for writing trip documents into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::route::RouteArgs;

/// A temporary directory holding trip documents.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, contents).expect("write document");
        path
    }
}

pub(super) const TWO_STOPS: &str = r#"[
    {"name": "Hotel", "lat": 39.90, "lng": 116.39, "type": "hotel"},
    {"name": "Museum", "lat": 39.92, "lng": 116.40, "type": "attraction"}
]"#;

pub(super) const TRIP: &str = r#"{
    "id": "t-1",
    "title": "Beijing weekend",
    "dayPlans": [
        {"day": 2, "locations": [
            {"name": "Summer Palace", "lat": 39.99, "lng": 116.27, "type": "attraction"}
        ]},
        {"day": 1, "locations": [
            {"name": "Hotel", "lat": 39.90, "lng": 116.39, "type": "hotel"},
            {"name": "Forbidden City", "lat": 39.916, "lng": 116.397, "type": "attraction"}
        ]}
    ]
}"#;

/// Arguments naming `document` with a key and everything else defaulted.
pub(super) fn args_for(document: &Utf8Path) -> RouteArgs {
    RouteArgs {
        document: Some(document.to_path_buf()),
        amap_key: Some("k".to_owned()),
        ..RouteArgs::default()
    }
}
