use std::fs;
use std::io;
use std::path::Path;

use galena_shared::protocol::BlockRecord;

use crate::world::ClientWorld;

/// Writes the world as a flat JSON array of non-empty voxel records. The
/// same format serves local saves and file export, so a save can be handed
/// to another client as-is.
pub fn save_world(path: &Path, world: &ClientWorld) -> io::Result<()> {
    let records = world.snapshot();
    let encoded = serde_json::to_string(&records).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed to serialize world snapshot: {e}"),
        )
    })?;
    fs::write(path, encoded)
}

/// Reads a snapshot file back into records; apply with
/// [`ClientWorld::apply_snapshot`].
pub fn load_world(path: &Path) -> io::Result<Vec<BlockRecord>> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed to deserialize world snapshot: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    use glam::IVec3;

    use galena_shared::block::BlockId;

    use crate::world::ClientWorld;

    use super::{load_world, save_world};

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("galena-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn save_load_round_trip_reproduces_the_world() {
        let mut world = ClientWorld::new();
        world.set_block(IVec3::new(0, 0, 0), BlockId::GRASS);
        world.set_block(IVec3::new(-7, 2, 31), BlockId::BRICK);
        world.set_block(IVec3::new(5, -1, 5), BlockId::SAND);

        let path = temp_path("round-trip");
        save_world(&path, &world).expect("save");

        let records = load_world(&path).expect("load");
        let mut restored = ClientWorld::new();
        restored.apply_snapshot(&records);
        fs::remove_file(&path).ok();

        assert_eq!(restored.snapshot(), world.snapshot());
    }

    #[test]
    fn loading_a_corrupt_file_reports_invalid_data() {
        let path = temp_path("corrupt");
        fs::write(&path, "{]").expect("write");
        let err = load_world(&path).expect_err("must fail");
        fs::remove_file(&path).ok();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn loading_a_missing_file_reports_not_found() {
        let err = load_world(&temp_path("missing")).expect_err("must fail");
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn snapshot_files_use_the_wire_record_shape() {
        let mut world = ClientWorld::new();
        world.set_block(IVec3::new(1, 2, 3), BlockId::STONE);

        let path = temp_path("record-shape");
        save_world(&path, &world).expect("save");
        let contents = fs::read_to_string(&path).expect("read");
        fs::remove_file(&path).ok();

        assert_eq!(contents, r#"[{"x":1,"y":2,"z":3,"type":3}]"#);
    }
}
