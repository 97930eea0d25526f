//! File helpers used around conversion jobs: trash, confirmed deletion and uploads.

mod deletions;
mod error;
mod trash;
mod upload;

pub use deletions::DeletionRegistry;
pub use error::FilesError;
pub use trash::{
    platform_trash_mover, FinderTrash, GioTrash, RecycleBinTrash, TrashMover, UnsupportedTrash,
};
pub use upload::ChunkWriter;
