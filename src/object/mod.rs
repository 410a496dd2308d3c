pub mod blob;
pub mod commit;
mod store;

pub use blob::{read_blob, write_blob, write_blob_from_file};
pub use commit::{read_commit, write_commit};
pub use store::{
    get_object, list_objects, object_count, object_exists, object_path, put_object,
    resolve_object,
};
