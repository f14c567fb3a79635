pub mod fs_upload_store;
