pub mod audio_input;
pub mod blob_store;
pub mod recorder_delegate;
