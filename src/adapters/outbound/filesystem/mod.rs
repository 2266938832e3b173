/// Filesystem adapters for project files, the ignore file and report output
mod config_store;
mod file_reader;
mod file_writer;
mod gemfile_lock_resolver;

pub use config_store::YamlConfigStore;
pub use file_reader::FileSystemReader;
pub use file_writer::{FileSystemWriter, StdoutPresenter};
pub use gemfile_lock_resolver::GemfileLockResolver;
