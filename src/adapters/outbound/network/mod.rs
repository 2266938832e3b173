/// Network adapters for external API calls
mod caching_registry_client;
mod http;
mod npm_registry_client;
mod osv_client;
mod rubygems_client;

pub use caching_registry_client::CachingRegistryClient;
pub use npm_registry_client::{NpmRegistryClient, DEFAULT_NPM_REGISTRY};
pub use osv_client::{OsvClient, DEFAULT_OSV_API};
pub use rubygems_client::{RubyGemsClient, DEFAULT_RUBYGEMS_REGISTRY};
