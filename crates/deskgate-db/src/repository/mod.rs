//! SurrealDB repository implementations.

mod declaration;
mod grant;
mod group;
mod tenant;

pub use declaration::SurrealDeclarationRepository;
pub use grant::SurrealGrantRepository;
pub use group::SurrealGroupRepository;
pub use tenant::SurrealTenantRepository;
